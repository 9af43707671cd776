use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::role_dto::RoleResponse;
use crate::models::{role::Role, user::User};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserPayload {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_can_deleted")]
    pub can_deleted: bool,
}

fn default_can_deleted() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    pub is_default: Option<bool>,
    pub can_deleted: Option<bool>,
}

/// Materialized user projection with its active roles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub is_default: bool,
    pub can_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub roles: Vec<RoleResponse>,
}

impl UserResponse {
    pub fn from_parts(user: User, roles: Vec<Role>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_default: user.is_default,
            can_deleted: user.can_deleted,
            created_at: user.created_at,
            updated_at: user.updated_at,
            deleted_at: user.deleted_at,
            roles: roles.into_iter().map(RoleResponse::from).collect(),
        }
    }

    pub fn has_role(&self, role_id: i32) -> bool {
        self.roles.iter().any(|r| r.id == role_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSearchHit {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Envelope shared by every `/users` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Vec<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(code: u16, message: &str, data: Vec<T>) -> Self {
        Self {
            code,
            message: message.to_string(),
            data,
        }
    }

    pub fn ok(message: &str, data: Vec<T>) -> Self {
        Self::new(200, message, data)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CacheDataPayload {
    #[validate(length(min = 1))]
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheDataEntry {
    pub user_id: i32,
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignRoleQuery {
    pub role_id: i32,
}
