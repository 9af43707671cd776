use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRolePayload {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_can_deleted")]
    pub can_deleted: bool,
}

fn default_can_deleted() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateRolePayload {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub is_default: Option<bool>,
    pub can_deleted: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleResponse {
    pub id: i32,
    pub name: String,
    pub is_default: bool,
    pub can_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
            is_default: role.is_default,
            can_deleted: role.can_deleted,
            created_at: role.created_at,
            updated_at: role.updated_at,
            deleted_at: role.deleted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
