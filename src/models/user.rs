use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub is_default: bool,
    pub can_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Row shape of the eager role join: one line per (user, role) pair.
#[derive(Debug, Clone, FromRow)]
pub struct UserRoleRow {
    pub user_id: i32,
    #[sqlx(flatten)]
    pub role: Role,
}
