use async_trait::async_trait;
use sqlx::PgPool;

use crate::dto::role_dto::{CreateRolePayload, UpdateRolePayload};
use crate::error::Result;
use crate::models::{role::Role, DeleteOutcome};

const ROLE_COLUMNS: &str =
    "id, name, is_default, can_deleted, created_at, updated_at, deleted_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn create(&self, payload: CreateRolePayload) -> Result<Role>;
    async fn get(&self, id: i32) -> Result<Option<Role>>;
    async fn list_active(&self) -> Result<Vec<Role>>;
    async fn list_soft_deleted(&self) -> Result<Vec<Role>>;
    async fn update(&self, id: i32, payload: UpdateRolePayload) -> Result<Option<Role>>;
    async fn soft_delete(&self, id: i32) -> Result<DeleteOutcome>;
    async fn restore(&self, id: i32) -> Result<bool>;
    async fn hard_delete(&self, id: i32) -> Result<DeleteOutcome>;
}

#[derive(Clone)]
pub struct PgRoleStore {
    pool: PgPool,
}

impl PgRoleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    async fn create(&self, payload: CreateRolePayload) -> Result<Role> {
        let role = sqlx::query_as::<_, Role>(&format!(
            r#"
            INSERT INTO role (name, is_default, can_deleted)
            VALUES ($1, $2, $3)
            RETURNING {ROLE_COLUMNS}
            "#
        ))
        .bind(&payload.name)
        .bind(payload.is_default)
        .bind(payload.can_deleted)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(role_id = role.id, "Stored role");
        Ok(role)
    }

    async fn get(&self, id: i32) -> Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "SELECT {ROLE_COLUMNS} FROM role WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    async fn list_active(&self) -> Result<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(&format!(
            "SELECT {ROLE_COLUMNS} FROM role WHERE deleted_at IS NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    async fn list_soft_deleted(&self) -> Result<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(&format!(
            "SELECT {ROLE_COLUMNS} FROM role WHERE deleted_at IS NOT NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    async fn update(&self, id: i32, payload: UpdateRolePayload) -> Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(&format!(
            r#"
            UPDATE role
            SET
                name = COALESCE($2, name),
                is_default = COALESCE($3, is_default),
                can_deleted = COALESCE($4, can_deleted),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {ROLE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.name)
        .bind(payload.is_default)
        .bind(payload.can_deleted)
        .fetch_optional(&self.pool)
        .await?;

        if role.is_some() {
            tracing::info!(role_id = id, "Updated role");
        }
        Ok(role)
    }

    async fn soft_delete(&self, id: i32) -> Result<DeleteOutcome> {
        let mut tx = self.pool.begin().await?;

        let can_deleted: Option<bool> = sqlx::query_scalar(
            "SELECT can_deleted FROM role WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match can_deleted {
            None => DeleteOutcome::NotFound,
            Some(false) => DeleteOutcome::Protected,
            Some(true) => {
                sqlx::query("UPDATE role SET deleted_at = NOW() WHERE id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                DeleteOutcome::Deleted
            }
        };

        tx.commit().await?;
        if outcome == DeleteOutcome::Deleted {
            tracing::info!(role_id = id, "Soft deleted role");
        }
        Ok(outcome)
    }

    async fn restore(&self, id: i32) -> Result<bool> {
        let res =
            sqlx::query("UPDATE role SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL")
                .bind(id)
                .execute(&self.pool)
                .await?;

        let restored = res.rows_affected() > 0;
        if restored {
            tracing::info!(role_id = id, "Restored role");
        }
        Ok(restored)
    }

    async fn hard_delete(&self, id: i32) -> Result<DeleteOutcome> {
        let mut tx = self.pool.begin().await?;

        let can_deleted: Option<bool> =
            sqlx::query_scalar("SELECT can_deleted FROM role WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let outcome = match can_deleted {
            None => DeleteOutcome::NotFound,
            Some(false) => DeleteOutcome::Protected,
            Some(true) => {
                sqlx::query("DELETE FROM role WHERE id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                DeleteOutcome::Deleted
            }
        };

        tx.commit().await?;
        if outcome == DeleteOutcome::Deleted {
            tracing::info!(role_id = id, "Hard deleted role");
        }
        Ok(outcome)
    }
}
