use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};

use crate::dto::user_dto::{CreateUserPayload, UpdateUserPayload, UserResponse};
use crate::error::{Error, Result};
use crate::models::{
    role::Role,
    user::{User, UserRoleRow},
    DeleteOutcome,
};

const USER_COLUMNS: &str =
    "id, name, email, is_default, can_deleted, created_at, updated_at, deleted_at";

/// Primary-store access for users and their role relation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn ping(&self) -> Result<()>;
    async fn create(&self, payload: CreateUserPayload) -> Result<UserResponse>;
    async fn get(&self, id: i32) -> Result<Option<UserResponse>>;
    async fn list_active(&self) -> Result<Vec<UserResponse>>;
    async fn list_soft_deleted(&self) -> Result<Vec<UserResponse>>;
    async fn update(&self, id: i32, payload: UpdateUserPayload) -> Result<Option<UserResponse>>;
    async fn soft_delete(&self, id: i32) -> Result<DeleteOutcome>;
    async fn restore(&self, id: i32) -> Result<bool>;
    async fn hard_delete(&self, id: i32) -> Result<DeleteOutcome>;
    /// Inserts the relation and reads the resulting projection in one transaction.
    /// A duplicate pair is a `Conflict`; a missing or soft-deleted user is `NotFound`.
    async fn assign_role(&self, user_id: i32, role_id: i32) -> Result<UserResponse>;
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_roles(&self, users: Vec<User>) -> Result<Vec<UserResponse>> {
        let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
        let mut by_user = active_roles_for(&self.pool, &ids).await?;

        Ok(users
            .into_iter()
            .map(|user| {
                let roles = by_user.remove(&user.id).unwrap_or_default();
                UserResponse::from_parts(user, roles)
            })
            .collect())
    }

    async fn with_roles_one(&self, user: User) -> Result<UserResponse> {
        self.with_roles(vec![user])
            .await?
            .pop()
            .ok_or_else(|| Error::Internal("User projection lost during role fetch".to_string()))
    }
}

/// Active roles of each given user, ordered by role id.
async fn active_roles_for<'e, E>(executor: E, user_ids: &[i32]) -> Result<HashMap<i32, Vec<Role>>>
where
    E: PgExecutor<'e>,
{
    let mut by_user: HashMap<i32, Vec<Role>> = HashMap::new();
    if user_ids.is_empty() {
        return Ok(by_user);
    }

    let rows = sqlx::query_as::<_, UserRoleRow>(
        r#"
        SELECT ur.user_id, r.id, r.name, r.is_default, r.can_deleted, r.created_at, r.updated_at, r.deleted_at
        FROM user_role ur
        JOIN role r ON r.id = ur.role_id
        WHERE ur.user_id = ANY($1) AND r.deleted_at IS NULL
        ORDER BY r.id
        "#,
    )
    .bind(user_ids)
    .fetch_all(executor)
    .await?;

    for row in rows {
        by_user.entry(row.user_id).or_default().push(row.role);
    }
    Ok(by_user)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create(&self, payload: CreateUserPayload) -> Result<UserResponse> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO "user" (name, email, is_default, can_deleted)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(payload.is_default)
        .bind(payload.can_deleted)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = user.id, "Stored user");
        Ok(UserResponse::from_parts(user, Vec::new()))
    }

    async fn get(&self, id: i32) -> Result<Option<UserResponse>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM "user" WHERE id = $1 AND deleted_at IS NULL"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match user {
            Some(user) => Ok(Some(self.with_roles_one(user).await?)),
            None => Ok(None),
        }
    }

    async fn list_active(&self) -> Result<Vec<UserResponse>> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM "user" WHERE deleted_at IS NULL ORDER BY id"#
        ))
        .fetch_all(&self.pool)
        .await?;

        self.with_roles(users).await
    }

    async fn list_soft_deleted(&self) -> Result<Vec<UserResponse>> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM "user" WHERE deleted_at IS NOT NULL ORDER BY id"#
        ))
        .fetch_all(&self.pool)
        .await?;

        tracing::info!(count = users.len(), "Found soft-deleted users");
        self.with_roles(users).await
    }

    async fn update(&self, id: i32, payload: UpdateUserPayload) -> Result<Option<UserResponse>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE "user"
            SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                is_default = COALESCE($4, is_default),
                can_deleted = COALESCE($5, can_deleted),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.name)
        .bind(payload.email)
        .bind(payload.is_default)
        .bind(payload.can_deleted)
        .fetch_optional(&self.pool)
        .await?;

        match user {
            Some(user) => {
                tracing::info!(user_id = id, "Updated user");
                Ok(Some(self.with_roles_one(user).await?))
            }
            None => Ok(None),
        }
    }

    async fn soft_delete(&self, id: i32) -> Result<DeleteOutcome> {
        let mut tx = self.pool.begin().await?;

        let can_deleted: Option<bool> = sqlx::query_scalar(
            r#"SELECT can_deleted FROM "user" WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match can_deleted {
            None => {
                tracing::warn!(user_id = id, "User not found or already soft-deleted");
                DeleteOutcome::NotFound
            }
            Some(false) => {
                tracing::warn!(user_id = id, "User cannot be deleted (can_deleted=false)");
                DeleteOutcome::Protected
            }
            Some(true) => {
                sqlx::query(r#"UPDATE "user" SET deleted_at = NOW() WHERE id = $1"#)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                DeleteOutcome::Deleted
            }
        };

        tx.commit().await?;
        if outcome == DeleteOutcome::Deleted {
            tracing::info!(user_id = id, "Soft deleted user");
        }
        Ok(outcome)
    }

    async fn restore(&self, id: i32) -> Result<bool> {
        let res = sqlx::query(
            r#"UPDATE "user" SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL"#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        let restored = res.rows_affected() > 0;
        if restored {
            tracing::info!(user_id = id, "Restored user");
        }
        Ok(restored)
    }

    async fn hard_delete(&self, id: i32) -> Result<DeleteOutcome> {
        let mut tx = self.pool.begin().await?;

        let can_deleted: Option<bool> =
            sqlx::query_scalar(r#"SELECT can_deleted FROM "user" WHERE id = $1 FOR UPDATE"#)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let outcome = match can_deleted {
            None => DeleteOutcome::NotFound,
            Some(false) => DeleteOutcome::Protected,
            Some(true) => {
                sqlx::query(r#"DELETE FROM "user" WHERE id = $1"#)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                DeleteOutcome::Deleted
            }
        };

        tx.commit().await?;
        if outcome == DeleteOutcome::Deleted {
            tracing::info!(user_id = id, "Hard deleted user");
        }
        Ok(outcome)
    }

    async fn assign_role(&self, user_id: i32, role_id: i32) -> Result<UserResponse> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM "user" WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"#
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user) = user else {
            tx.rollback().await?;
            return Err(Error::NotFound("User not found".to_string()));
        };

        let inserted = sqlx::query("INSERT INTO user_role (user_id, role_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(role_id)
            .execute(&mut *tx)
            .await;

        if let Err(err) = inserted {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(user_id, role_id, error = %rollback_err, "Rollback failed");
            }
            return Err(match Error::from(err) {
                Error::Conflict(_) => Error::Conflict("Role already assigned to user".to_string()),
                other => other,
            });
        }

        // Projection is read under the row lock so nothing after commit can fail.
        let roles = active_roles_for(&mut *tx, &[user_id])
            .await?
            .remove(&user_id)
            .unwrap_or_default();

        tx.commit().await?;
        tracing::info!(user_id, role_id, "Database commit successful for role assignment");

        Ok(UserResponse::from_parts(user, roles))
    }
}
