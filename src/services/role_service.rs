use std::sync::Arc;

use crate::dto::role_dto::{CreateRolePayload, UpdateRolePayload};
use crate::error::{Error, Result};
use crate::models::{role::Role, DeleteOutcome};
use crate::services::{
    cache_service::{invalidate_user_listing, CacheStore},
    role_store::RoleStore,
};

/// Role writes. Roles are embedded in cached user projections, so any change to an
/// existing role drops the user listing afterwards.
#[derive(Clone)]
pub struct RoleService {
    roles: Arc<dyn RoleStore>,
    cache: Arc<dyn CacheStore>,
}

impl RoleService {
    pub fn new(roles: Arc<dyn RoleStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self { roles, cache }
    }

    pub async fn create(&self, payload: CreateRolePayload) -> Result<Role> {
        self.roles.create(payload).await
    }

    pub async fn list(&self) -> Result<Vec<Role>> {
        self.roles.list_active().await
    }

    pub async fn list_soft_deleted(&self) -> Result<Vec<Role>> {
        self.roles.list_soft_deleted().await
    }

    pub async fn get(&self, id: i32) -> Result<Role> {
        self.roles
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound("Role not found".to_string()))
    }

    pub async fn update(&self, id: i32, payload: UpdateRolePayload) -> Result<Role> {
        let role = self
            .roles
            .update(id, payload)
            .await?
            .ok_or_else(|| Error::NotFound("Role not found".to_string()))?;
        invalidate_user_listing(self.cache.as_ref(), "role update").await;
        Ok(role)
    }

    pub async fn soft_delete(&self, id: i32) -> Result<()> {
        check_delete(self.roles.soft_delete(id).await?)?;
        invalidate_user_listing(self.cache.as_ref(), "role soft-delete").await;
        Ok(())
    }

    pub async fn restore(&self, id: i32) -> Result<()> {
        if !self.roles.restore(id).await? {
            return Err(Error::NotFound(
                "Role not found or not soft deleted".to_string(),
            ));
        }
        invalidate_user_listing(self.cache.as_ref(), "role restore").await;
        Ok(())
    }

    pub async fn hard_delete(&self, id: i32) -> Result<()> {
        check_delete(self.roles.hard_delete(id).await?)?;
        invalidate_user_listing(self.cache.as_ref(), "role hard-delete").await;
        Ok(())
    }
}

fn check_delete(outcome: DeleteOutcome) -> Result<()> {
    match outcome {
        DeleteOutcome::Deleted => Ok(()),
        DeleteOutcome::NotFound => Err(Error::NotFound("Role not found".to_string())),
        DeleteOutcome::Protected => Err(Error::Conflict("Role cannot be deleted".to_string())),
    }
}
