use std::sync::Arc;

use crate::config::Config;
use crate::dto::user_dto::{CreateUserPayload, UpdateUserPayload, UserResponse, UserSearchHit};
use crate::error::{Error, Result};
use crate::models::DeleteOutcome;
use crate::services::{
    cache_service::{
        cache_data_key, decode_users, encode_users, invalidate_user_listing, CacheStore,
        ALL_USERS_KEY,
    },
    role_store::RoleStore,
    search_service::{SearchIndex, UserDocument},
    user_store::UserStore,
};

#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    pub listing_ttl_secs: u64,
    pub cache_data_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            listing_ttl_secs: 300,
            cache_data_ttl_secs: 3600,
        }
    }
}

impl From<&Config> for CacheSettings {
    fn from(config: &Config) -> Self {
        Self {
            listing_ttl_secs: config.users_cache_ttl_secs,
            cache_data_ttl_secs: config.cache_data_ttl_secs,
        }
    }
}

/// Coordinates every user write across the primary store, the search index and the
/// listing cache.
///
/// The primary-store call is the only step that can fail a request. Index and cache
/// calls run after it has committed and their errors are logged, never returned.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    cache: Arc<dyn CacheStore>,
    index: Arc<dyn SearchIndex>,
    settings: CacheSettings,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        cache: Arc<dyn CacheStore>,
        index: Arc<dyn SearchIndex>,
        settings: CacheSettings,
    ) -> Self {
        Self {
            users,
            roles,
            cache,
            index,
            settings,
        }
    }

    pub async fn create(&self, payload: CreateUserPayload) -> Result<UserResponse> {
        let user = self.users.create(payload).await?;
        self.index_user(&user).await;
        invalidate_user_listing(self.cache.as_ref(), "user creation").await;
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<UserResponse>> {
        if let Some(users) = self.cached_listing().await {
            tracing::info!(count = users.len(), "Retrieved cached data for all users");
            return Ok(users);
        }

        tracing::info!("Cache miss, querying database for all users");
        let users = self.users.list_active().await?;
        self.populate_listing(&users).await;
        Ok(users)
    }

    pub async fn get(&self, id: i32) -> Result<UserResponse> {
        self.users
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    pub async fn list_soft_deleted(&self) -> Result<Vec<UserResponse>> {
        let users = self.users.list_soft_deleted().await?;
        if users.is_empty() {
            tracing::warn!("No soft-deleted users found");
        }
        Ok(users)
    }

    pub async fn update(&self, id: i32, payload: UpdateUserPayload) -> Result<UserResponse> {
        let user = self
            .users
            .update(id, payload)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        self.index_user(&user).await;
        invalidate_user_listing(self.cache.as_ref(), "user update").await;
        Ok(user)
    }

    pub async fn soft_delete(&self, id: i32) -> Result<()> {
        match self.users.soft_delete(id).await? {
            DeleteOutcome::Deleted => {}
            DeleteOutcome::NotFound => {
                return Err(Error::NotFound(
                    "User not found or already soft-deleted".to_string(),
                ))
            }
            DeleteOutcome::Protected => {
                return Err(Error::Conflict("User cannot be deleted".to_string()))
            }
        }
        self.unindex_user(id).await;
        invalidate_user_listing(self.cache.as_ref(), "user soft-delete").await;
        Ok(())
    }

    /// Restored users are not re-indexed; their document stays absent until the next
    /// update or role assignment.
    pub async fn restore(&self, id: i32) -> Result<()> {
        if !self.users.restore(id).await? {
            return Err(Error::NotFound(
                "User not found or not soft deleted".to_string(),
            ));
        }
        invalidate_user_listing(self.cache.as_ref(), "user restore").await;
        Ok(())
    }

    pub async fn hard_delete(&self, id: i32) -> Result<()> {
        match self.users.hard_delete(id).await? {
            DeleteOutcome::Deleted => {}
            DeleteOutcome::NotFound => {
                return Err(Error::NotFound("User not found".to_string()))
            }
            DeleteOutcome::Protected => {
                return Err(Error::Conflict("User cannot be deleted".to_string()))
            }
        }
        self.unindex_user(id).await;
        invalidate_user_listing(self.cache.as_ref(), "user hard-delete").await;
        Ok(())
    }

    pub async fn assign_role(&self, user_id: i32, role_id: i32) -> Result<UserResponse> {
        tracing::info!(user_id, role_id, "Attempting to assign role to user");
        let user = self.get(user_id).await?;
        let role = self
            .roles
            .get(role_id)
            .await?
            .ok_or_else(|| Error::NotFound("Role not found".to_string()))?;

        if user.has_role(role.id) {
            return Err(Error::Conflict("Role already assigned to user".to_string()));
        }

        let updated = self.users.assign_role(user_id, role_id).await?;
        invalidate_user_listing(self.cache.as_ref(), "role assignment").await;
        self.index_user(&updated).await;
        Ok(updated)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<UserSearchHit>> {
        let hits = self.index.search(query).await.map_err(|e| {
            tracing::error!(query, error = %e, "Search failed");
            Error::from(e)
        })?;
        Ok(hits)
    }

    pub async fn put_cache_data(&self, user_id: i32, data: &str) -> Result<()> {
        self.cache
            .set(
                &cache_data_key(user_id),
                data,
                self.settings.cache_data_ttl_secs,
            )
            .await?;
        Ok(())
    }

    pub async fn get_cache_data(&self, user_id: i32) -> Result<String> {
        self.cache
            .get(&cache_data_key(user_id))
            .await?
            .ok_or_else(|| Error::NotFound("Cached data not found".to_string()))
    }

    async fn cached_listing(&self) -> Option<Vec<UserResponse>> {
        let raw = match self.cache.get(ALL_USERS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read cached user listing");
                return None;
            }
        };

        match decode_users(&raw) {
            Ok(users) => Some(users),
            Err(e) => {
                tracing::error!(error = %e, "Failed to process cached data");
                None
            }
        }
    }

    async fn populate_listing(&self, users: &[UserResponse]) {
        let raw = match encode_users(users) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize user listing for caching");
                return;
            }
        };
        if let Err(e) = self
            .cache
            .set(ALL_USERS_KEY, &raw, self.settings.listing_ttl_secs)
            .await
        {
            tracing::warn!(error = %e, "Failed to cache data");
        }
    }

    async fn index_user(&self, user: &UserResponse) {
        if let Err(e) = self.index.upsert(user.id, &UserDocument::from(user)).await {
            tracing::error!(user_id = user.id, error = %e, "Failed to index user");
        }
    }

    async fn unindex_user(&self, id: i32) {
        if let Err(e) = self.index.delete(id).await {
            tracing::error!(user_id = id, error = %e, "Failed to delete user from index");
        }
    }
}
