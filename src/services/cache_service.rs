use async_trait::async_trait;
use bb8_redis::{
    bb8::{Pool, RunError},
    redis::{self, RedisError},
    RedisConnectionManager,
};

use crate::dto::user_dto::UserResponse;

pub type RedisPool = Pool<RedisConnectionManager>;

/// Well-known key holding the serialized "all users" listing.
pub const ALL_USERS_KEY: &str = "all_users";

/// Key of the free-form per-user cache entry. Not part of the listing invalidation.
pub fn cache_data_key(user_id: i32) -> String {
    format!("cache_data:{}", user_id)
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("cache command failed: {0}")]
    Command(#[from] RedisError),

    #[error("cache payload codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl From<RunError<RedisError>> for CacheError {
    fn from(err: RunError<RedisError>) -> Self {
        CacheError::Unavailable(err.to_string())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn ping(&self) -> Result<(), CacheError>;
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError>;
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    /// Deleting a missing key is a no-op.
    async fn invalidate(&self, key: &str) -> Result<(), CacheError>;
}

/// Drops the cached user listing. Failures are logged and swallowed.
pub async fn invalidate_user_listing(cache: &dyn CacheStore, reason: &str) {
    match cache.invalidate(ALL_USERS_KEY).await {
        Ok(()) => tracing::info!(reason, "Cache for 'all_users' invalidated"),
        Err(e) => tracing::warn!(
            reason,
            error = %e,
            "Failed to invalidate cache for 'all_users'"
        ),
    }
}

pub fn encode_users(users: &[UserResponse]) -> Result<String, CacheError> {
    Ok(serde_json::to_string(users)?)
}

pub fn decode_users(raw: &str) -> Result<Vec<UserResponse>, CacheError> {
    Ok(serde_json::from_str(raw)?)
}

#[derive(Clone)]
pub struct RedisCache {
    pool: RedisPool,
}

impl RedisCache {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        let pong: String = redis::cmd("PING").query_async(&mut *conn).await?;
        tracing::debug!(reply = %pong, "Redis ping");
        Ok(())
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut *conn)
            .await?;
        tracing::info!(key, ttl_secs, "Cached data");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.pool.get().await?;
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut *conn).await?;
        if value.is_some() {
            tracing::info!(key, "Cache hit");
        } else {
            tracing::info!(key, "Cache miss");
        }
        Ok(value)
    }

    async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        let removed: i64 = redis::cmd("DEL").arg(key).query_async(&mut *conn).await?;
        if removed > 0 {
            tracing::info!(key, "Cache invalidated");
        }
        Ok(())
    }
}
