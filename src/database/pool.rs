use std::time::Duration;

use bb8_redis::{bb8::Pool, redis, RedisConnectionManager};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::services::cache_service::{CacheError, RedisPool};

pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .test_before_acquire(true)
        .connect(&config.database_url)
        .await?;
    tracing::info!("Database connection successful");
    Ok(pool)
}

/// Builds the Redis pool and waits until it answers PING, retrying a fixed number
/// of times.
pub async fn create_redis_pool(config: &Config) -> Result<RedisPool> {
    let manager = RedisConnectionManager::new(config.redis_url.as_str())
        .map_err(|e| Error::Config(format!("Invalid REDIS_URL: {}", e)))?;
    let pool = Pool::builder()
        .max_size(16)
        .build(manager)
        .await
        .map_err(|e| Error::ServiceUnavailable(format!("Redis pool setup failed: {}", e)))?;

    let attempts = config.connect_attempts.max(1);
    let delay = Duration::from_secs(config.connect_retry_delay_secs);
    let mut attempt = 1;
    loop {
        match ping_redis(&pool).await {
            Ok(()) => {
                tracing::info!("Redis connection successful");
                return Ok(pool);
            }
            Err(e) if attempt < attempts => {
                tracing::warn!(attempt, error = %e, "Redis not reachable yet, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(Error::ServiceUnavailable(format!(
                    "Redis unreachable after {} attempts: {}",
                    attempts, e
                )))
            }
        }
    }
}

async fn ping_redis(pool: &RedisPool) -> std::result::Result<(), CacheError> {
    let mut conn = pool.get().await?;
    let _: String = redis::cmd("PING").query_async(&mut *conn).await?;
    Ok(())
}
