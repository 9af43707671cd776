use std::collections::BTreeMap;
use std::sync::Arc;

use crate::dto::health_dto::{HealthStatus, CONNECTED, FAILED};
use crate::services::{cache_service::CacheStore, search_service::SearchIndex, user_store::UserStore};

#[derive(Clone)]
pub struct HealthService {
    users: Arc<dyn UserStore>,
    cache: Arc<dyn CacheStore>,
    index: Arc<dyn SearchIndex>,
}

impl HealthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        cache: Arc<dyn CacheStore>,
        index: Arc<dyn SearchIndex>,
    ) -> Self {
        Self {
            users,
            cache,
            index,
        }
    }

    /// Probes all three stores concurrently.
    pub async fn check(&self) -> HealthStatus {
        let (db, redis, es) = tokio::join!(
            self.users.ping(),
            self.cache.ping(),
            self.index.cluster_status()
        );

        let mut details = BTreeMap::new();

        let postgresql = match db {
            Ok(()) => {
                details.insert("postgresql".to_string(), "Successfully executed SELECT 1".to_string());
                CONNECTED
            }
            Err(e) => {
                tracing::error!(error = %e, "PostgreSQL health check failed");
                details.insert("postgresql".to_string(), format!("Error: {}", e));
                FAILED
            }
        };

        let redis = match redis {
            Ok(()) => {
                details.insert("redis".to_string(), "PING returned PONG".to_string());
                CONNECTED
            }
            Err(e) => {
                tracing::error!(error = %e, "Redis health check failed");
                details.insert("redis".to_string(), format!("Error: {}", e));
                FAILED
            }
        };

        let elasticsearch = match es {
            Ok(status) => {
                details.insert(
                    "elasticsearch".to_string(),
                    format!("Cluster health status: {}", status),
                );
                if status == "green" || status == "yellow" {
                    CONNECTED
                } else {
                    FAILED
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Elasticsearch health check failed");
                details.insert("elasticsearch".to_string(), format!("Error: {}", e));
                FAILED
            }
        };

        HealthStatus {
            postgresql: postgresql.to_string(),
            redis: redis.to_string(),
            elasticsearch: elasticsearch.to_string(),
            details,
        }
    }
}
