pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    cache_service::{CacheStore, RedisCache, RedisPool},
    health_service::HealthService,
    role_service::RoleService,
    role_store::{PgRoleStore, RoleStore},
    search_service::{wait_for_search_index, ElasticsearchIndex, SearchIndex},
    user_service::{CacheSettings, UserService},
    user_store::{PgUserStore, UserStore},
};

/// The four store handles every service is built from.
#[derive(Clone)]
pub struct Gateways {
    pub users: Arc<dyn UserStore>,
    pub roles: Arc<dyn RoleStore>,
    pub cache: Arc<dyn CacheStore>,
    pub index: Arc<dyn SearchIndex>,
}

impl Gateways {
    /// Wraps already-open pools and probes the search index. An unreachable index is
    /// logged and tolerated.
    pub async fn connect(pool: PgPool, redis: RedisPool, config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        let index = ElasticsearchIndex::new(
            http_client,
            config.elasticsearch_url.as_str(),
            config.elasticsearch_index.as_str(),
        );
        wait_for_search_index(
            &index,
            config.connect_attempts,
            Duration::from_secs(config.connect_retry_delay_secs),
        )
        .await;

        Ok(Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            roles: Arc::new(PgRoleStore::new(pool)),
            cache: Arc::new(RedisCache::new(redis)),
            index: Arc::new(index),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub role_service: RoleService,
    pub health_service: HealthService,
}

impl AppState {
    pub fn new(gateways: Gateways, settings: CacheSettings) -> Self {
        let user_service = UserService::new(
            gateways.users.clone(),
            gateways.roles.clone(),
            gateways.cache.clone(),
            gateways.index.clone(),
            settings,
        );
        let role_service = RoleService::new(gateways.roles, gateways.cache.clone());
        let health_service = HealthService::new(gateways.users, gateways.cache, gateways.index);

        Self {
            user_service,
            role_service,
            health_service,
        }
    }
}
