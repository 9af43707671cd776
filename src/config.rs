use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub redis_url: String,
    pub elasticsearch_url: String,
    pub elasticsearch_index: String,
    pub users_cache_ttl_secs: u64,
    pub cache_data_ttl_secs: u64,
    pub connect_attempts: u32,
    pub connect_retry_delay_secs: u64,
    pub log_format: LogFormat,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let database_url = match env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => format!(
                "postgres://{}:{}@{}:{}/{}",
                get_env_or("POSTGRES_USER", "admin"),
                get_env_or("POSTGRES_PASSWORD", "admin123"),
                get_env_or("POSTGRES_HOST", "localhost"),
                get_env_parse_or::<u16>("POSTGRES_PORT", 5432)?,
                get_env_or("POSTGRES_DB", "myapp"),
            ),
        };

        let redis_url = match env::var("REDIS_URL") {
            Ok(url) => url,
            Err(_) => format!(
                "redis://{}:{}",
                get_env_or("REDIS_HOST", "localhost"),
                get_env_parse_or::<u16>("REDIS_PORT", 6379)?,
            ),
        };

        let elasticsearch_url = match env::var("ELASTICSEARCH_URL") {
            Ok(url) => url,
            Err(_) => format!(
                "http://{}:{}",
                get_env_or("ELASTICSEARCH_HOST", "localhost"),
                get_env_parse_or::<u16>("ELASTICSEARCH_PORT", 9200)?,
            ),
        };

        let log_format = match get_env_or("LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => {
                return Err(Error::Config(format!(
                    "Invalid value for LOG_FORMAT: {}",
                    other
                )))
            }
        };

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:8000"),
            database_url,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            redis_url,
            elasticsearch_url,
            elasticsearch_index: get_env_or("ELASTICSEARCH_INDEX", "users"),
            users_cache_ttl_secs: get_env_parse_or("USERS_CACHE_TTL_SECS", 300)?,
            cache_data_ttl_secs: get_env_parse_or("CACHE_DATA_TTL_SECS", 3600)?,
            connect_attempts: get_env_parse_or("CONNECT_ATTEMPTS", 5)?,
            connect_retry_delay_secs: get_env_parse_or("CONNECT_RETRY_DELAY_SECS", 2)?,
            log_format,
        })
    }
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
