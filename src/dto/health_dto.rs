use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CONNECTED: &str = "connected";
pub const FAILED: &str = "failed";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub postgresql: String,
    pub redis: String,
    pub elasticsearch: String,
    pub details: BTreeMap<String, String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        [&self.postgresql, &self.redis, &self.elasticsearch]
            .iter()
            .all(|s| s.as_str() == CONNECTED)
    }
}
