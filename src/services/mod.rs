pub mod cache_service;
pub mod health_service;
pub mod role_service;
pub mod role_store;
pub mod search_service;
pub mod user_service;
pub mod user_store;
