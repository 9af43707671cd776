pub mod health_dto;
pub mod role_dto;
pub mod user_dto;
