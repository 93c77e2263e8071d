pub mod auth_dtos;
pub mod integration_dtos;
