pub mod auth_otp_routes;
pub mod forecast;
pub mod integration;
