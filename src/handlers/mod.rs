pub(crate) mod auth_otp;
pub(crate) mod forecast;
pub(crate) mod integration;
