pub mod inventory;
pub mod otp;
pub mod session;
