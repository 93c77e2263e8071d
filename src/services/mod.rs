pub mod billing_connector;
pub mod inventory_connector;
pub mod key_locks;
pub mod notification_service;
pub mod otp_service;
pub mod otp_store;
pub mod token_service;
pub mod vyapar_connector;
