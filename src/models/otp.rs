use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pending OTP for one mobile number.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub code: String,              // 6-digit OTP
    pub expires_at: DateTime<Utc>, // When OTP expires
    pub attempts: u32,             // Failed attempts since issuance
}

impl OtpRecord {
    pub fn new(code: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            code,
            expires_at,
            attempts: 0,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
