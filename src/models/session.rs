use serde::{Deserialize, Serialize};

/// Claims carried by the session token issued after a successful OTP login.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String, // verified mobile number
    pub jti: String, // unique per login
    pub iat: usize,
    pub exp: usize,
}

impl SessionClaims {
    /// Identity used to key per-user integration state.
    pub fn caller_id(&self) -> &str {
        &self.sub
    }
}
