use axum::{routing::post, Router};

use crate::{handlers::auth_otp, state::AppState};

pub fn auth_otp_routes() -> Router<AppState> {
    Router::new()
        // Request OTP for a mobile number
        .route("/request-otp", post(auth_otp::request_otp))
        // Verify OTP and receive a session token
        .route("/verify-otp", post(auth_otp::verify_otp))
}
