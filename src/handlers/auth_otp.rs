use axum::{extract::State, Json};
use validator::Validate;

use crate::dtos::auth_dtos::{RequestOtpRequest, RequestOtpResponse, VerifyOtpRequest, VerifyOtpResponse};
use crate::errors::Result;
use crate::extractors::AppJson;
use crate::state::AppState;

// POST /api/auth/request-otp
pub async fn request_otp(
    State(state): State<AppState>,
    AppJson(req): AppJson<RequestOtpRequest>,
) -> Result<Json<RequestOtpResponse>> {
    req.validate()?;

    let issued = state.otp_service.request_otp(&req.mobile_number).await?;

    Ok(Json(RequestOtpResponse {
        success: true,
        message: issued.message,
    }))
}

// POST /api/auth/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    AppJson(req): AppJson<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>> {
    req.validate()?;

    let verified = state
        .otp_service
        .verify_otp(&req.mobile_number, &req.otp)
        .await?;

    Ok(Json(VerifyOtpResponse {
        success: true,
        message: verified.message,
        token: verified.token,
    }))
}
