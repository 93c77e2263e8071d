// src/errors.rs
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Outcomes of the OTP flow that are not a successful login.
///
/// `Display` is the guidance shown to the end user, so every variant reads
/// as a complete sentence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("{0}")]
    Validation(String),

    #[error("No OTP request found for this mobile number or OTP expired. Please request a new OTP.")]
    NotFound,

    #[error("OTP has expired. Please request a new one.")]
    Expired,

    #[error("Maximum verification attempts reached. Please request a new OTP.")]
    AttemptsExhausted,

    #[error("Invalid OTP. {}", remaining_hint(.remaining))]
    InvalidCode { remaining: u32 },

    #[error("OTP store error: {0}")]
    Store(String),

    #[error("Session token error: {0}")]
    TokenIssue(String),
}

fn remaining_hint(remaining: &u32) -> String {
    if *remaining > 0 {
        format!("{} attempts remaining.", remaining)
    } else {
        "No attempts remaining. Request a new OTP.".to_string()
    }
}

impl OtpError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        OtpError::Validation(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        OtpError::Store(msg.into())
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),

    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Vyapar session token expired. Please reconnect.")]
    VyaparSessionExpired,

    #[error("Vyapar not connected for this user. Please authenticate with Vyapar first.")]
    NotConnected,

    #[error("{0}")]
    NotFound(String),

    #[error("Upstream error: {detail}")]
    Upstream { public: String, detail: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            AppError::Otp(OtpError::Store(detail) | OtpError::TokenIssue(detail)) => {
                tracing::error!("OTP flow failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error.".to_string(),
                )
            }
            AppError::Otp(otp) => (StatusCode::BAD_REQUEST, otp_error_code(otp), otp.to_string()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            AppError::VyaparSessionExpired => {
                (StatusCode::UNAUTHORIZED, "session_expired", self.to_string())
            }
            AppError::NotConnected => (StatusCode::FORBIDDEN, "not_connected", self.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::Upstream { public, detail } => {
                tracing::error!("Upstream failure: {}", detail);
                (StatusCode::BAD_GATEWAY, "upstream_error", public.clone())
            }
            AppError::Internal(detail) | AppError::ConfigurationError(detail) => {
                tracing::error!("Internal failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "error": error,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

fn otp_error_code(err: &OtpError) -> &'static str {
    match err {
        OtpError::Validation(_) => "validation_error",
        OtpError::NotFound => "otp_not_found",
        OtpError::Expired => "otp_expired",
        OtpError::AttemptsExhausted => "otp_attempts_exhausted",
        OtpError::InvalidCode { .. } => "otp_invalid",
        OtpError::Store(_) | OtpError::TokenIssue(_) => "internal_error",
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Invalid request.".to_string());
        AppError::ValidationError(message)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match &rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Request body must be JSON (Content-Type: application/json).".to_string()
            }
            _ => format!("Invalid request body: {}", rejection.body_text()),
        };
        tracing::debug!("Rejected request body: {}", rejection);
        AppError::ValidationError(message)
    }
}

// Helper conversion functions
impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn upstream(public: impl Into<String>, detail: impl Into<String>) -> Self {
        AppError::Upstream {
            public: public.into(),
            detail: detail.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::ConfigurationError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
