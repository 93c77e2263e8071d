// config.rs
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{AppError, Result};

const DEV_JWT_SECRET: &str = "dev-secret-change-in-production";
const MAX_OTP_TTL_SECONDS: u64 = 24 * 60 * 60;
const MAX_SESSION_TOKEN_TTL_MINUTES: u64 = 365 * 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpStoreKind {
    Memory,
    Redis,
}

impl OtpStoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpStoreKind::Memory => "memory",
            OtpStoreKind::Redis => "redis",
        }
    }
}

impl FromStr for OtpStoreKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "" => Ok(OtpStoreKind::Memory),
            "redis" => Ok(OtpStoreKind::Redis),
            other => Err(AppError::configuration(format!(
                "OTP_STORE must be 'memory' or 'redis', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub session_token_ttl: Duration,
    pub otp_ttl: Duration,
    pub otp_max_attempts: u32,
    pub notification_timeout: Duration,
    pub otp_store: OtpStoreKind,
    pub redis_url: String,
    pub whatsapp_sender_number: String,
    pub whatsapp_api_key: Option<String>,
    pub simulated_latency: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            session_token_ttl: Duration::from_secs(60 * 60),
            otp_ttl: Duration::from_secs(5 * 60),
            otp_max_attempts: 3,
            notification_timeout: Duration::from_millis(5_000),
            otp_store: OtpStoreKind::Memory,
            redis_url: "redis://127.0.0.1/".to_string(),
            whatsapp_sender_number: "+14155238886".to_string(),
            whatsapp_api_key: None,
            simulated_latency: Duration::from_millis(500),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, falling back to
    /// `AppConfig::default()` for anything unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.trim().is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                defaults.jwt_secret.clone()
            }
        };

        let otp_ttl_secs: u64 = parse_or(&lookup, "OTP_TTL_SECONDS", defaults.otp_ttl.as_secs())?;
        if otp_ttl_secs == 0 || otp_ttl_secs > MAX_OTP_TTL_SECONDS {
            return Err(AppError::configuration(format!(
                "OTP_TTL_SECONDS must be between 1 and {}",
                MAX_OTP_TTL_SECONDS
            )));
        }

        let session_ttl_minutes: u64 = parse_or(
            &lookup,
            "SESSION_TOKEN_TTL_MINUTES",
            defaults.session_token_ttl.as_secs() / 60,
        )?;
        let session_token_ttl = session_ttl_minutes
            .checked_mul(60)
            .filter(|_| (1..=MAX_SESSION_TOKEN_TTL_MINUTES).contains(&session_ttl_minutes))
            .map(Duration::from_secs)
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "SESSION_TOKEN_TTL_MINUTES must be between 1 and {}",
                    MAX_SESSION_TOKEN_TTL_MINUTES
                ))
            })?;

        let otp_max_attempts: u32 = parse_or(&lookup, "OTP_MAX_ATTEMPTS", defaults.otp_max_attempts)?;
        if otp_max_attempts == 0 {
            return Err(AppError::configuration("OTP_MAX_ATTEMPTS must be at least 1"));
        }

        let otp_store = match lookup("OTP_STORE") {
            Some(raw) => raw.parse()?,
            None => defaults.otp_store,
        };

        Ok(AppConfig {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            jwt_secret,
            session_token_ttl,
            otp_ttl: Duration::from_secs(otp_ttl_secs),
            otp_max_attempts,
            notification_timeout: Duration::from_millis(parse_or(
                &lookup,
                "NOTIFICATION_TIMEOUT_MS",
                defaults.notification_timeout.as_millis() as u64,
            )?),
            otp_store,
            redis_url: lookup("REDIS_URL").unwrap_or(defaults.redis_url),
            whatsapp_sender_number: lookup("WHATSAPP_SENDER_NUMBER")
                .unwrap_or(defaults.whatsapp_sender_number),
            whatsapp_api_key: lookup("WHATSAPP_API_KEY").filter(|k| !k.is_empty()),
            simulated_latency: Duration::from_millis(parse_or(
                &lookup,
                "SIMULATED_LATENCY_MS",
                defaults.simulated_latency.as_millis() as u64,
            )?),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn get_config_info(&self) -> serde_json::Value {
        serde_json::json!({
            "bind": self.bind_address(),
            "otp_store": self.otp_store.as_str(),
            "otp_ttl_secs": self.otp_ttl.as_secs(),
            "otp_max_attempts": self.otp_max_attempts,
            "notification_timeout_ms": self.notification_timeout.as_millis() as u64,
            "session_token_ttl_secs": self.session_token_ttl.as_secs(),
            "jwt_secret_is_default": self.jwt_secret == DEV_JWT_SECRET,
            "whatsapp_api_key_set": self.whatsapp_api_key.is_some(),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::configuration(format!("{} is invalid ({}): {}", key, raw, e))),
        None => Ok(default),
    }
}
