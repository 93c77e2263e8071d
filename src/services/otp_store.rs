use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::RwLock;

use crate::errors::OtpError;
use crate::models::otp::OtpRecord;

/// Key-value backend for pending OTPs, keyed by mobile number.
///
/// Implementations only store; expiry and attempt rules live in `OtpService`.
#[async_trait]
pub trait OtpStore: Send + Sync {
    async fn get(&self, mobile_number: &str) -> Result<Option<OtpRecord>, OtpError>;

    /// Replaces any record for the number. `ttl` is a hint for backends that
    /// can evict on their own.
    async fn set(&self, mobile_number: &str, record: OtpRecord, ttl: Duration) -> Result<(), OtpError>;

    async fn delete(&self, mobile_number: &str) -> Result<(), OtpError>;

    fn backend_name(&self) -> &'static str;
}

#[derive(Default)]
pub struct InMemoryOtpStore {
    records: RwLock<HashMap<String, OtpRecord>>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn get(&self, mobile_number: &str) -> Result<Option<OtpRecord>, OtpError> {
        Ok(self.records.read().await.get(mobile_number).cloned())
    }

    async fn set(&self, mobile_number: &str, record: OtpRecord, _ttl: Duration) -> Result<(), OtpError> {
        self.records
            .write()
            .await
            .insert(mobile_number.to_string(), record);
        Ok(())
    }

    async fn delete(&self, mobile_number: &str) -> Result<(), OtpError> {
        self.records.write().await.remove(mobile_number);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Redis-backed store. Records are JSON under `otp:<mobile>` with a native
/// expiry, so abandoned OTPs are evicted without a sweeper.
#[derive(Clone)]
pub struct RedisOtpStore {
    conn: redis::aio::MultiplexedConnection,
}

impl RedisOtpStore {
    pub async fn connect(redis_url: &str) -> Result<Self, OtpError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| OtpError::store(format!("invalid Redis URL: {}", e)))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| OtpError::store(format!("Redis connection failed: {}", e)))?;
        Ok(Self { conn })
    }

    fn key(mobile_number: &str) -> String {
        format!("otp:{}", mobile_number)
    }
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    async fn get(&self, mobile_number: &str) -> Result<Option<OtpRecord>, OtpError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(Self::key(mobile_number))
            .await
            .map_err(|e| OtpError::store(format!("Redis GET failed: {}", e)))?;

        raw.map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| OtpError::store(format!("corrupt OTP record: {}", e)))
        })
        .transpose()
    }

    async fn set(&self, mobile_number: &str, record: OtpRecord, ttl: Duration) -> Result<(), OtpError> {
        let json = serde_json::to_string(&record)
            .map_err(|e| OtpError::store(format!("OTP record serialization failed: {}", e)))?;
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(Self::key(mobile_number))
            .arg(json)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| OtpError::store(format!("Redis SET failed: {}", e)))
    }

    async fn delete(&self, mobile_number: &str) -> Result<(), OtpError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::key(mobile_number))
            .await
            .map_err(|e| OtpError::store(format!("Redis DEL failed: {}", e)))
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
