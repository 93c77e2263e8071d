use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;

use crate::errors::OtpError;
use crate::models::otp::OtpRecord;
use crate::services::key_locks::KeyedLocks;
use crate::services::notification_service::{DeliveryReport, NotificationSender};
use crate::services::otp_store::OtpStore;
use crate::services::token_service::SessionTokenService;

#[derive(Debug, Clone, Copy)]
pub struct OtpPolicy {
    pub ttl: Duration,
    pub max_attempts: u32,
    pub notification_timeout: Duration,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            max_attempts: 3,
            notification_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OtpIssued {
    pub message: String,
    pub delivery: DeliveryReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct OtpVerified {
    pub message: String,
    pub token: String,
}

/// Owns every pending OTP: issues codes, checks them, and hands out a
/// session token on the first correct answer.
///
/// Per number the record moves `Pending -> {Verified, Expired, Exhausted}`;
/// every terminal transition deletes it. Calls for the same number are
/// serialised through `KeyedLocks`.
pub struct OtpService {
    store: Arc<dyn OtpStore>,
    sender: Arc<dyn NotificationSender>,
    tokens: Arc<SessionTokenService>,
    locks: KeyedLocks,
    policy: OtpPolicy,
}

impl OtpService {
    pub fn new(
        store: Arc<dyn OtpStore>,
        sender: Arc<dyn NotificationSender>,
        tokens: Arc<SessionTokenService>,
        policy: OtpPolicy,
    ) -> Self {
        Self {
            store,
            sender,
            tokens,
            locks: KeyedLocks::new(),
            policy,
        }
    }

    pub fn policy(&self) -> OtpPolicy {
        self.policy
    }

    pub fn store_backend(&self) -> &'static str {
        self.store.backend_name()
    }

    // Generate 6-digit OTP
    pub fn generate_otp() -> String {
        let mut rng = rand::thread_rng();
        format!("{:06}", rng.gen_range(100_000..=999_999))
    }

    pub fn is_valid_mobile_number(mobile_number: &str) -> bool {
        (10..=15).contains(&mobile_number.len()) && mobile_number.bytes().all(|b| b.is_ascii_digit())
    }

    fn render_message(&self, code: &str) -> String {
        let minutes = (self.policy.ttl.as_secs() / 60).max(1);
        format!("Your OTP is: {}. Valid for {} minutes.", code, minutes)
    }

    pub async fn request_otp(&self, mobile_number: &str) -> Result<OtpIssued, OtpError> {
        if !Self::is_valid_mobile_number(mobile_number) {
            return Err(OtpError::invalid_input(
                "Valid mobile number is required (10-15 digits).",
            ));
        }

        let code = Self::generate_otp();
        let expires_at = chrono::Duration::from_std(self.policy.ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| OtpError::store(format!("OTP TTL {:?} is out of range", self.policy.ttl)))?;

        {
            let _guard = self.locks.acquire(mobile_number).await;
            self.store
                .set(mobile_number, OtpRecord::new(code.clone(), expires_at), self.policy.ttl)
                .await?;
        }

        tracing::info!("OTP issued for {} (expires {})", mobile_number, expires_at.to_rfc3339());
        tracing::debug!("OTP for {}: {}", mobile_number, code);

        let delivery = self.notify(mobile_number, &self.render_message(&code)).await;
        let message = if delivery.delivered {
            tracing::info!(
                "OTP notification sent to {}, message id {}",
                mobile_number,
                delivery.message_id.as_deref().unwrap_or("-")
            );
            "OTP generated and WhatsApp notification sent."
        } else {
            tracing::warn!(
                "OTP generated for {}, but notification failed: {}",
                mobile_number,
                delivery.error.as_deref().unwrap_or("unknown error")
            );
            "OTP generated (WhatsApp failed, see logs)."
        };

        Ok(OtpIssued {
            message: message.to_string(),
            delivery,
        })
    }

    /// Runs the sender on its own task; a panic or a timeout becomes a
    /// failed report.
    async fn notify(&self, mobile_number: &str, message: &str) -> DeliveryReport {
        let timeout = self.policy.notification_timeout;
        let sender = Arc::clone(&self.sender);
        let destination = mobile_number.to_string();
        let message = message.to_string();
        let mut send = tokio::spawn(async move { sender.send(&destination, &message).await });

        match tokio::time::timeout(timeout, &mut send).await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) if e.is_panic() => {
                tracing::error!("Notification sender panicked while sending to {}", mobile_number);
                DeliveryReport::failed("sender panicked")
            }
            Ok(Err(e)) => DeliveryReport::failed(format!("notification task failed: {}", e)),
            Err(_) => {
                send.abort();
                DeliveryReport::failed(format!(
                    "notification timed out after {} ms",
                    timeout.as_millis()
                ))
            }
        }
    }

    pub async fn verify_otp(&self, mobile_number: &str, otp: &str) -> Result<OtpVerified, OtpError> {
        if mobile_number.is_empty() || otp.is_empty() {
            return Err(OtpError::invalid_input("Mobile number and OTP are required."));
        }

        let _guard = self.locks.acquire(mobile_number).await;

        let mut record = self
            .store
            .get(mobile_number)
            .await?
            .ok_or(OtpError::NotFound)?;

        let now = Utc::now();
        if record.is_expired_at(now) {
            self.store.delete(mobile_number).await?;
            tracing::warn!("Expired OTP presented for {}", mobile_number);
            return Err(OtpError::Expired);
        }

        if record.attempts >= self.policy.max_attempts {
            self.store.delete(mobile_number).await?;
            tracing::warn!("OTP for {} invalidated after too many attempts", mobile_number);
            return Err(OtpError::AttemptsExhausted);
        }

        if record.code == otp {
            let token = self
                .tokens
                .issue(mobile_number)
                .map_err(|e| OtpError::TokenIssue(e.to_string()))?;
            self.store.delete(mobile_number).await?;
            tracing::info!("OTP verified for {}", mobile_number);
            return Ok(OtpVerified {
                message: "OTP verified successfully. Login successful.".to_string(),
                token,
            });
        }

        record.attempts += 1;
        let remaining = self.policy.max_attempts.saturating_sub(record.attempts);
        if remaining == 0 {
            // Last allowed attempt used up: the record must not linger.
            self.store.delete(mobile_number).await?;
            tracing::warn!("OTP for {} invalidated after too many attempts", mobile_number);
        } else {
            let ttl_left = (record.expires_at - now).to_std().unwrap_or(Duration::ZERO);
            self.store.set(mobile_number, record, ttl_left).await?;
        }

        Err(OtpError::InvalidCode { remaining })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::otp_store::InMemoryOtpStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl NotificationSender for RecordingSender {
        async fn send(&self, destination: &str, message: &str) -> DeliveryReport {
            self.sent
                .lock()
                .unwrap()
                .push((destination.to_string(), message.to_string()));
            DeliveryReport::delivered("test-message")
        }
    }

    struct FailingSender;

    #[async_trait]
    impl NotificationSender for FailingSender {
        async fn send(&self, _destination: &str, _message: &str) -> DeliveryReport {
            DeliveryReport::failed("provider unavailable")
        }
    }

    struct StalledSender;

    #[async_trait]
    impl NotificationSender for StalledSender {
        async fn send(&self, _destination: &str, _message: &str) -> DeliveryReport {
            tokio::time::sleep(Duration::from_secs(60)).await;
            DeliveryReport::delivered("too-late")
        }
    }

    struct PanickingSender;

    #[async_trait]
    impl NotificationSender for PanickingSender {
        async fn send(&self, _destination: &str, _message: &str) -> DeliveryReport {
            panic!("provider client bug");
        }
    }

    fn tokens() -> Arc<SessionTokenService> {
        Arc::new(SessionTokenService::new("test-secret", Duration::from_secs(3600)))
    }

    fn service_with(sender: Arc<dyn NotificationSender>, policy: OtpPolicy) -> (OtpService, Arc<InMemoryOtpStore>) {
        let store = Arc::new(InMemoryOtpStore::new());
        let service = OtpService::new(store.clone(), sender, tokens(), policy);
        (service, store)
    }

    fn service() -> (OtpService, Arc<InMemoryOtpStore>) {
        service_with(Arc::new(RecordingSender::default()), OtpPolicy::default())
    }

    async fn pending_code(store: &InMemoryOtpStore, mobile: &str) -> String {
        store.get(mobile).await.unwrap().expect("pending OTP").code
    }

    fn wrong_code(code: &str) -> String {
        if code == "000000" { "111111".to_string() } else { "000000".to_string() }
    }

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..1_000 {
            let code = OtpService::generate_otp();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn mobile_number_format() {
        assert!(OtpService::is_valid_mobile_number("9876543210"));
        assert!(OtpService::is_valid_mobile_number("123456789012345"));
        assert!(!OtpService::is_valid_mobile_number("123456789"));
        assert!(!OtpService::is_valid_mobile_number("1234567890123456"));
        assert!(!OtpService::is_valid_mobile_number("+919876543210"));
        assert!(!OtpService::is_valid_mobile_number("invalid-phone"));
        assert!(!OtpService::is_valid_mobile_number(""));
    }

    #[tokio::test]
    async fn invalid_number_is_rejected_without_touching_the_store() {
        let (service, store) = service();
        let err = service.request_otp("invalid-phone").await.unwrap_err();
        assert!(matches!(err, OtpError::Validation(_)));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn request_stores_record_and_notifies_with_code() {
        let sender = Arc::new(RecordingSender::default());
        let (service, store) = service_with(sender.clone(), OtpPolicy::default());

        let issued = service.request_otp("9876543210").await.unwrap();
        assert!(issued.delivery.delivered);

        let record = store.get("9876543210").await.unwrap().unwrap();
        assert_eq!(record.attempts, 0);
        assert!(record.expires_at > Utc::now());

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "9876543210");
        assert!(sent[0].1.contains(&record.code));
    }

    #[tokio::test]
    async fn second_request_replaces_record_and_resets_attempts() {
        let (service, store) = service();
        service.request_otp("9876543210").await.unwrap();
        let first = pending_code(&store, "9876543210").await;

        service.verify_otp("9876543210", &wrong_code(&first)).await.unwrap_err();
        service.verify_otp("9876543210", &wrong_code(&first)).await.unwrap_err();
        assert_eq!(store.get("9876543210").await.unwrap().unwrap().attempts, 2);

        service.request_otp("9876543210").await.unwrap();
        let record = store.get("9876543210").await.unwrap().unwrap();
        assert_eq!(record.attempts, 0);

        // The fresh record gets the full allowance again.
        let err = service
            .verify_otp("9876543210", &wrong_code(&record.code))
            .await
            .unwrap_err();
        assert_eq!(err, OtpError::InvalidCode { remaining: 2 });
    }

    #[tokio::test]
    async fn correct_code_is_single_use() {
        let (service, store) = service();
        service.request_otp("9876543210").await.unwrap();
        let code = pending_code(&store, "9876543210").await;

        let verified = service.verify_otp("9876543210", &code).await.unwrap();
        assert!(!verified.token.is_empty());
        assert!(store.get("9876543210").await.unwrap().is_none());

        let err = service.verify_otp("9876543210", &code).await.unwrap_err();
        assert_eq!(err, OtpError::NotFound);
    }

    #[tokio::test]
    async fn tokens_differ_between_logins() {
        let (service, store) = service();

        service.request_otp("9876543210").await.unwrap();
        let code = pending_code(&store, "9876543210").await;
        let first = service.verify_otp("9876543210", &code).await.unwrap().token;

        service.request_otp("9876543210").await.unwrap();
        let code = pending_code(&store, "9876543210").await;
        let second = service.verify_otp("9876543210", &code).await.unwrap().token;

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn three_wrong_codes_exhaust_the_otp() {
        let (service, store) = service();
        service.request_otp("9876543210").await.unwrap();
        let code = pending_code(&store, "9876543210").await;
        let wrong = wrong_code(&code);

        let err = service.verify_otp("9876543210", &wrong).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid OTP. 2 attempts remaining.");
        let err = service.verify_otp("9876543210", &wrong).await.unwrap_err();
        assert_eq!(err, OtpError::InvalidCode { remaining: 1 });
        let err = service.verify_otp("9876543210", &wrong).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid OTP. No attempts remaining. Request a new OTP."
        );

        assert!(store.get("9876543210").await.unwrap().is_none());

        let err = service.verify_otp("9876543210", &code).await.unwrap_err();
        assert_eq!(err, OtpError::NotFound);
    }

    #[tokio::test]
    async fn expired_otp_is_rejected_even_with_correct_code() {
        let policy = OtpPolicy {
            ttl: Duration::from_millis(50),
            ..OtpPolicy::default()
        };
        let (service, store) = service_with(Arc::new(RecordingSender::default()), policy);

        service.request_otp("1234567890").await.unwrap();
        let code = pending_code(&store, "1234567890").await;

        tokio::time::sleep(Duration::from_millis(120)).await;

        let err = service.verify_otp("1234567890", &code).await.unwrap_err();
        assert_eq!(err, OtpError::Expired);
        assert!(store.get("1234567890").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn exhausted_record_is_deleted_on_lookup() {
        let (service, store) = service();
        let mut record = OtpRecord::new("123456".to_string(), Utc::now() + chrono::Duration::minutes(5));
        record.attempts = 3;
        store.set("9876543210", record, Duration::from_secs(300)).await.unwrap();

        let err = service.verify_otp("9876543210", "123456").await.unwrap_err();
        assert_eq!(err, OtpError::AttemptsExhausted);
        assert!(store.get("9876543210").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expiry_is_checked_before_attempts() {
        let (service, store) = service();
        let mut record = OtpRecord::new("123456".to_string(), Utc::now() - chrono::Duration::seconds(1));
        record.attempts = 3;
        store.set("9876543210", record, Duration::from_secs(300)).await.unwrap();

        let err = service.verify_otp("9876543210", "123456").await.unwrap_err();
        assert_eq!(err, OtpError::Expired);
    }

    #[tokio::test]
    async fn missing_arguments_fail_validation() {
        let (service, _store) = service();
        assert!(matches!(
            service.verify_otp("", "123456").await,
            Err(OtpError::Validation(_))
        ));
        assert!(matches!(
            service.verify_otp("9876543210", "").await,
            Err(OtpError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn failed_notification_does_not_fail_the_request() {
        let (service, store) = service_with(Arc::new(FailingSender), OtpPolicy::default());
        let issued = service.request_otp("9876543210").await.unwrap();
        assert!(!issued.delivery.delivered);
        assert_eq!(issued.message, "OTP generated (WhatsApp failed, see logs).");
        assert!(store.get("9876543210").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn stalled_notification_is_cut_off_by_the_timeout() {
        let policy = OtpPolicy {
            notification_timeout: Duration::from_millis(30),
            ..OtpPolicy::default()
        };
        let (service, _store) = service_with(Arc::new(StalledSender), policy);

        let issued = tokio::time::timeout(Duration::from_secs(2), service.request_otp("9876543210"))
            .await
            .expect("request_otp must not wait for a stalled sender")
            .unwrap();
        assert!(!issued.delivery.delivered);
        assert!(issued.delivery.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn panicking_sender_does_not_fail_the_request() {
        let (service, store) = service_with(Arc::new(PanickingSender), OtpPolicy::default());
        let issued = service.request_otp("9876543210").await.unwrap();
        assert!(!issued.delivery.delivered);
        assert_eq!(issued.delivery.error.as_deref(), Some("sender panicked"));
        assert_eq!(issued.message, "OTP generated (WhatsApp failed, see logs).");
        assert!(store.get("9876543210").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn record_survives_when_token_cannot_be_minted() {
        let store = Arc::new(InMemoryOtpStore::new());
        let tokens = Arc::new(SessionTokenService::new("test-secret", Duration::from_secs(u64::MAX)));
        let service = OtpService::new(
            store.clone(),
            Arc::new(RecordingSender::default()),
            tokens,
            OtpPolicy::default(),
        );
        service.request_otp("9876543210").await.unwrap();
        let code = pending_code(&store, "9876543210").await;

        let err = service.verify_otp("9876543210", &code).await.unwrap_err();
        assert!(matches!(err, OtpError::TokenIssue(_)));

        let record = store.get("9876543210").await.unwrap().expect("record kept for retry");
        assert_eq!(record.code, code);
        assert_eq!(record.attempts, 0);
    }

    #[tokio::test]
    async fn out_of_range_ttl_is_an_error_not_a_panic() {
        let policy = OtpPolicy {
            ttl: Duration::from_secs(u64::MAX),
            ..OtpPolicy::default()
        };
        let (service, store) = service_with(Arc::new(RecordingSender::default()), policy);
        let err = service.request_otp("9876543210").await.unwrap_err();
        assert!(matches!(err, OtpError::Store(_)));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn concurrent_wrong_attempts_are_counted_exactly() {
        let (service, store) = service();
        let service = Arc::new(service);
        service.request_otp("9876543210").await.unwrap();
        let wrong = wrong_code(&pending_code(&store, "9876543210").await);

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let service = Arc::clone(&service);
                let wrong = wrong.clone();
                tokio::spawn(async move { service.verify_otp("9876543210", &wrong).await })
            })
            .collect();

        let mut remaining = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Err(OtpError::InvalidCode { remaining: r }) => remaining.push(r),
                other => panic!("unexpected outcome: {:?}", other),
            }
        }
        remaining.sort_unstable();
        assert_eq!(remaining, vec![0, 1, 2]);
        assert!(store.get("9876543210").await.unwrap().is_none());
    }
}
