use std::sync::Arc;

use crate::config::{AppConfig, OtpStoreKind};
use crate::errors::{AppError, Result};
use crate::services::billing_connector::{BillingConnector, SimulatedBillingConnector};
use crate::services::inventory_connector::{SimulatedStockConnector, StockConnector};
use crate::services::notification_service::{NotificationSender, SimulatedWhatsAppSender};
use crate::services::otp_service::{OtpPolicy, OtpService};
use crate::services::otp_store::{InMemoryOtpStore, OtpStore, RedisOtpStore};
use crate::services::token_service::SessionTokenService;
use crate::services::vyapar_connector::{SimulatedVyaparConnector, VyaparConnector, VyaparSessionStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub otp_service: Arc<OtpService>,
    pub token_service: Arc<SessionTokenService>,
    pub vyapar: Arc<dyn VyaparConnector>,
    pub vyapar_sessions: Arc<VyaparSessionStore>,
    pub stock: Arc<dyn StockConnector>,
    pub billing: Arc<dyn BillingConnector>,
}

impl AppState {
    /// Wires the OTP flow onto the given store and sender; third-party
    /// connectors start out simulated.
    pub fn new(
        config: AppConfig,
        otp_store: Arc<dyn OtpStore>,
        sender: Arc<dyn NotificationSender>,
    ) -> Self {
        let token_service = Arc::new(SessionTokenService::new(
            &config.jwt_secret,
            config.session_token_ttl,
        ));
        let policy = OtpPolicy {
            ttl: config.otp_ttl,
            max_attempts: config.otp_max_attempts,
            notification_timeout: config.notification_timeout,
        };
        let otp_service = Arc::new(OtpService::new(
            otp_store,
            sender,
            token_service.clone(),
            policy,
        ));
        let latency = config.simulated_latency;

        AppState {
            config: Arc::new(config),
            otp_service,
            token_service,
            vyapar: Arc::new(SimulatedVyaparConnector::new(latency)),
            vyapar_sessions: Arc::new(VyaparSessionStore::new()),
            stock: Arc::new(SimulatedStockConnector::new(latency)),
            billing: Arc::new(SimulatedBillingConnector::new(latency)),
        }
    }

    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let otp_store: Arc<dyn OtpStore> = match config.otp_store {
            OtpStoreKind::Memory => Arc::new(InMemoryOtpStore::new()),
            OtpStoreKind::Redis => Arc::new(
                RedisOtpStore::connect(&config.redis_url)
                    .await
                    .map_err(|e| AppError::configuration(e.to_string()))?,
            ),
        };
        let sender = Arc::new(SimulatedWhatsAppSender::new(
            config.whatsapp_sender_number.clone(),
            config.whatsapp_api_key.clone(),
            config.simulated_latency,
        ));

        Ok(Self::new(config, otp_store, sender))
    }

    pub fn with_vyapar(mut self, connector: Arc<dyn VyaparConnector>) -> Self {
        self.vyapar = connector;
        self
    }

    pub fn with_stock(mut self, connector: Arc<dyn StockConnector>) -> Self {
        self.stock = connector;
        self
    }

    pub fn with_billing(mut self, connector: Arc<dyn BillingConnector>) -> Self {
        self.billing = connector;
        self
    }
}
