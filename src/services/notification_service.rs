use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

/// Result of a delivery attempt. Failure is data, not an error: callers
/// decide whether to log, alert, or ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryReport {
    pub fn delivered(message_id: impl Into<String>) -> Self {
        Self {
            delivered: true,
            message_id: Some(message_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            delivered: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, destination: &str, message: &str) -> DeliveryReport;
}

/// Stands in for a WhatsApp Business API provider: waits out a fake network
/// delay, logs the message and reports success.
#[derive(Clone)]
pub struct SimulatedWhatsAppSender {
    sender_number: String,
    api_key_loaded: bool,
    latency: Duration,
}

impl SimulatedWhatsAppSender {
    pub fn new(sender_number: String, api_key: Option<String>, latency: Duration) -> Self {
        Self {
            sender_number,
            api_key_loaded: api_key.is_some(),
            latency,
        }
    }
}

#[async_trait]
impl NotificationSender for SimulatedWhatsAppSender {
    async fn send(&self, destination: &str, message: &str) -> DeliveryReport {
        tracing::info!(
            to = destination,
            from = %self.sender_number,
            api_key_loaded = self.api_key_loaded,
            "Sending WhatsApp message (simulated)"
        );
        tracing::debug!("WhatsApp message body: {}", message);

        tokio::time::sleep(self.latency).await;

        let message_id = format!("sim_whatsapp_{}", chrono::Utc::now().timestamp_millis());
        tracing::info!("WhatsApp message sent (simulated), id {}", message_id);
        DeliveryReport::delivered(message_id)
    }
}
