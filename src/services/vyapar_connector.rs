use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::inventory::InventoryItem;

#[derive(Debug, Clone)]
pub struct VyaparCredentials {
    pub api_key: String,
    pub business_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VyaparUser {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct VyaparSession {
    pub session_token: String,
    pub user: VyaparUser,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Request(String),
}

impl ConnectorError {
    /// Upstream signals a dead session by mentioning an expired token; the
    /// stored credential must then be dropped.
    pub fn indicates_expired(&self) -> bool {
        self.to_string().to_lowercase().contains("token expired")
    }
}

/// Remote contract of the Vyapar bookkeeping app.
#[async_trait]
pub trait VyaparConnector: Send + Sync {
    async fn authenticate(&self, credentials: &VyaparCredentials) -> Result<VyaparSession, ConnectorError>;

    async fn fetch_inventory(&self, session_token: &str) -> Result<Vec<InventoryItem>, ConnectorError>;
}

/// Offline stand-in for the Vyapar API with canned inventory.
#[derive(Clone)]
pub struct SimulatedVyaparConnector {
    latency: Duration,
}

impl SimulatedVyaparConnector {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    fn mock_inventory() -> Vec<InventoryItem> {
        let item = |id: &str, name: &str, quantity: Option<u32>, price: f64, unit: &str, category: &str| InventoryItem {
            id: id.to_string(),
            name: name.to_string(),
            quantity,
            price,
            unit: unit.to_string(),
            category: category.to_string(),
            item_type: None,
        };

        vec![
            item("vyapar_item_1", "Product A (Vyapar)", Some(100), 10.50, "pcs", "Electronics"),
            item("vyapar_item_2", "Product B (Vyapar)", Some(50), 25.99, "pcs", "Groceries"),
            InventoryItem {
                item_type: Some("service".to_string()),
                ..item("vyapar_item_3", "Service X (Vyapar)", None, 150.00, "hr", "Services")
            },
            item("vyapar_item_4", "Raw Material Z (Vyapar)", Some(500), 2.75, "kg", "Raw Materials"),
        ]
    }
}

#[async_trait]
impl VyaparConnector for SimulatedVyaparConnector {
    async fn authenticate(&self, credentials: &VyaparCredentials) -> Result<VyaparSession, ConnectorError> {
        if credentials.api_key.is_empty() || credentials.business_name.is_empty() {
            return Err(ConnectorError::Rejected(
                "API key and business name are required for Vyapar authentication.".to_string(),
            ));
        }

        tokio::time::sleep(self.latency).await;

        let session_token = format!(
            "vyapar_sim_token_{}_{}",
            credentials.business_name,
            chrono::Utc::now().timestamp_millis()
        );
        let user = VyaparUser {
            id: format!("vyapar_user_{}", &uuid::Uuid::new_v4().simple().to_string()[..9]),
            name: credentials.business_name.clone(),
        };

        tracing::info!("Vyapar authentication succeeded (simulated) for {}", user.name);
        Ok(VyaparSession { session_token, user })
    }

    async fn fetch_inventory(&self, session_token: &str) -> Result<Vec<InventoryItem>, ConnectorError> {
        if session_token.is_empty() {
            return Err(ConnectorError::Request(
                "Session token is required to fetch inventory from Vyapar.".to_string(),
            ));
        }

        tokio::time::sleep(self.latency).await;

        let inventory = Self::mock_inventory();
        tracing::info!("Fetched {} Vyapar inventory items (simulated)", inventory.len());
        Ok(inventory)
    }
}

/// Vyapar session tokens keyed by the authenticated caller.
#[derive(Default)]
pub struct VyaparSessionStore {
    sessions: RwLock<HashMap<String, String>>,
}

impl VyaparSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, caller_id: &str, session_token: String) {
        self.sessions
            .write()
            .await
            .insert(caller_id.to_string(), session_token);
    }

    pub async fn get(&self, caller_id: &str) -> Option<String> {
        self.sessions.read().await.get(caller_id).cloned()
    }

    pub async fn remove(&self, caller_id: &str) -> Option<String> {
        self.sessions.write().await.remove(caller_id)
    }
}
