use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::inventory::SaleRecord;
use crate::services::vyapar_connector::ConnectorError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesFilter {
    pub product_id: Option<String>,
}

#[async_trait]
pub trait BillingConnector: Send + Sync {
    async fn fetch_sales_history(&self, filter: &SalesFilter) -> Result<Vec<SaleRecord>, ConnectorError>;
}

#[derive(Clone)]
pub struct SimulatedBillingConnector {
    latency: Duration,
}

impl SimulatedBillingConnector {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    fn mock_sales() -> Vec<SaleRecord> {
        [
            ("sale001", "prod123", 2, 50.00, "2023-10-01T10:00:00Z"),
            ("sale002", "prod456", 1, 75.00, "2023-10-01T11:30:00Z"),
            ("sale003", "prod123", 5, 120.00, "2023-10-02T14:15:00Z"),
        ]
        .into_iter()
        .map(|(id, product, quantity, amount, date)| SaleRecord {
            id: id.to_string(),
            product_id: product.to_string(),
            quantity,
            amount,
            date: date.to_string(),
        })
        .collect()
    }
}

#[async_trait]
impl BillingConnector for SimulatedBillingConnector {
    async fn fetch_sales_history(&self, filter: &SalesFilter) -> Result<Vec<SaleRecord>, ConnectorError> {
        tokio::time::sleep(self.latency).await;
        let sales: Vec<_> = Self::mock_sales()
            .into_iter()
            .filter(|s| filter.product_id.as_deref().map_or(true, |p| p == s.product_id))
            .collect();
        tracing::info!("Returning {} simulated sales records", sales.len());
        Ok(sales)
    }
}
