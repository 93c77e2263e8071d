use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::inventory::{ProductDetails, StockLevel};
use crate::services::vyapar_connector::ConnectorError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockFilter {
    pub product_id: Option<String>,
    pub location_id: Option<String>,
}

impl StockFilter {
    fn matches(&self, stock: &StockLevel) -> bool {
        self.product_id.as_deref().map_or(true, |p| p == stock.product_id)
            && self.location_id.as_deref().map_or(true, |l| l == stock.location_id)
    }
}

#[async_trait]
pub trait StockConnector: Send + Sync {
    async fn fetch_stock_levels(&self, filter: &StockFilter) -> Result<Vec<StockLevel>, ConnectorError>;

    /// `Ok(None)` when the product is unknown.
    async fn fetch_product_details(&self, product_id: &str) -> Result<Option<ProductDetails>, ConnectorError>;
}

#[derive(Clone)]
pub struct SimulatedStockConnector {
    latency: Duration,
}

impl SimulatedStockConnector {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    fn mock_stock() -> Vec<StockLevel> {
        [
            ("prod123", "locA", 150, "2023-10-15T08:00:00Z"),
            ("prod456", "locA", 75, "2023-10-12T10:00:00Z"),
            ("prod123", "locB", 80, "2023-10-16T09:30:00Z"),
            ("prod789", "locA", 200, "2023-10-10T11:00:00Z"),
        ]
        .into_iter()
        .map(|(product, location, quantity, restocked)| StockLevel {
            product_id: product.to_string(),
            location_id: location.to_string(),
            quantity,
            last_restocked: restocked.to_string(),
        })
        .collect()
    }

    fn mock_product(product_id: &str) -> Option<ProductDetails> {
        let (name, category, supplier, cost) = match product_id {
            "prod123" => ("Product Alpha", "Electronics", "Supplier X", 30.00),
            "prod456" => ("Product Beta", "Appliances", "Supplier Y", 60.00),
            "prod789" => ("Product Gamma", "Books", "Supplier Z", 15.00),
            _ => return None,
        };
        Some(ProductDetails {
            name: name.to_string(),
            category: category.to_string(),
            supplier: supplier.to_string(),
            cost,
        })
    }
}

#[async_trait]
impl StockConnector for SimulatedStockConnector {
    async fn fetch_stock_levels(&self, filter: &StockFilter) -> Result<Vec<StockLevel>, ConnectorError> {
        tokio::time::sleep(self.latency).await;
        let stock: Vec<_> = Self::mock_stock()
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect();
        tracing::info!("Returning {} simulated stock records", stock.len());
        Ok(stock)
    }

    async fn fetch_product_details(&self, product_id: &str) -> Result<Option<ProductDetails>, ConnectorError> {
        if product_id.is_empty() {
            return Err(ConnectorError::Request("Product ID is required.".to_string()));
        }
        tokio::time::sleep(self.latency).await;
        Ok(Self::mock_product(product_id))
    }
}
