use serde::{Deserialize, Serialize};

/// Item as reported by the Vyapar bookkeeping app.
///
/// `quantity` is `None` for services, which are not stocked.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub quantity: Option<u32>,
    pub price: f64,
    pub unit: String,
    pub category: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
}

impl InventoryItem {
    pub fn is_service(&self) -> bool {
        self.quantity.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub product_id: String,
    pub location_id: String,
    pub quantity: u32,
    pub last_restocked: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProductDetails {
    pub name: String,
    pub category: String,
    pub supplier: String,
    pub cost: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub id: String,
    pub product_id: String,
    pub quantity: u32,
    pub amount: f64,
    pub date: String,
}
