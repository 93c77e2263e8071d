use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::inventory::{InventoryItem, ProductDetails, SaleRecord, StockLevel};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VyaparConnectRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Vyapar API key and business name are required."))]
    pub api_key: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Vyapar API key and business name are required."))]
    pub business_name: String,
}

#[derive(Debug, Serialize)]
pub struct VyaparConnectResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    pub success: bool,
    pub inventory: Vec<InventoryItem>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StockResponse {
    pub success: bool,
    pub stock: Vec<StockLevel>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: ProductDetails,
}

#[derive(Debug, Serialize)]
pub struct SalesResponse {
    pub success: bool,
    pub sales: Vec<SaleRecord>,
}
