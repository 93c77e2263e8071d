use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use validator::Validate;

use crate::dtos::integration_dtos::{
    InventoryResponse, ProductResponse, SalesResponse, StockResponse, VyaparConnectRequest,
    VyaparConnectResponse,
};
use crate::errors::{AppError, Result};
use crate::extractors::AppJson;
use crate::models::session::SessionClaims;
use crate::services::billing_connector::SalesFilter;
use crate::services::inventory_connector::StockFilter;
use crate::services::vyapar_connector::VyaparCredentials;
use crate::state::AppState;

// POST /api/integration/vyapar/connect
pub async fn connect_vyapar(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    AppJson(req): AppJson<VyaparConnectRequest>,
) -> Result<Json<VyaparConnectResponse>> {
    req.validate()?;
    let caller = claims.caller_id();
    tracing::info!("Attempting Vyapar auth for user {}", caller);

    let credentials = VyaparCredentials {
        api_key: req.api_key,
        business_name: req.business_name,
    };
    let session = state.vyapar.authenticate(&credentials).await.map_err(|e| {
        tracing::warn!("Vyapar authentication failed for user {}: {}", caller, e);
        AppError::unauthorized(e.to_string())
    })?;

    state
        .vyapar_sessions
        .put(caller, session.session_token)
        .await;
    tracing::info!("Vyapar session stored for user {}", caller);

    Ok(Json(VyaparConnectResponse {
        success: true,
        message: "Successfully connected to Vyapar and session initiated.".to_string(),
    }))
}

// GET /api/integration/vyapar/inventory
pub async fn vyapar_inventory(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<InventoryResponse>> {
    let caller = claims.caller_id();
    let token = state
        .vyapar_sessions
        .get(caller)
        .await
        .ok_or(AppError::NotConnected)?;

    match state.vyapar.fetch_inventory(&token).await {
        Ok(inventory) => {
            let message = format!("Successfully fetched {} items.", inventory.len());
            Ok(Json(InventoryResponse {
                success: true,
                inventory,
                message,
            }))
        }
        Err(e) if e.indicates_expired() => {
            state.vyapar_sessions.remove(caller).await;
            tracing::warn!("Vyapar session for user {} expired, token dropped", caller);
            Err(AppError::VyaparSessionExpired)
        }
        Err(e) => Err(AppError::upstream(
            "Failed to fetch inventory from Vyapar.",
            format!("Vyapar inventory fetch for user {} failed: {}", caller, e),
        )),
    }
}

// GET /api/integration/inventory/stock
pub async fn stock_levels(
    State(state): State<AppState>,
    Query(filter): Query<StockFilter>,
) -> Result<Json<StockResponse>> {
    let stock = state
        .stock
        .fetch_stock_levels(&filter)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch stock levels.", e.to_string()))?;

    Ok(Json(StockResponse {
        success: true,
        stock,
    }))
}

// GET /api/integration/inventory/products/:product_id
pub async fn product_details(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductResponse>> {
    let product = state
        .stock
        .fetch_product_details(&product_id)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch product details.", e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Product not found.".to_string()))?;

    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

// GET /api/integration/billing/sales
pub async fn sales_history(
    State(state): State<AppState>,
    Query(filter): Query<SalesFilter>,
) -> Result<Json<SalesResponse>> {
    let sales = state
        .billing
        .fetch_sales_history(&filter)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch sales history.", e.to_string()))?;

    Ok(Json(SalesResponse {
        success: true,
        sales,
    }))
}
