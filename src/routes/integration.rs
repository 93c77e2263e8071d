use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers::integration, middleware::auth::require_session, state::AppState};

/// Every integration route runs on behalf of the caller named in the
/// session token.
pub fn integration_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Vyapar bookkeeping app
        .route("/vyapar/connect", post(integration::connect_vyapar))
        .route("/vyapar/inventory", get(integration::vyapar_inventory))
        // Stock and billing systems
        .route("/inventory/stock", get(integration::stock_levels))
        .route(
            "/inventory/products/:product_id",
            get(integration::product_details),
        )
        .route("/billing/sales", get(integration::sales_history))
        .route_layer(middleware::from_fn_with_state(state, require_session))
}
