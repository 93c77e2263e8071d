use axum::{routing::post, Router};

use crate::{handlers::forecast, state::AppState};

pub fn forecast_routes() -> Router<AppState> {
    Router::new().route("/predict", post(forecast::predict))
}
