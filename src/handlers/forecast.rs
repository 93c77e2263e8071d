use axum::Json;
use serde_json::{json, Value};

// POST /api/forecast/predict
pub async fn predict() -> Json<Value> {
    Json(json!({ "message": "Placeholder for forecast prediction" }))
}
