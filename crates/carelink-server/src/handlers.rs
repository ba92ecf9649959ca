use axum::Json;
use serde_json::{Value, json};

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn readyz() -> Json<Value> {
    // Stateless: ready as soon as the router exists.
    Json(json!({ "status": "ready" }))
}
