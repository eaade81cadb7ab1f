//! Liveness route.

use axum::Json;
use serde_json::{json, Value};

/// GET / - Report that the server is up.
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Server is running" }))
}
