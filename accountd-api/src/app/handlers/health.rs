use axum::http::Uri;
use axum::Json;
use serde_json::json;

use super::super::error::ApiError;

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Fallback for unknown routes
pub async fn handler_404(uri: Uri) -> ApiError {
    tracing::warn!(path = %uri.path(), "no route for request");
    ApiError::not_found(format!("no route for {}", uri.path()))
}
