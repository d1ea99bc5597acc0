use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde_json::json;

use super::routes::todos::method_not_allowed;
use super::types::ApiError;

pub use super::routes::todos;

pub fn app(router: Router) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }).fallback(method_not_allowed))
        .route("/api", get(|| async { Json(json!({ "message": "hello" })) }).fallback(method_not_allowed))
        .merge(router)
        .fallback(|| async { ApiError::new(StatusCode::NOT_FOUND, "Not found") })
}
