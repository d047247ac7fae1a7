//! Router builder utilities for collection routes

use crate::core::error::{ApiError, RequestError};
use crate::server::handlers::{
    CollectionState, create_record, delete_record, get_record, list_records, update_record,
};
use axum::http::Uri;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

/// Name reported by the health endpoints
pub const SERVICE_NAME: &str = "docquery";

/// Build the CRUD routes of one collection
///
/// - GET    {prefix}/{collection}       - List records (filter, select, sort, page, limit)
/// - POST   {prefix}/{collection}       - Create a record
/// - GET    {prefix}/{collection}/{id}  - Get a record
/// - PUT    {prefix}/{collection}/{id}  - Update a record
/// - DELETE {prefix}/{collection}/{id}  - Delete a record
pub fn build_collection_routes(prefix: &str, state: CollectionState) -> Router {
    let base = format!("{}/{}", prefix.trim_end_matches('/'), state.collection);

    Router::new()
        .route(&base, get(list_records).post(create_record))
        .route(
            &format!("{}/{{id}}", base),
            get(get_record).put(update_record).delete(delete_record),
        )
        .with_state(state)
}

/// Health check routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME
    }))
}

/// Fallback for paths no collection is mounted at
pub async fn route_not_found(uri: Uri) -> ApiError {
    RequestError::RouteNotFound {
        path: uri.path().to_string(),
    }
    .into()
}
