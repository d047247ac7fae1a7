//! HTTP handlers for collection operations
//!
//! Handlers are collection-agnostic: the collection they serve comes from the
//! router state, so one set of handlers is mounted once per collection.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;
use std::sync::Arc;

use crate::core::document::{RecordEnvelope, ResultEnvelope};
use crate::core::error::{ApiError, RequestError};
use crate::core::query::RawParams;
use crate::core::service::CollectionService;

/// State shared by the handlers of one collection
#[derive(Clone)]
pub struct CollectionState {
    pub collection: Arc<str>,
    pub service: Arc<CollectionService>,
}

impl CollectionState {
    pub fn new(collection: impl Into<Arc<str>>, service: Arc<CollectionService>) -> Self {
        Self {
            collection: collection.into(),
            service,
        }
    }
}

/// List records with filtering, projection, sorting and pagination
///
/// GET /{collection}?select=&sort=&page=&limit=&field[op]=value
pub async fn list_records(
    State(state): State<CollectionState>,
    Query(params): Query<RawParams>,
) -> Result<Json<ResultEnvelope>, ApiError> {
    let envelope = state.service.list(&state.collection, &params).await?;
    Ok(Json(envelope))
}

/// GET /{collection}/{id}
pub async fn get_record(
    State(state): State<CollectionState>,
    Path(id): Path<String>,
) -> Result<Json<RecordEnvelope>, ApiError> {
    let envelope = state.service.find_by_id(&state.collection, &id).await?;
    Ok(Json(envelope))
}

/// POST /{collection}
pub async fn create_record(
    State(state): State<CollectionState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordEnvelope>), ApiError> {
    let Json(body) = body.map_err(invalid_body)?;
    let envelope = state.service.create(&state.collection, body).await?;
    Ok((StatusCode::CREATED, Json(envelope)))
}

/// PUT /{collection}/{id}
pub async fn update_record(
    State(state): State<CollectionState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RecordEnvelope>, ApiError> {
    let Json(body) = body.map_err(invalid_body)?;
    let envelope = state.service.update(&state.collection, &id, body).await?;
    Ok(Json(envelope))
}

/// DELETE /{collection}/{id}
pub async fn delete_record(
    State(state): State<CollectionState>,
    Path(id): Path<String>,
) -> Result<Json<RecordEnvelope>, ApiError> {
    let envelope = state.service.delete(&state.collection, &id).await?;
    Ok(Json(envelope))
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    RequestError::InvalidBody {
        message: rejection.body_text(),
    }
    .into()
}
