//! CRUD operations over one collection

use crate::core::document::{
    CREATED_AT_FIELD, Document, ID_FIELD, RecordEnvelope, ResultEnvelope, parse_record_id,
};
use crate::core::error::{ApiResult, RecordError, RequestError, StorageError};
use crate::core::executor::QueryExecutor;
use crate::core::query::RawParams;
use crate::core::store::DocumentStore;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Collection-agnostic record service
///
/// Wraps a [`DocumentStore`] with id validation, timestamps and the response
/// envelopes. One instance is shared by every mounted collection.
#[derive(Clone)]
pub struct CollectionService {
    store: Arc<dyn DocumentStore>,
    executor: QueryExecutor,
}

impl CollectionService {
    pub fn new(store: Arc<dyn DocumentStore>, executor: QueryExecutor) -> Self {
        Self { store, executor }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    /// Filtered, sorted, paginated list
    pub async fn list(&self, collection: &str, params: &RawParams) -> ApiResult<ResultEnvelope> {
        self.executor
            .execute(self.store.as_ref(), collection, params)
            .await
    }

    pub async fn find_by_id(&self, collection: &str, raw_id: &str) -> ApiResult<RecordEnvelope> {
        let id = parse_record_id(raw_id)?;
        let record = self
            .store
            .find_by_id(collection, &id)
            .await
            .map_err(|e| self.storage_error(e))?;

        match record {
            Some(record) => Ok(RecordEnvelope::new(record)),
            None => Err(not_found(collection, raw_id)),
        }
    }

    /// Insert a new record
    ///
    /// The store assigns nothing: a fresh id is always generated here (any
    /// client-sent `id` is replaced) and `createdAt` is stamped unless the body
    /// already carries one.
    pub async fn create(&self, collection: &str, body: Value) -> ApiResult<RecordEnvelope> {
        let mut record = into_document(body)?;
        let id = Uuid::new_v4();
        record.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        if !record.contains_key(CREATED_AT_FIELD) {
            record.insert(CREATED_AT_FIELD.to_string(), Value::String(now_rfc3339()));
        }

        let stored = self
            .store
            .insert(collection, record)
            .await
            .map_err(|e| self.storage_error(e))?;
        tracing::info!(collection, %id, "record created");

        Ok(RecordEnvelope::new(stored))
    }

    /// Set the body's fields on an existing record
    ///
    /// Fields not in the body are left untouched; the id cannot be changed.
    pub async fn update(
        &self,
        collection: &str,
        raw_id: &str,
        body: Value,
    ) -> ApiResult<RecordEnvelope> {
        let id = parse_record_id(raw_id)?;
        let mut patch = into_document(body)?;
        patch.remove(ID_FIELD);

        let updated = self
            .store
            .update_by_id(collection, &id, patch)
            .await
            .map_err(|e| self.storage_error(e))?;

        match updated {
            Some(record) => {
                tracing::info!(collection, %id, "record updated");
                Ok(RecordEnvelope::new(record))
            }
            None => Err(not_found(collection, raw_id)),
        }
    }

    pub async fn delete(&self, collection: &str, raw_id: &str) -> ApiResult<RecordEnvelope> {
        let id = parse_record_id(raw_id)?;
        let deleted = self
            .store
            .delete_by_id(collection, &id)
            .await
            .map_err(|e| self.storage_error(e))?;

        match deleted {
            Some(_) => {
                tracing::info!(collection, %id, "record deleted");
                Ok(RecordEnvelope::empty())
            }
            None => Err(not_found(collection, raw_id)),
        }
    }

    fn storage_error(&self, error: anyhow::Error) -> StorageError {
        StorageError::backend(self.store.backend_name(), error)
    }
}

fn not_found(collection: &str, id: &str) -> crate::core::error::ApiError {
    tracing::warn!(collection, id, "record not found");
    RecordError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
    .into()
}

fn into_document(body: Value) -> Result<Document, RequestError> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(RequestError::InvalidBody {
            message: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
