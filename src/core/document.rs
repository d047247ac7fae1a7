//! Generic document records and result envelopes

use crate::core::error::RequestError;
use crate::core::pagination::PaginationResult;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// A schemaless record: field name → JSON value
pub type Document = Map<String, Value>;

/// Field holding a record's identifier
pub const ID_FIELD: &str = "id";

/// Field stamped with the insertion time when a record is created
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Parse a path identifier into a record id
///
/// Well-formed ids are UUIDs; anything else is rejected before reaching the store.
pub fn parse_record_id(raw: &str) -> Result<Uuid, RequestError> {
    Uuid::parse_str(raw).map_err(|_| RequestError::InvalidRecordId { id: raw.to_string() })
}

/// Response wrapper for list requests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope {
    pub success: bool,
    /// Number of records in `data`
    pub count: usize,
    pub pagination: PaginationResult,
    pub data: Vec<Document>,
}

impl ResultEnvelope {
    pub fn new(data: Vec<Document>, pagination: PaginationResult) -> Self {
        Self {
            success: true,
            count: data.len(),
            pagination,
            data,
        }
    }
}

/// Response wrapper for single-record requests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordEnvelope {
    pub success: bool,
    pub data: Value,
}

impl RecordEnvelope {
    pub fn new(record: Document) -> Self {
        Self {
            success: true,
            data: Value::Object(record),
        }
    }

    /// Envelope with an empty object, returned after a delete
    pub fn empty() -> Self {
        Self {
            success: true,
            data: Value::Object(Map::new()),
        }
    }
}
