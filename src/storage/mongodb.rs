//! MongoDB storage backend using the official MongoDB async driver.
//!
//! Provides [`MongoDocumentStore`], a [`DocumentStore`] backed by a
//! `mongodb::Database`.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag:
//! ```toml
//! [dependencies]
//! docquery = { version = "0.1", features = ["mongodb_backend"] }
//! ```
//!
//! # Storage model
//!
//! Each API collection maps to the MongoDB collection of the same name.
//! Record ids are UUID strings stored under `_id`; the `id` field of the
//! API is mapped to and from MongoDB's `_id` convention at this boundary
//! (documents, filters, projections and sort keys alike).
//!
//! # Operand typing
//!
//! Filter operands arrive as strings while MongoDB stores native BSON types.
//! Equality and `$in` therefore match every plausible variant of an operand
//! (`"25"` matches the string `"25"` and the integer `25`), and range
//! operators compare against the operand cast to its most specific type.

use crate::core::document::{Document as JsonDocument, ID_FIELD};
use crate::core::error::StorageError;
use crate::core::filter::{ComparisonOperator, FilterCondition, FilterExpression};
use crate::core::projection::{ProjectionMode, ProjectionSpec};
use crate::core::sort::SortSpec;
use crate::core::store::{DocumentStore, FindOptions};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Database};
use serde_json::Value;
use uuid::Uuid;

const MONGO_ID_FIELD: &str = "_id";

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a JSON record into a BSON Document,
/// renaming `id` → `_id` for MongoDB convention.
fn json_to_document(json: JsonDocument) -> Result<Document> {
    let bson_val = mongodb::bson::to_bson(&Value::Object(json))
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?;

    let mut doc = match bson_val {
        Bson::Document(d) => d,
        _ => return Err(anyhow!("Expected BSON document, got non-object")),
    };

    if let Some(id) = doc.remove(ID_FIELD) {
        doc.insert(MONGO_ID_FIELD, id);
    }

    Ok(doc)
}

/// Convert a BSON Document back into a JSON record,
/// renaming `_id` → `id`.
fn document_to_json(mut doc: Document) -> JsonDocument {
    if let Some(id) = doc.remove(MONGO_ID_FIELD) {
        doc.insert(ID_FIELD, id);
    }

    match Bson::Document(doc).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => JsonDocument::new(),
    }
}

/// Convert a UUID to its BSON string representation for queries.
fn uuid_bson(id: &Uuid) -> Bson {
    Bson::String(id.to_string())
}

fn mongo_field(field: &str) -> &str {
    if field == ID_FIELD {
        MONGO_ID_FIELD
    } else {
        field
    }
}

/// Every BSON value a string operand could be stored as
fn operand_variants(value: &str) -> Vec<Bson> {
    let mut variants: Vec<Bson> = vec![Bson::String(value.to_string())];

    match value {
        "true" => variants.push(Bson::Boolean(true)),
        "false" => variants.push(Bson::Boolean(false)),
        _ => {
            if let Ok(i) = value.parse::<i64>() {
                variants.push(Bson::Int64(i));
            }
            if value.contains('.')
                && let Ok(f) = value.parse::<f64>()
            {
                variants.push(Bson::Double(f));
            }
        }
    }

    variants
}

/// The most specific BSON type a string operand parses as
fn cast_operand(value: &str) -> Bson {
    if let Ok(i) = value.parse::<i64>() {
        return Bson::Int64(i);
    }
    if let Ok(f) = value.parse::<f64>()
        && f.is_finite()
    {
        return Bson::Double(f);
    }
    match value {
        "true" => Bson::Boolean(true),
        "false" => Bson::Boolean(false),
        _ => Bson::String(value.to_string()),
    }
}

fn json_to_bson(value: &Value) -> Result<Bson> {
    mongodb::bson::to_bson(value).map_err(|e| anyhow!("Failed to convert operand to BSON: {}", e))
}

/// Translate a filter expression into a MongoDB query document
fn filter_to_bson(filter: &FilterExpression) -> Result<Document> {
    let mut query = Document::new();

    for (field, condition) in filter.iter() {
        let key = mongo_field(field);
        let clause = match condition {
            FilterCondition::Equals(Value::String(raw)) => {
                let variants = operand_variants(raw);
                if variants.len() == 1 {
                    Bson::String(raw.clone())
                } else {
                    Bson::Document(doc! { "$in": variants })
                }
            }
            FilterCondition::Equals(other) => json_to_bson(other)?,
            FilterCondition::Compare(ops) => {
                let mut clause = Document::new();
                for (op, operand) in ops {
                    let value = match (op, operand) {
                        (ComparisonOperator::In, Value::Array(items)) => Bson::Array(
                            items
                                .iter()
                                .map(|item| match item {
                                    Value::String(raw) => Ok(operand_variants(raw)),
                                    other => json_to_bson(other).map(|b| vec![b]),
                                })
                                .collect::<Result<Vec<_>>>()?
                                .into_iter()
                                .flatten()
                                .collect(),
                        ),
                        (ComparisonOperator::In, Value::String(raw)) => {
                            Bson::Array(operand_variants(raw))
                        }
                        (_, Value::String(raw)) => cast_operand(raw),
                        (_, other) => json_to_bson(other)?,
                    };
                    clause.insert(op.symbol(), value);
                }
                Bson::Document(clause)
            }
        };
        query.insert(key, clause);
    }

    Ok(query)
}

fn projection_to_bson(projection: &ProjectionSpec) -> Option<Document> {
    if projection.is_all() {
        return None;
    }
    let flag = match projection.mode() {
        ProjectionMode::Include => 1,
        ProjectionMode::Exclude => 0,
    };
    Some(
        projection
            .fields()
            .map(|field| (mongo_field(field).to_string(), Bson::Int32(flag)))
            .collect(),
    )
}

fn sort_to_bson(sort: &SortSpec) -> Option<Document> {
    if sort.is_empty() {
        return None;
    }
    Some(
        sort.keys()
            .iter()
            .map(|(field, direction)| {
                (mongo_field(field).to_string(), Bson::Int32(direction.as_i32()))
            })
            .collect(),
    )
}

/// Skip and limit as the server accepts them: both fit a signed 64-bit int
fn window_bounds(options: &FindOptions) -> (u64, i64) {
    let skip = options.skip.min(i64::MAX as u64);
    let limit = i64::try_from(options.limit).unwrap_or(i64::MAX);
    (skip, limit)
}

// ---------------------------------------------------------------------------
// MongoDocumentStore
// ---------------------------------------------------------------------------

/// Document store backed by MongoDB.
///
/// # Example
///
/// ```rust,ignore
/// use docquery::storage::MongoDocumentStore;
///
/// let store = MongoDocumentStore::connect("mongodb://localhost:27017", "devcamper").await?;
/// let total = store.count("courses", None).await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoDocumentStore {
    client: Client,
    database: Database,
}

impl MongoDocumentStore {
    /// Create a store over an existing database handle.
    pub fn new(client: Client, database: Database) -> Self {
        Self { client, database }
    }

    /// Connect to `uri` and check the server answers a ping.
    ///
    /// A server that cannot be reached is reported as
    /// [`StorageError::Unavailable`].
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| anyhow!("Failed to create MongoDB client: {}", e))?;
        let database = client.database(database);

        if let Err(e) = database.run_command(doc! { "ping": 1 }).await {
            tracing::error!(error = %e, "MongoDB did not answer ping");
            return Err(StorageError::Unavailable {
                backend: "MongoDB".to_string(),
                message: e.to_string(),
            }
            .into());
        }
        tracing::info!(database = database.name(), "connected to MongoDB");

        Ok(Self::new(client, database))
    }

    /// Get a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.database.collection(name)
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    fn backend_name(&self) -> &'static str {
        "MongoDB"
    }

    async fn count(&self, collection: &str, filter: Option<&FilterExpression>) -> Result<u64> {
        let query = match filter {
            Some(filter) => filter_to_bson(filter)?,
            None => Document::new(),
        };

        self.collection(collection)
            .count_documents(query)
            .await
            .map_err(|e| anyhow!("Failed to count documents: {}", e))
    }

    async fn find(&self, collection: &str, options: &FindOptions) -> Result<Vec<JsonDocument>> {
        let query = filter_to_bson(&options.filter)?;
        tracing::debug!(collection, query = %query, "mongo find");

        let (skip, limit) = window_bounds(options);
        let mut action = self
            .collection(collection)
            .find(query)
            .skip(skip)
            .limit(limit);
        if let Some(sort) = sort_to_bson(&options.sort) {
            action = action.sort(sort);
        }
        if let Some(projection) = projection_to_bson(&options.projection) {
            action = action.projection(projection);
        }

        let cursor = action
            .await
            .map_err(|e| anyhow!("Failed to find documents: {}", e))?;
        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect documents: {}", e))?;

        Ok(docs.into_iter().map(document_to_json).collect())
    }

    async fn find_by_id(&self, collection: &str, id: &Uuid) -> Result<Option<JsonDocument>> {
        let doc = self
            .collection(collection)
            .find_one(doc! { MONGO_ID_FIELD: uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to get document: {}", e))?;

        Ok(doc.map(document_to_json))
    }

    /// Insert the document and read it back to return the stored version.
    async fn insert(&self, collection: &str, document: JsonDocument) -> Result<JsonDocument> {
        let doc = json_to_document(document)?;
        let id_bson = doc
            .get(MONGO_ID_FIELD)
            .cloned()
            .ok_or_else(|| anyhow!("Document has no '{}' field", ID_FIELD))?;

        self.collection(collection)
            .insert_one(doc)
            .await
            .map_err(|e| anyhow!("Failed to insert document: {}", e))?;

        let stored = self
            .collection(collection)
            .find_one(doc! { MONGO_ID_FIELD: id_bson })
            .await
            .map_err(|e| anyhow!("Failed to read back inserted document: {}", e))?
            .ok_or_else(|| anyhow!("Document not found after insert"))?;

        Ok(document_to_json(stored))
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &Uuid,
        patch: JsonDocument,
    ) -> Result<Option<JsonDocument>> {
        let mut set = json_to_document(patch)?;
        set.remove(MONGO_ID_FIELD);

        if set.is_empty() {
            return self.find_by_id(collection, id).await;
        }

        let updated = self
            .collection(collection)
            .find_one_and_update(doc! { MONGO_ID_FIELD: uuid_bson(id) }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| anyhow!("Failed to update document: {}", e))?;

        Ok(updated.map(document_to_json))
    }

    async fn delete_by_id(&self, collection: &str, id: &Uuid) -> Result<Option<JsonDocument>> {
        let deleted = self
            .collection(collection)
            .find_one_and_delete(doc! { MONGO_ID_FIELD: uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to delete document: {}", e))?;

        Ok(deleted.map(document_to_json))
    }

    async fn close(&self) -> Result<()> {
        self.client.clone().shutdown().await;
        tracing::info!("MongoDB client shut down");
        Ok(())
    }
}
