//! Storage collaborator trait

use crate::core::document::Document;
use crate::core::filter::FilterExpression;
use crate::core::projection::ProjectionSpec;
use crate::core::sort::SortSpec;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Everything a `find` needs besides the collection name
#[derive(Debug, Clone, PartialEq)]
pub struct FindOptions {
    pub filter: FilterExpression,
    pub projection: ProjectionSpec,
    pub sort: SortSpec,
    pub skip: u64,
    pub limit: u64,
}

/// Document storage used by the query executor and CRUD operations
///
/// Implementations own the connection and every piece of storage state. The
/// core treats them as an opaque, shareable handle: errors are returned as-is
/// and wrapped by the caller, never retried.
///
/// Records carry their identifier as a UUID string under
/// [`ID_FIELD`](crate::core::document::ID_FIELD).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name used in error messages and logs
    fn backend_name(&self) -> &'static str;

    /// Count documents in a collection, optionally restricted by a filter
    async fn count(&self, collection: &str, filter: Option<&FilterExpression>) -> Result<u64>;

    /// Fetch one page of matching documents
    async fn find(&self, collection: &str, options: &FindOptions) -> Result<Vec<Document>>;

    /// Fetch a document by id
    async fn find_by_id(&self, collection: &str, id: &Uuid) -> Result<Option<Document>>;

    /// Insert a document that already carries its id, returning the stored version
    async fn insert(&self, collection: &str, document: Document) -> Result<Document>;

    /// Set the fields of `patch` on a document, returning the updated version
    ///
    /// Returns `Ok(None)` when no document has this id.
    async fn update_by_id(
        &self,
        collection: &str,
        id: &Uuid,
        patch: Document,
    ) -> Result<Option<Document>>;

    /// Delete a document, returning it if it existed
    async fn delete_by_id(&self, collection: &str, id: &Uuid) -> Result<Option<Document>>;

    /// Release connections held by the store
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
