//! # docquery
//!
//! A REST backend over document collections that turns flat, untyped query
//! strings into filtered, projected, sorted and paginated store queries.
//!
//! ## Features
//!
//! - **Filter compilation**: `price[gte]=10&author[in]=Ada,Grace` becomes a structured filter
//! - **Projection**: `select=name,description` (or `select=-tags` to leave fields out)
//! - **Sorting**: `sort=name,weeks`, newest first by default
//! - **Pagination**: `page`/`limit` with `next`/`prev` metadata on every list response
//! - **CRUD**: get, create, update and delete single records by UUID
//! - **Pluggable storage**: in-memory store, or MongoDB behind the `mongodb_backend` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docquery::prelude::*;
//!
//! let app = ServerBuilder::new()
//!     .with_config(AppConfig::default())
//!     .with_store(InMemoryDocumentStore::new())
//!     .build()?;
//!
//! // GET /api/v1/courses?isPublished=true&sort=name&page=1&limit=2
//! ```
//!
//! The query pipeline can also be used without HTTP:
//!
//! ```rust,ignore
//! let params: RawParams = [("price[lt]", "100"), ("limit", "10")].into_iter().collect();
//! let envelope = QueryExecutor::default().execute(&store, "courses", &params).await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Query pipeline ===
    pub use crate::core::{
        document::{Document, RecordEnvelope, ResultEnvelope},
        executor::{CountMode, QueryExecutor},
        filter::{ComparisonOperator, FilterCondition, FilterExpression},
        pagination::{PageRef, PaginationPlanner, PaginationResult, PaginationWindow},
        projection::{ProjectionMode, ProjectionSpec},
        query::{QueryDescription, RawParams},
        service::CollectionService,
        sort::{SortDirection, SortSpec, SortSpecifier},
        store::{DocumentStore, FindOptions},
    };

    // === Errors ===
    pub use crate::core::error::{
        ApiError, ApiResult, ConfigError, QueryError, RecordError, RequestError, StorageError,
    };

    // === Storage ===
    pub use crate::storage::InMemoryDocumentStore;
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoDocumentStore;

    // === Config ===
    pub use crate::config::{ApiConfig, AppConfig, QueryConfig, ServerConfig, StorageConfig};

    // === Server ===
    pub use crate::server::{CollectionRegistry, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
