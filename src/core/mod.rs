//! Core module: query translation, pagination and the storage seam

pub mod document;
pub mod error;
pub mod executor;
pub mod filter;
pub mod pagination;
pub mod projection;
pub mod query;
pub mod service;
pub mod sort;
pub mod store;

pub use document::{Document, RecordEnvelope, ResultEnvelope};
pub use error::{ApiError, ApiResult};
pub use executor::{CountMode, QueryExecutor};
pub use filter::{ComparisonOperator, FilterCondition, FilterExpression};
pub use pagination::{PageRef, PaginationPlanner, PaginationResult, PaginationWindow};
pub use projection::{ProjectionMode, ProjectionSpec};
pub use query::{QueryDescription, RawParams};
pub use service::CollectionService;
pub use sort::{SortDirection, SortSpec, SortSpecifier};
pub use store::{DocumentStore, FindOptions};
