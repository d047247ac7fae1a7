//! Query execution: parameters in, result envelope out

use crate::config::QueryConfig;
use crate::core::document::ResultEnvelope;
use crate::core::error::{ApiResult, QueryError, StorageError};
use crate::core::filter;
use crate::core::pagination::PaginationPlanner;
use crate::core::projection;
use crate::core::query::{QueryDescription, RawParams};
use crate::core::sort::SortSpecifier;
use crate::core::store::{DocumentStore, FindOptions};
use serde::{Deserialize, Serialize};

/// Which records the pagination total is computed over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountMode {
    /// Every document in the collection, ignoring the filter
    #[default]
    Collection,
    /// Only documents matching the filter
    Filtered,
}

/// Composes filter, projection, sort and pagination into one store query
///
/// Holds configuration only; every call works on fresh values.
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor {
    planner: PaginationPlanner,
    sorter: SortSpecifier,
    count_mode: CountMode,
}

impl QueryExecutor {
    pub fn new(planner: PaginationPlanner, sorter: SortSpecifier, count_mode: CountMode) -> Self {
        Self {
            planner,
            sorter,
            count_mode,
        }
    }

    pub fn from_config(config: &QueryConfig) -> Self {
        Self::new(
            PaginationPlanner::new(config.default_limit, config.max_limit),
            SortSpecifier::new(
                config.sort.default_field.clone(),
                config.sort.allow_descending_prefix,
            ),
            config.count_mode,
        )
    }

    pub fn count_mode(&self) -> CountMode {
        self.count_mode
    }

    /// Compile raw parameters without touching the store
    pub fn prepare(&self, params: &RawParams) -> Result<QueryDescription, QueryError> {
        let filter = filter::compile(&params.without_reserved())?;
        let projection = projection::select(params.get("select"))?;
        let sort = self.sorter.sort(params.get("sort"));
        let window = self.planner.plan(params.get("page"), params.get("limit"));

        Ok(QueryDescription {
            filter,
            projection,
            sort,
            window,
        })
    }

    /// Run a list query against `collection`
    ///
    /// Issues one count and one find, concurrently, and fails if either does.
    pub async fn execute(
        &self,
        store: &dyn DocumentStore,
        collection: &str,
        params: &RawParams,
    ) -> ApiResult<ResultEnvelope> {
        let query = self.prepare(params)?;
        tracing::debug!(
            collection,
            filter = %query.filter.to_json(),
            page = query.window.page,
            limit = query.window.limit,
            "executing list query"
        );

        let count_filter = match self.count_mode {
            CountMode::Collection => None,
            CountMode::Filtered => Some(&query.filter),
        };
        let options = FindOptions {
            filter: query.filter.clone(),
            projection: query.projection,
            sort: query.sort,
            skip: query.window.skip,
            limit: query.window.take,
        };

        let (total, records) = tokio::try_join!(
            store.count(collection, count_filter),
            store.find(collection, &options),
        )
        .map_err(|e| StorageError::backend(store.backend_name(), e))?;

        let pagination = self.planner.describe(&query.window, total);
        tracing::debug!(collection, total, returned = records.len(), "list query done");

        Ok(ResultEnvelope::new(records, pagination))
    }
}
