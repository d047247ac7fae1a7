//! Raw query parameters and the composed query description

use crate::core::filter::FilterExpression;
use crate::core::pagination::PaginationWindow;
use crate::core::projection::ProjectionSpec;
use crate::core::sort::SortSpec;
use serde::Deserialize;
use std::collections::HashMap;

/// Parameter names that drive projection, sorting and pagination.
///
/// They are stripped before filter compilation so they never turn into
/// field predicates.
pub const RESERVED_KEYS: [&str; 4] = ["select", "sort", "page", "limit"];

/// Query string parameters exactly as received from a request
///
/// Keys are unique. When the transport repeats a key the last value wins,
/// which is what deserializing into a map does.
///
/// # Example
/// ```rust,ignore
/// pub async fn list_records(Query(params): Query<RawParams>) -> ... {
///     let filters = params.without_reserved();
/// }
///
/// // GET /api/v1/courses?isPublished=true&price[lte]=100&sort=name&page=2&limit=10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct RawParams(HashMap<String, String>);

impl RawParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a parameter value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Insert a parameter, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Copy of the parameters with [`RESERVED_KEYS`] removed
    pub fn without_reserved(&self) -> RawParams {
        RawParams(
            self.0
                .iter()
                .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RawParams(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A fully compiled query, ready to hand to a [`DocumentStore`](crate::core::store::DocumentStore)
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescription {
    pub filter: FilterExpression,
    pub projection: ProjectionSpec,
    pub sort: SortSpec,
    pub window: PaginationWindow,
}
