//! Collection registry for mounting CRUD routes

use crate::core::service::CollectionService;
use crate::server::handlers::CollectionState;
use crate::server::router::build_collection_routes;
use axum::Router;
use indexmap::IndexSet;
use std::sync::Arc;

/// Registry of the collections exposed over REST
///
/// Collections are kept in registration order; registering a name twice is
/// a no-op.
#[derive(Debug, Default)]
pub struct CollectionRegistry {
    collections: IndexSet<String>,
}

impl CollectionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection by name
    ///
    /// Returns `false` if the collection was already registered.
    pub fn register(&mut self, collection: impl Into<String>) -> bool {
        self.collections.insert(collection.into())
    }

    /// Build a router with the routes of every registered collection
    ///
    /// All collections share the same service, and so the same store.
    pub fn build_routes(&self, prefix: &str, service: Arc<CollectionService>) -> Router {
        let mut router = Router::new();

        for collection in &self.collections {
            let state = CollectionState::new(collection.as_str(), service.clone());
            router = router.merge(build_collection_routes(prefix, state));
        }

        router
    }

    /// Get all registered collection names
    pub fn collections(&self) -> Vec<&str> {
        self.collections.iter().map(String::as_str).collect()
    }

    pub fn contains(&self, collection: &str) -> bool {
        self.collections.contains(collection)
    }
}

impl<S: Into<String>> FromIterator<S> for CollectionRegistry {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            collections: iter.into_iter().map(Into::into).collect(),
        }
    }
}
