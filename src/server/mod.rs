//! Server module for building HTTP servers with auto-registered routes
//!
//! This module provides a `ServerBuilder` that mounts:
//! - CRUD and list routes for every configured collection
//! - Health check routes
//! - A JSON fallback for unknown paths

pub mod builder;
pub mod handlers;
pub mod registry;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::CollectionState;
pub use registry::CollectionRegistry;
