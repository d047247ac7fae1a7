//! Macro-generated test suite for `DocumentStore` contract validation.
//!
//! The `document_store_tests!` macro generates a test module that validates
//! any `DocumentStore` implementation against the full contract: CRUD,
//! filtering with string operands against typed values, projection, sorting,
//! windowing and concurrent access.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use docquery::storage::InMemoryDocumentStore;
//!
//! document_store_tests!(InMemoryDocumentStore::new());
//! ```
//!
//! # Generated Tests
//!
//! ## CRUD
//! - `test_insert_and_find_by_id`: insert then retrieve, verify all fields
//! - `test_find_by_id_missing`: random UUID returns None
//! - `test_update_merges_fields`: `$set` semantics, untouched fields kept
//! - `test_update_missing`: unknown id returns None
//! - `test_delete_returns_document`: delete then lookup returns None
//! - `test_delete_missing`: unknown id returns None
//!
//! ## Queries
//! - `test_count_all_and_filtered`
//! - `test_filter_boolean_from_string`, `test_filter_integer_from_string`
//! - `test_filter_range_on_floats`, `test_filter_in`
//! - `test_filter_array_membership`, `test_filter_embedded_field`
//! - `test_sort_and_window`, `test_sort_descending`
//! - `test_projection_include`, `test_projection_exclude`
//!
//! ## Edge Cases
//! - `test_empty_collection`
//! - `test_concurrent_inserts`: parallel inserts from spawned tasks

/// Generate a full `DocumentStore` conformance test suite.
///
/// `$factory` must be an expression that evaluates to a fresh, empty store.
/// It is re-evaluated for each test to ensure isolation.
#[macro_export]
macro_rules! document_store_tests {
    ($factory:expr) => {
        mod document_store_contract_tests {
            use super::*;
            use docquery::core::document::Document;
            use docquery::core::filter::{ComparisonOperator, FilterExpression};
            use docquery::core::projection::ProjectionSpec;
            use docquery::core::sort::{SortDirection, SortSpec};
            use docquery::core::store::{DocumentStore, FindOptions};
            use serde_json::json;
            use std::sync::Arc;
            use uuid::Uuid;

            fn by_name() -> SortSpec {
                SortSpec::new(vec![("name".to_string(), SortDirection::Ascending)])
            }

            fn find_all(filter: FilterExpression) -> FindOptions {
                FindOptions {
                    filter,
                    projection: ProjectionSpec::all(),
                    sort: by_name(),
                    skip: 0,
                    limit: 100,
                }
            }

            // ==================================================================
            // CRUD
            // ==================================================================

            #[tokio::test]
            async fn test_insert_and_find_by_id() {
                let store = $factory;
                let doc = course("Rust", 8, 8000.0, true, "2024-01-01T00:00:00.000000Z");
                let id = id_of(&doc);

                let stored = store.insert(COURSES, doc).await.unwrap();
                assert_eq!(id_of(&stored), id);

                let found = store.find_by_id(COURSES, &id).await.unwrap().unwrap();
                assert_eq!(found["name"], "Rust");
                assert_eq!(found["weeks"], 8);
                assert_eq!(found["tuition"], 8000.0);
                assert_eq!(found["isPublished"], true);
                assert_eq!(found["tags"], json!(["web", "rust"]));
                assert_eq!(found["location"]["city"], "Boston");
            }

            #[tokio::test]
            async fn test_find_by_id_missing() {
                let store = $factory;
                seed_courses(&store).await;
                let found = store.find_by_id(COURSES, &Uuid::new_v4()).await.unwrap();
                assert!(found.is_none());
            }

            #[tokio::test]
            async fn test_update_merges_fields() {
                let store = $factory;
                let seeded = seed_courses(&store).await;
                let id = id_of(&seeded[0]);

                let patch = into_document(json!({"weeks": 9, "description": "Ownership"}));
                let updated = store
                    .update_by_id(COURSES, &id, patch)
                    .await
                    .unwrap()
                    .expect("record should exist");

                assert_eq!(id_of(&updated), id);
                assert_eq!(updated["weeks"], 9);
                assert_eq!(updated["description"], "Ownership");
                assert_eq!(updated["name"], "Rust");

                let reloaded = store.find_by_id(COURSES, &id).await.unwrap().unwrap();
                assert_eq!(reloaded, updated);
            }

            #[tokio::test]
            async fn test_update_missing() {
                let store = $factory;
                let patch = into_document(json!({"weeks": 1}));
                let updated = store
                    .update_by_id(COURSES, &Uuid::new_v4(), patch)
                    .await
                    .unwrap();
                assert!(updated.is_none());
            }

            #[tokio::test]
            async fn test_delete_returns_document() {
                let store = $factory;
                let seeded = seed_courses(&store).await;
                let id = id_of(&seeded[1]);

                let deleted = store.delete_by_id(COURSES, &id).await.unwrap().unwrap();
                assert_eq!(deleted["name"], "Go");
                assert!(store.find_by_id(COURSES, &id).await.unwrap().is_none());
                assert_eq!(store.count(COURSES, None).await.unwrap(), 4);
            }

            #[tokio::test]
            async fn test_delete_missing() {
                let store = $factory;
                let deleted = store.delete_by_id(COURSES, &Uuid::new_v4()).await.unwrap();
                assert!(deleted.is_none());
            }

            // ==================================================================
            // Queries
            // ==================================================================

            #[tokio::test]
            async fn test_count_all_and_filtered() {
                let store = $factory;
                seed_courses(&store).await;

                assert_eq!(store.count(COURSES, None).await.unwrap(), 5);
                let published = FilterExpression::new().with_equals("isPublished", "true");
                assert_eq!(store.count(COURSES, Some(&published)).await.unwrap(), 3);
            }

            #[tokio::test]
            async fn test_filter_boolean_from_string() {
                let store = $factory;
                seed_courses(&store).await;

                let filter = FilterExpression::new().with_equals("isPublished", "false");
                let docs = store.find(COURSES, &find_all(filter)).await.unwrap();
                assert_eq!(names(&docs), vec!["Go", "PHP"]);
            }

            #[tokio::test]
            async fn test_filter_integer_from_string() {
                let store = $factory;
                seed_courses(&store).await;

                let filter = FilterExpression::new().with_equals("weeks", "10");
                let docs = store.find(COURSES, &find_all(filter)).await.unwrap();
                assert_eq!(names(&docs), vec!["Angular"]);
            }

            #[tokio::test]
            async fn test_filter_range_on_floats() {
                let store = $factory;
                seed_courses(&store).await;

                let filter = FilterExpression::new()
                    .with_comparison("tuition", ComparisonOperator::Gt, "6000")
                    .with_comparison("tuition", ComparisonOperator::Lte, "9999.5");
                let docs = store.find(COURSES, &find_all(filter)).await.unwrap();
                assert_eq!(names(&docs), vec!["Angular", "Go", "Rust"]);
            }

            #[tokio::test]
            async fn test_filter_in() {
                let store = $factory;
                seed_courses(&store).await;

                let filter = FilterExpression::new().with_comparison(
                    "name",
                    ComparisonOperator::In,
                    json!(["Node", "PHP", "Cobol"]),
                );
                let docs = store.find(COURSES, &find_all(filter)).await.unwrap();
                assert_eq!(names(&docs), vec!["Node", "PHP"]);
            }

            #[tokio::test]
            async fn test_filter_array_membership() {
                let store = $factory;
                seed_courses(&store).await;

                let filter = FilterExpression::new().with_equals("tags", "go");
                let docs = store.find(COURSES, &find_all(filter)).await.unwrap();
                assert_eq!(names(&docs), vec!["Go"]);
            }

            #[tokio::test]
            async fn test_filter_embedded_field() {
                let store = $factory;
                seed_courses(&store).await;

                let filter = FilterExpression::new().with_equals("location.city", "Boston");
                assert_eq!(store.count(COURSES, Some(&filter)).await.unwrap(), 5);

                let filter = FilterExpression::new().with_equals("location.city", "Paris");
                assert_eq!(store.count(COURSES, Some(&filter)).await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_sort_and_window() {
                let store = $factory;
                seed_courses(&store).await;

                let mut options = find_all(FilterExpression::new());
                options.skip = 1;
                options.limit = 2;
                let docs = store.find(COURSES, &options).await.unwrap();
                assert_eq!(names(&docs), vec!["Go", "Node"]);
            }

            #[tokio::test]
            async fn test_sort_descending() {
                let store = $factory;
                seed_courses(&store).await;

                let mut options = find_all(FilterExpression::new());
                options.sort =
                    SortSpec::new(vec![("createdAt".to_string(), SortDirection::Descending)]);
                options.limit = 1;
                let docs = store.find(COURSES, &options).await.unwrap();
                assert_eq!(names(&docs), vec!["PHP"]);
            }

            #[tokio::test]
            async fn test_projection_include() {
                let store = $factory;
                seed_courses(&store).await;

                let mut options = find_all(FilterExpression::new());
                options.projection = ProjectionSpec::include(["name", "weeks"]);
                options.limit = 1;
                let docs = store.find(COURSES, &options).await.unwrap();

                let mut keys: Vec<&str> = docs[0].keys().map(String::as_str).collect();
                keys.sort_unstable();
                assert_eq!(keys, vec!["id", "name", "weeks"]);
            }

            #[tokio::test]
            async fn test_projection_exclude() {
                let store = $factory;
                seed_courses(&store).await;

                let mut options = find_all(FilterExpression::new());
                options.projection = ProjectionSpec::exclude(["tags", "location"]);
                let docs = store.find(COURSES, &options).await.unwrap();

                assert_eq!(docs.len(), 5);
                for doc in &docs {
                    assert!(doc.contains_key("id"));
                    assert!(doc.contains_key("name"));
                    assert!(!doc.contains_key("tags"));
                    assert!(!doc.contains_key("location"));
                }
            }

            // ==================================================================
            // Edge Cases
            // ==================================================================

            #[tokio::test]
            async fn test_empty_collection() {
                let store = $factory;
                assert_eq!(store.count(COURSES, None).await.unwrap(), 0);
                let docs = store
                    .find(COURSES, &find_all(FilterExpression::new()))
                    .await
                    .unwrap();
                assert!(docs.is_empty());
            }

            #[tokio::test]
            async fn test_concurrent_inserts() {
                let store: Arc<dyn DocumentStore> = Arc::new($factory);
                let mut handles = Vec::new();

                for i in 0..10 {
                    let store = store.clone();
                    handles.push(tokio::spawn(async move {
                        let doc: Document = course(
                            &format!("Course {}", i),
                            i,
                            1000.0,
                            true,
                            "2024-01-01T00:00:00.000000Z",
                        );
                        store.insert(COURSES, doc).await.unwrap();
                    }));
                }
                for handle in handles {
                    handle.await.unwrap();
                }

                assert_eq!(store.count(COURSES, None).await.unwrap(), 10);
            }
        }
    };
}
