//! REST integration test macro for storage backends.
//!
//! The `rest_integration_tests!` macro generates HTTP-level tests that validate
//! a `DocumentStore` through full REST round-trips:
//! query string / JSON → HTTP request → handler → service → store → JSON envelope.

/// Generate a REST integration test suite for a storage backend.
///
/// `$store_factory` must produce an `impl DocumentStore + 'static` holding no
/// documents.
///
/// # Generated Tests
///
/// ## List (8 tests)
/// - `test_rest_list_filter_sort_page`: published courses, page 1 of 2, sorted by name
/// - `test_rest_list_second_page`: the window moves and `prev` appears
/// - `test_rest_list_defaults`: one record, newest first
/// - `test_rest_list_select`: projection keeps only the selected fields and id
/// - `test_rest_list_comparison`: bracket operators compare numerically
/// - `test_rest_list_in`: `[in]` takes a comma-separated list
/// - `test_rest_list_bad_pagination_falls_back`: garbage page/limit use defaults
/// - `test_rest_list_page_past_end`: a huge page is an empty page, not an error
///
/// ## CRUD (5 tests)
/// - `test_rest_create`, `test_rest_get`, `test_rest_update`, `test_rest_delete`
/// - `test_rest_create_rejects_non_object`
///
/// ## Error handling (5 tests)
/// - `test_rest_error_not_found`, `test_rest_error_invalid_id`
/// - `test_rest_error_malformed_filter`, `test_rest_error_unknown_route`
/// - `test_rest_error_operator_in_field_path`: `$` or an operator keyword in a dotted path
///
/// ## Health (1 test)
/// - `test_rest_health`
#[macro_export]
macro_rules! rest_integration_tests {
    ($store_factory:expr) => {
        mod rest_integration_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum_test::TestServer;
            use docquery::core::store::DocumentStore;
            use serde_json::{Value, json};
            use std::sync::Arc;
            use storage_harness::integration::{COURSES_PATH, build_test_router};

            async fn make_server() -> TestServer {
                let store: Arc<dyn DocumentStore> = Arc::new($store_factory);
                TestServer::try_new(build_test_router(store)).unwrap()
            }

            async fn make_seeded_server() -> TestServer {
                let store: Arc<dyn DocumentStore> = Arc::new($store_factory);
                seed_courses(store.as_ref()).await;
                TestServer::try_new(build_test_router(store)).unwrap()
            }

            fn data_names(body: &Value) -> Vec<String> {
                body["data"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|d| d["name"].as_str().unwrap().to_string())
                    .collect()
            }

            // ==============================================================
            // List
            // ==============================================================

            #[tokio::test]
            async fn test_rest_list_filter_sort_page() {
                let server = make_seeded_server().await;

                let response = server
                    .get(&format!(
                        "{}?isPublished=true&limit=2&page=1&sort=name",
                        COURSES_PATH
                    ))
                    .await;
                response.assert_status(StatusCode::OK);

                let body: Value = response.json();
                assert_eq!(body["success"], true);
                assert_eq!(body["count"], 2);
                assert_eq!(data_names(&body), vec!["Angular", "Node"]);
                assert_eq!(body["pagination"], json!({"next": {"page": 2, "limit": 2}}));
            }

            #[tokio::test]
            async fn test_rest_list_second_page() {
                let server = make_seeded_server().await;

                let response = server
                    .get(&format!(
                        "{}?isPublished=true&limit=2&page=2&sort=name",
                        COURSES_PATH
                    ))
                    .await;
                response.assert_status(StatusCode::OK);

                let body: Value = response.json();
                assert_eq!(data_names(&body), vec!["Rust"]);
                assert_eq!(body["pagination"]["prev"], json!({"page": 1, "limit": 2}));
                // the total counts the whole collection (5), not the 3 matches
                assert_eq!(body["pagination"]["next"], json!({"page": 3, "limit": 2}));
            }

            #[tokio::test]
            async fn test_rest_list_defaults() {
                let server = make_seeded_server().await;

                let response = server.get(COURSES_PATH).await;
                response.assert_status(StatusCode::OK);

                let body: Value = response.json();
                assert_eq!(body["count"], 1);
                assert_eq!(data_names(&body), vec!["PHP"]);
                assert_eq!(body["pagination"], json!({"next": {"page": 2, "limit": 1}}));
            }

            #[tokio::test]
            async fn test_rest_list_select() {
                let server = make_seeded_server().await;

                let response = server
                    .get(&format!("{}?select=name,weeks&sort=name&limit=5", COURSES_PATH))
                    .await;
                response.assert_status(StatusCode::OK);

                let body: Value = response.json();
                assert_eq!(body["count"], 5);
                for record in body["data"].as_array().unwrap() {
                    let mut keys: Vec<&str> =
                        record.as_object().unwrap().keys().map(String::as_str).collect();
                    keys.sort_unstable();
                    assert_eq!(keys, vec!["id", "name", "weeks"]);
                }
            }

            #[tokio::test]
            async fn test_rest_list_comparison() {
                let server = make_seeded_server().await;

                // weeks[gte]=8&weeks[lt]=12
                let response = server
                    .get(&format!(
                        "{}?weeks%5Bgte%5D=8&weeks%5Blt%5D=12&sort=name&limit=10",
                        COURSES_PATH
                    ))
                    .await;
                response.assert_status(StatusCode::OK);

                let body: Value = response.json();
                assert_eq!(data_names(&body), vec!["Angular", "Rust"]);
            }

            #[tokio::test]
            async fn test_rest_list_in() {
                let server = make_seeded_server().await;

                // name[in]=Go,PHP
                let response = server
                    .get(&format!("{}?name%5Bin%5D=Go,PHP&sort=name&limit=10", COURSES_PATH))
                    .await;
                response.assert_status(StatusCode::OK);

                let body: Value = response.json();
                assert_eq!(data_names(&body), vec!["Go", "PHP"]);
            }

            #[tokio::test]
            async fn test_rest_list_bad_pagination_falls_back() {
                let server = make_seeded_server().await;

                let response = server
                    .get(&format!("{}?page=abc&limit=-3&sort=name", COURSES_PATH))
                    .await;
                response.assert_status(StatusCode::OK);

                let body: Value = response.json();
                assert_eq!(data_names(&body), vec!["Angular"]);
                assert!(body["pagination"].get("prev").is_none());
            }

            #[tokio::test]
            async fn test_rest_list_page_past_end() {
                let server = make_seeded_server().await;

                let response = server
                    .get(&format!("{}?page=9999999999999999999&limit=2", COURSES_PATH))
                    .await;
                response.assert_status(StatusCode::OK);

                let body: Value = response.json();
                assert_eq!(body["count"], 0);
                assert!(body["pagination"].get("next").is_none());
                assert_eq!(
                    body["pagination"]["prev"],
                    json!({"page": 9999999999999999998_u64, "limit": 2})
                );
            }

            // ==============================================================
            // CRUD
            // ==============================================================

            #[tokio::test]
            async fn test_rest_create() {
                let server = make_server().await;

                let response = server
                    .post(COURSES_PATH)
                    .json(&json!({
                        "name": "Rust",
                        "weeks": 8,
                        "isPublished": true
                    }))
                    .await;
                response.assert_status(StatusCode::CREATED);

                let body: Value = response.json();
                assert_eq!(body["success"], true);
                assert_eq!(body["data"]["name"], "Rust");
                assert_eq!(body["data"]["weeks"], 8);
                assert!(body["data"]["createdAt"].is_string());
                uuid::Uuid::parse_str(body["data"]["id"].as_str().unwrap()).unwrap();
            }

            #[tokio::test]
            async fn test_rest_get() {
                let server = make_server().await;

                let created: Value = server
                    .post(COURSES_PATH)
                    .json(&json!({"name": "Go", "weeks": 6}))
                    .await
                    .json();
                let id = created["data"]["id"].as_str().unwrap();

                let response = server.get(&format!("{}/{}", COURSES_PATH, id)).await;
                response.assert_status(StatusCode::OK);

                let body: Value = response.json();
                assert_eq!(body["success"], true);
                assert_eq!(body["data"]["id"], id);
                assert_eq!(body["data"]["name"], "Go");
            }

            #[tokio::test]
            async fn test_rest_update() {
                let server = make_server().await;

                let created: Value = server
                    .post(COURSES_PATH)
                    .json(&json!({"name": "Node", "weeks": 4}))
                    .await
                    .json();
                let id = created["data"]["id"].as_str().unwrap();

                let response = server
                    .put(&format!("{}/{}", COURSES_PATH, id))
                    .json(&json!({"weeks": 5}))
                    .await;
                response.assert_status(StatusCode::OK);

                let body: Value = response.json();
                assert_eq!(body["data"]["weeks"], 5);
                assert_eq!(body["data"]["name"], "Node");

                let missing = uuid::Uuid::new_v4();
                server
                    .put(&format!("{}/{}", COURSES_PATH, missing))
                    .json(&json!({"weeks": 5}))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_rest_delete() {
                let server = make_server().await;

                let created: Value = server
                    .post(COURSES_PATH)
                    .json(&json!({"name": "PHP"}))
                    .await
                    .json();
                let id = created["data"]["id"].as_str().unwrap();
                let path = format!("{}/{}", COURSES_PATH, id);

                let response = server.delete(&path).await;
                response.assert_status(StatusCode::OK);
                assert_eq!(response.json::<Value>(), json!({"success": true, "data": {}}));

                server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
                server.delete(&path).await.assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_rest_create_rejects_non_object() {
                let server = make_server().await;

                let response = server.post(COURSES_PATH).json(&json!([1, 2, 3])).await;
                response.assert_status(StatusCode::BAD_REQUEST);

                let body: Value = response.json();
                assert_eq!(body["success"], false);
                assert_eq!(body["code"], "INVALID_BODY");
            }

            // ==============================================================
            // Error handling
            // ==============================================================

            #[tokio::test]
            async fn test_rest_error_not_found() {
                let server = make_seeded_server().await;
                let missing = uuid::Uuid::new_v4();

                let response = server.get(&format!("{}/{}", COURSES_PATH, missing)).await;
                response.assert_status(StatusCode::NOT_FOUND);

                let body: Value = response.json();
                assert_eq!(body["success"], false);
                assert_eq!(body["code"], "RECORD_NOT_FOUND");
                assert_eq!(
                    body["error"],
                    format!("courses record not found with id of {}", missing)
                );
            }

            #[tokio::test]
            async fn test_rest_error_invalid_id() {
                let server = make_server().await;

                let response = server
                    .get(&format!("{}/5e6ba63f37db4e061c4d5a27", COURSES_PATH))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);

                let body: Value = response.json();
                assert_eq!(body["code"], "INVALID_RECORD_ID");
            }

            #[tokio::test]
            async fn test_rest_error_malformed_filter() {
                let server = make_seeded_server().await;

                // weeks[gte=8
                let response = server
                    .get(&format!("{}?weeks%5Bgte=8", COURSES_PATH))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);

                let body: Value = response.json();
                assert_eq!(body["code"], "MALFORMED_FILTER");
                assert_eq!(body["details"]["field"], "weeks[gte");
            }

            #[tokio::test]
            async fn test_rest_error_operator_in_field_path() {
                let server = make_seeded_server().await;

                // price.$gt=5, then tags.in=x
                for (query, field) in [("price.%24gt=5", "price.$gt"), ("tags.in=x", "tags.in")] {
                    let response = server.get(&format!("{}?{}", COURSES_PATH, query)).await;
                    response.assert_status(StatusCode::BAD_REQUEST);

                    let body: Value = response.json();
                    assert_eq!(body["success"], false);
                    assert_eq!(body["code"], "MALFORMED_FILTER");
                    assert_eq!(body["details"]["field"], field);
                }
            }

            #[tokio::test]
            async fn test_rest_error_unknown_route() {
                let server = make_server().await;

                let response = server.get("/api/v1/bootcamps").await;
                response.assert_status(StatusCode::NOT_FOUND);

                let body: Value = response.json();
                assert_eq!(body["code"], "ROUTE_NOT_FOUND");
            }

            #[tokio::test]
            async fn test_rest_health() {
                let server = make_server().await;

                let response = server.get("/health").await;
                response.assert_status(StatusCode::OK);
                assert_eq!(response.json::<Value>()["status"], "ok");
            }
        }
    };
}
