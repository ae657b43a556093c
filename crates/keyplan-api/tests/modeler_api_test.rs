//! HTTP contract tests for the keyplan API.
//!
//! Drives the router in-process and verifies status codes, camelCase wire
//! names, request ID propagation and error bodies.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use keyplan_api::{build_router, AppState, ServerConfig};
use keyplan_core::{BatchPolicy, ModelerConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    build_router(AppState::new(ModelerConfig::default()), &ServerConfig::default())
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn accounts_entity() -> Value {
    json!({
        "entityName": "Account Activity",
        "fields": [
            {"name": "account_id", "cardinality": "HIGH", "dataType": "uuid"},
            {"name": "occurred_at", "timeField": true, "dataType": "timestamp"},
            {"name": "amount", "dataType": "decimal"}
        ],
        "accessPatterns": [
            {
                "name": "statement",
                "filters": [
                    {"field": "account_id", "type": "EQUALITY"},
                    {"field": "occurred_at", "type": "RANGE"}
                ]
            }
        ]
    })
}

#[tokio::test]
async fn test_health_reports_version() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body = read_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_generate_returns_camel_case_layout() {
    let request = json!({"entities": [accounts_entity()]});
    let response = app()
        .oneshot(post_json("/api/modeler/generate", request.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let entity = &body["entities"][0];

    assert_eq!(entity["entityName"], "Account Activity");
    assert_eq!(entity["tableName"], "account_activity");
    assert_eq!(entity["keyspace"], "odp_modeler");
    assert_eq!(entity["partitionKey"], json!(["account_id"]));
    assert_eq!(entity["clusteringKeys"][0]["field"], "occurred_at");
    assert_eq!(entity["clusteringKeys"][0]["order"], "DESC");
    assert_eq!(entity["clusteringKeys"][0]["type"], "RANGE");
    assert!(entity["createTableCql"]
        .as_str()
        .unwrap()
        .contains("PRIMARY KEY ((account_id), occurred_at)"));
    assert_eq!(entity["indexCql"], json!([]));
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn test_validation_failure_is_bad_request() {
    let request = json!({
        "entities": [{
            "entityName": "Ledger",
            "fields": [{"name": "id"}],
            "accessPatterns": []
        }]
    });
    let response = app()
        .oneshot(post_json("/api/modeler/generate", request.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(
        body["error"],
        "At least one access pattern is required for Ledger."
    );
}

#[tokio::test]
async fn test_empty_request_is_bad_request() {
    let response = app()
        .oneshot(post_json("/api/modeler/generate", json!({"entities": []}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(
        body["error"],
        "At least one entity is required to generate a data model."
    );
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let response = app()
        .oneshot(post_json("/api/modeler/generate", "{\"entities\": [".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_isolate_policy_reports_rejections_alongside_layouts() {
    let state = AppState::new(ModelerConfig::default().with_batch_policy(BatchPolicy::IsolatePerEntity));
    let app = build_router(state, &ServerConfig::default());
    let request = json!({
        "entities": [
            {"entityName": "Broken", "fields": [], "accessPatterns": []},
            accounts_entity()
        ]
    });

    let response = app
        .oneshot(post_json("/api/modeler/generate", request.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["entities"].as_array().unwrap().len(), 1);
    assert_eq!(
        body["errors"],
        json!([{"index": 0, "entityName": "Broken", "message": "Fields are required for Broken."}])
    );
}

#[tokio::test]
async fn test_openapi_document_lists_generate_endpoint() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(body["paths"]["/api/modeler/generate"]["post"].is_object());
    assert!(body["components"]["schemas"]["ModelingRequest"].is_object());
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let config = ServerConfig {
        max_body_bytes: 64,
        ..ServerConfig::default()
    };
    let app = build_router(AppState::new(ModelerConfig::default()), &config);
    let request = json!({"entities": [accounts_entity()]});

    let response = app
        .oneshot(post_json("/api/modeler/generate", request.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
