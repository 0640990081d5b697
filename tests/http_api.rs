//! HTTP API Tests
//!
//! Requests go through the full `HttpServer` router (logging middleware,
//! CORS, fallback) with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use devcamp::http_server::{HttpServer, HttpServerConfig};
use devcamp::observability::{Logger, Severity};
use devcamp::rest_api::DocumentStore;

fn create_router() -> Router {
    Logger::set_min_severity(Severity::Error);

    let store = Arc::new(DocumentStore::new());
    store
        .import(&json!({
            "bootcamps": [
                {"_id": "b1", "name": "Devworks Bootcamp", "description": "Full stack web", "averageCost": 10000, "createdAt": "2024-01-01T00:00:00Z"},
                {"_id": "b2", "name": "ModernTech Bootcamp", "description": "Mobile first", "averageCost": 8000, "createdAt": "2024-01-02T00:00:00Z"},
                {"_id": "b3", "name": "Codemasters", "description": "Data science", "averageCost": 12000, "createdAt": "2024-01-03T00:00:00Z"}
            ],
            "courses": [
                {"_id": "c1", "title": "Front End Web Development", "tuition": 8000, "bootcamp": "b1", "createdAt": "2024-02-01T00:00:00Z"},
                {"_id": "c2", "title": "Full Stack Web Development", "tuition": 10000, "bootcamp": "b1", "createdAt": "2024-02-02T00:00:00Z"},
                {"_id": "c3", "title": "Mobile Development", "tuition": 9000, "bootcamp": "b2", "createdAt": "2024-02-03T00:00:00Z"}
            ],
            "reviews": [
                {"_id": "r1", "title": "Learned a ton", "rating": 8, "bootcamp": "b1", "createdAt": "2024-03-01T00:00:00Z"}
            ],
            "users": [
                {"_id": "u1", "name": "John Doe", "email": "john@gmail.com", "role": "user", "createdAt": "2024-04-01T00:00:00Z"}
            ]
        }))
        .unwrap();

    HttpServer::new(HttpServerConfig::default(), store).router()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// =============================================================================
// LIST ENDPOINTS
// =============================================================================

#[tokio::test]
async fn test_list_bootcamps_with_query() {
    let (status, body) = send(
        create_router(),
        get("/api/v1/bootcamps?averageCost[gte]=9000&sort=averageCost&select=name&limit=1"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "count": 1,
            "pagination": {"next": {"page": 2, "limit": 1}},
            "data": [{"_id": "b1", "name": "Devworks Bootcamp"}]
        })
    );
}

#[tokio::test]
async fn test_list_courses_expands_bootcamp() {
    let (status, body) = send(
        create_router(),
        get("/api/v1/courses?tuition%5Blt%5D=9500&sort=tuition"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(
        body["data"][0]["bootcamp"],
        json!({"_id": "b1", "name": "Devworks Bootcamp", "description": "Full stack web"})
    );
    assert_eq!(body["data"][1]["_id"], "c3");
}

#[tokio::test]
async fn test_malformed_query_is_bad_request() {
    let (status, body) = send(create_router(), get("/api/v1/reviews?rating=%7Bgte")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("rating"));
}

// =============================================================================
// SINGLE RECORDS
// =============================================================================

#[tokio::test]
async fn test_crud_lifecycle() {
    let router = create_router();

    let (status, created) = send(
        router.clone(),
        with_json(
            "POST",
            "/api/v1/bootcamps",
            json!({"name": "Launch School", "averageCost": 7000}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["_id"].as_str().unwrap().to_string();
    assert!(created["data"]["createdAt"].is_string());

    let (status, updated) = send(
        router.clone(),
        with_json(
            "PUT",
            &format!("/api/v1/bootcamps/{}", id),
            json!({"averageCost": 7500, "_id": "hijack"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["averageCost"], 7500);
    assert_eq!(updated["data"]["_id"], id.as_str());

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/api/v1/bootcamps/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, deleted) = send(router.clone(), delete).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({"success": true, "data": {}}));

    let (status, _) = send(router, get(&format!("/api/v1/bootcamps/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let (status, body) = send(
        create_router(),
        with_json(
            "POST",
            "/api/v1/users",
            json!({"name": "Jane", "email": "john@gmail.com"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

// =============================================================================
// NESTED UNDER BOOTCAMPS
// =============================================================================

#[tokio::test]
async fn test_bootcamp_reviews() {
    let router = create_router();

    let (status, body) = send(router.clone(), get("/api/v1/bootcamps/b1/reviews")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert!(body.get("pagination").is_none());

    let (status, _) = send(
        router,
        with_json(
            "POST",
            "/api/v1/bootcamps/nope/reviews",
            json!({"title": "Meh", "rating": 3}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// SERVER SURFACE
// =============================================================================

#[tokio::test]
async fn test_health_and_fallback() {
    let router = create_router();

    let (status, body) = send(router.clone(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(router, get("/api/v2/bootcamps")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");
}
