//! HTTP-level tests for the payment routes.
//!
//! Drives the full router against an in-memory SQLite store.
//!
//! This test requires the `sqlite` feature flag.

#![cfg(feature = "sqlite")]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use pos_hex::{PaymentService, inbound::HttpServer};
use pos_repo::SqliteRepo;
use pos_types::ItemDeletePolicy;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn create_app(policy: ItemDeletePolicy) -> Router {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    let service = PaymentService::new(repo).with_delete_policy(policy);
    HttpServer::new(service).router()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

/// Registers desk "D1", staff "E1" and manager "M1".
async fn seed(app: &Router) {
    let (status, _) = send(
        app,
        json_request(Method::POST, "/api/cash-desks", json!({ "number": "D1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    for (reg, role) in [("E1", "STAFF"), ("M1", "MANAGER")] {
        let (status, body) = send(
            app,
            json_request(
                Method::POST,
                "/api/employees",
                json!({
                    "registration_number": reg,
                    "first_name": "First",
                    "last_name": "Last",
                    "role": role
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["role"], role);
    }
}

async fn open_payment(app: &Router, employee: &str, payment_type: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            Method::POST,
            "/api/payments",
            json!({
                "cash_desk_number": "D1",
                "employee_registration_number": employee,
                "payment_type": payment_type
            }),
        ),
    )
    .await
}

async fn add_item(app: &Router, payment_id: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            Method::POST,
            &format!("/api/payments/{}/items", payment_id),
            json!({ "article_name": "Widget", "amount": 2, "price": "5.00" }),
        ),
    )
    .await
}

#[tokio::test]
async fn test_health() {
    let app = create_app(ItemDeletePolicy::Forbid).await;

    let (status, body) = send(&app, empty_request(Method::GET, "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_payment_lifecycle() {
    let app = create_app(ItemDeletePolicy::Forbid).await;
    seed(&app).await;

    let (status, payment) = open_payment(&app, "E1", "Cash").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["payment_type"], "Cash");
    assert!(payment["confirmed"].is_null());
    let id = payment["id"].as_str().unwrap().to_string();

    let (status, body) = open_payment(&app, "E1", "Cash").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);

    let (status, item) = add_item(&app, &id).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["article_name"], "Widget");

    let (status, confirmed) = send(
        &app,
        empty_request(Method::POST, &format!("/api/payments/{}/confirm", id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!confirmed["confirmed"].is_null());

    let (status, _) = add_item(&app, &id).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        empty_request(Method::POST, &format!("/api/payments/{}/confirm", id)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, details) = send(
        &app,
        empty_request(Method::GET, &format!("/api/payments/{}", id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["id"], id.as_str());
    assert_eq!(details["items"].as_array().unwrap().len(), 1);
    assert_eq!(details["total"], "10.00");

    let (status, items) = send(
        &app,
        empty_request(Method::GET, &format!("/api/payments/{}/items", id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_payment_errors() {
    let app = create_app(ItemDeletePolicy::Forbid).await;
    seed(&app).await;

    let (status, _) = open_payment(&app, "nobody", "Cash").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = open_payment(&app, "E1", "Bitcoin").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, _) = open_payment(&app, "E1", "CreditCard").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = open_payment(&app, "M1", "CreditCard").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_invalid_item_rejected() {
    let app = create_app(ItemDeletePolicy::Forbid).await;
    seed(&app).await;
    let (_, payment) = open_payment(&app, "E1", "Maestro").await;
    let id = payment["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/payments/{}/items", id),
            json!({ "article_name": "Widget", "amount": 0, "price": "5.00" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_payment_id() {
    let app = create_app(ItemDeletePolicy::Forbid).await;

    let (status, body) = send(
        &app,
        empty_request(Method::GET, "/api/payments/not-a-uuid"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_unknown_payment_not_found() {
    let app = create_app(ItemDeletePolicy::Forbid).await;

    let (status, _) = send(
        &app,
        empty_request(
            Method::POST,
            "/api/payments/00000000-0000-0000-0000-000000000000/confirm",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_payment_with_items() {
    let app = create_app(ItemDeletePolicy::Forbid).await;
    seed(&app).await;
    let (_, payment) = open_payment(&app, "E1", "Cash").await;
    let id = payment["id"].as_str().unwrap();
    add_item(&app, id).await;

    let (status, _) = send(
        &app,
        empty_request(Method::DELETE, &format!("/api/payments/{}", id)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        empty_request(
            Method::DELETE,
            &format!("/api/payments/{}?delete_items=true", id),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        empty_request(Method::GET, &format!("/api/payments/{}", id)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Deleting again is a no-op.
    let (status, _) = send(
        &app,
        empty_request(Method::DELETE, &format!("/api/payments/{}", id)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_delete_cascade_policy() {
    let app = create_app(ItemDeletePolicy::Cascade).await;
    seed(&app).await;
    let (_, payment) = open_payment(&app, "E1", "Cash").await;
    let id = payment["id"].as_str().unwrap();
    add_item(&app, id).await;

    let (status, _) = send(
        &app,
        empty_request(Method::DELETE, &format!("/api/payments/{}", id)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, payments) = send(&app, empty_request(Method::GET, "/api/payments")).await;
    assert!(payments.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_overflowing_item_rejected_and_payment_readable() {
    let app = create_app(ItemDeletePolicy::Forbid).await;
    seed(&app).await;
    let (_, payment) = open_payment(&app, "E1", "Cash").await;
    let id = payment["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/payments/{}/items", id),
            json!({
                "article_name": "Gold",
                "amount": 2,
                "price": "79228162514264337593543950335"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, details) = send(
        &app,
        empty_request(Method::GET, &format!("/api/payments/{}", id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["total"], "0");
}

#[tokio::test]
async fn test_malformed_body_is_json_bad_request() {
    let app = create_app(ItemDeletePolicy::Forbid).await;
    seed(&app).await;
    let (_, payment) = open_payment(&app, "E1", "Cash").await;
    let id = payment["id"].as_str().unwrap();

    for body in [
        json!({ "article_name": "Gold", "amount": 3000000000u64, "price": "1" }),
        json!({ "article_name": "Gold", "amount": 1, "price": "cheap" }),
        json!({ "article_name": "Gold" }),
    ] {
        let (status, body) = send(
            &app,
            json_request(Method::POST, &format!("/api/payments/{}/items", id), body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
    }
}

#[tokio::test]
async fn test_malformed_delete_query_is_json_bad_request() {
    let app = create_app(ItemDeletePolicy::Forbid).await;
    seed(&app).await;
    let (_, payment) = open_payment(&app, "E1", "Cash").await;
    let id = payment["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        empty_request(
            Method::DELETE,
            &format!("/api/payments/{}?delete_items=maybe", id),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, _) = send(
        &app,
        empty_request(Method::GET, &format!("/api/payments/{}", id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
