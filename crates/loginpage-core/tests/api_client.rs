//! Backend endpoints beyond login.

use loginpage_core::models::{Credentials, UserId};
use loginpage_core::{ApiClient, ApiError, ApiResponse, LoginApi};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn login_returns_raw_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"nope"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/", server.uri())).expect("client builds");
    let response = client
        .login(&Credentials::new("a@b.c", "pw"))
        .await
        .expect("request completes");

    assert_eq!(response, ApiResponse::new(401, r#"{"error":"nope"}"#));
    assert!(!response.is_success());
}

#[tokio::test]
async fn register_returns_created_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register"))
        .and(body_json(json!({"email": "ada@example.com", "password": "pw", "name": "Ada"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Registration successful",
            "user": {"id": "6f1c", "email": "ada@example.com", "name": "Ada"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).expect("client builds");
    let user = client
        .register("ada@example.com", "pw", "Ada")
        .await
        .expect("registration succeeds");

    assert_eq!(user.id, UserId::Text("6f1c".into()));
    assert_eq!(user.name, "Ada");
}

#[tokio::test]
async fn register_surfaces_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "User already exists"})),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).expect("client builds");
    let err = client
        .register("ada@example.com", "pw", "Ada")
        .await
        .expect_err("registration fails");

    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Rejected { status, message }) => {
            assert_eq!(*status, 400);
            assert_eq!(message, "User already exists");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn verify_token_sends_bearer_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/verify-token"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Token valid",
            "user": {"id": 7, "email": "ada@example.com", "name": "Ada"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).expect("client builds");
    let user = client.verify_token("abc123").await.expect("token is valid");
    assert_eq!(user.id, UserId::Number(7));
    assert_eq!(user.email, "ada@example.com");
}

#[tokio::test]
async fn verify_token_rejection_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/verify-token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid token"})))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).expect("client builds");
    let err = client.verify_token("stale").await.expect_err("token rejected");
    assert!(err.to_string().contains("Invalid token"));
}

#[tokio::test]
async fn health_reports_backend_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "healthy", "message": "API is running"})),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).expect("client builds");
    let health = client.health().await.expect("health check succeeds");
    assert!(health.is_healthy());
}
