//! Round-trips through the real HTTP transport against an in-process server

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use ::common::prelude::*;
use ::common::token::TokenCache;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use reqwest::Method;
use serde_json::{json, Value};

async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn header(headers: &HeaderMap, name: &str) -> Value {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| json!(v))
        .unwrap_or(Value::Null)
}

async fn echo_headers(headers: HeaderMap, body: String) -> Json<Value> {
    Json(json!({
        "authorization": header(&headers, "authorization"),
        "content_type": header(&headers, "content-type"),
        "accept": header(&headers, "accept"),
        "canned": header(&headers, "x-amz-acl"),
        "body": body,
    }))
}

async fn issue_token(Form(form): Form<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    if form.get("grant_type").map(String::as_str) != Some("refresh_token")
        || form.get("refresh_token").map(String::as_str) != Some("api-token")
    {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid_grant"})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "access_token": "bearer-1",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": null
        })),
    )
}

fn router() -> Router {
    Router::new()
        .route("/headers", put(echo_headers).post(echo_headers))
        .route("/empty", put(|| async { StatusCode::NO_CONTENT }))
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, "no such bucket") }),
        )
        .route("/oauth/tenant/acme/token", post(issue_token))
        .route(
            "/oauth/tenant/forever/token",
            post(|| async { Json(json!({"access_token": "bearer-2", "expires_in": i64::MAX})) }),
        )
}

async fn static_transport() -> HttpTransport {
    HttpTransport::connect(
        &TransportOptions::default(),
        Arc::new(StaticTokenSource::new("static-token")),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_json_round_trip_carries_headers() {
    let addr = spawn(router()).await;
    let transport = static_transport().await;

    let request = Request::new(Method::PUT, format!("http://{}/headers", addr))
        .json(r#"{"name":"films"}"#)
        .header("x-amz-acl", "private");
    let body = transport.execute(request).await.unwrap();

    let seen: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(seen["authorization"], "Bearer static-token");
    assert_eq!(seen["content_type"], "application/json");
    assert_eq!(seen["accept"], "application/json");
    assert_eq!(seen["canned"], "private");
    assert_eq!(seen["body"], r#"{"name":"films"}"#);
}

#[tokio::test]
async fn test_no_content_is_success() {
    let addr = spawn(router()).await;
    let transport = static_transport().await;

    let body = transport
        .execute(Request::new(Method::PUT, format!("http://{}/empty", addr)))
        .await
        .unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_error_status_is_surfaced() {
    let addr = spawn(router()).await;
    let transport = static_transport().await;

    let err = transport
        .execute(Request::new(Method::GET, format!("http://{}/missing", addr)))
        .await
        .unwrap_err();

    match err {
        ApiError::HttpStatus(status, text) => {
            assert_eq!(status, StatusCode::NOT_FOUND.as_u16());
            assert_eq!(text, "no such bucket");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_connection_failure_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let transport = static_transport().await;

    let err = transport
        .execute(Request::new(Method::GET, format!("http://{}/anything", addr)))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn test_vcd_token_exchange() {
    let addr = spawn(router()).await;
    let source = VcdTokenSource::new(
        reqwest::Client::new(),
        &format!("http://{}", addr),
        "acme",
        "api-token",
    )
    .unwrap();

    let token = source.fetch().await.unwrap();

    assert_eq!(token.access_token(), "bearer-1");
    assert!(token.expires_at().is_some());
}

#[tokio::test]
async fn test_exchanged_token_is_sent() {
    let addr = spawn(router()).await;
    let source = VcdTokenSource::new(
        reqwest::Client::new(),
        &format!("http://{}/api", addr),
        "acme",
        "api-token",
    )
    .unwrap();
    let tokens = TokenCache::fetch(Arc::new(source), std::time::Duration::from_secs(60))
        .await
        .unwrap();
    let transport = HttpTransport::with_client(reqwest::Client::new(), tokens);

    let body = transport
        .execute(Request::new(Method::POST, format!("http://{}/headers", addr)))
        .await
        .unwrap();

    let seen: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(seen["authorization"], "Bearer bearer-1");
}

#[tokio::test]
async fn test_rejected_token_fails_construction() {
    let addr = spawn(router()).await;
    let source = VcdTokenSource::new(
        reqwest::Client::new(),
        &format!("http://{}", addr),
        "acme",
        "wrong-token",
    )
    .unwrap();

    let err = HttpTransport::connect(&TransportOptions::default(), Arc::new(source))
        .await
        .unwrap_err();

    match err {
        ApiError::Token(TokenError::Rejected(status, _)) => {
            assert_eq!(status, StatusCode::UNAUTHORIZED.as_u16())
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unrepresentable_lifetime_never_expires() {
    let addr = spawn(router()).await;
    let source = VcdTokenSource::new(
        reqwest::Client::new(),
        &format!("http://{}", addr),
        "forever",
        "api-token",
    )
    .unwrap();

    let token = source.fetch().await.unwrap();

    assert_eq!(token.access_token(), "bearer-2");
    assert_eq!(token.expires_at(), None);
}
