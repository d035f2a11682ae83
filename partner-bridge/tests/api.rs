mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use common::*;
use partner_bridge::listener::MessageListener;
use partner_bridge::router::{MessageRouter, RouterCapabilities};
use partner_bridge::services::{HttpAuthGateway, PageChannel};
use partner_bridge::startup::build_router;
use partner_bridge::AppState;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower::util::ServiceExt;

struct TestBridge {
    app: Router,
    page: PageChannel,
    backend: MockBackend,
}

async fn spawn_bridge(backend_status: StatusCode, backend_body: &'static str) -> TestBridge {
    let backend = MockBackend::spawn(backend_status, backend_body).await;
    let page = PageChannel::new(16);

    let router = Arc::new(MessageRouter::new(
        trust_policy(),
        Arc::new(HttpAuthGateway::new(backend.settings()).unwrap()),
        Arc::new(page.clone()),
        Arc::new(page.clone()),
        router_config(RouterCapabilities::full_page(), Duration::ZERO),
    ));
    let (listener, _task) = MessageListener::spawn(router, 16);

    TestBridge {
        app: build_router(AppState::new(listener, page.clone())),
        page,
        backend,
    }
}

fn post_message(origin: &str, data: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/messages")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"origin": origin, "data": data}).to_string(),
        ))
        .unwrap()
}

async fn next_command(
    rx: &mut broadcast::Receiver<partner_bridge::models::PageCommand>,
) -> partner_bridge::models::PageCommand {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("page command within timeout")
        .expect("page channel open")
}

#[tokio::test]
async fn health_check_works() {
    let bridge = spawn_bridge(StatusCode::OK, r#"{"message":"ok"}"#).await;

    let response = bridge
        .app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn request_id_is_echoed() {
    let bridge = spawn_bridge(StatusCode::OK, r#"{"message":"ok"}"#).await;

    let response = bridge
        .app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn trusted_auth_message_drives_exchange_ack_and_navigation() {
    let bridge = spawn_bridge(StatusCode::OK, r#"{"message":"ok"}"#).await;
    let mut commands = bridge.page.subscribe();

    let response = bridge
        .app
        .oneshot(post_message(TRUSTED_ORIGIN, AUTH_BODY))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    assert_eq!(next_command(&mut commands).await, auth_ack());
    assert_eq!(next_command(&mut commands).await, navigate("/"));
    assert_eq!(
        bridge.backend.requests(),
        vec![json!({"token": "tok123", "user_id": "u1"})]
    );
}

#[tokio::test]
async fn untrusted_message_is_accepted_but_has_no_effect() {
    let bridge = spawn_bridge(StatusCode::OK, r#"{"message":"ok"}"#).await;
    let mut commands = bridge.page.subscribe();

    let response = bridge
        .app
        .clone()
        .oneshot(post_message(UNTRUSTED_ORIGIN, AUTH_BODY))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // A trusted logout queued afterwards is the first thing the page sees
    let response = bridge
        .app
        .oneshot(post_message(TRUSTED_ORIGIN, r#"{"event_type":"logout"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    assert_eq!(next_command(&mut commands).await, navigate("/auth/logout"));
    assert!(bridge.backend.requests().is_empty());
}

#[tokio::test]
async fn failed_exchange_produces_no_page_commands() {
    let bridge = spawn_bridge(StatusCode::OK, r#"{"error":"invalid token"}"#).await;
    let mut commands = bridge.page.subscribe();

    let app = bridge.app.clone();
    let response = app
        .oneshot(post_message(TRUSTED_ORIGIN, AUTH_BODY))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = bridge
        .app
        .oneshot(post_message(
            TRUSTED_SUBDOMAIN,
            r#"{"event_type":"auth_redirect"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // Only the redirect reaches the page; the failed login stays silent
    assert_eq!(next_command(&mut commands).await, navigate("/stats"));
    for _ in 0..50 {
        if !bridge.backend.requests().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(commands.try_recv().is_err());
    assert_eq!(bridge.backend.requests().len(), 1);
}

#[tokio::test]
async fn malformed_envelope_is_rejected_by_extractor() {
    let bridge = spawn_bridge(StatusCode::OK, r#"{"message":"ok"}"#).await;

    let response = bridge
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/messages")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"origin": 1}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn events_endpoint_is_an_sse_stream() {
    let bridge = spawn_bridge(StatusCode::OK, r#"{"message":"ok"}"#).await;

    let response = bridge
        .app
        .oneshot(Request::builder().uri("/events").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
}

#[tokio::test]
async fn http_metrics_use_route_templates_not_raw_paths() {
    partner_bridge::services::metrics::init_metrics().unwrap();
    let bridge = spawn_bridge(StatusCode::OK, r#"{"message":"ok"}"#).await;
    let stray = format!("/wp-admin/{}", uuid::Uuid::new_v4());

    let response = bridge
        .app
        .clone()
        .oneshot(Request::builder().uri(&stray).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    bridge
        .app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let text = partner_bridge::services::metrics::get_metrics();
    assert!(text.contains(r#"path="unmatched""#));
    assert!(text.contains(r#"path="/health""#));
    assert!(!text.contains(&stray));
}
