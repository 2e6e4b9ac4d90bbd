use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use tower::ServiceExt;

use saveclip::config::AppConfig;
use saveclip::server::ApplicationServer;
use saveclip::server::services::app_services::AppServices;

const EXPECTED_HEADERS: [(&str, &str); 5] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("referrer-policy", "no-referrer"),
    ("permissions-policy", "geolocation=(), microphone=(), camera=()"),
];

fn api_router() -> axum::Router {
    let config = Arc::new(AppConfig::default());
    let services = AppServices::new(config.clone());
    ApplicationServer::router(&config, services)
}

fn assert_security_headers(headers: &HeaderMap) {
    for (name, value) in EXPECTED_HEADERS {
        assert_eq!(
            headers.get(name).and_then(|v| v.to_str().ok()),
            Some(value),
            "response is missing {}",
            name
        );
    }
}

#[tokio::test]
async fn test_success_responses_carry_the_security_headers() {
    let response = api_router()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_security_headers(response.headers());
}

#[tokio::test]
async fn test_rejected_bodies_still_carry_the_security_headers() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/download")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let response = api_router().oneshot(request).await.unwrap();

    // the body never reaches the handler, the headers must be there anyway
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_security_headers(response.headers());
}

#[tokio::test]
async fn test_query_rejections_still_carry_the_security_headers() {
    let response = api_router()
        .oneshot(
            Request::builder()
                .uri("/api/proxy")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_security_headers(response.headers());
}
