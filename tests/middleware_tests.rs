use async_trait::async_trait;
use calven_rs::auth::authenticate;
use calven_rs::domains::base::BaseClient;
use calven_rs::{CalvenError, CalvenResult, Credentials, RequestMiddleware, RequestOptions};
use mockito::{Matcher, Server};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Request;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod test_helpers;

use test_helpers::{arrival, PresenceTester};

struct TagRequest {
    calls: AtomicUsize,
}

#[async_trait]
impl RequestMiddleware for TagRequest {
    async fn process_request(&self, mut request: Request) -> CalvenResult<Request> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        request
            .headers_mut()
            .insert(HeaderName::from_static("x-region"), HeaderValue::from_static("ause1"));
        Ok(request)
    }
}

struct RejectRequest;

#[async_trait]
impl RequestMiddleware for RejectRequest {
    async fn process_request(&self, _request: Request) -> CalvenResult<Request> {
        Err(CalvenError::authentication("token expired"))
    }
}

#[tokio::test]
async fn test_correlation_id_header_is_sent() {
    let mut tester = PresenceTester::with_correlation_id(Some("corr-123")).await;
    let mock = tester
        .presence_mock()
        .match_header("x-correlation-id", "corr-123")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    tester.client.send_presence("src-1", vec![arrival(1)]).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_correlation_header_without_id() {
    let mut tester = PresenceTester::new().await;
    let mock = tester
        .presence_mock()
        .match_header("x-correlation-id", Matcher::Missing)
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    tester.client.send_presence("src-1", vec![arrival(1)]).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_caller_headers_pass_through_but_cannot_replace_credentials() {
    let mut tester = PresenceTester::new().await;
    let mock = tester
        .presence_mock()
        .match_header("x-request-source", "kiosk-4")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let options = RequestOptions::new()
        .header("x-request-source", "kiosk-4")
        .unwrap()
        .header("x-api-key", "spoofed")
        .unwrap();

    tester
        .client
        .send_presence_with_options("src-1", vec![arrival(1)], options)
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_custom_middleware_runs_on_every_post() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/reports/")
        .match_header("x-region", "ause1")
        .match_header("x-api-key", "key1")
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(2)
        .create_async()
        .await;

    let tag = Arc::new(TagRequest {
        calls: AtomicUsize::new(0),
    });
    let base = BaseClient::<Value, Value>::new("ReportingClient", server.url(), "v1/reports", None)
        .unwrap()
        .with_middleware(tag.clone());
    let client = authenticate(base, Credentials::new("key1", "secret1")).unwrap();

    for _ in 0..2 {
        let response = client.post(&json!({ "period": "day" }), None).await.unwrap();
        assert_eq!(response, json!({ "ok": true }));
    }

    mock.assert_async().await;
    assert_eq!(tag.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_middleware_failure_stops_the_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = BaseClient::<Value, Value>::new("ReportingClient", server.url(), "", None)
        .unwrap()
        .with_middleware(Arc::new(RejectRequest));

    let err = client.post(&json!({}), None).await.unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.category(), "authentication");
    assert_eq!(err.to_string(), "Authentication failed: token expired");
}

#[tokio::test]
async fn test_invalid_correlation_id_fails_construction() {
    let err = calven_rs::PresenceClient::new(
        "key1",
        "secret1",
        "https://api.example.com/",
        Some("bad\nid".to_string()),
    )
    .unwrap_err();
    assert_eq!(err.category(), "invalid_parameter");
}
