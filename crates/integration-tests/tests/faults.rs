//! End-to-end exception mapping

mod harness;

use harness::config::ConfigBuilder;
use harness::routes::{Quota, routes};
use harness::server::TestServer;
use hostkit_config::ErrorShape;

async fn legacy() -> TestServer {
    TestServer::start(ConfigBuilder::new().build(), routes()).await.unwrap()
}

async fn problem_details() -> TestServer {
    let config = ConfigBuilder::new()
        .with_error_shape(ErrorShape::ProblemDetails)
        .build();
    TestServer::start(config, routes()).await.unwrap()
}

fn content_type(resp: &reqwest::Response) -> &str {
    resp.headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

// -- Legacy shape --

#[tokio::test]
async fn argument_error_is_400() {
    let server = legacy().await;

    let resp = server.get("/api/argument").await;

    assert_eq!(resp.status(), 400);
    assert_eq!(content_type(&resp), "application/json");
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["message"], "bad request from you: x");
    assert!(body["type"].as_str().unwrap().ends_with("ArgumentError"));
    assert!(body.get("innerError").is_none());
}

#[tokio::test]
async fn wrapped_argument_error_is_400() {
    let server = legacy().await;

    let resp = server.get("/api/wrapped-argument").await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "invalid order");
    assert_eq!(body["innerError"]["statusCode"], 400);
    assert_eq!(body["innerError"]["message"], "quantity is zero");
}

#[tokio::test]
async fn unexpected_error_is_500() {
    let server = legacy().await;

    let resp = server.get("/api/unexpected").await;

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["statusCode"], 500);
    assert_eq!(body["message"], "object reference not set");
    assert!(body["type"].as_str().unwrap().ends_with("NullReference"));
}

#[tokio::test]
async fn cause_chain_nests_three_levels() {
    let server = legacy().await;

    let resp = server.get("/api/nested").await;

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "a");
    assert_eq!(body["innerError"]["message"], "b");
    assert_eq!(body["innerError"]["innerError"]["message"], "c");
    assert_eq!(body["innerError"]["innerError"]["statusCode"], 500);
    assert!(body["innerError"]["innerError"].get("innerError").is_none());
}

#[tokio::test]
async fn panic_is_500() {
    let server = legacy().await;

    let resp = server.get("/api/panic").await;

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "handler exploded");

    // The server keeps serving after a panic
    assert_eq!(server.get("/api/ok").await.status(), 200);
}

// -- Deliberate application errors --

#[tokio::test]
async fn text_payload_is_verbatim() {
    for server in [legacy().await, problem_details().await] {
        let resp = server.get("/api/text").await;

        assert_eq!(resp.status(), 409);
        assert_eq!(content_type(&resp), "text/plain");
        assert_eq!(resp.text().await.unwrap(), "name already taken");
    }
}

#[tokio::test]
async fn json_payload_round_trips() {
    let server = problem_details().await;

    let resp = server.get("/api/json").await;

    assert_eq!(resp.status(), 429);
    assert_eq!(content_type(&resp), "application/json");
    let text = resp.text().await.unwrap();
    assert_eq!(text, r#"{"remainingCalls":0}"#);
    let quota: Quota = serde_json::from_str(&text).unwrap();
    assert_eq!(
        quota,
        Quota {
            remaining_calls: 0,
            reset_at: None
        }
    );
}

// -- Problem details shape --

#[tokio::test]
async fn problem_details_for_bad_input() {
    let server = problem_details().await;

    let resp = server.get("/api/argument").await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], 400);
    assert_eq!(body["title"], "An error occurred while processing your request");
    assert_eq!(body["detail"], "bad request from you: x");
    assert!(body.get("statusCode").is_none());
}

#[tokio::test]
async fn trace_id_matches_request_id_header() {
    let server = problem_details().await;

    let resp = server
        .client()
        .get(server.url("/api/unexpected"))
        .header("x-request-id", "0HN7TRACE")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    assert_eq!(resp.headers()["x-request-id"], "0HN7TRACE");
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["traceId"], "0HN7TRACE");
}

#[tokio::test]
async fn generated_trace_id_is_echoed() {
    let server = problem_details().await;

    let resp = server.get("/api/unexpected").await;

    let header = resp.headers()["x-request-id"].to_str().unwrap().to_owned();
    assert!(!header.is_empty());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["traceId"], header.as_str());
}

#[tokio::test]
async fn detail_can_include_type() {
    let config = ConfigBuilder::new()
        .with_error_shape(ErrorShape::ProblemDetails)
        .with_detail_type()
        .build();
    let server = TestServer::start(config, routes()).await.unwrap();

    let resp = server.get("/api/unexpected").await;

    let body: serde_json::Value = resp.json().await.unwrap();
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.ends_with("NullReference: object reference not set"), "{detail}");
}

#[tokio::test]
async fn successful_requests_untouched() {
    let server = problem_details().await;

    let resp = server.get("/api/ok").await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "fine");
}
