//! End-to-end tests of the HTTP transport against an in-process fake MCP
//! endpoint.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ads_mcp_probe::{
    testutils::tool_response, tools, Client, ClientConfig, ExitReason, RetryConfig, Session,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Recorded {
    calls: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

impl Recorded {
    fn calls(&self) -> Vec<(Option<String>, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

/// Answers like the ads server: auth status directly in `result`, searches
/// as JSON text inside a content block.
async fn fake_mcp(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    recorded.calls.lock().unwrap().push((auth, body.clone()));

    let tool = body["params"]["name"].as_str().unwrap_or_default();
    let response = match tool {
        "check_auth_status" => json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"authenticated": true, "user_id": "u1", "has_facebook": true}
        }),
        "search_competitor_ads" => tool_response(json!({
            "keywords": body["params"]["arguments"]["keywords"],
            "ads_found": 1,
            "ads": [{"page_name": "Nike", "id": "1", "ad_creative_bodies": ["Buy now"]}]
        })),
        "search_ads_by_page" => tool_response(json!({"page_id": "nike", "ads_found": 0, "ads": []})),
        _ => json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32601, "message": "Method not found"}}),
    };
    Json(response)
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/mcp-api")
}

async fn spawn_fake_server() -> (String, Recorded) {
    let recorded = Recorded::default();
    let router = Router::new()
        .route("/mcp-api", post(fake_mcp))
        .with_state(recorded.clone());
    (spawn(router).await, recorded)
}

#[tokio::test]
async fn test_http_sends_envelope_and_bearer_token() {
    let _ = tracing_subscriber::fmt::try_init();
    let (endpoint, recorded) = spawn_fake_server().await;
    let client = Client::from_config(&ClientConfig::new(endpoint, "secret-token")).unwrap();

    let (response, status) = tools::check_auth_status(&client).await;
    assert_eq!(response["result"]["user_id"], "u1");
    assert!(status.authenticated);

    let calls = recorded.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.as_deref(), Some("Bearer secret-token"));
    assert_eq!(
        calls[0].1,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "check_auth_status", "arguments": {}}
        })
    );
}

#[tokio::test]
async fn test_http_keyword_search_report() {
    let (endpoint, _) = spawn_fake_server().await;
    let client = Client::from_config(&ClientConfig::new(endpoint, "t")).unwrap();

    let search = tools::KeywordSearch::new("shoes");
    let report = tools::search_competitor_ads(&client, &search)
        .await
        .keyword_report();
    assert_eq!(
        report,
        "Found 1 ads\n\nAd 1:\n  - Page: Nike\n  - ID: 1\n  - Text: Buy now...\n"
    );
}

#[tokio::test]
async fn test_http_full_session() {
    let (endpoint, recorded) = spawn_fake_server().await;
    let client = Client::from_config(&ClientConfig::new(endpoint, "t")).unwrap();

    let input = "1\nshoes\nFR\n2\n2\nnike\n\n4\n";
    let mut session = Session::new(&client, input.as_bytes(), Vec::new());
    let reason = session.run().await.unwrap();
    assert_eq!(reason, ExitReason::UserExit);

    let output = String::from_utf8(session.into_output()).unwrap();
    assert!(output.contains("SEARCHING ADS: 'shoes' in FR"));
    assert!(output.contains("Found 1 ads"));
    assert!(output.contains("Found 0 ads for nike"));
    assert!(output.contains("Goodbye!"));

    let calls = recorded.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls[1].1["params"]["arguments"],
        json!({"keywords": "shoes", "country": "FR", "limit": 2})
    );
    assert_eq!(
        calls[2].1["params"]["arguments"],
        json!({"page_id": "nike", "limit": 10})
    );
}

#[tokio::test]
async fn test_non_json_body_becomes_error_object() {
    let router = Router::new().route(
        "/mcp-api",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down").into_response() }),
    );
    let endpoint = spawn(router).await;
    let client = Client::from_config(&ClientConfig::new(endpoint, "t")).unwrap();

    let response = client.request("tools/call", json!({})).await;
    let message = response["error"].as_str().unwrap();
    assert!(message.starts_with("HTTP error: HTTP 502"), "{message}");

    let report = tools::ToolOutcome::classify(response).page_report("nike");
    assert!(report.starts_with("Error in response: HTTP error"));
}

#[tokio::test]
async fn test_unreachable_server_becomes_error_object() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = Client::from_config(&ClientConfig::new(format!("http://{addr}/mcp-api"), "t")).unwrap();
    let response = client.request("tools/call", json!({})).await;
    let message = response["error"].as_str().unwrap();
    assert!(message.starts_with("Transport error"), "{message}");
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let router = Router::new().route(
        "/mcp-api",
        post(|| async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Json(json!({"result": {}}))
        }),
    );
    let endpoint = spawn(router).await;
    let config = ClientConfig::new(endpoint, "t")
        .with_retry(RetryConfig::default().with_timeout(Duration::from_millis(50)));
    let client = Client::from_config(&config).unwrap();

    let response = client.request("tools/call", json!({})).await;
    let message = response["error"].as_str().unwrap();
    assert!(message.starts_with("Request timed out"), "{message}");
}
