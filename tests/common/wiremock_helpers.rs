use ravcat::config::SourceConfig;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_USER_AGENT: &str = "RavCat-Test/1.0";

/// Creates a mock server that serves `body` as JSON at `url_path`.
///
/// `expected_hits` is verified when the server is dropped.
pub async fn mock_json_server(url_path: &str, body: serde_json::Value, expected_hits: u64) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(body)
                .insert_header("content-type", "application/json"),
        )
        .expect(expected_hits)
        .mount(&server)
        .await;

    server
}

/// Creates a mock server that fails `failures` times with `status`, then serves `body`.
pub async fn mock_flaky_server(url_path: &str, status: u16, failures: u64, body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(status))
        .up_to_n_times(failures)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .with_priority(2)
        .mount(&server)
        .await;

    server
}

/// Creates a mock server that answers every GET with `status`.
pub async fn mock_error_server(status_code: u16) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status_code))
        .mount(&server)
        .await;

    server
}

/// Creates a mock server that answers every GET with a raw, non-JSON body.
pub async fn mock_garbage_server(body: &str) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(&server)
        .await;

    server
}

/// Creates a mock server that delays responses past any reasonable client timeout.
pub async fn mock_timeout_server(delay_ms: u64) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({}))
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(&server)
        .await;

    server
}

/// Number of requests the server has seen so far.
pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}

/// A source pointed at `server` with short delays and an empty fallback.
pub fn source_for(server: &MockServer, url_path: &str, base: SourceConfig) -> SourceConfig {
    SourceConfig {
        url: format!("{}{}", server.uri(), url_path),
        timeout: Duration::from_secs(2),
        retry_delay: Duration::from_millis(10),
        user_agent: TEST_USER_AGENT.to_string(),
        fallback_data: serde_json::json!({}),
        ..base
    }
}
