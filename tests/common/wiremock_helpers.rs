use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The `host[:port]` a liveness candidate for this server would carry.
pub fn server_host(server: &MockServer) -> String {
    server
        .uri()
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}

/// Mock search API endpoint answering every query with the given links.
pub async fn mock_search_server(links: &[&str]) -> MockServer {
    let server = MockServer::start().await;

    let items: Vec<serde_json::Value> = links.iter().map(|link| json!({ "link": link })).collect();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
        .mount(&server)
        .await;

    server
}

/// Mock search API endpoint answering with an arbitrary JSON body.
pub async fn mock_search_server_with_body(body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    server
}

/// Mock site that answers every probe with 200.
pub async fn mock_live_site() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    server
}

/// Mock site that answers every probe with the given status, HEAD and GET
/// alike. Useful for the HEAD-then-GET fallback path.
pub async fn mock_dead_site(status: u16) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;

    server
}

/// Mock site that rejects HEAD with 405 but serves GET normally.
pub async fn mock_head_rejecting_site() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    server
}

/// Mock site whose root permanently redirects to /home.
pub async fn mock_redirecting_site() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/home"))
        .mount(&server)
        .await;
    Mock::given(path("/home"))
        .respond_with(ResponseTemplate::new(200).set_body_string("welcome"))
        .mount(&server)
        .await;

    server
}

/// Mock server that returns the specified HTTP error status for everything.
pub async fn mock_error_server(status_code: u16) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status_code))
        .mount(&server)
        .await;

    server
}

/// Mock site that stalls for `delay_ms` before answering any probe.
pub async fn mock_slow_site(delay_ms: u64) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(
            ResponseTemplate::new(200).set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("slow")
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(&server)
        .await;

    server
}
