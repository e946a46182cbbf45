//! Status query server tests.

use crate::helpers::*;

fn scripted() -> ScriptedProber {
    ScriptedProber::new()
        .with(
            "1.2.3.4",
            Scripted::Icmp {
                sent: 4,
                received: 2,
                avg_ms: 10,
            },
        )
        .with(
            "10.0.0.1",
            Scripted::Icmp {
                sent: 4,
                received: 4,
                avg_ms: 3,
            },
        )
        .with(
            "10.0.0.2",
            Scripted::Icmp {
                sent: 4,
                received: 0,
                avg_ms: 0,
            },
        )
        .with("10.0.0.3", Scripted::SocketError("operation not permitted"))
}

#[tokio::test]
async fn test_partial_loss_returns_503() {
    let server = TestServer::start(scripted()).await;
    let resp = server.get("/?key=abc&host=1.2.3.4").await;

    assert_response(resp, 503, "Received 2 packets out of 4").await;
}

#[tokio::test]
async fn test_full_reply_returns_ok() {
    let server = TestServer::start(scripted()).await;
    let resp = server.get("/?key=abc&host=10.0.0.1").await;

    assert_response(resp, 200, "OK").await;
}

#[tokio::test]
async fn test_total_loss_returns_500() {
    let server = TestServer::start(scripted()).await;
    let resp = server.get("/?key=abc&host=10.0.0.2").await;

    assert_response(resp, 500, "Received 0 packets out of 4").await;
}

#[tokio::test]
async fn test_probe_error_returns_500_with_error_text() {
    let server = TestServer::start(scripted()).await;
    let resp = server.get("/?key=abc&host=10.0.0.3").await;

    assert_response(resp, 500, "socket: operation not permitted").await;
}

#[tokio::test]
async fn test_missing_key_returns_401() {
    let server = TestServer::start(scripted()).await;

    assert_response(server.get("/?host=1.2.3.4").await, 401, "").await;
    assert_response(server.get("/?key=&host=1.2.3.4").await, 401, "").await;
}

#[tokio::test]
async fn test_missing_host_returns_404() {
    let server = TestServer::start(scripted()).await;

    assert_response(server.get("/?key=abc").await, 404, "").await;
    assert_response(server.get("/?key=abc&host=").await, 404, "").await;
}

#[tokio::test]
async fn test_no_parameters_returns_401() {
    let server = TestServer::start(scripted()).await;

    assert_response(server.get("/").await, 401, "").await;
}

#[tokio::test]
async fn test_any_path_is_served() {
    let server = TestServer::start(scripted()).await;
    let resp = server.get("/status?key=abc&host=10.0.0.1").await;

    assert_response(resp, 200, "OK").await;
}

#[tokio::test]
async fn test_http_target_passes_status_through() {
    let upstream = FakeEndpoint::start(418, "short and stout").await;
    let server = TestServer::start(local_query_prober()).await;

    let url = upstream.url("/health");
    let resp = server.query(&[("key", "abc"), ("host", url.as_str())]).await;

    assert_response(resp, 418, "I'm a teapot").await;

    let requests = upstream.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/health");
}

#[tokio::test]
async fn test_http_target_custom_reason_phrase_is_passed_through() {
    let server = TestServer::start(local_query_prober()).await;

    let upstream = RawUpstream::start("200 All Good").await;
    let url = upstream.url("/");
    let resp = server.query(&[("key", "abc"), ("host", url.as_str())]).await;
    assert_response(resp, 200, "All Good").await;

    let upstream = RawUpstream::start("299 Custom Thing").await;
    let url = upstream.url("/");
    let resp = server.query(&[("key", "abc"), ("host", url.as_str())]).await;
    assert_response(resp, 299, "Custom Thing").await;
}

#[tokio::test]
async fn test_http_target_ok() {
    let upstream = FakeEndpoint::start(200, "fine").await;
    let server = TestServer::start(local_query_prober()).await;

    let url = upstream.url("/");
    let resp = server.query(&[("key", "abc"), ("host", url.as_str())]).await;

    assert_response(resp, 200, "OK").await;
}

#[tokio::test]
async fn test_http_target_transport_error_returns_500() {
    let server = TestServer::start(local_query_prober()).await;

    // Nothing listens on port 1
    let resp = server
        .query(&[("key", "abc"), ("host", "http://127.0.0.1:1/")])
        .await;

    assert_eq!(resp.status().as_u16(), 500);
    assert!(!resp.text().await.unwrap().is_empty());
}
