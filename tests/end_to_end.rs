//! Full-stack tests: real HTTP in, mock data service behind.

use std::net::SocketAddr;
use std::time::Duration;

use url_shortener::config::ServiceConfig;
use url_shortener::HttpServer;

mod common;

async fn start_server(bind: SocketAddr, backend: SocketAddr) {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = bind.to_string();
    config.data_service.address = backend.to_string();
    config.data_service.timeout_ms = 1000;

    let listener = tokio::net::TcpListener::bind(bind).await.unwrap();
    let server = HttpServer::new(config);
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    tokio::time::sleep(Duration::from_millis(300)).await;
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn test_shorten_resolve_delete_lifecycle() {
    let backend_addr: SocketAddr = "127.0.0.1:28481".parse().unwrap();
    let server_addr: SocketAddr = "127.0.0.1:28482".parse().unwrap();

    let store = common::start_mock_data_service(backend_addr, "/api/v1/links").await;
    start_server(server_addr, backend_addr).await;

    let client = client();
    let base = format!("http://{}", server_addr);

    // Create
    let res = client
        .post(format!("{}/shorten", base))
        .json(&serde_json::json!({ "url": "https://example.com/very/long/path" }))
        .send()
        .await
        .expect("Server unreachable");
    assert_eq!(res.status(), 201);
    assert!(res.headers().contains_key("x-request-id"));
    let created: serde_json::Value = res.json().await.unwrap();
    let code = created["code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 7);
    assert_eq!(created["url"], "https://example.com/very/long/path");
    assert!(store.lock().unwrap().contains_key(&code));

    // Resolve
    let res = client.get(format!("{}/{}", base, code)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let found: serde_json::Value = res.json().await.unwrap();
    assert_eq!(found["url"], "https://example.com/very/long/path");

    // Probe
    let res = client.head(format!("{}/{}", base, code)).send().await.unwrap();
    assert_eq!(res.status(), 200);

    // Delete, then the code is gone
    let res = client
        .delete(format!("{}/{}", base, code))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);
    let res = client.get(format!("{}/{}", base, code)).send().await.unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_unmatched_routes_answer_404() {
    let backend_addr: SocketAddr = "127.0.0.1:28483".parse().unwrap();
    let server_addr: SocketAddr = "127.0.0.1:28484".parse().unwrap();

    common::start_mock_data_service(backend_addr, "/api/v1/links").await;
    start_server(server_addr, backend_addr).await;

    let client = client();
    let base = format!("http://{}", server_addr);

    // Two segments never match the single-segment code route.
    let res = client
        .get(format!("{}/foo/bar", base))
        .send()
        .await
        .expect("Server unreachable");
    assert_eq!(res.status(), 404);

    // POST is only registered for /shorten.
    let res = client.post(format!("{}/other", base)).send().await.unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_health_bypasses_pipeline() {
    // The data service address points nowhere; health must still work.
    let dead_backend: SocketAddr = "127.0.0.1:28485".parse().unwrap();
    let server_addr: SocketAddr = "127.0.0.1:28486".parse().unwrap();

    start_server(server_addr, dead_backend).await;

    let res = client()
        .get(format!("http://{}/health", server_addr))
        .send()
        .await
        .expect("Server unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_unreachable_backend_maps_to_503() {
    let dead_backend: SocketAddr = "127.0.0.1:28487".parse().unwrap();
    let server_addr: SocketAddr = "127.0.0.1:28488".parse().unwrap();

    start_server(server_addr, dead_backend).await;

    let res = client()
        .get(format!("http://{}/abc1234", server_addr))
        .send()
        .await
        .expect("Server unreachable");
    assert_eq!(res.status(), 503);
}

#[tokio::test]
async fn test_malformed_shorten_body_answers_400() {
    let backend_addr: SocketAddr = "127.0.0.1:28489".parse().unwrap();
    let server_addr: SocketAddr = "127.0.0.1:28490".parse().unwrap();

    let store = common::start_mock_data_service(backend_addr, "/api/v1/links").await;
    start_server(server_addr, backend_addr).await;

    let client = client();
    let base = format!("http://{}", server_addr);

    let res = client
        .post(format!("{}/shorten", base))
        .body("not json")
        .send()
        .await
        .expect("Server unreachable");
    assert_eq!(res.status(), 400);

    let res = client
        .post(format!("{}/shorten", base))
        .json(&serde_json::json!({ "url": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    // Nothing reached the backend store.
    assert!(store.lock().unwrap().is_empty());
}
