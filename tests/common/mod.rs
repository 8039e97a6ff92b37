//! Shared utilities for integration testing.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub type Store = Arc<Mutex<HashMap<String, String>>>;

/// Start a mock data service speaking the adapter's REST dialect:
/// `POST {base}` creates, `GET {base}/{id}` fetches, `DELETE` removes,
/// `HEAD` probes. Returns the shared store for assertions.
pub async fn start_mock_data_service(addr: SocketAddr, base_path: &'static str) -> Store {
    let store: Store = Arc::new(Mutex::new(HashMap::new()));
    let listener = TcpListener::bind(addr).await.unwrap();
    let shared = store.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let store = shared.clone();
                    tokio::spawn(async move {
                        let Some((method, path, body)) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, response_body) =
                            respond(&store, base_path, &method, &path, &body);
                        let body_bytes = if method == "HEAD" { "" } else { &response_body };
                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            body_bytes.len(),
                            body_bytes
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    store
}

/// Read one request: headers, then the declared body length.
async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<(String, String, Vec<u8>)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(header_end) = find_header_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..header_end]);
            let needed = content_length(&head);
            if buf.len() >= header_end + 4 + needed {
                break;
            }
        }
    }

    let header_end = find_header_end(&buf)?;
    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let body = buf[header_end + 4..].to_vec();
    let mut parts = head.lines().next()?.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();
    Some((method, path, body))
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())?
        })
        .unwrap_or(0)
}

fn respond(
    store: &Store,
    base: &str,
    method: &str,
    path: &str,
    body: &[u8],
) -> (&'static str, String) {
    let mut map = store.lock().unwrap();

    if method == "POST" && path == base {
        let Ok(parsed) = serde_json::from_slice::<serde_json::Value>(body) else {
            return ("400 Bad Request", String::new());
        };
        let code = parsed["code"].as_str().unwrap_or_default().to_string();
        let url = parsed["url"].as_str().unwrap_or_default().to_string();
        if code.is_empty() || url.is_empty() {
            return ("400 Bad Request", String::new());
        }
        if map.contains_key(&code) {
            return ("409 Conflict", String::new());
        }
        map.insert(code.clone(), url.clone());
        return (
            "201 Created",
            format!(r#"{{"code":"{}","url":"{}"}}"#, code, url),
        );
    }

    let prefix = format!("{}/", base);
    let Some(id) = path.strip_prefix(&prefix) else {
        return ("404 Not Found", String::new());
    };

    match method {
        "GET" => match map.get(id) {
            Some(url) => (
                "200 OK",
                format!(r#"{{"code":"{}","url":"{}"}}"#, id, url),
            ),
            None => ("404 Not Found", String::new()),
        },
        "HEAD" => {
            if map.contains_key(id) {
                ("200 OK", String::new())
            } else {
                ("404 Not Found", String::new())
            }
        }
        "DELETE" => {
            if map.remove(id).is_some() {
                ("204 No Content", String::new())
            } else {
                ("404 Not Found", String::new())
            }
        }
        _ => ("404 Not Found", String::new()),
    }
}
