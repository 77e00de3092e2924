//! Common test utilities

#![allow(dead_code)]

use pemilu_client::config::ClientConfig;
use pemilu_client::session::MemorySessionStore;
use pemilu_client::{ApiClient, Services};
use std::sync::Arc;
use wiremock::MockServer;

/// Creates a ClientConfig whose API base is `<mock>/api`
pub fn test_config(server: &MockServer) -> ClientConfig {
    let mut config = ClientConfig::new(format!("{}/api", server.uri()), server.uri())
        .expect("valid mock config");
    config.timeout_secs = 10;
    config.user_agent = "Pemilu-Test/0.1.0".to_string();
    config
}

/// Creates a client plus a handle on its in-memory session store
pub fn test_client(server: &MockServer) -> (ApiClient, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    let client = ApiClient::new(test_config(server), store.clone()).expect("client");
    (client, store)
}

/// Creates the full service set plus a handle on the session store
pub fn test_services(server: &MockServer) -> (Services, ApiClient, Arc<MemorySessionStore>) {
    let (client, store) = test_client(server);
    (Services::new(client.clone()), client, store)
}

/// The single request the mock received on `path`
pub async fn received_on(server: &MockServer, path: &str) -> wiremock::Request {
    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    let mut matching: Vec<_> = requests
        .into_iter()
        .filter(|r| r.url.path() == path)
        .collect();
    assert_eq!(matching.len(), 1, "expected exactly one request to {path}");
    matching.remove(0)
}

/// Creates a client pointed at a local port nothing listens on
pub fn unreachable_client() -> (ApiClient, Arc<MemorySessionStore>) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let base = format!("http://127.0.0.1:{port}");
    let config = ClientConfig::new(format!("{base}/api"), base).expect("valid config");
    let store = Arc::new(MemorySessionStore::new());
    let client = ApiClient::new(config, store.clone()).expect("client");
    (client, store)
}

/// Creates a client whose server answers the first request with a 200 whose
/// body stops short of its `Content-Length`, then closes the connection
pub fn truncated_body_client() -> (ApiClient, Arc<MemorySessionStore>) {
    use std::io::{Read, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    std::thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        let _ = stream.write_all(
            b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 64\r\n\r\n{\"data\":",
        );
        let _ = stream.flush();
    });

    let base = format!("http://127.0.0.1:{port}");
    let config = ClientConfig::new(format!("{base}/api"), base).expect("valid config");
    let store = Arc::new(MemorySessionStore::new());
    let client = ApiClient::new(config, store.clone()).expect("client");
    (client, store)
}
