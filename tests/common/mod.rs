//! Shared fixtures for integration tests

#![allow(dead_code)]

use soilsync::SoilInput;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Regression scenario: default rule, maize without override
pub fn maize_scenario() -> SoilInput {
    SoilInput {
        phosphorus: 15.0,
        potassium: 120.0,
        nitrogen: 0.25,
        organic_carbon: 2.0,
        cation_exchange: 15.0,
        sand_percent: 40.0,
        clay_percent: 30.0,
        silt_percent: 30.0,
        rainfall: 1200.0,
        elevation: 1500.0,
        crop_type: "maize".to_string(),
    }
}

/// Canned HTTP response for the stub model server
pub struct StubResponse {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl StubResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Stub model server answering exactly one request
pub struct StubServer {
    pub base_url: String,
    request: oneshot::Receiver<String>,
}

impl StubServer {
    /// Bind an ephemeral port and serve `response` once
    pub async fn start(response: StubResponse) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };

            let request = read_request(&mut socket).await;
            let _ = tx.send(request);

            tokio::time::sleep(response.delay).await;

            let reply = format!(
                "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                response.status,
                response.body.len(),
                response.body
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        Self {
            base_url: format!("http://{}", addr),
            request: rx,
        }
    }

    /// Body of the request the server received
    pub async fn received_body(self) -> String {
        let raw = self.request.await.unwrap_or_default();
        raw.split("\r\n\r\n").nth(1).unwrap_or("").to_string()
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.trim().eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).to_string()
}
