//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use resilient_site::config::SiteConfig;
use resilient_site::errors::{AlertKind, ErrorReporter};
use resilient_site::network::Connectivity;
use resilient_site::resilience::{FailedOperationQueue, QueuePolicy};
use resilient_site::SiteClient;

/// What the mock backend saw.
#[derive(Debug, Clone, Default)]
pub struct ReceivedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` is called once per request and returns the status code and body.
/// A slow response is simulated by sleeping inside the returned future.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(ReceivedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a mock backend that always returns `status` with `body`.
pub async fn start_fixed_backend(status: u16, body: &'static str) -> SocketAddr {
    start_programmable_backend(move |_| async move { (status, body.to_string()) }).await
}

/// An address nothing is listening on.
pub async fn closed_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn read_request(socket: &mut TcpStream) -> ReceivedRequest {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = find(&data, b"\r\n\r\n") {
            break pos + 4;
        }
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return ReceivedRequest::default(),
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    }

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    ReceivedRequest {
        method: request_line.next().unwrap_or_default().to_string(),
        path: request_line.next().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&data[header_end..]).to_string(),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Reporter that records every alert it is asked to show.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    shown: Mutex<Vec<(String, AlertKind)>>,
}

impl RecordingReporter {
    pub fn shown(&self) -> Vec<(String, AlertKind)> {
        self.shown.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn show(&self, message: &str, kind: AlertKind) {
        self.shown.lock().unwrap().push((message.to_string(), kind));
    }
}

/// Config with short deadlines and delays so tests run quickly.
pub fn fast_config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.fetch.timeout_ms = 200;
    config.fetch.max_attempts = 3;
    config.fetch.retry_delay_ms = 20;
    config.fetch.form_timeout_ms = 200;
    config
}

pub struct Harness {
    pub client: SiteClient,
    pub connectivity: Connectivity,
    pub queue: Arc<FailedOperationQueue>,
    pub reporter: Arc<RecordingReporter>,
}

pub fn harness(online: bool) -> Harness {
    let config = fast_config();
    let connectivity = Connectivity::new(online);
    let queue = Arc::new(FailedOperationQueue::new(QueuePolicy::default()));
    let reporter = Arc::new(RecordingReporter::default());
    let client = SiteClient::new(&config, queue.clone(), connectivity.watch(), reporter.clone()).unwrap();

    Harness {
        client,
        connectivity,
        queue,
        reporter,
    }
}

pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{}{}", addr, path)
}

/// Poll `check` every 10ms until it holds or `limit` elapses.
pub async fn eventually<F: Fn() -> bool>(limit: Duration, check: F) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
