//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use space_explorer::{HttpError, ImageApi, ImageItem};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Image with predictable fields
pub fn image(id: &str, confidence: Option<f64>) -> ImageItem {
    ImageItem {
        id: id.to_string(),
        title: format!("Image {}", id),
        description: Some(format!("<p>Description of <b>{}</b></p>", id)),
        date_created: "2021-02-18T00:00:00Z".to_string(),
        url: format!("https://images.test/{}.jpg", id),
        source: "nasa".to_string(),
        keywords: vec!["space".to_string()],
        confidence,
    }
}

/// `n` images with confidences spread over [0, 1)
pub fn images(n: usize) -> Vec<ImageItem> {
    (0..n).map(|i| image(&format!("img-{}", i), Some((i % 10) as f64 / 10.0))).collect()
}

/// Backend JSON for a list of images
pub fn images_json(items: &[ImageItem]) -> Value {
    serde_json::to_value(items).expect("Failed to serialize images")
}

// ---------------------------------------------------------------------------
// Scripted ImageApi
// ---------------------------------------------------------------------------

type SearchResult = Result<Vec<ImageItem>, HttpError>;

struct MockState {
    calls: Vec<String>,
    script: VecDeque<SearchResult>,
    fallback: SearchResult,
    sources: Vec<ImageItem>,
    delay: Duration,
    in_flight: usize,
    max_in_flight: usize,
}

/// In-process backend that replays scripted search outcomes
///
/// Each `search` call pops the next scripted result, or returns the fallback
/// once the script is exhausted. An optional delay (tokio time, so it follows
/// a paused clock) keeps requests in flight.
#[derive(Clone)]
pub struct MockApi {
    state: Arc<Mutex<MockState>>,
}

impl MockApi {
    fn with_fallback(fallback: SearchResult) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                calls: Vec::new(),
                script: VecDeque::new(),
                fallback,
                sources: Vec::new(),
                delay: Duration::ZERO,
                in_flight: 0,
                max_in_flight: 0,
            })),
        }
    }

    /// Every search returns `items`
    pub fn succeeding(items: Vec<ImageItem>) -> Self {
        Self::with_fallback(Ok(items))
    }

    /// Every search fails with `err`
    pub fn failing(err: HttpError) -> Self {
        Self::with_fallback(Err(err))
    }

    /// Queue outcomes consumed before the fallback
    pub fn then(self, result: SearchResult) -> Self {
        self.state.lock().unwrap().script.push_back(result);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().delay = delay;
        self
    }

    pub fn with_sources(self, sources: Vec<ImageItem>) -> Self {
        self.state.lock().unwrap().sources = sources;
        self
    }

    /// Queries received so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Highest number of simultaneously running searches
    pub fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }
}

impl ImageApi for MockApi {
    async fn list_sources(&self) -> Result<Vec<ImageItem>, HttpError> {
        Ok(self.state.lock().unwrap().sources.clone())
    }

    async fn search(&self, query: &str) -> Result<Vec<ImageItem>, HttpError> {
        let (delay, result) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(query.to_string());
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            let result = match state.script.pop_front() {
                Some(result) => result,
                None => state.fallback.clone(),
            };
            (state.delay, result)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.state.lock().unwrap().in_flight -= 1;
        result
    }
}

/// 500 with an empty text body
pub fn server_error() -> HttpError {
    HttpError::from_response(500, space_explorer::api::ErrorBody::Text(String::new()))
}

// ---------------------------------------------------------------------------
// Raw HTTP test server
// ---------------------------------------------------------------------------

/// Canned HTTP response
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl MockResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self { status, content_type: Some("text/plain".to_string()), body: body.to_string() }
    }

    pub fn no_content() -> Self {
        Self { status: 204, content_type: None, body: String::new() }
    }
}

/// Request as seen by the server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string
    pub target: String,
    /// Header names lowercased
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).expect("Request body is not JSON")
    }
}

#[derive(Default)]
struct ServerState {
    responses: VecDeque<MockResponse>,
    requests: Vec<RecordedRequest>,
}

/// Minimal HTTP/1.1 server replaying canned responses, one per connection
pub struct TestServer {
    addr: SocketAddr,
    state: Arc<Mutex<ServerState>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(responses: Vec<MockResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to read local address");
        let state = Arc::new(Mutex::new(ServerState {
            responses: responses.into(),
            requests: Vec::new(),
        }));

        let server_state = Arc::clone(&state);
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let state = Arc::clone(&server_state);
                tokio::spawn(async move {
                    let _ = serve_connection(stream, state).await;
                });
            }
        });

        Self { addr, state, handle }
    }

    /// Base URL with the same `/api/v1` prefix as the real backend
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_connection(stream: TcpStream, state: Arc<Mutex<ServerState>>) -> std::io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let length: usize = headers.get("content-length").and_then(|v| v.parse().ok()).unwrap_or(0);
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await?;

    let response = {
        let mut state = state.lock().unwrap();
        state.requests.push(RecordedRequest {
            method,
            target,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        });
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| MockResponse::text(500, "no scripted response"))
    };

    let mut head = format!("HTTP/1.1 {} Test\r\nConnection: close\r\n", response.status);
    if let Some(content_type) = &response.content_type {
        head.push_str(&format!("Content-Type: {}\r\n", content_type));
    }
    if response.status != 204 {
        head.push_str(&format!("Content-Length: {}\r\n", response.body.len()));
    }
    head.push_str("\r\n");

    write_half.write_all(head.as_bytes()).await?;
    if response.status != 204 {
        write_half.write_all(response.body.as_bytes()).await?;
    }
    write_half.shutdown().await?;
    Ok(())
}

/// Address nothing listens on
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read local address");
    drop(listener);
    format!("http://{}/api/v1", addr)
}
