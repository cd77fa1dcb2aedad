//! HTTP Transport
//!
//! Transport interface (for dependency injection), the reqwest-backed
//! production implementation, and a FIFO mock for tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::RequestError;

/// One HTTP attempt, fully assembled (auth header included).
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
    /// Timeout for this single attempt.
    pub timeout: Option<Duration>,
}

/// HTTP method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Raw HTTP response.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// Transport interface. Implementations must be safe for concurrent use.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute a single attempt. No retries at this layer.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError>;
}

/// Production transport with a pooled reqwest client.
pub struct ReqwestHttpTransport {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl ReqwestHttpTransport {
    /// Create a transport with the given default per-attempt timeout.
    pub fn new(default_timeout: Duration) -> Result<Self, RequestError> {
        let client = reqwest::Client::builder()
            .timeout(default_timeout)
            .build()
            .map_err(|e| RequestError::ConnectionFailed {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            default_timeout,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        builder = builder.timeout(timeout);

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                RequestError::Timeout { timeout }
            } else {
                RequestError::ConnectionFailed {
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string().to_lowercase(), v.to_string());
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| RequestError::InvalidResponse {
                message: e.to_string(),
            })?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Mock transport for tests: queued outcomes are returned in FIFO order and
/// every request is recorded.
#[derive(Default)]
pub struct MockHttpTransport {
    queue: Mutex<VecDeque<Result<HttpResponse, RequestError>>>,
    default_response: Mutex<Option<HttpResponse>>,
    history: Mutex<Vec<HttpRequest>>,
}

impl MockHttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response to return.
    pub fn queue_response(&self, response: HttpResponse) -> &Self {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(Ok(response));
        }
        self
    }

    /// Queue a plain status/body response.
    pub fn queue_status(&self, status: u16, body: &str) -> &Self {
        self.queue_response(HttpResponse {
            status,
            headers: HashMap::new(),
            body: body.to_string(),
        })
    }

    /// Queue a JSON response.
    pub fn queue_json(&self, status: u16, body: &serde_json::Value) -> &Self {
        self.queue_response(HttpResponse {
            status,
            headers: [("content-type".to_string(), "application/json".to_string())]
                .into_iter()
                .collect(),
            body: body.to_string(),
        })
    }

    /// Queue a transport-level failure.
    pub fn queue_error(&self, error: RequestError) -> &Self {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(Err(error));
        }
        self
    }

    /// Response returned whenever the queue is empty.
    pub fn set_default_response(&self, response: HttpResponse) -> &Self {
        if let Ok(mut default) = self.default_response.lock() {
            *default = Some(response);
        }
        self
    }

    /// JSON response returned whenever the queue is empty.
    pub fn set_default_json(&self, status: u16, body: &serde_json::Value) -> &Self {
        self.set_default_response(HttpResponse {
            status,
            headers: HashMap::new(),
            body: body.to_string(),
        })
    }

    /// All requests seen so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.history.lock().map(|h| h.len()).unwrap_or(0)
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.history.lock().ok().and_then(|h| h.last().cloned())
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        if let Ok(mut history) = self.history.lock() {
            history.push(request);
        }

        let queued = self.queue.lock().ok().and_then(|mut q| q.pop_front());
        if let Some(outcome) = queued {
            return outcome;
        }

        let default = self.default_response.lock().ok().and_then(|d| d.clone());
        default.ok_or_else(|| RequestError::ConnectionFailed {
            message: "no mock response queued".to_string(),
        })
    }
}
