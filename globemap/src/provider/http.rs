//! HTTP client abstraction for testability
//!
//! Tile fetching needs one request shape only: `GET` a URL over HTTP/1.1
//! and return the body bytes. [`AsyncHttpClient`] captures that so the tile
//! manager can be driven by a mock in tests.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::NetworkConfig;

/// Errors from a single tile request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Name resolution or connection failed; another mirror may work.
    #[error("host unreachable: {0}")]
    Unreachable(String),
    /// No connection or response within the deadline.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    /// Connection dropped while reading the body.
    #[error("failed to read response: {0}")]
    Body(String),
    /// Any other request failure.
    #[error("request failed: {0}")]
    Request(String),
    /// The client itself could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// Whether this failure is worth retrying on another mirror.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, FetchError::Unreachable(_))
    }
}

/// Trait for asynchronous HTTP GET.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request.
    ///
    /// # Returns
    ///
    /// The response body as bytes or an error.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Default User-Agent string. Tile servers reject anonymous requests.
pub const DEFAULT_USER_AGENT: &str = concat!("globemap/", env!("CARGO_PKG_VERSION"));

/// Async HTTP client implementation using reqwest.
///
/// HTTP/1.1 only, with a connect deadline acting as the connection
/// watchdog and an overall request deadline.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client with default network settings.
    pub fn new() -> Result<Self, FetchError> {
        Self::from_config(&NetworkConfig::default())
    }

    /// Creates a client from network settings.
    pub fn from_config(config: &NetworkConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .http1_only()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs()))
            .timeout(Duration::from_secs(config.request_timeout_secs()))
            .user_agent(config.user_agent())
            .pool_max_idle_per_host(config.workers() * 2)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        trace!(url = url, "HTTP GET request starting");

        let response = match self.client.get(url).send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(classify(&e));
            }
        };

        if !response.status().is_success() {
            warn!(
                url = url,
                status = response.status().as_u16(),
                "HTTP error status"
            );
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes.to_vec())
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(FetchError::Body(e.to_string()))
            }
        }
    }
}

/// Maps a reqwest error onto the retry taxonomy.
fn classify(e: &reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(e.to_string())
    } else if e.is_connect() {
        FetchError::Unreachable(e.to_string())
    } else if e.is_body() || e.is_decode() {
        FetchError::Body(e.to_string())
    } else {
        FetchError::Request(e.to_string())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Mock async HTTP client returning a fixed response.
    #[derive(Clone)]
    pub struct MockAsyncHttpClient {
        pub response: Result<Vec<u8>, FetchError>,
    }

    impl AsyncHttpClient for MockAsyncHttpClient {
        async fn get(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
            self.response.clone()
        }
    }

    /// Mock client that records requested URLs and replays scripted
    /// responses, falling back to `fallback` once the script runs out.
    #[derive(Clone)]
    pub struct ScriptedHttpClient {
        pub script: Arc<Mutex<VecDeque<Result<Vec<u8>, FetchError>>>>,
        pub fallback: Result<Vec<u8>, FetchError>,
        pub requests: Arc<Mutex<Vec<String>>>,
        pub calls: Arc<AtomicUsize>,
        pub delay: Duration,
    }

    impl ScriptedHttpClient {
        pub fn new(
            script: Vec<Result<Vec<u8>, FetchError>>,
            fallback: Result<Vec<u8>, FetchError>,
        ) -> Self {
            Self {
                script: Arc::new(Mutex::new(script.into())),
                fallback,
                requests: Arc::new(Mutex::new(Vec::new())),
                calls: Arc::new(AtomicUsize::new(0)),
                delay: Duration::ZERO,
            }
        }

        /// Every response is held back by `delay`.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn requested_urls(&self) -> Vec<String> {
            self.requests.lock().clone()
        }
    }

    impl AsyncHttpClient for ScriptedHttpClient {
        async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().push(url.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let next = self.script.lock().pop_front();
            next.unwrap_or_else(|| self.fallback.clone())
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let client = MockAsyncHttpClient {
            response: Ok(vec![1, 2, 3]),
        };
        assert_eq!(client.get("http://x").await, Ok(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_scripted_client_replays_then_falls_back() {
        let client = ScriptedHttpClient::new(
            vec![Err(FetchError::Unreachable("down".into()))],
            Ok(vec![9]),
        );
        assert!(client.get("http://a").await.unwrap_err().is_unreachable());
        assert_eq!(client.get("http://b").await, Ok(vec![9]));
        assert_eq!(client.call_count(), 2);
        assert_eq!(client.requested_urls(), vec!["http://a", "http://b"]);
    }

    #[test]
    fn test_only_unreachable_is_retryable() {
        assert!(FetchError::Unreachable("x".into()).is_unreachable());
        assert!(!FetchError::Timeout("x".into()).is_unreachable());
        assert!(!FetchError::Status {
            status: 404,
            url: "u".into()
        }
        .is_unreachable());
        assert!(!FetchError::Body("x".into()).is_unreachable());
    }

    #[test]
    fn test_client_builds_from_defaults() {
        assert!(ReqwestClient::new().is_ok());
    }
}
