//! Tile fetch configuration.

use super::defaults::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_WORKERS,
};
use crate::provider::DEFAULT_USER_AGENT;

/// Configuration for the tile manager and its HTTP client.
///
/// # Example
///
/// ```
/// use globemap::config::NetworkConfig;
///
/// let config = NetworkConfig::default();
/// assert_eq!(config.workers(), 4);
/// assert_eq!(config.max_retries(), 2);
///
/// let config = NetworkConfig::new()
///     .with_workers(8)
///     .with_connect_timeout_secs(3);
/// assert_eq!(config.connect_timeout_secs(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    workers: usize,
    connect_timeout_secs: u64,
    request_timeout_secs: u64,
    max_retries: u32,
    user_agent: String,
}

impl NetworkConfig {
    /// Create a new network configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of fetch worker threads (minimum 1).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the connection watchdog in seconds.
    ///
    /// A tile whose connection is not established in time is abandoned.
    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Set the overall request deadline in seconds.
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Set how many times an unreachable host is retried on another mirror.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn connect_timeout_secs(&self) -> u64 {
        self.connect_timeout_secs
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
