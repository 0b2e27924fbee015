//! Feed client types and configuration

use std::time::Duration;

use serde_json::Value;

use super::backoff::BackoffPolicy;

/// Connection lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection open and none wanted
    Idle,
    /// Dial in progress
    Connecting,
    /// Feed is live
    Connected,
    /// Connection lost, reconnect pending
    Disconnected,
    /// Retry budget exhausted, waiting for a manual connect
    Failed,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// A decoded inbound feed message
#[derive(Debug, Clone)]
pub struct FeedMessage {
    /// Value of the `type` discriminator field, if present
    pub kind: Option<String>,
    /// The full decoded JSON payload
    pub payload: Value,
}

impl FeedMessage {
    /// Decode a raw text frame
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let payload: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(payload))
    }

    /// Wrap an already-decoded payload
    pub fn from_value(payload: Value) -> Self {
        let kind = payload
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self { kind, payload }
    }

    /// True when the discriminator matches `kind`
    pub fn is(&self, kind: &str) -> bool {
        self.kind.as_deref() == Some(kind)
    }
}

/// Feed client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Reconnect backoff policy
    pub backoff: BackoffPolicy,
    /// Interval between application-level keep-alive pings
    pub keepalive_interval: Duration,
    /// Timeout for the dial handshake
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            backoff: BackoffPolicy::default(),
            keepalive_interval: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the backoff policy
    pub fn backoff(mut self, policy: BackoffPolicy) -> Self {
        self.backoff = policy;
        self
    }

    /// Set the keep-alive ping interval
    pub fn keepalive_interval(mut self, d: Duration) -> Self {
        self.keepalive_interval = d;
        self
    }

    /// Set the dial timeout
    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.connect_timeout = d;
        self
    }
}
