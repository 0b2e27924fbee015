//! Configuration types for pulse-feed

use std::time::Duration;

use serde::Deserialize;

use crate::analysis::{AnalysisClientConfig, DEFAULT_ANALYSIS_URL};
use crate::client::{BackoffPolicy, ClientConfig};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub backoff: BackoffConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Feed endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// WebSocket URL of the dashboard feed
    #[serde(default = "default_feed_url")]
    pub url: String,

    /// Seconds between keep-alive pings
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_interval_secs: u64,

    /// Seconds to wait for the dial handshake
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_feed_url() -> String {
    "ws://127.0.0.1:8765".to_string()
}
fn default_keepalive_secs() -> u64 {
    30
}
fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            keepalive_interval_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Reconnect backoff configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackoffConfig {
    /// Delay before the first reconnect attempt (milliseconds)
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Growth factor applied after each attempt
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Ceiling for the delay between attempts (milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Attempts before giving up (0 = retry forever)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_initial_delay_ms() -> u64 {
    1000
}
fn default_multiplier() -> f64 {
    2.0
}
fn default_max_delay_ms() -> u64 {
    30000
}
fn default_max_attempts() -> u32 {
    5
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1000,
            multiplier: 2.0,
            max_delay_ms: 30000,
            max_attempts: 5,
        }
    }
}

impl BackoffConfig {
    /// Build the runtime backoff policy
    pub fn policy(&self) -> BackoffPolicy {
        BackoffPolicy::new()
            .initial_delay(Duration::from_millis(self.initial_delay_ms))
            .multiplier(self.multiplier)
            .max_delay(Duration::from_millis(self.max_delay_ms))
            .max_attempts(self.max_attempts)
    }
}

/// Daily analysis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Enable periodic analysis refresh
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// URL of the analysis document
    #[serde(default = "default_analysis_url")]
    pub url: String,

    /// Seconds between refreshes
    #[serde(default = "default_refresh_secs")]
    pub refresh_interval_secs: u64,

    /// Request timeout in seconds
    #[serde(default = "default_analysis_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_analysis_url() -> String {
    DEFAULT_ANALYSIS_URL.to_string()
}
fn default_refresh_secs() -> u64 {
    300
}
fn default_analysis_timeout_secs() -> u64 {
    10
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: DEFAULT_ANALYSIS_URL.to_string(),
            refresh_interval_secs: 300,
            timeout_secs: 10,
        }
    }
}

impl AnalysisConfig {
    /// Build the runtime analysis client configuration
    pub fn client_config(&self) -> AnalysisClientConfig {
        AnalysisClientConfig {
            url: self.url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Log level when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format: "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Port for the Prometheus scrape endpoint, if any
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Build the runtime feed client configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.feed.url.clone())
            .backoff(self.backoff.policy())
            .keepalive_interval(Duration::from_secs(self.feed.keepalive_interval_secs))
            .connect_timeout(Duration::from_secs(self.feed.connect_timeout_secs))
    }
}
