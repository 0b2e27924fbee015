//! Connection and feed metrics

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Successful connections opened
    Connects,
    /// Dial attempts that failed or timed out
    ConnectFailures,
    /// Reconnect attempts scheduled
    ReconnectAttempts,
    /// Inbound text frames received
    MessagesReceived,
    /// Inbound frames dropped as unparseable
    MalformedFrames,
    /// Outbound messages dropped while not connected
    DroppedSends,
    /// Keep-alive pings sent
    KeepalivePings,
    /// Price updates delivered to the subscriber
    PriceUpdates,
    /// Price updates dropped on a full subscriber channel
    DroppedUpdates,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// 1 while the feed is connected, 0 otherwise
    ConnectionUp,
    /// Delay of the most recently scheduled reconnect
    BackoffDelayMs,
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    let metric_name = match metric {
        CounterMetric::Connects => "pulsefeed_connects_total",
        CounterMetric::ConnectFailures => "pulsefeed_connect_failures_total",
        CounterMetric::ReconnectAttempts => "pulsefeed_reconnect_attempts_total",
        CounterMetric::MessagesReceived => "pulsefeed_messages_received_total",
        CounterMetric::MalformedFrames => "pulsefeed_malformed_frames_total",
        CounterMetric::DroppedSends => "pulsefeed_dropped_sends_total",
        CounterMetric::KeepalivePings => "pulsefeed_keepalive_pings_total",
        CounterMetric::PriceUpdates => "pulsefeed_price_updates_total",
        CounterMetric::DroppedUpdates => "pulsefeed_dropped_updates_total",
    };
    counter!(metric_name).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = match metric {
        GaugeMetric::ConnectionUp => "pulsefeed_connection_up",
        GaugeMetric::BackoffDelayMs => "pulsefeed_backoff_delay_ms",
    };
    gauge!(metric_name).set(value);
}

/// Install the Prometheus recorder with an HTTP scrape endpoint.
///
/// Must be called within a tokio runtime.
pub fn install_recorder(port: u16) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(port = port, "Prometheus metrics exporter listening");
    Ok(())
}
