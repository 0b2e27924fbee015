//! Telemetry module
//!
//! Structured logging and Prometheus metrics

mod logging;
mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{increment, install_recorder, set_gauge, CounterMetric, GaugeMetric};

use crate::config::TelemetryConfig;

/// Guard that cleans up telemetry on drop
pub struct TelemetryGuard {
    _priv: (),
}

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    let format: LogFormat = config.log_format.parse()?;
    init_logging(&config.log_level, format)?;

    if let Some(port) = config.metrics_port {
        install_recorder(port)?;
    }

    Ok(TelemetryGuard { _priv: () })
}
