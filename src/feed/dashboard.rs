//! Dashboard price feed
//!
//! Wires a [`FeedClient`] to a typed channel of [`PriceUpdate`]s, decoding
//! the dashboard server's `price_update` broadcasts.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::client::{ClientConfig, FeedClient, FeedMessage};
use crate::telemetry::{self, CounterMetric};

use super::types::{parse_timestamp, PriceQuote, PriceUpdate};

/// Wire shape of a `price_update` message
#[derive(Debug, Deserialize)]
struct PriceUpdateEnvelope {
    data: HashMap<String, RawQuote>,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawQuote {
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    last_updated: Option<String>,
}

/// Decode a `price_update` payload into a typed update.
///
/// Assets without a usable price are skipped; the server reports a zero
/// price until its first upstream fetch. Returns `None` when nothing
/// usable remains.
pub fn parse_price_update(payload: &Value) -> Option<PriceUpdate> {
    let envelope: PriceUpdateEnvelope = serde_json::from_value(payload.clone()).ok()?;

    let mut quotes: Vec<PriceQuote> = envelope
        .data
        .into_iter()
        .filter_map(|(symbol, raw)| {
            let price = raw.price?;
            if price <= Decimal::ZERO {
                return None;
            }
            Some(PriceQuote {
                symbol,
                price,
                last_updated: raw.last_updated.as_deref().and_then(parse_timestamp),
            })
        })
        .collect();

    if quotes.is_empty() {
        return None;
    }
    // HashMap iteration order is random
    quotes.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    Some(PriceUpdate {
        quotes,
        server_ts: envelope.timestamp.as_deref().and_then(parse_timestamp),
        received_at: Utc::now(),
    })
}

/// Route one feed message to the update channel
fn route(message: &FeedMessage, updates: &mpsc::Sender<PriceUpdate>) {
    match message.kind.as_deref() {
        Some("price_update") => {
            let Some(update) = parse_price_update(&message.payload) else {
                tracing::warn!("price_update with no usable quotes");
                return;
            };
            match updates.try_send(update) {
                Ok(()) => telemetry::increment(CounterMetric::PriceUpdates),
                Err(TrySendError::Full(_)) => {
                    telemetry::increment(CounterMetric::DroppedUpdates);
                    tracing::debug!("Subscriber falling behind, dropping price update");
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::trace!("Update receiver dropped");
                }
            }
        }
        Some("pong") => {
            tracing::trace!("Keep-alive pong received");
        }
        other => {
            tracing::trace!(kind = other.unwrap_or("none"), "Unhandled feed message");
        }
    }
}

/// Typed price feed for the Crypto Pulse dashboard server
pub struct DashboardFeed {
    config: ClientConfig,
    buffer: usize,
}

impl DashboardFeed {
    /// Create a feed over the given client configuration
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            buffer: 256,
        }
    }

    /// Set the update channel capacity
    pub fn buffer(mut self, n: usize) -> Self {
        self.buffer = n;
        self
    }

    /// Build the client and wire price routing into it.
    ///
    /// The caller owns the lifecycle: call `connect()` on the returned
    /// client to go live, and `close()` to tear the feed down.
    pub fn subscribe(&self) -> (FeedClient, mpsc::Receiver<PriceUpdate>) {
        let (update_tx, update_rx) = mpsc::channel(self.buffer);

        tracing::info!(url = %self.config.url, "Subscribing to dashboard feed");

        let client = FeedClient::new(self.config.clone());
        client.on_message(move |message| route(&message, &update_tx));

        (client, update_rx)
    }
}
