//! Price feed types

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Latest price for a single asset
#[derive(Debug, Clone, Serialize)]
pub struct PriceQuote {
    /// Asset symbol (e.g., "btc")
    pub symbol: String,
    /// Last traded price in USD
    pub price: Decimal,
    /// Server-side refresh time for this asset
    pub last_updated: Option<DateTime<Utc>>,
}

/// One `price_update` feed message, decoded
#[derive(Debug, Clone, Serialize)]
pub struct PriceUpdate {
    /// Quotes carried by the update, sorted by symbol
    pub quotes: Vec<PriceQuote>,
    /// Server timestamp of the broadcast
    pub server_ts: Option<DateTime<Utc>>,
    /// Local timestamp when the update was received
    pub received_at: DateTime<Utc>,
}

/// Parse a feed timestamp.
///
/// The dashboard server emits naive local ISO-8601 timestamps
/// (`datetime.now().isoformat()`); those are read as UTC. Full RFC 3339
/// timestamps are accepted as well.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
