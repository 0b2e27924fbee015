//! Price feed module
//!
//! Decodes the dashboard server's real-time price broadcasts into typed
//! updates delivered over a channel.

mod dashboard;
mod types;

pub use dashboard::{parse_price_update, DashboardFeed};
pub use types::{parse_timestamp, PriceQuote, PriceUpdate};
