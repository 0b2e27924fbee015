//! Reconnecting WebSocket feed client
//!
//! Provides a client handle with explicit lifecycle control, automatic
//! reconnection with capped exponential backoff, keep-alive pings, and
//! JSON message dispatch keyed on the `type` discriminator field.

mod backoff;
mod types;
mod worker;

pub use backoff::{BackoffPolicy, ReconnectSchedule};
pub use types::{ClientConfig, ConnectionState, FeedMessage};
pub use worker::FeedClient;
