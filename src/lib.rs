//! pulse-feed: Resilient WebSocket client for the Crypto Pulse dashboard feed
//!
//! This library provides the core components for:
//! - A reconnecting WebSocket client with exponential backoff
//! - Keep-alive pings and JSON message dispatch keyed on `type`
//! - Typed price updates for dashboard consumers
//! - Periodic daily-analysis refresh over HTTP
//! - Full observability stack

pub mod analysis;
pub mod cli;
pub mod client;
pub mod config;
pub mod feed;
pub mod telemetry;
pub mod ws;
