//! WebSocket transport layer
//!
//! Defines the transport seam the feed client dials through, plus the
//! tokio-tungstenite implementation used in production. Tests substitute
//! a scripted connector to drive the client without a network.

mod connector;
mod types;

pub use connector::WsConnector;
pub use types::{Connector, FeedSink, FeedStream, Frame, SplitSocket, WsError};
