//! Transport frames, errors, and the connector seam

use async_trait::async_trait;
use thiserror::Error;

/// A single WebSocket frame, decoupled from the underlying library types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text payload
    Text(String),
    /// Raw binary payload
    Binary(Vec<u8>),
    /// Protocol-level ping
    Ping(Vec<u8>),
    /// Protocol-level pong
    Pong(Vec<u8>),
    /// Peer closed the connection
    Close,
}

/// WebSocket transport errors
#[derive(Debug, Clone, Error)]
pub enum WsError {
    /// Dialing or streaming from the endpoint failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// Writing a frame to the peer failed
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Write half of an open connection
#[async_trait]
pub trait FeedSink: Send {
    /// Send a single frame to the peer
    async fn send(&mut self, frame: Frame) -> Result<(), WsError>;

    /// Close the connection, flushing pending frames
    async fn close(&mut self);
}

/// Read half of an open connection
#[async_trait]
pub trait FeedStream: Send {
    /// Receive the next frame. `None` means the stream has ended.
    async fn next(&mut self) -> Option<Result<Frame, WsError>>;
}

/// An open connection split into write and read halves
pub type SplitSocket = (Box<dyn FeedSink>, Box<dyn FeedStream>);

/// Dials a feed endpoint and hands back an open connection
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<SplitSocket, WsError>;
}
