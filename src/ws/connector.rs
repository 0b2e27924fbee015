//! tokio-tungstenite connector

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::types::{Connector, FeedSink, FeedStream, Frame, SplitSocket, WsError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Production connector backed by tokio-tungstenite
pub struct WsConnector;

impl WsConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WsConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<SplitSocket, WsError> {
        tracing::info!(url = %url, "Connecting to WebSocket");

        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let (write, read) = ws_stream.split();
        Ok((
            Box::new(WsWriter { inner: write }),
            Box::new(WsReader { inner: read }),
        ))
    }
}

struct WsWriter {
    inner: SplitSink<WsStream, Message>,
}

#[async_trait]
impl FeedSink for WsWriter {
    async fn send(&mut self, frame: Frame) -> Result<(), WsError> {
        self.inner
            .send(frame_to_message(frame))
            .await
            .map_err(|e| WsError::SendFailed(e.to_string()))
    }

    async fn close(&mut self) {
        if let Err(e) = self.inner.close().await {
            tracing::debug!(error = %e, "Error closing WebSocket");
        }
    }
}

struct WsReader {
    inner: SplitStream<WsStream>,
}

#[async_trait]
impl FeedStream for WsReader {
    async fn next(&mut self) -> Option<Result<Frame, WsError>> {
        loop {
            return match self.inner.next().await? {
                Ok(msg) => match message_to_frame(msg) {
                    Some(frame) => Some(Ok(frame)),
                    None => continue,
                },
                Err(e) => Some(Err(WsError::ConnectionFailed(e.to_string()))),
            };
        }
    }
}

fn frame_to_message(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text),
        Frame::Binary(data) => Message::Binary(data),
        Frame::Ping(data) => Message::Ping(data),
        Frame::Pong(data) => Message::Pong(data),
        Frame::Close => Message::Close(None),
    }
}

fn message_to_frame(msg: Message) -> Option<Frame> {
    match msg {
        Message::Text(text) => Some(Frame::Text(text)),
        Message::Binary(data) => Some(Frame::Binary(data)),
        Message::Ping(data) => Some(Frame::Ping(data)),
        Message::Pong(data) => Some(Frame::Pong(data)),
        Message::Close(_) => Some(Frame::Close),
        // Raw frames are an internal tungstenite detail
        Message::Frame(_) => None,
    }
}
