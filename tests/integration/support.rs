//! Local WebSocket server and helpers shared by the integration tests

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use pulse_feed::client::{ConnectionState, FeedClient};

/// Events observed by the test server
#[derive(Debug)]
pub enum ServerEvent {
    /// A client completed the WebSocket handshake
    Connected,
    /// A text frame arrived from the client
    Text(String),
    /// The session ended
    Closed,
}

/// Commands steering the active session
#[derive(Debug)]
pub enum ServerCommand {
    /// Send a text frame to the client
    Send(String),
    /// Drop the socket without a close handshake
    Drop,
}

pub struct FeedServer {
    pub addr: SocketAddr,
    pub events: mpsc::UnboundedReceiver<ServerEvent>,
    pub commands: mpsc::UnboundedSender<ServerCommand>,
}

impl FeedServer {
    pub fn url(&self) -> String {
        format!("ws://{}/feed", self.addr)
    }

    pub async fn next_event(&mut self) -> ServerEvent {
        tokio::time::timeout(Duration::from_secs(5), self.events.recv())
            .await
            .expect("timed out waiting for server event")
            .expect("server task ended")
    }

    pub async fn wait_for_session(&mut self) {
        loop {
            if matches!(self.next_event().await, ServerEvent::Connected) {
                return;
            }
        }
    }
}

/// Bind a scripted WebSocket server on an ephemeral port.
///
/// The server accepts one session at a time, reports inbound text frames
/// as [`ServerEvent`]s and applies [`ServerCommand`]s to the live session.
pub async fn spawn_feed_server() -> FeedServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (event_tx, events) = mpsc::unbounded_channel();
    let (command_tx, mut command_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                continue;
            };
            let _ = event_tx.send(ServerEvent::Connected);

            loop {
                tokio::select! {
                    command = command_rx.recv() => match command {
                        Some(ServerCommand::Send(text)) => {
                            if ws.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        Some(ServerCommand::Drop) => break,
                        None => return,
                    },
                    frame = ws.next() => match frame {
                        Some(Ok(Message::Text(text))) => {
                            let _ = event_tx.send(ServerEvent::Text(text));
                        }
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                            let _ = event_tx.send(ServerEvent::Closed);
                            break;
                        }
                        Some(Ok(_)) => {}
                    },
                }
            }
        }
    });

    FeedServer {
        addr,
        events,
        commands: command_tx,
    }
}

/// Record connection state transitions on a channel
pub fn track_states(
    client: &FeedClient,
) -> mpsc::UnboundedReceiver<(ConnectionState, Option<String>)> {
    let (tx, rx) = mpsc::unbounded_channel();
    client.on_state_change(move |state, reason| {
        let _ = tx.send((state, reason));
    });
    rx
}

/// Wait until the tracked state reaches `want`, returning its reason
pub async fn wait_for_state(
    states: &mut mpsc::UnboundedReceiver<(ConnectionState, Option<String>)>,
    want: ConnectionState,
) -> Option<String> {
    loop {
        let (state, reason) = tokio::time::timeout(Duration::from_secs(5), states.recv())
            .await
            .expect("timed out waiting for state change")
            .expect("state channel closed");
        if state == want {
            return reason;
        }
    }
}
