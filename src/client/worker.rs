//! Reconnecting feed client
//!
//! [`FeedClient`] is a cheap handle; all connection state lives in a
//! worker task that owns the socket, the keep-alive timer, and the
//! reconnect schedule. Commands flow through an unbounded channel, so
//! handle methods never block and never fail. Dropping the handle shuts
//! the worker down.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};

use crate::telemetry::{self, CounterMetric, GaugeMetric};
use crate::ws::{Connector, FeedSink, FeedStream, Frame, WsConnector};

use super::backoff::ReconnectSchedule;
use super::types::{ClientConfig, ConnectionState, FeedMessage};

/// Keep-alive payload; the dashboard server answers with `{"type":"pong"}`
const KEEPALIVE_PING: &str = r#"{"type":"ping"}"#;

type MessageHandler = Box<dyn FnMut(FeedMessage) + Send>;
type StateHandler = Box<dyn FnMut(ConnectionState, Option<String>) + Send>;

enum Command {
    Connect,
    Close,
    Send(Value),
    SetMessageHandler(MessageHandler),
    SetStateHandler(StateHandler),
}

/// Handle to a reconnecting WebSocket feed client
pub struct FeedClient {
    cmd_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<ConnectionState>,
}

impl FeedClient {
    /// Spawn a client worker using the production WebSocket connector.
    ///
    /// Must be called within a tokio runtime. The client starts idle;
    /// call [`connect`](Self::connect) to open the feed.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_connector(config, Arc::new(WsConnector::new()))
    }

    /// Spawn a client worker that dials through the given connector
    pub fn with_connector(config: ClientConfig, connector: Arc<dyn Connector>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);

        let schedule = ReconnectSchedule::new(config.backoff.clone());
        let worker = Worker {
            config,
            connector,
            cmd_rx,
            state_tx,
            state: ConnectionState::Idle,
            schedule,
            message_handler: None,
            state_handler: None,
        };
        tokio::spawn(worker.run());

        Self { cmd_tx, state_rx }
    }

    /// Request a connection. No-op while a connection is already open or
    /// being dialed; from `Failed` this starts a fresh retry cycle.
    pub fn connect(&self) {
        let _ = self.cmd_tx.send(Command::Connect);
    }

    /// Tear down any open connection or pending reconnect and return to
    /// idle. Safe to call from any state, any number of times.
    pub fn close(&self) {
        let _ = self.cmd_tx.send(Command::Close);
    }

    /// Send a JSON message over the feed. Dropped with a warning unless
    /// the client is currently connected; never fails.
    pub fn send(&self, message: Value) {
        let _ = self.cmd_tx.send(Command::Send(message));
    }

    /// Install the message handler, replacing any previous one
    pub fn on_message(&self, handler: impl FnMut(FeedMessage) + Send + 'static) {
        let _ = self
            .cmd_tx
            .send(Command::SetMessageHandler(Box::new(handler)));
    }

    /// Install the state-change handler, replacing any previous one
    pub fn on_state_change(
        &self,
        handler: impl FnMut(ConnectionState, Option<String>) + Send + 'static,
    ) {
        let _ = self.cmd_tx.send(Command::SetStateHandler(Box::new(handler)));
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }
}

enum Flow {
    Continue,
    Shutdown,
}

struct Worker {
    config: ClientConfig,
    connector: Arc<dyn Connector>,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    state_tx: watch::Sender<ConnectionState>,
    state: ConnectionState,
    schedule: ReconnectSchedule,
    message_handler: Option<MessageHandler>,
    state_handler: Option<StateHandler>,
}

impl Worker {
    async fn run(mut self) {
        loop {
            let flow = match self.state {
                ConnectionState::Idle | ConnectionState::Failed => self.wait_for_command().await,
                ConnectionState::Connecting => self.dial_and_stream().await,
                ConnectionState::Disconnected => self.wait_for_retry().await,
                // Connected never escapes dial_and_stream; treat a stray
                // sighting as a lost session
                ConnectionState::Connected => {
                    self.transition(
                        ConnectionState::Disconnected,
                        Some("stream ended".to_string()),
                    );
                    Flow::Continue
                }
            };
            if matches!(flow, Flow::Shutdown) {
                break;
            }
        }
        tracing::debug!("Feed client worker stopped");
    }

    /// Idle and Failed: nothing to do until the caller says so
    async fn wait_for_command(&mut self) -> Flow {
        let Some(cmd) = self.cmd_rx.recv().await else {
            return Flow::Shutdown;
        };
        match cmd {
            Command::Connect => {
                // A manual connect starts a fresh retry cycle
                self.schedule.reset();
                self.transition(
                    ConnectionState::Connecting,
                    Some("connect requested".to_string()),
                );
            }
            Command::Close => {
                if self.state == ConnectionState::Failed {
                    self.transition(ConnectionState::Idle, Some("closed by caller".to_string()));
                }
            }
            Command::Send(message) => self.reject_send(&message),
            Command::SetMessageHandler(h) => self.message_handler = Some(h),
            Command::SetStateHandler(h) => self.state_handler = Some(h),
        }
        Flow::Continue
    }

    /// Connecting: dial with a timeout, then stream until the session ends
    async fn dial_and_stream(&mut self) -> Flow {
        let connector = Arc::clone(&self.connector);
        let url = self.config.url.clone();
        let connect_timeout = self.config.connect_timeout;
        let dial = async move {
            tokio::time::timeout(connect_timeout, connector.connect(&url)).await
        };
        tokio::pin!(dial);

        let (write, read) = loop {
            tokio::select! {
                result = &mut dial => match result {
                    Ok(Ok(socket)) => break socket,
                    Ok(Err(e)) => {
                        telemetry::increment(CounterMetric::ConnectFailures);
                        self.transition(ConnectionState::Disconnected, Some(e.to_string()));
                        return Flow::Continue;
                    }
                    Err(_) => {
                        telemetry::increment(CounterMetric::ConnectFailures);
                        self.transition(
                            ConnectionState::Disconnected,
                            Some(format!("connect timed out after {:?}", connect_timeout)),
                        );
                        return Flow::Continue;
                    }
                },
                cmd = self.cmd_rx.recv() => match cmd {
                    None => return Flow::Shutdown,
                    Some(Command::Close) => {
                        // Dropping the dial future aborts the handshake
                        self.transition(
                            ConnectionState::Idle,
                            Some("closed by caller".to_string()),
                        );
                        return Flow::Continue;
                    }
                    Some(Command::Connect) => {
                        tracing::debug!("connect ignored, dial already in progress");
                    }
                    Some(Command::Send(message)) => self.reject_send(&message),
                    Some(Command::SetMessageHandler(h)) => self.message_handler = Some(h),
                    Some(Command::SetStateHandler(h)) => self.state_handler = Some(h),
                },
            }
        };

        self.schedule.reset();
        telemetry::increment(CounterMetric::Connects);
        self.transition(ConnectionState::Connected, None);
        self.stream(write, read).await
    }

    /// Connected: pump frames, keep-alives, and commands until the
    /// session ends
    async fn stream(
        &mut self,
        mut write: Box<dyn FeedSink>,
        mut read: Box<dyn FeedStream>,
    ) -> Flow {
        let period = self.config.keepalive_interval;
        // First ping fires one full interval after connect, not immediately
        let mut keepalive = tokio::time::interval_at(Instant::now() + period, period);
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                frame = read.next() => match frame {
                    Some(Ok(Frame::Text(text))) => self.dispatch(&text),
                    Some(Ok(Frame::Binary(data))) => {
                        tracing::debug!(len = data.len(), "Ignoring binary frame");
                    }
                    Some(Ok(Frame::Ping(data))) => {
                        if let Err(e) = write.send(Frame::Pong(data)).await {
                            tracing::debug!(error = %e, "Pong reply failed");
                        }
                    }
                    Some(Ok(Frame::Pong(_))) => {
                        tracing::trace!("Received transport pong");
                    }
                    Some(Ok(Frame::Close)) => {
                        self.transition(
                            ConnectionState::Disconnected,
                            Some("closed by server".to_string()),
                        );
                        return Flow::Continue;
                    }
                    Some(Err(e)) => {
                        self.transition(ConnectionState::Disconnected, Some(e.to_string()));
                        return Flow::Continue;
                    }
                    None => {
                        self.transition(
                            ConnectionState::Disconnected,
                            Some("stream ended".to_string()),
                        );
                        return Flow::Continue;
                    }
                },
                _ = keepalive.tick() => {
                    if let Err(e) = write.send(Frame::Text(KEEPALIVE_PING.to_string())).await {
                        self.transition(
                            ConnectionState::Disconnected,
                            Some(format!("keep-alive failed: {}", e)),
                        );
                        return Flow::Continue;
                    }
                    telemetry::increment(CounterMetric::KeepalivePings);
                    tracing::trace!("Sent keep-alive ping");
                }
                cmd = self.cmd_rx.recv() => match cmd {
                    None => {
                        write.close().await;
                        return Flow::Shutdown;
                    }
                    Some(Command::Close) => {
                        write.close().await;
                        self.transition(
                            ConnectionState::Idle,
                            Some("closed by caller".to_string()),
                        );
                        return Flow::Continue;
                    }
                    Some(Command::Connect) => {
                        tracing::debug!("connect ignored, already connected");
                    }
                    Some(Command::Send(message)) => match serde_json::to_string(&message) {
                        Ok(text) => {
                            if let Err(e) = write.send(Frame::Text(text)).await {
                                self.transition(
                                    ConnectionState::Disconnected,
                                    Some(format!("send failed: {}", e)),
                                );
                                return Flow::Continue;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Could not serialize outbound message");
                        }
                    },
                    Some(Command::SetMessageHandler(h)) => self.message_handler = Some(h),
                    Some(Command::SetStateHandler(h)) => self.state_handler = Some(h),
                },
            }
        }
    }

    /// Disconnected: sleep out the backoff delay, unless told otherwise
    async fn wait_for_retry(&mut self) -> Flow {
        let Some(delay) = self.schedule.next_attempt() else {
            tracing::warn!(
                attempts = self.schedule.attempts(),
                "Reconnect attempts exhausted, giving up"
            );
            self.transition(
                ConnectionState::Failed,
                Some("reconnect attempts exhausted".to_string()),
            );
            return Flow::Continue;
        };

        telemetry::increment(CounterMetric::ReconnectAttempts);
        telemetry::set_gauge(GaugeMetric::BackoffDelayMs, delay.as_millis() as f64);
        tracing::info!(
            attempt = self.schedule.attempts(),
            delay_ms = delay.as_millis() as u64,
            "Scheduling reconnect"
        );

        let retry = tokio::time::sleep(delay);
        tokio::pin!(retry);

        loop {
            tokio::select! {
                _ = &mut retry => {
                    self.transition(
                        ConnectionState::Connecting,
                        Some(format!("reconnect attempt {}", self.schedule.attempts())),
                    );
                    return Flow::Continue;
                }
                cmd = self.cmd_rx.recv() => match cmd {
                    None => return Flow::Shutdown,
                    Some(Command::Close) => {
                        // Dropping the sleep cancels the pending attempt
                        self.transition(
                            ConnectionState::Idle,
                            Some("closed by caller".to_string()),
                        );
                        return Flow::Continue;
                    }
                    Some(Command::Connect) => {
                        self.transition(
                            ConnectionState::Connecting,
                            Some("connect requested".to_string()),
                        );
                        return Flow::Continue;
                    }
                    Some(Command::Send(message)) => self.reject_send(&message),
                    Some(Command::SetMessageHandler(h)) => self.message_handler = Some(h),
                    Some(Command::SetStateHandler(h)) => self.state_handler = Some(h),
                },
            }
        }
    }

    fn dispatch(&mut self, text: &str) {
        telemetry::increment(CounterMetric::MessagesReceived);
        match FeedMessage::parse(text) {
            Ok(message) => {
                tracing::trace!(
                    kind = message.kind.as_deref().unwrap_or("none"),
                    "Dispatching feed message"
                );
                if let Some(handler) = self.message_handler.as_mut() {
                    handler(message);
                }
            }
            Err(e) => {
                telemetry::increment(CounterMetric::MalformedFrames);
                let preview: String = text.chars().take(120).collect();
                tracing::warn!(error = %e, preview = %preview, "Dropping malformed feed frame");
            }
        }
    }

    fn reject_send(&self, message: &Value) {
        telemetry::increment(CounterMetric::DroppedSends);
        let kind = message.get("type").and_then(Value::as_str).unwrap_or("unknown");
        tracing::warn!(
            state = %self.state,
            kind = kind,
            "Dropping outbound message, not connected"
        );
    }

    fn transition(&mut self, next: ConnectionState, reason: Option<String>) {
        if self.state == next {
            return;
        }
        let prev = self.state;
        self.state = next;
        let _ = self.state_tx.send(next);
        telemetry::set_gauge(
            GaugeMetric::ConnectionUp,
            if next == ConnectionState::Connected { 1.0 } else { 0.0 },
        );
        tracing::info!(
            from = %prev,
            to = %next,
            reason = reason.as_deref().unwrap_or(""),
            "Connection state changed"
        );
        if let Some(handler) = self.state_handler.as_mut() {
            handler(next, reason);
        }
    }
}
