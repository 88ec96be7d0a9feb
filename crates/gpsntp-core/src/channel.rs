use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::reconciler::UpdateSink;
use crate::snapshot::{ConnectionState, LiveTimeSample, Update};

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("connect timeout")]
    Timeout,
    #[error("connect failed: {0}")]
    Connect(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Message(String),
    Error(String),
    Closed,
}

#[async_trait]
pub trait PushConnection: Send {
    /// Next event in arrival order. After `Closed` the connection is done.
    async fn next_event(&mut self) -> TransportEvent;
    async fn close(&mut self);
}

#[async_trait]
pub trait PushConnector: Send + Sync + 'static {
    type Connection: PushConnection + 'static;

    async fn connect(&self, url: &str) -> Result<Self::Connection, ChannelError>;
}

pub struct WsConnector {
    connect_timeout: Duration,
}

impl WsConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl PushConnector for WsConnector {
    type Connection = WsConnection;

    async fn connect(&self, url: &str) -> Result<WsConnection, ChannelError> {
        match timeout(self.connect_timeout, connect_async(url)).await {
            Ok(Ok((stream, _response))) => Ok(WsConnection {
                stream,
                failed: false,
            }),
            Ok(Err(err)) => Err(ChannelError::Connect(err.to_string())),
            Err(_) => Err(ChannelError::Timeout),
        }
    }
}

pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    failed: bool,
}

#[async_trait]
impl PushConnection for WsConnection {
    async fn next_event(&mut self) -> TransportEvent {
        // a stream that has errored once is unusable; report the close that follows
        if self.failed {
            return TransportEvent::Closed;
        }

        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return TransportEvent::Message(text),
                Some(Ok(Message::Binary(data))) => {
                    return TransportEvent::Message(String::from_utf8_lossy(&data).into_owned());
                }
                Some(Ok(Message::Close(_))) | None => return TransportEvent::Closed,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    self.failed = true;
                    return TransportEvent::Error(err.to_string());
                }
            }
        }
    }

    async fn close(&mut self) {
        if let Err(err) = self.stream.close(None).await {
            debug!(error = %err, "websocket close");
        }
    }
}

/// Extracts a time sample from a pushed frame. Anything that is not JSON,
/// or has no integer `epoch`, yields `None`.
pub fn decode_sample(raw: &str) -> Option<LiveTimeSample> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let epoch = value.get("epoch")?.as_i64()?;
    Some(LiveTimeSample { epoch })
}

/// Push channel with fixed-delay reconnection. Owns its connection task.
pub struct LiveChannel {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl LiveChannel {
    pub fn start<C: PushConnector>(
        connector: C,
        url: impl Into<String>,
        reconnect_delay: Duration,
        sink: Arc<dyn UpdateSink>,
    ) -> Self {
        let token = CancellationToken::new();
        let session = Session {
            connector,
            url: url.into(),
            reconnect_delay,
            sink,
            token: token.clone(),
        };
        let task = tokio::spawn(session.run());
        Self {
            token,
            task: Some(task),
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Cancels a pending retry, closes the open connection and waits for the
    /// task to finish. Nothing is published once this returns.
    pub async fn stop(&mut self) {
        self.token.cancel();
        let Some(task) = self.task.take() else {
            return;
        };
        if let Err(err) = task.await {
            warn!(error = %err, "push channel task ended abnormally");
        }
    }
}

impl Drop for LiveChannel {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

enum SessionExit {
    Closed,
    Stopped,
}

struct Session<C> {
    connector: C,
    url: String,
    reconnect_delay: Duration,
    sink: Arc<dyn UpdateSink>,
    token: CancellationToken,
}

impl<C: PushConnector> Session<C> {
    async fn run(self) {
        loop {
            self.emit(Update::Connection(ConnectionState::Connecting));

            let opened = tokio::select! {
                biased;
                _ = self.token.cancelled() => return,
                opened = self.connector.connect(&self.url) => opened,
            };

            match opened {
                Ok(mut connection) => {
                    info!(url = %self.url, "push channel connected");
                    self.emit(Update::Connection(ConnectionState::Connected));
                    if let SessionExit::Stopped = self.pump(&mut connection).await {
                        return;
                    }
                    info!(url = %self.url, "push channel closed");
                }
                Err(err) => {
                    warn!(url = %self.url, error = %err, "push channel open failed");
                    self.emit(Update::Connection(ConnectionState::Error));
                }
            }

            self.emit(Update::Connection(ConnectionState::Disconnected));

            tokio::select! {
                biased;
                _ = self.token.cancelled() => return,
                _ = sleep(self.reconnect_delay) => {}
            }
        }
    }

    async fn pump(&self, connection: &mut C::Connection) -> SessionExit {
        loop {
            let event = tokio::select! {
                biased;
                _ = self.token.cancelled() => None,
                event = connection.next_event() => Some(event),
            };

            let Some(event) = event else {
                connection.close().await;
                return SessionExit::Stopped;
            };

            match event {
                TransportEvent::Message(raw) => match decode_sample(&raw) {
                    Some(sample) => self.emit(Update::LiveTime(sample)),
                    None => debug!(len = raw.len(), "ignoring push message without epoch"),
                },
                // an error alone does not reconnect; only the close that follows does
                TransportEvent::Error(reason) => {
                    warn!(url = %self.url, error = %reason, "push channel error");
                    self.emit(Update::Connection(ConnectionState::Error));
                }
                TransportEvent::Closed => return SessionExit::Closed,
            }
        }
    }

    fn emit(&self, update: Update) {
        if self.token.is_cancelled() {
            return;
        }
        self.sink.publish(update);
    }
}
