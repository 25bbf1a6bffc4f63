//! Transport seam between the connection controller and the network.
//!
//! A [`TransportFactory`] instantiates one [`Transport`] per connect action.
//! Lifecycle events flow back through an [`EventSink`] tagged with the
//! [`ConnectionId`] the transport was opened with. Per connection the order
//! is: at most one `Open`, any number of `Message`, then exactly one
//! `Closed`, optionally preceded by a single `Error`.

use shared::domain::ConnectionId;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Open,
    Message(String),
    Error(String),
    Closed,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid WebSocket URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("WebSocket is not open")]
    NotOpen,
    #[error("WebSocket is already closed")]
    Closed,
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

pub trait Transport {
    /// Queues one already-framed text message; fails if the stream is not ready.
    fn send(&mut self, frame: &str) -> Result<(), TransportError>;

    /// Advisory close request; completion is reported as `TransportEvent::Closed`.
    fn close(&mut self);
}

pub trait TransportFactory {
    type Transport: Transport;

    fn open(&mut self, id: ConnectionId, address: &str) -> Result<Self::Transport, TransportError>;
}

pub trait EventSink: Clone + Send + Sync + 'static {
    fn deliver(&self, id: ConnectionId, event: TransportEvent);
}

impl EventSink for mpsc::UnboundedSender<(ConnectionId, TransportEvent)> {
    fn deliver(&self, id: ConnectionId, event: TransportEvent) {
        if self.send((id, event)).is_err() {
            tracing::debug!(connection_id = id.0, "transport event dropped; receiver gone");
        }
    }
}
