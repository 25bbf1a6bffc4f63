use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use futures::{SinkExt, StreamExt};
use shared::domain::ConnectionId;
use tokio::{
    runtime::Handle,
    sync::{mpsc, oneshot},
};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

use crate::transport::{EventSink, Transport, TransportError, TransportEvent, TransportFactory};

pub fn parse_websocket_url(address: &str) -> Result<Url, TransportError> {
    let url = Url::parse(address)?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(TransportError::UnsupportedScheme(other.to_string())),
    }
}

/// Opens tokio-tungstenite connections on a runtime owned elsewhere.
pub struct WsTransportFactory<S: EventSink> {
    runtime: Handle,
    sink: S,
}

impl<S: EventSink> WsTransportFactory<S> {
    pub fn new(runtime: Handle, sink: S) -> Self {
        Self { runtime, sink }
    }
}

impl<S: EventSink> TransportFactory for WsTransportFactory<S> {
    type Transport = WsTransport;

    fn open(&mut self, id: ConnectionId, address: &str) -> Result<WsTransport, TransportError> {
        let url = parse_websocket_url(address)?;
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = oneshot::channel();
        let ready = Arc::new(AtomicBool::new(false));

        self.runtime.spawn(run_connection(
            id,
            url,
            self.sink.clone(),
            Arc::clone(&ready),
            outbound_rx,
            close_rx,
        ));

        Ok(WsTransport {
            outbound: outbound_tx,
            close: Some(close_tx),
            ready,
        })
    }
}

pub struct WsTransport {
    outbound: mpsc::UnboundedSender<String>,
    close: Option<oneshot::Sender<()>>,
    ready: Arc<AtomicBool>,
}

impl Transport for WsTransport {
    fn send(&mut self, frame: &str) -> Result<(), TransportError> {
        if self.outbound.is_closed() {
            return Err(TransportError::Closed);
        }
        if !self.ready.load(Ordering::Acquire) {
            return Err(TransportError::NotOpen);
        }
        self.outbound
            .send(frame.to_string())
            .map_err(|_| TransportError::Closed)
    }

    fn close(&mut self) {
        if let Some(close) = self.close.take() {
            let _ = close.send(());
        }
    }
}

async fn run_connection<S: EventSink>(
    id: ConnectionId,
    url: Url,
    sink: S,
    ready: Arc<AtomicBool>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    mut close_rx: oneshot::Receiver<()>,
) {
    // A dropped close sender counts as a close request.
    let handshake = tokio::select! {
        result = connect_async(url.as_str()) => result,
        _ = &mut close_rx => {
            debug!(connection_id = id.0, url = %url, "close requested during handshake");
            sink.deliver(id, TransportEvent::Closed);
            return;
        }
    };

    let stream = match handshake {
        Ok((stream, _response)) => stream,
        Err(err) => {
            warn!(connection_id = id.0, url = %url, "websocket handshake failed: {err}");
            sink.deliver(id, TransportEvent::Error(err.to_string()));
            sink.deliver(id, TransportEvent::Closed);
            return;
        }
    };

    ready.store(true, Ordering::Release);
    info!(connection_id = id.0, url = %url, "websocket open");
    sink.deliver(id, TransportEvent::Open);

    let (mut writer, mut reader) = stream.split();
    let mut closing = false;
    let failure = loop {
        tokio::select! {
            _ = &mut close_rx, if !closing => {
                closing = true;
                ready.store(false, Ordering::Release);
                debug!(connection_id = id.0, "sending close frame");
                if let Err(err) = writer.send(Message::Close(None)).await {
                    break Some(format!("websocket close failed: {err}"));
                }
            }
            frame = outbound.recv(), if !closing => match frame {
                Some(text) => {
                    if let Err(err) = writer.send(Message::Text(text)).await {
                        break Some(format!("websocket send failed: {err}"));
                    }
                }
                None => {
                    closing = true;
                    ready.store(false, Ordering::Release);
                    let _ = writer.send(Message::Close(None)).await;
                }
            },
            incoming = reader.next() => match incoming {
                Some(Ok(Message::Text(text))) => sink.deliver(id, TransportEvent::Message(text)),
                Some(Ok(Message::Binary(bytes))) => sink.deliver(
                    id,
                    TransportEvent::Message(String::from_utf8_lossy(&bytes).into_owned()),
                ),
                Some(Ok(Message::Close(frame))) => {
                    debug!(connection_id = id.0, ?frame, "close frame received");
                    ready.store(false, Ordering::Release);
                    closing = true;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) if closing => {
                    debug!(connection_id = id.0, "websocket ended while closing: {err}");
                    break None;
                }
                Some(Err(err)) => break Some(format!("websocket receive failed: {err}")),
                None => break None,
            },
        }
    };

    ready.store(false, Ordering::Release);
    if let Some(reason) = failure {
        warn!(connection_id = id.0, "{reason}");
        sink.deliver(id, TransportEvent::Error(reason));
    }
    info!(connection_id = id.0, url = %url, "websocket closed");
    sink.deliver(id, TransportEvent::Closed);
}

#[cfg(test)]
#[path = "tests/ws_transport_tests.rs"]
mod tests;
