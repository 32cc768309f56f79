use std::sync::Arc;
use std::time::Duration;

use domain::printer::{
    MSG_CONNECTION_FAILED, PrinterError, PrinterTransport, TransportEvent, TransportEventSink,
};
use futures_util::{SinkExt, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_util::sync::CancellationToken;
use tracing::{info, trace, warn};

use super::PrinterAddress;
use super::ready_state::ReadyState;

/// Message-oriented socket to a printer exposed through a WebSocket bridge
/// at `ws://<address>`.
pub struct WebSocketPrinter {
    url: String,
    state: Arc<ReadyState>,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    cancel: CancellationToken,
}

impl WebSocketPrinter {
    pub fn spawn(
        handle: &Handle,
        address: &PrinterAddress,
        connect_timeout: Option<Duration>,
        events: Arc<dyn TransportEventSink>,
    ) -> Self {
        let url = format!("ws://{address}");
        let state = Arc::new(ReadyState::new());
        let (outbound, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        handle.spawn(run(
            url.clone(),
            connect_timeout,
            state.clone(),
            rx,
            cancel.clone(),
            events,
        ));

        Self {
            url,
            state,
            outbound,
            cancel,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PrinterTransport for WebSocketPrinter {
    fn is_sendable(&self) -> bool {
        self.state.is_open()
    }

    fn send(&self, payload: &[u8]) -> Result<(), PrinterError> {
        if !self.state.is_open() {
            return Err(PrinterError::NotConnected);
        }
        self.outbound
            .send(payload.to_vec())
            .map_err(|_| PrinterError::WriteFailed("connection task has stopped".to_string()))
    }

    fn close(&self) {
        self.state.begin_closing();
        self.cancel.cancel();
    }
}

impl Drop for WebSocketPrinter {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Text frame when the payload is UTF-8, binary otherwise; bytes are never altered
fn to_frame(payload: Vec<u8>) -> WsMessage {
    match String::from_utf8(payload) {
        Ok(text) => WsMessage::Text(text),
        Err(e) => WsMessage::Binary(e.into_bytes()),
    }
}

async fn run(
    url: String,
    connect_timeout: Option<Duration>,
    state: Arc<ReadyState>,
    mut outbound: mpsc::UnboundedReceiver<Vec<u8>>,
    cancel: CancellationToken,
    events: Arc<dyn TransportEventSink>,
) {
    info!(%url, "Opening printer WebSocket");

    let handshake = async {
        let connect = tokio_tungstenite::connect_async(url.as_str());
        match connect_timeout {
            Some(limit) => match tokio::time::timeout(limit, connect).await {
                Ok(result) => result,
                Err(_) => Err(WsError::Io(std::io::ErrorKind::TimedOut.into())),
            },
            None => connect.await,
        }
    };

    let ws_stream = tokio::select! {
        _ = cancel.cancelled() => {
            state.mark_closed();
            events.emit(TransportEvent::Closed("closed before connecting".to_string()));
            return;
        }
        result = handshake => match result {
            Ok((stream, _response)) => stream,
            Err(e) => {
                warn!(%url, error = %e, "Printer WebSocket handshake failed");
                state.mark_closed();
                events.emit(TransportEvent::Errored(MSG_CONNECTION_FAILED.to_string()));
                return;
            }
        }
    };

    if cancel.is_cancelled() {
        state.mark_closed();
        events.emit(TransportEvent::Closed("closed before connecting".to_string()));
        return;
    }

    info!(%url, "Printer WebSocket open");
    state.mark_open();
    events.emit(TransportEvent::Opened);

    let (mut sink, mut stream) = ws_stream.split();

    let outcome = loop {
        tokio::select! {
            biased;

            Some(payload) = outbound.recv() => {
                let len = payload.len();
                if let Err(e) = sink.send(to_frame(payload)).await {
                    warn!(%url, error = %e, "Failed to send to printer WebSocket");
                    break TransportEvent::Errored(MSG_CONNECTION_FAILED.to_string());
                }
                trace!(%url, bytes = len, "Payload sent");
            }
            _ = cancel.cancelled() => {
                while let Ok(payload) = outbound.try_recv() {
                    if sink.send(to_frame(payload)).await.is_err() {
                        break;
                    }
                }
                let _ = sink.close().await;
                break TransportEvent::Closed("closed by client".to_string());
            }
            frame = stream.next() => match frame {
                None => break TransportEvent::Closed("closed by printer".to_string()),
                Some(Ok(WsMessage::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.reason.to_string())
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| "closed by printer".to_string());
                    break TransportEvent::Closed(reason);
                }
                Some(Ok(other)) => trace!(%url, ?other, "Ignoring inbound frame"),
                Some(Err(WsError::ConnectionClosed)) => {
                    break TransportEvent::Closed("closed by printer".to_string());
                }
                Some(Err(e)) => {
                    warn!(%url, error = %e, "Printer WebSocket failed");
                    break TransportEvent::Errored(MSG_CONNECTION_FAILED.to_string());
                }
            },
        }
    };

    state.mark_closed();
    info!(%url, ?outcome, "Printer WebSocket finished");
    events.emit(outcome);
}
