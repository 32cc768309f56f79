use std::sync::Arc;
use std::time::Duration;

use domain::printer::{
    MSG_CONNECTION_FAILED, PrinterError, PrinterTransport, TransportEvent, TransportEventSink,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::PrinterAddress;
use super::ready_state::ReadyState;

/// Raw TCP socket to a receipt printer (port 9100 "JetDirect" style).
///
/// Construction spawns the connection task immediately. Writes are handed to
/// that task through an unbounded channel so `send` never blocks the caller.
pub struct NetworkPrinter {
    address: PrinterAddress,
    state: Arc<ReadyState>,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    cancel: CancellationToken,
}

impl NetworkPrinter {
    pub fn spawn(
        handle: &Handle,
        address: PrinterAddress,
        connect_timeout: Option<Duration>,
        events: Arc<dyn TransportEventSink>,
    ) -> Self {
        let state = Arc::new(ReadyState::new());
        let (outbound, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        handle.spawn(run(
            address.clone(),
            connect_timeout,
            state.clone(),
            rx,
            cancel.clone(),
            events,
        ));

        Self {
            address,
            state,
            outbound,
            cancel,
        }
    }

    pub fn address(&self) -> &PrinterAddress {
        &self.address
    }
}

impl PrinterTransport for NetworkPrinter {
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

impl Drop for NetworkPrinter {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn connect_stream(
    address: &PrinterAddress,
    connect_timeout: Option<Duration>,
) -> std::io::Result<TcpStream> {
    let connect = TcpStream::connect((address.host.as_str(), address.port));
    match connect_timeout {
        Some(limit) => tokio::time::timeout(limit, connect).await.map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::TimedOut, "connection timed out")
        })?,
        None => connect.await,
    }
}

async fn run(
    address: PrinterAddress,
    connect_timeout: Option<Duration>,
    state: Arc<ReadyState>,
    mut outbound: mpsc::UnboundedReceiver<Vec<u8>>,
    cancel: CancellationToken,
    events: Arc<dyn TransportEventSink>,
) {
    info!(%address, "Connecting to printer");

    let stream = tokio::select! {
        _ = cancel.cancelled() => {
            state.mark_closed();
            events.emit(TransportEvent::Closed("closed before connecting".to_string()));
            return;
        }
        result = connect_stream(&address, connect_timeout) => match result {
            Ok(stream) => stream,
            Err(e) => {
                warn!(%address, error = %e, "Printer connection failed");
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

    if let Err(e) = stream.set_nodelay(true) {
        debug!(%address, error = %e, "Could not disable Nagle on printer socket");
    }

    info!(%address, "Connected to printer");
    state.mark_open();
    events.emit(TransportEvent::Opened);

    let (mut reader, mut writer) = stream.into_split();
    let mut status_buf = [0u8; 256];

    let outcome = loop {
        tokio::select! {
            biased;

            Some(payload) = outbound.recv() => {
                if let Err(e) = write_payload(&mut writer, &payload).await {
                    warn!(%address, error = %e, "Failed to write to printer");
                    break TransportEvent::Errored(MSG_CONNECTION_FAILED.to_string());
                }
                trace!(%address, bytes = payload.len(), "Payload written");
            }
            _ = cancel.cancelled() => {
                // Flush anything queued before the close request
                while let Ok(payload) = outbound.try_recv() {
                    if let Err(e) = write_payload(&mut writer, &payload).await {
                        warn!(%address, error = %e, "Failed to flush payload on close");
                        break;
                    }
                }
                let _ = writer.shutdown().await;
                break TransportEvent::Closed("closed by client".to_string());
            }
            read = reader.read(&mut status_buf) => match read {
                Ok(0) => break TransportEvent::Closed("closed by printer".to_string()),
                // Printers may push status bytes back; they are not interpreted here
                Ok(n) => trace!(%address, bytes = n, "Ignoring printer status bytes"),
                Err(e) => {
                    warn!(%address, error = %e, "Printer socket read failed");
                    break TransportEvent::Errored(MSG_CONNECTION_FAILED.to_string());
                }
            },
        }
    };

    state.mark_closed();
    info!(%address, ?outcome, "Printer socket finished");
    events.emit(outcome);
}

async fn write_payload(
    writer: &mut tokio::net::tcp::OwnedWriteHalf,
    payload: &[u8],
) -> std::io::Result<()> {
    writer.write_all(payload).await?;
    writer.flush().await
}
