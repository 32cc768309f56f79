use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use domain::printer::{
    PrinterError, PrinterTransport, TransportEvent, TransportEventSink, TransportFactory,
};

use super::PrinterAddress;

struct MockState {
    address: PrinterAddress,
    sink: Arc<dyn TransportEventSink>,
    open: AtomicBool,
    finished: AtomicBool,
    close_requested: AtomicBool,
    sent: Mutex<Vec<Vec<u8>>>,
}

impl MockState {
    fn finish(&self, event: TransportEvent) {
        self.open.store(false, Ordering::SeqCst);
        self.finished.store(true, Ordering::SeqCst);
        self.sink.emit(event);
    }
}

/// In-memory transport. Nothing happens on its own: tests drive the lifecycle
/// through the matching [`MockTransportHandle`].
pub struct MockTransport {
    state: Arc<MockState>,
}

impl PrinterTransport for MockTransport {
    fn is_sendable(&self) -> bool {
        self.state.open.load(Ordering::SeqCst) && !self.state.finished.load(Ordering::SeqCst)
    }

    fn send(&self, payload: &[u8]) -> Result<(), PrinterError> {
        if !self.is_sendable() {
            return Err(PrinterError::NotConnected);
        }
        lock(&self.state.sent).push(payload.to_vec());
        Ok(())
    }

    fn close(&self) {
        self.state.close_requested.store(true, Ordering::SeqCst);
    }
}

/// Test-side control of one [`MockTransport`]
#[derive(Clone)]
pub struct MockTransportHandle {
    state: Arc<MockState>,
}

impl MockTransportHandle {
    pub fn address(&self) -> &PrinterAddress {
        &self.state.address
    }

    /// Complete the handshake
    pub fn open(&self) {
        self.state.open.store(true, Ordering::SeqCst);
        self.state.sink.emit(TransportEvent::Opened);
    }

    /// The printer hung up
    pub fn close_remote(&self, reason: &str) {
        self.state.finish(TransportEvent::Closed(reason.to_string()));
    }

    /// Acknowledge a close requested through [`PrinterTransport::close`]
    pub fn confirm_close(&self) {
        self.state
            .finish(TransportEvent::Closed("closed by client".to_string()));
    }

    pub fn fail(&self, message: &str) {
        self.state
            .finish(TransportEvent::Errored(message.to_string()));
    }

    pub fn close_requested(&self) -> bool {
        self.state.close_requested.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        lock(&self.state.sent).clone()
    }
}

#[derive(Default)]
struct FactoryState {
    opened: Vec<MockTransportHandle>,
    fail_next: Option<PrinterError>,
}

/// Factory handing out [`MockTransport`]s and keeping a handle to each
#[derive(Clone)]
pub struct MockTransportFactory {
    default_port: u16,
    inner: Arc<Mutex<FactoryState>>,
}

impl MockTransportFactory {
    pub fn new() -> Self {
        Self {
            default_port: 9100,
            inner: Arc::default(),
        }
    }

    /// Make the next `open` fail synchronously with `error`
    pub fn fail_next_open(&self, error: PrinterError) {
        lock(&self.inner).fail_next = Some(error);
    }

    pub fn opened_count(&self) -> usize {
        lock(&self.inner).opened.len()
    }

    pub fn transport(&self, index: usize) -> Option<MockTransportHandle> {
        lock(&self.inner).opened.get(index).cloned()
    }

    pub fn last(&self) -> Option<MockTransportHandle> {
        lock(&self.inner).opened.last().cloned()
    }
}

impl Default for MockTransportFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportFactory for MockTransportFactory {
    fn open(
        &self,
        address: &str,
        events: Arc<dyn TransportEventSink>,
    ) -> Result<Box<dyn PrinterTransport>, PrinterError> {
        let mut inner = lock(&self.inner);
        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }

        let state = Arc::new(MockState {
            address: PrinterAddress::parse(address, self.default_port)?,
            sink: events,
            open: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            close_requested: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
        });
        inner.opened.push(MockTransportHandle {
            state: state.clone(),
        });

        Ok(Box::new(MockTransport { state }))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
