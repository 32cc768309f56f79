use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::PrinterError;

/// Identity of one connection attempt.
///
/// Every transport created by the registry gets a fresh id, so lifecycle
/// events can be matched against the exact instance that produced them rather
/// than against the printer id alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Lifecycle signals a transport reports about its socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed, payloads can be sent
    Opened,
    /// Session ended by either side
    Closed(String),
    /// Socket could not be established, or an established session failed
    Errored(String),
}

/// Receives the lifecycle events of one transport instance
pub trait TransportEventSink: Send + Sync {
    fn emit(&self, event: TransportEvent);
}

impl<F> TransportEventSink for F
where
    F: Fn(TransportEvent) + Send + Sync,
{
    fn emit(&self, event: TransportEvent) {
        self(event)
    }
}

/// A single bidirectional socket to one printer address.
///
/// Implementations start connecting as soon as they are constructed and report
/// `Opened` at most once, followed by at most one terminal event.
pub trait PrinterTransport: Send + Sync {
    /// True only while the underlying socket reports an open state
    fn is_sendable(&self) -> bool;

    /// Best-effort, non-blocking write of raw bytes
    fn send(&self, payload: &[u8]) -> Result<(), PrinterError>;

    /// Request closure; completion is reported through the event sink
    fn close(&self);
}

/// Constructs transports for printer addresses.
///
/// `open` may fail synchronously for a malformed address. It must not invoke
/// the sink before returning.
pub trait TransportFactory: Send + Sync {
    fn open(
        &self,
        address: &str,
        events: Arc<dyn TransportEventSink>,
    ) -> Result<Box<dyn PrinterTransport>, PrinterError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_connection_ids_are_unique() {
        let a = ConnectionId::next();
        let b = ConnectionId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();
        let sink: Arc<dyn TransportEventSink> =
            Arc::new(move |event: TransportEvent| captured.lock().unwrap().push(event));

        sink.emit(TransportEvent::Opened);
        assert_eq!(*seen.lock().unwrap(), vec![TransportEvent::Opened]);
    }
}
