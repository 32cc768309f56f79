use std::sync::{Arc, Weak};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use domain::printer::{
    ConnectionId, ConnectionPolicy, ConnectionStatus, PrinterDescriptor, PrinterId,
    PrinterStatus, PrinterTransport, TransportEvent, TransportEventSink, TransportFactory,
};
use tracing::{debug, info, warn};

use super::broadcaster::{StatusBroadcaster, StatusSnapshot};

/// The transport currently registered for one printer
struct LiveConnection {
    connection_id: ConnectionId,
    status: ConnectionStatus,
    /// Set once `disconnect` asked the transport to close
    closing: bool,
    transport: Arc<dyn PrinterTransport>,
}

impl LiveConnection {
    fn blocks_connect(&self) -> bool {
        self.status.is_active() && !self.closing
    }
}

struct RegistryInner {
    live: DashMap<PrinterId, LiveConnection>,
    factory: Arc<dyn TransportFactory>,
    policy: Arc<dyn ConnectionPolicy>,
    broadcaster: Arc<StatusBroadcaster>,
}

/// Owns the live printer connections, at most one per printer id.
///
/// All mutation for a printer id happens under that id's map entry, and status
/// updates are queued on the broadcaster before the entry is released, so
/// transitions for one printer reach observers in the order they happened.
/// Observers are only notified after the entry is released and may call back
/// into the registry. Nothing here returns an error: failures end up as an
/// `Error` status entry or a `false` from `send`.
///
/// There is no connect timeout unless the transport applies one, so a printer
/// that never answers can stay `Connecting`. Retrying after `Error` is left to
/// the caller.
pub struct PrinterRegistry {
    inner: Arc<RegistryInner>,
}

impl PrinterRegistry {
    pub fn new(factory: Arc<dyn TransportFactory>, policy: Arc<dyn ConnectionPolicy>) -> Self {
        Self::with_broadcaster(factory, policy, Arc::new(StatusBroadcaster::new()))
    }

    pub fn with_broadcaster(
        factory: Arc<dyn TransportFactory>,
        policy: Arc<dyn ConnectionPolicy>,
        broadcaster: Arc<StatusBroadcaster>,
    ) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                live: DashMap::new(),
                factory,
                policy,
                broadcaster,
            }),
        }
    }

    pub fn broadcaster(&self) -> &Arc<StatusBroadcaster> {
        &self.inner.broadcaster
    }

    pub fn status(&self, printer_id: &PrinterId) -> PrinterStatus {
        self.inner.broadcaster.status(printer_id)
    }

    pub fn snapshot(&self) -> Arc<StatusSnapshot> {
        self.inner.broadcaster.snapshot()
    }

    pub fn is_live(&self, printer_id: &PrinterId) -> bool {
        self.inner.live.contains_key(printer_id)
    }

    pub fn live_count(&self) -> usize {
        self.inner.live.len()
    }

    /// Start connecting to a network printer. Returns immediately; progress is
    /// reported through the broadcaster.
    pub fn connect(&self, descriptor: &PrinterDescriptor) {
        self.begin_connect(descriptor);
        self.inner.broadcaster.flush();
    }

    fn begin_connect(&self, descriptor: &PrinterDescriptor) {
        let printer_id = &descriptor.id;
        if !descriptor.is_connectable() {
            debug!(
                printer_id = %printer_id,
                kind = descriptor.transport_kind.as_str(),
                "Printer has no network address, ignoring connect"
            );
            return;
        }

        let entry = self.inner.live.entry(printer_id.clone());
        if let Entry::Occupied(existing) = &entry {
            if existing.get().blocks_connect() {
                debug!(
                    printer_id = %printer_id,
                    status = %existing.get().status,
                    "Connection already active, ignoring connect"
                );
                return;
            }
        }

        if let Err(e) = self.inner.policy.check(descriptor) {
            self.inner
                .broadcaster
                .record(printer_id, PrinterStatus::error(e.status_message()));
            if let Entry::Occupied(superseded) = entry {
                superseded.remove();
            }
            return;
        }

        let connection_id = ConnectionId::next();
        self.inner
            .broadcaster
            .record(printer_id, PrinterStatus::connecting());

        let sink = Arc::new(LifecycleSink {
            registry: Arc::downgrade(&self.inner),
            printer_id: printer_id.clone(),
            connection_id,
        });

        match self.inner.factory.open(&descriptor.address, sink) {
            Ok(transport) => {
                info!(
                    printer_id = %printer_id,
                    %connection_id,
                    address = %descriptor.address,
                    "Connecting to printer"
                );
                let live = LiveConnection {
                    connection_id,
                    status: ConnectionStatus::Connecting,
                    closing: false,
                    transport: Arc::from(transport),
                };
                match entry {
                    Entry::Occupied(mut superseded) => {
                        let old = superseded.insert(live);
                        debug!(
                            printer_id = %printer_id,
                            superseded = %old.connection_id,
                            "Replaced closing connection"
                        );
                    }
                    Entry::Vacant(vacant) => {
                        vacant.insert(live);
                    }
                }
            }
            Err(e) => {
                warn!(printer_id = %printer_id, error = %e, "Could not create printer transport");
                self.inner
                    .broadcaster
                    .record(printer_id, PrinterStatus::error(e.status_message()));
                if let Entry::Occupied(superseded) = entry {
                    superseded.remove();
                }
            }
        }
    }

    /// Ask the live connection to close. The `Disconnected` status is recorded
    /// when the transport confirms the close, not here.
    pub fn disconnect(&self, printer_id: &PrinterId) {
        let transport = match self.inner.live.get_mut(printer_id) {
            Some(mut live) => {
                live.closing = true;
                live.transport.clone()
            }
            None => {
                debug!(printer_id = %printer_id, "No live connection to disconnect");
                return;
            }
        };

        info!(printer_id = %printer_id, "Closing printer connection");
        transport.close();
    }

    pub fn disconnect_all(&self) {
        let ids: Vec<PrinterId> = self
            .inner
            .live
            .iter()
            .map(|live| live.key().clone())
            .collect();
        for printer_id in &ids {
            self.disconnect(printer_id);
        }
    }

    /// Write `payload` unmodified to the printer's socket. Returns false, and
    /// logs a warning, when there is no open connection to take it.
    pub fn send(&self, printer_id: &PrinterId, payload: impl AsRef<[u8]>) -> bool {
        let payload = payload.as_ref();
        let transport = self
            .inner
            .live
            .get(printer_id)
            .map(|live| live.transport.clone());

        let Some(transport) = transport else {
            warn!(printer_id = %printer_id, "Printer not connected, cannot send");
            return false;
        };
        if !transport.is_sendable() {
            warn!(printer_id = %printer_id, "Printer connection is not open, cannot send");
            return false;
        }

        match transport.send(payload) {
            Ok(()) => {
                debug!(printer_id = %printer_id, bytes = payload.len(), "Payload handed to printer");
                true
            }
            Err(e) => {
                warn!(printer_id = %printer_id, error = %e, "Failed to send to printer");
                false
            }
        }
    }
}

impl RegistryInner {
    fn on_transport_event(
        &self,
        printer_id: &PrinterId,
        connection_id: ConnectionId,
        event: TransportEvent,
    ) {
        self.apply_transport_event(printer_id, connection_id, event);
        self.broadcaster.flush();
    }

    fn apply_transport_event(
        &self,
        printer_id: &PrinterId,
        connection_id: ConnectionId,
        event: TransportEvent,
    ) {
        match self.live.entry(printer_id.clone()) {
            Entry::Occupied(mut entry) if entry.get().connection_id == connection_id => match event
            {
                TransportEvent::Opened => {
                    info!(printer_id = %printer_id, %connection_id, "Printer connected");
                    entry.get_mut().status = ConnectionStatus::Connected;
                    self.broadcaster
                        .record(printer_id, PrinterStatus::connected());
                }
                TransportEvent::Closed(reason) => {
                    info!(printer_id = %printer_id, %connection_id, %reason, "Printer disconnected");
                    self.broadcaster
                        .record(printer_id, PrinterStatus::disconnected());
                    entry.remove();
                }
                TransportEvent::Errored(message) => {
                    warn!(printer_id = %printer_id, %connection_id, %message, "Printer connection error");
                    self.broadcaster
                        .record(printer_id, PrinterStatus::error(message));
                    entry.remove();
                }
            },
            _ => {
                debug!(
                    printer_id = %printer_id,
                    %connection_id,
                    ?event,
                    "Ignoring event from superseded connection"
                );
            }
        }
    }
}

/// Routes one transport's events back to the registry, tagged with the
/// connection they belong to
struct LifecycleSink {
    registry: Weak<RegistryInner>,
    printer_id: PrinterId,
    connection_id: ConnectionId,
}

impl TransportEventSink for LifecycleSink {
    fn emit(&self, event: TransportEvent) {
        match self.registry.upgrade() {
            Some(registry) => registry.on_transport_event(&self.printer_id, self.connection_id, event),
            None => debug!(
                printer_id = %self.printer_id,
                connection_id = %self.connection_id,
                "Registry dropped, ignoring transport event"
            ),
        }
    }
}
