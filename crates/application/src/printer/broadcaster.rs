use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use domain::StatusChanged;
use domain::printer::{PrinterId, PrinterStatus};

/// Immutable view of every printer's last known status
pub type StatusSnapshot = HashMap<PrinterId, PrinterStatus>;

/// Delivered to observers on every change
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub change: StatusChanged,
    /// Snapshot including this change. A new `Arc` is produced per update, so
    /// `Arc::ptr_eq` against a previously seen snapshot detects change.
    pub snapshot: Arc<StatusSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(&StatusUpdate) + Send + Sync>;

struct BroadcastState {
    snapshot: Arc<StatusSnapshot>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
    /// Recorded but not yet delivered, oldest first
    pending: VecDeque<StatusUpdate>,
    /// Some thread is draining `pending`
    delivering: bool,
}

/// Reactive `printer id -> status` mapping.
///
/// Updates are queued in the order they are recorded and delivered to every
/// observer in that order, one update at a time. Nothing is buffered past
/// delivery or coalesced. No lock is held while an observer runs, so callbacks
/// may read the snapshot, send to a printer or connect again. Updates produced
/// from inside a callback are delivered after the current one has reached
/// every observer.
pub struct StatusBroadcaster {
    state: Mutex<BroadcastState>,
}

impl StatusBroadcaster {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BroadcastState {
                snapshot: Arc::new(HashMap::new()),
                observers: Vec::new(),
                next_subscription: 1,
                pending: VecDeque::new(),
                delivering: false,
            }),
        }
    }

    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&StatusUpdate) + Send + Sync + 'static,
    {
        let mut state = self.lock();
        let id = SubscriptionId(state.next_subscription);
        state.next_subscription += 1;
        state.observers.push((id, Arc::new(observer)));
        id
    }

    /// Returns false if the subscription was already gone
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.lock();
        let before = state.observers.len();
        state.observers.retain(|(sub, _)| *sub != id);
        state.observers.len() != before
    }

    pub fn snapshot(&self) -> Arc<StatusSnapshot> {
        self.lock().snapshot.clone()
    }

    /// Last known status, `Unmanaged` for printers never seen
    pub fn status(&self, printer_id: &PrinterId) -> PrinterStatus {
        self.lock()
            .snapshot
            .get(printer_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Record a new status and deliver it. Returns false when the entry
    /// already held exactly this status.
    #[cfg(test)]
    pub(crate) fn publish(&self, printer_id: &PrinterId, status: PrinterStatus) -> bool {
        let changed = self.record(printer_id, status);
        self.flush();
        changed
    }

    /// Replace the snapshot and queue the update without notifying anyone.
    /// Safe to call while holding other locks; `flush` must follow once they
    /// are released.
    pub(crate) fn record(&self, printer_id: &PrinterId, status: PrinterStatus) -> bool {
        let mut state = self.lock();

        let previous = state.snapshot.get(printer_id).cloned();
        if previous.as_ref() == Some(&status) {
            return false;
        }

        let mut next = StatusSnapshot::clone(&state.snapshot);
        next.insert(printer_id.clone(), status.clone());
        state.snapshot = Arc::new(next);

        let update = StatusUpdate {
            change: StatusChanged::new(printer_id.clone(), previous.unwrap_or_default(), status),
            snapshot: state.snapshot.clone(),
        };
        state.pending.push_back(update);
        true
    }

    /// Deliver queued updates. If another call is already delivering, it
    /// picks up whatever was queued here and this returns immediately.
    pub(crate) fn flush(&self) {
        {
            let mut state = self.lock();
            if state.delivering || state.pending.is_empty() {
                return;
            }
            state.delivering = true;
        }

        let mut delivery = Delivery {
            broadcaster: self,
            active: true,
        };
        loop {
            let (update, observers) = {
                let mut state = self.lock();
                match state.pending.pop_front() {
                    Some(update) => (update, state.observers.clone()),
                    None => {
                        state.delivering = false;
                        delivery.active = false;
                        return;
                    }
                }
            };
            for (_, observer) in &observers {
                observer(&update);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, BroadcastState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases the delivering flag if an observer panics mid-delivery
struct Delivery<'a> {
    broadcaster: &'a StatusBroadcaster,
    active: bool,
}

impl Drop for Delivery<'_> {
    fn drop(&mut self) {
        if self.active {
            self.broadcaster.lock().delivering = false;
        }
    }
}

impl Default for StatusBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
