use std::sync::atomic::{AtomicU8, Ordering};

const CONNECTING: u8 = 0;
const OPEN: u8 = 1;
const CLOSING: u8 = 2;
const CLOSED: u8 = 3;

/// Socket ready state shared between a transport handle and its I/O task
#[derive(Debug)]
pub(crate) struct ReadyState(AtomicU8);

impl ReadyState {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(CONNECTING))
    }

    pub(crate) fn is_open(&self) -> bool {
        self.0.load(Ordering::Acquire) == OPEN
    }

    pub(crate) fn mark_open(&self) {
        // A close requested during the handshake wins
        let _ = self
            .0
            .compare_exchange(CONNECTING, OPEN, Ordering::AcqRel, Ordering::Acquire);
    }

    pub(crate) fn begin_closing(&self) {
        let _ = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current != CLOSED).then_some(CLOSING)
            });
    }

    pub(crate) fn mark_closed(&self) {
        self.0.store(CLOSED, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_then_close() {
        let state = ReadyState::new();
        assert!(!state.is_open());
        state.mark_open();
        assert!(state.is_open());
        state.begin_closing();
        assert!(!state.is_open());
        state.mark_closed();
        assert!(!state.is_open());
    }

    #[test]
    fn test_close_during_handshake_is_not_reopened() {
        let state = ReadyState::new();
        state.begin_closing();
        state.mark_open();
        assert!(!state.is_open());
    }

    #[test]
    fn test_closed_stays_closed() {
        let state = ReadyState::new();
        state.mark_closed();
        state.begin_closing();
        assert_eq!(state.0.load(Ordering::Acquire), CLOSED);
    }
}
