//! Per-group completion barrier.
//!
//! Counts `signal()` calls and releases `await_all()` once the count reaches
//! the group size. Signals arriving before the waiter are accumulated, not
//! lost. Single-use: one drain per instance.

use std::sync::{Condvar, Mutex};

pub struct CompletionGate {
    expected: u32,
    seen: Mutex<u32>,
    complete: Condvar,
}

impl CompletionGate {
    pub fn new(expected: u32) -> Self {
        Self {
            expected,
            seen: Mutex::new(0),
            complete: Condvar::new(),
        }
    }

    /// Record one member's completion. Each member calls this exactly once.
    pub fn signal(&self) {
        let mut seen = self.seen.lock().expect("barrier lock poisoned");
        *seen += 1;
        if *seen >= self.expected {
            self.complete.notify_all();
        }
    }

    /// Block until every member has signalled.
    pub fn await_all(&self) {
        let seen = self.seen.lock().expect("barrier lock poisoned");
        let _seen = self
            .complete
            .wait_while(seen, |seen| *seen < self.expected)
            .expect("barrier lock poisoned");
    }

    /// Signals observed so far. For tests and logs.
    pub fn observed(&self) -> u32 {
        *self.seen.lock().expect("barrier lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn early_signals_are_not_lost() {
        let gate = CompletionGate::new(3);
        gate.signal();
        gate.signal();
        gate.signal();
        // All signals landed before the waiter; this must not block.
        gate.await_all();
        assert_eq!(gate.observed(), 3);
    }

    #[test]
    fn waiter_blocks_until_the_last_signal() {
        let gate = Arc::new(CompletionGate::new(2));
        let (tx, rx) = crossbeam::channel::bounded(1);

        let waiter = {
            let gate = gate.clone();
            std::thread::spawn(move || {
                gate.await_all();
                tx.send(()).expect("send");
            })
        };

        gate.signal();
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        gate.signal();
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        waiter.join().expect("waiter join");
    }
}
