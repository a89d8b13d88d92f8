//! Counting semaphore with RAII permits.
//!
//! Used for the binding-station pool and as the entry book's binary access
//! permit. Dropping a permit is the only release path, so a release without
//! a matching acquire cannot be written.

use std::sync::{Arc, Condvar, Mutex};

pub struct Semaphore {
    permits: Mutex<usize>,
    freed: Condvar,
}

impl Semaphore {
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Mutex::new(capacity),
            freed: Condvar::new(),
        }
    }

    /// Block until a permit is available and take it.
    pub fn acquire(&self) -> Permit<'_> {
        self.take_one();
        Permit { sem: self }
    }

    /// Like [`acquire`](Self::acquire), but the permit owns its semaphore
    /// handle and may be released from a different thread than acquired it.
    pub fn acquire_owned(self: Arc<Self>) -> OwnedPermit {
        self.take_one();
        OwnedPermit { sem: self }
    }

    /// Permits currently available. Racy by nature; for tests and logs.
    pub fn available(&self) -> usize {
        *self.permits.lock().expect("semaphore lock poisoned")
    }

    fn take_one(&self) {
        let permits = self.permits.lock().expect("semaphore lock poisoned");
        let mut permits = self
            .freed
            .wait_while(permits, |permits| *permits == 0)
            .expect("semaphore lock poisoned");
        *permits -= 1;
    }

    fn put_one(&self) {
        let mut permits = self.permits.lock().expect("semaphore lock poisoned");
        *permits += 1;
        self.freed.notify_one();
    }
}

/// A held permit; dropping it releases.
#[must_use = "dropping the permit immediately releases it"]
pub struct Permit<'a> {
    sem: &'a Semaphore,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.sem.put_one();
    }
}

/// A held permit detached from any borrow; dropping it releases.
#[must_use = "dropping the permit immediately releases it"]
pub struct OwnedPermit {
    sem: Arc<Semaphore>,
}

impl Drop for OwnedPermit {
    fn drop(&mut self) {
        self.sem.put_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn capacity_bounds_concurrent_holders() {
        let sem = Semaphore::new(2);
        let first = sem.acquire();
        let second = sem.acquire();
        assert_eq!(sem.available(), 0);

        drop(first);
        assert_eq!(sem.available(), 1);
        drop(second);
        assert_eq!(sem.available(), 2);
    }

    #[test]
    fn acquire_blocks_until_release() {
        let sem = Arc::new(Semaphore::new(1));
        let held = sem.clone().acquire_owned();

        let (tx, rx) = crossbeam::channel::bounded(1);
        let waiter = {
            let sem = sem.clone();
            std::thread::spawn(move || {
                let permit = sem.acquire();
                tx.send(()).expect("send");
                drop(permit);
            })
        };

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        drop(held);
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        waiter.join().expect("waiter join");
    }

    #[test]
    fn owned_permit_releases_from_another_thread() {
        let sem = Arc::new(Semaphore::new(1));
        let permit = sem.clone().acquire_owned();
        assert_eq!(sem.available(), 0);

        std::thread::spawn(move || drop(permit))
            .join()
            .expect("drop thread join");
        assert_eq!(sem.available(), 1);
    }
}
