//! The shared entry book: a first-readers-writers log.
//!
//! Leaders write (one submission each); staff read forever. One binary
//! access permit gives a writer, or the whole reader group, exclusive
//! access. The first reader takes the permit on the group's behalf before
//! giving up the reader-count lock; the last reader out returns it —
//! usually from a different thread, so custody lives next to the count.
//! Classical first-readers-writers: overlapping readers can starve a
//! writer; that limitation is part of the protocol, not a bug.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::semaphore::{OwnedPermit, Permit, Semaphore};

pub struct EntryBook {
    access: Arc<Semaphore>,
    readers: Mutex<ReaderGate>,
    submissions: AtomicU64,
}

struct ReaderGate {
    active: usize,
    custody: Option<OwnedPermit>,
}

impl EntryBook {
    pub fn new() -> Self {
        Self {
            access: Arc::new(Semaphore::new(1)),
            readers: Mutex::new(ReaderGate {
                active: 0,
                custody: None,
            }),
            submissions: AtomicU64::new(0),
        }
    }

    /// Join the reader group. The first reader blocks here until the book
    /// is free of writers; later readers queue on the reader-count lock
    /// behind it. The writer never takes that lock, so there is no cycle.
    pub fn begin_read(&self) -> ReadSession<'_> {
        let mut gate = self.readers.lock().expect("reader gate lock poisoned");
        gate.active += 1;
        if gate.active == 1 {
            gate.custody = Some(self.access.clone().acquire_owned());
        }
        drop(gate);
        ReadSession { book: self }
    }

    /// Take exclusive access for one submission.
    pub fn begin_write(&self) -> WriteSession<'_> {
        WriteSession {
            book: self,
            _access: self.access.acquire(),
        }
    }

    /// Total submissions recorded so far.
    pub fn submissions(&self) -> u64 {
        self.submissions.load(Ordering::SeqCst)
    }
}

impl Default for EntryBook {
    fn default() -> Self {
        Self::new()
    }
}

/// Membership in the active reader group; dropping it leaves the group and,
/// for the last reader, returns the access permit.
#[must_use = "dropping the session leaves the reader group"]
pub struct ReadSession<'a> {
    book: &'a EntryBook,
}

impl ReadSession<'_> {
    /// The submission count; stable for this session's whole lifetime since
    /// writers are excluded while any reader is active.
    pub fn submissions(&self) -> u64 {
        self.book.submissions()
    }
}

impl Drop for ReadSession<'_> {
    fn drop(&mut self) {
        let mut gate = self.book.readers.lock().expect("reader gate lock poisoned");
        gate.active -= 1;
        if gate.active == 0 {
            gate.custody = None;
        }
    }
}

/// Exclusive write access; ends when [`submit`](Self::submit) consumes it.
#[must_use = "dropping the session releases the book without submitting"]
pub struct WriteSession<'a> {
    book: &'a EntryBook,
    _access: Permit<'a>,
}

impl WriteSession<'_> {
    /// Record the submission and hand the new total to `f` while exclusive
    /// access still holds, then release.
    pub fn submit(self, f: impl FnOnce(u64)) {
        let total = self.book.submissions.fetch_add(1, Ordering::SeqCst) + 1;
        f(total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn readers_overlap_freely() {
        let book = EntryBook::new();
        let first = book.begin_read();
        let second = book.begin_read();
        assert_eq!(first.submissions(), 0);
        assert_eq!(second.submissions(), 0);
        drop(first);
        drop(second);

        // The reader group released the permit; a writer can get in.
        book.begin_write().submit(|total| assert_eq!(total, 1));
        assert_eq!(book.submissions(), 1);
    }

    #[test]
    fn writer_waits_for_the_last_reader() {
        let book = Arc::new(EntryBook::new());
        let reader = book.begin_read();

        let (tx, rx) = crossbeam::channel::bounded(1);
        let writer = {
            let book = book.clone();
            std::thread::spawn(move || {
                book.begin_write().submit(|_| ());
                tx.send(()).expect("send");
            })
        };

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        drop(reader);
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        writer.join().expect("writer join");
        assert_eq!(book.submissions(), 1);
    }

    #[test]
    fn reader_waits_for_an_active_writer() {
        let book = Arc::new(EntryBook::new());
        let session = book.begin_write();

        let (tx, rx) = crossbeam::channel::bounded(1);
        let reader = {
            let book = book.clone();
            std::thread::spawn(move || {
                let read = book.begin_read();
                tx.send(read.submissions()).expect("send");
            })
        };

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        session.submit(|_| ());
        let seen = rx.recv_timeout(Duration::from_secs(5)).expect("read after write");
        assert_eq!(seen, 1);
        reader.join().expect("reader join");
    }

    #[test]
    fn submissions_accumulate_across_writers() {
        let book = EntryBook::new();
        book.begin_write().submit(|total| assert_eq!(total, 1));
        book.begin_write().submit(|total| assert_eq!(total, 2));
        assert_eq!(book.submissions(), 2);
    }
}
