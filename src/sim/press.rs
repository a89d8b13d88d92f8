//! Printer conflict allocator.
//!
//! Students map onto 4 station classes (`id mod 4`); classes conflict in
//! opposite pairs ({0,2} and {1,3}). Each pair's slots live under one lane
//! lock, so a grant's check-and-set is atomic with respect to every state
//! it reads. Lock order is lane then grant slot, and nothing blocks while
//! holding either: a requester leaves the lane lock before parking on its
//! own sticky grant slot, and every release re-runs the grant check for
//! the lane's waiters (own group first, ascending, then the rest,
//! ascending; a locality policy, not a correctness requirement).

use std::sync::{Condvar, Mutex, MutexGuard};

use super::ids::{StudentId, opponent};

/// Per-student lifecycle within the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotArrived,
    Waiting,
    Printing,
    Printed,
}

pub struct PressAllocator {
    /// Lane 0 owns stations {0,2} (even ids), lane 1 owns {1,3} (odd ids).
    lanes: [Mutex<Lane>; 2],
    /// One sticky wake slot per student, indexed by `id - 1`. Created before
    /// any request can be issued, so a grant delivered between leaving the
    /// lane lock and parking is never missed.
    slots: Vec<GrantSlot>,
    group_size: u32,
    students: u32,
}

struct Lane {
    /// Lowest student id in this lane (2 for lane 0, 1 for lane 1).
    first_id: u32,
    phases: Vec<Phase>,
}

impl Lane {
    fn index_of(id: StudentId) -> usize {
        ((id.0 - 1) / 2) as usize
    }

    fn id_at(&self, index: usize) -> StudentId {
        StudentId(self.first_id + 2 * index as u32)
    }

    fn parity(&self) -> u32 {
        self.first_id % 2
    }

    fn phase(&self, id: StudentId) -> Phase {
        self.phases[Self::index_of(id)]
    }

    fn set(&mut self, id: StudentId, phase: Phase) {
        self.phases[Self::index_of(id)] = phase;
    }
}

impl PressAllocator {
    pub fn new(students: u32, group_size: u32) -> Self {
        let even = Lane {
            first_id: 2,
            phases: vec![Phase::NotArrived; (students / 2) as usize],
        };
        let odd = Lane {
            first_id: 1,
            phases: vec![Phase::NotArrived; (students.div_ceil(2)) as usize],
        };
        Self {
            lanes: [Mutex::new(even), Mutex::new(odd)],
            slots: (0..students).map(|_| GrantSlot::new()).collect(),
            group_size,
            students,
        }
    }

    /// Mark the student waiting, grant immediately if its conflict class is
    /// free, then park until the grant arrives.
    pub fn request(&self, id: StudentId) -> PressGrant<'_> {
        {
            let mut lane = self.lane(id);
            lane.set(id, Phase::Waiting);
            self.try_grant(&mut lane, id);
        }
        self.slot(id).consume();
        PressGrant { press: self, id }
    }

    /// Grant `id` iff it is waiting and nobody in the conflicting class is
    /// printing. Runs under the lane lock; delivery is O(1).
    fn try_grant(&self, lane: &mut Lane, id: StudentId) {
        if lane.phase(id) != Phase::Waiting {
            return;
        }
        let rival = opponent(id.station());
        let blocked = lane
            .phases
            .iter()
            .enumerate()
            .any(|(index, phase)| *phase == Phase::Printing && lane.id_at(index).station() == rival);
        if blocked {
            return;
        }
        lane.set(id, Phase::Printing);
        self.slot(id).deliver();
    }

    fn release(&self, id: StudentId) {
        let mut lane = self.lane(id);
        lane.set(id, Phase::Printed);

        // The conflicting class may now be free: re-check the lane's
        // waiters. The other lane's grant predicate reads none of the state
        // this release touched.
        let members = id.group(self.group_size).members(self.group_size);
        let (lo, hi) = (*members.start(), *members.end());
        let parity = lane.parity();
        for other in (lo..=hi).chain(1..lo).chain(hi + 1..=self.students) {
            if other % 2 == parity {
                self.try_grant(&mut lane, StudentId(other));
            }
        }
    }

    /// Current phase of one student. Racy by nature; for tests and logs.
    pub fn phase(&self, id: StudentId) -> Phase {
        self.lane(id).phase(id)
    }

    /// True once every student has printed and released.
    pub fn all_printed(&self) -> bool {
        self.lanes.iter().all(|lane| {
            lane.lock()
                .expect("lane lock poisoned")
                .phases
                .iter()
                .all(|phase| *phase == Phase::Printed)
        })
    }

    fn lane(&self, id: StudentId) -> MutexGuard<'_, Lane> {
        self.lanes[(id.0 % 2) as usize]
            .lock()
            .expect("lane lock poisoned")
    }

    fn slot(&self, id: StudentId) -> &GrantSlot {
        &self.slots[(id.0 - 1) as usize]
    }
}

/// A granted printing station; dropping it releases and cascades.
#[must_use = "dropping the grant releases the station"]
pub struct PressGrant<'a> {
    press: &'a PressAllocator,
    id: StudentId,
}

impl PressGrant<'_> {
    pub fn id(&self) -> StudentId {
        self.id
    }
}

impl Drop for PressGrant<'_> {
    fn drop(&mut self) {
        self.press.release(self.id);
    }
}

/// One-shot sticky wake signal: delivery before the wait still wakes the
/// waiter.
struct GrantSlot {
    granted: Mutex<bool>,
    wake: Condvar,
}

impl GrantSlot {
    fn new() -> Self {
        Self {
            granted: Mutex::new(false),
            wake: Condvar::new(),
        }
    }

    fn deliver(&self) {
        let mut granted = self.granted.lock().expect("grant slot lock poisoned");
        *granted = true;
        self.wake.notify_one();
    }

    fn consume(&self) {
        let granted = self.granted.lock().expect("grant slot lock poisoned");
        let mut granted = self
            .wake
            .wait_while(granted, |granted| !*granted)
            .expect("grant slot lock poisoned");
        *granted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn request_grants_immediately_without_conflict() {
        let press = PressAllocator::new(4, 2);
        assert_eq!(press.phase(StudentId(1)), Phase::NotArrived);

        let grant = press.request(StudentId(1));
        assert_eq!(press.phase(StudentId(1)), Phase::Printing);

        drop(grant);
        assert_eq!(press.phase(StudentId(1)), Phase::Printed);
    }

    #[test]
    fn same_class_students_print_concurrently() {
        // Students 1 and 5 both sit at station 1; only station 3 conflicts.
        let press = PressAllocator::new(8, 4);
        let first = press.request(StudentId(1));
        let second = press.request(StudentId(5));
        assert_eq!(press.phase(StudentId(1)), Phase::Printing);
        assert_eq!(press.phase(StudentId(5)), Phase::Printing);
        drop(first);
        drop(second);
    }

    #[test]
    fn opposite_lanes_do_not_interact() {
        let press = PressAllocator::new(8, 4);
        let odd = press.request(StudentId(1));
        let even = press.request(StudentId(2));
        let even_same_class = press.request(StudentId(6));
        assert_eq!(press.phase(StudentId(2)), Phase::Printing);
        assert_eq!(press.phase(StudentId(6)), Phase::Printing);
        drop(odd);
        drop(even);
        drop(even_same_class);
        assert!(!press.all_printed());
    }

    #[test]
    fn conflicting_request_waits_for_release() {
        let press = Arc::new(PressAllocator::new(4, 2));
        let holder = press.request(StudentId(1));

        let (tx, rx) = crossbeam::channel::bounded(1);
        let waiter = {
            let press = press.clone();
            std::thread::spawn(move || {
                // Station 3 conflicts with station 1.
                let grant = press.request(StudentId(3));
                tx.send(()).expect("send");
                drop(grant);
            })
        };

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        assert_eq!(press.phase(StudentId(3)), Phase::Waiting);

        drop(holder);
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        waiter.join().expect("waiter join");
        assert_eq!(press.phase(StudentId(3)), Phase::Printed);
    }

    #[test]
    fn release_cascades_to_every_unblocked_waiter() {
        let press = Arc::new(PressAllocator::new(8, 4));
        let holder = press.request(StudentId(1));

        let (tx, rx) = crossbeam::channel::unbounded();
        let waiters: Vec<_> = [3u32, 7]
            .into_iter()
            .map(|id| {
                let press = press.clone();
                let tx = tx.clone();
                std::thread::spawn(move || {
                    let grant = press.request(StudentId(id));
                    tx.send(id).expect("send");
                    drop(grant);
                })
            })
            .collect();

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        drop(holder);
        let mut granted = vec![
            rx.recv_timeout(Duration::from_secs(5)).expect("first grant"),
            rx.recv_timeout(Duration::from_secs(5)).expect("second grant"),
        ];
        granted.sort_unstable();
        assert_eq!(granted, vec![3, 7]);
        for waiter in waiters {
            waiter.join().expect("waiter join");
        }
    }

    #[test]
    fn all_printed_after_every_release() {
        let press = PressAllocator::new(4, 2);
        for id in 1..=4 {
            let grant = press.request(StudentId(id));
            drop(grant);
        }
        assert!(press.all_printed());
    }
}
