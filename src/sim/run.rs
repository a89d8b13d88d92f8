//! Scenario orchestration: wires the world together, spawns one thread
//! per actor, and tears everything down in dependency order.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::Result;
use crate::config::{Scenario, Tuning};
use crate::error::Error;

use super::actors::{self, LeaderCtx, StaffCtx, StudentCtx};
use super::clock::LogicalClock;
use super::delay::{DelaySource, Pacing, PoissonDelays};
use super::entry_book::EntryBook;
use super::events::{EventBus, EventFormat, SimEvent, spawn_writer};
use super::gate::CompletionGate;
use super::ids::{GroupId, StaffId, StudentId};
use super::press::PressAllocator;
use super::semaphore::Semaphore;

/// Everything a single run needs to know.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub scenario: Scenario,
    pub tuning: Tuning,
    pub format: EventFormat,
}

/// What a finished run produced.
#[derive(Debug)]
pub struct RunReport {
    /// Every event, in the order it was emitted.
    pub events: Vec<SimEvent>,
    /// Final submission count in the entry book.
    pub submissions: u64,
}

/// Runs one full scenario, streaming events to `sink` as they happen.
///
/// Validates the scenario and tuning before spawning anything, so a bad
/// configuration fails fast with no side effects. Students and leaders
/// run to completion; staff are told to stop once all reports are in.
pub fn run(options: &RunOptions, sink: Box<dyn Write + Send>) -> Result<RunReport> {
    options.scenario.validate()?;
    options.tuning.validate()?;

    let scenario = options.scenario;
    let tuning = options.tuning.clone();

    let clock = Arc::new(LogicalClock::new());
    let (tx, rx) = crossbeam::channel::unbounded();
    let bus = EventBus::new(clock.clone(), tx);
    let writer = spawn_writer(rx, sink, options.format)?;

    let press = Arc::new(PressAllocator::new(scenario.students, scenario.group_size));
    let gates: Vec<Arc<CompletionGate>> = (0..scenario.groups())
        .map(|_| Arc::new(CompletionGate::new(scenario.group_size)))
        .collect();
    let pool = Arc::new(Semaphore::new(tuning.bind_stations));
    let book = Arc::new(EntryBook::new());
    let delays: Arc<dyn DelaySource> = match tuning.seed {
        Some(seed) => Arc::new(PoissonDelays::seeded(tuning.delay_mean, seed)),
        None => Arc::new(PoissonDelays::new(tuning.delay_mean)),
    };
    let pace = Pacing::new(Duration::from_millis(tuning.time_unit_ms));
    let shutdown = Arc::new(AtomicBool::new(false));

    tracing::info!(
        students = scenario.students,
        groups = scenario.groups(),
        staff = tuning.staff,
        bind_stations = tuning.bind_stations,
        "scenario starting"
    );

    let mut students = Vec::with_capacity(scenario.students as usize);
    for n in 1..=scenario.students {
        let id = StudentId(n);
        let ctx = StudentCtx {
            id,
            print_units: scenario.print_units,
            clock: clock.clone(),
            bus: bus.clone(),
            delays: delays.clone(),
            pace,
            press: press.clone(),
            gate: gates[(id.group(scenario.group_size).0 - 1) as usize].clone(),
        };
        students.push(spawn_worker(format!("student-{n}"), move || {
            actors::student(ctx)
        })?);
    }

    let mut leaders = Vec::with_capacity(scenario.groups() as usize);
    for g in 1..=scenario.groups() {
        let ctx = LeaderCtx {
            group: GroupId(g),
            bind_units: scenario.bind_units,
            entry_units: scenario.entry_units,
            clock: clock.clone(),
            bus: bus.clone(),
            pace,
            gate: gates[(g - 1) as usize].clone(),
            pool: pool.clone(),
            book: book.clone(),
        };
        leaders.push(spawn_worker(format!("leader-{g}"), move || {
            actors::leader(ctx)
        })?);
    }

    let mut staff = Vec::with_capacity(tuning.staff as usize);
    for s in 1..=tuning.staff {
        let ctx = StaffCtx {
            id: StaffId(s),
            entry_units: scenario.entry_units,
            clock: clock.clone(),
            bus: bus.clone(),
            delays: delays.clone(),
            pace,
            book: book.clone(),
            shutdown: shutdown.clone(),
        };
        staff.push(spawn_worker(format!("staff-{s}"), move || actors::staff(ctx))?);
    }

    if let Err(err) = join_all(students) {
        shutdown.store(true, Ordering::Relaxed);
        return Err(err);
    }
    if let Err(err) = join_all(leaders) {
        shutdown.store(true, Ordering::Relaxed);
        return Err(err);
    }

    // All reports are in; staff notice at their next loop boundary.
    shutdown.store(true, Ordering::Relaxed);
    join_all(staff)?;

    // Dropping the last sender disconnects the channel and the writer
    // thread drains whatever is left before returning the log.
    drop(bus);
    let events = writer.join().map_err(|_| Error::WorkerPanicked {
        name: "events".into(),
    })?;

    let submissions = book.submissions();
    tracing::info!(submissions, events = events.len(), "scenario complete");
    Ok(RunReport {
        events,
        submissions,
    })
}

fn spawn_worker(
    name: String,
    work: impl FnOnce() + Send + 'static,
) -> Result<JoinHandle<()>> {
    Ok(thread::Builder::new().name(name).spawn(work)?)
}

fn join_all(handles: Vec<JoinHandle<()>>) -> Result<()> {
    let mut panicked = None;
    for handle in handles {
        let name = handle.thread().name().unwrap_or("worker").to_string();
        if handle.join().is_err() && panicked.is_none() {
            panicked = Some(name);
        }
    }
    match panicked {
        Some(name) => Err(Error::WorkerPanicked { name }),
        None => Ok(()),
    }
}
