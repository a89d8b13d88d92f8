//! Timestamped event stream.
//!
//! Actors hand events to the [`EventBus`], which stamps and queues them
//! inside the clock's critical section — so the stream's stamps are
//! non-decreasing in emission order. A dedicated writer thread owns the
//! output sink, drains the channel until every sender is gone, and returns
//! the collected events for inspection.

use std::io::Write;
use std::sync::Arc;
use std::{fmt, thread};

use crossbeam::channel::{Receiver, Sender};
use serde::Serialize;

use super::clock::LogicalClock;
use super::ids::{GroupId, StaffId, StudentId};

/// One state transition, tagged with the actor that performed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    StudentArrived { student: StudentId },
    StudentFinishedPrinting { student: StudentId },
    GroupFinishedPrinting { group: GroupId },
    GroupFinishedBinding { group: GroupId },
    ReportSubmitted { group: GroupId },
    StaffStartedReading { staff: StaffId, submissions: u64 },
    StaffFinishedReading { staff: StaffId, submissions: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimEvent {
    pub at: u64,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EventKind::StudentArrived { student } => write!(
                f,
                "Student {student} has arrived at the print station at time {}",
                self.at
            ),
            EventKind::StudentFinishedPrinting { student } => {
                write!(f, "Student {student} has finished printing at time {}", self.at)
            }
            EventKind::GroupFinishedPrinting { group } => {
                write!(f, "Group {group} has finished printing at time {}", self.at)
            }
            EventKind::GroupFinishedBinding { group } => {
                write!(f, "Group {group} has finished binding at time {}", self.at)
            }
            EventKind::ReportSubmitted { group } => {
                write!(f, "Group {group} has submitted the report at time {}", self.at)
            }
            EventKind::StaffStartedReading { staff, submissions } => write!(
                f,
                "Staff {staff} has started reading the entry book at time {}. No. of submission = {submissions}",
                self.at
            ),
            EventKind::StaffFinishedReading { staff, submissions } => write!(
                f,
                "Staff {staff} has finished reading the entry book at time {}. No. of submission = {submissions}",
                self.at
            ),
        }
    }
}

/// How the writer thread renders events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFormat {
    #[default]
    Text,
    Json,
}

/// Cheap-to-clone handle shared by every actor.
#[derive(Clone)]
pub struct EventBus {
    clock: Arc<LogicalClock>,
    tx: Sender<SimEvent>,
}

impl EventBus {
    pub fn new(clock: Arc<LogicalClock>, tx: Sender<SimEvent>) -> Self {
        Self { clock, tx }
    }

    /// Advance the clock to `candidate`, stamp `kind` with the result, and
    /// queue it, all in one clock critical section. Returns the stamp.
    pub fn record(&self, candidate: u64, kind: EventKind) -> u64 {
        self.clock.advance_then(candidate, |at| {
            let _ = self.tx.send(SimEvent { at, kind });
            at
        })
    }

    /// Stamp `kind` with the current time without advancing.
    pub fn record_now(&self, kind: EventKind) -> u64 {
        self.clock.read_then(|at| {
            let _ = self.tx.send(SimEvent { at, kind });
            at
        })
    }
}

/// Spawn the writer thread. It exits once every [`EventBus`] clone is gone
/// and the channel drains, returning the full event log.
pub fn spawn_writer(
    rx: Receiver<SimEvent>,
    mut sink: Box<dyn Write + Send>,
    format: EventFormat,
) -> std::io::Result<thread::JoinHandle<Vec<SimEvent>>> {
    thread::Builder::new()
        .name("events".to_string())
        .spawn(move || {
            let mut log = Vec::new();
            for event in rx {
                match format {
                    EventFormat::Text => {
                        let _ = writeln!(sink, "{event}");
                    }
                    EventFormat::Json => match serde_json::to_string(&event) {
                        Ok(line) => {
                            let _ = writeln!(sink, "{line}");
                        }
                        Err(error) => tracing::warn!("event encode failed: {error}"),
                    },
                }
                log.push(event);
            }
            let _ = sink.flush();
            log
        })
}
