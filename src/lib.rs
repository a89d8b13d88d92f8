#![forbid(unsafe_code)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod sim;
pub mod telemetry;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

// Re-export core types at crate root for convenience
pub use crate::config::{MAX_STUDENTS, Scenario, Tuning};
pub use crate::sim::{
    CompletionGate, EntryBook, EventBus, EventFormat, EventKind, GroupId, LogicalClock, Phase,
    PressAllocator, RunOptions, RunReport, Semaphore, SimEvent, StaffId, StudentId, run,
};
