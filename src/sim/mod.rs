//! Simulation core: logical clock, synchronization primitives, the press
//! allocator, the entry book, and the orchestration that runs a scenario.

mod actors;
pub mod clock;
pub mod delay;
pub mod entry_book;
pub mod events;
pub mod gate;
pub mod ids;
pub mod press;
pub mod run;
pub mod semaphore;

pub use clock::LogicalClock;
pub use delay::{DelaySource, FixedDelays, Pacing, PoissonDelays};
pub use entry_book::{EntryBook, ReadSession, WriteSession};
pub use events::{EventBus, EventFormat, EventKind, SimEvent, spawn_writer};
pub use gate::CompletionGate;
pub use ids::{GroupId, STATIONS, StaffId, StudentId, conflicts, opponent};
pub use press::{Phase, PressAllocator, PressGrant};
pub use run::{RunOptions, RunReport, run};
pub use semaphore::{OwnedPermit, Permit, Semaphore};
