//! Actor lifecycles: students print, leaders bind and submit, staff read.
//!
//! Every delay runs outside any lock; the event that follows it advances
//! the clock by the working time plus the delay. Working time is re-read
//! after each blocking acquisition so durations count from the moment the
//! resource was actually obtained.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::clock::LogicalClock;
use super::delay::{DelaySource, Pacing};
use super::entry_book::EntryBook;
use super::events::{EventBus, EventKind};
use super::gate::CompletionGate;
use super::ids::{GroupId, StaffId, StudentId};
use super::press::PressAllocator;
use super::semaphore::Semaphore;

pub(crate) struct StudentCtx {
    pub id: StudentId,
    pub print_units: u64,
    pub clock: Arc<LogicalClock>,
    pub bus: EventBus,
    pub delays: Arc<dyn DelaySource>,
    pub pace: Pacing,
    pub press: Arc<PressAllocator>,
    pub gate: Arc<CompletionGate>,
}

pub(crate) fn student(ctx: StudentCtx) {
    let local = ctx.clock.now();
    let arrival = ctx.delays.next_delay();
    ctx.pace.sleep(arrival);
    let at = ctx.bus.record(
        local + arrival,
        EventKind::StudentArrived { student: ctx.id },
    );
    tracing::debug!(student = ctx.id.0, at, "arrived");

    let grant = ctx.press.request(ctx.id);
    let local = ctx.clock.now();
    ctx.pace.sleep(ctx.print_units);
    let at = ctx.bus.record(
        local + ctx.print_units,
        EventKind::StudentFinishedPrinting { student: ctx.id },
    );
    tracing::debug!(student = ctx.id.0, at, "finished printing");

    drop(grant);
    ctx.gate.signal();
}

pub(crate) struct LeaderCtx {
    pub group: GroupId,
    pub bind_units: u64,
    pub entry_units: u64,
    pub clock: Arc<LogicalClock>,
    pub bus: EventBus,
    pub pace: Pacing,
    pub gate: Arc<CompletionGate>,
    pub pool: Arc<Semaphore>,
    pub book: Arc<EntryBook>,
}

pub(crate) fn leader(ctx: LeaderCtx) {
    ctx.gate.await_all();
    // The last member's advance already covers this instant.
    let at = ctx
        .bus
        .record_now(EventKind::GroupFinishedPrinting { group: ctx.group });
    tracing::debug!(group = ctx.group.0, at, "group finished printing");

    let permit = ctx.pool.acquire();
    let local = ctx.clock.now();
    ctx.pace.sleep(ctx.bind_units);
    ctx.bus.record(
        local + ctx.bind_units,
        EventKind::GroupFinishedBinding { group: ctx.group },
    );
    drop(permit);

    let session = ctx.book.begin_write();
    let local = ctx.clock.now();
    ctx.pace.sleep(ctx.entry_units);
    session.submit(|total| {
        let at = ctx.bus.record(
            local + ctx.entry_units,
            EventKind::ReportSubmitted { group: ctx.group },
        );
        tracing::debug!(group = ctx.group.0, at, total, "report submitted");
    });
}

pub(crate) struct StaffCtx {
    pub id: StaffId,
    pub entry_units: u64,
    pub clock: Arc<LogicalClock>,
    pub bus: EventBus,
    pub delays: Arc<dyn DelaySource>,
    pub pace: Pacing,
    pub book: Arc<EntryBook>,
    pub shutdown: Arc<AtomicBool>,
}

pub(crate) fn staff(ctx: StaffCtx) {
    loop {
        // Shutdown only takes effect here, never inside a read.
        if ctx.shutdown.load(Ordering::Relaxed) {
            break;
        }

        let local = ctx.clock.now();
        let interval = ctx.delays.next_delay();
        ctx.pace.sleep(interval);

        let session = ctx.book.begin_read();
        ctx.bus.record(
            local + interval,
            EventKind::StaffStartedReading {
                staff: ctx.id,
                submissions: session.submissions(),
            },
        );

        let local = ctx.clock.now();
        ctx.pace.sleep(ctx.entry_units);
        ctx.bus.record(
            local + ctx.entry_units,
            EventKind::StaffFinishedReading {
                staff: ctx.id,
                submissions: session.submissions(),
            },
        );
        drop(session);
    }
    tracing::debug!(staff = ctx.id.0, "staff retired");
}
