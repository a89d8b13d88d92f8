//! Model: reader-preferring entry book with stable read counts.
//!
//! Readers share the book and never block each other; a writer needs the
//! book to itself. The submission count a reader sees when it opens the
//! book must still be the count when it closes it.

use stateright::{Checker, Model, Property, report::WriteReporter};
use std::time::Duration;

const READERS: usize = 2;
const WRITERS: usize = 2;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Reader {
    Idle,
    Reading { saw: u8 },
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Writer {
    Idle,
    Writing,
    Done,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct State {
    pub readers: [Reader; READERS],
    pub writers: [Writer; WRITERS],
    pub submissions: u8,
}

impl State {
    fn any_writing(&self) -> bool {
        self.writers.iter().any(|w| *w == Writer::Writing)
    }

    fn active_readers(&self) -> usize {
        self.readers
            .iter()
            .filter(|r| matches!(r, Reader::Reading { .. }))
            .count()
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Action {
    StartRead(usize),
    EndRead(usize),
    StartWrite(usize),
    EndWrite(usize),
}

#[derive(Clone, Debug)]
pub struct EntryBook;

impl Model for EntryBook {
    type State = State;
    type Action = Action;

    fn init_states(&self) -> Vec<Self::State> {
        vec![State {
            readers: [Reader::Idle; READERS],
            writers: [Writer::Idle; WRITERS],
            submissions: 0,
        }]
    }

    fn actions(&self, state: &Self::State, actions: &mut Vec<Self::Action>) {
        for (i, reader) in state.readers.iter().enumerate() {
            match reader {
                // New readers join freely while no writer holds the book,
                // even if one is waiting to.
                Reader::Idle if !state.any_writing() => actions.push(Action::StartRead(i)),
                Reader::Reading { .. } => actions.push(Action::EndRead(i)),
                _ => {}
            }
        }
        for (j, writer) in state.writers.iter().enumerate() {
            match writer {
                Writer::Idle if !state.any_writing() && state.active_readers() == 0 => {
                    actions.push(Action::StartWrite(j));
                }
                Writer::Writing => actions.push(Action::EndWrite(j)),
                _ => {}
            }
        }
    }

    fn next_state(&self, state: &Self::State, action: Self::Action) -> Option<Self::State> {
        let mut next = state.clone();
        match action {
            Action::StartRead(i) => {
                next.readers[i] = Reader::Reading {
                    saw: next.submissions,
                };
            }
            Action::EndRead(i) => {
                next.readers[i] = Reader::Idle;
            }
            Action::StartWrite(j) => {
                next.writers[j] = Writer::Writing;
            }
            Action::EndWrite(j) => {
                next.writers[j] = Writer::Done;
                next.submissions += 1;
            }
        }
        Some(next)
    }

    fn properties(&self) -> Vec<Property<Self>> {
        vec![
            Property::always("readers and writers never overlap", |_, s: &State| {
                !(s.any_writing() && s.active_readers() > 0)
            }),
            Property::always("at most one writer holds the book", |_, s: &State| {
                s.writers.iter().filter(|w| **w == Writer::Writing).count() <= 1
            }),
            Property::always("open reads always see the current count", |_, s: &State| {
                s.readers.iter().all(|r| match r {
                    Reader::Reading { saw } => *saw == s.submissions,
                    Reader::Idle => true,
                })
            }),
            Property::sometimes("a read can observe a partial count", |_, s: &State| {
                s.readers
                    .iter()
                    .any(|r| matches!(r, Reader::Reading { saw: 1 }))
            }),
            Property::sometimes("all reports land", |_, s: &State| {
                s.submissions == WRITERS as u8
            }),
        ]
    }
}

fn main() -> Result<(), pico_args::Error> {
    env_logger::init();

    let mut args = pico_args::Arguments::from_env();
    match args.subcommand()?.as_deref() {
        Some("explore") => {
            let address = args
                .opt_free_from_str()?
                .unwrap_or("localhost:3000".to_string());
            println!("Exploring entry-book state space on {address}.");
            EntryBook
                .checker()
                .threads(num_cpus::get())
                .timeout(Duration::from_secs(60))
                .serve(address);
        }
        Some("check") | None => {
            println!("Model checking the entry book.");
            EntryBook
                .checker()
                .threads(num_cpus::get())
                .timeout(Duration::from_secs(60))
                .spawn_dfs()
                .report(&mut WriteReporter::new(&mut std::io::stdout()));
        }
        _ => {
            println!("USAGE:");
            println!("  entry_book_machine check");
            println!("  entry_book_machine explore [ADDRESS]");
        }
    }

    Ok(())
}
