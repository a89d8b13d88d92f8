//! Model: conflict-classed press grants + release cascade.
//!
//! A student may print unless another student whose station class sits two
//! apart (mod 4) is currently printing. Grants happen at request time or
//! when a release re-examines waiters, walking the releaser's own group
//! first and then wrapping over the rest of the population.

use stateright::{Checker, Model, Property, report::WriteReporter};
use std::time::Duration;

const STUDENTS: u8 = 4;
const GROUP_SIZE: u8 = 2;
const STATIONS: u8 = 4;

fn station(id: u8) -> u8 {
    id % STATIONS
}

fn conflicts(a: u8, b: u8) -> bool {
    (a + 2) % STATIONS == b
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Phase {
    NotArrived,
    Waiting,
    Printing,
    Printed,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct State {
    pub phases: [Phase; STUDENTS as usize],
}

impl State {
    pub fn phase(&self, id: u8) -> Phase {
        self.phases[(id - 1) as usize]
    }

    fn set(&mut self, id: u8, phase: Phase) {
        self.phases[(id - 1) as usize] = phase;
    }

    fn can_print(&self, id: u8) -> bool {
        (1..=STUDENTS).all(|other| {
            !(self.phase(other) == Phase::Printing && conflicts(station(other), station(id)))
        })
    }

    fn try_grant(&mut self, id: u8) {
        if self.phase(id) == Phase::Waiting && self.can_print(id) {
            self.set(id, Phase::Printing);
        }
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Action {
    Arrive(u8),
    Release(u8),
}

#[derive(Clone, Debug)]
pub struct PressGrants;

impl Model for PressGrants {
    type State = State;
    type Action = Action;

    fn init_states(&self) -> Vec<Self::State> {
        vec![State {
            phases: [Phase::NotArrived; STUDENTS as usize],
        }]
    }

    fn actions(&self, state: &Self::State, actions: &mut Vec<Self::Action>) {
        for id in 1..=STUDENTS {
            match state.phase(id) {
                Phase::NotArrived => actions.push(Action::Arrive(id)),
                Phase::Printing => actions.push(Action::Release(id)),
                _ => {}
            }
        }
    }

    fn next_state(&self, state: &Self::State, action: Self::Action) -> Option<Self::State> {
        let mut next = state.clone();
        match action {
            Action::Arrive(id) => {
                next.set(id, Phase::Waiting);
                next.try_grant(id);
            }
            Action::Release(id) => {
                next.set(id, Phase::Printed);
                let group = (id - 1) / GROUP_SIZE;
                let lo = group * GROUP_SIZE + 1;
                let hi = lo + GROUP_SIZE - 1;
                for other in (lo..=hi).chain(1..lo).chain(hi + 1..=STUDENTS) {
                    next.try_grant(other);
                }
            }
        }
        Some(next)
    }

    fn properties(&self) -> Vec<Property<Self>> {
        vec![
            Property::always("conflicting classes never print together", |_, s: &State| {
                (1..=STUDENTS).all(|a| {
                    (1..=STUDENTS).all(|b| {
                        !(s.phase(a) == Phase::Printing
                            && s.phase(b) == Phase::Printing
                            && conflicts(station(a), station(b)))
                    })
                })
            }),
            Property::always("nobody waits while their rival class is idle", |_, s: &State| {
                (1..=STUDENTS).all(|id| s.phase(id) != Phase::Waiting || !s.can_print(id))
            }),
            Property::sometimes("everyone can finish", |_, s: &State| {
                (1..=STUDENTS).all(|id| s.phase(id) == Phase::Printed)
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
            println!("Exploring press-grant state space on {address}.");
            PressGrants
                .checker()
                .threads(num_cpus::get())
                .timeout(Duration::from_secs(60))
                .serve(address);
        }
        Some("check") | None => {
            println!("Model checking press grants.");
            PressGrants
                .checker()
                .threads(num_cpus::get())
                .timeout(Duration::from_secs(60))
                .spawn_dfs()
                .report(&mut WriteReporter::new(&mut std::io::stdout()));
        }
        _ => {
            println!("USAGE:");
            println!("  press_grant_machine check");
            println!("  press_grant_machine explore [ADDRESS]");
        }
    }

    Ok(())
}
