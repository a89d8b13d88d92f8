//! Printhall coordination lane: Stateright models.
//!
//! This crate is intentionally small and "toy". The goal is to model-check
//! the correctness invariants (no conflicting grants, stable read counts,
//! every waiter eventually served) without pulling in the full simulation.
//!
//! Each example in `examples/` focuses on one "little machine" at a time.

pub mod conflict;
