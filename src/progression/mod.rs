//! Progression engine.
//!
//! Pure calculations over experience points and mission completions:
//!
//! - `level` maps an XP total to a level and progress bar state
//! - `ledger` applies the completion rules over a mission catalog and computes
//!   per-category aggregates
//!
//! Nothing in here performs I/O. Callers read the current state, run these
//! functions, and persist the returned records themselves (see `crate::store`).

pub mod errors;
pub mod ledger;
pub mod level;
pub mod mission;
