//! The station map and the world reducer for the squad command simulation.
//!
//! Nothing in this crate stores state. [`derive_state`] rebuilds the world
//! from the shared starting [`scenario`] and the event log every time it is
//! called.
//!
//! # Modules
//!
//! - [`scenario`] -- Static zones, items, and the starting squad
//! - [`reducer`] -- Event-by-event state transitions and the fold
//! - [`error`] -- Why a single event's effect was skipped

pub mod error;
pub mod reducer;
pub mod scenario;

pub use error::ReduceError;
pub use reducer::{apply, derive_state, derive_state_from, nudge_amount};
pub use scenario::scenario;
