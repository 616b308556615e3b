//! Event sourcing for the squad command simulation.
//!
//! Every state change is an immutable [`Event`](squad_types::Event) in the
//! [`EventLog`]. The world is never stored: it is re-derived from the log by
//! the reducer in `squad-world`.
//!
//! # Modules
//!
//! - [`log`] -- The append-only log and its query operations
//! - [`schema`] -- Structural checks run before an event is accepted
//! - [`error`] -- Schema and ordering errors

pub mod error;
pub mod log;
pub mod schema;

pub use error::{EventLogError, SchemaViolation};
pub use log::EventLog;
