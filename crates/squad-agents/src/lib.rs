//! Agent decision handling for the squad command simulation.
//!
//! Everything between an untrusted action proposal and the event the
//! sequencer records: parsing, validation against each class's permitted
//! actions, safe-default fallbacks, and marine order compliance. Nothing
//! here performs I/O or touches the event log.
//!
//! # Modules
//!
//! - [`parse`] -- JSON recovery from free-text model output
//! - [`validation`] -- The action validator ([`ActionValidator`])
//! - [`fallback`] -- The fallback table and the mock-mode policy
//! - [`compliance`] -- Scoring actions against the commander's order
//! - [`error`] -- Fallback reasons ([`FallbackReason`])

pub mod compliance;
pub mod error;
pub mod fallback;
pub mod parse;
pub mod validation;

pub use compliance::{ComplianceCheck, ComplianceRules, check_compliance};
pub use error::FallbackReason;
pub use fallback::{
    FallbackAction, FallbackMode, FallbackPolicy, HIGH_STRESS, fallback_for_label,
    get_fallback_action,
};
pub use validation::{
    ActionValidator, AgentProfile, DEFAULT_MAX_RETRIES, Decoded, ValidatedAction, decode,
    validate_action,
};
