//! Structural checks applied to every event before it reaches the log.
//!
//! The type system already guarantees most of the event shape (a tick is a
//! non-negative integer, details are a string-keyed map). What remains is
//! checked here: identifiers are meaningful, the type is recognized, types
//! that act on something name it, and the optional payloads have the right
//! form. [`check_actor`] adds the class check for callers that know who the
//! actor is.

use squad_types::{AgentKind, Event, EventType};

use crate::error::SchemaViolation;

/// Check the parts of an event that do not depend on its type.
///
/// Used on its own when restoring an exported log, where event types from a
/// newer build are tolerated.
pub fn check_shape(event: &Event) -> Result<(), SchemaViolation> {
    if event.id.is_nil() {
        return Err(SchemaViolation::NilId);
    }
    if event.actor.as_str().trim().is_empty() {
        return Err(SchemaViolation::EmptyActor);
    }
    if event.target.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(SchemaViolation::EmptyTarget);
    }
    if event.details.keys().any(String::is_empty) {
        return Err(SchemaViolation::EmptyDetailKey);
    }
    if event.result.as_ref().is_some_and(|r| !r.is_object()) {
        return Err(SchemaViolation::ResultNotObject);
    }
    Ok(())
}

/// Full schema check for a newly appended event.
pub fn check(event: &Event) -> Result<(), SchemaViolation> {
    check_shape(event)?;
    if event.event_type == EventType::Unknown {
        return Err(SchemaViolation::UnknownType);
    }
    if event.event_type.requires_target() && event.target.is_none() {
        return Err(SchemaViolation::MissingTarget(event.event_type));
    }
    Ok(())
}

/// Check that an actor of class `kind` may record this event type.
pub fn check_actor(event: &Event, kind: AgentKind) -> Result<(), SchemaViolation> {
    if kind.permits(event.event_type) {
        Ok(())
    } else {
        Err(SchemaViolation::ForbiddenAction {
            kind,
            action: event.event_type,
        })
    }
}
