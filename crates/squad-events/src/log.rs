//! The append-only event log.
//!
//! The log is the single source of truth for a session. It can only be
//! extended: there is no operation that removes or edits a recorded event.
//! Every successful append swaps in a new shared buffer, so holders of an
//! older [`EventLog::handle`] keep a consistent view and observers can
//! detect change with `Arc::ptr_eq`.

use std::collections::HashSet;
use std::sync::Arc;

use squad_types::{Event, EventId, EventType};
use tracing::{debug, warn};

use crate::error::EventLogError;
use crate::schema;

/// Ordered, append-only sequence of [`Event`] records.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: Arc<[Event]>,
    ids: HashSet<EventId>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            events: Arc::from(Vec::new()),
            ids: HashSet::new(),
        }
    }

    /// Append one event.
    ///
    /// Fails with [`EventLogError::Schema`] if the event is malformed and
    /// with [`EventLogError::Ordering`] if its tick is not strictly greater
    /// than the last recorded tick. On failure the log is unchanged.
    pub fn append(&mut self, event: Event) -> Result<(), EventLogError> {
        self.append_batch(vec![event])
    }

    /// Append several events as one unit.
    ///
    /// Every event is checked against the log and the events before it in
    /// the batch. Either all of them are appended or none are.
    pub fn append_batch(&mut self, batch: Vec<Event>) -> Result<(), EventLogError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut last = self.last_tick();
        let mut batch_ids = HashSet::with_capacity(batch.len());
        for event in &batch {
            schema::check(event).map_err(|violation| EventLogError::Schema {
                tick: event.tick,
                violation,
            })?;
            if self.ids.contains(&event.id) || !batch_ids.insert(event.id) {
                return Err(EventLogError::Schema {
                    tick: event.tick,
                    violation: crate::SchemaViolation::DuplicateId(event.id),
                });
            }
            check_order(last, event.tick)?;
            last = Some(event.tick);
        }

        let mut next = Vec::with_capacity(self.events.len().saturating_add(batch.len()));
        next.extend_from_slice(&self.events);
        for event in batch {
            debug!(
                tick = event.tick,
                event_type = %event.event_type,
                actor = %event.actor,
                "Appended event"
            );
            next.push(event);
        }
        self.ids.extend(batch_ids);
        self.events = Arc::from(next);
        Ok(())
    }

    /// Rebuild a log from a previously exported event sequence.
    ///
    /// Ordering and shape are enforced as on append. Event types this build
    /// does not recognize are kept (and later skipped by the reducer) so a
    /// log written by a newer version still loads.
    pub fn restore(events: Vec<Event>) -> Result<Self, EventLogError> {
        let mut last = None;
        let mut ids = HashSet::with_capacity(events.len());
        for event in &events {
            schema::check_shape(event).map_err(|violation| EventLogError::Schema {
                tick: event.tick,
                violation,
            })?;
            if !ids.insert(event.id) {
                return Err(EventLogError::Schema {
                    tick: event.tick,
                    violation: crate::SchemaViolation::DuplicateId(event.id),
                });
            }
            check_order(last, event.tick)?;
            if event.event_type == EventType::Unknown {
                warn!(tick = event.tick, event_id = %event.id, "Restored event of unrecognized type");
            }
            last = Some(event.tick);
        }
        Ok(Self {
            events: Arc::from(events),
            ids,
        })
    }

    /// Decode an exported JSON array and restore it.
    pub fn from_json(json: &str) -> Result<Self, EventLogError> {
        let events: Vec<Event> = serde_json::from_str(json)?;
        Self::restore(events)
    }

    /// Export the log as a pretty-printed JSON array.
    pub fn to_json(&self) -> Result<String, EventLogError> {
        Ok(serde_json::to_string_pretty(&*self.events)?)
    }

    /// The full ordered sequence.
    pub fn all(&self) -> &[Event] {
        &self.events
    }

    /// Events with a tick strictly greater than `tick`.
    pub fn since(&self, tick: u64) -> &[Event] {
        let start = self.events.partition_point(|e| e.tick <= tick);
        self.events.get(start..).unwrap_or_default()
    }

    /// The last `n` events, oldest first.
    pub fn last_n(&self, n: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(n);
        self.events.get(start..).unwrap_or_default()
    }

    /// Tick of the most recent event.
    pub fn last_tick(&self) -> Option<u64> {
        self.events.last().map(|e| e.tick)
    }

    /// The smallest tick the next appended event may carry.
    pub fn next_tick(&self) -> u64 {
        self.last_tick().map_or(0, |t| t.saturating_add(1))
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// A shared handle to the current sequence.
    ///
    /// The handle is replaced, never mutated, on every append.
    pub fn handle(&self) -> Arc<[Event]> {
        Arc::clone(&self.events)
    }
}

fn check_order(last: Option<u64>, attempted: u64) -> Result<(), EventLogError> {
    match last {
        Some(last) if attempted <= last => Err(EventLogError::Ordering { last, attempted }),
        _ => Ok(()),
    }
}
