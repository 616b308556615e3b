//! Memoized world derivation.
//!
//! The world is always a fold over the full log, but folding on every read
//! is wasteful when nothing was appended in between. [`SnapshotCache`]
//! keeps the last derivation together with the log handle it came from and
//! only folds again when the log hands out a different buffer.

use std::sync::Arc;

use squad_events::EventLog;
use squad_types::{Event, WorldSnapshot};
use tracing::debug;

/// The last derived snapshot and the log buffer it was derived from.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    source: Option<Arc<[Event]>>,
    snapshot: WorldSnapshot,
    derivations: u64,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotCache {
    /// An empty cache. The first read always derives.
    pub fn new() -> Self {
        Self {
            source: None,
            snapshot: squad_world::scenario().clone(),
            derivations: 0,
        }
    }

    /// The current world for `log`, re-derived only if the log changed.
    pub fn get(&mut self, log: &EventLog) -> &WorldSnapshot {
        let current = log.handle();
        let fresh = self
            .source
            .as_ref()
            .is_some_and(|cached| Arc::ptr_eq(cached, &current));
        if !fresh {
            self.snapshot = squad_world::derive_state(&current);
            self.derivations = self.derivations.saturating_add(1);
            debug!(
                events = current.len(),
                derivations = self.derivations,
                "Re-derived world snapshot"
            );
            self.source = Some(current);
        }
        &self.snapshot
    }

    /// How many times the cache has folded the log.
    pub const fn derivations(&self) -> u64 {
        self.derivations
    }
}
