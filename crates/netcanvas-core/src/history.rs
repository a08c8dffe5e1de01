//! Undo/redo history of diagram snapshots.
//!
//! Mutations do not push snapshots directly. They arm a debounce deadline;
//! once the diagram has been quiet for the debounce interval the state is
//! serialized and recorded. Consecutive identical snapshots are recorded once.

use crate::model::Diagram;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Maximum number of snapshots kept.
pub const MAX_HISTORY: usize = 40;
/// Quiet period before a burst of mutations is captured, in milliseconds.
pub const DEBOUNCE_MS: u64 = 600;

/// History errors.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Failed to restore snapshot: {0}")]
    Decode(#[source] serde_json::Error),
}

/// An opaque, canonical capture of `{devices, connections, buildings}`.
///
/// Diagram collections are ordered maps, so two equal diagrams always
/// produce byte-identical snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn capture(diagram: &Diagram) -> Result<Self, HistoryError> {
        serde_json::to_string(diagram).map(Snapshot).map_err(HistoryError::Encode)
    }

    /// Wrap an already-serialized snapshot.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Snapshot(raw.into())
    }

    pub fn restore(&self) -> Result<Diagram, HistoryError> {
        serde_json::from_str(&self.0).map_err(HistoryError::Decode)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Bounded snapshot stack with a cursor and a debounce deadline.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    entries: Vec<Snapshot>,
    /// Index of the snapshot matching the current diagram.
    cursor: usize,
    capacity: usize,
    debounce: Duration,
    /// Single in-flight capture deadline.
    pending: Option<Instant>,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(MAX_HISTORY, Duration::from_millis(DEBOUNCE_MS))
    }
}

impl HistoryManager {
    pub fn new(capacity: usize, debounce: Duration) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            capacity: capacity.max(1),
            debounce,
            pending: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// The snapshot matching the current state, if any was recorded.
    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.cursor)
    }

    /// Arm (or re-arm) the capture deadline.
    pub fn schedule(&mut self, now: Instant) {
        self.pending = Some(now + self.debounce);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    /// Capture the diagram if the deadline has passed. Returns whether a
    /// snapshot was recorded.
    pub fn poll(&mut self, now: Instant, diagram: &Diagram) -> Result<bool, HistoryError> {
        match self.pending {
            Some(deadline) if now >= deadline => self.flush(diagram),
            _ => Ok(false),
        }
    }

    /// Capture a pending snapshot right away, ignoring the deadline.
    pub fn flush(&mut self, diagram: &Diagram) -> Result<bool, HistoryError> {
        if self.pending.take().is_none() {
            return Ok(false);
        }
        self.capture(diagram)
    }

    /// Serialize and record the diagram immediately.
    pub fn capture(&mut self, diagram: &Diagram) -> Result<bool, HistoryError> {
        let snapshot = Snapshot::capture(diagram)?;
        Ok(self.record(snapshot))
    }

    /// Record a snapshot. Identical to the current entry: no-op.
    ///
    /// Redo entries after the cursor are discarded, and the oldest entry is
    /// evicted once the stack grows past capacity.
    pub fn record(&mut self, snapshot: Snapshot) -> bool {
        if self.current() == Some(&snapshot) {
            log::debug!("History: snapshot unchanged, skipped");
            return false;
        }

        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot);
        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len() - 1;
        log::debug!("History: recorded snapshot {} of {}", self.cursor + 1, self.entries.len());
        true
    }

    /// Step back. `None` when already at the oldest entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward. `None` when already at the newest entry.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    /// Drop all entries and any pending capture.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
        self.pending = None;
    }
}
