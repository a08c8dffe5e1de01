//! Identity generation for entities the engine originates (rooms and walls).

use uuid::Uuid;

/// Source of fresh identifiers for newly drawn rooms and walls.
pub trait IdGenerator: std::fmt::Debug {
    /// Produce a new identifier. `prefix` names the entity kind ("room", "wall").
    fn next_id(&mut self, prefix: &str) -> String;
}

/// Random v4 UUIDs, prefixed with the entity kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self, prefix: &str) -> String {
        format!("{prefix}-{}", Uuid::new_v4())
    }
}

/// Deterministic counter-based ids (`room-1`, `wall-2`, ...).
///
/// Used by replays and tests where stable ids matter.
#[derive(Debug, Default, Clone)]
pub struct SequentialIdGenerator {
    counter: u64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{prefix}-{}", self.counter)
    }
}
