use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::pipeline::types::ControlState;

/// An immutable copy of both players' controls, published once per processed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub controls: ControlState,
    /// Strictly increasing per worker.
    pub sequence: u64,
    /// Reset generation the worker had applied when producing this snapshot.
    pub generation: u64,
    pub frame_id: Option<Uuid>,
    pub captured_at: Option<DateTime<Utc>>,
}

impl PlayerSnapshot {
    pub fn rest(generation: u64) -> Self {
        Self {
            controls: ControlState::rest(),
            sequence: 0,
            generation,
            frame_id: None,
            captured_at: None,
        }
    }

    /// True when `self` may replace `seen` without going backwards in time.
    pub fn supersedes(&self, seen: &PlayerSnapshot) -> bool {
        self.generation >= seen.generation && self.sequence > seen.sequence
    }
}
