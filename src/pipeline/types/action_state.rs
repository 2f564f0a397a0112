use serde::{Deserialize, Serialize};
use std::fmt;

/// Horizontal intent. Recomputed from scratch every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Movement {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JumpState {
    #[default]
    Ready,
    Jumping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KickState {
    #[default]
    Ready,
    Kicking,
}

impl Movement {
    pub fn as_str(self) -> &'static str {
        match self {
            Movement::None => "none",
            Movement::Left => "left",
            Movement::Right => "right",
        }
    }
}

impl JumpState {
    pub fn from_active(active: bool) -> Self {
        if active {
            JumpState::Jumping
        } else {
            JumpState::Ready
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JumpState::Ready => "ready",
            JumpState::Jumping => "jumping",
        }
    }
}

impl KickState {
    pub fn from_active(active: bool) -> Self {
        if active {
            KickState::Kicking
        } else {
            KickState::Ready
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KickState::Ready => "ready",
            KickState::Kicking => "kicking",
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for JumpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for KickState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
