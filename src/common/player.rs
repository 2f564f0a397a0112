use serde::{Deserialize, Serialize};
use std::fmt;

/// Player identity. Derived from position every cycle, never tracked across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    pub fn number(self) -> u8 {
        match self {
            PlayerSlot::One => 1,
            PlayerSlot::Two => 2,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }

    /// Left of the midpoint is player 1; the midpoint itself belongs to player 2.
    pub fn from_pixel_x(x: i64, frame_width: u32) -> Self {
        let mid = i64::from(frame_width / 2);
        if x < mid {
            PlayerSlot::One
        } else {
            PlayerSlot::Two
        }
    }

    /// Normalized x is truncated to a pixel column before the midpoint test.
    pub fn from_normalized_x(x: f32, frame_width: u32) -> Self {
        let pixel_x = (f64::from(x) * f64::from(frame_width)) as i64;
        Self::from_pixel_x(pixel_x, frame_width)
    }
}

impl From<PlayerSlot> for u8 {
    fn from(slot: PlayerSlot) -> Self {
        slot.number()
    }
}

impl TryFrom<u8> for PlayerSlot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PlayerSlot::One),
            2 => Ok(PlayerSlot::Two),
            other => Err(format!("no player slot {other}")),
        }
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_boundary_around_midpoint() {
        let width = 1200;
        assert_eq!(PlayerSlot::from_pixel_x(599, width), PlayerSlot::One);
        assert_eq!(PlayerSlot::from_pixel_x(600, width), PlayerSlot::Two);
        assert_eq!(PlayerSlot::from_pixel_x(0, width), PlayerSlot::One);
        assert_eq!(PlayerSlot::from_pixel_x(1199, width), PlayerSlot::Two);
    }

    #[test]
    fn odd_width_uses_integer_midpoint() {
        // mid = 641 / 2 = 320
        assert_eq!(PlayerSlot::from_pixel_x(319, 641), PlayerSlot::One);
        assert_eq!(PlayerSlot::from_pixel_x(320, 641), PlayerSlot::Two);
    }

    #[test]
    fn normalized_center_goes_to_player_two() {
        assert_eq!(PlayerSlot::from_normalized_x(0.5, 640), PlayerSlot::Two);
        assert_eq!(PlayerSlot::from_normalized_x(0.49, 640), PlayerSlot::One);
    }

    #[test]
    fn serializes_as_number() {
        assert_eq!(serde_json::to_string(&PlayerSlot::Two).unwrap(), "2");
        let parsed: PlayerSlot = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, PlayerSlot::One);
        assert!(serde_json::from_str::<PlayerSlot>("3").is_err());
    }
}
