//! Landmarks to gesture features. No state is kept between calls.

use crate::config::Settings;
use crate::landmarks::{Finger, HandLandmarkSet, Handedness, Landmark, PoseLandmarkSet};
use crate::pipeline::types::Movement;

/// Number of non-thumb fingers whose tip sits above its middle knuckle. Range `[0, 4]`.
pub fn extended_count(hand: &HandLandmarkSet) -> usize {
    Finger::ALL
        .iter()
        .map(|finger| hand.finger(*finger))
        .filter(|finger| finger.tip.y < finger.pip.y)
        .count()
}

/// Open hand moves right, closed hand moves left, two fingers is the dead zone.
pub fn movement_for_count(extended: usize) -> Movement {
    match extended {
        0 | 1 => Movement::Left,
        2 => Movement::None,
        _ => Movement::Right,
    }
}

/// Thresholds that turn landmarks into raw triggers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureInterpreter {
    pub jump_y_threshold: f32,
    pub knee_threshold: f32,
    pub min_visibility: f32,
    pub min_hand_confidence: f32,
}

impl FeatureInterpreter {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            jump_y_threshold: settings.gestures.jump_y_threshold,
            knee_threshold: settings.gestures.knee_threshold,
            min_visibility: settings.detection.min_visibility,
            min_hand_confidence: settings.detection.min_detection_confidence,
        }
    }

    pub fn accepts_hand(&self, hand: &HandLandmarkSet) -> bool {
        hand.confidence >= self.min_hand_confidence
    }

    /// Movement from a right hand. Left hands don't steer.
    pub fn movement(&self, hand: &HandLandmarkSet) -> Option<Movement> {
        match hand.handedness {
            Handedness::Right => Some(movement_for_count(extended_count(hand))),
            Handedness::Left => None,
        }
    }

    /// Raw jump trigger from a left hand: wrist raised above the threshold line.
    pub fn jump_trigger(&self, hand: &HandLandmarkSet) -> Option<bool> {
        match hand.handedness {
            Handedness::Left => Some(hand.wrist.y < self.jump_y_threshold),
            Handedness::Right => None,
        }
    }

    fn leg_delta(&self, hip: &Landmark, knee: &Landmark) -> Option<f32> {
        (hip.is_visible(self.min_visibility) && knee.is_visible(self.min_visibility))
            .then(|| knee.y - hip.y)
    }

    /// `knee.y - hip.y` of whichever visible leg is raised highest. None if neither leg is
    /// trustworthy this cycle.
    pub fn knee_delta(&self, pose: &PoseLandmarkSet) -> Option<f32> {
        let left = self.leg_delta(&pose.left_hip, &pose.left_knee);
        let right = self.leg_delta(&pose.right_hip, &pose.right_knee);
        match (left, right) {
            (Some(l), Some(r)) => Some(l.min(r)),
            (delta, None) | (None, delta) => delta,
        }
    }

    pub fn kick_trigger(&self, pose: &PoseLandmarkSet) -> Option<bool> {
        self.knee_delta(pose)
            .map(|delta| delta < -self.knee_threshold)
    }
}

impl Default for FeatureInterpreter {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn right_hand(extended: usize) -> HandLandmarkSet {
        HandLandmarkSet::synthetic(Handedness::Right, Landmark::new(0.3, 0.7), extended)
    }

    fn left_hand_at(y: f32) -> HandLandmarkSet {
        HandLandmarkSet::synthetic(Handedness::Left, Landmark::new(0.3, y), 0)
    }

    #[test]
    fn counts_every_extension_level() {
        for extended in 0..=4 {
            assert_eq!(extended_count(&right_hand(extended)), extended);
        }
    }

    #[test]
    fn movement_for_all_five_counts() {
        assert_eq!(movement_for_count(0), Movement::Left);
        assert_eq!(movement_for_count(1), Movement::Left);
        assert_eq!(movement_for_count(2), Movement::None);
        assert_eq!(movement_for_count(3), Movement::Right);
        assert_eq!(movement_for_count(4), Movement::Right);
    }

    #[test]
    fn only_right_hand_steers() {
        let interpreter = FeatureInterpreter::default();
        assert_eq!(interpreter.movement(&right_hand(4)), Some(Movement::Right));
        assert_eq!(interpreter.movement(&left_hand_at(0.9)), None);
    }

    #[test]
    fn jump_requires_left_wrist_above_threshold() {
        let interpreter = FeatureInterpreter::default();
        assert_eq!(interpreter.jump_trigger(&left_hand_at(0.3)), Some(true));
        assert_eq!(interpreter.jump_trigger(&left_hand_at(0.4)), Some(false));
        assert_eq!(interpreter.jump_trigger(&left_hand_at(0.8)), Some(false));
        assert_eq!(interpreter.jump_trigger(&right_hand(4)), None);
    }

    #[test]
    fn kick_uses_highest_leg() {
        let interpreter = FeatureInterpreter::default();
        let right_kick = PoseLandmarkSet::synthetic(0.5, 0.0, 0.15);
        let left_kick = PoseLandmarkSet::synthetic(0.5, 0.2, 0.01);
        let standing = PoseLandmarkSet::synthetic(0.5, 0.02, 0.05);

        assert_eq!(interpreter.kick_trigger(&right_kick), Some(true));
        assert_eq!(interpreter.kick_trigger(&left_kick), Some(true));
        assert_eq!(interpreter.kick_trigger(&standing), Some(false));
    }

    #[test]
    fn low_visibility_leg_is_ignored() {
        let interpreter = FeatureInterpreter::default();
        let mut pose = PoseLandmarkSet::synthetic(0.5, 0.0, 0.3);
        pose.right_knee.visibility = 0.2;
        assert_eq!(interpreter.kick_trigger(&pose), Some(false));

        pose.left_hip.visibility = 0.4;
        assert_eq!(interpreter.kick_trigger(&pose), None);
    }

    #[test]
    fn low_confidence_hand_rejected() {
        let interpreter = FeatureInterpreter::default();
        let mut hand = right_hand(4);
        hand.confidence = 0.2;
        assert!(!interpreter.accepts_hand(&hand));
    }
}
