use tracing::debug;

use crate::common::PlayerSlot;
use crate::landmarks::strategy::FrameDetections;
use crate::landmarks::{HandLandmarkSet, PoseLandmarkSet};
use crate::pipeline::features::FeatureInterpreter;
use crate::pipeline::types::Movement;

/// Raw per-player features gathered in one cycle. `None` means "not observed".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerObservation {
    pub movement: Option<Movement>,
    pub jump: Option<bool>,
    pub kick: Option<bool>,
}

pub fn hand_owner(hand: &HandLandmarkSet, frame_width: u32) -> PlayerSlot {
    PlayerSlot::from_normalized_x(hand.wrist.x, frame_width)
}

/// Nose when visible, otherwise the visible hips. A pose with neither can't be attributed.
pub fn pose_owner(
    pose: &PoseLandmarkSet,
    frame_width: u32,
    min_visibility: f32,
) -> Option<PlayerSlot> {
    let anchor_x = match pose.nose.filter(|nose| nose.is_visible(min_visibility)) {
        Some(nose) => nose.x,
        None => {
            let hips: Vec<f32> = [pose.left_hip, pose.right_hip]
                .iter()
                .filter(|hip| hip.is_visible(min_visibility))
                .map(|hip| hip.x)
                .collect();
            if hips.is_empty() {
                return None;
            }
            hips.iter().sum::<f32>() / hips.len() as f32
        }
    };
    Some(PlayerSlot::from_normalized_x(anchor_x, frame_width))
}

/// Assigns every detected entity to a player by horizontal position.
///
/// Entities are visited in detection order; when two land on the same player, the later one
/// overwrites the fields it reports.
pub struct Disambiguator {
    features: FeatureInterpreter,
}

impl Disambiguator {
    pub fn new(features: FeatureInterpreter) -> Self {
        Self { features }
    }

    pub fn features(&self) -> &FeatureInterpreter {
        &self.features
    }

    pub fn observe(
        &self,
        detections: &FrameDetections,
        frame_width: u32,
    ) -> [PlayerObservation; 2] {
        let mut observations = [PlayerObservation::default(); 2];

        for hand in &detections.hands {
            if !self.features.accepts_hand(hand) {
                debug!(
                    "Skipping {} hand with confidence {:.2}",
                    hand.handedness.as_str(),
                    hand.confidence
                );
                continue;
            }
            let player = hand_owner(hand, frame_width);
            let observation = &mut observations[player.index()];
            if let Some(movement) = self.features.movement(hand) {
                observation.movement = Some(movement);
            }
            if let Some(jump) = self.features.jump_trigger(hand) {
                observation.jump = Some(jump);
            }
        }

        for pose in &detections.poses {
            let Some(player) = pose_owner(pose, frame_width, self.features.min_visibility) else {
                debug!("Pose has no visible anchor, not attributed");
                continue;
            };
            if let Some(kick) = self.features.kick_trigger(pose) {
                observations[player.index()].kick = Some(kick);
            }
        }

        observations
    }
}
