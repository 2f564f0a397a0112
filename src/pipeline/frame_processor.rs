use tracing::{debug, instrument};

use crate::common::Frame;
use crate::config::Settings;
use crate::error::FrameError;
use crate::landmarks::strategy::FrameDetections;
use crate::landmarks::DetectionStrategy;
use crate::pipeline::debounce::ControlStateMachine;
use crate::pipeline::disambiguation::Disambiguator;
use crate::pipeline::features::FeatureInterpreter;
use crate::pipeline::types::PlayerSnapshot;

/// Result of one successful cycle.
pub struct ProcessedFrame {
    /// The selfie-view frame the detector saw.
    pub frame: Frame,
    pub detections: FrameDetections,
    pub snapshot: PlayerSnapshot,
}

/// Mirror, detect, disambiguate, debounce, snapshot. One call per captured frame.
pub struct FrameProcessor {
    detection: DetectionStrategy,
    disambiguator: Disambiguator,
    machine: ControlStateMachine,
    sequence: u64,
    generation: u64,
}

impl FrameProcessor {
    pub fn new(settings: &Settings, detection: DetectionStrategy) -> Self {
        Self {
            detection,
            disambiguator: Disambiguator::new(FeatureInterpreter::from_settings(settings)),
            machine: ControlStateMachine::new(&settings.gestures),
            sequence: 0,
            generation: 0,
        }
    }

    pub fn detection_mut(&mut self) -> &mut DetectionStrategy {
        &mut self.detection
    }

    pub fn machine(&self) -> &ControlStateMachine {
        &self.machine
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Adopts a reset requested by the consumer. Repeated generations are no-ops.
    pub fn apply_reset(&mut self, generation: u64) {
        if generation != self.generation {
            debug!(
                "Resetting control state (generation {} -> {})",
                self.generation, generation
            );
            self.machine.reset();
            self.generation = generation;
        }
    }

    /// Runs one cycle. On error the state machine is left untouched.
    #[instrument(skip_all, fields(frame = %frame.frame_id(), sequence = self.sequence + 1))]
    pub fn process(&mut self, frame: &Frame) -> Result<ProcessedFrame, FrameError> {
        let mirrored = frame.mirrored();
        let detections = self.detection.detect(&mirrored)?;
        let observations = self.disambiguator.observe(&detections, mirrored.width());
        let controls = self.machine.update(&observations);

        self.sequence += 1;
        let snapshot = PlayerSnapshot {
            controls,
            sequence: self.sequence,
            generation: self.generation,
            frame_id: Some(mirrored.frame_id()),
            captured_at: Some(mirrored.captured_at()),
        };
        Ok(ProcessedFrame {
            frame: mirrored,
            detections,
            snapshot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::PlayerSlot;
    use crate::error::DetectionError;
    use crate::landmarks::{
        Detections, HandLandmarkSet, Handedness, Landmark, ScriptedLandmarkSource,
    };
    use crate::pipeline::types::{JumpState, Movement};
    use image::{DynamicImage, RgbImage};
    use uuid::Uuid;

    const WIDTH: u32 = 1200;

    fn frame() -> Frame {
        Frame::capture(
            Uuid::new_v4(),
            DynamicImage::ImageRgb8(RgbImage::new(WIDTH, 2)),
        )
    }

    fn raised_left_hand(pixel_x: u32) -> Detections {
        Detections {
            hands: vec![HandLandmarkSet::synthetic(
                Handedness::Left,
                Landmark::new(pixel_x as f32 / WIDTH as f32, 0.3),
                0,
            )],
            pose: None,
        }
    }

    fn settings_without_early_release() -> Settings {
        let mut settings = Settings::default();
        settings.gestures.early_release_frames = None;
        settings
    }

    #[test]
    fn raised_hand_jumps_on_first_cycle_only() {
        let source = ScriptedLandmarkSource::new().push_repeated(raised_left_hand(100), 16);
        let mut processor = FrameProcessor::new(
            &settings_without_early_release(),
            DetectionStrategy::shared(source),
        );

        let jumps: Vec<JumpState> = (0..16)
            .map(|_| {
                processor
                    .process(&frame())
                    .expect("cycle succeeds")
                    .snapshot
                    .controls
                    .get(PlayerSlot::One)
                    .jump
            })
            .collect();

        assert_eq!(jumps[0], JumpState::Jumping);
        assert!(jumps[1..15].iter().all(|jump| *jump == JumpState::Ready));
        assert_eq!(jumps[15], JumpState::Jumping);
    }

    #[test]
    fn sequence_increases_per_cycle() {
        let mut processor = FrameProcessor::new(
            &Settings::default(),
            DetectionStrategy::shared(ScriptedLandmarkSource::new()),
        );
        let first = processor.process(&frame()).unwrap().snapshot;
        let second = processor.process(&frame()).unwrap().snapshot;
        assert_eq!((first.sequence, second.sequence), (1, 2));
        assert!(second.supersedes(&first));
    }

    #[test]
    fn failed_detection_leaves_state_untouched() {
        let source = ScriptedLandmarkSource::new()
            .push(raised_left_hand(100))
            .push_error(DetectionError::Inference("timeout".to_string()));
        let mut processor =
            FrameProcessor::new(&Settings::default(), DetectionStrategy::shared(source));

        processor.process(&frame()).unwrap();
        let before = processor.machine().clone();
        assert!(processor.process(&frame()).is_err());
        assert_eq!(processor.machine(), &before);
    }

    #[test]
    fn reset_generation_clears_cooldown_once() {
        let source = ScriptedLandmarkSource::new().push_repeated(raised_left_hand(100), 3);
        let mut processor = FrameProcessor::new(
            &settings_without_early_release(),
            DetectionStrategy::shared(source),
        );
        processor.process(&frame()).unwrap();

        processor.apply_reset(1);
        processor.apply_reset(1);

        let snapshot = processor.process(&frame()).unwrap().snapshot;
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.controls.get(PlayerSlot::One).jump, JumpState::Jumping);
    }

    #[test]
    fn mirrored_frame_is_what_detector_sees() {
        let mut processor = FrameProcessor::new(
            &Settings::default(),
            DetectionStrategy::shared(ScriptedLandmarkSource::new().push(Detections {
                hands: vec![HandLandmarkSet::synthetic(
                    Handedness::Right,
                    Landmark::new(0.9, 0.7),
                    4,
                )],
                pose: None,
            })),
        );
        let input = frame();

        let processed = processor.process(&input).unwrap();

        assert_eq!(processed.frame.frame_id(), input.frame_id());
        assert_eq!(
            processed.snapshot.controls.get(PlayerSlot::Two).movement,
            Movement::Right
        );
    }
}
