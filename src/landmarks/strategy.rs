use tracing::debug;

use crate::common::Frame;
use crate::config::{DetectionSettings, PoseStrategy};
use crate::error::DetectionError;
use crate::landmarks::source::LandmarkSource;
use crate::landmarks::types::{HandLandmarkSet, PoseLandmarkSet};

/// How poses are detected for two players.
///
/// `Shared` runs one detector over the full frame, so at most one body is seen per cycle.
/// `SplitFrame` runs hands on the full frame and one pose detector per half, which isolates the
/// players at half the resolution each.
pub enum DetectionStrategy {
    Shared(Box<dyn LandmarkSource>),
    SplitFrame {
        hands: Box<dyn LandmarkSource>,
        poses: [Box<dyn LandmarkSource>; 2],
    },
}

/// Everything detected in one frame, in full-frame normalized coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameDetections {
    pub hands: Vec<HandLandmarkSet>,
    pub poses: Vec<PoseLandmarkSet>,
}

impl DetectionStrategy {
    pub fn shared(source: impl LandmarkSource + 'static) -> Self {
        DetectionStrategy::Shared(Box::new(source))
    }

    pub fn split_frame(
        hands: impl LandmarkSource + 'static,
        left: impl LandmarkSource + 'static,
        right: impl LandmarkSource + 'static,
    ) -> Self {
        DetectionStrategy::SplitFrame {
            hands: Box::new(hands),
            poses: [Box::new(left), Box::new(right)],
        }
    }

    pub fn kind(&self) -> PoseStrategy {
        match self {
            DetectionStrategy::Shared(_) => PoseStrategy::Shared,
            DetectionStrategy::SplitFrame { .. } => PoseStrategy::SplitFrame,
        }
    }

    pub fn configure(&mut self, settings: &DetectionSettings) -> Result<(), DetectionError> {
        match self {
            DetectionStrategy::Shared(source) => source.configure(settings),
            DetectionStrategy::SplitFrame { hands, poses } => {
                hands.configure(settings)?;
                for pose in poses.iter_mut() {
                    pose.configure(settings)?;
                }
                Ok(())
            }
        }
    }

    pub fn detect(&mut self, frame: &Frame) -> Result<FrameDetections, DetectionError> {
        match self {
            DetectionStrategy::Shared(source) => {
                let detections = source.detect(frame)?;
                Ok(FrameDetections {
                    hands: detections.hands,
                    poses: detections.pose.into_iter().collect(),
                })
            }
            DetectionStrategy::SplitFrame { hands, poses } => {
                let full_width = frame.width();
                let center_x = full_width / 2;
                let regions = [(0, center_x), (center_x, full_width - center_x)];

                let hands = hands.detect(frame)?.hands;
                let mut found = Vec::with_capacity(2);
                for (source, (offset, width)) in poses.iter_mut().zip(regions) {
                    let half = frame.crop_columns(offset, width);
                    if let Some(pose) = source.detect(&half)?.pose {
                        found.push(pose.into_full_frame(offset, width, full_width));
                    } else {
                        debug!("No pose in region starting at x={}", offset);
                    }
                }
                Ok(FrameDetections {
                    hands,
                    poses: found,
                })
            }
        }
    }
}
