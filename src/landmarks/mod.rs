pub mod source;
pub mod strategy;
pub mod types;

pub use source::{LandmarkSource, ScriptedLandmarkSource};
pub use strategy::DetectionStrategy;
pub use types::{
    Detections, Finger, FingerLandmarks, HandLandmarkSet, Handedness, Landmark, PoseLandmarkSet,
};
