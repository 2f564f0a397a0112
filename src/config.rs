use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::ControllerError;

const ENV_PREFIX: &str = "HEAD_SOCCER";

/// All static controller configuration. Read once at construction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub capture: CaptureSettings,
    pub detection: DetectionSettings,
    pub gestures: GestureSettings,
    pub worker: WorkerSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub device_index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Frames the driver may queue. 1 keeps latency minimal.
    pub buffer_size: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    pub max_num_hands: usize,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    /// Pose landmarks below this visibility are treated as absent.
    pub min_visibility: f32,
    pub strategy: PoseStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseStrategy {
    /// One pose pass over the full frame, attributed by position.
    Shared,
    /// One pose pass per half-frame, one detector per player.
    SplitFrame,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    /// Wrist height (fraction of frame height) above which a jump triggers.
    pub jump_y_threshold: f32,
    /// How far (normalized) the knee must rise above the hip to kick.
    pub knee_threshold: f32,
    pub cooldown_frames: u32,
    /// Consecutive released cycles that cancel a running cooldown. None disables it.
    pub early_release_frames: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    pub target_hz: u32,
    pub join_timeout_ms: u64,
    pub debug_view: bool,
    pub debug_capacity: usize,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            width: 640,
            height: 480,
            fps: 30,
            buffer_size: 1,
        }
    }
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            max_num_hands: 4,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
            min_visibility: 0.5,
            strategy: PoseStrategy::Shared,
        }
    }
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            jump_y_threshold: 0.4,
            knee_threshold: 0.1,
            cooldown_frames: 15,
            early_release_frames: Some(2),
        }
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            target_hz: 60,
            join_timeout_ms: 1000,
            debug_view: false,
            debug_capacity: 4,
        }
    }
}

impl WorkerSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_hz.max(1)))
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }
}

impl GestureSettings {
    /// The early-release streak length, with zero meaning disabled.
    pub fn early_release(&self) -> Option<u32> {
        self.early_release_frames.filter(|frames| *frames > 0)
    }
}

impl Settings {
    /// Layers defaults, an optional settings file and `HEAD_SOCCER__*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ControllerError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let settings: Settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ControllerError> {
        fn unit_interval(field: &'static str, value: f32) -> Result<(), ControllerError> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ControllerError::InvalidSetting {
                    field,
                    reason: format!("{value} is outside [0, 1]"),
                })
            }
        }

        if self.capture.width < 2 || self.capture.height == 0 {
            return Err(ControllerError::InvalidSetting {
                field: "capture.width/height",
                reason: format!("{}x{}", self.capture.width, self.capture.height),
            });
        }
        if self.capture.fps == 0 {
            return Err(ControllerError::InvalidSetting {
                field: "capture.fps",
                reason: "must be positive".to_string(),
            });
        }
        if self.worker.target_hz == 0 {
            return Err(ControllerError::InvalidSetting {
                field: "worker.target_hz",
                reason: "must be positive".to_string(),
            });
        }
        if self.gestures.cooldown_frames == 0 {
            return Err(ControllerError::InvalidSetting {
                field: "gestures.cooldown_frames",
                reason: "must be positive".to_string(),
            });
        }
        unit_interval("gestures.jump_y_threshold", self.gestures.jump_y_threshold)?;
        unit_interval("gestures.knee_threshold", self.gestures.knee_threshold)?;
        unit_interval(
            "detection.min_detection_confidence",
            self.detection.min_detection_confidence,
        )?;
        unit_interval(
            "detection.min_tracking_confidence",
            self.detection.min_tracking_confidence,
        )?;
        unit_interval("detection.min_visibility", self.detection.min_visibility)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_canonical_constants() {
        let settings = Settings::default();
        assert_eq!(settings.gestures.cooldown_frames, 15);
        assert_eq!(settings.gestures.jump_y_threshold, 0.4);
        assert_eq!(settings.gestures.knee_threshold, 0.1);
        assert_eq!(settings.capture.buffer_size, 1);
        assert_eq!(settings.worker.target_hz, 60);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn load_without_file_yields_defaults() {
        let settings = Settings::load(None).expect("defaults should load");
        assert_eq!(settings.detection.strategy, PoseStrategy::Shared);
        assert_eq!(settings.gestures.early_release(), Some(2));
    }

    #[test]
    fn zero_early_release_disables_policy() {
        let gestures = GestureSettings {
            early_release_frames: Some(0),
            ..GestureSettings::default()
        };
        assert_eq!(gestures.early_release(), None);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let mut settings = Settings::default();
        settings.gestures.jump_y_threshold = 1.5;
        assert!(matches!(
            settings.validate(),
            Err(ControllerError::InvalidSetting { field: "gestures.jump_y_threshold", .. })
        ));
    }

    #[test]
    fn rejects_zero_cooldown() {
        let mut settings = Settings::default();
        settings.gestures.cooldown_frames = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn tick_interval_matches_target_rate() {
        let worker = WorkerSettings::default();
        let interval = worker.tick_interval();
        assert!(interval > Duration::from_millis(16) && interval < Duration::from_millis(17));
    }
}
