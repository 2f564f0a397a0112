use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::capture::CaptureBackend;
use crate::config::Settings;
use crate::controller::{Controller, KeyboardController, KeyboardInput, VisionController};
use crate::landmarks::DetectionStrategy;
use crate::pipeline::ControlState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlSelection {
    Vision,
    Keyboard,
}

impl ControlSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlSelection::Vision => "vision",
            ControlSelection::Keyboard => "keyboard",
        }
    }
}

impl fmt::Display for ControlSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vision" | "v" | "camera" => Ok(ControlSelection::Vision),
            "keyboard" | "k" => Ok(ControlSelection::Keyboard),
            other => Err(format!("unknown control selection: {other}")),
        }
    }
}

/// Builds the requested controller. A vision controller that can't start degrades to the
/// keyboard, so the game always gets something to drive it.
pub fn select(
    selection: ControlSelection,
    settings: &Settings,
    backend: &dyn CaptureBackend,
    detection: impl FnOnce() -> DetectionStrategy,
    keyboard: KeyboardInput,
) -> Box<dyn Controller> {
    match selection {
        ControlSelection::Keyboard => Box::new(KeyboardController::with_input(keyboard)),
        ControlSelection::Vision => match VisionController::new(settings, backend, detection()) {
            Ok(controller) => Box::new(controller),
            Err(e) => {
                warn!("Vision controls unavailable ({}), falling back to keyboard", e);
                Box::new(KeyboardController::with_input(keyboard))
            }
        },
    }
}

/// The controller the game is currently driven by, swappable at runtime.
pub struct ActiveController {
    inner: Box<dyn Controller>,
}

impl ActiveController {
    pub fn new(inner: Box<dyn Controller>) -> Self {
        Self { inner }
    }

    /// Cleans up the current controller before installing `next`.
    pub fn replace(&mut self, next: Box<dyn Controller>) {
        let previous = self.inner.kind();
        self.inner.cleanup();
        self.inner = next;
        info!("Controls switched from {} to {}", previous, self.inner.kind());
    }
}

impl Controller for ActiveController {
    fn kind(&self) -> ControlSelection {
        self.inner.kind()
    }

    fn process_input(&mut self) -> ControlState {
        self.inner.process_input()
    }

    fn reset_states(&mut self) {
        self.inner.reset_states();
    }

    fn cleanup(&mut self) {
        self.inner.cleanup();
    }
}
