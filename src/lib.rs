pub mod capture;
pub mod common;
pub mod config;
pub mod controller;
pub mod error;
pub mod handoff;
pub mod landmarks;
pub mod pipeline;
pub mod worker;

pub use config::Settings;
pub use controller::{
    ActiveController, ControlSelection, Controller, KeyboardController, KeyboardInput,
    VisionController,
};
pub use error::{CaptureError, ControllerError, DetectionError, FrameError, HandoffError};
pub use pipeline::{ControlState, JumpState, KickState, Movement, PlayerSnapshot};
