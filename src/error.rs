use thiserror::Error;

// Controller construction error, the only failure that reaches the game loop.

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Capture device {device_index} is unavailable: {source}")]
    ResourceUnavailable {
        device_index: u32,
        #[source]
        source: CaptureError,
    },
    #[error("Failed to spawn frame worker: {0}")]
    WorkerSpawn(std::io::Error),
    #[error("Detector setup failed: {0}")]
    DetectorSetup(#[from] DetectionError),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid setting {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}

// Capture device errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    #[error("Failed to open capture device {0}")]
    Open(u32),
    #[error("Failed to configure capture device: {0}")]
    Configure(String),
    #[error("Failed to read frame: {0}")]
    Read(String),
    #[error("The capture device was already released.")]
    Released,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("Landmark inference failed: {0}")]
    Inference(String),
    #[error("Detector rejected input: {0}")]
    InvalidInput(String),
}

/// A single processing cycle failed. Logged by the worker, never fatal.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),
    #[error("Detection failed: {0}")]
    Detection(#[from] DetectionError),
    #[error("Image operation failed: {0}")]
    Image(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffError {
    #[error("No snapshot was published since the last read.")]
    Empty,
    #[error("The snapshot publisher is gone.")]
    Closed,
}
