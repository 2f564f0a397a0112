use crate::common::Frame;
use crate::config::CaptureSettings;
use crate::error::CaptureError;

/// A camera. Owned by exactly one frame worker at a time.
pub trait CaptureDevice: Send {
    /// Applies resolution, frame rate and driver buffering.
    fn configure(&mut self, settings: &CaptureSettings) -> Result<(), CaptureError>;

    /// Grabs the next frame. May block for up to one camera frame period.
    fn read_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Returns the device to the system. Called exactly once.
    fn release(&mut self);
}

/// Opens capture devices by index.
pub trait CaptureBackend {
    fn open(&self, device_index: u32) -> Result<Box<dyn CaptureDevice>, CaptureError>;
}
