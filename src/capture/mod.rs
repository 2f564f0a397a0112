pub mod device;
pub mod handle;
pub mod synthetic;

pub use device::{CaptureBackend, CaptureDevice};
pub use handle::{DeviceHandle, ReleaseOutcome};
pub use synthetic::{SyntheticCamera, SyntheticCameraBackend};
