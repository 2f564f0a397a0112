use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use tracing::{info, warn};

use crate::capture::device::CaptureDevice;
use crate::common::Frame;
use crate::error::CaptureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released,
    AlreadyReleased,
    /// A read is in progress; whoever finishes it is responsible for releasing.
    Busy,
}

/// Shared ownership of a capture device that guarantees a single release.
///
/// The worker reads through it every cycle and controller cleanup releases through it. Whichever
/// side releases first takes the device out; every later attempt is a no-op.
#[derive(Clone)]
pub struct DeviceHandle {
    device: Arc<Mutex<Option<Box<dyn CaptureDevice>>>>,
}

impl DeviceHandle {
    pub fn new(device: Box<dyn CaptureDevice>) -> Self {
        Self {
            device: Arc::new(Mutex::new(Some(device))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn CaptureDevice>>> {
        // A panic mid-read doesn't invalidate the device slot itself.
        self.device.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn read_frame(&self) -> Result<Frame, CaptureError> {
        match self.lock().as_mut() {
            Some(device) => device.read_frame(),
            None => Err(CaptureError::Released),
        }
    }

    pub fn is_released(&self) -> bool {
        match self.device.try_lock() {
            Ok(slot) => slot.is_none(),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().is_none(),
            Err(TryLockError::WouldBlock) => false,
        }
    }

    /// Releases without waiting on an in-flight read.
    pub fn try_release(&self) -> ReleaseOutcome {
        match self.device.try_lock() {
            Ok(mut slot) => Self::release_slot(&mut slot),
            Err(TryLockError::Poisoned(poisoned)) => Self::release_slot(&mut poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => {
                warn!("Capture device busy, release deferred to the frame worker");
                ReleaseOutcome::Busy
            }
        }
    }

    /// Releases, waiting for any in-flight read to finish.
    pub fn release(&self) -> ReleaseOutcome {
        Self::release_slot(&mut self.lock())
    }

    fn release_slot(slot: &mut Option<Box<dyn CaptureDevice>>) -> ReleaseOutcome {
        match slot.take() {
            Some(mut device) => {
                device.release();
                info!("Capture device released");
                ReleaseOutcome::Released
            }
            None => ReleaseOutcome::AlreadyReleased,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::synthetic::SyntheticCameraBackend;
    use crate::capture::CaptureBackend;

    #[test]
    fn releases_exactly_once() {
        let backend = SyntheticCameraBackend::new(64, 48);
        let handle = DeviceHandle::new(backend.open(0).unwrap());

        assert_eq!(handle.try_release(), ReleaseOutcome::Released);
        assert_eq!(handle.try_release(), ReleaseOutcome::AlreadyReleased);
        assert_eq!(handle.release(), ReleaseOutcome::AlreadyReleased);
        assert_eq!(backend.releases(), 1);
        assert!(handle.is_released());
    }

    #[test]
    fn read_after_release_fails() {
        let backend = SyntheticCameraBackend::new(64, 48);
        let handle = DeviceHandle::new(backend.open(0).unwrap());
        assert!(handle.read_frame().is_ok());

        handle.release();

        assert_eq!(handle.read_frame().unwrap_err(), CaptureError::Released);
    }

    #[test]
    fn try_release_defers_while_reading() {
        let backend = SyntheticCameraBackend::new(64, 48);
        let handle = DeviceHandle::new(backend.open(0).unwrap());
        let guard = handle.device.lock().unwrap();

        assert_eq!(handle.try_release(), ReleaseOutcome::Busy);

        drop(guard);
        assert_eq!(handle.try_release(), ReleaseOutcome::Released);
        assert_eq!(backend.releases(), 1);
    }
}
