use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, Rgb, RgbImage};
use tracing::debug;
use uuid::Uuid;

use crate::capture::device::{CaptureBackend, CaptureDevice};
use crate::common::Frame;
use crate::config::CaptureSettings;
use crate::error::CaptureError;

/// Opens synthetic cameras that render flat test frames.
///
/// Useful wherever a real camera is unavailable: demos, tests, and headless runs. Clones share
/// the release counter.
#[derive(Clone)]
pub struct SyntheticCameraBackend {
    width: u32,
    height: u32,
    available: bool,
    fail_every: Option<u32>,
    read_delay: Duration,
    releases: Arc<AtomicUsize>,
}

impl SyntheticCameraBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            available: true,
            fail_every: None,
            read_delay: Duration::ZERO,
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A backend whose devices can't be opened.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(0, 0)
        }
    }

    /// Every `n`th read fails, as a flaky USB camera would.
    pub fn fail_every(mut self, n: u32) -> Self {
        self.fail_every = Some(n.max(1));
        self
    }

    /// How long each read blocks.
    pub fn read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    /// Number of devices released so far.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl CaptureBackend for SyntheticCameraBackend {
    fn open(&self, device_index: u32) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        if !self.available {
            return Err(CaptureError::Open(device_index));
        }
        Ok(Box::new(SyntheticCamera {
            id: Uuid::new_v4(),
            width: self.width,
            height: self.height,
            fail_every: self.fail_every,
            read_delay: self.read_delay,
            reads: 0,
            releases: self.releases.clone(),
        }))
    }
}

pub struct SyntheticCamera {
    id: Uuid,
    width: u32,
    height: u32,
    fail_every: Option<u32>,
    read_delay: Duration,
    reads: u32,
    releases: Arc<AtomicUsize>,
}

impl CaptureDevice for SyntheticCamera {
    fn configure(&mut self, settings: &CaptureSettings) -> Result<(), CaptureError> {
        if settings.width == 0 || settings.height == 0 {
            return Err(CaptureError::Configure(format!(
                "unsupported resolution {}x{}",
                settings.width, settings.height
            )));
        }
        self.width = settings.width;
        self.height = settings.height;
        debug!(
            "Synthetic camera {} configured at {}x{}@{} (buffer {})",
            self.id, settings.width, settings.height, settings.fps, settings.buffer_size
        );
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        if !self.read_delay.is_zero() {
            std::thread::sleep(self.read_delay);
        }
        self.reads = self.reads.wrapping_add(1);
        if self.fail_every.is_some_and(|n| self.reads % n == 0) {
            return Err(CaptureError::Read(format!("dropped read #{}", self.reads)));
        }
        let shade = (self.reads % 256) as u8;
        let image = RgbImage::from_pixel(self.width, self.height, Rgb([shade, 96, 64]));
        Ok(Frame::capture(self.id, DynamicImage::ImageRgb8(image)))
    }

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_applies_resolution() {
        let backend = SyntheticCameraBackend::new(4, 4);
        let mut camera = backend.open(0).unwrap();
        camera.configure(&CaptureSettings::default()).unwrap();

        let frame = camera.read_frame().unwrap();

        assert_eq!((frame.width(), frame.height()), (640, 480));
    }

    #[test]
    fn unavailable_backend_fails_to_open() {
        let backend = SyntheticCameraBackend::unavailable();
        assert_eq!(backend.open(3).err(), Some(CaptureError::Open(3)));
    }

    #[test]
    fn flaky_camera_fails_periodically() {
        let backend = SyntheticCameraBackend::new(8, 8).fail_every(3);
        let mut camera = backend.open(0).unwrap();
        let results: Vec<bool> = (0..6).map(|_| camera.read_frame().is_ok()).collect();
        assert_eq!(results, vec![true, true, false, true, true, false]);
    }
}
