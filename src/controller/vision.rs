use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::capture::{CaptureBackend, DeviceHandle};
use crate::config::Settings;
use crate::controller::{ControlSelection, Controller};
use crate::error::{ControllerError, HandoffError};
use crate::handoff::{self, Reader};
use crate::landmarks::DetectionStrategy;
use crate::pipeline::{ControlState, FrameProcessor, PlayerSnapshot};
use crate::worker::{DebugFrame, DebugView, FrameWorker, WorkerStatsSnapshot};

/// Gesture controls from a camera.
///
/// Construction opens the camera and starts the frame worker. `process_input` only ever reads the
/// worker's published snapshots, falling back to the last one seen when nothing new arrived.
pub struct VisionController {
    worker: Option<FrameWorker>,
    reader: Reader<PlayerSnapshot>,
    last: PlayerSnapshot,
    reset_generation: Arc<AtomicU64>,
    debug_view: Option<DebugView>,
}

impl VisionController {
    /// Fails with `ResourceUnavailable` when the camera can't be opened or configured. Callers
    /// are expected to fall back to another controller.
    pub fn new(
        settings: &Settings,
        backend: &dyn CaptureBackend,
        mut detection: DetectionStrategy,
    ) -> Result<Self, ControllerError> {
        settings.validate()?;
        detection.configure(&settings.detection)?;

        let device_index = settings.capture.device_index;
        let mut device = backend
            .open(device_index)
            .map_err(|source| ControllerError::ResourceUnavailable {
                device_index,
                source,
            })?;
        if let Err(source) = device.configure(&settings.capture) {
            device.release();
            return Err(ControllerError::ResourceUnavailable {
                device_index,
                source,
            });
        }
        let device = DeviceHandle::new(device);

        let reset_generation = Arc::new(AtomicU64::new(0));
        let debug_view = settings.worker.debug_view.then(|| {
            DebugView::new(
                settings.worker.debug_capacity,
                settings.gestures.jump_y_threshold,
            )
        });
        let (publisher, reader) = handoff::channel();
        let processor = FrameProcessor::new(settings, detection);

        let worker = match FrameWorker::builder(device.clone(), processor, publisher)
            .settings(settings.worker.clone())
            .reset_generation(reset_generation.clone())
            .debug_view(debug_view.clone())
            .spawn()
        {
            Ok(worker) => worker,
            Err(e) => {
                device.release();
                return Err(e);
            }
        };
        info!(
            "Vision controller started on camera {} ({}x{}@{}, worker {})",
            device_index,
            settings.capture.width,
            settings.capture.height,
            settings.capture.fps,
            worker.id()
        );

        Ok(Self {
            worker: Some(worker),
            reader,
            last: PlayerSnapshot::rest(0),
            reset_generation,
            debug_view,
        })
    }

    /// Annotated frames, when the debug view is enabled and the controller is live.
    pub fn subscribe_debug(&self) -> Option<broadcast::Receiver<DebugFrame>> {
        self.debug_view.as_ref().map(DebugView::subscribe)
    }

    pub fn stats(&self) -> WorkerStatsSnapshot {
        self.worker
            .as_ref()
            .map(|worker| worker.stats().snapshot())
            .unwrap_or_default()
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(FrameWorker::is_running)
    }

    /// The snapshot `process_input` last returned controls from.
    pub fn last_snapshot(&self) -> &PlayerSnapshot {
        &self.last
    }
}

impl Controller for VisionController {
    fn kind(&self) -> ControlSelection {
        ControlSelection::Vision
    }

    fn process_input(&mut self) -> ControlState {
        match self.reader.try_take() {
            Ok(snapshot) if snapshot.supersedes(&self.last) => self.last = snapshot,
            Ok(snapshot) => debug!(
                "Discarding stale snapshot #{} (generation {}, current {})",
                snapshot.sequence, snapshot.generation, self.last.generation
            ),
            Err(HandoffError::Empty) | Err(HandoffError::Closed) => {}
        }
        self.last.controls
    }

    fn reset_states(&mut self) {
        let generation = self.reset_generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.reader.drain();
        self.last = PlayerSnapshot {
            sequence: self.last.sequence,
            ..PlayerSnapshot::rest(generation)
        };
        debug!("Control state reset (generation {})", generation);
    }

    fn cleanup(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            let outcome = worker.stop();
            info!("Vision controller cleaned up ({:?})", outcome);
        }
        self.debug_view = None;
    }
}

impl Drop for VisionController {
    fn drop(&mut self) {
        self.cleanup();
    }
}
