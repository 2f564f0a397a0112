use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::capture::{DeviceHandle, ReleaseOutcome};
use crate::config::WorkerSettings;
use crate::error::{CaptureError, ControllerError};
use crate::handoff::Publisher;
use crate::pipeline::{FrameProcessor, PlayerSnapshot};
use crate::worker::debug_view::DebugView;
use crate::worker::stats::WorkerStats;

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Joined,
    /// The thread didn't exit in time and was detached.
    TimedOut,
    AlreadyStopped,
}

/// Background thread that owns the camera and turns frames into snapshots.
///
/// It runs at a fixed cadence until stopped. Capture misses and per-frame failures are logged
/// and skipped; nothing short of `stop` ends the loop.
pub struct FrameWorker {
    id: Uuid,
    cancel_token: CancellationToken,
    worker_thread: Option<JoinHandle<()>>,
    device: DeviceHandle,
    join_timeout: Duration,
    stats: Arc<WorkerStats>,
}

impl FrameWorker {
    pub fn builder(
        device: DeviceHandle,
        processor: FrameProcessor,
        publisher: Publisher<PlayerSnapshot>,
    ) -> FrameWorkerBuilder {
        FrameWorkerBuilder {
            device,
            processor,
            publisher,
            settings: WorkerSettings::default(),
            reset_generation: Arc::new(AtomicU64::new(0)),
            debug_view: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stats(&self) -> Arc<WorkerStats> {
        self.stats.clone()
    }

    pub fn is_running(&self) -> bool {
        self.worker_thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Signals the loop, waits up to the join timeout, then makes sure the camera is released.
    ///
    /// If the thread is stuck in a device read past the timeout it is detached; the release then
    /// happens when that read returns.
    pub fn stop(&mut self) -> StopOutcome {
        self.cancel_token.cancel();
        let Some(thread) = self.worker_thread.take() else {
            return StopOutcome::AlreadyStopped;
        };

        let deadline = Instant::now() + self.join_timeout;
        while !thread.is_finished() && Instant::now() < deadline {
            std::thread::sleep(JOIN_POLL_INTERVAL);
        }

        let outcome = if thread.is_finished() {
            if thread.join().is_err() {
                error!("Frame worker {} panicked", self.id);
            }
            StopOutcome::Joined
        } else {
            warn!(
                "Frame worker {} did not stop within {:?}, detaching",
                self.id, self.join_timeout
            );
            StopOutcome::TimedOut
        };

        match self.device.try_release() {
            ReleaseOutcome::Released | ReleaseOutcome::AlreadyReleased => {}
            ReleaseOutcome::Busy => {
                warn!("Frame worker {} still holds the camera", self.id);
            }
        }
        outcome
    }
}

impl Drop for FrameWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct FrameWorkerBuilder {
    device: DeviceHandle,
    processor: FrameProcessor,
    publisher: Publisher<PlayerSnapshot>,
    settings: WorkerSettings,
    reset_generation: Arc<AtomicU64>,
    debug_view: Option<DebugView>,
}

impl FrameWorkerBuilder {
    // Overrides cadence and join timeout.
    pub fn settings(mut self, settings: WorkerSettings) -> Self {
        self.settings = settings;
        self
    }

    // Generation counter bumped by the consumer to request a reset.
    pub fn reset_generation(mut self, reset_generation: Arc<AtomicU64>) -> Self {
        self.reset_generation = reset_generation;
        self
    }

    pub fn debug_view(mut self, debug_view: Option<DebugView>) -> Self {
        self.debug_view = debug_view;
        self
    }

    pub fn spawn(self) -> Result<FrameWorker, ControllerError> {
        let id = Uuid::new_v4();
        let cancel_token = CancellationToken::new();
        let stats = Arc::new(WorkerStats::default());
        let mut worker_loop = WorkerLoop {
            id,
            device: self.device.clone(),
            processor: self.processor,
            publisher: self.publisher,
            reset_generation: self.reset_generation,
            debug_view: self.debug_view,
            tick: self.settings.tick_interval(),
            stats: stats.clone(),
        };

        let loop_token = cancel_token.clone();
        let worker_thread = std::thread::Builder::new()
            .name(format!("frame-worker-{}", id.simple()))
            .spawn(move || worker_loop.run(loop_token))
            .map_err(ControllerError::WorkerSpawn)?;

        Ok(FrameWorker {
            id,
            cancel_token,
            worker_thread: Some(worker_thread),
            device: self.device,
            join_timeout: self.settings.join_timeout(),
            stats,
        })
    }
}

struct WorkerLoop {
    id: Uuid,
    device: DeviceHandle,
    processor: FrameProcessor,
    publisher: Publisher<PlayerSnapshot>,
    reset_generation: Arc<AtomicU64>,
    debug_view: Option<DebugView>,
    tick: Duration,
    stats: Arc<WorkerStats>,
}

impl WorkerLoop {
    fn run(&mut self, cancel_token: CancellationToken) {
        info!(
            "Frame worker {} starting at {:.1} Hz",
            self.id,
            1.0 / self.tick.as_secs_f64()
        );

        let mut next_tick = Instant::now();
        while !cancel_token.is_cancelled() {
            if !self.cycle() {
                break;
            }
            next_tick += self.tick;
            let now = Instant::now();
            if next_tick > now {
                std::thread::sleep(next_tick - now);
            } else {
                // Running behind: don't burst to catch up.
                next_tick = now;
            }
        }

        self.device.release();
        let stats = self.stats.snapshot();
        info!(
            "Frame worker {} stopped after {} cycles ({} published, {} skipped reads, {} failed frames)",
            self.id, stats.cycles, stats.published, stats.skipped_reads, stats.failed_frames
        );
    }

    /// One tick. Returns false once the camera is gone for good.
    fn cycle(&mut self) -> bool {
        self.stats.record_cycle();
        self.processor
            .apply_reset(self.reset_generation.load(Ordering::Acquire));

        let frame = match self.device.read_frame() {
            Ok(frame) => frame,
            Err(CaptureError::Released) => {
                info!("Camera released under frame worker {}", self.id);
                return false;
            }
            Err(e) => {
                debug!("No frame this tick: {}", e);
                self.stats.record_skipped_read();
                return true;
            }
        };

        let processor = &mut self.processor;
        match panic::catch_unwind(AssertUnwindSafe(|| processor.process(&frame))) {
            Ok(Ok(processed)) => {
                self.publisher.publish(processed.snapshot.clone());
                self.stats.record_published();
                if let Some(debug_view) = &self.debug_view {
                    debug_view.publish(&processed);
                }
            }
            Ok(Err(e)) => {
                warn!("Frame {} dropped: {}", frame.frame_id(), e);
                self.stats.record_failed_frame();
            }
            Err(_) => {
                error!("Frame {} processing panicked, skipping", frame.frame_id());
                self.stats.record_failed_frame();
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureBackend, SyntheticCameraBackend};
    use crate::config::Settings;
    use crate::handoff;
    use crate::landmarks::{
        DetectionStrategy, Detections, HandLandmarkSet, Handedness, Landmark,
        ScriptedLandmarkSource,
    };
    use crate::pipeline::Movement;
    use crate::common::PlayerSlot;

    fn wait_for(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
        let end = Instant::now() + deadline;
        while Instant::now() < end {
            if done() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        done()
    }

    fn fast_settings() -> WorkerSettings {
        WorkerSettings {
            target_hz: 500,
            join_timeout_ms: 500,
            ..WorkerSettings::default()
        }
    }

    #[test]
    fn publishes_snapshots_until_stopped() {
        let backend = SyntheticCameraBackend::new(64, 48);
        let device = DeviceHandle::new(backend.open(0).unwrap());
        let open_right_hand = Detections {
            hands: vec![HandLandmarkSet::synthetic(
                Handedness::Right,
                Landmark::new(0.8, 0.7),
                4,
            )],
            pose: None,
        };
        let processor = FrameProcessor::new(
            &Settings::default(),
            DetectionStrategy::shared(ScriptedLandmarkSource::new().idle(open_right_hand)),
        );
        let (publisher, mut reader) = handoff::channel();

        let mut worker = FrameWorker::builder(device, processor, publisher)
            .settings(fast_settings())
            .spawn()
            .unwrap();

        let mut latest = None;
        assert!(wait_for(Duration::from_secs(2), || {
            if let Ok(snapshot) = reader.try_take() {
                latest = Some(snapshot);
            }
            latest.is_some()
        }));
        let snapshot: PlayerSnapshot = latest.unwrap();
        assert_eq!(snapshot.controls.get(PlayerSlot::Two).movement, Movement::Right);

        assert_eq!(worker.stop(), StopOutcome::Joined);
        assert_eq!(worker.stop(), StopOutcome::AlreadyStopped);
        assert!(!worker.is_running());
        assert_eq!(backend.releases(), 1);
    }

    #[test]
    fn survives_capture_and_detection_failures() {
        let backend = SyntheticCameraBackend::new(32, 32).fail_every(2);
        let device = DeviceHandle::new(backend.open(0).unwrap());
        let source = ScriptedLandmarkSource::new()
            .push_error(crate::error::DetectionError::Inference("bad".to_string()))
            .looping(true);
        let processor = FrameProcessor::new(&Settings::default(), DetectionStrategy::shared(source));
        let (publisher, _reader) = handoff::channel();

        let mut worker = FrameWorker::builder(device, processor, publisher)
            .settings(fast_settings())
            .spawn()
            .unwrap();
        let stats = worker.stats();

        assert!(wait_for(Duration::from_secs(2), || {
            let seen = stats.snapshot();
            seen.skipped_reads >= 2 && seen.failed_frames >= 2
        }));
        assert!(worker.is_running());
        assert_eq!(stats.snapshot().published, 0);

        worker.stop();
        assert_eq!(backend.releases(), 1);
    }

    #[test]
    fn stop_times_out_on_blocked_read_and_releases_later() {
        let backend = SyntheticCameraBackend::new(16, 16).read_delay(Duration::from_millis(300));
        let device = DeviceHandle::new(backend.open(0).unwrap());
        let processor = FrameProcessor::new(
            &Settings::default(),
            DetectionStrategy::shared(ScriptedLandmarkSource::new()),
        );
        let (publisher, _reader) = handoff::channel();
        let mut worker = FrameWorker::builder(device, processor, publisher)
            .settings(WorkerSettings {
                join_timeout_ms: 20,
                ..fast_settings()
            })
            .spawn()
            .unwrap();
        std::thread::sleep(Duration::from_millis(50));

        assert_eq!(worker.stop(), StopOutcome::TimedOut);

        assert!(wait_for(Duration::from_secs(2), || backend.releases() == 1));
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(backend.releases(), 1);
    }
}
