use std::path::PathBuf;
use std::time::Duration;

use head_soccer_control::capture::SyntheticCameraBackend;
use head_soccer_control::config::PoseStrategy;
use head_soccer_control::controller::select;
use head_soccer_control::landmarks::{
    DetectionStrategy, Detections, HandLandmarkSet, Handedness, Landmark, PoseLandmarkSet,
    ScriptedLandmarkSource,
};
use head_soccer_control::{
    ActiveController, ControlSelection, ControlState, Controller, ControllerError, KeyboardInput,
    Settings,
};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const GAME_TICK: Duration = Duration::from_millis(16);
const DEMO_TICKS: u64 = 600;
const GOAL_EVERY_TICKS: u64 = 240;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Both players waving through a short routine, standing in for a hand/pose model.
fn demo_source() -> ScriptedLandmarkSource {
    let running_left = Detections {
        hands: vec![HandLandmarkSet::synthetic(
            Handedness::Right,
            Landmark::new(0.2, 0.7),
            0,
        )],
        pose: None,
    };
    let jumping = Detections {
        hands: vec![
            HandLandmarkSet::synthetic(Handedness::Right, Landmark::new(0.2, 0.7), 2),
            HandLandmarkSet::synthetic(Handedness::Left, Landmark::new(0.35, 0.2), 0),
        ],
        pose: None,
    };
    let kicking = Detections {
        hands: vec![HandLandmarkSet::synthetic(
            Handedness::Right,
            Landmark::new(0.8, 0.7),
            4,
        )],
        pose: Some(PoseLandmarkSet::synthetic(0.75, 0.3, 0.0)),
    };

    ScriptedLandmarkSource::new()
        .push_repeated(running_left, 30)
        .push_repeated(jumping, 30)
        .push_repeated(kicking, 30)
        .push_repeated(Detections::default(), 30)
        .looping(true)
}

fn demo_detection(settings: &Settings) -> DetectionStrategy {
    match settings.detection.strategy {
        PoseStrategy::Shared => DetectionStrategy::shared(demo_source()),
        PoseStrategy::SplitFrame => DetectionStrategy::split_frame(
            demo_source(),
            ScriptedLandmarkSource::new(),
            ScriptedLandmarkSource::new(),
        ),
    }
}

/// Polls the controller once per tick, logging every change, with a simulated goal every
/// `GOAL_EVERY_TICKS`. Returns the last state polled.
async fn drive(
    controller: &mut impl Controller,
    tick_interval: Duration,
    ticks: u64,
    cancel_token: CancellationToken,
) -> ControlState {
    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = ControlState::rest();
    for tick in 1..=ticks {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let state = controller.process_input();
        if state != last {
            match serde_json::to_string(&state) {
                Ok(json) => info!("tick {:>4}: {}", tick, json),
                Err(e) => warn!("Could not serialize controls: {}", e),
            }
        }
        last = state;

        if tick % GOAL_EVERY_TICKS == 0 {
            info!("Goal! Resetting controls");
            controller.reset_states();
        }
    }
    last
}

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    init_logging();

    let mut args = std::env::args().skip(1);
    let selection = match args.next() {
        Some(arg) => arg.parse().unwrap_or_else(|e| {
            warn!("{}, using vision", e);
            ControlSelection::Vision
        }),
        None => ControlSelection::Vision,
    };
    let config_path = args.next().map(PathBuf::from);
    let settings = Settings::load(config_path.as_deref())?;

    let backend = SyntheticCameraBackend::new(settings.capture.width, settings.capture.height);
    let keyboard = KeyboardInput::default();
    let mut controller = ActiveController::new(select(
        selection,
        &settings,
        &backend,
        || demo_detection(&settings),
        keyboard.clone(),
    ));
    info!("Driving the game with {} controls", controller.kind());

    let cancel_token = CancellationToken::new();
    let interrupt = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted");
            interrupt.cancel();
        }
    });

    drive(&mut controller, GAME_TICK, DEMO_TICKS, cancel_token).await;

    controller.cleanup();
    info!("Demo finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use head_soccer_control::capture::CaptureBackend;
    use head_soccer_control::common::PlayerSlot;
    use head_soccer_control::controller::Key;
    use head_soccer_control::{JumpState, KeyboardController};

    #[tokio::test]
    async fn drive_reports_held_keys() {
        let mut controller = KeyboardController::new();
        controller.input().key_down(Key::Up);

        let last = drive(
            &mut controller,
            Duration::from_millis(1),
            5,
            CancellationToken::new(),
        )
        .await;

        assert_eq!(last.get(PlayerSlot::Two).jump, JumpState::Jumping);
    }

    #[tokio::test]
    async fn drive_stops_when_cancelled() {
        let mut controller = KeyboardController::new();
        controller.input().key_down(Key::A);
        let cancel_token = CancellationToken::new();
        cancel_token.cancel();

        let last = drive(&mut controller, Duration::from_secs(1), 1000, cancel_token).await;

        assert!(last.is_at_rest());
    }

    #[test]
    fn demo_detection_follows_pose_strategy() {
        let mut settings = Settings::default();
        settings.detection.strategy = PoseStrategy::SplitFrame;
        let mut detection = demo_detection(&settings);
        assert_eq!(detection.kind(), PoseStrategy::SplitFrame);

        let mut camera = SyntheticCameraBackend::new(64, 48).open(0).unwrap();
        let frame = camera.read_frame().unwrap();
        let detections = detection.detect(&frame).unwrap();
        assert_eq!(detections.hands.len(), 1);
        assert!(detections.poses.is_empty());
    }
}
