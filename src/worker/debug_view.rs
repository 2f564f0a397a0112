use std::sync::Arc;

use image::{Rgb, RgbImage};
use tokio::sync::broadcast;

use crate::common::PlayerSlot;
use crate::landmarks::strategy::FrameDetections;
use crate::pipeline::{PlayerSnapshot, ProcessedFrame};

const SPLIT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const DOT_RADIUS: i64 = 3;

fn player_color(player: PlayerSlot) -> Rgb<u8> {
    match player {
        PlayerSlot::One => Rgb([0, 255, 0]),
        PlayerSlot::Two => Rgb([255, 0, 0]),
    }
}

/// An annotated copy of a processed frame, for humans tuning the gestures.
#[derive(Clone)]
pub struct DebugFrame {
    pub image: Arc<RgbImage>,
    pub snapshot: PlayerSnapshot,
}

/// Publishes debug frames to any subscribers. Never blocks and never fails the pipeline:
/// with nobody listening nothing is rendered, and slow listeners just lag.
#[derive(Clone)]
pub struct DebugView {
    tx: broadcast::Sender<DebugFrame>,
    jump_y_threshold: f32,
}

impl DebugView {
    pub fn new(capacity: usize, jump_y_threshold: f32) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            jump_y_threshold,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DebugFrame> {
        self.tx.subscribe()
    }

    pub fn publish(&self, processed: &ProcessedFrame) {
        if self.tx.receiver_count() == 0 {
            return;
        }
        let image = annotate(
            &processed.frame.image().to_rgb8(),
            &processed.detections,
            self.jump_y_threshold,
        );
        let _ = self.tx.send(DebugFrame {
            image: Arc::new(image),
            snapshot: processed.snapshot.clone(),
        });
    }
}

/// Center split line, each half's jump threshold, and a dot on every detected wrist.
pub fn annotate(source: &RgbImage, detections: &FrameDetections, jump_y_threshold: f32) -> RgbImage {
    let mut image = source.clone();
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image;
    }
    let center_x = width / 2;

    for y in 0..height {
        for x in center_x.saturating_sub(1)..(center_x + 1).min(width) {
            image.put_pixel(x, y, SPLIT_COLOR);
        }
    }

    let threshold_y = ((height as f32 * jump_y_threshold) as u32).min(height - 1);
    for x in 0..width {
        let player = PlayerSlot::from_pixel_x(i64::from(x), width);
        image.put_pixel(x, threshold_y, player_color(player));
    }

    for hand in &detections.hands {
        let cx = (hand.wrist.x * width as f32) as i64;
        let cy = (hand.wrist.y * height as f32) as i64;
        let color = player_color(PlayerSlot::from_pixel_x(cx, width));
        for dy in -DOT_RADIUS..=DOT_RADIUS {
            for dx in -DOT_RADIUS..=DOT_RADIUS {
                let (px, py) = (cx + dx, cy + dy);
                if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                    image.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
    image
}
