use serde::{Deserialize, Serialize};

/// A point normalized to `[0, 1]` of the frame. Image y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Detector's belief that the point is in view. Hand landmarks report 1.0.
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            visibility: 1.0,
        }
    }

    pub fn with_visibility(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }

    pub fn is_visible(&self, min_visibility: f32) -> bool {
        self.visibility >= min_visibility
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(self) -> &'static str {
        match self {
            Handedness::Left => "Left",
            Handedness::Right => "Right",
        }
    }
}

impl std::str::FromStr for Handedness {
    type Err = String;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label {
            "Left" => Ok(Handedness::Left),
            "Right" => Ok(Handedness::Right),
            other => Err(format!("unknown handedness label {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FingerLandmarks {
    pub tip: Landmark,
    /// Middle knuckle.
    pub pip: Landmark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarkSet {
    pub wrist: Landmark,
    /// Index, middle, ring, pinky, in that order.
    pub fingers: [FingerLandmarks; 4],
    pub handedness: Handedness,
    pub confidence: f32,
}

impl HandLandmarkSet {
    pub fn finger(&self, finger: Finger) -> &FingerLandmarks {
        &self.fingers[finger as usize]
    }

    /// A plausible hand at `wrist` with the first `extended` fingers pointing up.
    ///
    /// Used by scripted landmark sources; real detectors build sets from inference output.
    pub fn synthetic(handedness: Handedness, wrist: Landmark, extended: usize) -> Self {
        let mut fingers = [FingerLandmarks {
            tip: wrist,
            pip: wrist,
        }; 4];
        for (i, finger) in fingers.iter_mut().enumerate() {
            let column = wrist.x - 0.03 + 0.02 * i as f32;
            let pip = Landmark::new(column, wrist.y - 0.08);
            let tip = if i < extended {
                Landmark::new(column, pip.y - 0.05)
            } else {
                Landmark::new(column, pip.y + 0.03)
            };
            *finger = FingerLandmarks { tip, pip };
        }
        Self {
            wrist,
            fingers,
            handedness,
            confidence: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseLandmarkSet {
    pub nose: Option<Landmark>,
    pub left_hip: Landmark,
    pub right_hip: Landmark,
    pub left_knee: Landmark,
    pub right_knee: Landmark,
}

impl PoseLandmarkSet {
    /// Standing body centered on `x` with the given knee raise (positive = knee above hip).
    pub fn synthetic(x: f32, left_raise: f32, right_raise: f32) -> Self {
        let hip_y = 0.6;
        Self {
            nose: Some(Landmark::new(x, 0.2)),
            left_hip: Landmark::new(x + 0.04, hip_y),
            right_hip: Landmark::new(x - 0.04, hip_y),
            left_knee: Landmark::new(x + 0.04, hip_y - left_raise),
            right_knee: Landmark::new(x - 0.04, hip_y - right_raise),
        }
    }

    fn landmarks_mut(&mut self) -> impl Iterator<Item = &mut Landmark> {
        self.nose.iter_mut().chain([
            &mut self.left_hip,
            &mut self.right_hip,
            &mut self.left_knee,
            &mut self.right_knee,
        ])
    }

    /// Maps x from a column region `[offset, offset + region_width)` back to full-frame
    /// normalized coordinates. y is unchanged because regions span the full height.
    pub fn into_full_frame(mut self, offset: u32, region_width: u32, full_width: u32) -> Self {
        let offset = offset as f32;
        let region_width = region_width as f32;
        let full_width = full_width as f32;
        for landmark in self.landmarks_mut() {
            landmark.x = (landmark.x * region_width + offset) / full_width;
        }
        self
    }
}

/// What the detector reports for one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detections {
    pub hands: Vec<HandLandmarkSet>,
    pub pose: Option<PoseLandmarkSet>,
}

impl Detections {
    pub fn is_empty(&self) -> bool {
        self.hands.is_empty() && self.pose.is_none()
    }
}
