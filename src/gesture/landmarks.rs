use serde::{Deserialize, Serialize};

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_MCP: usize = 2;
pub const THUMB_TIP: usize = 4;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// One tracked hand point. `x`/`y` are normalized image coordinates with `y`
/// growing downwards; `z` is depth relative to the wrist.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    WrongLandmarkCount { found: usize },
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::WrongLandmarkCount { found } => write!(
                f,
                "expected {LANDMARK_COUNT} hand landmarks, found {found}"
            ),
        }
    }
}

impl std::error::Error for FrameError {}

/// A single hand: always exactly [`LANDMARK_COUNT`] points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct HandFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandFrame {
    pub fn from_points(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<Landmark> {
        self.points.get(index).copied()
    }

    pub fn index_tip(&self) -> Landmark {
        self.points[INDEX_TIP]
    }

    /// Returns a copy with every point shifted by `(dx, dy)` in normalized
    /// space. Finger relations are preserved.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        let mut points = self.points;
        for point in &mut points {
            point.x += dx;
            point.y += dy;
        }
        Self { points }
    }
}

impl std::ops::Index<usize> for HandFrame {
    type Output = Landmark;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl TryFrom<Vec<Landmark>> for HandFrame {
    type Error = FrameError;

    fn try_from(value: Vec<Landmark>) -> Result<Self, Self::Error> {
        let found = value.len();
        let points: [Landmark; LANDMARK_COUNT] = value
            .try_into()
            .map_err(|_| FrameError::WrongLandmarkCount { found })?;
        Ok(Self { points })
    }
}

impl From<HandFrame> for Vec<Landmark> {
    fn from(value: HandFrame) -> Self {
        value.points.to_vec()
    }
}

/// What the detector delivers for one video frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameResult {
    #[serde(default)]
    pub present: bool,
    #[serde(default)]
    pub landmarks: Option<HandFrame>,
}

impl FrameResult {
    pub fn hand(frame: HandFrame) -> Self {
        Self {
            present: true,
            landmarks: Some(frame),
        }
    }

    pub fn missing() -> Self {
        Self::default()
    }

    /// The detected hand, if any. `present = false` wins over stray landmarks.
    pub fn hand_frame(&self) -> Option<&HandFrame> {
        if self.present {
            self.landmarks.as_ref()
        } else {
            None
        }
    }
}
