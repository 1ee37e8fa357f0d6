use serde::{Deserialize, Serialize};

pub const DEFAULT_SMOOTHING_ALPHA: f32 = 0.15;

/// Smoothed fingertip position in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: f32,
    pub y: f32,
}

impl CursorPosition {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for CursorPosition {
    fn from(value: (f32, f32)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// Exponential moving average over fingertip samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSmoother {
    alpha: f32,
    current: Option<CursorPosition>,
}

impl Default for PositionSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_ALPHA)
    }
}

impl PositionSmoother {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(f32::EPSILON, 1.0),
            current: None,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn current(&self) -> Option<CursorPosition> {
        self.current
    }

    pub fn update(&mut self, raw: CursorPosition) -> CursorPosition {
        let next = match self.current {
            None => raw,
            Some(prev) => CursorPosition {
                x: self.alpha * raw.x + (1.0 - self.alpha) * prev.x,
                y: self.alpha * raw.y + (1.0 - self.alpha) * prev.y,
            },
        };
        self.current = Some(next);
        next
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}
