use crate::gesture::classifier::GestureLabel;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOLD_FRAMES: u32 = 15;

/// A committed gesture. Drawing commits on every frame it is seen; one-shot
/// labels commit once per continuous hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilizedAction {
    pub label: GestureLabel,
    pub held_frames: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureStabilizer {
    hold_frames: u32,
    previous_label: Option<GestureLabel>,
    last_committed: Option<GestureLabel>,
    hold_count: u32,
}

impl Default for GestureStabilizer {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD_FRAMES)
    }
}

impl GestureStabilizer {
    pub fn new(hold_frames: u32) -> Self {
        Self {
            hold_frames: hold_frames.max(1),
            previous_label: None,
            last_committed: None,
            hold_count: 0,
        }
    }

    pub fn hold_frames(&self) -> u32 {
        self.hold_frames
    }

    pub fn hold_count(&self) -> u32 {
        self.hold_count
    }

    pub fn last_committed(&self) -> Option<GestureLabel> {
        self.last_committed
    }

    pub fn update(&mut self, label: GestureLabel) -> Option<StabilizedAction> {
        if self.previous_label != Some(label) {
            self.hold_count = 0;
        }
        self.previous_label = Some(label);

        match label {
            GestureLabel::Drawing => {
                self.last_committed = None;
                self.hold_count = 0;
                Some(StabilizedAction {
                    label,
                    held_frames: 1,
                })
            }
            GestureLabel::None | GestureLabel::Palm => {
                self.last_committed = None;
                None
            }
            _ => {
                self.hold_count = self.hold_count.saturating_add(1);
                if self.hold_count >= self.hold_frames && self.last_committed != Some(label) {
                    let held_frames = self.hold_count;
                    self.last_committed = Some(label);
                    self.hold_count = 0;
                    Some(StabilizedAction { label, held_frames })
                } else {
                    None
                }
            }
        }
    }

    /// Forget everything; the next frame starts a fresh hold.
    pub fn reset(&mut self) {
        self.previous_label = None;
        self.last_committed = None;
        self.hold_count = 0;
    }
}
