use crate::gesture::landmarks::{
    HandFrame, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP, PINKY_TIP, RING_PIP,
    RING_TIP, THUMB_MCP, THUMB_TIP,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FINGER_UP_MARGIN: f32 = 0.03;
pub const DEFAULT_THUMB_OUT_DISTANCE: f32 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    None,
    Drawing,
    Undo,
    ColorChange,
    BrushIncrease,
    BrushDecrease,
    Clear,
    Palm,
}

impl GestureLabel {
    /// Labels that map to a discrete action and therefore need a debounced hold.
    pub fn is_one_shot(self) -> bool {
        matches!(
            self,
            GestureLabel::Undo
                | GestureLabel::ColorChange
                | GestureLabel::BrushIncrease
                | GestureLabel::BrushDecrease
                | GestureLabel::Clear
        )
    }

    pub fn as_label(self) -> &'static str {
        match self {
            GestureLabel::None => "None",
            GestureLabel::Drawing => "Drawing",
            GestureLabel::Undo => "Undo",
            GestureLabel::ColorChange => "ColorChange",
            GestureLabel::BrushIncrease => "BrushIncrease",
            GestureLabel::BrushDecrease => "BrushDecrease",
            GestureLabel::Clear => "Clear",
            GestureLabel::Palm => "Palm",
        }
    }
}

impl std::fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerStates {
    pub thumb_out: bool,
    pub index_up: bool,
    pub middle_up: bool,
    pub ring_up: bool,
    pub pinky_up: bool,
}

impl FingerStates {
    fn all_down(self) -> bool {
        !self.index_up && !self.middle_up && !self.ring_up && !self.pinky_up
    }

    fn all_up(self) -> bool {
        self.index_up && self.middle_up && self.ring_up && self.pinky_up
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureClassifier {
    finger_up_margin: f32,
    thumb_out_distance: f32,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_FINGER_UP_MARGIN, DEFAULT_THUMB_OUT_DISTANCE)
    }
}

impl GestureClassifier {
    pub fn new(finger_up_margin: f32, thumb_out_distance: f32) -> Self {
        Self {
            finger_up_margin,
            thumb_out_distance,
        }
    }

    pub fn finger_states(&self, frame: &HandFrame) -> FingerStates {
        let up = |tip: usize, pip: usize| frame[tip].y < frame[pip].y - self.finger_up_margin;
        FingerStates {
            thumb_out: (frame[THUMB_TIP].x - frame[THUMB_MCP].x).abs() > self.thumb_out_distance,
            index_up: up(INDEX_TIP, INDEX_PIP),
            middle_up: up(MIDDLE_TIP, MIDDLE_PIP),
            ring_up: up(RING_TIP, RING_PIP),
            pinky_up: up(PINKY_TIP, PINKY_PIP),
        }
    }

    pub fn classify(&self, frame: &HandFrame) -> GestureLabel {
        label_for(self.finger_states(frame))
    }
}

/// Rules are checked in priority order and the first match wins. Finger
/// combinations overlap (a fist with the thumb out is both BrushIncrease and
/// Clear), so the order is part of the contract.
pub fn label_for(s: FingerStates) -> GestureLabel {
    if s.index_up && !s.middle_up && !s.ring_up && !s.pinky_up && !s.thumb_out {
        GestureLabel::Drawing
    } else if s.index_up && s.middle_up && !s.ring_up && !s.pinky_up {
        GestureLabel::Undo
    } else if s.index_up && s.middle_up && s.ring_up && !s.pinky_up {
        GestureLabel::ColorChange
    } else if s.thumb_out && s.all_down() {
        GestureLabel::BrushIncrease
    } else if !s.thumb_out && !s.index_up && !s.middle_up && !s.ring_up && s.pinky_up {
        GestureLabel::BrushDecrease
    } else if s.all_down() {
        GestureLabel::Clear
    } else if s.all_up() {
        GestureLabel::Palm
    } else {
        GestureLabel::None
    }
}

pub fn classify(frame: &HandFrame) -> GestureLabel {
    GestureClassifier::default().classify(frame)
}
