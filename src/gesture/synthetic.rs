//! Synthetic hand poses for recordings, benches and tests.

use crate::gesture::landmarks::{
    HandFrame, Landmark, INDEX_PIP, INDEX_TIP, LANDMARK_COUNT, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP,
    PINKY_TIP, RING_PIP, RING_TIP, THUMB_MCP, THUMB_TIP, WRIST,
};

const TIP_RAISE: f32 = 0.15;
const TIP_CURL: f32 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseBuilder {
    thumb_out: bool,
    index_up: bool,
    middle_up: bool,
    ring_up: bool,
    pinky_up: bool,
    depth: f32,
    index_tip: Option<(f32, f32)>,
}

impl PoseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index up, everything else folded: the pen pose.
    pub fn pointing() -> Self {
        Self::new().index(true)
    }

    pub fn fist() -> Self {
        Self::new()
    }

    pub fn open_palm() -> Self {
        Self::new().index(true).middle(true).ring(true).pinky(true)
    }

    pub fn thumb(mut self, out: bool) -> Self {
        self.thumb_out = out;
        self
    }

    pub fn index(mut self, up: bool) -> Self {
        self.index_up = up;
        self
    }

    pub fn middle(mut self, up: bool) -> Self {
        self.middle_up = up;
        self
    }

    pub fn ring(mut self, up: bool) -> Self {
        self.ring_up = up;
        self
    }

    pub fn pinky(mut self, up: bool) -> Self {
        self.pinky_up = up;
        self
    }

    pub fn depth(mut self, z: f32) -> Self {
        self.depth = z;
        self
    }

    /// Moves the whole hand so the index fingertip lands on `(x, y)`.
    pub fn index_tip_at(mut self, x: f32, y: f32) -> Self {
        self.index_tip = Some((x, y));
        self
    }

    pub fn build(&self) -> HandFrame {
        let z = self.depth;
        let mut points = [Landmark::new(0.5, 0.7, z); LANDMARK_COUNT];

        points[WRIST] = Landmark::new(0.5, 0.85, z);
        points[1] = Landmark::new(0.44, 0.78, z);
        points[THUMB_MCP] = Landmark::new(0.40, 0.70, z);
        points[3] = Landmark::new(0.38, 0.66, z);
        points[THUMB_TIP] = if self.thumb_out {
            Landmark::new(0.25, 0.65, z)
        } else {
            Landmark::new(0.44, 0.62, z)
        };

        let fingers = [
            (INDEX_PIP, INDEX_TIP, 0.45, 0.50, self.index_up),
            (MIDDLE_PIP, MIDDLE_TIP, 0.50, 0.48, self.middle_up),
            (RING_PIP, RING_TIP, 0.55, 0.50, self.ring_up),
            (PINKY_PIP, PINKY_TIP, 0.60, 0.53, self.pinky_up),
        ];
        for (pip, tip, x, pip_y, up) in fingers {
            let tip_y = if up { pip_y - TIP_RAISE } else { pip_y + TIP_CURL };
            points[pip - 1] = Landmark::new(x, pip_y + 0.08, z);
            points[pip] = Landmark::new(x, pip_y, z);
            points[tip - 1] = Landmark::new(x, (pip_y + tip_y) * 0.5, z);
            points[tip] = Landmark::new(x, tip_y, z);
        }

        let frame = HandFrame::from_points(points);
        match self.index_tip {
            Some((x, y)) => {
                let tip = frame.index_tip();
                frame.translated(x - tip.x, y - tip.y)
            }
            None => frame,
        }
    }
}
