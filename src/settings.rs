use crate::draw::model::{clamp_brush_size, DEFAULT_BRUSH_SIZE};
use crate::draw::stroke::DEFAULT_SEGMENTS_PER_SNAPSHOT;
use crate::draw::surface::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::gesture::classifier::{DEFAULT_FINGER_UP_MARGIN, DEFAULT_THUMB_OUT_DISTANCE};
use crate::gesture::smoother::DEFAULT_SMOOTHING_ALPHA;
use crate::gesture::stabilizer::DEFAULT_HOLD_FRAMES;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const SETTINGS_FILE_NAME: &str = "gesture_canvas.json";
const MAX_CANVAS_EDGE: u32 = 8192;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,
    /// Flip x so the canvas behaves like a mirror of the selfie camera.
    #[serde(default = "default_mirror_x")]
    pub mirror_x: bool,
    #[serde(default = "default_smoothing_alpha")]
    pub smoothing_alpha: f32,
    #[serde(default = "default_finger_up_margin")]
    pub finger_up_margin: f32,
    #[serde(default = "default_thumb_out_distance")]
    pub thumb_out_distance: f32,
    #[serde(default = "default_hold_frames")]
    pub hold_frames: u32,
    #[serde(default = "default_segments_per_snapshot")]
    pub segments_per_snapshot: u32,
    #[serde(default = "default_seed_snapshot_delay_ms")]
    pub seed_snapshot_delay_ms: u64,
    #[serde(default = "default_brush_size")]
    pub default_brush_size: u32,
    #[serde(default = "default_brush_step")]
    pub brush_step: u32,
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_canvas_width() -> u32 {
    DEFAULT_CANVAS_WIDTH
}

fn default_canvas_height() -> u32 {
    DEFAULT_CANVAS_HEIGHT
}

fn default_mirror_x() -> bool {
    true
}

fn default_smoothing_alpha() -> f32 {
    DEFAULT_SMOOTHING_ALPHA
}

fn default_finger_up_margin() -> f32 {
    DEFAULT_FINGER_UP_MARGIN
}

fn default_thumb_out_distance() -> f32 {
    DEFAULT_THUMB_OUT_DISTANCE
}

fn default_hold_frames() -> u32 {
    DEFAULT_HOLD_FRAMES
}

fn default_segments_per_snapshot() -> u32 {
    DEFAULT_SEGMENTS_PER_SNAPSHOT
}

fn default_seed_snapshot_delay_ms() -> u64 {
    500
}

fn default_brush_size() -> u32 {
    DEFAULT_BRUSH_SIZE
}

fn default_brush_step() -> u32 {
    2
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            mirror_x: default_mirror_x(),
            smoothing_alpha: default_smoothing_alpha(),
            finger_up_margin: default_finger_up_margin(),
            thumb_out_distance: default_thumb_out_distance(),
            hold_frames: default_hold_frames(),
            segments_per_snapshot: default_segments_per_snapshot(),
            seed_snapshot_delay_ms: default_seed_snapshot_delay_ms(),
            default_brush_size: default_brush_size(),
            brush_step: default_brush_step(),
            debug_logging: false,
        }
    }
}

impl SessionSettings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read settings file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut settings: Self = serde_json::from_str(&content)
            .with_context(|| format!("deserialize settings file {}", path.display()))?;
        if settings.sanitize() {
            tracing::warn!("settings file {} had out-of-range values; clamped", path.display());
        }
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create settings parent folder {}", parent.display()))?;
        }
        let mut sanitized = self.clone();
        sanitized.sanitize();
        let json = serde_json::to_string_pretty(&sanitized).context("serialize settings")?;
        std::fs::write(path, json).with_context(|| format!("write settings file {}", path.display()))
    }

    /// Pulls every field into its usable range. Returns whether anything changed.
    pub fn sanitize(&mut self) -> bool {
        let before = self.clone();

        self.canvas_width = self.canvas_width.clamp(1, MAX_CANVAS_EDGE);
        self.canvas_height = self.canvas_height.clamp(1, MAX_CANVAS_EDGE);
        if !(self.smoothing_alpha > 0.0 && self.smoothing_alpha <= 1.0) {
            self.smoothing_alpha = default_smoothing_alpha();
        }
        if !self.finger_up_margin.is_finite() || self.finger_up_margin < 0.0 {
            self.finger_up_margin = default_finger_up_margin();
        }
        if !self.thumb_out_distance.is_finite() || self.thumb_out_distance < 0.0 {
            self.thumb_out_distance = default_thumb_out_distance();
        }
        self.hold_frames = self.hold_frames.max(1);
        self.segments_per_snapshot = self.segments_per_snapshot.max(1);
        self.default_brush_size = clamp_brush_size(self.default_brush_size);
        self.brush_step = self.brush_step.max(1);

        *self != before
    }

    pub fn seed_snapshot_delay(&self) -> Duration {
        Duration::from_millis(self.seed_snapshot_delay_ms)
    }
}
