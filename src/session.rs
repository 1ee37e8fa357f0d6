//! Per-session drawing state driven one detector frame at a time.
//!
//! Gesture-triggered actions and the UI operations (`undo`, `clear`,
//! `set_color`, `set_brush_size`, ...) go through the same methods.

use crate::draw::gallery::{session_key_for, Gallery, GalleryEntry};
use crate::draw::history::HistoryStack;
use crate::draw::model::{BrushState, PaletteColor};
use crate::draw::stroke::{StrokeEngine, StrokeEvent, StrokeOutcome};
use crate::draw::surface::CanvasSurface;
use crate::gesture::classifier::{GestureClassifier, GestureLabel};
use crate::gesture::landmarks::{FrameResult, HandFrame};
use crate::gesture::smoother::{CursorPosition, PositionSmoother};
use crate::gesture::stabilizer::{GestureStabilizer, StabilizedAction};
use crate::settings::SessionSettings;
use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutcome {
    pub label: GestureLabel,
    pub action: Option<StabilizedAction>,
    pub stroke: StrokeEvent,
}

/// What the presentation layer binds to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    pub active: bool,
    pub label: GestureLabel,
    pub last_action: Option<StabilizedAction>,
    pub brush: BrushState,
    pub cursor: Option<CursorPosition>,
    pub history_len: usize,
    pub history_cursor: Option<usize>,
    pub can_undo: bool,
    pub gallery_len: usize,
    pub frames_processed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeedSnapshot {
    Pending { due: Instant },
    Taken,
}

pub struct DrawingSession {
    settings: SessionSettings,
    classifier: GestureClassifier,
    stabilizer: GestureStabilizer,
    smoother: PositionSmoother,
    stroke: StrokeEngine,
    history: HistoryStack,
    surface: CanvasSurface,
    brush: BrushState,
    gallery: Gallery,
    active: bool,
    seed: SeedSnapshot,
    label: GestureLabel,
    last_action: Option<StabilizedAction>,
    frames_processed: u64,
}

impl DrawingSession {
    pub fn new(settings: SessionSettings, started_at: Instant) -> Self {
        Self::with_session_key(settings, started_at, session_key_for(Local::now()))
    }

    pub fn with_session_key(
        mut settings: SessionSettings,
        started_at: Instant,
        session_key: impl Into<String>,
    ) -> Self {
        settings.sanitize();
        let session_key = session_key.into();
        tracing::info!(
            session = %session_key,
            width = settings.canvas_width,
            height = settings.canvas_height,
            "drawing session started"
        );
        Self {
            classifier: GestureClassifier::new(settings.finger_up_margin, settings.thumb_out_distance),
            stabilizer: GestureStabilizer::new(settings.hold_frames),
            smoother: PositionSmoother::new(settings.smoothing_alpha),
            stroke: StrokeEngine::new(settings.segments_per_snapshot),
            history: HistoryStack::new(),
            surface: CanvasSurface::new(settings.canvas_width, settings.canvas_height),
            brush: BrushState::new(PaletteColor::default(), settings.default_brush_size),
            gallery: Gallery::new(session_key),
            active: true,
            seed: SeedSnapshot::Pending {
                due: started_at + settings.seed_snapshot_delay(),
            },
            label: GestureLabel::None,
            last_action: None,
            frames_processed: 0,
            settings,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn surface(&self) -> &CanvasSurface {
        &self.surface
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn brush(&self) -> BrushState {
        self.brush
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn label(&self) -> GestureLabel {
        self.label
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            active: self.active,
            label: self.label,
            last_action: self.last_action,
            brush: self.brush,
            cursor: self.smoother.current(),
            history_len: self.history.len(),
            history_cursor: self.history.cursor(),
            can_undo: self.history.can_undo(),
            gallery_len: self.gallery.len(),
            frames_processed: self.frames_processed,
        }
    }

    /// Takes the blank baseline snapshot once its delay has elapsed. Returns
    /// true on the call that took it.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.seed {
            SeedSnapshot::Pending { due } if now >= due => {
                self.seed = SeedSnapshot::Taken;
                self.snapshot("seed");
                true
            }
            _ => false,
        }
    }

    pub fn on_frame(&mut self, frame: &FrameResult) -> FrameOutcome {
        self.frames_processed = self.frames_processed.saturating_add(1);
        match frame.hand_frame() {
            Some(hand) if self.active => self.on_hand(hand),
            _ => self.on_missing_hand(),
        }
    }

    fn on_hand(&mut self, hand: &HandFrame) -> FrameOutcome {
        let label = self.classifier.classify(hand);
        self.label = label;

        let raw = self.raw_cursor(hand);
        let cursor = self.smoother.update(raw);
        let action = self.stabilizer.update(label);
        let stroke = self
            .stroke
            .on_frame(cursor, label, &self.brush, &mut self.surface);
        self.finish_stroke_outcome(stroke);

        if let Some(action) = action {
            self.last_action = Some(action);
            if label.is_one_shot() {
                tracing::debug!(gesture = %action.label, held_frames = action.held_frames, "gesture committed");
                self.apply_gesture(action.label);
            }
        }

        FrameOutcome {
            label,
            action,
            stroke: stroke.event,
        }
    }

    fn on_missing_hand(&mut self) -> FrameOutcome {
        self.label = GestureLabel::None;
        self.stabilizer.reset();
        let stroke = self.stroke.on_frame(
            CursorPosition::default(),
            GestureLabel::None,
            &self.brush,
            &mut self.surface,
        );
        self.finish_stroke_outcome(stroke);
        self.smoother.reset();
        FrameOutcome {
            label: GestureLabel::None,
            action: None,
            stroke: stroke.event,
        }
    }

    fn finish_stroke_outcome(&mut self, outcome: StrokeOutcome) {
        if outcome.snapshot_requested {
            self.snapshot("stroke");
        }
        if outcome.event == StrokeEvent::Ended {
            self.smoother.reset();
        }
    }

    fn raw_cursor(&self, hand: &HandFrame) -> CursorPosition {
        let tip = hand.index_tip();
        let width = self.surface.width() as f32;
        let height = self.surface.height() as f32;
        let x = if self.settings.mirror_x {
            (1.0 - tip.x) * width
        } else {
            tip.x * width
        };
        CursorPosition::new(x, tip.y * height)
    }

    fn apply_gesture(&mut self, label: GestureLabel) {
        let step = self.settings.brush_step as i32;
        match label {
            GestureLabel::Clear => self.clear(),
            GestureLabel::Undo => {
                self.undo();
            }
            GestureLabel::ColorChange => {
                self.cycle_color();
            }
            GestureLabel::BrushIncrease => {
                self.adjust_brush_size(step);
            }
            GestureLabel::BrushDecrease => {
                self.adjust_brush_size(-step);
            }
            GestureLabel::None | GestureLabel::Drawing | GestureLabel::Palm => {}
        }
    }

    fn lift_pen(&mut self) {
        self.stroke.reset();
        self.smoother.reset();
    }

    fn snapshot(&mut self, reason: &str) {
        match self.history.snapshot(&self.surface) {
            Ok(index) => tracing::debug!(reason, index, "history snapshot"),
            Err(err) => tracing::warn!(reason, "history snapshot skipped: {err:#}"),
        }
    }

    /// Steps back one committed state. Returns whether the canvas changed.
    pub fn undo(&mut self) -> bool {
        self.lift_pen();
        match self.history.undo(&mut self.surface) {
            Ok(changed) => changed,
            Err(err) => {
                tracing::warn!("undo skipped: {err:#}");
                false
            }
        }
    }

    pub fn clear(&mut self) {
        self.surface.clear();
        self.lift_pen();
        self.snapshot("clear");
    }

    pub fn set_color(&mut self, color: PaletteColor) {
        self.brush.color = color;
        self.lift_pen();
        tracing::debug!(color = color.name(), "brush color set");
    }

    /// Advances one palette step, wrapping after the last color.
    pub fn cycle_color(&mut self) -> PaletteColor {
        let next = self.brush.cycle_color();
        self.lift_pen();
        tracing::debug!(color = next.name(), "brush color cycled");
        next
    }

    pub fn set_brush_size(&mut self, size: u32) -> u32 {
        let size = self.brush.set_size(size);
        self.lift_pen();
        size
    }

    pub fn adjust_brush_size(&mut self, delta: i32) -> u32 {
        let size = self.brush.adjust_size(delta);
        self.lift_pen();
        size
    }

    /// Pauses or resumes gesture input. Paused frames count as "no hand".
    pub fn set_active(&mut self, active: bool) {
        if self.active == active {
            return;
        }
        self.active = active;
        if !active {
            self.on_missing_hand();
        }
        tracing::info!(active, "gesture input toggled");
    }

    pub fn export_snapshot(&mut self) -> Result<&GalleryEntry> {
        self.gallery.export(&self.surface, Local::now())?;
        let entries = self.gallery.len();
        tracing::info!(entries, "canvas exported to gallery");
        Ok(&self.gallery.entries()[entries - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::synthetic::PoseBuilder;
    use std::time::Duration;

    fn small_session() -> (DrawingSession, Instant) {
        let started = Instant::now();
        let settings = SessionSettings {
            canvas_width: 200,
            canvas_height: 100,
            ..SessionSettings::default()
        };
        (DrawingSession::with_session_key(settings, started, "test"), started)
    }

    fn frame(pose: PoseBuilder) -> FrameResult {
        FrameResult::hand(pose.build())
    }

    #[test]
    fn seed_snapshot_waits_for_delay_and_fires_once() {
        let (mut session, started) = small_session();
        assert!(!session.tick(started + Duration::from_millis(499)));
        assert!(session.history().is_empty());
        assert!(session.tick(started + Duration::from_millis(500)));
        assert!(!session.tick(started + Duration::from_secs(5)));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn mirrored_cursor_flips_x() {
        let (mut session, _) = small_session();
        session.on_frame(&frame(PoseBuilder::pointing().index_tip_at(0.25, 0.5)));
        let cursor = session.status().cursor.expect("cursor");
        assert!((cursor.x - 150.0).abs() < 0.01);
        assert!((cursor.y - 50.0).abs() < 0.01);
    }

    #[test]
    fn missing_hand_ends_stroke_with_snapshot_and_resets_cursor() {
        let (mut session, _) = small_session();
        session.on_frame(&frame(PoseBuilder::pointing().index_tip_at(0.5, 0.5)));
        session.on_frame(&frame(PoseBuilder::pointing().index_tip_at(0.4, 0.5)));
        let outcome = session.on_frame(&FrameResult::missing());
        assert_eq!(outcome.stroke, StrokeEvent::Ended);
        assert_eq!(outcome.label, GestureLabel::None);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.status().cursor, None);
    }

    #[test]
    fn paused_session_ignores_hands() {
        let (mut session, _) = small_session();
        session.set_active(false);
        let outcome = session.on_frame(&frame(PoseBuilder::pointing()));
        assert_eq!(outcome.label, GestureLabel::None);
        assert!(session.surface().is_blank());

        session.set_active(true);
        let outcome = session.on_frame(&frame(PoseBuilder::pointing()));
        assert_eq!(outcome.stroke, StrokeEvent::Dot);
    }

    #[test]
    fn manual_and_gesture_clear_share_behavior() {
        let (mut session, started) = small_session();
        session.tick(started + Duration::from_secs(1));
        session.on_frame(&frame(PoseBuilder::pointing()));
        assert!(!session.surface().is_blank());

        assert!(!session.status().can_undo);
        session.clear();
        assert!(session.surface().is_blank());
        assert_eq!(session.history().len(), 2);
        assert!(session.status().can_undo);

        session.on_frame(&frame(PoseBuilder::pointing()));
        for _ in 0..15 {
            session.on_frame(&frame(PoseBuilder::fist()));
        }
        assert!(session.surface().is_blank());
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn export_does_not_touch_history() {
        let (mut session, _) = small_session();
        session.on_frame(&frame(PoseBuilder::pointing()));
        session.export_snapshot().expect("export");
        assert_eq!(session.gallery().len(), 1);
        assert!(session.history().is_empty());
    }
}
