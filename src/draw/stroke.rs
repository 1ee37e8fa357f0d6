use crate::draw::model::BrushState;
use crate::draw::surface::CanvasSurface;
use crate::gesture::classifier::GestureLabel;
use crate::gesture::smoother::CursorPosition;

pub const DEFAULT_SEGMENTS_PER_SNAPSHOT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeEvent {
    Idle,
    /// Pen down: a dot seeding a new stroke.
    Dot,
    Segment,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeOutcome {
    pub event: StrokeEvent,
    pub snapshot_requested: bool,
}

impl StrokeOutcome {
    fn idle() -> Self {
        Self {
            event: StrokeEvent::Idle,
            snapshot_requested: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeEngine {
    segments_per_snapshot: u32,
    last_point: Option<CursorPosition>,
    segments_since_snapshot: u32,
    segments_in_stroke: u32,
}

impl Default for StrokeEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SEGMENTS_PER_SNAPSHOT)
    }
}

impl StrokeEngine {
    pub fn new(segments_per_snapshot: u32) -> Self {
        Self {
            segments_per_snapshot: segments_per_snapshot.max(1),
            last_point: None,
            segments_since_snapshot: 0,
            segments_in_stroke: 0,
        }
    }

    pub fn in_progress(&self) -> bool {
        self.last_point.is_some()
    }

    pub fn last_point(&self) -> Option<CursorPosition> {
        self.last_point
    }

    pub fn segments_in_stroke(&self) -> u32 {
        self.segments_in_stroke
    }

    /// Advances the pen for one frame. `cursor` is the smoothed fingertip; it is
    /// only read while drawing.
    pub fn on_frame(
        &mut self,
        cursor: CursorPosition,
        label: GestureLabel,
        brush: &BrushState,
        surface: &mut CanvasSurface,
    ) -> StrokeOutcome {
        if label != GestureLabel::Drawing {
            return self.leave_drawing(label);
        }

        let color = brush.stroke_color();
        let outcome = match self.last_point {
            None => {
                surface.fill_circle(cursor, brush.size as f32 / 2.0, color);
                StrokeOutcome {
                    event: StrokeEvent::Dot,
                    snapshot_requested: false,
                }
            }
            Some(last) => {
                surface.stroke_segment(last, cursor, brush.size, color);
                self.segments_in_stroke = self.segments_in_stroke.saturating_add(1);
                self.segments_since_snapshot = self.segments_since_snapshot.saturating_add(1);
                let snapshot_requested = self.segments_since_snapshot >= self.segments_per_snapshot;
                if snapshot_requested {
                    self.segments_since_snapshot = 0;
                }
                StrokeOutcome {
                    event: StrokeEvent::Segment,
                    snapshot_requested,
                }
            }
        };
        self.last_point = Some(cursor);
        outcome
    }

    fn leave_drawing(&mut self, label: GestureLabel) -> StrokeOutcome {
        if self.last_point.is_none() {
            return StrokeOutcome::idle();
        }
        self.reset();
        StrokeOutcome {
            event: StrokeEvent::Ended,
            // Clear and Undo snapshot on their own schedule.
            snapshot_requested: !matches!(label, GestureLabel::Clear | GestureLabel::Undo),
        }
    }

    /// Lifts the pen without asking for a snapshot.
    pub fn reset(&mut self) {
        self.last_point = None;
        self.segments_since_snapshot = 0;
        self.segments_in_stroke = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::PaletteColor;

    fn run(engine: &mut StrokeEngine, surface: &mut CanvasSurface, label: GestureLabel, x: f32) -> StrokeOutcome {
        engine.on_frame(
            CursorPosition::new(x, 10.0),
            label,
            &BrushState::new(PaletteColor::Red, 4),
            surface,
        )
    }

    #[test]
    fn first_drawing_frame_plots_a_dot_then_segments() {
        let mut engine = StrokeEngine::default();
        let mut surface = CanvasSurface::new(64, 20);

        assert_eq!(run(&mut engine, &mut surface, GestureLabel::Drawing, 10.0).event, StrokeEvent::Dot);
        assert_eq!(surface.pixel(10, 10), Some(PaletteColor::Red.rgba()));
        assert_eq!(run(&mut engine, &mut surface, GestureLabel::Drawing, 20.0).event, StrokeEvent::Segment);
        assert_eq!(surface.pixel(15, 10), Some(PaletteColor::Red.rgba()));
        assert!(engine.in_progress());
    }

    #[test]
    fn snapshot_requested_every_thirty_segments() {
        let mut engine = StrokeEngine::default();
        let mut surface = CanvasSurface::new(64, 20);
        run(&mut engine, &mut surface, GestureLabel::Drawing, 1.0);
        let requests: Vec<u32> = (1..=65)
            .filter(|i| run(&mut engine, &mut surface, GestureLabel::Drawing, 1.0 + *i as f32 * 0.5).snapshot_requested)
            .collect();
        assert_eq!(requests, vec![30, 60]);
    }

    #[test]
    fn leaving_drawing_requests_snapshot_except_for_clear_and_undo() {
        let mut surface = CanvasSurface::new(64, 20);
        for (label, expected) in [
            (GestureLabel::None, true),
            (GestureLabel::Palm, true),
            (GestureLabel::ColorChange, true),
            (GestureLabel::BrushIncrease, true),
            (GestureLabel::Clear, false),
            (GestureLabel::Undo, false),
        ] {
            let mut engine = StrokeEngine::default();
            run(&mut engine, &mut surface, GestureLabel::Drawing, 5.0);
            let outcome = run(&mut engine, &mut surface, label, 5.0);
            assert_eq!(outcome.event, StrokeEvent::Ended);
            assert_eq!(outcome.snapshot_requested, expected, "{label:?}");
            assert!(!engine.in_progress());
        }
    }

    #[test]
    fn non_drawing_without_stroke_is_idle() {
        let mut engine = StrokeEngine::default();
        let mut surface = CanvasSurface::new(8, 8);
        assert_eq!(run(&mut engine, &mut surface, GestureLabel::None, 1.0), StrokeOutcome::idle());
        assert!(surface.is_blank());
    }

    #[test]
    fn segment_counter_restarts_with_each_stroke() {
        let mut engine = StrokeEngine::default();
        let mut surface = CanvasSurface::new(64, 20);
        run(&mut engine, &mut surface, GestureLabel::Drawing, 1.0);
        for i in 0..20 {
            run(&mut engine, &mut surface, GestureLabel::Drawing, 2.0 + i as f32);
        }
        run(&mut engine, &mut surface, GestureLabel::None, 1.0);
        run(&mut engine, &mut surface, GestureLabel::Drawing, 1.0);
        let early: Vec<bool> = (0..29)
            .map(|i| run(&mut engine, &mut surface, GestureLabel::Drawing, 2.0 + i as f32).snapshot_requested)
            .collect();
        assert!(early.iter().all(|requested| !requested));
        assert!(run(&mut engine, &mut surface, GestureLabel::Drawing, 40.0).snapshot_requested);
    }
}
