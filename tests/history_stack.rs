use gesture_canvas::draw::{CanvasSurface, Color, HistoryStack, Snapshot};
use gesture_canvas::gesture::CursorPosition;

fn dab(surface: &mut CanvasSurface, x: f32) {
    surface.fill_circle(CursorPosition::new(x, 8.0), 2.0, Color::rgb(10, 20, 30));
}

#[test]
fn snapshot_then_undo_steps_back_one_state() {
    let mut surface = CanvasSurface::new(32, 16);
    let mut history = HistoryStack::new();
    history.snapshot(&surface).unwrap();
    dab(&mut surface, 5.0);
    history.snapshot(&surface).unwrap();
    let one_dab = surface.clone();
    dab(&mut surface, 20.0);
    history.snapshot(&surface).unwrap();

    assert!(history.undo(&mut surface).unwrap());
    assert_eq!(surface, one_dab);
    assert!(history.undo(&mut surface).unwrap());
    assert!(surface.is_blank());
    assert!(!history.undo(&mut surface).unwrap());
    assert_eq!(history.cursor(), Some(0));
}

#[test]
fn undo_on_empty_history_is_noop() {
    let mut surface = CanvasSurface::new(4, 4);
    dab(&mut surface, 1.0);
    let before = surface.clone();
    let mut history = HistoryStack::new();
    assert!(!history.undo(&mut surface).unwrap());
    assert_eq!(surface, before);
}

#[test]
fn branching_after_undo_truncates_future() {
    let mut surface = CanvasSurface::new(32, 16);
    let mut history = HistoryStack::new();
    for x in [2.0, 10.0, 18.0, 26.0] {
        dab(&mut surface, x);
        history.snapshot(&surface).unwrap();
    }
    history.undo(&mut surface).unwrap();
    history.undo(&mut surface).unwrap();
    assert_eq!(history.cursor(), Some(1));

    dab(&mut surface, 30.0);
    assert_eq!(history.snapshot(&surface).unwrap(), 2);
    assert_eq!(history.len(), 3);
    assert!(history.current().is_some());
}

#[test]
fn unreadable_snapshot_leaves_state_untouched() {
    let mut surface = CanvasSurface::new(8, 8);
    let mut history = HistoryStack::new();
    history.push(Snapshot::from_png(b"garbage".to_vec()));
    dab(&mut surface, 4.0);
    history.snapshot(&surface).unwrap();
    let before = surface.clone();

    assert!(history.undo(&mut surface).is_err());
    assert_eq!(surface, before);
    assert_eq!(history.cursor(), Some(1));
}
