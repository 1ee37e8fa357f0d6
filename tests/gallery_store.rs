use gesture_canvas::draw::gallery::{persist, GALLERY_FILE_NAME};
use gesture_canvas::draw::{CanvasSurface, GalleryStore};
use gesture_canvas::gesture::synthetic::PoseBuilder;
use gesture_canvas::gesture::FrameResult;
use gesture_canvas::{DrawingSession, SessionSettings};
use std::time::Instant;
use tempfile::tempdir;

fn small_settings() -> SessionSettings {
    SessionSettings {
        canvas_width: 64,
        canvas_height: 48,
        ..SessionSettings::default()
    }
}

#[test]
fn exported_entries_survive_a_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(GALLERY_FILE_NAME);

    let mut session = DrawingSession::with_session_key(small_settings(), Instant::now(), "session_a");
    session.on_frame(&FrameResult::hand(PoseBuilder::pointing().build()));
    session.export_snapshot().unwrap();
    session.clear();
    session.export_snapshot().unwrap();
    persist(session.gallery(), &path).unwrap();

    let store = GalleryStore::load_from_path(&path).unwrap();
    let entries = store.entries("session_a");
    assert_eq!(entries.len(), 2);

    let mut first = CanvasSurface::new(64, 48);
    first.restore_png(&entries[0].png_bytes().unwrap()).unwrap();
    assert!(!first.is_blank());
    let mut second = CanvasSurface::new(64, 48);
    second.restore_png(&entries[1].png_bytes().unwrap()).unwrap();
    assert!(second.is_blank());
}

#[test]
fn corrupt_gallery_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(GALLERY_FILE_NAME);
    std::fs::write(&path, "[1, 2").unwrap();
    let err = GalleryStore::load_from_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("deserialize gallery file"));
}

#[test]
fn settings_file_drives_session_size() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{ "canvas_width": 40, "canvas_height": 30, "default_brush_size": 99 }"#).unwrap();

    let settings = SessionSettings::load(&path).unwrap();
    assert_eq!(settings.default_brush_size, 20);
    let session = DrawingSession::with_session_key(settings, Instant::now(), "s");
    assert_eq!((session.surface().width(), session.surface().height()), (40, 30));
    assert_eq!(session.brush().size, 20);
}
