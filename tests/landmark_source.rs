use gesture_canvas::gesture::synthetic::PoseBuilder;
use gesture_canvas::gesture::{FrameResult, GestureLabel};
use gesture_canvas::source::{LandmarkSource, MockLandmarkSource, ReplaySource};
use std::sync::mpsc;
use gesture_canvas::{CaptureSession, DrawingSession, SessionSettings, SourceError};
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn session() -> DrawingSession {
    let settings = SessionSettings {
        canvas_width: 80,
        canvas_height: 60,
        seed_snapshot_delay_ms: 60_000,
        ..SessionSettings::default()
    };
    DrawingSession::with_session_key(settings, Instant::now(), "capture")
}

#[test]
fn pump_feeds_frames_in_order() {
    let (source, handle) = MockLandmarkSource::new();
    let mut capture = CaptureSession::start(source, session()).unwrap();
    assert_eq!(handle.start_count(), 1);

    assert!(handle.emit(FrameResult::hand(PoseBuilder::pointing().build())));
    assert!(handle.emit(FrameResult::hand(PoseBuilder::open_palm().build())));
    assert_eq!(capture.pump(Instant::now()).unwrap(), 2);

    let session = capture.session().unwrap();
    assert_eq!(session.label(), GestureLabel::Palm);
    assert_eq!(session.status().frames_processed, 2);
    assert!(!session.surface().is_blank());
    assert_eq!(capture.pump(Instant::now()).unwrap(), 0);
}

#[test]
fn dropping_capture_stops_source() {
    let (source, handle) = MockLandmarkSource::new();
    {
        let _capture = CaptureSession::start(source, session()).unwrap();
        assert!(handle.is_running());
    }
    assert!(!handle.is_running());
    assert_eq!(handle.stop_count(), 1);
    assert!(!handle.emit(FrameResult::missing()));
}

#[test]
fn finish_hands_back_session_and_stops_once() {
    let (source, handle) = MockLandmarkSource::new();
    let mut capture = CaptureSession::start(source, session()).unwrap();
    handle.emit(FrameResult::hand(PoseBuilder::pointing().build()));
    capture.pump(Instant::now()).unwrap();

    let session = capture.finish().unwrap();
    assert_eq!(session.status().frames_processed, 1);
    assert_eq!(handle.stop_count(), 1);
}

#[test]
fn failed_start_is_detector_unavailable() {
    let (source, handle) = MockLandmarkSource::new();
    handle.fail_next_start();
    let err = CaptureSession::start(source, session()).err().unwrap();
    assert!(matches!(err, SourceError::DetectorUnavailable { .. }));
    assert!(err.to_string().contains("model failed to load"));
}

#[test]
fn severed_channel_is_detector_unavailable() {
    let (source, handle) = MockLandmarkSource::new();
    let mut capture = CaptureSession::start(source, session()).unwrap();
    handle.sever();
    let err = capture.pump(Instant::now()).unwrap_err();
    assert!(matches!(err, SourceError::DetectorUnavailable { .. }));
}

#[test]
fn pump_runs_seed_snapshot_when_due() {
    let (source, _handle) = MockLandmarkSource::new();
    let started = Instant::now();
    let settings = SessionSettings::default();
    let mut capture =
        CaptureSession::start(source, DrawingSession::with_session_key(settings, started, "seed")).unwrap();
    capture.pump(started).unwrap();
    assert!(capture.session().unwrap().history().is_empty());
    capture.pump(started + Duration::from_millis(600)).unwrap();
    assert_eq!(capture.session().unwrap().history().len(), 1);
}

#[test]
fn replay_source_delivers_recording() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("frames.jsonl");
    let mut lines = Vec::new();
    for i in 0..10 {
        let pose = PoseBuilder::pointing().index_tip_at(0.3 + i as f32 * 0.01, 0.4);
        lines.push(serde_json::to_string(&FrameResult::hand(pose.build())).unwrap());
    }
    lines.push(String::new());
    lines.push(serde_json::to_string(&FrameResult::missing()).unwrap());
    std::fs::write(&path, lines.join("\n")).unwrap();

    let source = ReplaySource::from_jsonl_path(&path, Duration::ZERO).unwrap();
    assert_eq!(source.len(), 11);
    let mut capture = CaptureSession::start(source, session()).unwrap();
    while capture.pump_blocking(Duration::from_millis(200)).unwrap() {}

    let session = capture.finish().unwrap();
    assert_eq!(session.status().frames_processed, 11);
    assert!(!session.surface().is_blank());
    assert_eq!(session.history().len(), 1, "stroke end snapshot");
}

#[test]
fn replay_rejects_malformed_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("frames.jsonl");
    std::fs::write(&path, "{\"present\":true,\"landmarks\":[]}\n").unwrap();
    let err = ReplaySource::from_jsonl_path(&path, Duration::ZERO).err().unwrap();
    assert!(format!("{err:#}").contains("line 1"));
}

#[test]
fn replay_is_running_until_last_frame_is_sent() {
    let mut source = ReplaySource::new(vec![FrameResult::missing(); 3], Duration::from_millis(50));
    assert!(!source.is_running());

    let (tx, rx) = mpsc::channel();
    source.start(tx).unwrap();
    assert!(source.is_running());

    let mut received = 0;
    while rx.recv().is_ok() {
        received += 1;
    }
    assert_eq!(received, 3);
    assert!(!source.is_running(), "finished replay is a clean end");
    source.stop().unwrap();
    assert!(!source.is_running());
}

#[test]
fn stopped_replay_is_not_running() {
    let mut source = ReplaySource::new(vec![FrameResult::missing(); 50], Duration::from_millis(20));
    let (tx, _rx) = mpsc::channel();
    source.start(tx).unwrap();
    source.stop().unwrap();
    assert!(!source.is_running());
}
