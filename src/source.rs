//! Landmark delivery and the scoped capture loop around a session.

use crate::gesture::landmarks::FrameResult;
use crate::session::DrawingSession;
use anyhow::{anyhow, Context};
use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The detector could not be started or stopped delivering frames.
    DetectorUnavailable { reason: String },
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::DetectorUnavailable { reason } => {
                write!(f, "hand landmark detector unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for SourceError {}

/// Upstream producer of per-frame detector results. Implementations deliver
/// frames in order, one at a time, until `stop` returns.
pub trait LandmarkSource: Send {
    fn start(&mut self, sender: Sender<FrameResult>) -> anyhow::Result<()>;
    fn stop(&mut self) -> anyhow::Result<()>;
    fn is_running(&self) -> bool;
}

/// Owns a running source and the session it feeds. Dropping it stops the
/// source before the session (and its surface) is released.
pub struct CaptureSession<S: LandmarkSource> {
    source: S,
    receiver: Receiver<FrameResult>,
    session: Option<DrawingSession>,
}

impl<S: LandmarkSource> CaptureSession<S> {
    pub fn start(mut source: S, session: DrawingSession) -> Result<Self, SourceError> {
        let (sender, receiver) = mpsc::channel();
        source
            .start(sender)
            .map_err(|err| SourceError::DetectorUnavailable {
                reason: format!("{err:#}"),
            })?;
        tracing::info!("landmark capture started");
        Ok(Self {
            source,
            receiver,
            session: Some(session),
        })
    }

    pub fn session(&self) -> Option<&DrawingSession> {
        self.session.as_ref()
    }

    /// Feeds every frame that has arrived so far, in order. Returns how many
    /// were processed. A source that hangs up while still marked running is
    /// reported as unavailable.
    pub fn pump(&mut self, now: Instant) -> Result<usize, SourceError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(0);
        };
        session.tick(now);
        let mut processed = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(frame) => {
                    session.on_frame(&frame);
                    processed += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.source.is_running() {
                        tracing::warn!("landmark source hung up while running");
                        return Err(SourceError::DetectorUnavailable {
                            reason: "frame channel disconnected".to_owned(),
                        });
                    }
                    break;
                }
            }
        }
        Ok(processed)
    }

    /// Blocks for the next frame until `timeout`. Returns `Ok(false)` once
    /// the source has finished and every frame has been consumed.
    pub fn pump_blocking(&mut self, timeout: Duration) -> Result<bool, SourceError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(false);
        };
        match self.receiver.recv_timeout(timeout) {
            Ok(frame) => {
                session.tick(Instant::now());
                session.on_frame(&frame);
                Ok(true)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                session.tick(Instant::now());
                Ok(true)
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                if self.source.is_running() {
                    return Err(SourceError::DetectorUnavailable {
                        reason: "frame channel disconnected".to_owned(),
                    });
                }
                Ok(false)
            }
        }
    }

    /// Stops the source and hands the session back.
    pub fn finish(mut self) -> Option<DrawingSession> {
        self.stop_source();
        self.session.take()
    }

    fn stop_source(&mut self) {
        if let Err(err) = self.source.stop() {
            tracing::warn!("failed to stop landmark source: {err:#}");
        }
    }
}

impl<S: LandmarkSource> Drop for CaptureSession<S> {
    fn drop(&mut self) {
        self.stop_source();
        if self.session.take().is_some() {
            tracing::info!("landmark capture stopped; session released");
        }
    }
}

/// Replays recorded frames from a worker thread at a fixed interval.
pub struct ReplaySource {
    frames: Arc<Vec<FrameResult>>,
    frame_interval: Duration,
    stop_flag: Arc<AtomicBool>,
    completed: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ReplaySource {
    pub fn new(frames: Vec<FrameResult>, frame_interval: Duration) -> Self {
        Self {
            frames: Arc::new(frames),
            frame_interval,
            stop_flag: Arc::new(AtomicBool::new(false)),
            completed: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Reads one JSON `FrameResult` per line; blank lines are skipped.
    pub fn from_jsonl_path(path: &Path, frame_interval: Duration) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("open landmark recording {}", path.display()))?;
        let mut frames = Vec::new();
        for (line_no, line) in std::io::BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| format!("read {}", path.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            let frame: FrameResult = serde_json::from_str(&line)
                .with_context(|| format!("parse frame on line {}", line_no + 1))?;
            frames.push(frame);
        }
        Ok(Self::new(frames, frame_interval))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl LandmarkSource for ReplaySource {
    fn start(&mut self, sender: Sender<FrameResult>) -> anyhow::Result<()> {
        if self.worker.is_some() {
            return Err(anyhow!("replay already started"));
        }
        self.stop_flag.store(false, Ordering::SeqCst);
        self.completed.store(false, Ordering::SeqCst);
        let frames = Arc::clone(&self.frames);
        let stop_flag = Arc::clone(&self.stop_flag);
        let completed = Arc::clone(&self.completed);
        let interval = self.frame_interval;
        let worker = std::thread::Builder::new()
            .name("landmark-replay".to_owned())
            .spawn(move || {
                for frame in frames.iter() {
                    if stop_flag.load(Ordering::SeqCst) || sender.send(frame.clone()).is_err() {
                        break;
                    }
                    if !interval.is_zero() {
                        std::thread::sleep(interval);
                    }
                }
                // Set before `sender` drops so the hang-up reads as a clean end.
                completed.store(true, Ordering::SeqCst);
            })
            .context("spawn landmark replay thread")?;
        self.worker = Some(worker);
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            worker
                .join()
                .map_err(|_| anyhow!("landmark replay thread panicked"))?;
        }
        Ok(())
    }

    /// Running until the worker has sent its last frame or been stopped. A
    /// worker that dies mid-recording still reads as running, so its hang-up
    /// is reported as a failure.
    fn is_running(&self) -> bool {
        self.worker.is_some()
            && !self.stop_flag.load(Ordering::SeqCst)
            && !self.completed.load(Ordering::SeqCst)
    }
}

/// Test double: frames are pushed by hand through a [`MockSourceHandle`].
#[derive(Clone)]
pub struct MockLandmarkSource {
    state: Arc<MockSourceState>,
}

#[derive(Default)]
struct MockSourceState {
    start_count: AtomicUsize,
    stop_count: AtomicUsize,
    fail_start: AtomicBool,
    sender: Mutex<Option<Sender<FrameResult>>>,
}

impl MockLandmarkSource {
    pub fn new() -> (Self, MockSourceHandle) {
        let state = Arc::new(MockSourceState::default());
        (
            Self {
                state: Arc::clone(&state),
            },
            MockSourceHandle { state },
        )
    }
}

impl LandmarkSource for MockLandmarkSource {
    fn start(&mut self, sender: Sender<FrameResult>) -> anyhow::Result<()> {
        if self.state.fail_start.load(Ordering::SeqCst) {
            return Err(anyhow!("model failed to load"));
        }
        let mut guard = self.state.sender.lock().map_err(|_| anyhow!("lock"))?;
        if guard.is_none() {
            self.state.start_count.fetch_add(1, Ordering::SeqCst);
            *guard = Some(sender);
        }
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        let mut guard = self.state.sender.lock().map_err(|_| anyhow!("lock"))?;
        if guard.is_some() {
            self.state.stop_count.fetch_add(1, Ordering::SeqCst);
        }
        *guard = None;
        Ok(())
    }

    fn is_running(&self) -> bool {
        match self.state.sender.lock() {
            Ok(guard) => guard.is_some(),
            Err(_) => false,
        }
    }
}

pub struct MockSourceHandle {
    state: Arc<MockSourceState>,
}

impl MockSourceHandle {
    pub fn start_count(&self) -> usize {
        self.state.start_count.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.state.stop_count.load(Ordering::SeqCst)
    }

    pub fn fail_next_start(&self) {
        self.state.fail_start.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        match self.state.sender.lock() {
            Ok(guard) => guard.is_some(),
            Err(_) => false,
        }
    }

    pub fn emit(&self, frame: FrameResult) -> bool {
        match self.state.sender.lock() {
            Ok(guard) => guard
                .as_ref()
                .map(|sender| sender.send(frame).is_ok())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Simulates the detector dying: the channel drops but the source still
    /// claims to be running.
    pub fn sever(&self) {
        if let Ok(mut guard) = self.state.sender.lock() {
            if let Some(sender) = guard.take() {
                drop(sender);
            }
            *guard = Some(mpsc::channel().0);
        }
    }
}
