use anyhow::{bail, Context};
use clap::Parser;
use gesture_canvas::draw::gallery::{self, GALLERY_FILE_NAME};
use gesture_canvas::settings::{SessionSettings, SETTINGS_FILE_NAME};
use gesture_canvas::source::ReplaySource;
use gesture_canvas::{logging, CaptureSession, DrawingSession};
use std::path::PathBuf;
use std::time::{Duration, Instant};

const FRAME_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Parser, Debug)]
#[command(name = "gesture_canvas", about = "Replay recorded hand landmarks onto a drawing canvas")]
struct CliArgs {
    /// JSON-lines recording, one frame result per line.
    recording: PathBuf,
    /// Settings file; defaults are used when it is missing.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Gallery file that exported drawings are merged into.
    #[arg(long)]
    gallery: Option<PathBuf>,
    /// Write the final canvas to this PNG.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Export the final canvas to the session gallery.
    #[arg(long)]
    export: bool,
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let settings_path = args
        .settings
        .clone()
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME));
    let settings = SessionSettings::load(&settings_path)?;
    logging::init(args.debug || settings.debug_logging, None);

    let source = ReplaySource::from_jsonl_path(&args.recording, FRAME_INTERVAL)?;
    tracing::info!(frames = source.len(), recording = %args.recording.display(), "replaying recording");

    let session = DrawingSession::new(settings, Instant::now());
    let mut capture = CaptureSession::start(source, session)?;
    while capture.pump_blocking(FRAME_INTERVAL * 4)? {}

    let Some(mut session) = capture.finish() else {
        bail!("capture ended without a session");
    };
    session.tick(Instant::now());

    if args.export {
        session.export_snapshot()?;
        let gallery_path = args
            .gallery
            .clone()
            .unwrap_or_else(|| PathBuf::from(GALLERY_FILE_NAME));
        gallery::persist(session.gallery(), &gallery_path)?;
        tracing::info!(path = %gallery_path.display(), "gallery saved");
    }

    if let Some(out) = &args.out {
        let png = session.surface().encode_png()?;
        std::fs::write(out, png).with_context(|| format!("write canvas png {}", out.display()))?;
        tracing::info!(path = %out.display(), "canvas written");
    }

    let status = serde_json::to_string_pretty(&session.status()).context("serialize session status")?;
    println!("{status}");
    Ok(())
}
