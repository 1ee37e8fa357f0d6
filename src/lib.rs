pub mod draw;
pub mod gesture;
pub mod logging;
pub mod session;
pub mod settings;
pub mod source;

pub use session::{DrawingSession, FrameOutcome, SessionStatus};
pub use settings::SessionSettings;
pub use source::{CaptureSession, LandmarkSource, SourceError};
