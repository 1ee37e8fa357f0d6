pub mod classifier;
pub mod landmarks;
pub mod smoother;
pub mod stabilizer;
pub mod synthetic;

pub use classifier::{classify, FingerStates, GestureClassifier, GestureLabel};
pub use landmarks::{FrameError, FrameResult, HandFrame, Landmark};
pub use smoother::{CursorPosition, PositionSmoother};
pub use stabilizer::{GestureStabilizer, StabilizedAction};
