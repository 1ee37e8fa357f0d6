pub mod gallery;
pub mod history;
pub mod model;
pub mod stroke;
pub mod surface;

pub use gallery::{Gallery, GalleryEntry, GalleryStore};
pub use history::{HistoryStack, Snapshot};
pub use model::{BrushState, Color, PaletteColor, PALETTE};
pub use stroke::{StrokeEngine, StrokeEvent, StrokeOutcome};
pub use surface::CanvasSurface;
