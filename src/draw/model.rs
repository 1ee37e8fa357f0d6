use serde::{Deserialize, Serialize};

pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 20;
pub const DEFAULT_BRUSH_SIZE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteColor {
    Blue,
    Red,
    Green,
    Black,
    Orange,
    Purple,
    Yellow,
}

/// Cycle order for the color gesture.
pub const PALETTE: [PaletteColor; 7] = [
    PaletteColor::Blue,
    PaletteColor::Red,
    PaletteColor::Green,
    PaletteColor::Black,
    PaletteColor::Orange,
    PaletteColor::Purple,
    PaletteColor::Yellow,
];

impl Default for PaletteColor {
    fn default() -> Self {
        PALETTE[0]
    }
}

impl PaletteColor {
    pub fn rgba(self) -> Color {
        match self {
            PaletteColor::Blue => Color::rgb(0, 0, 255),
            PaletteColor::Red => Color::rgb(255, 0, 0),
            PaletteColor::Green => Color::rgb(0, 128, 0),
            PaletteColor::Black => Color::rgb(0, 0, 0),
            PaletteColor::Orange => Color::rgb(255, 165, 0),
            PaletteColor::Purple => Color::rgb(128, 0, 128),
            PaletteColor::Yellow => Color::rgb(255, 255, 0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PaletteColor::Blue => "blue",
            PaletteColor::Red => "red",
            PaletteColor::Green => "green",
            PaletteColor::Black => "black",
            PaletteColor::Orange => "orange",
            PaletteColor::Purple => "purple",
            PaletteColor::Yellow => "yellow",
        }
    }

    pub fn palette_index(self) -> usize {
        PALETTE.iter().position(|c| *c == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        PALETTE[(self.palette_index() + 1) % PALETTE.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushState {
    pub color: PaletteColor,
    pub size: u32,
}

impl Default for BrushState {
    fn default() -> Self {
        Self {
            color: PaletteColor::default(),
            size: DEFAULT_BRUSH_SIZE,
        }
    }
}

impl BrushState {
    pub fn new(color: PaletteColor, size: u32) -> Self {
        Self {
            color,
            size: clamp_brush_size(size),
        }
    }

    /// Sets the size, clamped to the supported range. Returns the stored value.
    pub fn set_size(&mut self, size: u32) -> u32 {
        self.size = clamp_brush_size(size);
        self.size
    }

    pub fn adjust_size(&mut self, delta: i32) -> u32 {
        let next = (self.size as i64 + delta as i64).max(0) as u32;
        self.set_size(next)
    }

    pub fn cycle_color(&mut self) -> PaletteColor {
        self.color = self.color.next();
        self.color
    }

    pub fn stroke_color(&self) -> Color {
        self.color.rgba()
    }
}

pub fn clamp_brush_size(size: u32) -> u32 {
    size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
}
