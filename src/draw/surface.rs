use crate::draw::model::Color;
use crate::gesture::smoother::CursorPosition;
use anyhow::{anyhow, bail, Context, Result};
use image::{DynamicImage, ImageFormat, ImageOutputFormat, RgbaImage};
use std::io::Cursor;

pub const DEFAULT_CANVAS_WIDTH: u32 = 1600;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 900;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DirtyRect {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl DirtyRect {
    /// Padded bounds of `a..b` clipped to a `width` x `height` canvas. Bounds
    /// are clipped as floats so far off-canvas points never reach integer math.
    fn clipped(a: CursorPosition, b: CursorPosition, pad: f32, width: u32, height: u32) -> Option<Self> {
        let (x0, x1) = clip_span(a.x.min(b.x) - pad, a.x.max(b.x) + pad, width)?;
        let (y0, y1) = clip_span(a.y.min(b.y) - pad, a.y.max(b.y) + pad, height)?;
        Some(Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// Half-open pixel span covering `lo..=hi`, clipped to `0..limit`.
fn clip_span(lo: f32, hi: f32, limit: u32) -> Option<(i32, i32)> {
    let start = lo.floor().max(0.0);
    let end = (hi.ceil() + 1.0).min(limit as f32);
    if !(end > start) {
        return None;
    }
    Some((start as i32, end as i32))
}

/// The committed ink raster. RGBA8, row-major, transparent when empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl CanvasSurface {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            pixels: vec![0u8; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        Some(Color::rgba(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ))
    }

    pub fn painted_pixel_count(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] != 0).count()
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Filled disc. The pixel under `center` is always painted so tiny
    /// brushes still leave a mark.
    pub fn fill_circle(&mut self, center: CursorPosition, radius: f32, color: Color) -> u64 {
        self.stroke_capsule(center, center, radius, color)
    }

    /// Segment with round caps: every pixel whose center lies within `width / 2`
    /// of the segment. Consecutive segments sharing an endpoint join round.
    pub fn stroke_segment(
        &mut self,
        start: CursorPosition,
        end: CursorPosition,
        width: u32,
        color: Color,
    ) -> u64 {
        self.stroke_capsule(start, end, width.max(1) as f32 * 0.5, color)
    }

    fn stroke_capsule(
        &mut self,
        start: CursorPosition,
        end: CursorPosition,
        radius: f32,
        color: Color,
    ) -> u64 {
        let radius = radius.max(0.5);
        let mut writes: u64 = 0;
        if let Some(clip) = DirtyRect::clipped(start, end, radius + 1.0, self.width, self.height) {
            let radius_sq = radius * radius;
            for y in clip.y..(clip.y + clip.height) {
                for x in clip.x..(clip.x + clip.width) {
                    let center = (x as f32 + 0.5, y as f32 + 0.5);
                    if point_segment_distance_sq(center, start, end) <= radius_sq {
                        self.set_pixel(x, y, color);
                        writes = writes.saturating_add(1);
                    }
                }
            }
        }
        if self.set_pixel(start.x.floor() as i32, start.y.floor() as i32, color) {
            writes = writes.saturating_add(1);
        }
        writes
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_rgba_array());
        true
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let image = RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| anyhow!("surface buffer does not match {}x{}", self.width, self.height))?;
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut bytes, ImageOutputFormat::Png)
            .context("encode canvas surface as png")?;
        Ok(bytes.into_inner())
    }

    /// Replaces the raster with a decoded PNG. On any failure the surface is
    /// left untouched.
    pub fn restore_png(&mut self, png: &[u8]) -> Result<()> {
        let decoded = image::load_from_memory_with_format(png, ImageFormat::Png)
            .context("decode canvas snapshot png")?
            .to_rgba8();
        if decoded.width() != self.width || decoded.height() != self.height {
            bail!(
                "snapshot is {}x{}, canvas is {}x{}",
                decoded.width(),
                decoded.height(),
                self.width,
                self.height
            );
        }
        self.pixels = decoded.into_raw();
        Ok(())
    }
}

fn point_segment_distance_sq(point: (f32, f32), start: CursorPosition, end: CursorPosition) -> f32 {
    let (px, py) = point;
    let vx = end.x - start.x;
    let vy = end.y - start.y;
    let wx = px - start.x;
    let wy = py - start.y;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f32::EPSILON {
        return wx * wx + wy * wy;
    }
    let t = ((wx * vx + wy * vy) / len_sq).clamp(0.0, 1.0);
    let dx = px - (start.x + vx * t);
    let dy = py - (start.y + vy * t);
    dx * dx + dy * dy
}
