//! Pixel canvas for software rendering
//!
//! All drawing goes through a clip rectangle so each viewport can only touch
//! its own half of the frame.

use std::io::{self, Write};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 8-bit RGB color, laid out for direct byte access
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Multiply each channel by `factor` (clamped to [0, 1])
    pub fn scale(self, factor: f32) -> Self {
        let f = if factor.is_finite() { factor.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            r: (self.r as f32 * f) as u8,
            g: (self.g as f32 * f) as u8,
            b: (self.b as f32 * f) as u8,
        }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

/// Axis-aligned pixel rectangle
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, w: usize, h: usize) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> usize {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> usize {
        self.y + self.h
    }
}

/// Row-major RGB frame buffer
#[derive(Clone, Debug)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
    clip: Rect,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; width * height],
            clip: Rect::new(0, 0, width, height),
        }
    }

    /// Resize (contents are cleared) if the dimensions changed
    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            *self = Self::new(width, height);
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Raw RGB bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Restrict drawing to `rect` (intersected with the frame)
    pub fn set_clip(&mut self, rect: Rect) {
        let x = rect.x.min(self.width);
        let y = rect.y.min(self.height);
        self.clip = Rect::new(
            x,
            y,
            rect.right().min(self.width) - x,
            rect.bottom().min(self.height) - y,
        );
    }

    pub fn clear_clip(&mut self) {
        self.clip = Rect::new(0, 0, self.width, self.height);
    }

    pub fn clip(&self) -> Rect {
        self.clip
    }

    pub fn fill(&mut self, color: Rgb) {
        self.fill_rect(
            self.clip.x as i32,
            self.clip.y as i32,
            self.clip.w as i32,
            self.clip.h as i32,
            color,
        );
    }

    #[inline]
    pub fn put(&mut self, x: i32, y: i32, color: Rgb) {
        if x < self.clip.x as i32
            || y < self.clip.y as i32
            || x >= self.clip.right() as i32
            || y >= self.clip.bottom() as i32
        {
            return;
        }
        self.pixels[y as usize * self.width + x as usize] = color;
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb) {
        let x0 = x.max(self.clip.x as i32);
        let y0 = y.max(self.clip.y as i32);
        let x1 = x.saturating_add(w).min(self.clip.right() as i32);
        let y1 = y.saturating_add(h).min(self.clip.bottom() as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for row in y0..y1 {
            let start = row as usize * self.width;
            self.pixels[start + x0 as usize..start + x1 as usize].fill(color);
        }
    }

    /// Vertical line from `y0` to `y1` inclusive, `width` pixels wide
    pub fn vline(&mut self, x: i32, y0: i32, y1: i32, width: i32, color: Rgb) {
        let (top, bottom) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        let left = x - (width - 1) / 2;
        self.fill_rect(left, top, width.max(1), bottom - top + 1, color);
    }

    pub fn fill_ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, color: Rgb) {
        if rx <= 0 || ry <= 0 {
            return;
        }
        let ry2 = (ry as f32) * (ry as f32);
        for dy in -ry..=ry {
            // Half-width of this scanline
            let t = 1.0 - (dy * dy) as f32 / ry2;
            let half = (rx as f32 * t.max(0.0).sqrt()) as i32;
            self.fill_rect(cx - half, cy + dy, half * 2 + 1, 1, color);
        }
    }

    pub fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: Rgb) {
        self.fill_ellipse(cx, cy, r, r, color);
    }

    /// Write as binary PPM (P6)
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        out.write_all(self.as_bytes())?;
        out.flush()
    }
}
