//! RGBA pixel buffer for the raster backend.
//!
//! Rows are padded to a 64-byte stride. Pixel coordinates have their origin
//! at the top left corner; figure coordinates (origin bottom left) are
//! converted by the raster backend before anything reaches this buffer.

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Row alignment in bytes.
const ROW_ALIGNMENT: usize = 64;

/// Pixel buffer with a padded stride.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    /// RGBA bytes in row-major order, `stride` bytes per row.
    pixels: Vec<u8>,
    stride: usize,
}

impl Framebuffer {
    /// Create a transparent framebuffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if width or height is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use trueno_figure::framebuffer::Framebuffer;
    ///
    /// let fb = Framebuffer::new(300, 200).unwrap();
    /// assert_eq!(fb.width(), 300);
    /// assert_eq!(fb.height(), 200);
    /// ```
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let row_bytes = (width as usize) * 4;
        let stride = (row_bytes + ROW_ALIGNMENT - 1) & !(ROW_ALIGNMENT - 1);
        Ok(Self {
            width,
            height,
            pixels: vec![0; stride * height as usize],
            stride,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes, padding included.
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Number of pixels.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// One row of pixels without padding.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = (y as usize) * self.stride;
        Some(&self.pixels[start..start + (self.width as usize) * 4])
    }

    /// Fill the whole buffer with one color.
    pub fn clear(&mut self, color: Rgba) {
        let rgba = color.to_array();
        let row_bytes = (self.width as usize) * 4;
        for row in self.pixels.chunks_exact_mut(self.stride) {
            for px in row[..row_bytes].chunks_exact_mut(4) {
                px.copy_from_slice(&rgba);
            }
        }
    }

    /// Blend a rectangle over the buffer. Parts outside are clipped.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgba) {
        let (x0, x1) = clip_span(x, w, self.width);
        let (y0, y1) = clip_span(y, h, self.height);
        if color.a == 255 {
            let rgba = color.to_array();
            for row in y0..y1 {
                let start = (row as usize) * self.stride;
                let bytes = &mut self.pixels[start + x0 as usize * 4..start + x1 as usize * 4];
                for px in bytes.chunks_exact_mut(4) {
                    px.copy_from_slice(&rgba);
                }
            }
        } else {
            for row in y0..y1 {
                for col in x0..x1 {
                    self.blend_pixel(col, row, color);
                }
            }
        }
    }

    /// Color of one pixel, `None` outside the buffer.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        self.pixels[i..i + 4].try_into().ok().map(Rgba::from_array)
    }

    /// Overwrite one pixel. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.index(x, y);
        self.pixels[i..i + 4].copy_from_slice(&color.to_array());
    }

    /// Composite a color over one pixel ("over" operator).
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height || color.a == 0 {
            return;
        }
        let i = self.index(x, y);
        let src_a = f32::from(color.a) / 255.0;
        let dst_a = f32::from(self.pixels[i + 3]) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);

        let mix = |src: u8, dst: u8| -> u8 {
            let v = (f32::from(src) * src_a + f32::from(dst) * dst_a * (1.0 - src_a)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        let src = color.to_array();
        for c in 0..3 {
            self.pixels[i + c] = mix(src[c], self.pixels[i + c]);
        }
        self.pixels[i + 3] = (out_a * 255.0).round() as u8;
    }

    /// Blend a pixel at signed coordinates; pixels outside are ignored.
    pub fn blend_at(&mut self, x: i32, y: i32, color: Rgba) {
        if x >= 0 && y >= 0 {
            self.blend_pixel(x as u32, y as u32, color);
        }
    }

    /// Number of pixels with exactly this color.
    #[must_use]
    pub fn count_pixels(&self, color: Rgba) -> usize {
        let rgba = color.to_array();
        (0..self.height)
            .filter_map(|y| self.row(y))
            .flat_map(|row| row.chunks_exact(4))
            .filter(|px| *px == rgba)
            .count()
    }

    /// Pixels packed without row padding, as PNG encoders expect.
    #[must_use]
    pub fn to_compact_pixels(&self) -> Vec<u8> {
        let row_bytes = (self.width as usize) * 4;
        let mut compact = Vec::with_capacity(row_bytes * self.height as usize);
        for row in self.pixels.chunks_exact(self.stride) {
            compact.extend_from_slice(&row[..row_bytes]);
        }
        compact
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * self.stride + (x as usize) * 4
    }
}

/// Clip `[start, start + len)` to `[0, limit)`.
fn clip_span(start: i32, len: u32, limit: u32) -> (u32, u32) {
    let begin = i64::from(start).clamp(0, i64::from(limit));
    let end = (i64::from(start) + i64::from(len)).clamp(0, i64::from(limit));
    (begin as u32, end.max(begin) as u32)
}
