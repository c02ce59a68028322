//! Raster backend: draws into a [`Framebuffer`] and saves PNG.

use std::path::Path;

use log::{debug, trace};
use trueno::Vector;

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::figure::FinalizedFigure;
use crate::framebuffer::Framebuffer;
use crate::geometry::{Point, Rect};
use crate::output::{PngEncoder, TextAnchor};
use crate::render::{draw_marker, draw_polyline, draw_rect_outline};
use crate::style::series_style::{LineStyle, MarkerShape};

use super::{Artifact, Canvas, FigurePainter, ObjectRegistry, RenderBackend};

/// Canvas over a white framebuffer. Text is not rasterized.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    fb: Framebuffer,
}

impl RasterCanvas {
    /// White canvas of the given pixel size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for a zero size.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let mut fb = Framebuffer::new(width, height)?;
        fb.clear(Rgba::WHITE);
        Ok(Self { fb })
    }

    /// The pixels drawn so far.
    #[must_use]
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    /// Take the framebuffer out of the canvas.
    #[must_use]
    pub fn into_framebuffer(self) -> Framebuffer {
        self.fb
    }

    /// Figure coordinates to pixels: `px = x * w`, `py = h - y * h`,
    /// batched through trueno vectors.
    ///
    /// # Errors
    ///
    /// [`Error::Rendering`] if a vector operation fails.
    pub fn project(&self, points: &[Point]) -> Result<Vec<(f32, f32)>> {
        if points.is_empty() {
            return Ok(Vec::new());
        }
        let n = points.len();
        let (w, h) = (self.fb.width() as f32, self.fb.height() as f32);
        let xs = Vector::from_vec(points.iter().map(|p| p.x as f32).collect());
        let ys = Vector::from_vec(points.iter().map(|p| p.y as f32).collect());

        let px = xs
            .mul(&Vector::from_vec(vec![w; n]))
            .map_err(|e| Error::Rendering(format!("projecting x: {e:?}")))?;
        let py = ys
            .mul(&Vector::from_vec(vec![-h; n]))
            .and_then(|v| v.add(&Vector::from_vec(vec![h; n])))
            .map_err(|e| Error::Rendering(format!("projecting y: {e:?}")))?;

        Ok(px
            .as_slice()
            .iter()
            .copied()
            .zip(py.as_slice().iter().copied())
            .collect())
    }

    fn pixel_box(&self, rect: Rect) -> Result<(i32, i32, u32, u32)> {
        let corners = self.project(&[Point::new(rect.x0, rect.y0), Point::new(rect.x1, rect.y1)])?;
        let ((ax, ay), (bx, by)) = (corners[0], corners[1]);
        let (left, right) = (ax.min(bx).round(), ax.max(bx).round());
        let (top, bottom) = (ay.min(by).round(), ay.max(by).round());
        Ok((
            left as i32,
            top as i32,
            (right - left).max(1.0) as u32,
            (bottom - top).max(1.0) as u32,
        ))
    }
}

impl Canvas for RasterCanvas {
    fn size(&self) -> (u32, u32) {
        (self.fb.width(), self.fb.height())
    }

    fn rect(&mut self, rect: Rect, fill: Option<Rgba>, stroke: Option<(Rgba, f64)>) -> Result<()> {
        let (x, y, w, h) = self.pixel_box(rect)?;
        if let Some(color) = fill {
            self.fb.fill_rect(x, y, w, h, color);
        }
        if let Some((color, width)) = stroke {
            draw_rect_outline(&mut self.fb, x, y, w, h, width.round().max(1.0) as u32, color);
        }
        Ok(())
    }

    fn polyline(&mut self, points: &[Point], color: Rgba, width: f64, style: LineStyle) -> Result<()> {
        let pixels = self.project(points)?;
        draw_polyline(&mut self.fb, &pixels, width as f32, style.dash_pattern(), color);
        Ok(())
    }

    fn marker(&mut self, center: Point, shape: MarkerShape, radius: f64, color: Rgba) -> Result<()> {
        let pixels = self.project(&[center])?;
        let (x, y) = pixels[0];
        draw_marker(&mut self.fb, shape, x, y, radius as f32, color);
        Ok(())
    }

    fn text(&mut self, text: &str, _at: Point, _size: f64, _anchor: TextAnchor, _vertical: bool) -> Result<()> {
        trace!("raster canvas skips text {text:?}");
        Ok(())
    }
}

/// A rendered raster figure.
#[derive(Debug, Clone)]
pub struct RasterImage {
    framebuffer: Framebuffer,
    objects: Vec<String>,
}

impl RasterImage {
    /// The pixels.
    #[must_use]
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Names of the drawn pads, frames and series.
    #[must_use]
    pub fn objects(&self) -> &[String] {
        &self.objects
    }

    /// PNG encoding of the image.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn png_bytes(&self) -> Result<Vec<u8>> {
        PngEncoder::to_bytes(&self.framebuffer)
    }
}

impl Artifact for RasterImage {
    fn save(&self, path: &Path) -> Result<()> {
        PngEncoder::write_to_file(&self.framebuffer, path)
    }
}

/// Backend producing PNG images.
#[derive(Debug, Clone, Default)]
pub struct RasterBackend {
    registry: ObjectRegistry,
}

impl RasterBackend {
    /// Backend with a fresh object registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names handed out so far.
    #[must_use]
    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }
}

impl RenderBackend for RasterBackend {
    type Output = RasterImage;

    fn render(&mut self, figure: &FinalizedFigure) -> Result<RasterImage> {
        let (width, height) = figure.size;
        debug!("rasterizing {} at {width}x{height}", figure.name);
        let mut canvas = RasterCanvas::new(width, height)?;
        let objects = FigurePainter::new(&mut canvas, &mut self.registry).paint(figure)?;
        Ok(RasterImage {
            framebuffer: canvas.into_framebuffer(),
            objects,
        })
    }
}
