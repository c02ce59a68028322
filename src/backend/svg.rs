//! Vector backend: emits an SVG document.

use std::path::Path;

use log::debug;

use crate::color::Rgba;
use crate::error::Result;
use crate::figure::FinalizedFigure;
use crate::geometry::{Point, Rect};
use crate::output::{Stroke, SvgDocument, SvgElement, TextAnchor};
use crate::style::series_style::{LineStyle, MarkerShape};

use super::{Artifact, Canvas, FigurePainter, ObjectRegistry, RenderBackend};

/// Canvas building an [`SvgDocument`].
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    document: SvgDocument,
    width: u32,
    height: u32,
}

impl SvgCanvas {
    /// Empty canvas with a white background.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            document: SvgDocument::new(width, height),
            width,
            height,
        }
    }

    /// Take the document out of the canvas.
    #[must_use]
    pub fn into_document(self) -> SvgDocument {
        self.document
    }

    fn px(&self, p: Point) -> (f32, f32) {
        (
            (p.x * f64::from(self.width)) as f32,
            ((1.0 - p.y) * f64::from(self.height)) as f32,
        )
    }

    fn stroke(color: Rgba, width: f64, style: LineStyle) -> Stroke {
        Stroke {
            color,
            width: width as f32,
            dash: style.dash_pattern().map(<[f32]>::to_vec),
        }
    }
}

impl Canvas for SvgCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn begin_group(&mut self, name: &str) -> Result<()> {
        self.document.push(SvgElement::GroupStart {
            id: name.to_string(),
        });
        Ok(())
    }

    fn end_group(&mut self) -> Result<()> {
        self.document.push(SvgElement::GroupEnd);
        Ok(())
    }

    fn rect(&mut self, rect: Rect, fill: Option<Rgba>, stroke: Option<(Rgba, f64)>) -> Result<()> {
        let (ax, ay) = self.px(Point::new(rect.x0, rect.y0));
        let (bx, by) = self.px(Point::new(rect.x1, rect.y1));
        self.document.push(SvgElement::Rect {
            x: ax.min(bx),
            y: ay.min(by),
            width: (bx - ax).abs(),
            height: (by - ay).abs(),
            fill,
            stroke: stroke.map(|(color, width)| Stroke::solid(color, width as f32)),
        });
        Ok(())
    }

    fn polyline(&mut self, points: &[Point], color: Rgba, width: f64, style: LineStyle) -> Result<()> {
        if points.len() < 2 {
            return Ok(());
        }
        let points = points.iter().map(|p| self.px(*p)).collect();
        self.document.push(SvgElement::Polyline {
            points,
            stroke: Self::stroke(color, width, style),
        });
        Ok(())
    }

    fn marker(&mut self, center: Point, shape: MarkerShape, radius: f64, color: Rgba) -> Result<()> {
        let (cx, cy) = self.px(center);
        let r = radius as f32;
        let outline = Some(Stroke::solid(color, 1.0));
        let element = match shape {
            MarkerShape::Circle => SvgElement::Circle {
                cx,
                cy,
                r,
                fill: Some(color),
                stroke: None,
            },
            MarkerShape::OpenCircle => SvgElement::Circle {
                cx,
                cy,
                r,
                fill: None,
                stroke: outline,
            },
            MarkerShape::OpenSquare => SvgElement::Rect {
                x: cx - r,
                y: cy - r,
                width: 2.0 * r,
                height: 2.0 * r,
                fill: None,
                stroke: outline,
            },
            MarkerShape::OpenTriangle => SvgElement::Polygon {
                points: vec![(cx, cy - r), (cx - r, cy + r), (cx + r, cy + r)],
                fill: None,
                stroke: outline,
            },
            MarkerShape::Cross => {
                let stroke = Stroke::solid(color, 1.0);
                self.document.push(SvgElement::Polyline {
                    points: vec![(cx - r, cy - r), (cx + r, cy + r)],
                    stroke: stroke.clone(),
                });
                SvgElement::Polyline {
                    points: vec![(cx - r, cy + r), (cx + r, cy - r)],
                    stroke,
                }
            }
        };
        self.document.push(element);
        Ok(())
    }

    fn text(&mut self, text: &str, at: Point, size: f64, anchor: TextAnchor, vertical: bool) -> Result<()> {
        let (x, y) = self.px(at);
        self.document.push(SvgElement::Text {
            x,
            y,
            text: text.to_string(),
            font_size: (size * f64::from(self.height)) as f32,
            fill: Rgba::BLACK,
            anchor,
            vertical,
        });
        Ok(())
    }
}

/// A rendered vector figure.
#[derive(Debug, Clone)]
pub struct SvgImage {
    document: SvgDocument,
    objects: Vec<String>,
}

impl SvgImage {
    /// The document.
    #[must_use]
    pub fn document(&self) -> &SvgDocument {
        &self.document
    }

    /// Names of the drawn pads, frames and series.
    #[must_use]
    pub fn objects(&self) -> &[String] {
        &self.objects
    }

    /// Serialized SVG.
    #[must_use]
    pub fn to_svg_string(&self) -> String {
        self.document.render()
    }
}

impl Artifact for SvgImage {
    fn save(&self, path: &Path) -> Result<()> {
        self.document.write_to_file(path)
    }
}

/// Backend producing SVG documents.
#[derive(Debug, Clone, Default)]
pub struct SvgBackend {
    registry: ObjectRegistry,
}

impl SvgBackend {
    /// Backend with a fresh object registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderBackend for SvgBackend {
    type Output = SvgImage;

    fn render(&mut self, figure: &FinalizedFigure) -> Result<SvgImage> {
        let (width, height) = figure.size;
        debug!("vectorizing {} at {width}x{height}", figure.name);
        let mut canvas = SvgCanvas::new(width, height);
        let objects = FigurePainter::new(&mut canvas, &mut self.registry).paint(figure)?;
        Ok(SvgImage {
            document: canvas.into_document(),
            objects,
        })
    }
}
