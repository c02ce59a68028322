//! Rasterization of lines, polylines, rectangles and markers.
//!
//! All coordinates are pixel coordinates with the origin at the top left.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::style::series_style::MarkerShape;

// ============================================================================
// Lines
// ============================================================================

/// Draw a one pixel line with Bresenham's algorithm.
pub fn draw_line(fb: &mut Framebuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        fb.blend_at(x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Draw an anti-aliased line (Xiaolin Wu, SIGGRAPH '91).
pub fn draw_line_aa(fb: &mut Framebuffer, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba) {
    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    let (x0, y0, x1, y1) = if steep { (y0, x0, y1, x1) } else { (x0, y0, x1, y1) };
    let (x0, y0, x1, y1) = if x0 > x1 { (x1, y1, x0, y0) } else { (x0, y0, x1, y1) };

    let dx = x1 - x0;
    let gradient = if dx.abs() < f32::EPSILON { 1.0 } else { (y1 - y0) / dx };

    let mut put = |major: i32, minor: i32, intensity: f32| {
        let (x, y) = if steep { (minor, major) } else { (major, minor) };
        fb.blend_at(x, y, color.with_alpha((f32::from(color.a) * intensity) as u8));
    };

    let mut endpoint = |x: f32, y: f32, gap: f32| -> (i32, f32) {
        let xend = x.round();
        let yend = y + gradient * (xend - x);
        let major = xend as i32;
        let minor = yend.floor() as i32;
        put(major, minor, (1.0 - fract(yend)) * gap);
        put(major, minor + 1, fract(yend) * gap);
        (major, yend)
    };
    let (first, y_first) = endpoint(x0, y0, 1.0 - fract(x0 + 0.5));
    let (last, _) = endpoint(x1, y1, fract(x1 + 0.5));

    let mut inter_y = y_first + gradient;
    for major in (first + 1)..last {
        let minor = inter_y.floor() as i32;
        put(major, minor, 1.0 - fract(inter_y));
        put(major, minor + 1, fract(inter_y));
        inter_y += gradient;
    }
}

#[inline]
fn fract(v: f32) -> f32 {
    v - v.floor()
}

/// Draw a line of the given pixel width as parallel anti-aliased strokes.
pub fn draw_thick_line(
    fb: &mut Framebuffer,
    (x0, y0): (f32, f32),
    (x1, y1): (f32, f32),
    width: f32,
    color: Rgba,
) {
    let len = (x1 - x0).hypot(y1 - y0);
    if len < f32::EPSILON {
        fb.blend_at(x0.round() as i32, y0.round() as i32, color);
        return;
    }
    let (nx, ny) = (-(y1 - y0) / len, (x1 - x0) / len);
    let strokes = width.round().max(1.0) as i32;
    let first = -(strokes - 1) as f32 / 2.0;
    for i in 0..strokes {
        let offset = first + i as f32;
        draw_line_aa(
            fb,
            x0 + nx * offset,
            y0 + ny * offset,
            x1 + nx * offset,
            y1 + ny * offset,
            color,
        );
    }
}

/// Draw connected segments, optionally dashed. A dash pattern alternates
/// drawn and skipped lengths in pixels and continues across vertices.
pub fn draw_polyline(
    fb: &mut Framebuffer,
    points: &[(f32, f32)],
    width: f32,
    dash: Option<&[f32]>,
    color: Rgba,
) {
    let Some(pattern) = dash.filter(|p| !p.is_empty() && p.iter().all(|v| *v > 0.0)) else {
        for pair in points.windows(2) {
            draw_thick_line(fb, pair[0], pair[1], width, color);
        }
        return;
    };

    let mut dash_index = 0;
    let mut remaining = pattern[0];
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        let len = (x1 - x0).hypot(y1 - y0);
        let mut pos = 0.0;
        while pos < len {
            let step = remaining.min(len - pos);
            if dash_index % 2 == 0 {
                let (t0, t1) = (pos / len, (pos + step) / len);
                draw_thick_line(
                    fb,
                    (x0 + (x1 - x0) * t0, y0 + (y1 - y0) * t0),
                    (x0 + (x1 - x0) * t1, y0 + (y1 - y0) * t1),
                    width,
                    color,
                );
            }
            pos += step;
            remaining -= step;
            if remaining <= f32::EPSILON {
                dash_index = (dash_index + 1) % pattern.len();
                remaining = pattern[dash_index];
            }
        }
    }
}

// ============================================================================
// Rectangles
// ============================================================================

/// Draw a rectangle outline of the given thickness.
pub fn draw_rect_outline(
    fb: &mut Framebuffer,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    thickness: u32,
    color: Rgba,
) {
    let t = thickness.max(1).min(width).min(height);
    fb.fill_rect(x, y, width, t, color);
    fb.fill_rect(x, y + height as i32 - t as i32, width, t, color);
    let inner = height.saturating_sub(2 * t);
    fb.fill_rect(x, y + t as i32, t, inner, color);
    fb.fill_rect(x + width as i32 - t as i32, y + t as i32, t, inner, color);
}

// ============================================================================
// Circles and markers
// ============================================================================

/// Draw a filled circle (midpoint algorithm).
pub fn draw_circle(fb: &mut Framebuffer, cx: i32, cy: i32, radius: i32, color: Rgba) {
    if radius <= 0 {
        fb.blend_at(cx, cy, color);
        return;
    }
    let (mut x, mut y, mut err) = (radius, 0, 1 - radius);
    // Widest half-span per row; octants revisit rows.
    let mut half = vec![-1; (2 * radius + 1) as usize];
    let mut widen = |h: i32, dy: i32| {
        let slot = (dy + radius) as usize;
        half[slot] = half[slot].max(h);
    };
    while x >= y {
        widen(x, y);
        widen(x, -y);
        widen(y, x);
        widen(y, -x);
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
    for (slot, h) in half.into_iter().enumerate() {
        if h >= 0 {
            let dy = slot as i32 - radius;
            fb.fill_rect(cx - h, cy + dy, (2 * h + 1) as u32, 1, color);
        }
    }
}

/// Draw a circle outline (midpoint algorithm).
pub fn draw_circle_outline(fb: &mut Framebuffer, cx: i32, cy: i32, radius: i32, color: Rgba) {
    if radius <= 0 {
        fb.blend_at(cx, cy, color);
        return;
    }
    let (mut x, mut y, mut err) = (radius, 0, 1 - radius);
    while x >= y {
        for (px, py) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
            fb.blend_at(cx + px, cy + py, color);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

/// Draw a marker centred on `(x, y)` with the given radius in pixels.
pub fn draw_marker(fb: &mut Framebuffer, shape: MarkerShape, x: f32, y: f32, radius: f32, color: Rgba) {
    let (cx, cy) = (x.round() as i32, y.round() as i32);
    let r = radius.round().max(1.0) as i32;
    match shape {
        MarkerShape::Circle => draw_circle(fb, cx, cy, r, color),
        MarkerShape::OpenCircle => draw_circle_outline(fb, cx, cy, r, color),
        MarkerShape::OpenSquare => {
            let side = (2 * r + 1) as u32;
            draw_rect_outline(fb, cx - r, cy - r, side, side, 1, color);
        }
        MarkerShape::OpenTriangle => {
            let (top, left, right) = ((cx, cy - r), (cx - r, cy + r), (cx + r, cy + r));
            draw_line(fb, top.0, top.1, left.0, left.1, color);
            draw_line(fb, left.0, left.1, right.0, right.1, color);
            draw_line(fb, right.0, right.1, top.0, top.1, color);
        }
        MarkerShape::Cross => {
            draw_line(fb, cx - r, cy - r, cx + r, cy + r, color);
            draw_line(fb, cx - r, cy + r, cx + r, cy - r, color);
        }
    }
}
