//! CPU rasterizer implementing [`Surface`] over an RGBA buffer.
//!
//! This module is always available (no feature gate) so that both the `png`
//! snapshot path and tests can render without a browser. Pixels are stored
//! premultiplied and composited source-over, the way a 2D canvas does it.
//! Edges of circles, arcs, and lines get one physical pixel of coverage
//! falloff; rectangles and gradients are sampled at pixel centers.

use std::f64::consts::TAU;
use std::ops::Range;

use cosmos_core::surface::sample_stops;
use cosmos_core::{ArcStroke, ColorStop, LineStroke, RadialGradient, Rgba, Surface};
use tracing::warn;

/// Largest backing-store side in physical pixels.
pub const MAX_SIDE: usize = 16_384;

/// Largest backing store in physical pixels, enough for a 5K frame.
pub const MAX_PIXELS: usize = 1 << 24;

/// Physical size of `width × height` CSS pixels at `dpr`, each side capped
/// at [`MAX_SIDE`]. `None` when the area exceeds [`MAX_PIXELS`].
pub fn backing_dims(width: f64, height: f64, dpr: f64) -> Option<(usize, usize)> {
    let side = |css: f64| {
        let px = (css * dpr).floor();
        if px.is_finite() && px > 0.0 {
            (px as usize).min(MAX_SIDE)
        } else {
            0
        }
    };
    let (w, h) = (side(width), side(height));
    (w * h <= MAX_PIXELS).then_some((w, h))
}

/// An in-memory drawing surface.
#[derive(Debug, Clone, Default)]
pub struct PixelSurface {
    width: usize,
    height: usize,
    dpr: f64,
    /// Premultiplied RGBA per physical pixel, row-major.
    data: Vec<[f64; 4]>,
}

impl PixelSurface {
    /// Creates a surface sized to `width × height` CSS pixels at `dpr`.
    pub fn new(width: f64, height: f64, dpr: f64) -> Self {
        let mut surface = Self::default();
        surface.resize(width, height, dpr);
        surface
    }

    /// Backing-store width in physical pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Backing-store height in physical pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dpr(&self) -> f64 {
        self.dpr
    }

    /// Straight-alpha color of the physical pixel at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(unpremultiply(self.data[y * self.width + x]))
    }

    /// Converts to a straight-alpha RGBA8 buffer of `width * height * 4` bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.data
            .iter()
            .flat_map(|&px| {
                let c = unpremultiply(px);
                [c.r, c.g, c.b, c.a].map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            })
            .collect()
    }

    /// Physical pixel range covering CSS interval `[lo, hi)` on an axis of
    /// `limit` pixels.
    fn span(&self, lo: f64, hi: f64, limit: usize) -> Range<usize> {
        let start = (lo * self.dpr).floor().max(0.0);
        let end = (hi * self.dpr).ceil().min(limit as f64);
        if !(start < end) {
            return 0..0;
        }
        start as usize..end as usize
    }

    /// CSS coordinate of the center of physical pixel `i`.
    fn center(&self, i: usize) -> f64 {
        (i as f64 + 0.5) / self.dpr
    }

    fn blend(&mut self, x: usize, y: usize, color: Rgba, coverage: f64) {
        let a = color.a * coverage.clamp(0.0, 1.0);
        if !(a > 0.0) {
            return;
        }
        let dst = &mut self.data[y * self.width + x];
        let keep = 1.0 - a;
        dst[0] = color.r * a + dst[0] * keep;
        dst[1] = color.g * a + dst[1] * keep;
        dst[2] = color.b * a + dst[2] * keep;
        dst[3] = a + dst[3] * keep;
    }

    /// Visits every pixel whose center lies in the CSS box around
    /// `(cx, cy)` with half extent `reach`.
    fn for_each_near(
        &mut self,
        cx: f64,
        cy: f64,
        reach: f64,
        mut f: impl FnMut(&mut Self, usize, usize, f64, f64),
    ) {
        let xs = self.span(cx - reach, cx + reach, self.width);
        let ys = self.span(cy - reach, cy + reach, self.height);
        for py in ys {
            let y = self.center(py);
            for px in xs.clone() {
                let x = self.center(px);
                f(self, px, py, x, y);
            }
        }
    }
}

/// Coverage of a pixel whose center is `inside` CSS pixels within an edge.
fn edge_coverage(inside: f64, dpr: f64) -> f64 {
    (inside * dpr + 0.5).clamp(0.0, 1.0)
}

fn unpremultiply(px: [f64; 4]) -> Rgba {
    let a = px[3];
    if a <= 0.0 {
        return Rgba::TRANSPARENT;
    }
    Rgba {
        r: px[0] / a,
        g: px[1] / a,
        b: px[2] / a,
        a,
    }
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

impl Surface for PixelSurface {
    fn resize(&mut self, width: f64, height: f64, dpr: f64) {
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        (self.width, self.height) = backing_dims(width, height, self.dpr).unwrap_or_else(|| {
            warn!(width, height, dpr = self.dpr, max = MAX_PIXELS, "surface too large, left empty");
            (0, 0)
        });
        self.data = vec![[0.0; 4]; self.width * self.height];
    }

    fn clear(&mut self) {
        self.data.fill([0.0; 4]);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        if !all_finite(&[x, y, w, h]) || w <= 0.0 || h <= 0.0 {
            return;
        }
        for py in self.span(y, y + h, self.height) {
            let cy = self.center(py);
            if cy < y || cy >= y + h {
                continue;
            }
            for px in self.span(x, x + w, self.width) {
                let cx = self.center(px);
                if cx >= x && cx < x + w {
                    self.blend(px, py, color, 1.0);
                }
            }
        }
    }

    fn fill_vertical_gradient(&mut self, x: f64, y: f64, w: f64, h: f64, stops: &[ColorStop]) {
        if !all_finite(&[x, y, w, h]) || w <= 0.0 || h <= 0.0 || stops.is_empty() {
            return;
        }
        for py in self.span(y, y + h, self.height) {
            let cy = self.center(py);
            if cy < y || cy >= y + h {
                continue;
            }
            let color = sample_stops(stops, (cy - y) / h);
            for px in self.span(x, x + w, self.width) {
                let cx = self.center(px);
                if cx >= x && cx < x + w {
                    self.blend(px, py, color, 1.0);
                }
            }
        }
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: Rgba) {
        if !all_finite(&[cx, cy, r]) || r <= 0.0 {
            return;
        }
        let dpr = self.dpr;
        self.for_each_near(cx, cy, r + 1.0, |s, px, py, x, y| {
            let inside = r - (x - cx).hypot(y - cy);
            s.blend(px, py, color, edge_coverage(inside, dpr));
        });
    }

    fn fill_radial_gradient(&mut self, g: &RadialGradient<'_>) {
        if !g.is_drawable() {
            return;
        }
        let (sin, cos) = g.rotation.sin_cos();
        let reach = g.fill_radius * g.scale_y.max(1.0);
        self.for_each_near(g.cx, g.cy, reach, |s, px, py, x, y| {
            let (dx, dy) = (x - g.cx, y - g.cy);
            // Into the gradient's rotated, vertically squashed frame.
            let lx = dx * cos + dy * sin;
            let ly = (-dx * sin + dy * cos) / g.scale_y;
            let d = lx.hypot(ly);
            if d <= g.fill_radius {
                s.blend(px, py, g.color_at(d / g.radius), 1.0);
            }
        });
    }

    fn stroke_arc(&mut self, arc: &ArcStroke) {
        let ArcStroke {
            cx,
            cy,
            radius,
            start,
            end,
            width,
            color,
        } = *arc;
        if !all_finite(&[cx, cy, radius, start, end, width]) || radius <= 0.0 || width <= 0.0 {
            return;
        }
        let sweep = end - start;
        if sweep <= 0.0 {
            return;
        }
        let half = width / 2.0;
        let dpr = self.dpr;
        self.for_each_near(cx, cy, radius + half + 1.0, |s, px, py, x, y| {
            let (dx, dy) = (x - cx, y - cy);
            let inside = half - (dx.hypot(dy) - radius).abs();
            if inside * dpr + 0.5 <= 0.0 {
                return;
            }
            if sweep < TAU && (dy.atan2(dx) - start).rem_euclid(TAU) > sweep {
                return;
            }
            s.blend(px, py, color, edge_coverage(inside, dpr));
        });
    }

    fn stroke_line(&mut self, line: &LineStroke) {
        let LineStroke {
            x0,
            y0,
            x1,
            y1,
            width,
            color,
        } = *line;
        if !all_finite(&[x0, y0, x1, y1, width]) || width <= 0.0 {
            return;
        }
        let (vx, vy) = (x1 - x0, y1 - y0);
        let len2 = vx * vx + vy * vy;
        if len2 == 0.0 {
            return;
        }
        let half = width / 2.0;
        let dpr = self.dpr;
        let (mx, my) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
        let reach = len2.sqrt() / 2.0 + half + 1.0;
        self.for_each_near(mx, my, reach, |s, px, py, x, y| {
            // Butt caps: only the span between the endpoints is painted.
            let t = ((x - x0) * vx + (y - y0) * vy) / len2;
            if !(0.0..=1.0).contains(&t) {
                return;
            }
            let d = (x - (x0 + vx * t)).hypot(y - (y0 + vy * t));
            s.blend(px, py, color, edge_coverage(half - d, dpr));
        });
    }
}
