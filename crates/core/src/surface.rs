//! Minimal 2D drawing-primitive interface.
//!
//! Engines draw exclusively through [`Surface`], so the simulation can run
//! against a browser canvas, the CPU rasterizer in `cosmos-engines`, or the
//! [`RecordingSurface`] used by tests. Coordinates are in CSS pixels; the
//! surface applies the device pixel ratio it was sized with.

use crate::color::Rgba;

/// A color at a normalized position along a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    /// Position in [0, 1].
    pub offset: f64,
    pub color: Rgba,
}

impl ColorStop {
    pub fn new(offset: f64, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// A radial gradient from a center point, filled over a disc.
///
/// The local frame is rotated by `rotation` and then squashed vertically by
/// `scale_y`, which turns the disc into a rotated ellipse with semi-axes
/// `fill_radius` and `fill_radius * scale_y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradient<'a> {
    pub cx: f64,
    pub cy: f64,
    /// Distance at which the last stop is reached.
    pub radius: f64,
    /// Radius of the filled disc (may differ from `radius`).
    pub fill_radius: f64,
    pub rotation: f64,
    pub scale_y: f64,
    pub stops: &'a [ColorStop],
}

impl<'a> RadialGradient<'a> {
    /// An unrotated circular gradient whose fill matches its radius.
    pub fn circle(cx: f64, cy: f64, radius: f64, stops: &'a [ColorStop]) -> Self {
        Self {
            cx,
            cy,
            radius,
            fill_radius: radius,
            rotation: 0.0,
            scale_y: 1.0,
            stops,
        }
    }

    /// Sets a different fill radius.
    pub fn with_fill_radius(mut self, fill_radius: f64) -> Self {
        self.fill_radius = fill_radius;
        self
    }

    /// Rotates the gradient frame and squashes it vertically.
    pub fn with_transform(mut self, rotation: f64, scale_y: f64) -> Self {
        self.rotation = rotation;
        self.scale_y = scale_y;
        self
    }

    /// True when the gradient covers a non-empty, finite area.
    pub fn is_drawable(&self) -> bool {
        is_positive(self.radius)
            && is_positive(self.fill_radius)
            && is_positive(self.scale_y)
            && self.cx.is_finite()
            && self.cy.is_finite()
            && self.rotation.is_finite()
            && !self.stops.is_empty()
    }

    /// Color at distance fraction `t` (clamped), interpolating between stops.
    pub fn color_at(&self, t: f64) -> Rgba {
        sample_stops(self.stops, t)
    }
}

/// A stroked circular arc, angles in radians measured clockwise from +x
/// (screen coordinates, y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcStroke {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub start: f64,
    pub end: f64,
    pub width: f64,
    pub color: Rgba,
}

/// A stroked straight segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStroke {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub width: f64,
    pub color: Rgba,
}

/// Drawing primitives required by the render emitter.
///
/// Implementations must tolerate degenerate input (zero or negative radii,
/// non-finite coordinates) by drawing nothing.
pub trait Surface {
    /// Sizes the backing store to `width × height` CSS pixels at `dpr`
    /// physical pixels per CSS pixel.
    fn resize(&mut self, width: f64, height: f64, dpr: f64);

    /// Clears the whole surface to transparent.
    fn clear(&mut self);

    /// Fills an axis-aligned rectangle with a solid color (source-over).
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba);

    /// Fills a rectangle with a top-to-bottom linear gradient.
    fn fill_vertical_gradient(&mut self, x: f64, y: f64, w: f64, h: f64, stops: &[ColorStop]);

    /// Fills a disc with a solid color.
    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: Rgba);

    /// Fills a disc (or rotated ellipse) with a radial gradient.
    fn fill_radial_gradient(&mut self, gradient: &RadialGradient<'_>);

    /// Strokes a circular arc.
    fn stroke_arc(&mut self, arc: &ArcStroke);

    /// Strokes a line segment.
    fn stroke_line(&mut self, line: &LineStroke);
}

/// Interpolates a stop list at `t`. Stops are assumed sorted by offset.
///
/// Returns transparent for an empty list.
pub fn sample_stops(stops: &[ColorStop], t: f64) -> Rgba {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let Some(first) = stops.first() else {
        return Rgba::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let frac = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            return a.color.lerp(b.color, frac);
        }
    }
    stops[stops.len() - 1].color
}

fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// An owned record of one drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Resize {
        width: f64,
        height: f64,
        dpr: f64,
    },
    Clear,
    FillRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: Rgba,
    },
    VerticalGradient {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        stops: Vec<ColorStop>,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        color: Rgba,
    },
    Radial {
        cx: f64,
        cy: f64,
        radius: f64,
        fill_radius: f64,
        rotation: f64,
        scale_y: f64,
        stops: Vec<ColorStop>,
    },
    Arc(ArcStroke),
    Line(LineStroke),
}

/// A [`Surface`] that records every call, for inspecting what was drawn.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded calls in order.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drops all recorded calls.
    pub fn reset(&mut self) {
        self.ops.clear();
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, width: f64, height: f64, dpr: f64) {
        self.ops.push(DrawOp::Resize { width, height, dpr });
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        self.ops.push(DrawOp::FillRect { x, y, w, h, color });
    }

    fn fill_vertical_gradient(&mut self, x: f64, y: f64, w: f64, h: f64, stops: &[ColorStop]) {
        self.ops.push(DrawOp::VerticalGradient {
            x,
            y,
            w,
            h,
            stops: stops.to_vec(),
        });
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: Rgba) {
        self.ops.push(DrawOp::Circle { cx, cy, r, color });
    }

    fn fill_radial_gradient(&mut self, g: &RadialGradient<'_>) {
        self.ops.push(DrawOp::Radial {
            cx: g.cx,
            cy: g.cy,
            radius: g.radius,
            fill_radius: g.fill_radius,
            rotation: g.rotation,
            scale_y: g.scale_y,
            stops: g.stops.to_vec(),
        });
    }

    fn stroke_arc(&mut self, arc: &ArcStroke) {
        self.ops.push(DrawOp::Arc(*arc));
    }

    fn stroke_line(&mut self, line: &LineStroke) {
        self.ops.push(DrawOp::Line(*line));
    }
}
