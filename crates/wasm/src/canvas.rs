//! [`Surface`] over a 2D canvas context.

use std::f64::consts::TAU;

use cosmos_core::{ArcStroke, ColorStop, LineStroke, RadialGradient, Rgba, Surface};
use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasGradient, CanvasRenderingContext2d, HtmlCanvasElement};

/// Backing-store side in physical pixels for a CSS size at `dpr`.
pub fn backing_size(css: f64, dpr: f64) -> u32 {
    let px = (css * dpr).floor();
    if px.is_finite() && px > 0.0 {
        px.min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

fn check(result: Result<(), JsValue>, op: &'static str) {
    if let Err(e) = result {
        warn!(op, error = ?e, "canvas call failed");
    }
}

fn add_stops(gradient: &CanvasGradient, stops: &[ColorStop]) {
    for stop in stops {
        let offset = stop.offset.clamp(0.0, 1.0) as f32;
        check(gradient.add_color_stop(offset, &stop.color.to_css()), "add_color_stop");
    }
}

fn drawable_radius(r: f64) -> bool {
    r.is_finite() && r > 0.0
}

/// Draws onto an `HtmlCanvasElement` in CSS pixels.
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasSurface {
    /// Acquires the canvas's 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            canvas,
            ctx,
            width: 0.0,
            height: 0.0,
        })
    }

    fn fill_disc(&self, cx: f64, cy: f64, r: f64) {
        self.ctx.begin_path();
        check(self.ctx.arc(cx, cy, r, 0.0, TAU), "arc");
        self.ctx.fill();
    }
}

impl Surface for CanvasSurface {
    fn resize(&mut self, width: f64, height: f64, dpr: f64) {
        self.width = width;
        self.height = height;
        self.canvas.set_width(backing_size(width, dpr));
        self.canvas.set_height(backing_size(height, dpr));
        let style = self.canvas.style();
        check(style.set_property("width", &format!("{width}px")), "style.width");
        check(style.set_property("height", &format!("{height}px")), "style.height");
        check(
            self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0),
            "set_transform",
        );
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(x, y, w, h);
    }

    fn fill_vertical_gradient(&mut self, x: f64, y: f64, w: f64, h: f64, stops: &[ColorStop]) {
        if stops.is_empty() {
            return;
        }
        let gradient = self.ctx.create_linear_gradient(x, y, x, y + h);
        add_stops(&gradient, stops);
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill_rect(x, y, w, h);
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: Rgba) {
        if !drawable_radius(r) {
            return;
        }
        self.ctx.set_fill_style_str(&color.to_css());
        self.fill_disc(cx, cy, r);
    }

    fn fill_radial_gradient(&mut self, g: &RadialGradient<'_>) {
        if !g.is_drawable() {
            return;
        }
        let gradient = match self
            .ctx
            .create_radial_gradient(0.0, 0.0, 0.0, 0.0, 0.0, g.radius)
        {
            Ok(gradient) => gradient,
            Err(e) => {
                warn!(error = ?e, "create_radial_gradient failed");
                return;
            }
        };
        add_stops(&gradient, g.stops);

        self.ctx.save();
        check(self.ctx.translate(g.cx, g.cy), "translate");
        check(self.ctx.rotate(g.rotation), "rotate");
        check(self.ctx.scale(1.0, g.scale_y), "scale");
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.fill_disc(0.0, 0.0, g.fill_radius);
        self.ctx.restore();
    }

    fn stroke_arc(&mut self, arc: &ArcStroke) {
        if !drawable_radius(arc.radius) || !drawable_radius(arc.width) {
            return;
        }
        self.ctx.begin_path();
        check(
            self.ctx.arc(arc.cx, arc.cy, arc.radius, arc.start, arc.end),
            "arc",
        );
        self.ctx.set_stroke_style_str(&arc.color.to_css());
        self.ctx.set_line_width(arc.width);
        self.ctx.stroke();
    }

    fn stroke_line(&mut self, line: &LineStroke) {
        if !drawable_radius(line.width) {
            return;
        }
        self.ctx.begin_path();
        self.ctx.move_to(line.x0, line.y0);
        self.ctx.line_to(line.x1, line.y1);
        self.ctx.set_stroke_style_str(&line.color.to_css());
        self.ctx.set_line_width(line.width);
        self.ctx.stroke();
    }
}
