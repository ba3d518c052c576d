//! Render emitter: turns universe state into draw calls, back to front.
//!
//! The emitter never mutates state. Every frame starts with a translucent
//! overlay instead of a clear, which leaves fading trails behind moving stars.

use std::f64::consts::PI;

use cosmos_core::{
    ArcStroke, ColorStop, FrameTime, Hsla, LineStroke, RadialGradient, Rgba, Srgb, Surface,
    Viewport,
};

use crate::Universe;

/// Deep-space base color, `#05070d`.
pub fn space_color() -> Srgb {
    Srgb::from_u8(5, 7, 13)
}

/// Mid-sky color of the primed background, `#0b1323`.
pub fn horizon_color() -> Srgb {
    Srgb::from_u8(11, 19, 35)
}

pub const TRAIL_ALPHA: f64 = 0.08;
pub const CORE_ALPHA: f64 = 0.12;
pub const ARC_WIDTH: f64 = 3.0;
pub const ARC_SPIN: f64 = 0.6;
pub const SHOOTING_STAR_WIDTH: f64 = 2.0;
/// Tail length of a shooting star, in frames of its velocity.
pub const SHOOTING_STAR_TAIL: f64 = 2.0;

fn accretion_color() -> Rgba {
    Rgba::from_u8(240, 200, 150, 0.28)
}

/// Paints the opaque background gradient the trails fade into.
///
/// Called on mount and after every resize, before the first frame.
pub fn prime_background(surface: &mut dyn Surface, viewport: Viewport) {
    let stops = [
        ColorStop::new(0.0, space_color().with_alpha(1.0)),
        ColorStop::new(0.5, horizon_color().with_alpha(1.0)),
        ColorStop::new(1.0, space_color().with_alpha(1.0)),
    ];
    surface.fill_vertical_gradient(0.0, 0.0, viewport.width, viewport.height, &stops);
}

/// Draws one frame of `universe`.
pub fn render(universe: &Universe, surface: &mut dyn Surface, time: FrameTime) {
    let viewport = universe.viewport;
    surface.fill_rect(
        0.0,
        0.0,
        viewport.width,
        viewport.height,
        space_color().with_alpha(TRAIL_ALPHA),
    );

    let white = Srgb::from_u8(255, 255, 255);
    for m in &universe.cosmos.milky_way {
        if m.rx <= 0.0 {
            continue;
        }
        let stops = [
            ColorStop::new(0.0, white.with_alpha(m.alpha)),
            ColorStop::new(1.0, white.with_alpha(0.0)),
        ];
        let gradient =
            RadialGradient::circle(m.x, m.y, m.rx, &stops).with_transform(m.rotation, m.ry / m.rx);
        draw_gradient(surface, &gradient);
    }

    for n in &universe.cosmos.nebulae {
        let stops = [
            ColorStop::new(0.0, Hsla::new(n.hue, n.sat, n.light, n.alpha).to_rgba()),
            ColorStop::new(
                0.6,
                Hsla::new(n.hue, n.sat, (n.light - 10.0).max(10.0), n.alpha * 0.5).to_rgba(),
            ),
            ColorStop::new(1.0, Rgba::TRANSPARENT),
        ];
        draw_gradient(surface, &RadialGradient::circle(n.x, n.y, n.r, &stops));
    }

    let core = Srgb::from_u8(255, 255, 245);
    for g in &universe.cosmos.galaxies {
        let stops = [
            ColorStop::new(0.0, core.with_alpha(CORE_ALPHA * g.core_glow)),
            ColorStop::new(1.0, core.with_alpha(0.0)),
        ];
        draw_gradient(surface, &RadialGradient::circle(g.cx, g.cy, g.max_r * 0.5, &stops));
    }

    for s in &universe.stars {
        if is_visible_radius(s.size) && s.x.is_finite() && s.y.is_finite() {
            let color = Hsla::new(s.hue, s.sat, s.light, s.alpha).to_rgba();
            surface.fill_circle(s.x, s.y, s.size, color);
        }
    }

    let rotation = time.seconds() * ARC_SPIN;
    let black = Srgb::from_u8(0, 0, 0);
    let shadow = [
        ColorStop::new(0.0, black.with_alpha(1.0)),
        ColorStop::new(0.7, black.with_alpha(0.7)),
        ColorStop::new(1.0, black.with_alpha(0.0)),
    ];
    for bh in &universe.cosmos.black_holes {
        let gradient = RadialGradient::circle(bh.x, bh.y, bh.horizon * 2.5, &shadow)
            .with_fill_radius(bh.horizon * 2.2);
        draw_gradient(surface, &gradient);

        let radius = bh.horizon * 2.8;
        if !is_visible_radius(radius) {
            continue;
        }
        for (offset, start, end) in [(0.0, 0.15, 0.55), (PI, 0.15, 0.45)] {
            surface.stroke_arc(&ArcStroke {
                cx: bh.x,
                cy: bh.y,
                radius,
                start: rotation + offset + start * PI,
                end: rotation + offset + end * PI,
                width: ARC_WIDTH,
                color: accretion_color(),
            });
        }
    }

    let streak = Rgba::from_u8(255, 255, 255, 0.7);
    for s in &universe.shooting_stars {
        surface.stroke_line(&LineStroke {
            x0: s.x,
            y0: s.y,
            x1: s.x - s.vx * SHOOTING_STAR_TAIL,
            y1: s.y - s.vy * SHOOTING_STAR_TAIL,
            width: SHOOTING_STAR_WIDTH,
            color: streak,
        });
    }
}

fn is_visible_radius(r: f64) -> bool {
    r.is_finite() && r > 0.0
}

fn draw_gradient(surface: &mut dyn Surface, gradient: &RadialGradient<'_>) {
    if gradient.is_drawable() {
        surface.fill_radial_gradient(gradient);
    }
}
