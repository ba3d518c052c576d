//! Per-frame integrator.
//!
//! Stages run in a fixed order every frame:
//!
//! 1. galaxy drift and wander
//! 2. milky-way band scroll
//! 3. nebula drift
//! 4. star orbits
//! 5. black-hole drift and gravity
//! 6. cursor attraction
//! 7. twinkle
//! 8. shooting-star spawn
//! 9. shooting-star motion and retirement
//!
//! Gravity is deliberately one-sided: stars feel black holes, black holes
//! feel nothing. This is a visual effect, not an N-body simulation.

use std::f64::consts::PI;
use std::f64::consts::TAU;

use cosmos_core::{CursorState, FrameTime, Mulberry32, Viewport};

use crate::composer::{band_axis, band_length};
use crate::entities::{BlackHole, Galaxy, MilkyWaySegment, Nebula, ShootingStar, StarParticle};
use crate::Universe;

/// Margin outside the viewport at which black holes wrap.
pub const BLACK_HOLE_MARGIN: f64 = 50.0;
/// Softening term in the gravity falloff `mass / (d² + SOFTENING)`.
pub const GRAVITY_SOFTENING: f64 = 200.0;
pub const GRAVITY_GAIN: f64 = 4.0;
pub const TANGENTIAL_GAIN: f64 = 1e-5;
/// Respawned stars land at least this far outside the horizon.
pub const RESPAWN_CLEARANCE: f64 = 60.0;
pub const CURSOR_PULL: f64 = 0.015;
pub const SHOOTING_STAR_RATE: f64 = 0.04;
pub const MAX_SHOOTING_STARS: usize = 4;
/// Shooting stars are retired this far outside the viewport.
pub const SHOOTING_STAR_MARGIN: f64 = 100.0;

/// Advances `universe` by one frame.
///
/// An empty viewport leaves the state untouched.
pub fn step(universe: &mut Universe, time: FrameTime, cursor: CursorState) {
    let viewport = universe.viewport;
    if viewport.is_empty() {
        return;
    }
    let dt = time.dt;
    let seconds = time.seconds();
    let cosmos = &mut universe.cosmos;

    advance_galaxies(&mut cosmos.galaxies, viewport, dt, seconds);
    advance_milky_way(&mut cosmos.milky_way, viewport, dt);
    advance_nebulae(&mut cosmos.nebulae, viewport, dt);
    advance_stars(&mut universe.stars, &cosmos.galaxies, dt);
    drift_black_holes(&mut cosmos.black_holes, viewport, dt);
    apply_gravity(
        &mut universe.stars,
        &cosmos.galaxies,
        &cosmos.black_holes,
        dt,
        &mut universe.rng,
    );
    if let Some((mx, my)) = cursor.position() {
        attract_to_cursor(&mut universe.stars, mx, my, dt);
    }
    for star in &mut universe.stars {
        star.alpha = star.twinkle(seconds);
    }
    if universe.config.shooters {
        maybe_spawn_shooting_star(
            &mut universe.shooting_stars,
            viewport,
            universe.config.speed,
            dt,
            &mut universe.rng,
        );
    }
    advance_shooting_stars(&mut universe.shooting_stars, viewport, dt);
}

/// Toroidal wrap that teleports across the whole `[lo, hi]` span.
fn wrap(v: f64, lo: f64, hi: f64) -> f64 {
    if v < lo {
        hi
    } else if v > hi {
        lo
    } else {
        v
    }
}

pub(crate) fn advance_galaxies(galaxies: &mut [Galaxy], viewport: Viewport, dt: f64, seconds: f64) {
    for g in galaxies {
        g.bx = wrap(g.bx + g.vx * dt, -g.max_r, viewport.width + g.max_r);
        g.by = wrap(g.by + g.vy * dt, -g.max_r, viewport.height + g.max_r);
        let phase = seconds * g.wander_speed;
        g.cx = g.bx + (phase + g.phase_x).cos() * g.amp_x;
        g.cy = g.by + (phase * 0.85 + g.phase_y).sin() * g.amp_y;
    }
}

/// Drifts segments along the band. A segment leaving the viewport grown by
/// 40% per side jumps one band length along the axis, toward the band's
/// midpoint.
pub(crate) fn advance_milky_way(segments: &mut [MilkyWaySegment], viewport: Viewport, dt: f64) {
    let (w, h) = (viewport.width, viewport.height);
    let ((x0, y0), _) = band_axis(viewport);
    let shift = band_length(viewport);
    for m in segments {
        m.x += m.ux * m.speed * dt;
        m.y += m.uy * m.speed * dt;
        if m.x < -0.4 * w || m.y < -0.4 * h || m.x > 1.4 * w || m.y > 1.4 * h {
            let along = (m.x - x0) * m.ux + (m.y - y0) * m.uy;
            let dir = if along > 0.5 * shift { -1.0 } else { 1.0 };
            m.x += dir * m.ux * shift;
            m.y += dir * m.uy * shift;
        }
    }
}

pub(crate) fn advance_nebulae(nebulae: &mut [Nebula], viewport: Viewport, dt: f64) {
    for n in nebulae {
        n.x = wrap(n.x + n.vx * dt, -n.r, viewport.width + n.r);
        n.y = wrap(n.y + n.vy * dt, -n.r, viewport.height + n.r);
    }
}

pub(crate) fn advance_stars(stars: &mut [StarParticle], galaxies: &[Galaxy], dt: f64) {
    for s in stars {
        let Some(g) = galaxies.get(s.galaxy) else {
            continue;
        };
        s.angle += s.angular_velocity * dt;
        s.radius += s.radial_velocity * dt;
        s.reflect_radius(g.max_r);
        (s.x, s.y) = g.spiral_position(s.angle, s.radius);
    }
}

pub(crate) fn drift_black_holes(holes: &mut [BlackHole], viewport: Viewport, dt: f64) {
    for bh in holes {
        bh.x = wrap(
            bh.x + bh.vx * dt,
            -BLACK_HOLE_MARGIN,
            viewport.width + BLACK_HOLE_MARGIN,
        );
        bh.y = wrap(
            bh.y + bh.vy * dt,
            -BLACK_HOLE_MARGIN,
            viewport.height + BLACK_HOLE_MARGIN,
        );
    }
}

/// Pulls stars inward and bends their orbits near black holes; stars that
/// cross a horizon respawn on the far side of their galaxy.
pub(crate) fn apply_gravity(
    stars: &mut [StarParticle],
    galaxies: &[Galaxy],
    holes: &[BlackHole],
    dt: f64,
    rng: &mut Mulberry32,
) {
    for s in stars {
        let Some(g) = galaxies.get(s.galaxy) else {
            continue;
        };
        for bh in holes {
            let dx = bh.x - s.x;
            let dy = bh.y - s.y;
            let d2 = dx * dx + dy * dy;
            let d = d2.sqrt();
            if d >= bh.influence {
                continue;
            }
            let pull = bh.mass / (d2 + GRAVITY_SOFTENING) * dt;
            s.radius -= pull * GRAVITY_GAIN;
            s.reflect_radius(g.max_r);
            s.angular_velocity +=
                (dx * -s.angle.sin() + dy * s.angle.cos()) * TANGENTIAL_GAIN * dt;

            if d < bh.horizon {
                let floor = (bh.horizon + RESPAWN_CLEARANCE).min(g.max_r);
                s.radius = rng.range(floor, g.max_r);
                s.angle = rng.range(0.0, TAU);
                s.angular_velocity *= rng.sign();
                (s.x, s.y) = g.spiral_position(s.angle, s.radius);
            }
        }
    }
}

pub(crate) fn attract_to_cursor(stars: &mut [StarParticle], mx: f64, my: f64, dt: f64) {
    for s in stars {
        s.x += (mx - s.x) * CURSOR_PULL * dt;
        s.y += (my - s.y) * CURSOR_PULL * dt;
    }
}

pub(crate) fn maybe_spawn_shooting_star(
    stars: &mut Vec<ShootingStar>,
    viewport: Viewport,
    speed: f64,
    dt: f64,
    rng: &mut Mulberry32,
) {
    if stars.len() >= MAX_SHOOTING_STARS || !rng.chance(SHOOTING_STAR_RATE * dt) {
        return;
    }
    let (w, h) = (viewport.width, viewport.height);
    let from_left = rng.chance(0.5);
    let x = if from_left {
        rng.range(-50.0, 0.3 * w)
    } else {
        rng.range(0.7 * w, w + 50.0)
    };
    let y = rng.range(-50.0, 0.25 * h);
    let heading = if from_left {
        rng.range(0.10 * PI, 0.25 * PI)
    } else {
        rng.range(0.75 * PI, 0.90 * PI)
    };
    let velocity = rng.range(6.0, 12.0) * speed;
    stars.push(ShootingStar {
        x,
        y,
        vx: heading.cos() * velocity,
        vy: heading.sin() * velocity,
        life: rng.range(24.0, 48.0),
    });
}

pub(crate) fn advance_shooting_stars(stars: &mut Vec<ShootingStar>, viewport: Viewport, dt: f64) {
    for s in stars.iter_mut() {
        s.x += s.vx * dt;
        s.y += s.vy * dt;
        s.life -= dt;
    }
    stars.retain(|s| {
        s.life > 0.0
            && s.x >= -SHOOTING_STAR_MARGIN
            && s.x <= viewport.width + SHOOTING_STAR_MARGIN
            && s.y <= viewport.height + SHOOTING_STAR_MARGIN
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::MIN_ORBIT_RADIUS;

    fn galaxy() -> Galaxy {
        Galaxy {
            cx: 500.0,
            cy: 400.0,
            bx: 500.0,
            by: 400.0,
            max_r: 200.0,
            spin: 0.01,
            arms: 2,
            tightness: 0.02,
            core_glow: 0.8,
            hues: [210.0, 230.0, 40.0],
            vx: 0.0,
            vy: 0.0,
            amp_x: 0.0,
            amp_y: 0.0,
            wander_speed: 0.0,
            phase_x: 0.0,
            phase_y: 0.0,
        }
    }

    fn star(radius: f64) -> StarParticle {
        StarParticle {
            galaxy: 0,
            angle: 0.0,
            radius,
            angular_velocity: 0.0,
            radial_velocity: 0.0,
            size: 1.0,
            hue: 210.0,
            sat: 10.0,
            light: 90.0,
            twinkle_speed: 1.0,
            twinkle_phase: 0.0,
            x: 0.0,
            y: 0.0,
            alpha: 1.0,
        }
    }

    fn hole(x: f64, y: f64) -> BlackHole {
        BlackHole {
            x,
            y,
            mass: 5000.0,
            horizon: 20.0,
            influence: 320.0,
            vx: 0.0,
            vy: 0.0,
        }
    }

    const VIEW: Viewport = Viewport {
        width: 1000.0,
        height: 800.0,
    };

    // -- Wrapping --

    #[test]
    fn galaxy_base_wraps_past_its_radius() {
        let mut gs = vec![Galaxy {
            bx: 1000.0 + 199.9,
            vx: 1.0,
            ..galaxy()
        }];
        advance_galaxies(&mut gs, VIEW, 1.0, 0.0);
        assert_eq!(gs[0].bx, -200.0);
    }

    #[test]
    fn galaxy_center_follows_lissajous_offset() {
        let mut gs = vec![Galaxy {
            amp_x: 100.0,
            amp_y: 50.0,
            wander_speed: 0.1,
            ..galaxy()
        }];
        advance_galaxies(&mut gs, VIEW, 0.0, 10.0);
        assert!((gs[0].cx - (500.0 + 1.0f64.cos() * 100.0)).abs() < 1e-9);
        assert!((gs[0].cy - (400.0 + 0.85f64.sin() * 50.0)).abs() < 1e-9);
    }

    #[test]
    fn black_holes_wrap_at_margin() {
        let mut holes = vec![BlackHole {
            vx: -1.0,
            ..hole(-49.5, 100.0)
        }];
        drift_black_holes(&mut holes, VIEW, 1.0);
        assert_eq!(holes[0].x, 1050.0);
    }

    #[test]
    fn nebulae_wrap_at_their_radius() {
        let mut nebulae = vec![Nebula {
            x: 0.0,
            y: 800.0 + 99.0,
            r: 100.0,
            hue: 210.0,
            sat: 30.0,
            light: 40.0,
            alpha: 0.03,
            vx: 0.0,
            vy: 2.0,
        }];
        advance_nebulae(&mut nebulae, VIEW, 1.0);
        assert_eq!(nebulae[0].y, -100.0);
    }

    #[test]
    fn milky_way_shifts_back_along_axis() {
        let len = band_length(VIEW);
        let (ux, uy) = (1400.0 / len, 480.0 / len);
        let mut segments = vec![MilkyWaySegment {
            x: 1399.9,
            y: 700.0,
            rx: 150.0,
            ry: 50.0,
            rotation: 0.3,
            alpha: 0.02,
            ux,
            uy,
            speed: 0.5,
        }];
        advance_milky_way(&mut segments, VIEW, 1.0);
        let m = &segments[0];
        assert!(m.x < 1400.0 && m.x > -400.0, "x {}", m.x);
        // The displacement is parallel to the axis.
        let (dx, dy) = (m.x - 1399.9, m.y - 700.0);
        assert!((dx * uy - dy * ux).abs() < 1e-9);
    }

    #[test]
    fn milky_way_trailing_exit_shifts_forward() {
        let len = band_length(VIEW);
        let (ux, uy) = (1400.0 / len, 480.0 / len);
        let mut segments = vec![MilkyWaySegment {
            x: -401.0,
            y: 100.0,
            rx: 150.0,
            ry: 50.0,
            rotation: 0.3,
            alpha: 0.02,
            ux,
            uy,
            speed: 0.5,
        }];
        advance_milky_way(&mut segments, VIEW, 1.0);
        let m = &segments[0];
        assert!(m.x > 900.0 && m.x < 1400.0, "x {}", m.x);
    }

    #[test]
    fn milky_way_stays_put_on_narrow_viewport() {
        let view = Viewport::new(100.0, 700.0);
        let ((x0, y0), (x1, y1)) = band_axis(view);
        let len = band_length(view);
        let (ux, uy) = ((x1 - x0) / len, (y1 - y0) / len);
        // Jitter pushed these past the trailing and leading edges.
        let mut segments: Vec<MilkyWaySegment> = [(-0.2 * 100.0 - 40.0, y0), (x1 + 40.0, y1 - 30.0)]
            .into_iter()
            .map(|(x, y)| MilkyWaySegment {
                x,
                y,
                rx: 150.0,
                ry: 50.0,
                rotation: 0.3,
                alpha: 0.02,
                ux,
                uy,
                speed: 0.6,
            })
            .collect();
        for _ in 0..2000 {
            advance_milky_way(&mut segments, view, 3.0);
            for m in &segments {
                assert!((-200.0..=300.0).contains(&m.x), "x {}", m.x);
                assert!((-1400.0..=2100.0).contains(&m.y), "y {}", m.y);
            }
        }
    }

    // -- Orbits --

    #[test]
    fn outward_overshoot_clamps_and_flips_in_one_step() {
        let gs = vec![galaxy()];
        let mut stars = vec![StarParticle {
            radial_velocity: 0.5,
            ..star(199.8)
        }];
        advance_stars(&mut stars, &gs, 1.0);
        assert_eq!(stars[0].radius, 200.0);
        assert!(stars[0].radial_velocity < 0.0);
    }

    #[test]
    fn orbit_position_uses_log_spiral() {
        let gs = vec![galaxy()];
        let mut stars = vec![star(100.0)];
        advance_stars(&mut stars, &gs, 1.0);
        let theta: f64 = 100.0 * 0.02;
        assert!((stars[0].x - (500.0 + theta.cos() * 100.0)).abs() < 1e-9);
        assert!((stars[0].y - (400.0 + theta.sin() * 100.0)).abs() < 1e-9);
    }

    // -- Gravity --

    #[test]
    fn gravity_pulls_inward_but_never_moves_the_hole() {
        let gs = vec![galaxy()];
        let mut stars = vec![star(150.0)];
        advance_stars(&mut stars, &gs, 0.0);
        let holes = vec![hole(stars[0].x + 100.0, stars[0].y)];
        let before = holes.clone();
        let mut rng = Mulberry32::new(1);
        apply_gravity(&mut stars, &gs, &holes, 1.0, &mut rng);
        assert!(stars[0].radius < 150.0);
        assert!(stars[0].radius >= MIN_ORBIT_RADIUS);
        assert_eq!(holes, before);
    }

    #[test]
    fn out_of_influence_stars_are_untouched() {
        let gs = vec![galaxy()];
        let mut stars = vec![star(150.0)];
        advance_stars(&mut stars, &gs, 0.0);
        let untouched = stars.clone();
        let holes = vec![hole(-5000.0, -5000.0)];
        apply_gravity(&mut stars, &gs, &holes, 1.0, &mut Mulberry32::new(1));
        assert_eq!(stars, untouched);
    }

    #[test]
    fn crossing_the_horizon_respawns_outside_clearance() {
        let gs = vec![galaxy()];
        for seed in 0..50 {
            let mut stars = vec![star(120.0)];
            advance_stars(&mut stars, &gs, 0.0);
            let holes = vec![hole(stars[0].x, stars[0].y)];
            apply_gravity(&mut stars, &gs, &holes, 1.0, &mut Mulberry32::new(seed));
            let s = &stars[0];
            assert!(s.radius >= 20.0 + RESPAWN_CLEARANCE, "radius {}", s.radius);
            assert!(s.radius <= 200.0);
            let (x, y) = gs[0].spiral_position(s.angle, s.radius);
            assert_eq!((s.x, s.y), (x, y));
        }
    }

    #[test]
    fn respawn_in_tiny_galaxy_clamps_to_max_radius() {
        let gs = vec![Galaxy {
            max_r: 40.0,
            ..galaxy()
        }];
        let mut stars = vec![star(30.0)];
        advance_stars(&mut stars, &gs, 0.0);
        let holes = vec![hole(stars[0].x, stars[0].y)];
        apply_gravity(&mut stars, &gs, &holes, 1.0, &mut Mulberry32::new(3));
        assert_eq!(stars[0].radius, 40.0);
    }

    // -- Cursor --

    #[test]
    fn cursor_nudges_toward_pointer() {
        let mut stars = vec![StarParticle {
            x: 100.0,
            y: 100.0,
            ..star(50.0)
        }];
        attract_to_cursor(&mut stars, 200.0, 300.0, 1.0);
        assert!((stars[0].x - 101.5).abs() < 1e-12);
        assert!((stars[0].y - 103.0).abs() < 1e-12);
    }

    // -- Shooting stars --

    #[test]
    fn shooting_stars_cap_at_four() {
        let mut stars = Vec::new();
        let mut rng = Mulberry32::new(9);
        for _ in 0..10_000 {
            maybe_spawn_shooting_star(&mut stars, VIEW, 1.0, 3.0, &mut rng);
            assert!(stars.len() <= MAX_SHOOTING_STARS);
        }
        assert_eq!(stars.len(), MAX_SHOOTING_STARS);
        for s in &stars {
            assert!(s.vy > 0.0, "shooting stars head downward");
            assert!((24.0..=48.0).contains(&s.life));
        }
    }

    #[test]
    fn shooting_stars_retire_when_spent_or_offscreen() {
        let base = ShootingStar {
            x: 500.0,
            y: 100.0,
            vx: 0.0,
            vy: 0.0,
            life: 10.0,
        };
        let mut stars = vec![
            base.clone(),
            ShootingStar { life: 0.5, ..base.clone() },
            ShootingStar { x: 1099.0, vx: 5.0, ..base.clone() },
            ShootingStar { y: 899.0, vy: 5.0, ..base.clone() },
        ];
        advance_shooting_stars(&mut stars, VIEW, 1.0);
        assert_eq!(stars.len(), 1);
        assert_eq!(stars[0].life, 9.0);
    }
}
