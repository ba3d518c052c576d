//! Particle field builder: the stars that populate each galaxy's arms.

use std::f64::consts::TAU;

use cosmos_core::{Config, Mulberry32, Viewport};

use crate::entities::{Galaxy, StarParticle, MIN_ORBIT_RADIUS};

/// Viewport area per star at density 1.
pub const STAR_AREA: f64 = 9_000.0;
pub const MIN_PARTICLES: usize = 300;
pub const MAX_PARTICLES: usize = 900;
/// Radius floor applied to the raw radial sample before it is brought into
/// the orbit bounds.
const SPAWN_RADIUS_FLOOR: f64 = 12.0;
/// Exponent below 1 biases radii outward, thinning the core.
const RADIUS_EXPONENT: f64 = 0.45;
const ARM_JITTER: f64 = 0.25;
const BRIGHT_FRACTION: f64 = 0.6;

/// Star count for a viewport: one per `STAR_AREA / density`, clamped.
pub fn particle_count(viewport: Viewport, density: f64) -> usize {
    let density = if density.is_finite() && density > 0.0 {
        density
    } else {
        1.0
    };
    let raw = (viewport.area() / (STAR_AREA / density)).round();
    raw.clamp(MIN_PARTICLES as f64, MAX_PARTICLES as f64) as usize
}

/// Builds the star field for `galaxies`.
///
/// Returns an empty field when there are no galaxies to orbit.
pub fn build(
    galaxies: &[Galaxy],
    viewport: Viewport,
    config: &Config,
    rng: &mut Mulberry32,
) -> Vec<StarParticle> {
    if galaxies.is_empty() {
        return Vec::new();
    }
    let config = config.sanitized();
    (0..particle_count(viewport, config.density))
        .map(|_| {
            let index = rng.index(galaxies.len());
            build_star(index, &galaxies[index], config.speed, rng)
        })
        .collect()
}

fn build_star(index: usize, galaxy: &Galaxy, speed: f64, rng: &mut Mulberry32) -> StarParticle {
    let arms = galaxy.arms.max(1) as usize;
    let arm = rng.index(arms);
    let angle = arm as f64 * TAU / arms as f64 + rng.range(-ARM_JITTER, ARM_JITTER);
    let radius = (rng.next_f64().powf(RADIUS_EXPONENT) * galaxy.max_r)
        .max(SPAWN_RADIUS_FLOOR)
        .max(MIN_ORBIT_RADIUS)
        .min(galaxy.max_r);
    let angular_velocity = galaxy.spin + rng.range(-0.003, 0.003);
    let radial_velocity = rng.range(-0.02, 0.02) * speed;
    let hue = *rng.choice(&galaxy.hues);

    let (light, sat, size) = if rng.chance(BRIGHT_FRACTION) {
        (
            rng.range(78.0, 96.0),
            rng.range(8.0, 25.0),
            rng.range(1.2, 2.2),
        )
    } else {
        (
            rng.range(55.0, 72.0),
            rng.range(10.0, 30.0),
            rng.range(0.6, 1.4),
        )
    };
    let twinkle_speed = rng.range(0.8, 3.5);
    let twinkle_phase = rng.range(0.0, TAU);

    let (x, y) = galaxy.spiral_position(angle, radius);
    let mut star = StarParticle {
        galaxy: index,
        angle,
        radius,
        angular_velocity,
        radial_velocity,
        size,
        hue,
        sat,
        light,
        twinkle_speed,
        twinkle_phase,
        x,
        y,
        alpha: 0.0,
    };
    star.alpha = star.twinkle(0.0);
    star
}
