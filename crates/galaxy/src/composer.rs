//! Universe composer: galaxies, black holes, nebulae, and the milky-way band.
//!
//! Counts scale with viewport area and the density/black-hole multipliers,
//! then floor at fixed minimums so even a zero-sized viewport yields a valid
//! (if invisible) universe.

use std::f64::consts::TAU;

use cosmos_core::{Config, Mulberry32, Viewport};
use tracing::debug;

use crate::entities::{BlackHole, Galaxy, MilkyWaySegment, Nebula, MIN_ORBIT_RADIUS};

/// Viewport area per galaxy at density 1.
pub const GALAXY_AREA: f64 = 450_000.0;
pub const MIN_GALAXIES: usize = 3;
pub const MAX_GALAXIES: usize = 7;
pub const MIN_BLACK_HOLES: usize = 3;
/// Keeps pathological black-hole multipliers from exhausting the frame.
pub const MAX_BLACK_HOLES: usize = 64;
/// Ratio of a black hole's influence radius to its horizon.
pub const INFLUENCE_FACTOR: f64 = 16.0;
pub const MILKY_WAY_SEGMENTS: usize = 20;
/// Smallest galaxy radius, so star orbits always have room above
/// [`MIN_ORBIT_RADIUS`].
pub const MIN_GALAXY_RADIUS: f64 = 2.0 * MIN_ORBIT_RADIUS;

const NEBULA_HUE_BANDS: [(f64, f64); 3] = [(200.0, 225.0), (225.0, 245.0), (190.0, 205.0)];

/// Everything the composer produces. Stars are built separately by
/// [`crate::particles::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct Cosmos {
    pub galaxies: Vec<Galaxy>,
    pub black_holes: Vec<BlackHole>,
    pub nebulae: Vec<Nebula>,
    pub milky_way: Vec<MilkyWaySegment>,
}

/// Galaxy count for a viewport: one per `GALAXY_AREA / density`, clamped.
pub fn galaxy_count(viewport: Viewport, density: f64) -> usize {
    let divisor = GALAXY_AREA / positive_or_one(density);
    let raw = (viewport.area() / divisor).round();
    raw.clamp(MIN_GALAXIES as f64, MAX_GALAXIES as f64) as usize
}

/// Black-hole count for `galaxies` galaxies and the black-hole multiplier.
pub fn black_hole_count(galaxies: usize, factor: f64) -> usize {
    let raw = (galaxies as f64 * 0.4 * positive_or_one(factor)).round();
    raw.clamp(MIN_BLACK_HOLES as f64, MAX_BLACK_HOLES as f64) as usize
}

/// Start and end points of the milky-way axis.
pub fn band_axis(viewport: Viewport) -> ((f64, f64), (f64, f64)) {
    let (w, h) = (viewport.width, viewport.height);
    ((-0.2 * w, 0.2 * h), (1.2 * w, 0.8 * h))
}

/// Length of the milky-way axis, floored at 1.
pub fn band_length(viewport: Viewport) -> f64 {
    let ((x0, y0), (x1, y1)) = band_axis(viewport);
    (x1 - x0).hypot(y1 - y0).max(1.0)
}

/// Composes a universe for `viewport`.
///
/// Draws from `rng` in a fixed order (galaxies, black holes, nebulae, milky
/// way), so a seeded generator always reproduces the same layout.
pub fn compose(viewport: Viewport, config: &Config, rng: &mut Mulberry32) -> Cosmos {
    let config = config.sanitized();

    let galaxies: Vec<Galaxy> = (0..galaxy_count(viewport, config.density))
        .map(|_| compose_galaxy(viewport, &config, rng))
        .collect();
    let black_holes: Vec<BlackHole> = (0..black_hole_count(galaxies.len(), config.black_holes))
        .map(|_| compose_black_hole(viewport, &config, rng))
        .collect();
    let nebula_count = rng.range(3.0, 7.0) as usize;
    let nebulae: Vec<Nebula> = (0..nebula_count)
        .map(|_| compose_nebula(viewport, rng))
        .collect();
    let milky_way = compose_milky_way(viewport, rng);

    debug!(
        width = viewport.width,
        height = viewport.height,
        galaxies = galaxies.len(),
        black_holes = black_holes.len(),
        nebulae = nebulae.len(),
        "composed universe"
    );

    Cosmos {
        galaxies,
        black_holes,
        nebulae,
        milky_way,
    }
}

fn compose_galaxy(viewport: Viewport, config: &Config, rng: &mut Mulberry32) -> Galaxy {
    let (w, h) = (viewport.width, viewport.height);
    let x = rng.range(w * 0.15, w * 0.85);
    let y = rng.range(h * 0.2, h * 0.8);
    let min_dim = viewport.min_dim();
    let max_r = rng
        .range(min_dim * 0.22, min_dim * 0.4)
        .max(MIN_GALAXY_RADIUS);
    let spin = rng.sign() * rng.range(0.005, 0.014) * config.speed;
    let arms = *rng.choice(&[2, 3, 4]);
    let tightness = rng.range(0.015, 0.035);
    let core_glow = rng.range(0.6, 1.0);
    let hues = config
        .theme
        .galaxy_hue_bands()
        .map(|(lo, hi)| rng.range(lo, hi));
    let vx = rng.range(-0.10, 0.10) * config.speed;
    let vy = rng.range(-0.06, 0.06) * config.speed;
    let amp_x = rng.range(40.0, 120.0);
    let amp_y = rng.range(30.0, 90.0);
    let wander_speed = rng.range(0.05, 0.12) * config.speed;
    let phase_x = rng.range(0.0, TAU);
    let phase_y = rng.range(0.0, TAU);

    Galaxy {
        cx: x,
        cy: y,
        bx: x,
        by: y,
        max_r,
        spin,
        arms,
        tightness,
        core_glow,
        hues,
        vx,
        vy,
        amp_x,
        amp_y,
        wander_speed,
        phase_x,
        phase_y,
    }
}

fn compose_black_hole(viewport: Viewport, config: &Config, rng: &mut Mulberry32) -> BlackHole {
    let (w, h) = (viewport.width, viewport.height);
    let drift = (0.8 * config.speed).max(0.5);
    let x = rng.range(w * 0.2, w * 0.8);
    let y = rng.range(h * 0.25, h * 0.75);
    let mass = rng.range(2500.0, 7000.0) * config.black_holes;
    let horizon = rng.range(18.0, 34.0);
    BlackHole {
        x,
        y,
        mass,
        horizon,
        influence: horizon * INFLUENCE_FACTOR,
        vx: rng.range(-0.06, 0.06) * drift,
        vy: rng.range(-0.04, 0.04) * drift,
    }
}

fn compose_nebula(viewport: Viewport, rng: &mut Mulberry32) -> Nebula {
    let (w, h) = (viewport.width, viewport.height);
    let x = rng.range(-0.2 * w, 1.2 * w);
    let y = rng.range(-0.2 * h, 1.2 * h);
    let r = rng.range(0.2, 0.45) * viewport.min_dim();
    let (lo, hi) = *rng.choice(&NEBULA_HUE_BANDS);
    Nebula {
        x,
        y,
        r,
        hue: rng.range(lo, hi),
        sat: rng.range(20.0, 45.0),
        light: rng.range(30.0, 50.0),
        alpha: rng.range(0.025, 0.05),
        vx: rng.range(-0.02, 0.02),
        vy: rng.range(-0.01, 0.01),
    }
}

fn compose_milky_way(viewport: Viewport, rng: &mut Mulberry32) -> Vec<MilkyWaySegment> {
    let ((x0, y0), (x1, y1)) = band_axis(viewport);
    let len = band_length(viewport);
    let (ux, uy) = ((x1 - x0) / len, (y1 - y0) / len);
    let axis_angle = (y1 - y0).atan2(x1 - x0);
    let last = (MILKY_WAY_SEGMENTS - 1) as f64;

    (0..MILKY_WAY_SEGMENTS)
        .map(|i| {
            let t = i as f64 / last;
            MilkyWaySegment {
                x: x0 + (x1 - x0) * t + rng.range(-40.0, 40.0),
                y: y0 + (y1 - y0) * t + rng.range(-30.0, 30.0),
                rx: rng.range(120.0, 240.0),
                ry: rng.range(40.0, 90.0),
                rotation: axis_angle + rng.range(-0.1, 0.1),
                alpha: rng.range(0.015, 0.04),
                ux,
                uy,
                speed: rng.range(0.25, 0.6),
            }
        })
        .collect()
}

fn positive_or_one(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        1.0
    }
}
