//! Entity types that make up a universe.
//!
//! Everything here is plain data. The composer and builder create it, the
//! stepper mutates it, and the emitter reads it.

use serde::Serialize;

/// Smallest orbital radius a star may have around its galaxy core.
pub const MIN_ORBIT_RADIUS: f64 = 16.0;

/// A spiral galaxy.
///
/// The drawn center wanders: a linearly drifting base plus an elliptical
/// Lissajous offset. That motion is purely cosmetic and stands in for
/// orbital mechanics; it has no physical meaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Galaxy {
    /// Current center, recomputed every frame.
    pub cx: f64,
    pub cy: f64,
    /// Drifting base position the center wanders around.
    pub bx: f64,
    pub by: f64,
    pub max_r: f64,
    /// Base angular velocity (radians per frame unit), signed.
    pub spin: f64,
    pub arms: u32,
    /// Extra twist in radians per pixel of radius.
    pub tightness: f64,
    pub core_glow: f64,
    pub hues: [f64; 3],
    pub vx: f64,
    pub vy: f64,
    pub amp_x: f64,
    pub amp_y: f64,
    /// Wander angular frequency in radians per second.
    pub wander_speed: f64,
    pub phase_x: f64,
    pub phase_y: f64,
}

impl Galaxy {
    /// Screen position of a star at polar `(angle, radius)` on the log spiral.
    pub fn spiral_position(&self, angle: f64, radius: f64) -> (f64, f64) {
        let theta = angle + radius * self.tightness;
        (
            self.cx + theta.cos() * radius,
            self.cy + theta.sin() * radius,
        )
    }
}

/// A black hole. Pulls stars, is never pulled back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlackHole {
    pub x: f64,
    pub y: f64,
    pub mass: f64,
    /// Visual event-horizon radius; stars inside it respawn.
    pub horizon: f64,
    /// Radius within which stars feel the pull. Always greater than `horizon`.
    pub influence: f64,
    pub vx: f64,
    pub vy: f64,
}

/// A soft nebula cloud.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Nebula {
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub hue: f64,
    pub sat: f64,
    pub light: f64,
    pub alpha: f64,
    pub vx: f64,
    pub vy: f64,
}

/// One elliptical haze patch of the milky-way band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilkyWaySegment {
    pub x: f64,
    pub y: f64,
    pub rx: f64,
    pub ry: f64,
    pub rotation: f64,
    pub alpha: f64,
    /// Unit direction of the band axis, shared by all segments.
    pub ux: f64,
    pub uy: f64,
    pub speed: f64,
}

/// A star orbiting one galaxy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarParticle {
    /// Index of the owning galaxy.
    pub galaxy: usize,
    pub angle: f64,
    /// Kept within `[MIN_ORBIT_RADIUS, galaxy.max_r]`.
    pub radius: f64,
    pub angular_velocity: f64,
    pub radial_velocity: f64,
    /// Drawn disc radius.
    pub size: f64,
    pub hue: f64,
    pub sat: f64,
    pub light: f64,
    pub twinkle_speed: f64,
    pub twinkle_phase: f64,
    /// Screen position written by the stepper.
    pub x: f64,
    pub y: f64,
    /// Twinkle alpha written by the stepper.
    pub alpha: f64,
}

impl StarParticle {
    /// Keeps the radius inside `[MIN_ORBIT_RADIUS, max_r]`, bouncing the
    /// radial velocity off whichever bound was crossed.
    pub fn reflect_radius(&mut self, max_r: f64) {
        if self.radius < MIN_ORBIT_RADIUS {
            self.radius = MIN_ORBIT_RADIUS;
            self.radial_velocity = self.radial_velocity.abs();
        }
        if self.radius > max_r {
            self.radius = max_r;
            self.radial_velocity = -self.radial_velocity.abs();
        }
    }

    /// Twinkle alpha at `seconds`.
    pub fn twinkle(&self, seconds: f64) -> f64 {
        0.5 + 0.5 * (seconds * self.twinkle_speed + self.twinkle_phase).sin()
    }
}

/// A short-lived streak crossing the sky.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShootingStar {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Remaining lifetime in frame units.
    pub life: f64,
}
