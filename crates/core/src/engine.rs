//! The core `Engine` trait every animated background implements, plus the
//! per-frame inputs it consumes.
//!
//! The trait is object-safe so engines can be used as `dyn Engine` for runtime
//! switching between different backgrounds.

use crate::error::EngineError;
use crate::surface::Surface;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Viewport size in CSS pixels.
///
/// Negative and non-finite dimensions are stored as zero, so every consumer
/// can divide by `max(dim, 1)` without further checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: sanitize_dim(width),
            height: sanitize_dim(height),
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// The smaller of the two dimensions.
    pub fn min_dim(&self) -> f64 {
        self.width.min(self.height)
    }

    /// True when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

fn sanitize_dim(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Timing for one animation frame.
///
/// `dt` is measured in frame units of a 60 Hz baseline: `1.0` means one
/// nominal frame elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameTime {
    /// Host timestamp in milliseconds.
    pub now_ms: f64,
    pub dt: f64,
}

impl FrameTime {
    /// Duration of one baseline frame in milliseconds.
    pub const BASELINE_MS: f64 = 16.67;
    /// Largest step taken after a stall.
    pub const MAX_DT: f64 = 3.0;

    /// Builds the frame time for `now_ms` given the previous frame's timestamp.
    ///
    /// The delta is clamped to `[0, MAX_DT]`; a clock that runs backwards
    /// yields a zero step.
    pub fn between(last_ms: f64, now_ms: f64) -> Self {
        let raw = (now_ms - last_ms) / Self::BASELINE_MS;
        let dt = if raw.is_finite() {
            raw.clamp(0.0, Self::MAX_DT)
        } else {
            0.0
        };
        Self { now_ms, dt }
    }

    /// A single nominal frame at `now_ms`.
    pub fn at(now_ms: f64) -> Self {
        Self { now_ms, dt: 1.0 }
    }

    /// Host time in seconds.
    pub fn seconds(&self) -> f64 {
        self.now_ms * 0.001
    }

    /// Returns `EngineError::InvalidFrameTime` if either field is NaN or infinite.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.now_ms.is_finite() {
            return Err(EngineError::InvalidFrameTime(self.now_ms));
        }
        if !self.dt.is_finite() {
            return Err(EngineError::InvalidFrameTime(self.dt));
        }
        Ok(())
    }
}

/// Last known pointer position, written by input handlers and read once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorState {
    pub x: f64,
    pub y: f64,
    pub active: bool,
}

impl CursorState {
    /// An active cursor at `(x, y)`.
    pub fn at(x: f64, y: f64) -> Self {
        Self { x, y, active: true }
    }

    /// The position, when the cursor is active and finite.
    pub fn position(&self) -> Option<(f64, f64)> {
        (self.active && self.x.is_finite() && self.y.is_finite()).then_some((self.x, self.y))
    }
}

/// Core trait for animated backgrounds.
///
/// `step` advances simulation state; `render` reads it and draws. Within a
/// frame the host always finishes `step` before calling `render`.
pub trait Engine {
    /// Advance the simulation by one frame.
    fn step(&mut self, time: FrameTime, cursor: CursorState) -> Result<(), EngineError>;

    /// Draw the current state. Must not mutate simulation state.
    fn render(&self, surface: &mut dyn Surface, time: FrameTime);

    /// The viewport the engine was built for.
    fn viewport(&self) -> Viewport;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;
}
