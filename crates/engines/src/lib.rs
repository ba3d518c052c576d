#![deny(unsafe_code)]
//! Engine registry: maps engine names to implementations, drives them frame
//! by frame, and provides CPU-side snapshot rendering.
//!
//! This crate sits between `cosmos-core` (which defines the `Engine` and
//! `Surface` traits) and the engine crates (`cosmos-galaxy`). Both the CLI
//! and WASM bindings depend on it to avoid duplicating dispatch and frame
//! loop logic.

pub mod driver;
pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use cosmos_core::error::EngineError;
use cosmos_core::{Config, CursorState, Engine, FrameTime, Surface, Viewport};
use cosmos_galaxy::Universe;
use serde_json::Value;

/// All available engine names.
const ENGINE_NAMES: &[&str] = &["galaxy"];

/// Enumeration of all available background engines.
///
/// Wraps each engine implementation and delegates `Engine` trait methods.
/// Use [`EngineKind::build`] for string-based construction.
#[derive(Debug, Clone)]
pub enum EngineKind {
    /// Spiral galaxies, black holes, nebulae, and shooting stars.
    Galaxy(Universe),
}

impl EngineKind {
    /// Constructs an engine by name from an already parsed config.
    pub fn build(
        name: &str,
        viewport: Viewport,
        config: &Config,
        entropy: impl FnOnce() -> u32,
    ) -> Result<Self, EngineError> {
        match name {
            "galaxy" => Ok(EngineKind::Galaxy(Universe::with_entropy(
                viewport, config, entropy,
            ))),
            _ => Err(EngineError::UnknownEngine(name.to_string())),
        }
    }

    /// Returns a slice of all recognized engine names.
    pub fn list_engines() -> &'static [&'static str] {
        ENGINE_NAMES
    }

    /// Returns `EngineError::UnknownEngine` unless `name` is registered.
    pub fn check_name(name: &str) -> Result<(), EngineError> {
        if ENGINE_NAMES.contains(&name) {
            Ok(())
        } else {
            Err(EngineError::UnknownEngine(name.to_string()))
        }
    }

    /// Paints the opaque backdrop the engine's trails fade into.
    pub fn prime(&self, surface: &mut dyn Surface) {
        match self {
            EngineKind::Galaxy(u) => cosmos_galaxy::emitter::prime_background(surface, u.viewport()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            EngineKind::Galaxy(u) => u.is_enabled(),
        }
    }

    /// Toggles drawing without touching simulation state.
    pub fn set_enabled(&mut self, enabled: bool) {
        match self {
            EngineKind::Galaxy(u) => u.set_enabled(enabled),
        }
    }

    /// Entity counts as a JSON object.
    pub fn counts(&self) -> Value {
        match self {
            EngineKind::Galaxy(u) => u.counts(),
        }
    }

    /// Full entity layout as a JSON object.
    pub fn layout(&self) -> Value {
        match self {
            EngineKind::Galaxy(u) => u.layout(),
        }
    }
}

impl Engine for EngineKind {
    fn step(&mut self, time: FrameTime, cursor: CursorState) -> Result<(), EngineError> {
        match self {
            EngineKind::Galaxy(e) => e.step(time, cursor),
        }
    }

    fn render(&self, surface: &mut dyn Surface, time: FrameTime) {
        match self {
            EngineKind::Galaxy(e) => e.render(surface, time),
        }
    }

    fn viewport(&self) -> Viewport {
        match self {
            EngineKind::Galaxy(e) => e.viewport(),
        }
    }

    fn params(&self) -> Value {
        match self {
            EngineKind::Galaxy(e) => e.params(),
        }
    }

    fn param_schema(&self) -> Value {
        match self {
            EngineKind::Galaxy(e) => e.param_schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmos_core::surface::{DrawOp, RecordingSurface};
    use serde_json::json;

    fn galaxy_with_entropy(params: Value, entropy: fn() -> u32) -> EngineKind {
        EngineKind::build("galaxy", Viewport::new(800.0, 600.0), &Config::from_json(&params), entropy)
            .unwrap()
    }

    fn galaxy(params: Value) -> EngineKind {
        galaxy_with_entropy(params, || 42)
    }

    #[test]
    fn build_galaxy_succeeds() {
        let engine = EngineKind::build("galaxy", Viewport::new(320.0, 240.0), &Config::default(), || 1);
        assert!(engine.is_ok());
    }

    #[test]
    fn build_unknown_returns_error() {
        let result = EngineKind::build("nonexistent", Viewport::new(32.0, 32.0), &Config::default(), || 1);
        assert!(matches!(result, Err(EngineError::UnknownEngine(_))));
        assert!(EngineKind::check_name("nonexistent").is_err());
        assert!(EngineKind::check_name("galaxy").is_ok());
    }

    #[test]
    fn list_engines_includes_galaxy() {
        assert!(EngineKind::list_engines().contains(&"galaxy"));
    }

    #[test]
    fn trait_delegation_step_and_render() {
        let mut engine = galaxy(json!({"seed": "demo"}));
        assert_eq!(engine.viewport(), Viewport::new(800.0, 600.0));
        engine
            .step(FrameTime::at(16.67), CursorState::default())
            .unwrap();
        let mut surface = RecordingSurface::new();
        engine.render(&mut surface, FrameTime::at(16.67));
        assert!(surface.count(|op| matches!(op, DrawOp::Circle { .. })) > 0);
    }

    #[test]
    fn trait_delegation_params_and_schema() {
        let engine = galaxy(json!({"theme": "neon"}));
        assert_eq!(engine.params()["theme"], "neon");
        assert!(engine.param_schema().get("density").is_some());
    }

    #[test]
    fn seeded_params_ignore_entropy() {
        let a = galaxy_with_entropy(json!({"seed": 7}), || 1);
        let b = galaxy_with_entropy(json!({"seed": 7}), || 2);
        assert_eq!(a.layout(), b.layout());
    }

    #[test]
    fn determinism_same_seed() {
        let mut a = galaxy(json!({"seed": "demo"}));
        let mut b = galaxy(json!({"seed": "demo"}));
        for i in 1..=10 {
            let t = FrameTime::at(i as f64 * 16.67);
            a.step(t, CursorState::default()).unwrap();
            b.step(t, CursorState::default()).unwrap();
        }
        let (mut sa, mut sb) = (RecordingSurface::new(), RecordingSurface::new());
        a.render(&mut sa, FrameTime::at(200.0));
        b.render(&mut sb, FrameTime::at(200.0));
        assert_eq!(sa.ops(), sb.ops());
    }

    #[test]
    fn enabled_toggle_delegates() {
        let mut engine = galaxy(json!({}));
        assert!(engine.is_enabled());
        engine.set_enabled(false);
        assert!(!engine.is_enabled());
        let mut surface = RecordingSurface::new();
        engine.render(&mut surface, FrameTime::at(0.0));
        assert_eq!(surface.ops(), &[DrawOp::Clear]);
    }

    #[test]
    fn prime_paints_background() {
        let engine = galaxy(json!({}));
        let mut surface = RecordingSurface::new();
        engine.prime(&mut surface);
        assert!(matches!(surface.ops()[0], DrawOp::VerticalGradient { .. }));
    }

    #[test]
    fn object_safety() {
        let engine = galaxy(json!({}));
        let boxed: Box<dyn Engine> = Box::new(engine);
        assert_eq!(boxed.viewport().width, 800.0);
    }
}
