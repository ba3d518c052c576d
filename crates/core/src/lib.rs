#![deny(unsafe_code)]
//! Core types and traits for the cosmos animated background.
//!
//! Provides the `Engine` trait with its per-frame inputs (`FrameTime`,
//! `CursorState`, `Viewport`), the `Surface` drawing-primitive interface,
//! color types (`Srgb`, `Rgba`, `Hsla`), `Theme`, `Config`, the `Mulberry32`
//! PRNG, `Seed`, and parameter helpers.

pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod params;
pub mod prng;
pub mod seed;
pub mod surface;
pub mod theme;

pub use color::{Hsla, Rgba, Srgb};
pub use config::Config;
pub use engine::{CursorState, Engine, FrameTime, Viewport};
pub use error::EngineError;
pub use prng::Mulberry32;
pub use seed::Seed;
pub use surface::{ArcStroke, ColorStop, LineStroke, RadialGradient, Surface};
pub use theme::Theme;
