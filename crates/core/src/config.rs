//! Host-supplied configuration for a background session.
//!
//! Mirrors the host's config object
//! `{ seed?, theme?, speed=1, density=1, blackHoles=1, shooters=true, enabled=true }`.
//! Parsing is lenient: unknown themes and non-positive multipliers fall back
//! to their defaults instead of failing.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::EngineError;
use crate::params::{param_bool, param_positive_f64, param_seed, param_string};
use crate::seed::Seed;
use crate::theme::Theme;

const DEFAULT_SPEED: f64 = 1.0;
const DEFAULT_DENSITY: f64 = 1.0;
const DEFAULT_BLACK_HOLES: f64 = 1.0;

/// Session configuration.
///
/// Everything except `enabled` shapes the generated universe; changing any of
/// those fields requires a full rebuild (see [`Config::requires_rebuild`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Reproducible layouts when present.
    pub seed: Option<Seed>,
    pub theme: Theme,
    /// Multiplier on angular and linear velocities.
    pub speed: f64,
    /// Multiplier on entity and particle counts.
    pub density: f64,
    /// Multiplier on black-hole count and mass.
    #[serde(alias = "blackHoleFactor")]
    pub black_holes: f64,
    /// Whether shooting stars spawn.
    pub shooters: bool,
    /// When false the loop keeps running but only clears the surface.
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            theme: Theme::Default,
            speed: DEFAULT_SPEED,
            density: DEFAULT_DENSITY,
            black_holes: DEFAULT_BLACK_HOLES,
            shooters: true,
            enabled: true,
        }
    }
}

impl Config {
    /// Extracts a config from a JSON object, falling back to defaults.
    ///
    /// Accepts `blackHoleFactor` as an alias of `blackHoles`.
    pub fn from_json(params: &Value) -> Self {
        let theme = Theme::from_name(&param_string(params, "theme", "default")).unwrap_or_default();
        let black_holes_fallback =
            param_positive_f64(params, "blackHoleFactor", DEFAULT_BLACK_HOLES);
        Self {
            seed: param_seed(params, "seed"),
            theme,
            speed: param_positive_f64(params, "speed", DEFAULT_SPEED),
            density: param_positive_f64(params, "density", DEFAULT_DENSITY),
            black_holes: param_positive_f64(params, "blackHoles", black_holes_fallback),
            shooters: param_bool(params, "shooters", true),
            enabled: param_bool(params, "enabled", true),
        }
    }

    /// Strict counterpart of [`Config::from_json`] for user-typed input.
    ///
    /// Rejects unknown keys with `EngineError::ParamNotFound`, wrongly typed
    /// or non-positive values with `EngineError::ParamTypeMismatch`, and
    /// unknown themes with `EngineError::UnknownTheme`.
    pub fn try_from_json(params: &Value) -> Result<Self, EngineError> {
        let Some(object) = params.as_object() else {
            return Err(mismatch("params", "object", params));
        };
        for (key, value) in object {
            match key.as_str() {
                "seed" => {
                    if value.is_array() || value.is_object() {
                        return Err(mismatch(key, "string|number", value));
                    }
                }
                "theme" => {
                    let name = value
                        .as_str()
                        .ok_or_else(|| mismatch(key, "string", value))?;
                    Theme::from_name(name)?;
                }
                "speed" | "density" | "blackHoles" | "blackHoleFactor" => {
                    match value.as_f64() {
                        Some(v) if v.is_finite() && v > 0.0 => {}
                        _ => return Err(mismatch(key, "positive number", value)),
                    }
                }
                "shooters" | "enabled" => {
                    if !value.is_boolean() {
                        return Err(mismatch(key, "boolean", value));
                    }
                }
                _ => return Err(EngineError::ParamNotFound(key.clone())),
            }
        }
        Ok(Self::from_json(params))
    }

    /// Returns a copy with every multiplier strictly positive and finite.
    pub fn sanitized(&self) -> Self {
        let positive = |v: f64, default: f64| {
            if v.is_finite() && v > 0.0 {
                v
            } else {
                default
            }
        };
        Self {
            speed: positive(self.speed, DEFAULT_SPEED),
            density: positive(self.density, DEFAULT_DENSITY),
            black_holes: positive(self.black_holes, DEFAULT_BLACK_HOLES),
            ..self.clone()
        }
    }

    /// True when switching from `self` to `next` invalidates the universe.
    ///
    /// Only `enabled` may change without a rebuild.
    pub fn requires_rebuild(&self, next: &Config) -> bool {
        self.seed != next.seed
            || self.theme != next.theme
            || self.speed != next.speed
            || self.density != next.density
            || self.black_holes != next.black_holes
            || self.shooters != next.shooters
    }

    /// Current values as a JSON object in the host's key names.
    pub fn params(&self) -> Value {
        json!({
            "seed": self.seed,
            "theme": self.theme,
            "speed": self.speed,
            "density": self.density,
            "blackHoles": self.black_holes,
            "shooters": self.shooters,
            "enabled": self.enabled,
        })
    }

    /// Schema describing every key, its type, range, and default.
    pub fn param_schema() -> Value {
        json!({
            "seed": {
                "type": "string|number",
                "default": null,
                "description": "Seed for reproducible layouts; omitted or falsy means random"
            },
            "theme": {
                "type": "string",
                "default": "default",
                "options": Theme::list_names(),
                "description": "Hue bands for galaxy palettes"
            },
            "speed": {
                "type": "number",
                "default": DEFAULT_SPEED,
                "min": 0.0,
                "exclusiveMin": true,
                "description": "Multiplier on all angular and linear velocities"
            },
            "density": {
                "type": "number",
                "default": DEFAULT_DENSITY,
                "min": 0.0,
                "exclusiveMin": true,
                "description": "Multiplier on galaxy and star counts"
            },
            "blackHoles": {
                "type": "number",
                "default": DEFAULT_BLACK_HOLES,
                "min": 0.0,
                "exclusiveMin": true,
                "description": "Multiplier on black-hole count and mass"
            },
            "shooters": {
                "type": "boolean",
                "default": true,
                "description": "Spawn occasional shooting stars"
            },
            "enabled": {
                "type": "boolean",
                "default": true,
                "description": "Render the background; when false the surface is kept clear"
            }
        })
    }
}

fn mismatch(name: &str, expected: &str, got: &Value) -> EngineError {
    EngineError::ParamTypeMismatch {
        name: name.to_owned(),
        expected: expected.to_owned(),
        got: got.to_string(),
    }
}
