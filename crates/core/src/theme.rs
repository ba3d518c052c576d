//! Visual themes: the hue bands galaxy palettes are drawn from.
//!
//! Each theme owns three hue bands with distinct centers, so two galaxies of
//! the same theme still come out visibly different.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Hue range in degrees, `(low, high)`.
pub type HueBand = (f64, f64);

/// Closed set of visual themes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Blue-white stars with a warm amber accent.
    #[default]
    Default,
    /// Blues into violet.
    Cool,
    /// Oranges and gold with a magenta accent.
    Warm,
    /// Magenta, cyan, and azure.
    Neon,
}

const THEME_NAMES: &[&str] = &["default", "cool", "warm", "neon"];

impl Theme {
    /// Looks up a theme by name (case insensitive).
    ///
    /// Returns `EngineError::UnknownTheme` for anything outside the closed set.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name.to_ascii_lowercase().as_str() {
            "default" => Ok(Theme::Default),
            "cool" => Ok(Theme::Cool),
            "warm" => Ok(Theme::Warm),
            "neon" => Ok(Theme::Neon),
            _ => Err(EngineError::UnknownTheme(name.to_owned())),
        }
    }

    /// Returns all theme names.
    pub fn list_names() -> &'static [&'static str] {
        THEME_NAMES
    }

    /// Returns the canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Cool => "cool",
            Theme::Warm => "warm",
            Theme::Neon => "neon",
        }
    }

    /// The three hue bands a galaxy palette samples one hue from each.
    pub fn galaxy_hue_bands(self) -> [HueBand; 3] {
        match self {
            Theme::Default => [(205.0, 235.0), (220.0, 245.0), (30.0, 45.0)],
            Theme::Cool => [(200.0, 235.0), (225.0, 255.0), (260.0, 290.0)],
            Theme::Warm => [(15.0, 35.0), (35.0, 55.0), (280.0, 300.0)],
            Theme::Neon => [(290.0, 320.0), (170.0, 200.0), (200.0, 230.0)],
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
