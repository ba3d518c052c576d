#![deny(unsafe_code)]
//! Procedural galaxy background engine.
//!
//! A drifting field of spiral galaxies, black holes, nebula clouds, a
//! milky-way band, and occasional shooting stars. [`Universe`] owns the
//! whole state and implements [`Engine`]: `step` runs the integrator in
//! [`stepper`], `render` hands the state to [`emitter`].
//!
//! Layouts are reproducible: the same seed, viewport, and config always
//! compose the same universe and evolve it identically.

pub mod composer;
pub mod emitter;
pub mod entities;
pub mod particles;
pub mod stepper;

use cosmos_core::error::EngineError;
use cosmos_core::{Config, CursorState, Engine, FrameTime, Mulberry32, Surface, Viewport};
use serde_json::{json, Value};
use tracing::debug;

use crate::composer::Cosmos;
use crate::entities::{BlackHole, Galaxy, MilkyWaySegment, Nebula, ShootingStar, StarParticle};

/// The complete animated scene for one viewport and config.
///
/// Rebuilding means constructing a fresh `Universe`; there is no in-place
/// migration of old state.
#[derive(Debug, Clone)]
pub struct Universe {
    pub(crate) viewport: Viewport,
    pub(crate) config: Config,
    pub(crate) rng: Mulberry32,
    pub(crate) cosmos: Cosmos,
    pub(crate) stars: Vec<StarParticle>,
    pub(crate) shooting_stars: Vec<ShootingStar>,
}

impl Universe {
    /// Composes and populates a universe, drawing all randomness from `rng`.
    ///
    /// The config is sanitized first, so non-positive multipliers fall back
    /// to their defaults.
    pub fn new(viewport: Viewport, config: &Config, mut rng: Mulberry32) -> Self {
        let config = config.sanitized();
        let cosmos = composer::compose(viewport, &config, &mut rng);
        let stars = particles::build(&cosmos.galaxies, viewport, &config, &mut rng);
        debug!(stars = stars.len(), "built star field");
        Self {
            viewport,
            config,
            rng,
            cosmos,
            stars,
            shooting_stars: Vec::new(),
        }
    }

    /// Builds a universe seeded from `config.seed`, or from `entropy` when
    /// the config carries no seed.
    pub fn with_entropy(viewport: Viewport, config: &Config, entropy: impl FnOnce() -> u32) -> Self {
        Self::new(
            viewport,
            config,
            Mulberry32::from_seed_or(config.seed.as_ref(), entropy),
        )
    }

    /// Builds a universe seeded from `config.seed`, or from OS entropy.
    #[cfg(feature = "entropy")]
    pub fn from_config(viewport: Viewport, config: &Config) -> Self {
        Self::new(
            viewport,
            config,
            Mulberry32::from_optional_seed(config.seed.as_ref()),
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Turns stepping and drawing on or off. Entity state is kept either way.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    pub fn galaxies(&self) -> &[Galaxy] {
        &self.cosmos.galaxies
    }

    pub fn black_holes(&self) -> &[BlackHole] {
        &self.cosmos.black_holes
    }

    pub fn nebulae(&self) -> &[Nebula] {
        &self.cosmos.nebulae
    }

    pub fn milky_way(&self) -> &[MilkyWaySegment] {
        &self.cosmos.milky_way
    }

    pub fn stars(&self) -> &[StarParticle] {
        &self.stars
    }

    pub fn shooting_stars(&self) -> &[ShootingStar] {
        &self.shooting_stars
    }

    pub fn galaxies_mut(&mut self) -> &mut [Galaxy] {
        &mut self.cosmos.galaxies
    }

    pub fn black_holes_mut(&mut self) -> &mut [BlackHole] {
        &mut self.cosmos.black_holes
    }

    pub fn stars_mut(&mut self) -> &mut [StarParticle] {
        &mut self.stars
    }

    pub fn shooting_stars_mut(&mut self) -> &mut Vec<ShootingStar> {
        &mut self.shooting_stars
    }

    /// Entity counts, for logs and the CLI `inspect` command.
    pub fn counts(&self) -> Value {
        json!({
            "galaxies": self.cosmos.galaxies.len(),
            "blackHoles": self.cosmos.black_holes.len(),
            "nebulae": self.cosmos.nebulae.len(),
            "milkyWaySegments": self.cosmos.milky_way.len(),
            "stars": self.stars.len(),
            "shootingStars": self.shooting_stars.len(),
        })
    }

    /// The full entity layout as JSON (stars excluded; they are summarized
    /// by count).
    pub fn layout(&self) -> Value {
        json!({
            "viewport": self.viewport,
            "config": self.config.params(),
            "counts": self.counts(),
            "galaxies": self.cosmos.galaxies,
            "blackHoles": self.cosmos.black_holes,
            "nebulae": self.cosmos.nebulae,
            "milkyWay": self.cosmos.milky_way,
        })
    }
}

impl Engine for Universe {
    fn step(&mut self, time: FrameTime, cursor: CursorState) -> Result<(), EngineError> {
        time.validate()?;
        if self.config.enabled {
            stepper::step(self, time, cursor);
        }
        Ok(())
    }

    fn render(&self, surface: &mut dyn Surface, time: FrameTime) {
        if self.config.enabled {
            emitter::render(self, surface, time);
        } else {
            surface.clear();
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn params(&self) -> Value {
        self.config.params()
    }

    fn param_schema(&self) -> Value {
        Config::param_schema()
    }
}
