//! Frame driver: owns the animation loop around one engine.
//!
//! The driver is host-agnostic. A [`FrameScheduler`] stands in for the
//! display's refresh callback (`requestAnimationFrame` in a browser, a plain
//! loop in the CLI), and any [`Surface`] can be drawn to. Pointer handlers
//! write a shared [`CursorState`] cell that the driver reads once per frame.
//!
//! Errors and panics escaping a frame are logged and swallowed so a single
//! bad frame never stops the loop.

use std::cell::Cell;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use cosmos_core::error::EngineError;
use cosmos_core::{Config, CursorState, Engine, FrameTime, Surface, Viewport};
use tracing::{debug, info, warn};

use crate::EngineKind;

/// Source of per-frame callbacks.
///
/// `request_frame` asks for exactly one future call to
/// [`FrameDriver::on_frame`]; `cancel_frame` withdraws a pending request.
pub trait FrameScheduler {
    fn request_frame(&mut self);
    fn cancel_frame(&mut self);
}

/// A scheduler that only records requests; the caller pumps frames itself.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ManualScheduler {
    pending: bool,
    requests: usize,
    cancels: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a frame has been requested and not yet taken or cancelled.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consumes the pending request, returning whether there was one.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn requests(&self) -> usize {
        self.requests
    }

    pub fn cancels(&self) -> usize {
        self.cancels
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {
        self.pending = true;
        self.requests += 1;
    }

    fn cancel_frame(&mut self) {
        self.pending = false;
        self.cancels += 1;
    }
}

/// Seed source used when the config carries no seed.
pub type EntropySource = fn() -> u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Running,
    TornDown,
}

/// Device pixel ratio as the host reports it, floored at 1.
pub fn sanitize_dpr(dpr: f64) -> f64 {
    if dpr.is_finite() && dpr > 0.0 {
        dpr.max(1.0)
    } else {
        1.0
    }
}

/// Drives one engine on one surface.
pub struct FrameDriver<S, F> {
    engine_name: String,
    config: Config,
    engine: Option<EngineKind>,
    surface: S,
    scheduler: F,
    cursor: Rc<Cell<CursorState>>,
    seen_pointer: bool,
    viewport: Viewport,
    dpr: f64,
    last_ms: Option<f64>,
    entropy: EntropySource,
    lifecycle: Lifecycle,
    detach: Option<Box<dyn FnOnce()>>,
}

impl<S, F> fmt::Debug for FrameDriver<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameDriver")
            .field("engine", &self.engine_name)
            .field("config", &self.config)
            .field("viewport", &self.viewport)
            .field("dpr", &self.dpr)
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

impl<S: Surface, F: FrameScheduler> FrameDriver<S, F> {
    /// Creates an unmounted driver.
    ///
    /// Returns `EngineError::UnknownEngine` if `engine_name` is not registered.
    pub fn new(
        engine_name: &str,
        config: Config,
        surface: S,
        scheduler: F,
        entropy: EntropySource,
    ) -> Result<Self, EngineError> {
        EngineKind::check_name(engine_name)?;
        Ok(Self {
            engine_name: engine_name.to_string(),
            config: config.sanitized(),
            engine: None,
            surface,
            scheduler,
            cursor: Rc::new(Cell::new(CursorState::default())),
            seen_pointer: false,
            viewport: Viewport::default(),
            dpr: 1.0,
            last_ms: None,
            entropy,
            lifecycle: Lifecycle::Created,
            detach: None,
        })
    }

    /// Sizes the surface, primes the background, builds the universe, and
    /// requests the first frame.
    pub fn mount(&mut self, viewport: Viewport, dpr: f64) -> Result<(), EngineError> {
        if self.lifecycle == Lifecycle::TornDown {
            return Ok(());
        }
        self.apply_viewport(viewport, dpr);
        self.rebuild()?;
        self.lifecycle = Lifecycle::Running;
        self.scheduler.request_frame();
        info!(
            engine = %self.engine_name,
            width = self.viewport.width,
            height = self.viewport.height,
            dpr = self.dpr,
            "mounted"
        );
        Ok(())
    }

    /// Runs one frame at host time `now_ms` and requests the next.
    ///
    /// Does nothing unless the driver is mounted and not torn down.
    pub fn on_frame(&mut self, now_ms: f64) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        let time = FrameTime::between(self.last_ms.unwrap_or(now_ms), now_ms);
        self.last_ms = Some(now_ms);
        self.run_frame(time);
        self.scheduler.request_frame();
    }

    fn run_frame(&mut self, time: FrameTime) {
        let cursor = self.cursor.get();
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        match catch_unwind(AssertUnwindSafe(|| engine.step(time, cursor))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, now_ms = time.now_ms, "frame step failed"),
            Err(_) => warn!(now_ms = time.now_ms, "frame step panicked"),
        }
        let surface = &mut self.surface;
        if catch_unwind(AssertUnwindSafe(|| engine.render(surface, time))).is_err() {
            warn!(now_ms = time.now_ms, "frame render panicked");
        }
    }

    /// Re-measures, re-primes, and rebuilds from scratch.
    pub fn resize(&mut self, viewport: Viewport, dpr: f64) -> Result<(), EngineError> {
        if self.lifecycle != Lifecycle::Running {
            return Ok(());
        }
        self.apply_viewport(viewport, dpr);
        self.rebuild()?;
        info!(
            width = self.viewport.width,
            height = self.viewport.height,
            dpr = self.dpr,
            "resized"
        );
        Ok(())
    }

    /// Applies a new config.
    ///
    /// Any change other than `enabled` rebuilds the universe. Toggling
    /// `enabled` alone keeps every entity where it is.
    pub fn set_config(&mut self, next: Config) -> Result<(), EngineError> {
        let next = next.sanitized();
        let rebuild = self.config.requires_rebuild(&next);
        let toggled = self.config.enabled != next.enabled;
        self.config = next;
        if self.lifecycle != Lifecycle::Running {
            return Ok(());
        }
        if rebuild {
            self.rebuild()?;
            info!(engine = %self.engine_name, "config changed, rebuilt");
        } else if toggled {
            let enabled = self.config.enabled;
            if let Some(engine) = self.engine.as_mut() {
                engine.set_enabled(enabled);
                if enabled {
                    engine.prime(&mut self.surface);
                }
            }
            info!(enabled, "toggled");
        }
        Ok(())
    }

    /// Builds a fresh engine and swaps it in, then primes the background.
    fn rebuild(&mut self) -> Result<(), EngineError> {
        let engine = EngineKind::build(&self.engine_name, self.viewport, &self.config, self.entropy)?;
        engine.prime(&mut self.surface);
        debug!(counts = %engine.counts(), "rebuilt");
        self.engine = Some(engine);
        Ok(())
    }

    fn apply_viewport(&mut self, viewport: Viewport, dpr: f64) {
        self.viewport = viewport;
        self.dpr = sanitize_dpr(dpr);
        self.surface
            .resize(viewport.width, viewport.height, self.dpr);
    }

    /// Records the pointer at `(x, y)` in viewport coordinates.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.seen_pointer = true;
        self.cursor.set(CursorState::at(x, y));
    }

    /// Reactivates the last known pointer position, if there is one.
    pub fn pointer_enter(&mut self) {
        if self.seen_pointer {
            let mut cursor = self.cursor.get();
            cursor.active = true;
            self.cursor.set(cursor);
        }
    }

    pub fn pointer_leave(&mut self) {
        let mut cursor = self.cursor.get();
        cursor.active = false;
        self.cursor.set(cursor);
    }

    /// Shared handle to the cursor cell, for input handlers that live
    /// outside the driver.
    pub fn cursor_handle(&self) -> Rc<Cell<CursorState>> {
        Rc::clone(&self.cursor)
    }

    /// Registers the callback that detaches host listeners on teardown.
    pub fn on_teardown(&mut self, detach: impl FnOnce() + 'static) {
        self.detach = Some(Box::new(detach));
    }

    /// Cancels the pending frame, detaches listeners, and drops the engine.
    /// Later calls are no-ops.
    pub fn teardown(&mut self) {
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        self.scheduler.cancel_frame();
        if let Some(detach) = self.detach.take() {
            detach();
        }
        self.engine = None;
        self.lifecycle = Lifecycle::TornDown;
        info!(engine = %self.engine_name, "torn down");
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn engine(&self) -> Option<&EngineKind> {
        self.engine.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn dpr(&self) -> f64 {
        self.dpr
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }
}
