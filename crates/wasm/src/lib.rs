//! Browser bindings: runs a cosmos background on an HTML canvas.
//!
//! ```js
//! const bg = new CosmosBackground(canvas, JSON.stringify({ theme: "neon" }));
//! bg.setConfig(JSON.stringify({ theme: "neon", enabled: false }));
//! bg.destroy();
//! ```
//!
//! Browser closures hold only weak references to the driver. Dropping the
//! `CosmosBackground` (from JS, `bg.free()`) tears it down like `destroy`,
//! which cancels the pending frame and removes every listener.

pub mod canvas;
pub mod raf;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use cosmos_core::{Config, Surface, Theme, Viewport};
use cosmos_engines::driver::{FrameDriver, FrameScheduler};
use cosmos_engines::EngineKind;
use serde_json::Value;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, HtmlCanvasElement, MouseEvent, Window};

use crate::canvas::CanvasSurface;
use crate::raf::{CallbackSlot, RafScheduler};

type Driver = FrameDriver<CanvasSurface, RafScheduler>;
type Listener = Closure<dyn FnMut(Event)>;

const ENGINE: &str = "galaxy";

/// Parses a host config string. Empty input means all defaults.
pub fn parse_config(config_json: &str) -> Result<Config, serde_json::Error> {
    if config_json.trim().is_empty() {
        return Ok(Config::default());
    }
    let value: Value = serde_json::from_str(config_json)?;
    Ok(Config::from_json(&value))
}

fn js_entropy() -> u32 {
    (js_sys::Math::random() * 4_294_967_296.0) as u32
}

fn window() -> Result<Window, JsError> {
    web_sys::window().ok_or_else(|| JsError::new("no global window"))
}

/// Window inner size and device pixel ratio.
fn measure(window: &Window) -> (Viewport, f64) {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (
        Viewport::new(dim(window.inner_width()), dim(window.inner_height())),
        window.device_pixel_ratio(),
    )
}

/// Tears down `driver` unless a callback is borrowing it right now.
fn release<S: Surface, F: FrameScheduler>(driver: &RefCell<FrameDriver<S, F>>) {
    match driver.try_borrow_mut() {
        Ok(mut driver) => driver.teardown(),
        Err(_) => warn!("driver busy during drop, skipping teardown"),
    }
}

fn with_driver(driver: &Weak<RefCell<Driver>>, f: impl FnOnce(&mut Driver)) {
    if let Some(driver) = driver.upgrade() {
        if let Ok(mut driver) = driver.try_borrow_mut() {
            f(&mut driver);
        }
    }
}

/// A running background bound to one canvas.
#[wasm_bindgen]
pub struct CosmosBackground {
    driver: Rc<RefCell<Driver>>,
    window: Window,
}

#[wasm_bindgen]
impl CosmosBackground {
    /// Sizes `canvas` to the window, starts the frame loop, and attaches
    /// pointer and resize listeners.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config_json: &str) -> Result<CosmosBackground, JsError> {
        let config = parse_config(config_json)?;
        let window = window()?;
        let surface = CanvasSurface::new(canvas.clone())
            .map_err(|e| JsError::new(&format!("canvas setup failed: {e:?}")))?;

        let slot: CallbackSlot = Rc::new(RefCell::new(None));
        let scheduler = RafScheduler::new(window.clone(), Rc::clone(&slot));
        let driver = FrameDriver::new(ENGINE, config, surface, scheduler, js_entropy)?;
        let driver = Rc::new(RefCell::new(driver));

        let weak = Rc::downgrade(&driver);
        *slot.borrow_mut() = Some(Closure::new(move |now: f64| {
            with_driver(&weak, |d| d.on_frame(now));
        }));

        let listeners = attach_listeners(&canvas, &window, &driver)?;
        {
            let mut d = driver.borrow_mut();
            d.on_teardown(move || detach_listeners(listeners));
            let (viewport, dpr) = measure(&window);
            d.mount(viewport, dpr)?;
        }
        Ok(CosmosBackground { driver, window })
    }

    /// Applies a new config; anything but `enabled` rebuilds the universe.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&self, config_json: &str) -> Result<(), JsError> {
        let config = parse_config(config_json)?;
        self.driver.borrow_mut().set_config(config)?;
        Ok(())
    }

    /// Re-measures the window and rebuilds.
    pub fn resize(&self) -> Result<(), JsError> {
        let (viewport, dpr) = measure(&self.window);
        self.driver.borrow_mut().resize(viewport, dpr)?;
        Ok(())
    }

    /// Stops the loop and detaches every listener. Safe to call twice.
    pub fn destroy(&self) {
        self.driver.borrow_mut().teardown();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.driver.borrow().is_running()
    }

    /// Current config as a JSON string.
    pub fn params(&self) -> String {
        self.driver.borrow().config().params().to_string()
    }

    /// Entity counts as a JSON string, `null` after `destroy`.
    pub fn counts(&self) -> String {
        self.driver
            .borrow()
            .engine()
            .map(EngineKind::counts)
            .unwrap_or(Value::Null)
            .to_string()
    }
}

impl Drop for CosmosBackground {
    fn drop(&mut self) {
        release(&self.driver);
    }
}

/// Theme names as a JSON array string.
#[wasm_bindgen]
pub fn themes() -> String {
    Value::from(Theme::list_names()).to_string()
}

/// Config schema as a JSON string.
#[wasm_bindgen(js_name = paramSchema)]
pub fn param_schema() -> String {
    Config::param_schema().to_string()
}

fn listen(
    target: &EventTarget,
    name: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(EventTarget, &'static str, Listener), JsError> {
    let closure: Listener = Closure::new(handler);
    target
        .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
        .map_err(|e| JsError::new(&format!("addEventListener({name}) failed: {e:?}")))?;
    Ok((target.clone(), name, closure))
}

fn attach_listeners(
    canvas: &HtmlCanvasElement,
    window: &Window,
    driver: &Rc<RefCell<Driver>>,
) -> Result<Vec<(EventTarget, &'static str, Listener)>, JsError> {
    let canvas_target: &EventTarget = canvas.as_ref();
    let window_target: &EventTarget = window.as_ref();

    let weak = Rc::downgrade(driver);
    let el = canvas.clone();
    let on_move = listen(canvas_target, "mousemove", move |event: Event| {
        let Some(event) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let rect = el.get_bounding_client_rect();
        let x = f64::from(event.client_x()) - rect.left();
        let y = f64::from(event.client_y()) - rect.top();
        with_driver(&weak, |d| d.pointer_move(x, y));
    })?;

    let weak = Rc::downgrade(driver);
    let on_enter = listen(canvas_target, "mouseenter", move |_| {
        with_driver(&weak, Driver::pointer_enter);
    })?;

    let weak = Rc::downgrade(driver);
    let on_leave = listen(canvas_target, "mouseleave", move |_| {
        with_driver(&weak, Driver::pointer_leave);
    })?;

    let weak = Rc::downgrade(driver);
    let win = window.clone();
    let on_resize = listen(window_target, "resize", move |_| {
        let (viewport, dpr) = measure(&win);
        with_driver(&weak, |d| {
            if let Err(e) = d.resize(viewport, dpr) {
                warn!(error = %e, "resize failed");
            }
        });
    })?;

    Ok(vec![on_move, on_enter, on_leave, on_resize])
}

fn detach_listeners(listeners: Vec<(EventTarget, &'static str, Listener)>) {
    for (target, name, closure) in listeners {
        if let Err(e) =
            target.remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
        {
            warn!(event = name, error = ?e, "removeEventListener failed");
        }
    }
}
