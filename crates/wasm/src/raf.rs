//! `requestAnimationFrame` as a [`FrameScheduler`].

use std::cell::RefCell;
use std::rc::Rc;

use cosmos_engines::driver::FrameScheduler;
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

/// The callback the browser invokes with its frame timestamp.
pub type FrameCallback = Closure<dyn FnMut(f64)>;

/// Shared slot for the frame callback, filled once the driver exists.
pub type CallbackSlot = Rc<RefCell<Option<FrameCallback>>>;

/// Schedules frames on the window's refresh cycle.
pub struct RafScheduler {
    window: Window,
    callback: CallbackSlot,
    handle: Option<i32>,
}

impl RafScheduler {
    pub fn new(window: Window, callback: CallbackSlot) -> Self {
        Self {
            window,
            callback,
            handle: None,
        }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) {
        let slot = self.callback.borrow();
        let Some(callback) = slot.as_ref() else {
            return;
        };
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(id) => self.handle = Some(id),
            Err(e) => warn!(error = ?e, "requestAnimationFrame failed"),
        }
    }

    fn cancel_frame(&mut self) {
        if let Some(id) = self.handle.take() {
            if let Err(e) = self.window.cancel_animation_frame(id) {
                warn!(error = ?e, "cancelAnimationFrame failed");
            }
        }
    }
}
