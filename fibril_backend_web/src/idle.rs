// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestIdleCallback` driver.
//!
//! [`IdleLoop`] owns a [`Root`] and a [`DomHost`] and runs one scheduler slice
//! per idle callback, passing the browser's [`IdleDeadline`][mdn] through to
//! the work loop. The loop re-registers itself after every slice, whether or
//! not there was work, until [`stop`](IdleLoop::stop) is called or the
//! `IdleLoop` is dropped. Setter calls from DOM event handlers are picked up
//! by the next callback.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/IdleDeadline

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::time::Duration;

use fibril_core::{Element, Error, IdleDeadline, Root, SchedulerConfig};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::Node;

use crate::dom::DomHost;

#[wasm_bindgen]
extern "C" {
    /// The deadline object handed to an idle callback.
    type BrowserDeadline;

    #[wasm_bindgen(method, js_name = "timeRemaining")]
    fn time_remaining_ms(this: &BrowserDeadline) -> f64;

    #[wasm_bindgen(js_name = "requestIdleCallback")]
    fn request_idle_callback(callback: &JsValue) -> u32;

    #[wasm_bindgen(js_name = "cancelIdleCallback")]
    fn cancel_idle_callback(id: u32);
}

/// Converts a `timeRemaining()` result in milliseconds to a [`Duration`].
///
/// Negative and non-finite values count as no time left.
pub(crate) fn remaining_from_millis(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "positive finite milliseconds; the cast saturates"
        )]
        let us = (ms * 1000.0) as u64;
        Duration::from_micros(us)
    } else {
        Duration::ZERO
    }
}

impl IdleDeadline for BrowserDeadline {
    fn time_remaining(&self) -> Duration {
        remaining_from_millis(self.time_remaining_ms())
    }
}

type IdleClosure = Closure<dyn FnMut(BrowserDeadline)>;
type ErrorCallback = Box<dyn FnMut(Error<JsValue>)>;

/// Drives a [`Root`] from `requestIdleCallback`.
///
/// Create with [`IdleLoop::new`], seed a tree with [`render`](Self::render),
/// then call [`start`](Self::start). Host failures are passed to the error
/// callback; the loop keeps running afterwards.
pub struct IdleLoop {
    inner: Rc<IdleInner>,
}

struct IdleInner {
    /// The JS closure registered with `requestIdleCallback`.
    closure: RefCell<Option<IdleClosure>>,
    root: RefCell<Root<DomHost>>,
    host: RefCell<DomHost>,
    on_error: RefCell<ErrorCallback>,
    running: Cell<bool>,
    /// The handle of the pending callback, used when stopping.
    callback_id: Cell<u32>,
    callbacks: Cell<u64>,
}

impl IdleInner {
    fn run_slice(&self, deadline: &BrowserDeadline) {
        self.callbacks.set(self.callbacks.get() + 1);
        let result = {
            let mut root = self.root.borrow_mut();
            let mut host = self.host.borrow_mut();
            root.work_loop(&mut host, deadline)
        };
        // Borrows are released so the callback may call `render`.
        if let Err(err) = result {
            self.on_error.borrow_mut()(err);
        }
    }

    fn request(&self) {
        if let Some(ref closure) = *self.closure.borrow() {
            let id = request_idle_callback(closure.as_ref().unchecked_ref());
            self.callback_id.set(id);
        }
    }
}

impl IdleLoop {
    /// Creates a loop rendering into `container`, which must belong to the
    /// document `host` creates nodes in. The loop is **not yet running**.
    pub fn new(
        host: DomHost,
        container: Node,
        config: SchedulerConfig,
        on_error: impl FnMut(Error<JsValue>) + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(IdleInner {
                closure: RefCell::new(None),
                root: RefCell::new(Root::new(container, config)),
                host: RefCell::new(host),
                on_error: RefCell::new(Box::new(on_error)),
                running: Cell::new(false),
                callback_id: Cell::new(0),
                callbacks: Cell::new(0),
            }),
        }
    }

    /// Seeds a render of `element` into the container.
    ///
    /// # Panics
    ///
    /// Panics if called from inside the render function of a component this
    /// loop is rendering.
    pub fn render(&self, element: Element) {
        self.inner.root.borrow_mut().render(element);
    }

    /// Starts requesting idle callbacks.
    ///
    /// If already running, this is a no-op.
    pub fn start(&self) {
        if self.inner.running.get() {
            return;
        }
        self.inner.running.set(true);

        if self.inner.closure.borrow().is_none() {
            let inner = Rc::clone(&self.inner);
            let closure = Closure::wrap(Box::new(move |deadline: BrowserDeadline| {
                if !inner.running.get() {
                    return;
                }
                inner.run_slice(&deadline);
                if inner.running.get() {
                    inner.request();
                }
            }) as Box<dyn FnMut(BrowserDeadline)>);
            *self.inner.closure.borrow_mut() = Some(closure);
        }
        self.inner.request();
    }

    /// Stops the loop, cancelling the pending callback. Can be restarted by
    /// calling [`start`](Self::start) again; an unfinished pass resumes.
    pub fn stop(&self) {
        if !self.inner.running.get() {
            return;
        }
        self.inner.running.set(false);
        cancel_idle_callback(self.inner.callback_id.get());
    }

    /// Returns `true` if the loop is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    /// Returns `true` if a pass is in flight or a setter requested one.
    #[must_use]
    pub fn has_pending_work(&self) -> bool {
        self.inner.root.borrow().has_pending_work()
    }

    /// Returns the number of idle callbacks run so far.
    #[must_use]
    pub fn callbacks(&self) -> u64 {
        self.inner.callbacks.get()
    }
}

impl Drop for IdleLoop {
    fn drop(&mut self) {
        self.stop();
        // Drop the JS closure so it doesn't leak.
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for IdleLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdleLoop")
            .field("running", &self.inner.running.get())
            .field("callbacks", &self.inner.callbacks.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_time_converts_milliseconds() {
        assert_eq!(remaining_from_millis(12.5), Duration::from_micros(12_500));
        assert_eq!(remaining_from_millis(0.0), Duration::ZERO);
    }

    #[test]
    fn bogus_remaining_time_means_no_time() {
        assert_eq!(remaining_from_millis(-3.0), Duration::ZERO);
        assert_eq!(remaining_from_millis(f64::NAN), Duration::ZERO);
        assert_eq!(remaining_from_millis(f64::INFINITY), Duration::ZERO);
    }

    #[test]
    fn under_a_millisecond_yields() {
        let config = SchedulerConfig::idle_callback();
        let deadline = remaining_from_millis(0.4);
        assert!(deadline < config.yield_threshold);
    }
}
