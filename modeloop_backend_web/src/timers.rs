// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setTimeout` timer slots.
//!
//! [`WebTimers`] keeps one persistent JS closure per
//! [`TimerKind`](modeloop_core::backend::TimerKind). Arming a slot hands the
//! same closure to `setTimeout` again, so a callback that re-arms its own slot
//! never drops the closure it is running in.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;

use modeloop_core::backend::{TimerKind, Timers};
use modeloop_core::time::{Duration, HostTime};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(callback: &JsValue, delay_ms: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(id: i32);
}

struct Slot {
    /// Registered with `setTimeout` on every arm.
    closure: Closure<dyn FnMut()>,
    /// Pending timeout id; cleared by the closure when it fires.
    pending: Rc<Cell<Option<i32>>>,
}

/// [`Timers`] over the browser's `setTimeout` / `clearTimeout`.
///
/// Dropping the timers clears every pending timeout.
pub struct WebTimers {
    slots: [Slot; 3],
}

impl WebTimers {
    /// Creates timers that call `on_fire` with the kind of each expired
    /// timeout.
    pub fn new(on_fire: impl Fn(TimerKind) + 'static) -> Self {
        let on_fire: Rc<dyn Fn(TimerKind)> = Rc::new(on_fire);
        let slots = TimerKind::ALL.map(|kind| {
            let pending = Rc::new(Cell::new(None));
            let fired = Rc::clone(&pending);
            let on_fire = Rc::clone(&on_fire);
            let closure = Closure::wrap(Box::new(move || {
                fired.set(None);
                on_fire(kind);
            }) as Box<dyn FnMut()>);
            Slot { closure, pending }
        });
        Self { slots }
    }

    /// Whether a timeout of `kind` is pending.
    #[must_use]
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.slots[kind.slot()].pending.get().is_some()
    }
}

impl Timers for WebTimers {
    fn now(&self) -> HostTime {
        crate::now()
    }

    fn arm(&mut self, kind: TimerKind, delay: Duration) {
        self.disarm(kind);
        let slot = &self.slots[kind.slot()];
        let id = set_timeout(slot.closure.as_ref().unchecked_ref(), delay_ms(delay));
        slot.pending.set(Some(id));
    }

    fn disarm(&mut self, kind: TimerKind) {
        if let Some(id) = self.slots[kind.slot()].pending.take() {
            clear_timeout(id);
        }
    }
}

impl Drop for WebTimers {
    fn drop(&mut self) {
        for kind in TimerKind::ALL {
            self.disarm(kind);
        }
    }
}

impl core::fmt::Debug for WebTimers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebTimers")
            .field("switch", &self.is_armed(TimerKind::Switch))
            .field("prewarm", &self.is_armed(TimerKind::Prewarm))
            .field("fade_step", &self.is_armed(TimerKind::FadeStep))
            .finish()
    }
}

/// Rounds to the nearest millisecond, saturating at `i32::MAX`.
fn delay_ms(delay: Duration) -> i32 {
    let ms = delay.ticks().saturating_add(500) / 1000;
    i32::try_from(ms).unwrap_or(i32::MAX)
}
