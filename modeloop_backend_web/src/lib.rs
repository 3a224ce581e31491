// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for modeloop.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`VideoDeck`]: one `<video>` element per mode, implementing
//!   [`Deck`](modeloop_core::backend::Deck)
//! - [`WebTimers`]: `setTimeout`-based [`Timers`](modeloop_core::backend::Timers)
//! - [`ConsoleSink`]: trace events as browser console lines
//! - [`MathRandom`]: [`Entropy`] over `Math.random()`

#![no_std]

extern crate alloc;

mod console;
mod deck;
mod timers;

pub use console::ConsoleSink;
pub use deck::{VideoDeck, wrap_media_time};
pub use timers::WebTimers;

use modeloop_core::entropy::Entropy;
use modeloop_core::time::HostTime;
use wasm_bindgen::prelude::*;

// Direct global bindings instead of `web_sys::Window` methods. Avoids
// fetching (and unwrapping) the Window/Performance objects on every call.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    fn performance_now() -> f64;

    #[wasm_bindgen(js_namespace = Math, js_name = "random")]
    fn math_random() -> f64;
}

/// Returns the current host time from `performance.now()`, in microsecond
/// ticks.
#[must_use]
pub fn now() -> HostTime {
    let ms = performance_now();
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "performance.now() returns small positive f64; µs fits in u64"
    )]
    let us = (ms * 1000.0) as u64;
    HostTime(us)
}

/// [`Entropy`] backed by `Math.random()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MathRandom;

impl Entropy for MathRandom {
    fn next_unit(&mut self) -> f64 {
        math_random()
    }
}
