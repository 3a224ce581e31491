// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform randomness for switch timing and target selection.
//!
//! The scheduler only needs uniform samples in `[0, 1)`. Hosts plug in their
//! own source through [`Entropy`] (the web backend uses `Math.random()`);
//! [`Lcg`] is a small deterministic generator for tests and native tools.

use crate::config::SwitchConfig;
use crate::mode::ModeIndex;
use crate::time::Duration;

/// A source of uniform samples in `[0, 1)`.
pub trait Entropy {
    /// Returns the next sample.
    fn next_unit(&mut self) -> f64;
}

impl<E: Entropy + ?Sized> Entropy for &mut E {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// 64-bit linear congruential generator.
#[derive(Clone, Copy, Debug)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// Creates a generator with the given seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new(0x8f2f_3d29_11ab_9121)
    }
}

impl Entropy for Lcg {
    fn next_unit(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        ((self.state >> 11) as f64) / ((1_u64 << 53) as f64)
    }
}

/// Draws a switch delay uniformly from `[min_interval, max_interval]`.
///
/// Samples outside `[0, 1)` from a misbehaving source are clamped, so the
/// result never leaves the configured bounds.
pub fn sample_interval(config: &SwitchConfig, rng: &mut impl Entropy) -> Duration {
    let min = config.min_interval;
    let max = config.max_interval.max(min);
    let u = clamp_unit(rng.next_unit());
    let span = max - min;
    (min + span.mul_f64(u)).min(max)
}

/// Draws a mode index uniformly from `0..len`, redrawing until it differs
/// from `current`.
///
/// With a single mode there is nothing else to pick, and `current` is
/// returned without drawing.
///
/// # Panics
///
/// Panics if `len` is zero.
pub fn pick_other(len: usize, current: ModeIndex, rng: &mut impl Entropy) -> ModeIndex {
    assert!(len > 0, "cannot pick from an empty mode table");
    if len == 1 {
        return current;
    }
    loop {
        let candidate = draw_index(len, rng);
        if candidate != current {
            return candidate;
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "u is clamped to [0, 1) so the product fits in 0..len"
)]
fn draw_index(len: usize, rng: &mut impl Entropy) -> ModeIndex {
    let u = clamp_unit(rng.next_unit());
    let idx = (u * len as f64) as usize;
    ModeIndex(idx.min(len - 1))
}

fn clamp_unit(u: f64) -> f64 {
    if u.is_nan() { 0.0 } else { u.clamp(0.0, 1.0) }
}
