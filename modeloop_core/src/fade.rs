// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear audio cross-fade driven by a fixed-step timer.

use crate::mode::ModeIndex;
use crate::time::Duration;

/// Volumes for one step of a cross-fade.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeLevels {
    /// Volume of the outgoing clip.
    pub outgoing: f64,
    /// Volume of the incoming clip.
    pub incoming: f64,
    /// Whether this was the final step.
    pub done: bool,
}

/// A linear volume ramp from `from` to `to`.
///
/// The ramp is divided into `ceil(fade / step)` equal steps; each call to
/// [`advance`](Self::advance) moves one step. The last step always lands on
/// exactly `0.0` / `1.0` regardless of floating-point drift.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FadeRamp {
    from: ModeIndex,
    to: ModeIndex,
    steps: u32,
    taken: u32,
}

impl FadeRamp {
    /// Creates a ramp covering `fade` in increments of `step`.
    ///
    /// A zero-length fade (or zero step) completes in a single step.
    #[must_use]
    pub fn new(from: ModeIndex, to: ModeIndex, fade: Duration, step: Duration) -> Self {
        let steps = if fade == Duration::ZERO || step == Duration::ZERO {
            1
        } else {
            u32::try_from(fade.ticks().div_ceil(step.ticks())).unwrap_or(u32::MAX)
        };
        Self {
            from,
            to,
            steps,
            taken: 0,
        }
    }

    /// Outgoing clip.
    #[must_use]
    pub const fn from(&self) -> ModeIndex {
        self.from
    }

    /// Incoming clip.
    #[must_use]
    pub const fn to(&self) -> ModeIndex {
        self.to
    }

    /// Total number of steps.
    #[must_use]
    pub const fn steps(&self) -> u32 {
        self.steps
    }

    /// Whether the final step has been taken.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.taken >= self.steps
    }

    /// Fraction of the ramp completed so far, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.is_done() {
            1.0
        } else {
            f64::from(self.taken) / f64::from(self.steps)
        }
    }

    /// Takes one step and returns the volumes to apply.
    ///
    /// Calling past the end keeps returning the final levels.
    pub fn advance(&mut self) -> FadeLevels {
        self.taken = self.taken.saturating_add(1).min(self.steps);
        if self.is_done() {
            return FadeLevels {
                outgoing: 0.0,
                incoming: 1.0,
                done: true,
            };
        }
        let p = self.progress();
        FadeLevels {
            outgoing: 1.0 - p,
            incoming: p,
            done: false,
        }
    }
}
