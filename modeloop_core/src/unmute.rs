// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot unmute control.
//!
//! Browsers refuse unmuted autoplay until the user interacts with the page,
//! so clips start muted and an [`UnmuteGate`] waits for that first gesture.

use crate::backend::{Deck, Timers};
use crate::entropy::Entropy;
use crate::scheduler::ModeScheduler;
use crate::trace::Tracer;

/// A control that unmutes every clip once and then disappears for good.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnmuteGate {
    shown: bool,
}

impl UnmuteGate {
    /// Creates a gate that is still shown.
    #[must_use]
    pub const fn new() -> Self {
        Self { shown: true }
    }

    /// Whether the control should still be displayed.
    #[must_use]
    pub const fn is_shown(&self) -> bool {
        self.shown
    }

    /// Handles a user press: unmutes every clip and dismisses the gate.
    ///
    /// Returns `true` the first time only; later presses do nothing.
    pub fn press<E: Entropy, D: Deck, T: Timers>(
        &mut self,
        scheduler: &mut ModeScheduler<E>,
        deck: &mut D,
        timers: &T,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        if !self.shown {
            return false;
        }
        self.shown = false;
        scheduler.unmute_all(deck, timers, tracer);
        true
    }
}

impl Default for UnmuteGate {
    fn default() -> Self {
        Self::new()
    }
}
