// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for host integrations.
//!
//! The scheduler never touches media elements or timers directly. A host
//! provides two pieces:
//!
//! - **Deck**: Implements [`Deck`] over its clip players (e.g. one
//!   `<video>` element per mode). Playback requests are asynchronous: the
//!   host reports each outcome back through
//!   [`ModeScheduler::on_play_settled`](crate::scheduler::ModeScheduler::on_play_settled).
//!
//! - **Timers**: Implements [`Timers`] with one re-armable one-shot timer
//!   per [`TimerKind`] (e.g. `setTimeout`). When a timer fires, the host
//!   calls [`ModeScheduler::on_timer`](crate::scheduler::ModeScheduler::on_timer)
//!   with its kind.
//!
//! # Callback wiring
//!
//! ```rust,ignore
//! fn on_timeout(kind: TimerKind) {
//!     scheduler.on_timer(kind, &mut deck, &mut timers, &mut tracer);
//! }
//!
//! fn on_play_promise(index: ModeIndex, result: Result<(), JsValue>) {
//!     scheduler.on_play_settled(index, result.is_ok(), &mut deck, &mut timers, &mut tracer);
//! }
//! ```
//!
//! Both traits are generic seams so test doubles can stand in for the
//! browser.

use crate::mode::ModeIndex;
use crate::time::{Duration, HostTime};

/// The set of clip players a scheduler drives, one per mode.
///
/// Indices passed in are always below [`clip_count`](Self::clip_count).
pub trait Deck {
    /// Number of clips.
    fn clip_count(&self) -> usize;

    /// Current media position of a clip, in seconds.
    fn current_time(&self, clip: ModeIndex) -> f64;

    /// Moves a clip's media position, in seconds.
    fn seek(&mut self, clip: ModeIndex, seconds: f64);

    /// Sets a clip's mute flag.
    fn set_muted(&mut self, clip: ModeIndex, muted: bool);

    /// Sets a clip's volume in `[0, 1]`.
    fn set_volume(&mut self, clip: ModeIndex, volume: f64);

    /// Shows or hides a clip. Hosts animate the change over the configured
    /// fade length.
    fn set_visible(&mut self, clip: ModeIndex, visible: bool);

    /// Starts buffering a clip around `seconds` ahead of a switch.
    fn prepare(&mut self, clip: ModeIndex, seconds: f64);

    /// Requests playback. The outcome must be reported asynchronously via
    /// [`ModeScheduler::on_play_settled`](crate::scheduler::ModeScheduler::on_play_settled),
    /// never from inside this call.
    fn play(&mut self, clip: ModeIndex);

    /// Pauses a clip.
    fn pause(&mut self, clip: ModeIndex);
}

/// Which scheduler timer fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Time to switch to another mode.
    Switch,
    /// Time to pre-select and buffer the next mode.
    Prewarm,
    /// Time for the next audio fade step.
    FadeStep,
}

impl TimerKind {
    /// All kinds, in a fixed order.
    pub const ALL: [Self; 3] = [Self::Switch, Self::Prewarm, Self::FadeStep];

    /// Stable slot index for per-kind storage.
    #[must_use]
    pub const fn slot(self) -> usize {
        match self {
            Self::Switch => 0,
            Self::Prewarm => 1,
            Self::FadeStep => 2,
        }
    }
}

/// One-shot timers, one per [`TimerKind`].
pub trait Timers {
    /// Current host time.
    fn now(&self) -> HostTime;

    /// Fires `kind` once after `delay`, replacing any pending `kind` timer.
    fn arm(&mut self, kind: TimerKind, delay: Duration);

    /// Cancels a pending `kind` timer, if any.
    fn disarm(&mut self, kind: TimerKind);
}
