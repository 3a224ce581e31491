// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for mode switching.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! scheduler calls at each stage of a hand-off. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::mode::ModeIndex;
use crate::time::{Duration, HostTime};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why a switch timer fired without starting a hand-off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Only one mode is configured.
    SingleMode,
    /// A previous hand-off is still waiting on playback or fading.
    InFlight,
    /// The scheduler has been stopped.
    Stopped,
}

/// How a playback request settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayOutcome {
    /// Playback started.
    Resolved,
    /// The host refused playback (typically autoplay policy).
    Rejected,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the next switch is scheduled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwitchScheduledEvent {
    /// Host time at scheduling.
    pub at: HostTime,
    /// Delay until the switch timer fires.
    pub delay: Duration,
    /// Delay until the pre-warm timer fires, if enabled.
    pub prewarm_after: Option<Duration>,
}

/// Emitted when the next clip is pre-selected and buffered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrewarmEvent {
    /// Host time of the pre-warm.
    pub at: HostTime,
    /// Visible mode.
    pub current: ModeIndex,
    /// Pre-selected next mode.
    pub next: ModeIndex,
    /// Media position the next clip was seeked to, in seconds.
    pub seek_to: f64,
}

/// Emitted when a hand-off starts and the target's playback is requested.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwitchBeganEvent {
    /// Host time of the request.
    pub at: HostTime,
    /// Visible mode.
    pub from: ModeIndex,
    /// Target mode.
    pub to: ModeIndex,
    /// Media position copied into the target, in seconds.
    pub media_time: f64,
    /// Mute state copied into the target.
    pub muted: bool,
}

/// Emitted when a switch timer fires but no hand-off starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwitchSkippedEvent {
    /// Host time of the timer.
    pub at: HostTime,
    /// Why the switch was skipped.
    pub reason: SkipReason,
}

/// Emitted when the host reports a playback outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaySettledEvent {
    /// Host time of the report.
    pub at: HostTime,
    /// Clip whose playback settled.
    pub clip: ModeIndex,
    /// The outcome.
    pub outcome: PlayOutcome,
    /// Whether the outcome no longer matched any pending request.
    pub stale: bool,
}

/// Emitted when the visible mode changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlipEvent {
    /// Host time of the flip.
    pub at: HostTime,
    /// Previously visible mode.
    pub from: ModeIndex,
    /// Newly visible mode.
    pub to: ModeIndex,
}

/// Emitted at each audio fade step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeStepEvent {
    /// Host time of the step.
    pub at: HostTime,
    /// Outgoing mode.
    pub from: ModeIndex,
    /// Incoming mode.
    pub to: ModeIndex,
    /// Volume applied to the outgoing clip.
    pub outgoing: f64,
    /// Volume applied to the incoming clip.
    pub incoming: f64,
}

/// Emitted when a fade completes and the outgoing clip is paused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FadeFinishedEvent {
    /// Host time of the final step.
    pub at: HostTime,
    /// Paused mode.
    pub from: ModeIndex,
    /// Mode now playing alone.
    pub to: ModeIndex,
}

/// Emitted when every clip is unmuted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnmutedEvent {
    /// Host time of the unmute.
    pub at: HostTime,
    /// Number of clips unmuted.
    pub clips: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the scheduler.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after the next switch is scheduled.
    fn on_switch_scheduled(&mut self, e: &SwitchScheduledEvent) {
        _ = e;
    }

    /// Called after the next clip is pre-warmed.
    fn on_prewarm(&mut self, e: &PrewarmEvent) {
        _ = e;
    }

    /// Called when a hand-off starts.
    fn on_switch_began(&mut self, e: &SwitchBeganEvent) {
        _ = e;
    }

    /// Called when a switch timer is skipped.
    fn on_switch_skipped(&mut self, e: &SwitchSkippedEvent) {
        _ = e;
    }

    /// Called when a playback request settles.
    fn on_play_settled(&mut self, e: &PlaySettledEvent) {
        _ = e;
    }

    /// Called when the visible mode changes.
    fn on_flip(&mut self, e: &FlipEvent) {
        _ = e;
    }

    /// Called at each fade step.
    fn on_fade_step(&mut self, e: &FadeStepEvent) {
        _ = e;
    }

    /// Called when a fade completes.
    fn on_fade_finished(&mut self, e: &FadeFinishedEvent) {
        _ = e;
    }

    /// Called when clips are unmuted.
    fn on_unmuted(&mut self, e: &UnmutedEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`SwitchScheduledEvent`].
    #[inline]
    pub fn switch_scheduled(&mut self, e: &SwitchScheduledEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_switch_scheduled(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PrewarmEvent`].
    #[inline]
    pub fn prewarm(&mut self, e: &PrewarmEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_prewarm(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SwitchBeganEvent`].
    #[inline]
    pub fn switch_began(&mut self, e: &SwitchBeganEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_switch_began(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SwitchSkippedEvent`].
    #[inline]
    pub fn switch_skipped(&mut self, e: &SwitchSkippedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_switch_skipped(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PlaySettledEvent`].
    #[inline]
    pub fn play_settled(&mut self, e: &PlaySettledEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_play_settled(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FlipEvent`].
    #[inline]
    pub fn flip(&mut self, e: &FlipEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_flip(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FadeStepEvent`].
    #[inline]
    pub fn fade_step(&mut self, e: &FadeStepEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_fade_step(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FadeFinishedEvent`].
    #[inline]
    pub fn fade_finished(&mut self, e: &FadeFinishedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_fade_finished(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`UnmutedEvent`].
    #[inline]
    pub fn unmuted(&mut self, e: &UnmutedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_unmuted(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
