// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mode-switch scheduling for decks of looping video clips.
//!
//! `modeloop_core` holds everything about cycling between clips that does not
//! depend on a particular host. It is `no_std` compatible (with `alloc`) and
//! talks to the outside world only through the traits in [`backend`].
//!
//! # Architecture
//!
//! ```text
//!   Host timers ──► ModeScheduler::on_timer() ──► Deck (seek/mute/play)
//!                          ▲                           │
//!                          │                           ▼
//!                          └── on_play_settled() ◄── play() promise
//! ```
//!
//! **[`scheduler`]**: [`ModeScheduler`](scheduler::ModeScheduler) with random
//! switch delays, pre-warming, timestamp hand-off, and the fixed-step audio
//! fade loop.
//!
//! **[`unmute`]**: [`UnmuteGate`](unmute::UnmuteGate), the one-shot control
//! satisfying autoplay policies.
//!
//! **[`backend`]**: The [`Deck`](backend::Deck) and
//! [`Timers`](backend::Timers) traits hosts implement.
//!
//! **[`config`]**: [`SwitchConfig`](config::SwitchConfig) and validation.
//!
//! **[`mode`]**: The static mode table.
//!
//! **[`entropy`]**: Uniform sampling of delays and targets.
//!
//! **[`fade`]**: Linear cross-fade ramp.
//!
//! **[`time`]**: Microsecond host time and durations.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types, with
//! the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod config;
pub mod entropy;
pub mod fade;
pub mod mode;
pub mod scheduler;
pub mod time;
pub mod trace;
pub mod unmute;

#[cfg(test)]
mod testing;
