// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory deck and virtual-clock timers for unit tests.

use alloc::vec;
use alloc::vec::Vec;

use crate::backend::{Deck, TimerKind, Timers};
use crate::mode::ModeIndex;
use crate::time::{Duration, HostTime};

#[derive(Clone, Debug, Default)]
pub(crate) struct FakeClip {
    pub(crate) time: f64,
    pub(crate) muted: bool,
    pub(crate) volume: f64,
    pub(crate) visible: bool,
    pub(crate) playing: bool,
}

/// Records every deck call; playback requests queue in `pending_plays`
/// until the test settles them.
#[derive(Debug)]
pub(crate) struct FakeDeck {
    pub(crate) clips: Vec<FakeClip>,
    pub(crate) pending_plays: Vec<ModeIndex>,
    pub(crate) prepared: Vec<(ModeIndex, f64)>,
    pub(crate) play_requests: usize,
    pub(crate) visibility_changes: usize,
}

impl FakeDeck {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            clips: vec![FakeClip::default(); len],
            pending_plays: Vec::new(),
            prepared: Vec::new(),
            play_requests: 0,
            visibility_changes: 0,
        }
    }
}

impl Deck for FakeDeck {
    fn clip_count(&self) -> usize {
        self.clips.len()
    }

    fn current_time(&self, clip: ModeIndex) -> f64 {
        self.clips[clip.get()].time
    }

    fn seek(&mut self, clip: ModeIndex, seconds: f64) {
        self.clips[clip.get()].time = seconds;
    }

    fn set_muted(&mut self, clip: ModeIndex, muted: bool) {
        self.clips[clip.get()].muted = muted;
    }

    fn set_volume(&mut self, clip: ModeIndex, volume: f64) {
        self.clips[clip.get()].volume = volume;
    }

    fn set_visible(&mut self, clip: ModeIndex, visible: bool) {
        let c = &mut self.clips[clip.get()];
        if c.visible != visible {
            c.visible = visible;
            self.visibility_changes += 1;
        }
    }

    fn prepare(&mut self, clip: ModeIndex, seconds: f64) {
        self.clips[clip.get()].time = seconds;
        self.prepared.push((clip, seconds));
    }

    fn play(&mut self, clip: ModeIndex) {
        self.play_requests += 1;
        self.pending_plays.push(clip);
    }

    fn pause(&mut self, clip: ModeIndex) {
        self.clips[clip.get()].playing = false;
    }
}

/// Virtual clock. Time only moves through [`advance`](Self::advance).
#[derive(Debug, Default)]
pub(crate) struct FakeTimers {
    pub(crate) now: HostTime,
    armed: [Option<HostTime>; 3],
    delays: [Option<Duration>; 3],
}

impl FakeTimers {
    pub(crate) fn is_armed(&self, kind: TimerKind) -> bool {
        self.armed[kind.slot()].is_some()
    }

    pub(crate) fn due(&self, kind: TimerKind) -> Option<HostTime> {
        self.armed[kind.slot()]
    }

    /// Delay passed to the most recent `arm` of `kind`.
    pub(crate) fn last_delay(&self, kind: TimerKind) -> Option<Duration> {
        self.delays[kind.slot()]
    }

    /// Jumps to the earliest armed timer, disarms it, and returns its kind.
    /// Ties go to the lowest slot.
    pub(crate) fn advance(&mut self) -> Option<TimerKind> {
        let kind = TimerKind::ALL
            .into_iter()
            .filter_map(|k| self.armed[k.slot()].map(|due| (due, k.slot(), k)))
            .min_by_key(|&(due, slot, _)| (due, slot))
            .map(|(_, _, k)| k)?;
        if let Some(due) = self.armed[kind.slot()].take() {
            self.now = self.now.max(due);
        }
        Some(kind)
    }
}

impl Timers for FakeTimers {
    fn now(&self) -> HostTime {
        self.now
    }

    fn arm(&mut self, kind: TimerKind, delay: Duration) {
        self.armed[kind.slot()] = Some(self.now + delay);
        self.delays[kind.slot()] = Some(delay);
    }

    fn disarm(&mut self, kind: TimerKind) {
        self.armed[kind.slot()] = None;
    }
}
