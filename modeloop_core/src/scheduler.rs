// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Randomized mode switching with synchronized hand-off and audio cross-fade.
//!
//! [`ModeScheduler`] owns the playback state (visible mode, pre-selected next
//! mode, mute flag) and reacts to two kinds of host callbacks: timers firing
//! ([`on_timer`](ModeScheduler::on_timer)) and playback requests settling
//! ([`on_play_settled`](ModeScheduler::on_play_settled)).
//!
//! # Hand-off
//!
//! ```text
//!   Switch timer ──► seek target to current media time, match mute,
//!        │           volume 0, play()
//!        ▼
//!   play resolves ──► flip visible mode, restart switch wait,
//!        │            arm FadeStep
//!        ▼
//!   FadeStep × n ──► ramp volumes; last step: old = 0, new = 1, pause old
//! ```
//!
//! A rejected `play()` abandons the hand-off; it is reported to the trace
//! sink and never retried. While a hand-off is in flight further switch
//! timers are skipped, so a fade always runs to completion.

use crate::backend::{Deck, TimerKind, Timers};
use crate::config::{ConfigError, SwitchConfig};
use crate::entropy::{Entropy, pick_other, sample_interval};
use crate::fade::FadeRamp;
use crate::mode::{ModeIndex, ModeTable};
use crate::time::{Duration, HostTime};
use crate::trace::{
    FadeFinishedEvent, FadeStepEvent, FlipEvent, PlayOutcome, PlaySettledEvent, PrewarmEvent,
    SkipReason, SwitchBeganEvent, SwitchScheduledEvent, SwitchSkippedEvent, Tracer, UnmutedEvent,
};

/// Where the scheduler is in a hand-off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handoff {
    /// No transition in progress.
    Idle,
    /// Playback of `to` was requested; the visible mode is still `from`.
    Pending {
        /// Visible mode.
        from: ModeIndex,
        /// Target mode.
        to: ModeIndex,
    },
    /// The visible mode flipped and volumes are ramping.
    Fading(FadeRamp),
}

/// Chooses modes at random intervals and hands playback between clips.
#[derive(Debug)]
pub struct ModeScheduler<E> {
    config: SwitchConfig,
    clip_count: usize,
    rng: E,
    current: ModeIndex,
    next: Option<ModeIndex>,
    muted: bool,
    handoff: Handoff,
    switch_due: Option<HostTime>,
    stopped: bool,
}

impl<E: Entropy> ModeScheduler<E> {
    /// Creates a scheduler for `modes`, starting muted on the first mode.
    pub fn new(config: SwitchConfig, modes: &ModeTable, rng: E) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            clip_count: modes.len(),
            rng,
            current: ModeIndex(0),
            next: None,
            muted: true,
            handoff: Handoff::Idle,
            switch_due: None,
            stopped: false,
        })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SwitchConfig {
        &self.config
    }

    /// The visible mode.
    #[must_use]
    pub fn current(&self) -> ModeIndex {
        self.current
    }

    /// The pre-selected next mode, if pre-warming chose one.
    #[must_use]
    pub fn next(&self) -> Option<ModeIndex> {
        self.next
    }

    /// Whether clips are muted.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Current hand-off stage.
    #[must_use]
    pub fn handoff(&self) -> Handoff {
        self.handoff
    }

    /// Whether volumes are currently ramping.
    #[must_use]
    pub fn is_fading(&self) -> bool {
        matches!(self.handoff, Handoff::Fading(_))
    }

    /// Whether [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Shows the current mode, applies mute and volume to every clip, requests
    /// playback, and schedules the next switch.
    ///
    /// Also resumes after [`stop`](Self::stop): a hand-off interrupted by the
    /// stop is abandoned and every hidden clip is paused.
    pub fn start<D: Deck, T: Timers>(
        &mut self,
        deck: &mut D,
        timers: &mut T,
        tracer: &mut Tracer<'_>,
    ) {
        debug_assert_eq!(deck.clip_count(), self.clip_count, "deck size mismatch");
        self.stopped = false;
        self.handoff = Handoff::Idle;
        self.next = None;
        for i in 0..self.clip_count {
            let clip = ModeIndex(i);
            let visible = clip == self.current;
            deck.set_muted(clip, self.muted);
            deck.set_visible(clip, visible);
            deck.set_volume(clip, if visible { 1.0 } else { 0.0 });
            if !visible {
                deck.pause(clip);
            }
        }
        deck.play(self.current);
        self.schedule_next(timers, tracer);
    }

    /// Cancels every pending timer. Later callbacks are ignored.
    pub fn stop<T: Timers>(&mut self, timers: &mut T) {
        self.stopped = true;
        self.switch_due = None;
        for kind in TimerKind::ALL {
            timers.disarm(kind);
        }
    }

    /// Handles a fired timer.
    pub fn on_timer<D: Deck, T: Timers>(
        &mut self,
        kind: TimerKind,
        deck: &mut D,
        timers: &mut T,
        tracer: &mut Tracer<'_>,
    ) {
        match kind {
            TimerKind::Switch => self.on_switch(deck, timers, tracer),
            TimerKind::Prewarm => self.on_prewarm(deck, timers, tracer),
            TimerKind::FadeStep => self.on_fade_step(deck, timers, tracer),
        }
    }

    /// Handles the outcome of a [`Deck::play`] request for `clip`.
    ///
    /// Only a successful start of the pending target flips the visible mode.
    /// Until the outcome arrives, every switch is skipped as
    /// [`SkipReason::InFlight`]; a host whose `play` never settles stalls
    /// the cycle until [`stop`](Self::stop) and [`start`](Self::start).
    pub fn on_play_settled<D: Deck, T: Timers>(
        &mut self,
        clip: ModeIndex,
        started: bool,
        deck: &mut D,
        timers: &mut T,
        tracer: &mut Tracer<'_>,
    ) {
        let outcome = if started {
            PlayOutcome::Resolved
        } else {
            PlayOutcome::Rejected
        };
        let pending = match self.handoff {
            Handoff::Pending { from, to } if to == clip && !self.stopped => Some(from),
            _ => None,
        };
        let stale = pending.is_none() && (self.stopped || clip != self.current);
        tracer.play_settled(&PlaySettledEvent {
            at: timers.now(),
            clip,
            outcome,
            stale,
        });

        let Some(from) = pending else {
            return;
        };
        if started {
            self.flip(from, clip, deck, timers, tracer);
        } else {
            self.handoff = Handoff::Idle;
        }
    }

    /// Unmutes every clip at once. Returns `false` if already unmuted.
    pub fn unmute_all<D: Deck, T: Timers>(
        &mut self,
        deck: &mut D,
        timers: &T,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        if !self.muted {
            return false;
        }
        self.muted = false;
        for i in 0..self.clip_count {
            deck.set_muted(ModeIndex(i), false);
        }
        tracer.unmuted(&UnmutedEvent {
            at: timers.now(),
            clips: self.clip_count,
        });
        true
    }

    fn schedule_next<T: Timers>(&mut self, timers: &mut T, tracer: &mut Tracer<'_>) {
        let delay = sample_interval(&self.config, &mut self.rng);
        let now = timers.now();
        timers.arm(TimerKind::Switch, delay);
        self.switch_due = now.checked_add(delay);
        self.next = None;

        let prewarm_after = if self.clip_count > 1 {
            self.config.prewarm_at.map(|at| delay.mul_f64(at))
        } else {
            None
        };
        match prewarm_after {
            Some(after) => timers.arm(TimerKind::Prewarm, after),
            None => timers.disarm(TimerKind::Prewarm),
        }

        tracer.switch_scheduled(&SwitchScheduledEvent {
            at: now,
            delay,
            prewarm_after,
        });
    }

    fn on_prewarm<D: Deck, T: Timers>(
        &mut self,
        deck: &mut D,
        timers: &mut T,
        tracer: &mut Tracer<'_>,
    ) {
        if self.stopped || self.clip_count < 2 || self.handoff != Handoff::Idle {
            return;
        }
        let now = timers.now();
        let next = pick_other(self.clip_count, self.current, &mut self.rng);
        let remaining = self
            .switch_due
            .map_or(Duration::ZERO, |due| due.saturating_duration_since(now));
        let seek_to = deck.current_time(self.current) + remaining.as_secs_f64();
        deck.prepare(next, seek_to);
        self.next = Some(next);

        tracer.prewarm(&PrewarmEvent {
            at: now,
            current: self.current,
            next,
            seek_to,
        });
    }

    fn on_switch<D: Deck, T: Timers>(
        &mut self,
        deck: &mut D,
        timers: &mut T,
        tracer: &mut Tracer<'_>,
    ) {
        let at = timers.now();
        if self.stopped {
            tracer.switch_skipped(&SwitchSkippedEvent {
                at,
                reason: SkipReason::Stopped,
            });
            return;
        }

        let preselected = self.next.take();
        self.schedule_next(timers, tracer);

        let reason = if self.clip_count < 2 {
            Some(SkipReason::SingleMode)
        } else if self.handoff != Handoff::Idle {
            Some(SkipReason::InFlight)
        } else {
            None
        };
        if let Some(reason) = reason {
            tracer.switch_skipped(&SwitchSkippedEvent { at, reason });
            return;
        }

        let from = self.current;
        let to = match preselected {
            Some(n) if n != from && n.get() < self.clip_count => n,
            _ => pick_other(self.clip_count, from, &mut self.rng),
        };

        let media_time = deck.current_time(from);
        deck.seek(to, media_time);
        deck.set_muted(to, self.muted);
        deck.set_volume(to, 0.0);
        self.handoff = Handoff::Pending { from, to };
        tracer.switch_began(&SwitchBeganEvent {
            at,
            from,
            to,
            media_time,
            muted: self.muted,
        });
        deck.play(to);
    }

    fn flip<D: Deck, T: Timers>(
        &mut self,
        from: ModeIndex,
        to: ModeIndex,
        deck: &mut D,
        timers: &mut T,
        tracer: &mut Tracer<'_>,
    ) {
        self.current = to;
        deck.set_visible(from, false);
        deck.set_visible(to, true);
        tracer.flip(&FlipEvent {
            at: timers.now(),
            from,
            to,
        });

        self.handoff = Handoff::Fading(FadeRamp::new(
            from,
            to,
            self.config.fade,
            self.config.fade_step,
        ));
        self.schedule_next(timers, tracer);

        if self.config.fade == Duration::ZERO {
            self.on_fade_step(deck, timers, tracer);
        } else {
            timers.arm(TimerKind::FadeStep, self.config.fade_step);
        }
    }

    fn on_fade_step<D: Deck, T: Timers>(
        &mut self,
        deck: &mut D,
        timers: &mut T,
        tracer: &mut Tracer<'_>,
    ) {
        if self.stopped {
            return;
        }
        let Handoff::Fading(ramp) = &mut self.handoff else {
            return;
        };
        let (from, to) = (ramp.from(), ramp.to());
        let levels = ramp.advance();
        let at = timers.now();

        deck.set_volume(from, levels.outgoing);
        deck.set_volume(to, levels.incoming);
        tracer.fade_step(&FadeStepEvent {
            at,
            from,
            to,
            outgoing: levels.outgoing,
            incoming: levels.incoming,
        });

        if levels.done {
            deck.pause(from);
            self.handoff = Handoff::Idle;
            tracer.fade_finished(&FadeFinishedEvent { at, from, to });
        } else {
            timers.arm(TimerKind::FadeStep, self.config.fade_step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::Lcg;
    use crate::mode::Mode;
    use crate::testing::{FakeDeck, FakeTimers};
    use alloc::vec::Vec;

    static MODES: [Mode; 6] = [
        Mode::new("/videos/base.mp4", "Mode 1"),
        Mode::new("/videos/noir.mp4", "Mode 2"),
        Mode::new("/videos/depths.mp4", "Mode 3"),
        Mode::new("/videos/crimson.mp4", "Mode 4"),
        Mode::new("/videos/fade.mp4", "Mode 5"),
        Mode::new("/videos/altered.mp4", "Mode 6"),
    ];

    static SOLO: [Mode; 1] = [Mode::new("/videos/base.mp4", "Mode 1")];

    struct Rig {
        sched: ModeScheduler<Lcg>,
        deck: FakeDeck,
        timers: FakeTimers,
    }

    impl Rig {
        fn new(modes: &'static [Mode], config: SwitchConfig, seed: u64) -> Self {
            let table = ModeTable::new(modes).unwrap();
            let mut rig = Self {
                sched: ModeScheduler::new(config, &table, Lcg::new(seed)).unwrap(),
                deck: FakeDeck::new(table.len()),
                timers: FakeTimers::default(),
            };
            rig.sched
                .start(&mut rig.deck, &mut rig.timers, &mut Tracer::none());
            rig
        }

        /// Advances virtual time to the earliest armed timer and fires it.
        fn fire_next(&mut self) -> TimerKind {
            let kind = self.timers.advance().expect("no timer armed");
            self.sched
                .on_timer(kind, &mut self.deck, &mut self.timers, &mut Tracer::none());
            kind
        }

        /// Fires timers until a switch requests playback of a new clip.
        fn run_until_play_requested(&mut self) -> ModeIndex {
            for _ in 0..100 {
                self.fire_next();
                if let Some(&clip) = self.deck.pending_plays.last() {
                    return clip;
                }
            }
            panic!("no switch happened");
        }

        fn settle(&mut self, clip: ModeIndex, started: bool) {
            self.deck.pending_plays.retain(|c| *c != clip);
            if started {
                self.deck.clips[clip.get()].playing = true;
            }
            self.sched.on_play_settled(
                clip,
                started,
                &mut self.deck,
                &mut self.timers,
                &mut Tracer::none(),
            );
        }

        fn run_fade(&mut self) {
            while self.sched.is_fading() {
                self.fire_next();
                assert!(self.deck.pending_plays.is_empty(), "no hand-off during a fade");
            }
        }
    }

    fn visible_clips(deck: &FakeDeck) -> Vec<usize> {
        deck.clips
            .iter()
            .enumerate()
            .filter(|(_, c)| c.visible)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn start_shows_only_first_mode_muted() {
        let mut rig = Rig::new(&MODES, SwitchConfig::web(), 1);
        assert_eq!(visible_clips(&rig.deck), [0]);
        assert!(rig.deck.clips.iter().all(|c| c.muted), "clips start muted");
        assert_eq!(rig.deck.clips[0].volume, 1.0);
        assert!(rig.deck.clips[1..].iter().all(|c| c.volume == 0.0));
        assert_eq!(rig.deck.pending_plays, [ModeIndex(0)]);
        assert!(rig.timers.is_armed(TimerKind::Switch));
        assert!(rig.timers.is_armed(TimerKind::Prewarm));

        // Initial play resolving is not a hand-off.
        rig.settle(ModeIndex(0), true);
        assert_eq!(rig.sched.current(), ModeIndex(0));
        assert_eq!(rig.sched.handoff(), Handoff::Idle);
    }

    #[test]
    fn switch_delay_within_configured_bounds() {
        let cfg = SwitchConfig::web();
        let mut rig = Rig::new(&MODES, cfg, 9);
        rig.settle(ModeIndex(0), true);
        for _ in 0..200 {
            let delay = rig.timers.last_delay(TimerKind::Switch).unwrap();
            assert!(
                delay >= cfg.min_interval && delay <= cfg.max_interval,
                "delay {delay:?} out of bounds"
            );
            let clip = rig.run_until_play_requested();
            rig.settle(clip, true);
            rig.run_fade();
        }
    }

    #[test]
    fn prewarm_fires_partway_and_target_is_reused() {
        let cfg = SwitchConfig::web();
        let mut rig = Rig::new(&MODES, cfg, 5);
        rig.settle(ModeIndex(0), true);
        let switch_due = rig.timers.due(TimerKind::Switch).unwrap();
        let prewarm_due = rig.timers.due(TimerKind::Prewarm).unwrap();
        assert!(prewarm_due < switch_due, "prewarm must precede switch");
        assert_eq!(
            prewarm_due.ticks(),
            switch_due.ticks() / 2,
            "prewarm halfway through the wait"
        );

        rig.deck.clips[0].time = 3.0;
        assert_eq!(rig.fire_next(), TimerKind::Prewarm);
        let next = rig.sched.next().expect("prewarm selects a target");
        assert_ne!(next, ModeIndex(0));
        let (prepared, at) = *rig.deck.prepared.last().unwrap();
        assert_eq!(prepared, next);
        let remaining = (switch_due - rig.timers.now).as_secs_f64();
        assert!((at - (3.0 + remaining)).abs() < 1e-9, "seek ahead by the remaining wait");

        assert_eq!(rig.fire_next(), TimerKind::Switch);
        assert_eq!(rig.deck.pending_plays, [next]);
        assert_eq!(rig.sched.next(), None);
    }

    #[test]
    fn prewarm_disabled_leaves_timer_unarmed() {
        let cfg = SwitchConfig {
            prewarm_at: None,
            ..SwitchConfig::web()
        };
        let mut rig = Rig::new(&MODES, cfg, 5);
        rig.settle(ModeIndex(0), true);
        assert!(!rig.timers.is_armed(TimerKind::Prewarm));
        let clip = rig.run_until_play_requested();
        assert!(rig.deck.prepared.is_empty());
        assert_ne!(clip, ModeIndex(0));
    }

    #[test]
    fn switch_copies_timestamp_and_mute_before_play() {
        let mut rig = Rig::new(&MODES, SwitchConfig::web(), 11);
        rig.settle(ModeIndex(0), true);
        rig.deck.clips[0].time = 7.25;
        let target = rig.run_until_play_requested();
        let clip = &rig.deck.clips[target.get()];
        assert_eq!(clip.time, 7.25);
        assert!(clip.muted);
        assert_eq!(clip.volume, 0.0);
        assert!(!clip.visible, "target stays hidden until playback starts");
    }

    #[test]
    fn next_mode_never_equals_current() {
        let mut rig = Rig::new(&MODES, SwitchConfig::web(), 77);
        rig.settle(ModeIndex(0), true);
        for _ in 0..300 {
            let before = rig.sched.current();
            let target = rig.run_until_play_requested();
            assert_ne!(target, before, "switched to the visible mode");
            if let Some(next) = rig.sched.next() {
                assert_ne!(next, rig.sched.current());
            }
            rig.settle(target, true);
            rig.run_fade();
        }
    }

    #[test]
    fn visible_index_flips_once_and_only_after_play_resolves() {
        let mut rig = Rig::new(&MODES, SwitchConfig::web(), 3);
        rig.settle(ModeIndex(0), true);
        for _ in 0..50 {
            let before = rig.sched.current();
            let flips_before = rig.deck.visibility_changes;
            let target = rig.run_until_play_requested();

            // Nothing changes while the play request is outstanding.
            assert_eq!(rig.sched.current(), before);
            assert_eq!(visible_clips(&rig.deck), [before.get()]);
            assert_eq!(rig.deck.visibility_changes, flips_before);

            rig.settle(target, true);
            assert_eq!(rig.sched.current(), target);
            assert_eq!(visible_clips(&rig.deck), [target.get()]);
            // One hide plus one show.
            assert_eq!(rig.deck.visibility_changes, flips_before + 2);

            rig.run_fade();
            assert_eq!(rig.sched.current(), target, "fade does not flip again");
            assert_eq!(rig.deck.visibility_changes, flips_before + 2);
        }
    }

    #[test]
    fn completed_fade_lands_on_exact_volumes_and_pauses_old() {
        let cfg = SwitchConfig {
            fade: Duration::from_millis(1_000),
            fade_step: Duration::from_millis(300),
            prewarm_at: None,
            ..SwitchConfig::web()
        };
        let mut rig = Rig::new(&MODES, cfg, 21);
        rig.settle(ModeIndex(0), true);
        let target = rig.run_until_play_requested();
        rig.settle(target, true);
        assert!(rig.sched.is_fading());
        assert!(rig.deck.clips[0].playing, "old clip keeps playing during fade");

        let start = rig.timers.now;
        let mut steps = 0;
        while rig.sched.is_fading() {
            rig.fire_next();
            steps += 1;
            let old = rig.deck.clips[0].volume;
            let new = rig.deck.clips[target.get()].volume;
            assert!((old + new - 1.0).abs() < 1e-12, "volumes must stay complementary");
        }
        assert_eq!(steps, 4);
        assert_eq!(rig.timers.now - start, Duration::from_millis(1_200));
        assert_eq!(rig.deck.clips[0].volume, 0.0);
        assert_eq!(rig.deck.clips[target.get()].volume, 1.0);
        assert!(!rig.deck.clips[0].playing, "old clip paused after fade");
        assert_eq!(rig.sched.handoff(), Handoff::Idle);
    }

    #[test]
    fn zero_length_fade_completes_on_flip() {
        let cfg = SwitchConfig {
            fade: Duration::ZERO,
            ..SwitchConfig::web()
        };
        let mut rig = Rig::new(&MODES, cfg, 8);
        rig.settle(ModeIndex(0), true);
        let target = rig.run_until_play_requested();
        rig.settle(target, true);
        assert!(!rig.sched.is_fading());
        assert!(!rig.timers.is_armed(TimerKind::FadeStep));
        assert_eq!(rig.deck.clips[target.get()].volume, 1.0);
        assert_eq!(rig.deck.clips[0].volume, 0.0);
    }

    #[test]
    fn rejected_play_abandons_switch_without_retry() {
        let mut rig = Rig::new(&MODES, SwitchConfig::web(), 13);
        rig.settle(ModeIndex(0), true);
        let target = rig.run_until_play_requested();
        let requests = rig.deck.play_requests;
        rig.settle(target, false);

        assert_eq!(rig.sched.current(), ModeIndex(0));
        assert_eq!(rig.sched.handoff(), Handoff::Idle);
        assert_eq!(visible_clips(&rig.deck), [0]);
        assert_eq!(rig.deck.play_requests, requests, "no retry");
        assert!(rig.timers.is_armed(TimerKind::Switch), "cycling continues");
    }

    #[test]
    fn rejected_initial_play_is_only_logged() {
        let mut rig = Rig::new(&MODES, SwitchConfig::web(), 2);
        rig.settle(ModeIndex(0), false);
        assert_eq!(rig.sched.current(), ModeIndex(0));
        assert_eq!(rig.deck.play_requests, 1);
        assert!(rig.timers.is_armed(TimerKind::Switch));
    }

    #[test]
    fn stale_outcome_is_ignored() {
        let mut rig = Rig::new(&MODES, SwitchConfig::web(), 4);
        rig.settle(ModeIndex(0), true);
        let target = rig.run_until_play_requested();
        let other = (1..MODES.len())
            .map(ModeIndex)
            .find(|c| *c != target)
            .unwrap();
        rig.settle(other, true);
        assert_eq!(rig.sched.current(), ModeIndex(0));
        assert!(matches!(rig.sched.handoff(), Handoff::Pending { .. }));
    }

    #[test]
    fn switch_during_pending_play_is_skipped() {
        let cfg = SwitchConfig {
            min_interval: Duration::from_millis(100),
            max_interval: Duration::from_millis(100),
            prewarm_at: None,
            ..SwitchConfig::web()
        };
        let mut rig = Rig::new(&MODES, cfg, 6);
        rig.settle(ModeIndex(0), true);
        let target = rig.run_until_play_requested();
        assert_eq!(rig.fire_next(), TimerKind::Switch);
        assert_eq!(rig.deck.pending_plays, [target], "no second hand-off");
        assert!(rig.timers.is_armed(TimerKind::Switch));
    }

    #[test]
    fn switch_during_fade_is_skipped_and_fade_completes() {
        let cfg = SwitchConfig {
            min_interval: Duration::from_millis(120),
            max_interval: Duration::from_millis(120),
            fade: Duration::from_millis(1_000),
            fade_step: Duration::from_millis(50),
            prewarm_at: None,
        };
        let mut rig = Rig::new(&MODES, cfg, 6);
        rig.settle(ModeIndex(0), true);
        let target = rig.run_until_play_requested();
        rig.settle(target, true);

        let mut switches = 0;
        while rig.sched.is_fading() {
            if rig.fire_next() == TimerKind::Switch {
                switches += 1;
            }
        }
        assert!(switches > 0, "switch timer kept firing during the fade");
        assert!(rig.deck.pending_plays.is_empty(), "no hand-off started mid-fade");
        assert_eq!(rig.deck.clips[target.get()].volume, 1.0);
        assert_eq!(rig.deck.clips[0].volume, 0.0);
    }

    #[test]
    fn single_mode_never_switches() {
        let mut rig = Rig::new(&SOLO, SwitchConfig::web(), 1);
        rig.settle(ModeIndex(0), true);
        assert!(!rig.timers.is_armed(TimerKind::Prewarm));
        for _ in 0..10 {
            assert_eq!(rig.fire_next(), TimerKind::Switch);
        }
        assert_eq!(rig.sched.current(), ModeIndex(0));
        assert!(rig.deck.pending_plays.is_empty());
        assert_eq!(rig.deck.play_requests, 1);
    }

    #[test]
    fn stop_disarms_everything() {
        let mut rig = Rig::new(&MODES, SwitchConfig::web(), 10);
        rig.settle(ModeIndex(0), true);
        let target = rig.run_until_play_requested();
        rig.settle(target, true);
        assert!(rig.timers.is_armed(TimerKind::FadeStep));

        rig.sched.stop(&mut rig.timers);
        for kind in TimerKind::ALL {
            assert!(!rig.timers.is_armed(kind), "{kind:?} still armed");
        }
        assert!(rig.sched.is_stopped());

        // A late callback after teardown changes nothing.
        let volume = rig.deck.clips[target.get()].volume;
        rig.sched.on_timer(
            TimerKind::FadeStep,
            &mut rig.deck,
            &mut rig.timers,
            &mut Tracer::none(),
        );
        assert_eq!(rig.deck.clips[target.get()].volume, volume);
        assert!(!rig.timers.is_armed(TimerKind::Switch));
    }

    #[test]
    fn stop_then_start_resumes_cycling() {
        let mut rig = Rig::new(&MODES, SwitchConfig::web(), 10);
        rig.settle(ModeIndex(0), true);
        let target = rig.run_until_play_requested();
        rig.settle(target, true);
        assert!(rig.sched.is_fading());

        // Torn down mid-fade, then brought back.
        rig.sched.stop(&mut rig.timers);
        rig.sched
            .start(&mut rig.deck, &mut rig.timers, &mut Tracer::none());
        assert_eq!(rig.sched.handoff(), Handoff::Idle);
        assert_eq!(rig.sched.current(), target);
        assert_eq!(visible_clips(&rig.deck), [target.get()]);
        assert_eq!(rig.deck.clips[target.get()].volume, 1.0);
        assert_eq!(rig.deck.clips[0].volume, 0.0);
        assert!(!rig.deck.clips[0].playing, "outgoing clip is paused");
        assert_eq!(rig.deck.pending_plays, [target]);

        rig.settle(target, true);
        let next = rig.run_until_play_requested();
        assert_ne!(next, target);
        rig.settle(next, true);
        rig.run_fade();
        assert_eq!(rig.sched.current(), next);
        assert_eq!(rig.deck.clips[next.get()].volume, 1.0);
    }

    #[test]
    fn stop_during_pending_play_then_start_resumes() {
        let mut rig = Rig::new(&MODES, SwitchConfig::web(), 11);
        rig.settle(ModeIndex(0), true);
        let target = rig.run_until_play_requested();

        rig.sched.stop(&mut rig.timers);
        rig.settle(target, true);
        assert_eq!(rig.sched.current(), ModeIndex(0), "late outcome ignored");

        rig.sched
            .start(&mut rig.deck, &mut rig.timers, &mut Tracer::none());
        assert_eq!(rig.sched.handoff(), Handoff::Idle);
        assert!(!rig.deck.clips[target.get()].playing, "abandoned target is paused");

        rig.settle(ModeIndex(0), true);
        let next = rig.run_until_play_requested();
        rig.settle(next, true);
        assert_eq!(rig.sched.current(), next);
        assert!(rig.sched.is_fading());
    }

    #[test]
    fn unmute_applies_to_every_clip_and_later_switches() {
        let mut rig = Rig::new(&MODES, SwitchConfig::web(), 12);
        rig.settle(ModeIndex(0), true);
        assert!(rig.sched.unmute_all(&mut rig.deck, &rig.timers, &mut Tracer::none()));
        assert!(rig.deck.clips.iter().all(|c| !c.muted));
        assert!(!rig.sched.unmute_all(&mut rig.deck, &rig.timers, &mut Tracer::none()));

        let target = rig.run_until_play_requested();
        assert!(!rig.deck.clips[target.get()].muted, "hand-off matches mute state");
    }

    #[test]
    fn rejects_invalid_config() {
        let table = ModeTable::new(&MODES).unwrap();
        let cfg = SwitchConfig {
            fade_step: Duration::ZERO,
            ..SwitchConfig::web()
        };
        assert!(matches!(
            ModeScheduler::new(cfg, &table, Lcg::default()),
            Err(ConfigError::ZeroFadeStep)
        ));
    }

    #[cfg(feature = "trace")]
    #[test]
    fn traces_full_handoff() {
        use crate::trace::TraceSink;
        use alloc::string::String;
        use alloc::vec;

        #[derive(Default)]
        struct Names(Vec<String>);
        impl TraceSink for Names {
            fn on_switch_began(&mut self, _: &SwitchBeganEvent) {
                self.0.push("began".into());
            }
            fn on_play_settled(&mut self, _: &PlaySettledEvent) {
                self.0.push("settled".into());
            }
            fn on_flip(&mut self, _: &FlipEvent) {
                self.0.push("flip".into());
            }
            fn on_fade_finished(&mut self, _: &FadeFinishedEvent) {
                self.0.push("finished".into());
            }
        }

        let table = ModeTable::new(&MODES).unwrap();
        let cfg = SwitchConfig {
            prewarm_at: None,
            ..SwitchConfig::web()
        };
        let mut sched = ModeScheduler::new(cfg, &table, Lcg::new(1)).unwrap();
        let mut deck = FakeDeck::new(MODES.len());
        let mut timers = FakeTimers::default();
        let mut names = Names::default();

        sched.start(&mut deck, &mut timers, &mut Tracer::new(&mut names));
        let kind = timers.advance().unwrap();
        sched.on_timer(kind, &mut deck, &mut timers, &mut Tracer::new(&mut names));
        let target = deck.pending_plays.pop().unwrap();
        sched.on_play_settled(target, true, &mut deck, &mut timers, &mut Tracer::new(&mut names));
        while sched.is_fading() {
            let kind = timers.advance().unwrap();
            sched.on_timer(kind, &mut deck, &mut timers, &mut Tracer::new(&mut names));
        }
        assert_eq!(names.0, vec!["began", "settled", "flip", "finished"]);
    }
}
