// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Host times
//! print in milliseconds, media times in seconds.

use std::io::Write;

use modeloop_core::time::HostTime;
use modeloop_core::trace::{
    FadeFinishedEvent, FadeStepEvent, FlipEvent, PlayOutcome, PlaySettledEvent, PrewarmEvent,
    SwitchBeganEvent, SwitchScheduledEvent, SwitchSkippedEvent, TraceSink, UnmutedEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    fade_steps: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("fade_steps", &self.fade_steps)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    ///
    /// Fade steps are printed; turn them off with
    /// [`fade_steps`](Self::fade_steps).
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            fade_steps: true,
        }
    }

    /// Whether to print a line for every fade step.
    #[must_use]
    pub fn fade_steps(mut self, enabled: bool) -> Self {
        self.fade_steps = enabled;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn host_ms(t: HostTime) -> f64 {
    t.ticks() as f64 / 1000.0
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_switch_scheduled(&mut self, e: &SwitchScheduledEvent) {
        let _ = match e.prewarm_after {
            Some(p) => writeln!(
                self.writer,
                "[schedule] at={:.1}ms delay={:.1}ms prewarm={:.1}ms",
                host_ms(e.at),
                e.delay.as_millis_f64(),
                p.as_millis_f64(),
            ),
            None => writeln!(
                self.writer,
                "[schedule] at={:.1}ms delay={:.1}ms",
                host_ms(e.at),
                e.delay.as_millis_f64(),
            ),
        };
    }

    fn on_prewarm(&mut self, e: &PrewarmEvent) {
        let _ = writeln!(
            self.writer,
            "[prewarm] at={:.1}ms {} -> {} seek={:.3}s",
            host_ms(e.at),
            e.current,
            e.next,
            e.seek_to,
        );
    }

    fn on_switch_began(&mut self, e: &SwitchBeganEvent) {
        let _ = writeln!(
            self.writer,
            "[switch] at={:.1}ms {} -> {} media={:.3}s muted={}",
            host_ms(e.at),
            e.from,
            e.to,
            e.media_time,
            e.muted,
        );
    }

    fn on_switch_skipped(&mut self, e: &SwitchSkippedEvent) {
        let _ = writeln!(
            self.writer,
            "[skip] at={:.1}ms reason={:?}",
            host_ms(e.at),
            e.reason,
        );
    }

    fn on_play_settled(&mut self, e: &PlaySettledEvent) {
        let outcome = match e.outcome {
            PlayOutcome::Resolved => "ok",
            PlayOutcome::Rejected => "REJECTED",
        };
        let stale = if e.stale { " stale" } else { "" };
        let _ = writeln!(
            self.writer,
            "[play] at={:.1}ms clip={} {outcome}{stale}",
            host_ms(e.at),
            e.clip,
        );
    }

    fn on_flip(&mut self, e: &FlipEvent) {
        let _ = writeln!(
            self.writer,
            "[flip] at={:.1}ms {} -> {}",
            host_ms(e.at),
            e.from,
            e.to,
        );
    }

    fn on_fade_step(&mut self, e: &FadeStepEvent) {
        if !self.fade_steps {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[fade] at={:.1}ms {}={:.3} {}={:.3}",
            host_ms(e.at),
            e.from,
            e.outgoing,
            e.to,
            e.incoming,
        );
    }

    fn on_fade_finished(&mut self, e: &FadeFinishedEvent) {
        let _ = writeln!(
            self.writer,
            "[fade:end] at={:.1}ms {} -> {}",
            host_ms(e.at),
            e.from,
            e.to,
        );
    }

    fn on_unmuted(&mut self, e: &UnmutedEvent) {
        let _ = writeln!(
            self.writer,
            "[unmute] at={:.1}ms clips={}",
            host_ms(e.at),
            e.clips,
        );
    }
}
