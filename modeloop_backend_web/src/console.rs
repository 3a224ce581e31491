// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser console trace sink.

use alloc::format;
use alloc::string::String;

use modeloop_core::mode::{ModeIndex, ModeTable};
use modeloop_core::trace::{
    FadeFinishedEvent, FadeStepEvent, FlipEvent, PlayOutcome, PlaySettledEvent, PrewarmEvent,
    SwitchBeganEvent, SwitchScheduledEvent, SwitchSkippedEvent, TraceSink, UnmutedEvent,
};
use wasm_bindgen::JsValue;

/// A [`TraceSink`] that writes one line per event to the browser console.
///
/// Fade steps are high-frequency and only logged when
/// [`with_fade_steps`](Self::with_fade_steps) is set.
#[derive(Debug)]
pub struct ConsoleSink {
    modes: ModeTable,
    fade_steps: bool,
}

impl ConsoleSink {
    /// Creates a sink that names clips after `modes`.
    #[must_use]
    pub fn new(modes: ModeTable) -> Self {
        Self {
            modes,
            fade_steps: false,
        }
    }

    /// Also log every fade step.
    #[must_use]
    pub fn with_fade_steps(mut self, enabled: bool) -> Self {
        self.fade_steps = enabled;
        self
    }

    fn log(line: &str) {
        web_sys::console::log_1(&JsValue::from_str(line));
    }

    fn name(&self, index: ModeIndex) -> String {
        format!("{} ({index})", self.modes.name_of(index))
    }
}

impl TraceSink for ConsoleSink {
    fn on_switch_scheduled(&mut self, e: &SwitchScheduledEvent) {
        let line = match e.prewarm_after {
            Some(p) => format!(
                "[modeloop] next switch in {:.0}ms (prewarm in {:.0}ms)",
                e.delay.as_millis_f64(),
                p.as_millis_f64()
            ),
            None => format!("[modeloop] next switch in {:.0}ms", e.delay.as_millis_f64()),
        };
        Self::log(&line);
    }

    fn on_prewarm(&mut self, e: &PrewarmEvent) {
        Self::log(&format!(
            "[modeloop] prewarm {} at {:.3}s",
            self.name(e.next),
            e.seek_to
        ));
    }

    fn on_switch_began(&mut self, e: &SwitchBeganEvent) {
        Self::log(&format!(
            "[modeloop] switch {} -> {} at {:.3}s{}",
            self.name(e.from),
            self.name(e.to),
            e.media_time,
            if e.muted { " (muted)" } else { "" }
        ));
    }

    fn on_switch_skipped(&mut self, e: &SwitchSkippedEvent) {
        Self::log(&format!("[modeloop] switch skipped: {:?}", e.reason));
    }

    fn on_play_settled(&mut self, e: &PlaySettledEvent) {
        let outcome = match e.outcome {
            PlayOutcome::Resolved => "started",
            PlayOutcome::Rejected => "rejected",
        };
        let stale = if e.stale { " (stale)" } else { "" };
        let line = format!("[modeloop] play {} {outcome}{stale}", self.name(e.clip));
        if e.outcome == PlayOutcome::Rejected {
            web_sys::console::warn_1(&JsValue::from_str(&line));
        } else {
            Self::log(&line);
        }
    }

    fn on_flip(&mut self, e: &FlipEvent) {
        Self::log(&format!("[modeloop] now showing {}", self.name(e.to)));
    }

    fn on_fade_step(&mut self, e: &FadeStepEvent) {
        if self.fade_steps {
            Self::log(&format!(
                "[modeloop] fade {:.2} / {:.2}",
                e.outgoing, e.incoming
            ));
        }
    }

    fn on_fade_finished(&mut self, e: &FadeFinishedEvent) {
        Self::log(&format!(
            "[modeloop] fade {} -> {} finished",
            self.name(e.from),
            self.name(e.to)
        ));
    }

    fn on_unmuted(&mut self, e: &UnmutedEvent) {
        Self::log(&format!("[modeloop] unmuted {} clips", e.clips));
    }
}
