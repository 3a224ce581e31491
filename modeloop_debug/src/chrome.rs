// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Each hand-off becomes a `Handoff` span (switch request to fade end, or to
//! the play outcome when playback is refused), fade volumes become a
//! `Volume` counter track, and everything else is an instant event.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use modeloop_core::trace::PlayOutcome;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Host time ticks are already microseconds and are written unchanged.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut span_open = false;

    for recorded in decode(bytes) {
        let ts = recorded.at().ticks();
        match recorded {
            RecordedEvent::SwitchScheduled(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "SwitchScheduled",
                    "cat": "Scheduler",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "delay_ms": e.delay.as_millis_f64(),
                        "prewarm_ms": e.prewarm_after.map(|p| p.as_millis_f64()),
                    }
                }));
            }
            RecordedEvent::Prewarm(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Prewarm",
                    "cat": "Scheduler",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "current": e.current.get(),
                        "next": e.next.get(),
                        "seek_to": e.seek_to,
                    }
                }));
            }
            RecordedEvent::SwitchBegan(e) => {
                span_open = true;
                events.push(json!({
                    "ph": "B",
                    "name": "Handoff",
                    "cat": "Handoff",
                    "ts": ts,
                    "pid": 0,
                    "tid": 1,
                    "args": {
                        "from": e.from.get(),
                        "to": e.to.get(),
                        "media_time": e.media_time,
                        "muted": e.muted,
                    }
                }));
            }
            RecordedEvent::SwitchSkipped(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "SwitchSkipped",
                    "cat": "Scheduler",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "reason": format!("{:?}", e.reason),
                    }
                }));
            }
            RecordedEvent::PlaySettled(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "PlaySettled",
                    "cat": "Handoff",
                    "ts": ts,
                    "pid": 0,
                    "tid": 1,
                    "s": "t",
                    "args": {
                        "clip": e.clip.get(),
                        "outcome": format!("{:?}", e.outcome),
                        "stale": e.stale,
                    }
                }));
                if span_open && !e.stale && e.outcome == PlayOutcome::Rejected {
                    span_open = false;
                    events.push(span_end(ts));
                }
            }
            RecordedEvent::Flip(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Flip",
                    "cat": "Handoff",
                    "ts": ts,
                    "pid": 0,
                    "tid": 1,
                    "s": "p",
                    "args": {
                        "from": e.from.get(),
                        "to": e.to.get(),
                    }
                }));
            }
            RecordedEvent::FadeStep(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": "Volume",
                    "cat": "Fade",
                    "ts": ts,
                    "pid": 0,
                    "args": {
                        "outgoing": e.outgoing,
                        "incoming": e.incoming,
                    }
                }));
            }
            RecordedEvent::FadeFinished(_) => {
                if span_open {
                    span_open = false;
                    events.push(span_end(ts));
                }
            }
            RecordedEvent::Unmuted(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Unmuted",
                    "cat": "Input",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "clips": e.clips,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn span_end(ts: u64) -> Value {
    json!({
        "ph": "E",
        "name": "Handoff",
        "cat": "Handoff",
        "ts": ts,
        "pid": 0,
        "tid": 1,
    })
}
