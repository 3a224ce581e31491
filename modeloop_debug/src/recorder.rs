// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Media timestamps and volumes are stored as raw `f64` bits, so decoding
//! reproduces them exactly.

use modeloop_core::mode::ModeIndex;
use modeloop_core::time::{Duration, HostTime};
use modeloop_core::trace::{
    FadeFinishedEvent, FadeStepEvent, FlipEvent, PlayOutcome, PlaySettledEvent, PrewarmEvent,
    SkipReason, SwitchBeganEvent, SwitchScheduledEvent, SwitchSkippedEvent, TraceSink,
    UnmutedEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_SWITCH_SCHEDULED: u8 = 1;
const TAG_PREWARM: u8 = 2;
const TAG_SWITCH_BEGAN: u8 = 3;
const TAG_SWITCH_SKIPPED: u8 = 4;
const TAG_PLAY_SETTLED: u8 = 5;
const TAG_FLIP: u8 = 6;
const TAG_FADE_STEP: u8 = 7;
const TAG_FADE_FINISHED: u8 = 8;
const TAG_UNMUTED: u8 = 9;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_index(&mut self, index: ModeIndex) {
        self.write_u64(index.get() as u64);
    }

    fn write_option_u64(&mut self, v: Option<u64>) {
        match v {
            Some(val) => {
                self.write_u8(1);
                self.write_u64(val);
            }
            None => {
                self.write_u8(0);
                self.write_u64(0);
            }
        }
    }

    fn write_skip_reason(&mut self, r: SkipReason) {
        self.write_u8(match r {
            SkipReason::SingleMode => 0,
            SkipReason::InFlight => 1,
            SkipReason::Stopped => 2,
        });
    }

    fn write_outcome(&mut self, o: PlayOutcome) {
        self.write_u8(match o {
            PlayOutcome::Resolved => 0,
            PlayOutcome::Rejected => 1,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_switch_scheduled(&mut self, e: &SwitchScheduledEvent) {
        self.write_u8(TAG_SWITCH_SCHEDULED);
        self.write_u64(e.at.ticks());
        self.write_u64(e.delay.ticks());
        self.write_option_u64(e.prewarm_after.map(Duration::ticks));
    }

    fn on_prewarm(&mut self, e: &PrewarmEvent) {
        self.write_u8(TAG_PREWARM);
        self.write_u64(e.at.ticks());
        self.write_index(e.current);
        self.write_index(e.next);
        self.write_f64(e.seek_to);
    }

    fn on_switch_began(&mut self, e: &SwitchBeganEvent) {
        self.write_u8(TAG_SWITCH_BEGAN);
        self.write_u64(e.at.ticks());
        self.write_index(e.from);
        self.write_index(e.to);
        self.write_f64(e.media_time);
        self.write_bool(e.muted);
    }

    fn on_switch_skipped(&mut self, e: &SwitchSkippedEvent) {
        self.write_u8(TAG_SWITCH_SKIPPED);
        self.write_u64(e.at.ticks());
        self.write_skip_reason(e.reason);
    }

    fn on_play_settled(&mut self, e: &PlaySettledEvent) {
        self.write_u8(TAG_PLAY_SETTLED);
        self.write_u64(e.at.ticks());
        self.write_index(e.clip);
        self.write_outcome(e.outcome);
        self.write_bool(e.stale);
    }

    fn on_flip(&mut self, e: &FlipEvent) {
        self.write_u8(TAG_FLIP);
        self.write_u64(e.at.ticks());
        self.write_index(e.from);
        self.write_index(e.to);
    }

    fn on_fade_step(&mut self, e: &FadeStepEvent) {
        self.write_u8(TAG_FADE_STEP);
        self.write_u64(e.at.ticks());
        self.write_index(e.from);
        self.write_index(e.to);
        self.write_f64(e.outgoing);
        self.write_f64(e.incoming);
    }

    fn on_fade_finished(&mut self, e: &FadeFinishedEvent) {
        self.write_u8(TAG_FADE_FINISHED);
        self.write_u64(e.at.ticks());
        self.write_index(e.from);
        self.write_index(e.to);
    }

    fn on_unmuted(&mut self, e: &UnmutedEvent) {
        self.write_u8(TAG_UNMUTED);
        self.write_u64(e.at.ticks());
        self.write_u64(e.clips as u64);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`SwitchScheduledEvent`].
    SwitchScheduled(SwitchScheduledEvent),
    /// A [`PrewarmEvent`].
    Prewarm(PrewarmEvent),
    /// A [`SwitchBeganEvent`].
    SwitchBegan(SwitchBeganEvent),
    /// A [`SwitchSkippedEvent`].
    SwitchSkipped(SwitchSkippedEvent),
    /// A [`PlaySettledEvent`].
    PlaySettled(PlaySettledEvent),
    /// A [`FlipEvent`].
    Flip(FlipEvent),
    /// A [`FadeStepEvent`].
    FadeStep(FadeStepEvent),
    /// A [`FadeFinishedEvent`].
    FadeFinished(FadeFinishedEvent),
    /// An [`UnmutedEvent`].
    Unmuted(UnmutedEvent),
}

impl RecordedEvent {
    /// Host time the event was emitted at.
    #[must_use]
    pub fn at(&self) -> HostTime {
        match self {
            Self::SwitchScheduled(e) => e.at,
            Self::Prewarm(e) => e.at,
            Self::SwitchBegan(e) => e.at,
            Self::SwitchSkipped(e) => e.at,
            Self::PlaySettled(e) => e.at,
            Self::Flip(e) => e.at,
            Self::FadeStep(e) => e.at,
            Self::FadeFinished(e) => e.at,
            Self::Unmuted(e) => e.at,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_index(&mut self) -> Option<ModeIndex> {
        usize::try_from(self.read_u64()?).ok().map(ModeIndex)
    }

    fn read_option_u64(&mut self) -> Option<Option<u64>> {
        let present = self.read_u8()?;
        let val = self.read_u64()?;
        Some(if present != 0 { Some(val) } else { None })
    }

    fn read_skip_reason(&mut self) -> Option<SkipReason> {
        Some(match self.read_u8()? {
            0 => SkipReason::SingleMode,
            1 => SkipReason::InFlight,
            2 => SkipReason::Stopped,
            _ => return None,
        })
    }

    fn read_outcome(&mut self) -> Option<PlayOutcome> {
        Some(match self.read_u8()? {
            0 => PlayOutcome::Resolved,
            1 => PlayOutcome::Rejected,
            _ => return None,
        })
    }

    fn decode_switch_scheduled(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SwitchScheduled(SwitchScheduledEvent {
            at: self.read_time()?,
            delay: Duration(self.read_u64()?),
            prewarm_after: self.read_option_u64()?.map(Duration),
        }))
    }

    fn decode_prewarm(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Prewarm(PrewarmEvent {
            at: self.read_time()?,
            current: self.read_index()?,
            next: self.read_index()?,
            seek_to: self.read_f64()?,
        }))
    }

    fn decode_switch_began(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SwitchBegan(SwitchBeganEvent {
            at: self.read_time()?,
            from: self.read_index()?,
            to: self.read_index()?,
            media_time: self.read_f64()?,
            muted: self.read_bool()?,
        }))
    }

    fn decode_switch_skipped(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SwitchSkipped(SwitchSkippedEvent {
            at: self.read_time()?,
            reason: self.read_skip_reason()?,
        }))
    }

    fn decode_play_settled(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PlaySettled(PlaySettledEvent {
            at: self.read_time()?,
            clip: self.read_index()?,
            outcome: self.read_outcome()?,
            stale: self.read_bool()?,
        }))
    }

    fn decode_flip(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Flip(FlipEvent {
            at: self.read_time()?,
            from: self.read_index()?,
            to: self.read_index()?,
        }))
    }

    fn decode_fade_step(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FadeStep(FadeStepEvent {
            at: self.read_time()?,
            from: self.read_index()?,
            to: self.read_index()?,
            outgoing: self.read_f64()?,
            incoming: self.read_f64()?,
        }))
    }

    fn decode_fade_finished(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FadeFinished(FadeFinishedEvent {
            at: self.read_time()?,
            from: self.read_index()?,
            to: self.read_index()?,
        }))
    }

    fn decode_unmuted(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Unmuted(UnmutedEvent {
            at: self.read_time()?,
            clips: usize::try_from(self.read_u64()?).ok()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_SWITCH_SCHEDULED => self.decode_switch_scheduled(),
            TAG_PREWARM => self.decode_prewarm(),
            TAG_SWITCH_BEGAN => self.decode_switch_began(),
            TAG_SWITCH_SKIPPED => self.decode_switch_skipped(),
            TAG_PLAY_SETTLED => self.decode_play_settled(),
            TAG_FLIP => self.decode_flip(),
            TAG_FADE_STEP => self.decode_fade_step(),
            TAG_FADE_FINISHED => self.decode_fade_finished(),
            TAG_UNMUTED => self.decode_unmuted(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
