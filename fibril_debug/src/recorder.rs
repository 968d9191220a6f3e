// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Fiber handles are stored as their slot index and pass, and come back as a
//! [`RecordedFiber`].

use fibril_core::EffectTag;
use fibril_core::trace::{
    CommitEvent, EffectEvent, PassBeginEvent, PassDiscardedEvent, PassReason, SliceEvent,
    SliceOutcome, TraceSink, UnitEvent, UnitKind,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PASS_BEGIN: u8 = 1;
const TAG_PASS_DISCARDED: u8 = 2;
const TAG_SLICE: u8 = 3;
const TAG_UNIT: u8 = 4;
const TAG_EFFECT: u8 = 5;
const TAG_COMMIT: u8 = 6;

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

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
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

    fn write_fiber(&mut self, index: u32, pass: u64) {
        self.write_u32(index);
        self.write_u64(pass);
    }
}

impl TraceSink for RecorderSink {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.write_u8(TAG_PASS_BEGIN);
        self.write_u64(e.pass);
        self.write_u8(match e.reason {
            PassReason::Mount => 0,
            PassReason::StateUpdate => 1,
        });
    }

    fn on_pass_discarded(&mut self, e: &PassDiscardedEvent) {
        self.write_u8(TAG_PASS_DISCARDED);
        self.write_u64(e.pass);
        self.write_u32(e.units);
    }

    fn on_slice(&mut self, e: &SliceEvent) {
        self.write_u8(TAG_SLICE);
        self.write_u64(e.slice);
        self.write_option_u64(e.pass);
        self.write_u32(e.units);
        self.write_u8(match e.outcome {
            SliceOutcome::Idle => 0,
            SliceOutcome::Yielded => 1,
            SliceOutcome::Completed => 2,
        });
    }

    fn on_unit(&mut self, e: &UnitEvent) {
        self.write_u8(TAG_UNIT);
        self.write_u64(e.pass);
        self.write_fiber(e.fiber.index(), e.fiber.pass());
        self.write_u8(match e.kind {
            UnitKind::Root => 0,
            UnitKind::Host => 1,
            UnitKind::Component => 2,
        });
    }

    fn on_effect(&mut self, e: &EffectEvent) {
        self.write_u8(TAG_EFFECT);
        self.write_u64(e.pass);
        self.write_fiber(e.fiber.index(), e.fiber.pass());
        self.write_u8(match e.tag {
            EffectTag::None => 0,
            EffectTag::Placement => 1,
            EffectTag::Update => 2,
            EffectTag::Deletion => 3,
        });
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        self.write_u8(TAG_COMMIT);
        self.write_u64(e.pass);
        self.write_u32(e.placements);
        self.write_u32(e.updates);
        self.write_u32(e.deletions);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A fiber handle as stored in a recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecordedFiber {
    /// Slot index in its tree.
    pub index: u32,
    /// Pass that built its tree.
    pub pass: u64,
}

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`PassBeginEvent`].
    PassBegin(PassBeginEvent),
    /// A [`PassDiscardedEvent`].
    PassDiscarded(PassDiscardedEvent),
    /// A [`SliceEvent`].
    Slice(SliceEvent),
    /// A [`UnitEvent`].
    Unit {
        /// Pass counter.
        pass: u64,
        /// The processed fiber.
        fiber: RecordedFiber,
        /// What the fiber was.
        kind: UnitKind,
    },
    /// An [`EffectEvent`].
    Effect {
        /// Pass counter.
        pass: u64,
        /// The fiber whose effect was applied.
        fiber: RecordedFiber,
        /// The applied effect.
        tag: EffectTag,
    },
    /// A [`CommitEvent`].
    Commit(CommitEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
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
    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.read_array::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    fn read_option_u64(&mut self) -> Option<Option<u64>> {
        let present = self.read_u8()?;
        let val = self.read_u64()?;
        Some(if present != 0 { Some(val) } else { None })
    }

    fn read_fiber(&mut self) -> Option<RecordedFiber> {
        Some(RecordedFiber {
            index: self.read_u32()?,
            pass: self.read_u64()?,
        })
    }

    fn decode_pass_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassBegin(PassBeginEvent {
            pass: self.read_u64()?,
            reason: match self.read_u8()? {
                0 => PassReason::Mount,
                _ => PassReason::StateUpdate,
            },
        }))
    }

    fn decode_pass_discarded(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassDiscarded(PassDiscardedEvent {
            pass: self.read_u64()?,
            units: self.read_u32()?,
        }))
    }

    fn decode_slice(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Slice(SliceEvent {
            slice: self.read_u64()?,
            pass: self.read_option_u64()?,
            units: self.read_u32()?,
            outcome: match self.read_u8()? {
                0 => SliceOutcome::Idle,
                1 => SliceOutcome::Yielded,
                _ => SliceOutcome::Completed,
            },
        }))
    }

    fn decode_unit(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Unit {
            pass: self.read_u64()?,
            fiber: self.read_fiber()?,
            kind: match self.read_u8()? {
                0 => UnitKind::Root,
                1 => UnitKind::Host,
                _ => UnitKind::Component,
            },
        })
    }

    fn decode_effect(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Effect {
            pass: self.read_u64()?,
            fiber: self.read_fiber()?,
            tag: match self.read_u8()? {
                0 => EffectTag::None,
                1 => EffectTag::Placement,
                2 => EffectTag::Update,
                _ => EffectTag::Deletion,
            },
        })
    }

    fn decode_commit(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Commit(CommitEvent {
            pass: self.read_u64()?,
            placements: self.read_u32()?,
            updates: self.read_u32()?,
            deletions: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_PASS_BEGIN => self.decode_pass_begin(),
            TAG_PASS_DISCARDED => self.decode_pass_discarded(),
            TAG_SLICE => self.decode_slice(),
            TAG_UNIT => self.decode_unit(),
            TAG_EFFECT => self.decode_effect(),
            TAG_COMMIT => self.decode_commit(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
