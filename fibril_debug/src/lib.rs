// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for fibril
//! diagnostics.
//!
//! This crate provides [`TraceSink`](fibril_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//! - [`Fanout`]: forwards every event to two sinks.

pub mod chrome;
pub mod pretty;
pub mod recorder;

use fibril_core::trace::{
    CommitEvent, EffectEvent, PassBeginEvent, PassDiscardedEvent, SliceEvent, TraceSink,
    UnitEvent,
};

/// A [`TraceSink`] that forwards every event to two sinks, `first` then
/// `second`.
#[derive(Debug)]
pub struct Fanout<A, B> {
    /// Receives each event first.
    pub first: A,
    /// Receives each event second.
    pub second: B,
}

impl<A: TraceSink, B: TraceSink> TraceSink for Fanout<A, B> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.first.on_pass_begin(e);
        self.second.on_pass_begin(e);
    }

    fn on_pass_discarded(&mut self, e: &PassDiscardedEvent) {
        self.first.on_pass_discarded(e);
        self.second.on_pass_discarded(e);
    }

    fn on_slice(&mut self, e: &SliceEvent) {
        self.first.on_slice(e);
        self.second.on_slice(e);
    }

    fn on_unit(&mut self, e: &UnitEvent) {
        self.first.on_unit(e);
        self.second.on_unit(e);
    }

    fn on_effect(&mut self, e: &EffectEvent) {
        self.first.on_effect(e);
        self.second.on_effect(e);
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        self.first.on_commit(e);
        self.second.on_commit(e);
    }
}
