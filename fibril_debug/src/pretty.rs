// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use fibril_core::trace::{
    CommitEvent, EffectEvent, PassBeginEvent, PassDiscardedEvent, PassReason, SliceEvent,
    SliceOutcome, TraceSink, UnitEvent, UnitKind,
};
use fibril_core::{EffectTag, FiberId};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    rich: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("rich", &self.rich)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            rich: true,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            rich: true,
        }
    }

    /// Sets whether per-fiber unit and effect lines are written.
    ///
    /// On by default. A large tree produces several lines per fiber.
    #[must_use]
    pub fn rich(mut self, rich: bool) -> Self {
        self.rich = rich;
        self
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn reason_name(reason: PassReason) -> &'static str {
    match reason {
        PassReason::Mount => "mount",
        PassReason::StateUpdate => "state-update",
    }
}

fn outcome_name(outcome: SliceOutcome) -> &'static str {
    match outcome {
        SliceOutcome::Idle => "idle",
        SliceOutcome::Yielded => "yielded",
        SliceOutcome::Completed => "completed",
    }
}

fn unit_name(kind: UnitKind) -> &'static str {
    match kind {
        UnitKind::Root => "root",
        UnitKind::Host => "host",
        UnitKind::Component => "component",
    }
}

fn effect_name(tag: EffectTag) -> &'static str {
    match tag {
        EffectTag::None => "none",
        EffectTag::Placement => "placement",
        EffectTag::Update => "update",
        EffectTag::Deletion => "deletion",
    }
}

fn fiber_label(fiber: FiberId) -> String {
    format!("{}@{}", fiber.index(), fiber.pass())
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[pass:begin] pass={} reason={}",
            e.pass,
            reason_name(e.reason),
        );
    }

    fn on_pass_discarded(&mut self, e: &PassDiscardedEvent) {
        let _ = writeln!(
            self.writer,
            "[pass:discard] pass={} units={}",
            e.pass, e.units,
        );
    }

    fn on_slice(&mut self, e: &SliceEvent) {
        let pass = e.pass.map_or_else(|| "-".to_owned(), |p| p.to_string());
        let _ = writeln!(
            self.writer,
            "[slice] #{} pass={pass} units={} {}",
            e.slice,
            e.units,
            outcome_name(e.outcome),
        );
    }

    fn on_unit(&mut self, e: &UnitEvent) {
        if !self.rich {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[unit] pass={} fiber={} {}",
            e.pass,
            fiber_label(e.fiber),
            unit_name(e.kind),
        );
    }

    fn on_effect(&mut self, e: &EffectEvent) {
        if !self.rich {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[effect] pass={} fiber={} {}",
            e.pass,
            fiber_label(e.fiber),
            effect_name(e.tag),
        );
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        let _ = writeln!(
            self.writer,
            "[commit] pass={} placements={} updates={} deletions={}",
            e.pass, e.placements, e.updates, e.deletions,
        );
    }
}
