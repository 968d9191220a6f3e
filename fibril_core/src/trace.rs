// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the render loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! work loop and committer call at each stage. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`UnitEvent`] and [`EffectEvent`]
//!   plus the corresponding `TraceSink` methods.

#[cfg(feature = "trace-rich")]
use crate::fiber::{EffectTag, FiberId};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why a render pass was started.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassReason {
    /// [`Root::render`](crate::Root::render) was called.
    Mount,
    /// A [`StateSetter`](crate::StateSetter) queued an update.
    StateUpdate,
}

/// How a scheduler slice ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SliceOutcome {
    /// There was no work to do.
    Idle,
    /// The deadline ran out with work remaining.
    Yielded,
    /// The pass finished and was committed.
    Completed,
}

/// What a processed fiber was.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// The root fiber of a pass.
    Root,
    /// A host element or text fiber.
    Host,
    /// A function component fiber (its render function ran).
    Component,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a render pass is seeded.
#[derive(Clone, Copy, Debug)]
pub struct PassBeginEvent {
    /// Monotonic pass counter.
    pub pass: u64,
    /// Why the pass was started.
    pub reason: PassReason,
}

/// Emitted when an unfinished pass is thrown away.
#[derive(Clone, Copy, Debug)]
pub struct PassDiscardedEvent {
    /// The discarded pass.
    pub pass: u64,
    /// Units of work it had completed.
    pub units: u32,
}

/// Emitted at the end of every scheduler slice.
#[derive(Clone, Copy, Debug)]
pub struct SliceEvent {
    /// Monotonic slice counter.
    pub slice: u64,
    /// The pass the slice worked on, if any.
    pub pass: Option<u64>,
    /// Units of work performed in this slice.
    pub units: u32,
    /// How the slice ended.
    pub outcome: SliceOutcome,
}

/// Emitted after each unit of work.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct UnitEvent {
    /// Pass counter.
    pub pass: u64,
    /// The processed fiber.
    pub fiber: FiberId,
    /// What the fiber was.
    pub kind: UnitKind,
}

/// Emitted for each effect applied during commit.
///
/// For deletions `fiber` is a handle into the tree being replaced.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct EffectEvent {
    /// Pass counter.
    pub pass: u64,
    /// The fiber whose effect was applied.
    pub fiber: FiberId,
    /// The applied effect.
    pub tag: EffectTag,
}

/// Emitted once a pass has been committed and promoted to `current`.
#[derive(Clone, Copy, Debug)]
pub struct CommitEvent {
    /// Pass counter.
    pub pass: u64,
    /// Fibers tagged `Placement`.
    pub placements: u32,
    /// Fibers tagged `Update`.
    pub updates: u32,
    /// Fibers removed from the previous tree.
    pub deletions: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the render loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a render pass is seeded.
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        _ = e;
    }

    /// Called when an unfinished pass is discarded.
    fn on_pass_discarded(&mut self, e: &PassDiscardedEvent) {
        _ = e;
    }

    /// Called at the end of every scheduler slice.
    fn on_slice(&mut self, e: &SliceEvent) {
        _ = e;
    }

    /// Called after each unit of work (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_unit(&mut self, e: &UnitEvent) {
        _ = e;
    }

    /// Called for each applied effect (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_effect(&mut self, e: &EffectEvent) {
        _ = e;
    }

    /// Called after a pass is committed.
    fn on_commit(&mut self, e: &CommitEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PassBeginEvent`].
    #[inline]
    pub fn pass_begin(&mut self, e: &PassBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PassDiscardedEvent`].
    #[inline]
    pub fn pass_discarded(&mut self, e: &PassDiscardedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_discarded(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SliceEvent`].
    #[inline]
    pub fn slice(&mut self, e: &SliceEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_slice(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`UnitEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn unit(&mut self, e: &UnitEvent) {
        if let Some(s) = &mut self.sink {
            s.on_unit(e);
        }
    }

    /// Emits an [`EffectEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn effect(&mut self, e: &EffectEvent) {
        if let Some(s) = &mut self.sink {
            s.on_effect(e);
        }
    }

    /// Emits a [`CommitEvent`].
    #[inline]
    pub fn commit(&mut self, e: &CommitEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_commit(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_pass_begin(&PassBeginEvent {
            pass: 1,
            reason: PassReason::Mount,
        });
        sink.on_slice(&SliceEvent {
            slice: 0,
            pass: Some(1),
            units: 3,
            outcome: SliceOutcome::Yielded,
        });
        sink.on_commit(&CommitEvent {
            pass: 1,
            placements: 3,
            updates: 0,
            deletions: 0,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.pass_begin(&PassBeginEvent {
            pass: 1,
            reason: PassReason::StateUpdate,
        });
        tracer.pass_discarded(&PassDiscardedEvent { pass: 1, units: 2 });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            passes: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_pass_begin(&mut self, e: &PassBeginEvent) {
                self.passes.push(e.pass);
            }
        }

        let mut sink = RecordingSink { passes: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.pass_begin(&PassBeginEvent {
            pass: 7,
            reason: PassReason::Mount,
        });
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.passes, &[7]);
    }
}
