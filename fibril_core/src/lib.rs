// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fiber reconciliation engine for incremental UI rendering.
//!
//! `fibril_core` keeps a mutable host tree (a DOM, a native view tree, an
//! in-memory test tree) synchronized with a declarative [`Element`] tree. It
//! re-renders only what changed and does so in small, interruptible slices.
//! It is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   Root::render(element) / StateSetter::set(..)
//!       │
//!       ▼
//!   work-in-progress FiberTree ◄──── alternate ──── current FiberTree
//!       │
//!       ▼
//!   Root::work_loop(host, deadline)      (one unit of work at a time,
//!       │  ├─ component: call render fn   yields when the deadline runs
//!       │  ├─ host: create host node      out, resumes on the next slice)
//!       │  └─ reconcile children
//!       ▼
//!   commit (one uninterrupted pass) ──► HostAdapter mutations
//!       │
//!       ▼
//!   work-in-progress promoted to current
//! ```
//!
//! **[`element`]**: The immutable input description: kinds, props, event
//! handlers, and small builders.
//!
//! **[`fiber`]**: Struct-of-arrays fiber arena with pass-scoped handles,
//! effect tags, and depth-first traversal.
//!
//! **[`reconcile`]**: Positional child diffing that tags each new fiber
//! `Placement` or `Update` and queues replaced fibers for deletion.
//!
//! **[`hooks`]**: Positional per-fiber state cells ([`Hooks::use_state`])
//! and the setters that queue updates and request a new pass.
//!
//! **[`scheduler`]**: [`SchedulerConfig`], the [`IdleDeadline`] contract,
//! and the cooperative work loop.
//!
//! **[`root`]**: [`Root`], the per-container engine object that owns the
//! `current` and work-in-progress trees.
//!
//! **[`host`]**: The [`HostAdapter`] trait that platform backends implement.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! render-loop instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-fiber unit
//!   and effect events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod commit;
pub mod element;
mod error;
pub mod fiber;
pub mod hooks;
pub mod host;
pub mod reconcile;
pub mod root;
pub mod scheduler;
pub mod trace;

#[cfg(test)]
mod testing;

pub use element::{Component, Element, ElementKind, EventHandler, PropValue, Props, RenderFn};
pub use error::Error;
pub use fiber::{EffectTag, FiberId, FiberTree};
pub use hooks::{Hooks, StateSetter};
pub use host::{HostAdapter, NodeKind};
pub use root::Root;
pub use scheduler::{IdleDeadline, SchedulerConfig, SliceOutcome, Unbounded};
