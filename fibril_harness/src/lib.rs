// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test doubles for driving Fibril roots without a real host.
//!
//! - [`MemoryHost`]: an in-memory host tree implementing
//!   [`HostAdapter`](fibril_core::HostAdapter), with an operation log, failure
//!   injection, event dispatch, and markup snapshots.
//! - [`UnitDeadline`] and [`FixedDeadline`]: deterministic
//!   [`IdleDeadline`](fibril_core::IdleDeadline)s.
//! - [`IdleLoop`]: a simulated idle-callback driver that runs one scheduler
//!   slice per tick.

#![no_std]

extern crate alloc;

mod deadline;
mod idle;
mod memory;

pub use deadline::{FixedDeadline, UnitDeadline};
pub use idle::IdleLoop;
pub use memory::{HostError, HostOp, MemoryHost, NodeId, OpKind};
