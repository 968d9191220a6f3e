// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fiber identity.

use core::fmt;

/// Sentinel value indicating "no fiber" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a fiber in a [`FiberTree`](super::FiberTree).
///
/// Contains the slot index and the number of the render pass that built the
/// tree, so a handle into the previous tree cannot be used against the
/// work-in-progress one by accident.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiberId {
    /// Slot index into the tree's arrays.
    pub(crate) idx: u32,
    /// Render pass that built the owning tree.
    pub(crate) pass: u64,
}

impl FiberId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the render pass that built the owning tree.
    #[inline]
    #[must_use]
    pub const fn pass(self) -> u64 {
        self.pass
    }
}

impl fmt::Debug for FiberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FiberId({}@pass{})", self.idx, self.pass)
    }
}
