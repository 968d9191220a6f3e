// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fiber graph data model.
//!
//! A *fiber* is the mutable work/output node for one rendered element
//! occurrence. Each fiber has:
//!
//! - An identity ([`FiberId`]): a handle scoped to the render pass that built
//!   its tree, so a handle from one tree is rejected by another.
//! - Topology: parent, first-child, and next-sibling links forming an ordered
//!   tree. Depth-first traversal needs no visited set.
//! - Its element's kind and props, an optional host node (absent for function
//!   components), an [`EffectTag`], and hook cells.
//! - An `alternate`: the fiber at the same position in the previously
//!   committed tree, if there was one.
//!
//! Every render pass builds a fresh [`FiberTree`]; nothing is reused by
//! mutating the previous tree in place. Fibers are stored in struct-of-arrays
//! layout with index-based handles.

mod id;
mod traverse;
mod tree;

pub use id::{FiberId, INVALID};
pub use traverse::{Children, Traverse};
pub use tree::FiberTree;
pub(crate) use tree::FiberInit;

/// The mutation decided for a fiber during reconciliation and applied once at
/// commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EffectTag {
    /// No mutation (the root fiber).
    #[default]
    None,
    /// A new fiber: its host node (if any) is inserted at commit.
    Placement,
    /// A fiber reusing the previous render's host node: its attributes are
    /// diffed against the alternate at commit.
    Update,
    /// A fiber of the previous tree whose host nodes are removed at commit.
    Deletion,
}
