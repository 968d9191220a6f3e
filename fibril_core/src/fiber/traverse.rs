// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{FiberId, INVALID};
use super::tree::FiberTree;

/// An iterator over the direct children of a fiber.
///
/// Created by [`FiberTree::children`].
#[derive(Debug)]
pub struct Children<'a, N> {
    tree: &'a FiberTree<N>,
    current: u32,
}

impl<'a, N> Children<'a, N> {
    pub(crate) fn new(tree: &'a FiberTree<N>, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl<N> Iterator for Children<'_, N> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.next_sibling[idx as usize];
        Some(FiberId {
            idx,
            pass: self.tree.pass(),
        })
    }
}

/// A depth-first pre-order iterator driven by [`FiberTree::next_unit`].
///
/// Created by [`FiberTree::traverse`]. Uses no stack and no visited set.
#[derive(Debug)]
pub struct Traverse<'a, N> {
    tree: &'a FiberTree<N>,
    next: Option<FiberId>,
}

impl<'a, N> Traverse<'a, N> {
    pub(crate) fn new(tree: &'a FiberTree<N>, start: Option<FiberId>) -> Self {
        Self { tree, next: start }
    }
}

impl<N> Iterator for Traverse<'_, N> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        let id = self.next?;
        self.next = self.tree.next_unit(id);
        Some(id)
    }
}
