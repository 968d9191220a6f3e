// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays fiber storage with topology and per-fiber state.

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;

use crate::element::{ElementKind, Props};
use crate::hooks::HookCell;

use super::EffectTag;
use super::id::{FiberId, INVALID};
use super::traverse::{Children, Traverse};

/// Everything a new fiber starts with, as decided by the reconciler.
#[derive(Debug)]
pub(crate) struct FiberInit<N> {
    pub(crate) kind: ElementKind,
    pub(crate) props: Rc<Props>,
    pub(crate) host: Option<N>,
    pub(crate) alternate: Option<FiberId>,
    pub(crate) effect: EffectTag,
}

/// One render generation of the fiber graph.
///
/// Slot 0 is always the root fiber: it mirrors the mounted container, owns
/// the container's host node, and has no kind of its own. Fibers are only
/// ever appended; a tree is built once by a render pass and becomes read-only
/// when it is committed.
///
/// `N` is the host adapter's node handle type.
#[derive(Debug)]
pub struct FiberTree<N> {
    pass: u64,

    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,

    // -- Element data --
    pub(crate) kind: Vec<Option<ElementKind>>,
    pub(crate) props: Vec<Rc<Props>>,

    // -- Output --
    pub(crate) host: Vec<Option<N>>,
    pub(crate) effect: Vec<EffectTag>,

    // -- Cross-render state --
    pub(crate) alternate: Vec<Option<FiberId>>,
    pub(crate) hooks: Vec<Vec<HookCell>>,
}

impl<N> FiberTree<N> {
    /// Creates a tree holding only the root fiber.
    pub(crate) fn new(
        pass: u64,
        container: N,
        props: Rc<Props>,
        alternate: Option<FiberId>,
    ) -> Self {
        Self {
            pass,
            parent: vec![INVALID],
            first_child: vec![INVALID],
            next_sibling: vec![INVALID],
            kind: vec![None],
            props: vec![props],
            host: vec![Some(container)],
            effect: vec![EffectTag::None],
            alternate: vec![alternate],
            hooks: vec![Vec::new()],
        }
    }

    // -- Construction (render phase) --

    /// Appends a fiber as a child of `parent`, linked after `prev` (or as the
    /// first child when `prev` is `None`).
    ///
    /// # Panics
    ///
    /// Panics if a handle is foreign, or if `prev` is not the current last
    /// child of `parent`.
    pub(crate) fn push_child(
        &mut self,
        parent: FiberId,
        prev: Option<FiberId>,
        init: FiberInit<N>,
    ) -> FiberId {
        self.validate(parent);
        let idx = u32::try_from(self.parent.len()).unwrap_or(INVALID);
        assert!(idx != INVALID, "fiber tree is full");

        self.parent.push(parent.idx);
        self.first_child.push(INVALID);
        self.next_sibling.push(INVALID);
        self.kind.push(Some(init.kind));
        self.props.push(init.props);
        self.host.push(init.host);
        self.effect.push(init.effect);
        self.alternate.push(init.alternate);
        self.hooks.push(Vec::new());

        match prev {
            None => {
                assert!(
                    self.first_child[parent.idx as usize] == INVALID,
                    "parent already has a first child"
                );
                self.first_child[parent.idx as usize] = idx;
            }
            Some(prev) => {
                self.validate(prev);
                assert!(
                    self.parent[prev.idx as usize] == parent.idx
                        && self.next_sibling[prev.idx as usize] == INVALID,
                    "prev must be the last child of parent"
                );
                self.next_sibling[prev.idx as usize] = idx;
            }
        }

        self.id(idx)
    }

    /// Sets the host node of a fiber.
    pub(crate) fn set_host_node(&mut self, id: FiberId, node: N) {
        self.validate(id);
        self.host[id.idx as usize] = Some(node);
    }

    /// Replaces the hook cells of a fiber.
    pub(crate) fn set_hooks(&mut self, id: FiberId, cells: Vec<HookCell>) {
        self.validate(id);
        self.hooks[id.idx as usize] = cells;
    }

    /// Returns the hook cells of a fiber.
    pub(crate) fn hooks(&self, id: FiberId) -> &[HookCell] {
        self.validate(id);
        &self.hooks[id.idx as usize]
    }

    // -- Identity --

    /// Returns the render pass that built this tree.
    #[must_use]
    pub const fn pass(&self) -> u64 {
        self.pass
    }

    /// Returns the number of fibers, including the root.
    #[must_use]
    pub fn fiber_count(&self) -> usize {
        self.parent.len()
    }

    /// Returns the root fiber.
    #[must_use]
    pub const fn root(&self) -> FiberId {
        self.id(0)
    }

    /// Returns whether `id` is a handle into this tree.
    #[must_use]
    pub fn contains(&self, id: FiberId) -> bool {
        id.pass == self.pass && (id.idx as usize) < self.parent.len()
    }

    // -- Topology --

    /// Returns the parent of a fiber, if any.
    #[must_use]
    pub fn parent(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        self.link(self.parent[id.idx as usize])
    }

    /// Returns the first child of a fiber, if any.
    #[must_use]
    pub fn first_child(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        self.link(self.first_child[id.idx as usize])
    }

    /// Returns the next sibling of a fiber, if any.
    #[must_use]
    pub fn next_sibling(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        self.link(self.next_sibling[id.idx as usize])
    }

    /// Returns an iterator over the direct children of a fiber.
    #[must_use]
    pub fn children(&self, id: FiberId) -> Children<'_, N> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns a depth-first pre-order iterator over every fiber, starting at
    /// the root.
    #[must_use]
    pub fn traverse(&self) -> Traverse<'_, N> {
        Traverse::new(self, Some(self.root()))
    }

    /// Returns the fiber processed after `id` in a whole-tree depth-first
    /// pre-order walk.
    ///
    /// Prefers the first child; otherwise walks up through parents until a
    /// next sibling is found. Returns `None` once the walk is exhausted.
    #[must_use]
    pub fn next_unit(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        let child = self.first_child[id.idx as usize];
        if child != INVALID {
            return Some(self.id(child));
        }
        let mut idx = id.idx;
        while idx != INVALID {
            let sibling = self.next_sibling[idx as usize];
            if sibling != INVALID {
                return Some(self.id(sibling));
            }
            idx = self.parent[idx as usize];
        }
        None
    }

    /// Returns the nearest strict ancestor of `id` that owns a host node.
    #[must_use]
    pub fn host_ancestor(&self, id: FiberId) -> Option<FiberId> {
        let mut current = self.parent(id);
        while let Some(fiber) = current {
            if self.host[fiber.idx as usize].is_some() {
                return Some(fiber);
            }
            current = self.parent(fiber);
        }
        None
    }

    // -- Per-fiber data --

    /// Returns the element kind of a fiber, or `None` for the root.
    #[must_use]
    pub fn kind(&self, id: FiberId) -> Option<&ElementKind> {
        self.validate(id);
        self.kind[id.idx as usize].as_ref()
    }

    /// Returns whether a fiber is a function component.
    #[must_use]
    pub fn is_component(&self, id: FiberId) -> bool {
        self.kind(id).is_some_and(ElementKind::is_component)
    }

    /// Returns the props of a fiber.
    #[must_use]
    pub fn props(&self, id: FiberId) -> &Props {
        self.shared_props(id)
    }

    pub(crate) fn shared_props(&self, id: FiberId) -> &Rc<Props> {
        self.validate(id);
        &self.props[id.idx as usize]
    }

    /// Returns the host node of a fiber, if it owns one.
    #[must_use]
    pub fn host_node(&self, id: FiberId) -> Option<&N> {
        self.validate(id);
        self.host[id.idx as usize].as_ref()
    }

    /// Returns the effect tag of a fiber.
    #[must_use]
    pub fn effect_tag(&self, id: FiberId) -> EffectTag {
        self.validate(id);
        self.effect[id.idx as usize]
    }

    /// Returns the fiber at the same position in the previous committed tree.
    ///
    /// The handle is only meaningful against that tree (the root's `current`
    /// while this tree is in progress).
    #[must_use]
    pub fn alternate(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        self.alternate[id.idx as usize]
    }

    /// Returns the number of hook cells recorded for a fiber.
    #[must_use]
    pub fn hook_count(&self, id: FiberId) -> usize {
        self.hooks(id).len()
    }

    // -- Internal helpers --

    const fn id(&self, idx: u32) -> FiberId {
        FiberId {
            idx,
            pass: self.pass,
        }
    }

    fn link(&self, idx: u32) -> Option<FiberId> {
        (idx != INVALID).then(|| self.id(idx))
    }

    /// Panics if the handle belongs to another tree.
    fn validate(&self, id: FiberId) {
        assert!(
            self.contains(id),
            "foreign FiberId: {id:?} (tree pass {}, {} fibers)",
            self.pass,
            self.parent.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;

    fn init(tag: &'static str, effect: EffectTag) -> FiberInit<u32> {
        let el = Element::host(tag);
        FiberInit {
            kind: el.kind().clone(),
            props: Rc::clone(el.shared_props()),
            host: None,
            alternate: None,
            effect,
        }
    }

    /// root > [a > [c, d], b > [e]]
    fn sample() -> (FiberTree<u32>, Vec<FiberId>) {
        let mut tree = FiberTree::new(1, 0, Rc::new(Props::new()), None);
        let root = tree.root();
        let a = tree.push_child(root, None, init("a", EffectTag::Placement));
        let b = tree.push_child(root, Some(a), init("b", EffectTag::Placement));
        let c = tree.push_child(a, None, init("c", EffectTag::Placement));
        let d = tree.push_child(a, Some(c), init("d", EffectTag::Placement));
        let e = tree.push_child(b, None, init("e", EffectTag::Placement));
        (tree, vec![root, a, c, d, b, e])
    }

    #[test]
    fn next_unit_visits_every_fiber_once_in_pre_order() {
        let (tree, expected) = sample();
        let mut visited = Vec::new();
        let mut unit = Some(tree.root());
        while let Some(id) = unit {
            visited.push(id);
            unit = tree.next_unit(id);
        }
        assert_eq!(visited, expected);
        assert_eq!(visited.len(), tree.fiber_count());
    }

    #[test]
    fn traverse_matches_next_unit() {
        let (tree, expected) = sample();
        let visited: Vec<_> = tree.traverse().collect();
        assert_eq!(visited, expected);
    }

    #[test]
    fn single_root_traversal_terminates() {
        let tree = FiberTree::new(3, 7_u32, Rc::new(Props::new()), None);
        assert_eq!(tree.next_unit(tree.root()), None);
        assert_eq!(tree.traverse().count(), 1);
    }

    #[test]
    fn children_in_order() {
        let (tree, ids) = sample();
        let kids: Vec<_> = tree.children(ids[1]).collect();
        assert_eq!(kids, vec![ids[2], ids[3]]);
        assert_eq!(tree.parent(ids[3]), Some(ids[1]));
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn host_ancestor_skips_fibers_without_nodes() {
        let (mut tree, ids) = sample();
        // Only the root (container) and `a` own host nodes.
        tree.set_host_node(ids[1], 10);
        assert_eq!(tree.host_ancestor(ids[2]), Some(ids[1]));
        assert_eq!(tree.host_ancestor(ids[5]), Some(tree.root()));
        assert_eq!(tree.host_ancestor(tree.root()), None);
    }

    #[test]
    #[should_panic(expected = "foreign FiberId")]
    fn handle_from_other_pass_panics() {
        let (tree, _) = sample();
        let other = FiberTree::new(2, 0_u32, Rc::new(Props::new()), None);
        let _ = tree.kind(other.root());
    }

    #[test]
    #[should_panic(expected = "prev must be the last child of parent")]
    fn linking_after_non_last_sibling_panics() {
        let (mut tree, ids) = sample();
        let _ = tree.push_child(ids[1], Some(ids[2]), init("x", EffectTag::Placement));
    }
}
