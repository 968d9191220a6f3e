// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Positional child reconciliation.
//!
//! Given a work-in-progress fiber whose desired child elements are known, the
//! reconciler walks those elements and the fiber's previous children (the
//! children of its alternate in `current`) in lockstep by index:
//!
//! | old fiber | new element | same kind | result                               |
//! |-----------|-------------|-----------|--------------------------------------|
//! | yes       | yes         | yes       | `Update`, reusing the old host node  |
//! | any       | yes         | no        | `Placement`, no host node yet        |
//! | yes       | any         | no        | old fiber queued for deletion        |
//!
//! Children are matched purely by position. There is no key attribute, so a
//! reordered list is reported as updates of whatever now sits at each index.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::ops::AddAssign;

use crate::element::Element;
use crate::fiber::{EffectTag, FiberId, FiberInit, FiberTree};

/// Counts of effects decided while reconciling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// New fibers tagged `Placement`.
    pub placements: u32,
    /// New fibers tagged `Update`.
    pub updates: u32,
    /// Old fibers queued for deletion.
    pub deletions: u32,
}

impl ReconcileReport {
    /// Returns `true` if nothing was placed, updated, or deleted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.placements == 0 && self.updates == 0 && self.deletions == 0
    }
}

impl AddAssign for ReconcileReport {
    fn add_assign(&mut self, rhs: Self) {
        self.placements += rhs.placements;
        self.updates += rhs.updates;
        self.deletions += rhs.deletions;
    }
}

/// Builds the child chain of `parent` in `wip` from `elements`.
///
/// Old fibers that are replaced or no longer present are appended to
/// `deletions` as handles into `current`.
pub(crate) fn reconcile_children<N: Clone>(
    wip: &mut FiberTree<N>,
    current: Option<&FiberTree<N>>,
    parent: FiberId,
    elements: &[Element],
    deletions: &mut Vec<FiberId>,
) -> Result<ReconcileReport, &'static str> {
    let mut report = ReconcileReport::default();

    let mut old = match (wip.alternate(parent), current) {
        (Some(alternate), Some(current)) => current.first_child(alternate),
        (Some(_), None) => return Err("alternate set without a current tree"),
        (None, _) => None,
    };
    let mut prev: Option<FiberId> = None;
    let mut index = 0;

    while index < elements.len() || old.is_some() {
        let element = elements.get(index);
        let old_fiber = old.zip(current);

        let same_kind = match (element, old_fiber) {
            (Some(element), Some((fiber, tree))) => tree.kind(fiber) == Some(element.kind()),
            (None, None) => return Err("reconciler reached a position with no work"),
            _ => false,
        };

        let init = match (element, old_fiber) {
            (Some(element), Some((fiber, tree))) if same_kind => {
                report.updates += 1;
                Some(FiberInit {
                    kind: element.kind().clone(),
                    props: Rc::clone(element.shared_props()),
                    host: tree.host_node(fiber).cloned(),
                    alternate: Some(fiber),
                    effect: EffectTag::Update,
                })
            }
            (Some(element), _) => {
                report.placements += 1;
                Some(FiberInit {
                    kind: element.kind().clone(),
                    props: Rc::clone(element.shared_props()),
                    host: None,
                    alternate: None,
                    effect: EffectTag::Placement,
                })
            }
            (None, _) => None,
        };

        if let Some((fiber, tree)) = old_fiber {
            if !same_kind {
                report.deletions += 1;
                deletions.push(fiber);
            }
            old = tree.next_sibling(fiber);
        }

        if let Some(init) = init {
            prev = Some(wip.push_child(parent, prev, init));
        }
        index += 1;
    }

    Ok(report)
}
