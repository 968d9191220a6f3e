// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cooperative, time-sliced work loop.
//!
//! A render pass is processed one fiber (one *unit of work*) at a time. The
//! driving clock hands [`Root::work_loop`](crate::Root::work_loop) an
//! [`IdleDeadline`]; the loop performs units until the pass is finished or the
//! deadline says the slice is spent, then returns so the clock can schedule the
//! next slice. A unit is never split across slices, and a commit never yields.
//!
//! Each unit:
//!
//! 1. For a function component, calls its render function with a [`Hooks`]
//!    context bound to the fiber. Otherwise ensures the fiber owns a host node,
//!    creating and stamping a detached one if it does not.
//! 2. Reconciles the fiber's children.
//! 3. Advances to the next fiber in depth-first pre-order.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::time::Duration;

use crate::element::{Attribute, ElementKind};
use crate::error::Error;
use crate::fiber::{FiberId, FiberTree};
use crate::hooks::{Hooks, RenderRequest};
use crate::host::{HostAdapter, NodeKind};
use crate::reconcile::{ReconcileReport, reconcile_children};
use crate::trace::{PassReason, Tracer};

pub use crate::trace::SliceOutcome;

/// Reports how much time is left in the current idle slice.
///
/// Implemented by the platform's idle-callback deadline, and by deterministic
/// deadlines in tests.
pub trait IdleDeadline {
    /// Time remaining before the slice should be handed back.
    fn time_remaining(&self) -> Duration;
}

impl<D: IdleDeadline + ?Sized> IdleDeadline for &D {
    fn time_remaining(&self) -> Duration {
        (**self).time_remaining()
    }
}

/// A deadline that never runs out.
///
/// Used by [`Root::flush`](crate::Root::flush).
#[derive(Clone, Copy, Debug, Default)]
pub struct Unbounded;

impl IdleDeadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

/// Configuration for the work loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Yield once the deadline reports less than this much time remaining.
    pub yield_threshold: Duration,
    /// Yield after this many units in one slice, regardless of time.
    pub max_units_per_slice: Option<u32>,
}

impl SchedulerConfig {
    /// Configuration for an idle-callback clock: yield with less than 1 ms
    /// left, no unit cap.
    #[must_use]
    pub const fn idle_callback() -> Self {
        Self {
            yield_threshold: Duration::from_millis(1),
            max_units_per_slice: None,
        }
    }

    /// Configuration that ignores time and performs at most `units` units per
    /// slice. Useful for deterministic tests and for hosts without idle time.
    #[must_use]
    pub const fn budgeted(units: u32) -> Self {
        Self {
            yield_threshold: Duration::ZERO,
            max_units_per_slice: Some(units),
        }
    }

    /// Returns `true` if a slice that has performed `units` units should hand
    /// control back.
    #[must_use]
    pub fn should_yield(&self, units: u32, deadline: &dyn IdleDeadline) -> bool {
        if self.max_units_per_slice.is_some_and(|cap| units >= cap) {
            return true;
        }
        deadline.time_remaining() < self.yield_threshold
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::idle_callback()
    }
}

/// An uncommitted render pass.
#[derive(Debug)]
pub(crate) struct WorkInProgress<N> {
    pub(crate) tree: FiberTree<N>,
    pub(crate) next_unit: Option<FiberId>,
    /// Fibers of `current` to remove at commit.
    pub(crate) deletions: Vec<FiberId>,
    pub(crate) reason: PassReason,
    /// Whether the pass-begin event has been traced.
    pub(crate) announced: bool,
    pub(crate) units_done: u32,
    pub(crate) report: ReconcileReport,
}

impl<N: Clone> WorkInProgress<N> {
    pub(crate) fn new(tree: FiberTree<N>, reason: PassReason) -> Self {
        let root = tree.root();
        Self {
            tree,
            next_unit: Some(root),
            deletions: Vec::new(),
            reason,
            announced: false,
            units_done: 0,
            report: ReconcileReport::default(),
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.next_unit.is_none()
    }

    /// Processes the next fiber. Does nothing once the pass is complete.
    pub(crate) fn perform_unit_of_work<H>(
        &mut self,
        host: &mut H,
        current: Option<&FiberTree<N>>,
        request: &Rc<RenderRequest>,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), Error<H::Error>>
    where
        H: HostAdapter<Node = N>,
    {
        let Some(fiber) = self.next_unit else {
            return Ok(());
        };

        let component = match self.tree.kind(fiber) {
            Some(ElementKind::Component(component)) => Some(*component),
            _ => None,
        };
        let props = Rc::clone(self.tree.shared_props(fiber));

        let reconciled = if let Some(component) = component {
            let previous = match (self.tree.alternate(fiber), current) {
                (Some(alternate), Some(current)) => current.hooks(alternate),
                _ => &[],
            };
            let mut hooks = Hooks::new(fiber, previous, request);
            let children = component.render(&mut hooks, &props);
            self.tree.set_hooks(fiber, hooks.into_cells());
            reconcile_children(
                &mut self.tree,
                current,
                fiber,
                &children,
                &mut self.deletions,
            )
        } else {
            if self.tree.host_node(fiber).is_none() {
                let node = create_host_node(host, &self.tree, fiber)?;
                self.tree.set_host_node(fiber, node);
            }
            reconcile_children(
                &mut self.tree,
                current,
                fiber,
                props.children(),
                &mut self.deletions,
            )
        };
        let report = reconciled.map_err(Error::Inconsistent)?;

        self.report += report;
        self.units_done += 1;
        self.next_unit = self.tree.next_unit(fiber);

        #[cfg(feature = "trace-rich")]
        tracer.unit(&crate::trace::UnitEvent {
            pass: self.tree.pass(),
            fiber,
            kind: match (component, self.tree.kind(fiber)) {
                (Some(_), _) => crate::trace::UnitKind::Component,
                (None, None) => crate::trace::UnitKind::Root,
                (None, Some(_)) => crate::trace::UnitKind::Host,
            },
        });
        #[cfg(not(feature = "trace-rich"))]
        {
            _ = tracer;
        }

        Ok(())
    }
}

/// Creates a detached host node for `fiber` and stamps its attributes and
/// event subscriptions.
fn create_host_node<H: HostAdapter>(
    host: &mut H,
    tree: &FiberTree<H::Node>,
    fiber: FiberId,
) -> Result<H::Node, Error<H::Error>> {
    let kind = match tree.kind(fiber) {
        Some(ElementKind::Host(tag)) => NodeKind::Element(tag.as_ref()),
        Some(ElementKind::Text) => NodeKind::Text,
        Some(ElementKind::Component(_)) => {
            return Err(Error::Inconsistent("component fiber reached host node creation"));
        }
        None => return Err(Error::Inconsistent("root fiber has no container node")),
    };

    let node = host.create_node(kind)?;
    for (name, value) in tree.props(fiber).attributes() {
        match Attribute::classify(name, value) {
            Attribute::Plain { name, value } => host.set_attribute(&node, name, value)?,
            Attribute::Event { event, handler } => {
                host.add_event_subscription(&node, &event.to_ascii_lowercase(), handler)?;
            }
        }
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::element::{Element, EventHandler, Props};
    use crate::testing::RecordingHost;

    struct Remaining(Duration);

    impl IdleDeadline for Remaining {
        fn time_remaining(&self) -> Duration {
            self.0
        }
    }

    fn seeded(element: Element) -> WorkInProgress<u32> {
        let props = Props::with_children(vec![element]);
        WorkInProgress::new(
            FiberTree::new(1, 0, Rc::new(props), None),
            PassReason::Mount,
        )
    }

    #[test]
    fn idle_callback_yields_below_one_millisecond() {
        let config = SchedulerConfig::default();
        assert!(!config.should_yield(100, &Remaining(Duration::from_millis(5))));
        assert!(!config.should_yield(100, &Remaining(Duration::from_millis(1))));
        assert!(config.should_yield(1, &Remaining(Duration::from_micros(999))));
        assert!(!config.should_yield(u32::MAX, &Unbounded));
    }

    #[test]
    fn budgeted_yields_on_unit_count() {
        let config = SchedulerConfig::budgeted(3);
        assert!(!config.should_yield(2, &Remaining(Duration::ZERO)));
        assert!(config.should_yield(3, &Unbounded));
    }

    #[test]
    fn units_walk_the_tree_and_stamp_new_nodes() {
        let clicked = EventHandler::new(|| {});
        let mut wip = seeded(
            Element::host("div")
                .attr("id", "foo")
                .on("Click", clicked)
                .text_child("hi"),
        );
        let mut host = RecordingHost::default();
        let request = Rc::new(RenderRequest::default());
        let mut tracer = Tracer::none();

        let mut units = 0;
        while !wip.is_complete() {
            wip.perform_unit_of_work(&mut host, None, &request, &mut tracer)
                .expect("unit succeeds");
            units += 1;
        }

        assert_eq!(units, 3, "root, div, text");
        assert_eq!(wip.units_done, 3);
        assert_eq!(wip.report.placements, 2);
        assert_eq!(
            host.ops(),
            &[
                "create div #1",
                "set #1 id=foo",
                "listen #1 click",
                "create text #2",
                "set #2 nodeValue=hi",
            ]
        );
    }

    #[test]
    fn host_failure_during_creation_surfaces() {
        let mut wip = seeded(Element::host("div"));
        let mut host = RecordingHost::default();
        host.fail_on("create");
        let request = Rc::new(RenderRequest::default());
        let mut tracer = Tracer::none();

        wip.perform_unit_of_work(&mut host, None, &request, &mut tracer)
            .expect("root owns the container");
        let err = wip
            .perform_unit_of_work(&mut host, None, &request, &mut tracer)
            .expect_err("creation fails");
        assert!(matches!(err, Error::Host(_)), "got {err:?}");
    }
}
