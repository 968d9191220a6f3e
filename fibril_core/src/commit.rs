// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Applying a finished render pass to the host.
//!
//! The commit runs in one uninterrupted pass between
//! [`HostAdapter::begin_commit`] and [`HostAdapter::end_commit`]:
//!
//! 1. Pending deletions are removed from their nearest host-bearing ancestor.
//!    A deleted component owns no node, so its descendants' top-most host
//!    nodes are removed instead.
//! 2. The new tree is walked in pre-order. `Placement` fibers with a host node
//!    are inserted before the next mounted host sibling (or appended);
//!    `Update` fibers get their props diffed against the alternate.
//!
//! Promotion to `current` is the caller's job and only happens if every host
//! call succeeded.

use crate::element::{Attribute, Props};
use crate::error::Error;
use crate::fiber::{EffectTag, FiberId, FiberTree};
use crate::host::HostAdapter;
use crate::trace::Tracer;

/// Counts of effects applied by one commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct CommitCounts {
    pub(crate) placements: u32,
    pub(crate) updates: u32,
    pub(crate) deletions: u32,
}

/// Applies every effect of `wip` to `host`.
///
/// `deletions` are handles into `current`. `end_commit` is called whether or
/// not the commit succeeds.
pub(crate) fn commit_root<H: HostAdapter>(
    host: &mut H,
    wip: &FiberTree<H::Node>,
    current: Option<&FiberTree<H::Node>>,
    deletions: &[FiberId],
    tracer: &mut Tracer<'_>,
) -> Result<CommitCounts, Error<H::Error>> {
    host.begin_commit();
    let result = apply_effects(host, wip, current, deletions, tracer);
    host.end_commit();
    result
}

fn apply_effects<H: HostAdapter>(
    host: &mut H,
    wip: &FiberTree<H::Node>,
    current: Option<&FiberTree<H::Node>>,
    deletions: &[FiberId],
    tracer: &mut Tracer<'_>,
) -> Result<CommitCounts, Error<H::Error>> {
    let mut counts = CommitCounts::default();

    if !deletions.is_empty() {
        let Some(current) = current else {
            return Err(Error::Inconsistent("deletions queued without a current tree"));
        };
        for &fiber in deletions {
            let parent = current
                .host_ancestor(fiber)
                .and_then(|ancestor| current.host_node(ancestor))
                .ok_or(Error::Inconsistent("deleted fiber has no host ancestor"))?;
            remove_host_nodes(host, current, fiber, parent)?;
            counts.deletions += 1;
            trace_effect(tracer, wip.pass(), fiber, EffectTag::Deletion);
        }
    }

    for fiber in wip.traverse() {
        match wip.effect_tag(fiber) {
            EffectTag::Placement => {
                counts.placements += 1;
                if let Some(node) = wip.host_node(fiber) {
                    let parent = wip
                        .host_ancestor(fiber)
                        .and_then(|ancestor| wip.host_node(ancestor))
                        .ok_or(Error::Inconsistent("placed fiber has no host ancestor"))?;
                    let before = host_sibling(wip, fiber);
                    host.insert_child(parent, node, before)?;
                }
            }
            EffectTag::Update => {
                counts.updates += 1;
                if let Some(node) = wip.host_node(fiber) {
                    let previous = match (wip.alternate(fiber), current) {
                        (Some(alternate), Some(current)) => current.props(alternate),
                        _ => return Err(Error::Inconsistent("updated fiber has no alternate")),
                    };
                    update_props(host, node, previous, wip.props(fiber))?;
                }
            }
            EffectTag::None | EffectTag::Deletion => continue,
        }
        trace_effect(tracer, wip.pass(), fiber, wip.effect_tag(fiber));
    }

    Ok(counts)
}

/// Removes the host nodes owned by `fiber` (its own, or the top-most ones of
/// its subtree when it is a component) from `parent`.
fn remove_host_nodes<H: HostAdapter>(
    host: &mut H,
    tree: &FiberTree<H::Node>,
    fiber: FiberId,
    parent: &H::Node,
) -> Result<(), Error<H::Error>> {
    if let Some(node) = tree.host_node(fiber) {
        host.remove_child(parent, node)?;
        return Ok(());
    }
    for child in tree.children(fiber) {
        remove_host_nodes(host, tree, child, parent)?;
    }
    Ok(())
}

/// Finds the host node a placed fiber must be inserted before: the first
/// already-mounted host node after it in its host parent's child order.
fn host_sibling<N>(tree: &FiberTree<N>, fiber: FiberId) -> Option<&N> {
    let mut cursor = fiber;
    loop {
        let mut sibling = tree.next_sibling(cursor);
        while let Some(candidate) = sibling {
            if let Some(node) = first_mounted_host(tree, candidate) {
                return Some(node);
            }
            sibling = tree.next_sibling(candidate);
        }
        // Past the last sibling: keep looking after the parent only if the
        // parent is a component, which shares our host parent.
        let parent = tree.parent(cursor)?;
        if tree.host_node(parent).is_some() {
            return None;
        }
        cursor = parent;
    }
}

/// Returns the top-most mounted host node in `fiber`'s subtree, in order.
///
/// Placed fibers are skipped: they are inserted later in the same walk.
fn first_mounted_host<N>(tree: &FiberTree<N>, fiber: FiberId) -> Option<&N> {
    if tree.effect_tag(fiber) == EffectTag::Placement {
        return None;
    }
    if let Some(node) = tree.host_node(fiber) {
        return Some(node);
    }
    tree.children(fiber)
        .find_map(|child| first_mounted_host(tree, child))
}

/// Diffs `previous` against `next` and applies the difference to `node`.
///
/// Stale subscriptions go first, then removed attributes, then changed
/// attributes, then new subscriptions.
fn update_props<H: HostAdapter>(
    host: &mut H,
    node: &H::Node,
    previous: &Props,
    next: &Props,
) -> Result<(), Error<H::Error>> {
    for (name, value) in previous.attributes() {
        if let Attribute::Event { event, handler } = Attribute::classify(name, value)
            && next.get(name) != Some(value)
        {
            host.remove_event_subscription(node, &event.to_ascii_lowercase(), handler)?;
        }
    }

    for (name, value) in previous.attributes() {
        if matches!(Attribute::classify(name, value), Attribute::Plain { .. })
            && !next.get(name).is_some_and(|value| {
                matches!(Attribute::classify(name, value), Attribute::Plain { .. })
            })
        {
            host.remove_attribute(node, name)?;
        }
    }

    for (name, value) in next.attributes() {
        if let Attribute::Plain { name, value } = Attribute::classify(name, value)
            && previous.get(name) != Some(value)
        {
            host.set_attribute(node, name, value)?;
        }
    }

    for (name, value) in next.attributes() {
        if let Attribute::Event { event, handler } = Attribute::classify(name, value)
            && previous.get(name) != Some(value)
        {
            host.add_event_subscription(node, &event.to_ascii_lowercase(), handler)?;
        }
    }

    Ok(())
}

fn trace_effect(tracer: &mut Tracer<'_>, pass: u64, fiber: FiberId, tag: EffectTag) {
    #[cfg(feature = "trace-rich")]
    tracer.effect(&crate::trace::EffectEvent { pass, fiber, tag });
    #[cfg(not(feature = "trace-rich"))]
    {
        _ = (tracer, pass, fiber, tag);
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::element::{Element, EventHandler};
    use crate::hooks::{Hooks, RenderRequest};
    use crate::scheduler::WorkInProgress;
    use crate::testing::RecordingHost;
    use crate::trace::PassReason;

    fn wrapper(_: &mut Hooks<'_>, props: &Props) -> Vec<Element> {
        props.children().to_vec()
    }

    /// Renders `element` against `current` and returns the finished pass.
    fn render(
        host: &mut RecordingHost,
        current: Option<&FiberTree<u32>>,
        element: Element,
    ) -> WorkInProgress<u32> {
        let pass = current.map_or(1, |c| c.pass() + 1);
        let tree = FiberTree::new(
            pass,
            0,
            Rc::new(Props::with_children(vec![element])),
            current.map(FiberTree::root),
        );
        let mut wip = WorkInProgress::new(tree, PassReason::Mount);
        let request = Rc::new(RenderRequest::default());
        while !wip.is_complete() {
            wip.perform_unit_of_work(host, current, &request, &mut Tracer::none())
                .expect("unit succeeds");
        }
        wip
    }

    fn commit(
        host: &mut RecordingHost,
        wip: &WorkInProgress<u32>,
        current: Option<&FiberTree<u32>>,
    ) -> CommitCounts {
        host.clear();
        commit_root(host, &wip.tree, current, &wip.deletions, &mut Tracer::none())
            .expect("commit succeeds")
    }

    fn list(items: &[&'static str]) -> Element {
        Element::host("ul").children(items.iter().map(|&tag| Element::host(tag)))
    }

    #[test]
    fn mount_inserts_in_pre_order() {
        let mut host = RecordingHost::default();
        let wip = render(&mut host, None, list(&["a", "b"]));
        let counts = commit(&mut host, &wip, None);

        assert_eq!(counts.placements, 3);
        assert_eq!(
            host.ops(),
            &[
                "begin",
                "insert #1 into #0",
                "insert #2 into #1",
                "insert #3 into #1",
                "end",
            ]
        );
    }

    #[test]
    fn middle_placement_goes_before_next_mounted_sibling() {
        let mut host = RecordingHost::default();
        let first = render(&mut host, None, list(&["a", "b", "c"]));
        commit(&mut host, &first, None);

        // Position 1 changes kind: b is deleted, x is placed before c.
        let second = render(&mut host, Some(&first.tree), list(&["a", "x", "c"]));
        let counts = commit(&mut host, &second, Some(&first.tree));

        assert_eq!(
            counts,
            CommitCounts {
                placements: 1,
                updates: 3,
                deletions: 1,
            }
        );
        assert_eq!(
            host.ops(),
            &[
                "begin",
                "remove #3 from #1",
                "insert #5 into #1 before #4",
                "end",
            ]
        );
    }

    #[test]
    fn placement_looks_through_component_siblings() {
        let mut host = RecordingHost::default();
        let tree = |first: &'static str| {
            Element::host("div")
                .child(Element::host(first))
                .child(Element::component("Wrapper", wrapper).child(Element::host("b")))
        };
        let first = render(&mut host, None, tree("a"));
        commit(&mut host, &first, None);

        let second = render(&mut host, Some(&first.tree), tree("x"));
        commit(&mut host, &second, Some(&first.tree));

        // `b` (#3) is the component's host child and the anchor for `x`.
        assert_eq!(
            host.ops(),
            &[
                "begin",
                "remove #2 from #1",
                "insert #4 into #1 before #3",
                "end",
            ]
        );
    }

    #[test]
    fn deleting_a_component_removes_its_host_children() {
        let mut host = RecordingHost::default();
        let with = Element::host("div").child(
            Element::component("Wrapper", wrapper)
                .child(Element::host("a"))
                .child(Element::host("b")),
        );
        let first = render(&mut host, None, with);
        commit(&mut host, &first, None);

        let second = render(&mut host, Some(&first.tree), Element::host("div"));
        commit(&mut host, &second, Some(&first.tree));

        assert_eq!(
            host.ops(),
            &["begin", "remove #2 from #1", "remove #3 from #1", "end"]
        );
    }

    #[test]
    fn deleting_an_empty_component_is_a_no_op() {
        let mut host = RecordingHost::default();
        let first = render(
            &mut host,
            None,
            Element::host("div").child(Element::component("Wrapper", wrapper)),
        );
        commit(&mut host, &first, None);

        let second = render(&mut host, Some(&first.tree), Element::host("div"));
        let counts = commit(&mut host, &second, Some(&first.tree));

        assert_eq!(counts.deletions, 1);
        assert_eq!(host.ops(), &["begin", "end"]);
    }

    #[test]
    fn update_diffs_attributes_and_handlers() {
        let mut host = RecordingHost::default();
        let kept = EventHandler::new(|| {});
        let first = render(
            &mut host,
            None,
            Element::host("a")
                .attr("href", "/x")
                .attr("title", "t")
                .on("Click", kept.clone())
                .on("Focus", EventHandler::new(|| {})),
        );
        commit(&mut host, &first, None);

        let second = render(
            &mut host,
            Some(&first.tree),
            Element::host("a")
                .attr("href", "/y")
                .on("Click", kept)
                .on("Focus", EventHandler::new(|| {})),
        );
        commit(&mut host, &second, Some(&first.tree));

        assert_eq!(
            host.ops(),
            &[
                "begin",
                "unlisten #1 focus",
                "unset #1 title",
                "set #1 href=/y",
                "listen #1 focus",
                "end",
            ]
        );
    }

    #[test]
    fn failure_still_ends_the_commit() {
        let mut host = RecordingHost::default();
        let wip = render(&mut host, None, Element::host("div"));
        host.fail_on("insert");
        let result = commit_root(&mut host, &wip.tree, None, &wip.deletions, &mut Tracer::none());

        assert!(matches!(result, Err(Error::Host(_))), "got {result:?}");
        assert!(!host.in_commit());
        assert_eq!(host.ops().last().map(String::as_str), Some("end"));
    }
}
