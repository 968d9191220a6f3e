// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory host tree.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use fibril_core::element::TEXT_VALUE;
use fibril_core::{EventHandler, HostAdapter, NodeKind, PropValue};

/// A node in a [`MemoryHost`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// The kind of host operation, for failure injection and error reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// [`HostAdapter::create_node`].
    Create,
    /// [`HostAdapter::set_attribute`].
    SetAttribute,
    /// [`HostAdapter::remove_attribute`].
    RemoveAttribute,
    /// [`HostAdapter::add_event_subscription`].
    Subscribe,
    /// [`HostAdapter::remove_event_subscription`].
    Unsubscribe,
    /// [`HostAdapter::insert_child`].
    Insert,
    /// [`HostAdapter::remove_child`].
    Remove,
}

/// One logged host operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostOp {
    /// A node was created.
    Create {
        /// The new node.
        node: NodeId,
        /// Tag name, or `#text`.
        kind: String,
    },
    /// An attribute was assigned.
    SetAttribute {
        /// Target node.
        node: NodeId,
        /// Attribute name.
        name: String,
        /// Display form of the value.
        value: String,
    },
    /// An attribute was removed.
    RemoveAttribute {
        /// Target node.
        node: NodeId,
        /// Attribute name.
        name: String,
    },
    /// A handler was subscribed.
    Subscribe {
        /// Target node.
        node: NodeId,
        /// Lowercase event type.
        event: String,
    },
    /// A handler was unsubscribed.
    Unsubscribe {
        /// Target node.
        node: NodeId,
        /// Lowercase event type.
        event: String,
    },
    /// A child was inserted.
    Insert {
        /// New parent.
        parent: NodeId,
        /// Inserted node.
        child: NodeId,
        /// Anchor it was inserted before, if any.
        before: Option<NodeId>,
    },
    /// A child was removed.
    Remove {
        /// Former parent.
        parent: NodeId,
        /// Removed node.
        child: NodeId,
    },
    /// A commit started.
    BeginCommit,
    /// A commit ended.
    EndCommit,
}

impl HostOp {
    /// Returns `true` for operations that change the host tree.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        !matches!(self, Self::Create { .. } | Self::BeginCommit | Self::EndCommit)
    }
}

/// A failed [`MemoryHost`] operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostError {
    /// The operation that failed.
    pub op: OpKind,
    /// Why it failed.
    pub reason: &'static str,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} failed: {}", self.op, self.reason)
    }
}

impl core::error::Error for HostError {}

#[derive(Debug)]
enum Kind {
    Element(String),
    Text,
}

#[derive(Debug)]
struct Node {
    kind: Kind,
    attributes: BTreeMap<String, PropValue>,
    listeners: Vec<(String, EventHandler)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            attributes: BTreeMap::new(),
            listeners: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// An in-memory host tree.
///
/// Node `0` is the container. Insertion follows DOM semantics: inserting a
/// node that already has a parent moves it. Every successful call is logged
/// in [`ops`](Self::ops); mutations of nodes attached to the container made
/// outside a commit bracket are counted as
/// [`stray_mutations`](Self::stray_mutations).
#[derive(Debug)]
pub struct MemoryHost {
    nodes: Vec<Node>,
    ops: Vec<HostOp>,
    fail_next: Option<OpKind>,
    in_commit: bool,
    commits: u32,
    stray_mutations: u32,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// Creates a host holding only the container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: alloc::vec![Node::new(Kind::Element("#root".to_string()))],
            ops: Vec::new(),
            fail_next: None,
            in_commit: false,
            commits: 0,
            stray_mutations: 0,
        }
    }

    /// Returns the container node.
    #[must_use]
    pub const fn container(&self) -> NodeId {
        NodeId(0)
    }

    // -- Inspection --

    /// Returns the operation log.
    #[must_use]
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    /// Returns and clears the operation log.
    pub fn take_ops(&mut self) -> Vec<HostOp> {
        core::mem::take(&mut self.ops)
    }

    /// Returns `true` between `begin_commit` and `end_commit`.
    #[must_use]
    pub fn in_commit(&self) -> bool {
        self.in_commit
    }

    /// Returns the number of finished commits.
    #[must_use]
    pub fn commit_count(&self) -> u32 {
        self.commits
    }

    /// Returns the number of visible mutations made outside a commit.
    #[must_use]
    pub fn stray_mutations(&self) -> u32 {
        self.stray_mutations
    }

    /// Returns the children of `node`.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        match self.nodes.get(node.0 as usize) {
            Some(n) => &n.children,
            None => &[],
        }
    }

    /// Returns the parent of `node`.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0 as usize)?.parent
    }

    /// Returns the tag of an element node.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0 as usize)?.kind {
            Kind::Element(tag) => Some(tag),
            Kind::Text => None,
        }
    }

    /// Returns an attribute of `node`.
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&PropValue> {
        self.nodes.get(node.0 as usize)?.attributes.get(name)
    }

    /// Returns the number of handlers subscribed to `event` on `node`.
    #[must_use]
    pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
        self.nodes.get(node.0 as usize).map_or(0, |n| {
            n.listeners.iter().filter(|(e, _)| e == event).count()
        })
    }

    /// Returns `true` if `node` is the container or one of its descendants.
    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == self.container() {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    /// Finds the first attached element with `tag`, in document order.
    #[must_use]
    pub fn find_element(&self, tag: &str) -> Option<NodeId> {
        let mut stack = alloc::vec![self.container()];
        while let Some(id) = stack.pop() {
            if id != self.container() && self.tag(id) == Some(tag) {
                return Some(id);
            }
            stack.extend(self.children(id).iter().rev());
        }
        None
    }

    /// Serializes the children of `node` as markup.
    ///
    /// Elements render as `<tag name="value">…</tag>` with attributes in name
    /// order; text nodes render as their content.
    ///
    /// # Panics
    ///
    /// Panics if called during a commit: the tree must only be observed between
    /// commits.
    #[must_use]
    pub fn to_markup(&self, node: NodeId) -> String {
        assert!(!self.in_commit, "host tree read during a commit");
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_markup(child, &mut out);
        }
        out
    }

    /// Serializes the container's contents.
    #[must_use]
    pub fn markup(&self) -> String {
        self.to_markup(self.container())
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id.0 as usize) else {
            return;
        };
        match &node.kind {
            Kind::Text => {
                if let Some(value) = node.attributes.get(TEXT_VALUE) {
                    out.push_str(&value.to_string());
                }
            }
            Kind::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in &node.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&value.to_string());
                    out.push('"');
                }
                out.push('>');
                for &child in &node.children {
                    self.write_markup(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    // -- Events --

    /// Invokes every handler subscribed to `event` on `node`, in subscription
    /// order. Returns how many ran.
    pub fn dispatch(&self, node: NodeId, event: &str) -> usize {
        let handlers: Vec<EventHandler> = self
            .nodes
            .get(node.0 as usize)
            .map(|n| {
                n.listeners
                    .iter()
                    .filter(|(e, _)| e == event)
                    .map(|(_, h)| h.clone())
                    .collect()
            })
            .unwrap_or_default();
        for handler in &handlers {
            handler.call();
        }
        handlers.len()
    }

    // -- Failure injection --

    /// Makes the next operation of `kind` fail with a [`HostError`].
    pub fn fail_next(&mut self, kind: OpKind) {
        self.fail_next = Some(kind);
    }

    // -- Internals --

    fn check(&mut self, op: OpKind) -> Result<(), HostError> {
        if self.fail_next == Some(op) {
            self.fail_next = None;
            return Err(HostError {
                op,
                reason: "injected failure",
            });
        }
        Ok(())
    }

    fn node_mut(&mut self, id: NodeId, op: OpKind) -> Result<&mut Node, HostError> {
        self.nodes.get_mut(id.0 as usize).ok_or(HostError {
            op,
            reason: "unknown node",
        })
    }

    fn log(&mut self, op: HostOp, touched: NodeId) {
        if op.is_mutation() && !self.in_commit && self.is_attached(touched) {
            self.stray_mutations += 1;
        }
        self.ops.push(op);
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent.0 as usize) {
            p.children.retain(|&c| c != child);
        }
        if let Some(c) = self.nodes.get_mut(child.0 as usize) {
            c.parent = None;
        }
    }
}

impl HostAdapter for MemoryHost {
    type Node = NodeId;
    type Error = HostError;

    fn create_node(&mut self, kind: NodeKind<'_>) -> Result<NodeId, HostError> {
        self.check(OpKind::Create)?;
        let id = NodeId(u32::try_from(self.nodes.len()).map_err(|_| HostError {
            op: OpKind::Create,
            reason: "host tree is full",
        })?);
        let (kind, label) = match kind {
            NodeKind::Element(tag) => (Kind::Element(tag.to_string()), tag.to_string()),
            NodeKind::Text => (Kind::Text, "#text".to_string()),
        };
        self.nodes.push(Node::new(kind));
        self.log(HostOp::Create { node: id, kind: label }, id);
        Ok(id)
    }

    fn set_attribute(
        &mut self,
        node: &NodeId,
        name: &str,
        value: &PropValue,
    ) -> Result<(), HostError> {
        self.check(OpKind::SetAttribute)?;
        self.node_mut(*node, OpKind::SetAttribute)?
            .attributes
            .insert(name.to_string(), value.clone());
        self.log(
            HostOp::SetAttribute {
                node: *node,
                name: name.to_string(),
                value: value.to_string(),
            },
            *node,
        );
        Ok(())
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) -> Result<(), HostError> {
        self.check(OpKind::RemoveAttribute)?;
        self.node_mut(*node, OpKind::RemoveAttribute)?
            .attributes
            .remove(name);
        self.log(
            HostOp::RemoveAttribute {
                node: *node,
                name: name.to_string(),
            },
            *node,
        );
        Ok(())
    }

    fn add_event_subscription(
        &mut self,
        node: &NodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        self.check(OpKind::Subscribe)?;
        self.node_mut(*node, OpKind::Subscribe)?
            .listeners
            .push((event.to_string(), handler.clone()));
        self.log(
            HostOp::Subscribe {
                node: *node,
                event: event.to_string(),
            },
            *node,
        );
        Ok(())
    }

    fn remove_event_subscription(
        &mut self,
        node: &NodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        self.check(OpKind::Unsubscribe)?;
        let listeners = &mut self.node_mut(*node, OpKind::Unsubscribe)?.listeners;
        let Some(pos) = listeners
            .iter()
            .position(|(e, h)| e == event && h == handler)
        else {
            return Err(HostError {
                op: OpKind::Unsubscribe,
                reason: "handler is not subscribed",
            });
        };
        listeners.remove(pos);
        self.log(
            HostOp::Unsubscribe {
                node: *node,
                event: event.to_string(),
            },
            *node,
        );
        Ok(())
    }

    fn insert_child(
        &mut self,
        parent: &NodeId,
        child: &NodeId,
        before: Option<&NodeId>,
    ) -> Result<(), HostError> {
        self.check(OpKind::Insert)?;
        let (parent, child) = (*parent, *child);
        if matches!(self.node_mut(parent, OpKind::Insert)?.kind, Kind::Text) {
            return Err(HostError {
                op: OpKind::Insert,
                reason: "text nodes have no children",
            });
        }
        self.node_mut(child, OpKind::Insert)?;
        if let Some(&anchor) = before
            && self.parent(anchor) != Some(parent)
        {
            return Err(HostError {
                op: OpKind::Insert,
                reason: "anchor is not a child of parent",
            });
        }

        self.detach(child);
        let siblings = &mut self.node_mut(parent, OpKind::Insert)?.children;
        let at = before
            .and_then(|anchor| siblings.iter().position(|c| c == anchor))
            .unwrap_or(siblings.len());
        siblings.insert(at, child);
        self.node_mut(child, OpKind::Insert)?.parent = Some(parent);

        self.log(
            HostOp::Insert {
                parent,
                child,
                before: before.copied(),
            },
            parent,
        );
        Ok(())
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), HostError> {
        self.check(OpKind::Remove)?;
        if self.parent(*child) != Some(*parent) {
            return Err(HostError {
                op: OpKind::Remove,
                reason: "not a child of parent",
            });
        }
        // Logged before detaching so a stray removal still counts as visible.
        self.log(
            HostOp::Remove {
                parent: *parent,
                child: *child,
            },
            *parent,
        );
        self.detach(*child);
        Ok(())
    }

    fn begin_commit(&mut self) {
        assert!(!self.in_commit, "nested commit");
        self.in_commit = true;
        self.ops.push(HostOp::BeginCommit);
    }

    fn end_commit(&mut self) {
        assert!(self.in_commit, "end_commit without begin_commit");
        self.in_commit = false;
        self.commits += 1;
        self.ops.push(HostOp::EndCommit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(host: &mut MemoryHost, tag: &str) -> NodeId {
        host.create_node(NodeKind::Element(tag)).expect("create")
    }

    #[test]
    fn insert_before_anchor_and_move() {
        let mut host = MemoryHost::new();
        let root = host.container();
        let a = element(&mut host, "a");
        let b = element(&mut host, "b");
        let c = element(&mut host, "c");
        host.insert_child(&root, &a, None).expect("insert a");
        host.insert_child(&root, &c, None).expect("insert c");
        host.insert_child(&root, &b, Some(&c)).expect("insert b");
        assert_eq!(host.markup(), "<a></a><b></b><c></c>");

        // Re-inserting moves.
        host.insert_child(&root, &a, None).expect("move a");
        assert_eq!(host.markup(), "<b></b><c></c><a></a>");
    }

    #[test]
    fn text_nodes_render_their_value() {
        let mut host = MemoryHost::new();
        let root = host.container();
        let p = element(&mut host, "p");
        let text = host.create_node(NodeKind::Text).expect("create text");
        host.set_attribute(&text, TEXT_VALUE, &PropValue::from("hi"))
            .expect("set");
        host.set_attribute(&p, "class", &PropValue::from("x"))
            .expect("set");
        host.insert_child(&p, &text, None).expect("insert text");
        host.insert_child(&root, &p, None).expect("insert p");
        assert_eq!(host.markup(), r#"<p class="x">hi</p>"#);
        assert_eq!(host.find_element("p"), Some(p));
    }

    #[test]
    fn mutations_outside_commit_on_attached_nodes_are_stray() {
        let mut host = MemoryHost::new();
        let root = host.container();
        let p = element(&mut host, "p");
        host.set_attribute(&p, "id", &PropValue::from("detached"))
            .expect("set");
        assert_eq!(host.stray_mutations(), 0, "detached nodes are invisible");

        host.begin_commit();
        host.insert_child(&root, &p, None).expect("insert");
        host.end_commit();
        assert_eq!(host.stray_mutations(), 0);

        host.remove_attribute(&p, "id").expect("remove");
        assert_eq!(host.stray_mutations(), 1);
    }

    #[test]
    fn injected_failure_fires_once() {
        let mut host = MemoryHost::new();
        host.fail_next(OpKind::Create);
        let err = host
            .create_node(NodeKind::Text)
            .expect_err("injected failure");
        assert_eq!(err.op, OpKind::Create);
        assert!(host.create_node(NodeKind::Text).is_ok(), "only once");
    }

    #[test]
    fn dispatch_calls_subscribed_handlers() {
        use alloc::rc::Rc;
        use core::cell::Cell;

        let mut host = MemoryHost::new();
        let button = element(&mut host, "button");
        let hits = Rc::new(Cell::new(0));
        let handler = {
            let hits = Rc::clone(&hits);
            EventHandler::new(move || hits.set(hits.get() + 1))
        };
        host.add_event_subscription(&button, "click", &handler)
            .expect("subscribe");
        assert_eq!(host.dispatch(button, "click"), 1);
        assert_eq!(host.dispatch(button, "focus"), 0);
        host.remove_event_subscription(&button, "click", &handler)
            .expect("unsubscribe");
        assert_eq!(host.dispatch(button, "click"), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn removing_a_non_child_fails() {
        let mut host = MemoryHost::new();
        let root = host.container();
        let p = element(&mut host, "p");
        let err = host.remove_child(&root, &p).expect_err("not attached");
        assert_eq!(err.op, OpKind::Remove);
    }

    #[test]
    #[should_panic(expected = "host tree read during a commit")]
    fn reading_mid_commit_panics() {
        let mut host = MemoryHost::new();
        host.begin_commit();
        let _ = host.markup();
    }
}
