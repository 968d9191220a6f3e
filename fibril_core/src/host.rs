// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host adapter contract for platform integrations.
//!
//! Fibril never touches a host tree directly. Each platform provides a
//! [`HostAdapter`] that creates host nodes, assigns attributes, manages event
//! subscriptions, and inserts/removes children. The engine calls it from two
//! places:
//!
//! - **Render phase**: creating a host node for a newly placed fiber and
//!   stamping its initial attributes. The node is not attached yet, so this is
//!   invisible to the user.
//! - **Commit phase**: every visible mutation, bracketed by
//!   [`begin_commit`](HostAdapter::begin_commit) and
//!   [`end_commit`](HostAdapter::end_commit). The engine never yields between
//!   the two.
//!
//! Failures are returned as [`HostAdapter::Error`] and surface to the caller
//! of [`Root::work_loop`](crate::Root::work_loop) wrapped in
//! [`Error::Host`](crate::Error::Host). The engine does not retry.
//!
//! # Frame loop pseudocode
//!
//! ```rust,ignore
//! fn on_idle(deadline: &impl IdleDeadline) {
//!     match root.work_loop(&mut host, deadline) {
//!         Ok(_) => {}
//!         Err(err) => report(err),
//!     }
//!     request_idle_callback(on_idle);
//! }
//! ```

use core::fmt;

use crate::element::{EventHandler, PropValue};

/// The kind of host node to create.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind<'a> {
    /// An element node with the given tag.
    Element(&'a str),
    /// A text node. Its content arrives as the
    /// [`TEXT_VALUE`](crate::element::TEXT_VALUE) attribute.
    Text,
}

/// Creates, updates, and removes host nodes.
///
/// Implementations include DOM-backed adapters, in-memory trees for tests,
/// and spies that record operations.
pub trait HostAdapter {
    /// A handle to a host node. Cloning must yield a handle to the same node.
    type Node: Clone + fmt::Debug;

    /// The error returned when a host operation fails.
    type Error: fmt::Debug;

    /// Creates a detached host node.
    fn create_node(&mut self, kind: NodeKind<'_>) -> Result<Self::Node, Self::Error>;

    /// Assigns an attribute on `node`.
    fn set_attribute(
        &mut self,
        node: &Self::Node,
        name: &str,
        value: &PropValue,
    ) -> Result<(), Self::Error>;

    /// Removes an attribute from `node`.
    fn remove_attribute(&mut self, node: &Self::Node, name: &str) -> Result<(), Self::Error>;

    /// Subscribes `handler` to `event` (already lowercased) on `node`.
    fn add_event_subscription(
        &mut self,
        node: &Self::Node,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), Self::Error>;

    /// Unsubscribes `handler` from `event` on `node`.
    fn remove_event_subscription(
        &mut self,
        node: &Self::Node,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), Self::Error>;

    /// Inserts `child` under `parent`, before `before` if given, otherwise as
    /// the last child.
    fn insert_child(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        before: Option<&Self::Node>,
    ) -> Result<(), Self::Error>;

    /// Removes `child` from `parent`.
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node)
    -> Result<(), Self::Error>;

    /// Called before the first mutation of a commit.
    fn begin_commit(&mut self) {}

    /// Called after the last mutation of a commit, including a commit that
    /// failed partway.
    fn end_commit(&mut self) {}
}
