// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A host adapter that records every call as a line of text.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::element::{EventHandler, PropValue};
use crate::host::{HostAdapter, NodeKind};

/// Records host calls. Node `#0` is the container.
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    ops: Vec<String>,
    next_node: u32,
    fail_on: Option<&'static str>,
    in_commit: bool,
}

impl RecordingHost {
    /// Returns the recorded calls.
    pub(crate) fn ops(&self) -> &[String] {
        &self.ops
    }

    /// Drops the recorded calls.
    pub(crate) fn clear(&mut self) {
        self.ops.clear();
    }

    /// Makes every call whose log line starts with `prefix` fail.
    pub(crate) fn fail_on(&mut self, prefix: &'static str) {
        self.fail_on = Some(prefix);
    }

    pub(crate) fn in_commit(&self) -> bool {
        self.in_commit
    }

    fn record(&mut self, op: String) -> Result<(), String> {
        if self.fail_on.is_some_and(|prefix| op.starts_with(prefix)) {
            return Err(op);
        }
        self.ops.push(op);
        Ok(())
    }
}

impl HostAdapter for RecordingHost {
    type Node = u32;
    type Error = String;

    fn create_node(&mut self, kind: NodeKind<'_>) -> Result<u32, String> {
        let id = self.next_node + 1;
        let tag = match kind {
            NodeKind::Element(tag) => tag,
            NodeKind::Text => "text",
        };
        self.record(format!("create {tag} #{id}"))?;
        self.next_node = id;
        Ok(id)
    }

    fn set_attribute(&mut self, node: &u32, name: &str, value: &PropValue) -> Result<(), String> {
        self.record(format!("set #{node} {name}={value}"))
    }

    fn remove_attribute(&mut self, node: &u32, name: &str) -> Result<(), String> {
        self.record(format!("unset #{node} {name}"))
    }

    fn add_event_subscription(
        &mut self,
        node: &u32,
        event: &str,
        _: &EventHandler,
    ) -> Result<(), String> {
        self.record(format!("listen #{node} {event}"))
    }

    fn remove_event_subscription(
        &mut self,
        node: &u32,
        event: &str,
        _: &EventHandler,
    ) -> Result<(), String> {
        self.record(format!("unlisten #{node} {event}"))
    }

    fn insert_child(&mut self, parent: &u32, child: &u32, before: Option<&u32>) -> Result<(), String> {
        match before {
            Some(before) => self.record(format!("insert #{child} into #{parent} before #{before}")),
            None => self.record(format!("insert #{child} into #{parent}")),
        }
    }

    fn remove_child(&mut self, parent: &u32, child: &u32) -> Result<(), String> {
        self.record(format!("remove #{child} from #{parent}"))
    }

    fn begin_commit(&mut self) {
        assert!(!self.in_commit, "commits must not nest");
        self.in_commit = true;
        self.ops.push(String::from("begin"));
    }

    fn end_commit(&mut self) {
        assert!(self.in_commit, "end_commit without begin_commit");
        self.in_commit = false;
        self.ops.push(String::from("end"));
    }
}
