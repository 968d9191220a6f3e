// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

use fibril_core::trace::Tracer;
use fibril_core::{Element, Error, IdleDeadline, Root, SchedulerConfig, SliceOutcome};

use crate::deadline::UnitDeadline;
use crate::memory::{HostError, MemoryHost, NodeId};

/// Simulates an idle-callback clock driving one [`Root`] into a
/// [`MemoryHost`].
///
/// Each [`tick`](Self::tick) is one idle callback: it runs a single scheduler
/// slice and then "re-requests" the callback, so ticks can continue forever
/// whether or not there is work.
#[derive(Debug)]
pub struct IdleLoop {
    root: Root<MemoryHost>,
    host: MemoryHost,
    ticks: u64,
}

impl IdleLoop {
    /// Creates a loop with an empty host.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        let host = MemoryHost::new();
        let root = Root::new(host.container(), config);
        Self {
            root,
            host,
            ticks: 0,
        }
    }

    /// Seeds a render of `element` into the container.
    pub fn render(&mut self, element: Element) {
        self.root.render(element);
    }

    /// Runs one idle callback.
    pub fn tick(&mut self, deadline: &dyn IdleDeadline) -> Result<SliceOutcome, Error<HostError>> {
        self.tick_traced(deadline, &mut Tracer::none())
    }

    /// Runs one idle callback, reporting to `tracer`.
    pub fn tick_traced(
        &mut self,
        deadline: &dyn IdleDeadline,
        tracer: &mut Tracer<'_>,
    ) -> Result<SliceOutcome, Error<HostError>> {
        self.ticks += 1;
        self.root.work_loop_traced(&mut self.host, deadline, tracer)
    }

    /// Ticks with a budget of `units` units per slice until no work remains.
    /// Returns the number of ticks that did work.
    pub fn run_until_idle(&mut self, units: u32) -> Result<u32, Error<HostError>> {
        let mut busy = 0;
        while self.root.has_pending_work() {
            self.tick(&UnitDeadline::new(units))?;
            busy += 1;
        }
        Ok(busy)
    }

    /// Dispatches a host event, as if the user triggered it between slices.
    pub fn dispatch(&self, node: NodeId, event: &str) -> usize {
        self.host.dispatch(node, event)
    }

    /// Serializes the container's contents.
    #[must_use]
    pub fn markup(&self) -> String {
        self.host.markup()
    }

    /// Returns the number of idle callbacks run so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Returns the root.
    #[must_use]
    pub fn root(&self) -> &Root<MemoryHost> {
        &self.root
    }

    /// Returns the root mutably.
    pub fn root_mut(&mut self) -> &mut Root<MemoryHost> {
        &mut self.root
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &MemoryHost {
        &self.host
    }

    /// Returns the host mutably.
    pub fn host_mut(&mut self) -> &mut MemoryHost {
        &mut self.host
    }
}
