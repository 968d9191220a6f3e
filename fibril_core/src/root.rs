// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-container engine object.
//!
//! A [`Root`] owns everything one mounted tree needs: the committed
//! (`current`) fiber tree, at most one work-in-progress pass, the pending
//! deletions of that pass, and the render-request flag shared with every
//! [`StateSetter`](crate::StateSetter) it hands out. Independent roots share
//! nothing.
//!
//! # Lifecycle
//!
//! ```rust,ignore
//! let mut root = Root::new(container, SchedulerConfig::idle_callback());
//! root.render(Element::component("App", app));
//!
//! // Once per idle callback, forever:
//! match root.work_loop(&mut host, &deadline)? {
//!     SliceOutcome::Yielded => { /* more work next slice */ }
//!     SliceOutcome::Completed | SliceOutcome::Idle => {}
//! }
//! ```
//!
//! A setter call (typically from a host event handler between slices) marks
//! the root as needing a new pass. The next slice discards any unfinished pass
//! and seeds a fresh one from `current`'s root props. Starvation, where new
//! updates keep preempting a pass before it completes, is not mitigated.

use alloc::rc::Rc;
use alloc::vec;
use core::fmt;

use crate::commit::commit_root;
use crate::element::{Element, Props};
use crate::error::Error;
use crate::fiber::{FiberId, FiberTree};
use crate::hooks::RenderRequest;
use crate::host::HostAdapter;
use crate::scheduler::{IdleDeadline, SchedulerConfig, SliceOutcome, Unbounded, WorkInProgress};
use crate::trace::{
    CommitEvent, PassBeginEvent, PassDiscardedEvent, PassReason, SliceEvent, Tracer,
};

/// A mounted tree: one host container plus its render state.
pub struct Root<H: HostAdapter> {
    container: H::Node,
    config: SchedulerConfig,
    current: Option<FiberTree<H::Node>>,
    wip: Option<WorkInProgress<H::Node>>,
    requests: Rc<RenderRequest>,
    next_pass: u64,
    slices: u64,
    /// A pass discarded outside a traced slice, reported by the next one.
    unreported_discard: Option<PassDiscardedEvent>,
}

impl<H: HostAdapter> fmt::Debug for Root<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Root")
            .field("container", &self.container)
            .field("config", &self.config)
            .field("current", &self.current.as_ref().map(FiberTree::pass))
            .field("wip", &self.wip.as_ref().map(|wip| wip.tree.pass()))
            .field("update_requested", &self.requests.is_pending())
            .field("slices", &self.slices)
            .finish_non_exhaustive()
    }
}

impl<H: HostAdapter> Root<H> {
    /// Creates a root for `container`. Nothing is rendered until
    /// [`render`](Self::render) is called.
    #[must_use]
    pub fn new(container: H::Node, config: SchedulerConfig) -> Self {
        Self {
            container,
            config,
            current: None,
            wip: None,
            requests: Rc::new(RenderRequest::default()),
            next_pass: 1,
            slices: 0,
            unreported_discard: None,
        }
    }

    /// Seeds a render pass for `element` as the container's only child.
    ///
    /// Replaces any unfinished pass. No host work happens until the work loop
    /// runs.
    pub fn render(&mut self, element: Element) {
        self.discard();
        // The new pass reads every queued hook update anyway.
        self.requests.take();
        let props = Rc::new(Props::with_children(vec![element]));
        self.seed(props, PassReason::Mount);
    }

    /// Runs one scheduler slice against `deadline`.
    ///
    /// See [`work_loop_traced`](Self::work_loop_traced).
    pub fn work_loop(
        &mut self,
        host: &mut H,
        deadline: &dyn IdleDeadline,
    ) -> Result<SliceOutcome, Error<H::Error>> {
        self.work_loop_traced(host, deadline, &mut Tracer::none())
    }

    /// Runs one scheduler slice against `deadline`, reporting to `tracer`.
    ///
    /// Performs at least one unit of work if any is pending, then keeps going
    /// until the deadline or the unit cap says to yield. A pass whose last
    /// unit completes in this slice is committed before returning.
    ///
    /// On error the in-flight pass is discarded and `current` is left as it
    /// was. Queued hook updates stay queued for the next pass.
    pub fn work_loop_traced(
        &mut self,
        host: &mut H,
        deadline: &dyn IdleDeadline,
        tracer: &mut Tracer<'_>,
    ) -> Result<SliceOutcome, Error<H::Error>> {
        let slice = self.slices;
        self.slices += 1;

        if let Some(e) = self.unreported_discard.take() {
            tracer.pass_discarded(&e);
        }
        self.restart_if_requested(tracer);

        let mut units = 0;
        let outcome = loop {
            let Some(wip) = self.wip.as_mut() else {
                break SliceOutcome::Idle;
            };
            if !wip.announced {
                wip.announced = true;
                tracer.pass_begin(&PassBeginEvent {
                    pass: wip.tree.pass(),
                    reason: wip.reason,
                });
            }

            if wip.is_complete() {
                self.commit(host, tracer)?;
                break SliceOutcome::Completed;
            }

            let step =
                wip.perform_unit_of_work(host, self.current.as_ref(), &self.requests, tracer);
            if let Err(err) = step {
                self.discard_traced(tracer);
                return Err(err);
            }
            units += 1;

            // A setter called while rendering replaces this pass.
            if self.requests.is_pending() {
                self.restart_if_requested(tracer);
                continue;
            }
            if self.wip.as_ref().is_some_and(WorkInProgress::is_complete) {
                continue;
            }
            if self.config.should_yield(units, deadline) {
                break SliceOutcome::Yielded;
            }
        };

        tracer.slice(&SliceEvent {
            slice,
            pass: self
                .wip
                .as_ref()
                .map(|wip| wip.tree.pass())
                .or_else(|| self.current.as_ref().map(FiberTree::pass))
                .filter(|_| outcome != SliceOutcome::Idle),
            units,
            outcome,
        });
        Ok(outcome)
    }

    /// Runs slices without a deadline until no work remains.
    ///
    /// Returns [`SliceOutcome::Completed`] if a pass was committed, otherwise
    /// [`SliceOutcome::Idle`].
    pub fn flush(&mut self, host: &mut H) -> Result<SliceOutcome, Error<H::Error>> {
        let mut committed = false;
        loop {
            match self.work_loop(host, &Unbounded)? {
                SliceOutcome::Yielded => {}
                SliceOutcome::Completed => committed = true,
                SliceOutcome::Idle if committed => return Ok(SliceOutcome::Completed),
                SliceOutcome::Idle => return Ok(SliceOutcome::Idle),
            }
        }
    }

    /// Returns `true` if a pass is in flight or a setter requested one.
    #[must_use]
    pub fn has_pending_work(&self) -> bool {
        self.wip.is_some() || self.requests.is_pending()
    }

    /// Returns `true` if a pass is in flight.
    #[must_use]
    pub fn is_rendering(&self) -> bool {
        self.wip.is_some()
    }

    /// Returns the container node.
    #[must_use]
    pub fn container(&self) -> &H::Node {
        &self.container
    }

    /// Returns the scheduler configuration.
    #[must_use]
    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// Returns the last committed tree.
    #[must_use]
    pub fn current(&self) -> Option<&FiberTree<H::Node>> {
        self.current.as_ref()
    }

    /// Returns the tree of the in-flight pass.
    #[must_use]
    pub fn work_in_progress(&self) -> Option<&FiberTree<H::Node>> {
        self.wip.as_ref().map(|wip| &wip.tree)
    }

    /// Returns the fibers of [`current`](Self::current) the in-flight pass will
    /// remove at commit.
    #[must_use]
    pub fn pending_deletions(&self) -> &[FiberId] {
        match &self.wip {
            Some(wip) => &wip.deletions,
            None => &[],
        }
    }

    fn seed(&mut self, props: Rc<Props>, reason: PassReason) {
        let pass = self.next_pass;
        self.next_pass += 1;
        let alternate = self.current.as_ref().map(FiberTree::root);
        let tree = FiberTree::new(pass, self.container.clone(), props, alternate);
        self.wip = Some(WorkInProgress::new(tree, reason));
    }

    /// Starts a fresh pass if a setter asked for one.
    fn restart_if_requested(&mut self, tracer: &mut Tracer<'_>) {
        if !self.requests.take() {
            return;
        }
        let props = match (&self.current, &self.wip) {
            (Some(current), _) => Rc::clone(current.shared_props(current.root())),
            (None, Some(wip)) => Rc::clone(wip.tree.shared_props(wip.tree.root())),
            // Setters only exist after a render, so there is always a source.
            (None, None) => return,
        };
        self.discard_traced(tracer);
        self.seed(props, PassReason::StateUpdate);
    }

    fn commit(&mut self, host: &mut H, tracer: &mut Tracer<'_>) -> Result<(), Error<H::Error>> {
        let Some(mut wip) = self.wip.take() else {
            return Ok(());
        };
        let counts = match commit_root(
            host,
            &wip.tree,
            self.current.as_ref(),
            &wip.deletions,
            tracer,
        ) {
            Ok(counts) => counts,
            Err(err) => {
                tracer.pass_discarded(&PassDiscardedEvent {
                    pass: wip.tree.pass(),
                    units: wip.units_done,
                });
                return Err(err);
            }
        };

        for cells in &mut wip.tree.hooks {
            for cell in cells {
                cell.settle();
            }
        }
        tracer.commit(&CommitEvent {
            pass: wip.tree.pass(),
            placements: counts.placements,
            updates: counts.updates,
            deletions: counts.deletions,
        });
        self.current = Some(wip.tree);
        Ok(())
    }

    fn discard(&mut self) {
        if let Some(wip) = self.wip.take() {
            self.unreported_discard = Some(PassDiscardedEvent {
                pass: wip.tree.pass(),
                units: wip.units_done,
            });
        }
    }

    fn discard_traced(&mut self, tracer: &mut Tracer<'_>) {
        self.discard();
        if let Some(e) = self.unreported_discard.take() {
            tracer.pass_discarded(&e);
        }
    }
}
