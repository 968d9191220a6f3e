// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Positional per-fiber state cells.
//!
//! A function component receives a [`Hooks`] context while its fiber is being
//! processed. Each [`Hooks::use_state`] call claims the next *position*; the
//! Nth call in a render maps to the Nth cell of the fiber's alternate. The
//! context only exists for the duration of the render call, so hook state
//! cannot be reached outside an active fiber.
//!
//! # Update queues
//!
//! Every position owns one update queue that is carried forward from render
//! to render. A render folds the queued updates into the previous settled
//! state but leaves them queued; the commit that promotes the render removes
//! exactly the updates it folded in. A render pass that is discarded before
//! commit therefore loses nothing, and a setter captured by an older render
//! still feeds the cell the next render reads.
//!
//! ```rust,ignore
//! fn counter(hooks: &mut Hooks<'_>, _: &Props) -> Vec<Element> {
//!     let (count, set_count) = hooks.use_state(1_i64);
//!     let on_click = EventHandler::new(move || set_count.update(|n| n + 1));
//!     vec![Element::host("button").on("Click", on_click).text_child(count)]
//! }
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::marker::PhantomData;

use crate::fiber::FiberId;

/// A queued, type-erased state transition.
type Update = Box<dyn Fn(&dyn Any) -> Rc<dyn Any>>;

/// The update queue shared by every cell at one hook position.
type HookQueue = Rc<RefCell<Vec<Update>>>;

/// One positional state cell of a function-component fiber.
pub(crate) struct HookCell {
    /// Settled state for the render that produced this cell.
    state: Rc<dyn Any>,
    /// Updates queued for this position.
    queue: HookQueue,
    /// How many queued updates `state` already includes.
    consumed: usize,
}

impl HookCell {
    /// Removes the updates folded into this cell's state from the shared
    /// queue. Called once, when the owning tree is committed.
    pub(crate) fn settle(&mut self) {
        let mut queue = self.queue.borrow_mut();
        let consumed = self.consumed.min(queue.len());
        queue.drain(..consumed);
        self.consumed = 0;
    }
}

impl fmt::Debug for HookCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookCell")
            .field("queued", &self.queue.borrow().len())
            .field("consumed", &self.consumed)
            .finish_non_exhaustive()
    }
}

/// Shared flag raised by setters to ask the root for a new render pass.
#[derive(Debug, Default)]
pub(crate) struct RenderRequest {
    pending: Cell<bool>,
}

impl RenderRequest {
    pub(crate) fn request(&self) {
        self.pending.set(true);
    }

    pub(crate) fn take(&self) -> bool {
        self.pending.replace(false)
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.get()
    }
}

/// The hook context of the fiber currently being processed.
///
/// Passed to a component's [`RenderFn`](crate::RenderFn); it cannot outlive
/// the render call.
pub struct Hooks<'a> {
    fiber: FiberId,
    previous: &'a [HookCell],
    cells: Vec<HookCell>,
    request: &'a Rc<RenderRequest>,
}

impl fmt::Debug for Hooks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("fiber", &self.fiber)
            .field("position", &self.cells.len())
            .field("previous", &self.previous.len())
            .finish_non_exhaustive()
    }
}

impl<'a> Hooks<'a> {
    pub(crate) fn new(
        fiber: FiberId,
        previous: &'a [HookCell],
        request: &'a Rc<RenderRequest>,
    ) -> Self {
        Self {
            fiber,
            previous,
            cells: Vec::with_capacity(previous.len()),
            request,
        }
    }

    pub(crate) fn into_cells(self) -> Vec<HookCell> {
        self.cells
    }

    /// Returns the fiber being rendered.
    #[must_use]
    pub fn fiber(&self) -> FiberId {
        self.fiber
    }

    /// Returns the next hook position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cells.len()
    }

    /// Claims the next state cell.
    ///
    /// On the fiber's first render the cell starts at `initial`. On later
    /// renders it starts from the alternate's settled state, and every update
    /// queued since is applied in order. Returns the settled state and a
    /// setter for the cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell at this position holds a different type, which means
    /// hooks were called in a different order than on the previous render.
    pub fn use_state<T: Clone + 'static>(&mut self, initial: T) -> (T, StateSetter<T>) {
        let position = self.cells.len();
        let (mut state, queue) = match self.previous.get(position) {
            Some(cell) => (Rc::clone(&cell.state), Rc::clone(&cell.queue)),
            None => (Rc::new(initial) as Rc<dyn Any>, HookQueue::default()),
        };
        assert!(
            state.is::<T>(),
            "hook state type changed at position {position} of {:?}",
            self.fiber
        );

        let consumed = {
            let pending = queue.borrow();
            for update in pending.iter() {
                state = update(&*state);
            }
            pending.len()
        };

        let value = match state.downcast_ref::<T>() {
            Some(value) => value.clone(),
            None => panic!(
                "hook state type changed at position {position} of {:?}",
                self.fiber
            ),
        };

        self.cells.push(HookCell {
            state,
            queue: Rc::clone(&queue),
            consumed,
        });

        let setter = StateSetter {
            queue,
            request: Rc::clone(self.request),
            _marker: PhantomData,
        };
        (value, setter)
    }
}

/// Queues updates for one hook cell and requests a new render pass.
///
/// Setters may be cloned, stored in event handlers, and called at any time,
/// including between scheduler slices. Each call replaces any unfinished
/// render pass with a new one seeded from the committed tree.
pub struct StateSetter<T> {
    queue: HookQueue,
    request: Rc<RenderRequest>,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            queue: Rc::clone(&self.queue),
            request: Rc::clone(&self.request),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSetter")
            .field("queued", &self.queue.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<T: 'static> StateSetter<T> {
    /// Queues a transition from the previous state to the next.
    ///
    /// The transition may run more than once if a render pass that applied it
    /// is discarded, so it should be a pure function of its input.
    pub fn update(&self, f: impl Fn(&T) -> T + 'static) {
        self.queue.borrow_mut().push(Box::new(move |prev: &dyn Any| {
            match prev.downcast_ref::<T>() {
                Some(prev) => Rc::new(f(prev)) as Rc<dyn Any>,
                None => panic!("hook state type changed under a queued update"),
            }
        }));
        self.request.request();
    }

    /// Queues replacing the state with `value`.
    pub fn set(&self, value: T)
    where
        T: Clone,
    {
        self.update(move |_| value.clone());
    }

    /// Returns the number of updates queued and not yet committed.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;

    use super::*;

    fn fiber() -> FiberId {
        FiberId { idx: 1, pass: 1 }
    }

    #[test]
    fn first_render_uses_initial_value() {
        let request = Rc::new(RenderRequest::default());
        let mut hooks = Hooks::new(fiber(), &[], &request);
        let (a, _) = hooks.use_state(1_i64);
        let (b, _) = hooks.use_state(String::from("x"));
        assert_eq!(a, 1);
        assert_eq!(b, "x");
        assert_eq!(hooks.into_cells().len(), 2);
    }

    #[test]
    fn queued_update_settles_on_next_render() {
        let request = Rc::new(RenderRequest::default());
        let mut first = Hooks::new(fiber(), &[], &request);
        let (n, set_n) = first.use_state(1_i64);
        assert_eq!(n, 1);
        let mut previous = first.into_cells();
        for cell in &mut previous {
            cell.settle();
        }

        set_n.update(|n| n + 1);
        assert!(request.take(), "setter requests a render");

        let mut second = Hooks::new(fiber(), &previous, &request);
        let (n, _) = second.use_state(1_i64);
        assert_eq!(n, 2);
    }

    #[test]
    fn updates_survive_an_uncommitted_render() {
        let request = Rc::new(RenderRequest::default());
        let mut first = Hooks::new(fiber(), &[], &request);
        let (_, set_n) = first.use_state(0_i64);
        let previous = first.into_cells();

        set_n.update(|n| n + 10);
        set_n.update(|n| n * 2);

        // A render that is never committed applies the queue...
        let mut discarded = Hooks::new(fiber(), &previous, &request);
        assert_eq!(discarded.use_state(0_i64).0, 20);
        drop(discarded);
        assert_eq!(set_n.queued(), 2);

        // ...and so does the one that replaces it.
        let mut retried = Hooks::new(fiber(), &previous, &request);
        assert_eq!(retried.use_state(0_i64).0, 20);
        let mut committed = retried.into_cells();
        committed[0].settle();
        assert_eq!(set_n.queued(), 0);

        let mut after = Hooks::new(fiber(), &committed, &request);
        assert_eq!(after.use_state(0_i64).0, 20);
    }

    #[test]
    fn settle_keeps_updates_queued_after_render() {
        let request = Rc::new(RenderRequest::default());
        let mut first = Hooks::new(fiber(), &[], &request);
        let (_, set_n) = first.use_state(0_i64);
        let mut cells = first.into_cells();

        // Queued after the render read the queue, before its commit.
        set_n.set(5);
        cells[0].settle();
        assert_eq!(set_n.queued(), 1);

        let mut next = Hooks::new(fiber(), &cells, &request);
        assert_eq!(next.use_state(0_i64).0, 5);
    }

    #[test]
    #[should_panic(expected = "hook state type changed")]
    fn changed_hook_type_panics() {
        let request = Rc::new(RenderRequest::default());
        let mut first = Hooks::new(fiber(), &[], &request);
        let _ = first.use_state(1_i64);
        let previous = first.into_cells();

        let mut second = Hooks::new(fiber(), &previous, &request);
        let _ = second.use_state(vec![1_u8]);
    }
}
