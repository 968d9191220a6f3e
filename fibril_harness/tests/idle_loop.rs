// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slicing behavior of the work loop under simulated idle callbacks.

use core::time::Duration;

use fibril_core::trace::{
    CommitEvent, PassBeginEvent, PassDiscardedEvent, PassReason, SliceEvent, TraceSink, Tracer,
};
use fibril_core::{Element, EventHandler, Hooks, Props, SchedulerConfig, SliceOutcome};
use fibril_harness::{FixedDeadline, IdleLoop, UnitDeadline};

#[derive(Debug, PartialEq)]
enum Event {
    Begin(u64, PassReason),
    Discarded(u64),
    Slice(SliceOutcome, u32),
    Commit(u64, u32, u32, u32),
}

#[derive(Default)]
struct Collect(Vec<Event>);

impl TraceSink for Collect {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.0.push(Event::Begin(e.pass, e.reason));
    }

    fn on_pass_discarded(&mut self, e: &PassDiscardedEvent) {
        self.0.push(Event::Discarded(e.pass));
    }

    fn on_slice(&mut self, e: &SliceEvent) {
        self.0.push(Event::Slice(e.outcome, e.units));
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        self.0.push(Event::Commit(e.pass, e.placements, e.updates, e.deletions));
    }
}

fn toggle(hooks: &mut Hooks<'_>, _: &Props) -> Vec<Element> {
    let (on, set_on) = hooks.use_state(false);
    let flip = EventHandler::new(move || set_on.update(|on| !on));
    let label = if on { "on" } else { "off" };
    vec![Element::host("button").on("Click", flip).text_child(label)]
}

/// root, div, then five `i` elements: seven units.
fn seven_units() -> Element {
    Element::host("div").children((0..5).map(|_| Element::host("i")))
}

#[test]
fn unit_budget_splits_a_pass_into_slices() {
    let mut idle = IdleLoop::new(SchedulerConfig::idle_callback());
    idle.render(seven_units());

    let mut outcomes = Vec::new();
    while idle.root().has_pending_work() {
        outcomes.push(idle.tick(&UnitDeadline::new(3)).expect("slice"));
    }
    assert_eq!(
        outcomes,
        [
            SliceOutcome::Yielded,
            SliceOutcome::Yielded,
            SliceOutcome::Completed
        ]
    );
    assert_eq!(idle.markup(), "<div><i></i><i></i><i></i><i></i><i></i></div>");
}

#[test]
fn exhausted_deadline_still_makes_progress() {
    let mut idle = IdleLoop::new(SchedulerConfig::idle_callback());
    idle.render(seven_units());

    let mut ticks = 0;
    while idle.root().has_pending_work() {
        idle.tick(&FixedDeadline(Duration::ZERO)).expect("slice");
        ticks += 1;
    }
    assert_eq!(ticks, 7, "one unit per slice");
}

#[test]
fn generous_deadline_finishes_in_one_slice() {
    let mut idle = IdleLoop::new(SchedulerConfig::idle_callback());
    idle.render(seven_units());
    let outcome = idle
        .tick(&FixedDeadline(Duration::from_millis(50)))
        .expect("slice");
    assert_eq!(outcome, SliceOutcome::Completed);
}

#[test]
fn unit_cap_applies_regardless_of_time() {
    let mut idle = IdleLoop::new(SchedulerConfig::budgeted(2));
    idle.render(seven_units());
    let busy = idle.run_until_idle(100).expect("render");
    assert_eq!(busy, 4);
}

#[test]
fn ticks_continue_when_idle() {
    let mut idle = IdleLoop::new(SchedulerConfig::idle_callback());
    for _ in 0..3 {
        assert_eq!(
            idle.tick(&UnitDeadline::new(5)).expect("slice"),
            SliceOutcome::Idle
        );
    }
    assert_eq!(idle.ticks(), 3);
    assert!(idle.host().ops().is_empty());
}

#[test]
fn trace_reports_passes_slices_and_commits() {
    let mut idle = IdleLoop::new(SchedulerConfig::idle_callback());
    idle.render(Element::component("Toggle", toggle));

    let mut sink = Collect::default();
    while idle.root().has_pending_work() {
        idle.tick_traced(&UnitDeadline::new(2), &mut Tracer::new(&mut sink))
            .expect("slice");
    }
    assert_eq!(idle.markup(), "<button>off</button>");

    // root, Toggle, button, text
    assert_eq!(
        sink.0,
        [
            Event::Begin(1, PassReason::Mount),
            Event::Slice(SliceOutcome::Yielded, 2),
            Event::Commit(1, 3, 0, 0),
            Event::Slice(SliceOutcome::Completed, 2),
        ]
    );

    sink.0.clear();
    let button = idle.host().find_element("button").expect("button");
    idle.dispatch(button, "click");
    // A second click before the first update finishes replaces its pass.
    idle.tick_traced(&UnitDeadline::new(1), &mut Tracer::new(&mut sink))
        .expect("slice");
    idle.dispatch(button, "click");
    while idle.root().has_pending_work() {
        idle.tick_traced(&UnitDeadline::new(10), &mut Tracer::new(&mut sink))
            .expect("slice");
    }
    assert_eq!(idle.markup(), "<button>off</button>", "toggled twice");
    assert_eq!(
        sink.0,
        [
            Event::Begin(2, PassReason::StateUpdate),
            Event::Slice(SliceOutcome::Yielded, 1),
            Event::Discarded(2),
            Event::Begin(3, PassReason::StateUpdate),
            Event::Commit(3, 0, 3, 0),
            Event::Slice(SliceOutcome::Completed, 4),
        ]
    );
}
