// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated idle loop that exercises the tracing and diagnostics pipeline.
//!
//! Mounts a small counter list into a
//! [`MemoryHost`](fibril_harness::MemoryHost), clicks its buttons between
//! idle callbacks (one click lands mid-pass and restarts it), and records
//! every event to both a
//! [`PrettyPrintSink`](fibril_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](fibril_debug::recorder::RecorderSink), then exports a
//! Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;

use fibril_core::trace::{TraceSink, Tracer};
use fibril_core::{Element, EventHandler, Hooks, Props, SchedulerConfig};
use fibril_debug::Fanout;
use fibril_debug::pretty::PrettyPrintSink;
use fibril_debug::recorder::RecorderSink;
use fibril_harness::{IdleLoop, UnitDeadline};

/// Units of work each simulated idle callback has room for.
const UNITS_PER_CALLBACK: u32 = 3;
const COUNTERS: usize = 3;

fn counter(hooks: &mut Hooks<'_>, props: &Props) -> Vec<Element> {
    let (count, set_count) = hooks.use_state(0_i64);
    let increment = EventHandler::new(move || set_count.update(|n| n + 1));
    let label = props.get_str("label").unwrap_or("counter").to_owned();
    vec![
        Element::host("li")
            .child(Element::host("span").text_child(label))
            .child(Element::host("button").on("Click", increment).text_child(count)),
    ]
}

fn app(_: &mut Hooks<'_>, _: &Props) -> Vec<Element> {
    let items = (0..COUNTERS)
        .map(|i| Element::component("Counter", counter).attr("label", format!("counter {i}")));
    vec![Element::host("ul").children(items)]
}

fn idle_callback(idle: &mut IdleLoop, sink: &mut dyn TraceSink) {
    idle.tick_traced(
        &UnitDeadline::new(UNITS_PER_CALLBACK),
        &mut Tracer::new(sink),
    )
    .expect("memory host never fails unless asked to");
}

fn main() {
    // -- sinks -------------------------------------------------------------
    let mut sink = Fanout {
        first: PrettyPrintSink::new(Box::new(std::io::stdout())),
        second: RecorderSink::new(),
    };

    // -- root --------------------------------------------------------------
    let mut idle = IdleLoop::new(SchedulerConfig::idle_callback());
    idle.render(Element::component("App", app));

    // -- mount ---------------------------------------------------------------
    while idle.root().has_pending_work() {
        idle_callback(&mut idle, &mut sink);
    }
    println!("mounted: {}", idle.markup());

    // -- clicks --------------------------------------------------------------
    let button = |idle: &IdleLoop, n: usize| {
        let list = idle.host().find_element("ul").expect("list is mounted");
        let item = idle.host().children(list)[n];
        idle.host().children(item)[1]
    };

    idle.dispatch(button(&idle, 0), "click");
    idle_callback(&mut idle, &mut sink);
    // Lands between slices of the pass above, which is thrown away.
    idle.dispatch(button(&idle, 2), "click");
    while idle.root().has_pending_work() {
        idle_callback(&mut idle, &mut sink);
    }
    // Nothing to do: the callback still runs and reports an idle slice.
    idle_callback(&mut idle, &mut sink);
    println!("after clicks: {}", idle.markup());

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    fibril_debug::chrome::export(sink.second.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({} idle callbacks)", idle.ticks());
}
