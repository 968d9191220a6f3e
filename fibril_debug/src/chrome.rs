// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Trace events carry no wall-clock time, so the exporter uses a logical
//! clock: the `n`th recorded event sits at `n` microseconds. Render passes
//! become duration spans on thread 0, scheduler slices become complete events
//! on thread 1, and per-fiber events become instants on thread 2.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

const TID_PASS: u32 = 0;
const TID_SLICE: u32 = 1;
const TID_FIBER: u32 = 2;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    // The pass whose span is open, if any. A pass discarded before its first
    // slice never began a span and must not end one.
    let mut open_pass: Option<u64> = None;
    let mut slice_start: u64 = 0;

    for (ts, recorded) in (0_u64..).zip(decode(bytes)) {
        match recorded {
            RecordedEvent::PassBegin(e) => {
                if let Some(pass) = open_pass.take() {
                    events.push(end_pass(pass, ts, "superseded"));
                }
                open_pass = Some(e.pass);
                events.push(json!({
                    "ph": "B",
                    "name": format!("pass {}", e.pass),
                    "cat": "Pass",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_PASS,
                    "args": {
                        "pass": e.pass,
                        "reason": format!("{:?}", e.reason),
                    }
                }));
            }
            RecordedEvent::PassDiscarded(e) => {
                if open_pass == Some(e.pass) {
                    open_pass = None;
                    events.push(end_pass(e.pass, ts, "discarded"));
                }
                events.push(json!({
                    "ph": "i",
                    "name": "PassDiscarded",
                    "cat": "Pass",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_PASS,
                    "s": "t",
                    "args": {
                        "pass": e.pass,
                        "units": e.units,
                    }
                }));
            }
            RecordedEvent::Slice(e) => {
                events.push(json!({
                    "ph": "X",
                    "name": format!("{:?}", e.outcome),
                    "cat": "Scheduler",
                    "ts": slice_start,
                    "dur": ts + 1 - slice_start,
                    "pid": 0,
                    "tid": TID_SLICE,
                    "args": {
                        "slice": e.slice,
                        "pass": e.pass,
                        "units": e.units,
                    }
                }));
                slice_start = ts + 1;
            }
            RecordedEvent::Unit { pass, fiber, kind } => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{kind:?}"),
                    "cat": "Unit",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_FIBER,
                    "s": "t",
                    "args": {
                        "pass": pass,
                        "fiber": fiber.index,
                    }
                }));
            }
            RecordedEvent::Effect { pass, fiber, tag } => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{tag:?}"),
                    "cat": "Effect",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_FIBER,
                    "s": "t",
                    "args": {
                        "pass": pass,
                        "fiber": fiber.index,
                        "fiber_pass": fiber.pass,
                    }
                }));
            }
            RecordedEvent::Commit(e) => {
                if open_pass == Some(e.pass) {
                    open_pass = None;
                    events.push(end_pass(e.pass, ts, "committed"));
                }
                events.push(json!({
                    "ph": "i",
                    "name": "Commit",
                    "cat": "Pass",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_PASS,
                    "s": "t",
                    "args": {
                        "pass": e.pass,
                        "placements": e.placements,
                        "updates": e.updates,
                        "deletions": e.deletions,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn end_pass(pass: u64, ts: u64, how: &str) -> Value {
    json!({
        "ph": "E",
        "name": format!("pass {pass}"),
        "cat": "Pass",
        "ts": ts,
        "pid": 0,
        "tid": TID_PASS,
        "args": {
            "end": how,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use fibril_core::trace::{
        CommitEvent, PassBeginEvent, PassDiscardedEvent, PassReason, SliceEvent, SliceOutcome,
        TraceSink,
    };

    fn exported(rec: &RecorderSink) -> Vec<Value> {
        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        serde_json::from_str(&json_str).unwrap()
    }

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_pass_begin(&PassBeginEvent {
            pass: 1,
            reason: PassReason::Mount,
        });
        rec.on_slice(&SliceEvent {
            slice: 0,
            pass: Some(1),
            units: 4,
            outcome: SliceOutcome::Yielded,
        });
        rec.on_commit(&CommitEvent {
            pass: 1,
            placements: 3,
            updates: 0,
            deletions: 0,
        });
        rec.on_slice(&SliceEvent {
            slice: 1,
            pass: Some(1),
            units: 2,
            outcome: SliceOutcome::Completed,
        });

        let parsed = exported(&rec);
        let phases: Vec<_> = parsed.iter().map(|e| e["ph"].as_str().unwrap()).collect();
        assert_eq!(phases, ["B", "X", "E", "i", "X"]);

        assert_eq!(parsed[0]["name"], "pass 1");
        assert_eq!(parsed[2]["args"]["end"], "committed");
        assert_eq!(parsed[3]["args"]["placements"], 3);

        // Slices tile the logical timeline.
        assert_eq!(parsed[1]["ts"], 0);
        assert_eq!(parsed[1]["dur"], 2);
        assert_eq!(parsed[4]["ts"], 2);
        assert_eq!(parsed[4]["dur"], 2);
        assert_eq!(parsed[4]["name"], "Completed");
    }

    #[test]
    fn discard_closes_only_an_open_span() {
        let mut rec = RecorderSink::new();
        // Discarded before it was ever announced.
        rec.on_pass_discarded(&PassDiscardedEvent { pass: 1, units: 0 });
        rec.on_pass_begin(&PassBeginEvent {
            pass: 2,
            reason: PassReason::StateUpdate,
        });
        rec.on_pass_discarded(&PassDiscardedEvent { pass: 2, units: 5 });

        let parsed = exported(&rec);
        let phases: Vec<_> = parsed.iter().map(|e| e["ph"].as_str().unwrap()).collect();
        assert_eq!(phases, ["i", "B", "E", "i"]);
        assert_eq!(parsed[2]["args"]["end"], "discarded");
        assert_eq!(parsed[3]["args"]["units"], 5);
    }

    #[test]
    fn export_empty_recording() {
        let parsed = exported(&RecorderSink::new());
        assert!(parsed.is_empty());
    }
}
