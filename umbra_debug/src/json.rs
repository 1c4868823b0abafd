// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes a JSON array with one object per event, in recorded order.
//! Every object carries a `"type"` and a `"frame"` key.

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as a pretty-printed JSON array.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes).map(|e| to_json(&e)).collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn to_json(recorded: &RecordedEvent) -> Value {
    match recorded {
        RecordedEvent::PassBegin(e) => json!({
            "type": "pass_begin",
            "frame": e.frame_index,
            "surface": [e.surface.x, e.surface.y, e.surface.width, e.surface.height],
        }),
        RecordedEvent::PhaseBegin(e) => json!({
            "type": "phase_begin",
            "frame": e.frame_index,
            "phase": e.phase.as_str(),
        }),
        RecordedEvent::PhaseEnd(e) => json!({
            "type": "phase_end",
            "frame": e.frame_index,
            "phase": e.phase.as_str(),
        }),
        RecordedEvent::NodeCulled(e) => json!({
            "type": "node_culled",
            "frame": e.frame_index,
            "layer": e.layer_index,
            "origin": [e.origin.0, e.origin.1],
            "visible_area": e.visible_area,
        }),
        RecordedEvent::NodeSkipped(e) => json!({
            "type": "node_skipped",
            "frame": e.frame_index,
            "layer": e.layer_index,
            "reason": e.reason.as_str(),
        }),
        RecordedEvent::PassSummary(s) => json!({
            "type": "pass_summary",
            "frame": s.frame_index,
            "culled": s.culled,
            "skipped": s.skipped,
            "surface_area": s.surface_area,
            "remaining_area": s.remaining_area,
            "occluded_area": s.occluded_area(),
        }),
        RecordedEvent::VisibleRects {
            frame_index,
            layer_index,
            count,
            area,
        } => json!({
            "type": "visible_rects",
            "frame": frame_index,
            "layer": layer_index,
            "count": count,
            "area": area,
        }),
    }
}
