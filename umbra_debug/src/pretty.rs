// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use umbra_core::geometry::IntRect;
use umbra_core::trace::{
    NodeCulledEvent, NodeSkippedEvent, PassBeginEvent, PassSummary, PhaseBeginEvent,
    PhaseEndEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    rects: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("rects", &self.rects)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            rects: false,
        }
    }

    /// Also prints every rectangle of each node's visible region.
    ///
    /// Off by default; a busy desktop produces a lot of output.
    #[must_use]
    pub fn with_rects(mut self, rects: bool) -> Self {
        self.rects = rects;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        let s = e.surface;
        let _ = writeln!(
            self.writer,
            "[pass] frame={} surface={}x{}+{}+{}",
            e.frame_index, s.width, s.height, s.x, s.y,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {}",
            e.frame_index,
            e.phase.as_str(),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {}",
            e.frame_index,
            e.phase.as_str(),
        );
    }

    fn on_node_culled(&mut self, e: &NodeCulledEvent) {
        let _ = writeln!(
            self.writer,
            "[cull] frame={} layer={} origin=({},{}) visible={}px",
            e.frame_index, e.layer_index, e.origin.0, e.origin.1, e.visible_area,
        );
    }

    fn on_node_skipped(&mut self, e: &NodeSkippedEvent) {
        let _ = writeln!(
            self.writer,
            "[skip] frame={} layer={} reason={}",
            e.frame_index,
            e.layer_index,
            e.reason.as_str(),
        );
    }

    fn on_pass_summary(&mut self, s: &PassSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] frame={} culled={} skipped={} occluded={}px remaining={}px",
            s.frame_index,
            s.culled,
            s.skipped,
            s.occluded_area(),
            s.remaining_area,
        );
    }

    fn on_visible_rects(&mut self, frame_index: u64, layer_index: u32, rects: &[IntRect]) {
        let area: u64 = rects.iter().map(|r| r.area()).sum();
        let _ = writeln!(
            self.writer,
            "[visible] frame={frame_index} layer={layer_index} rects={} area={area}px",
            rects.len(),
        );
        if self.rects {
            for r in rects {
                let _ = writeln!(
                    self.writer,
                    "    {}x{}+{}+{}",
                    r.width, r.height, r.x, r.y
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use umbra_core::trace::{PhaseKind, SkipReason};

    use super::*;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn one_line_per_event() {
        let mut sink = PrettyPrintSink::with_writer(Vec::new());
        sink.on_phase_begin(&PhaseBeginEvent {
            frame_index: 3,
            phase: PhaseKind::Cull,
        });
        sink.on_node_skipped(&NodeSkippedEvent {
            frame_index: 3,
            layer_index: 7,
            reason: SkipReason::NotCullable,
        });
        sink.on_phase_end(&PhaseEndEvent {
            frame_index: 3,
            phase: PhaseKind::Cull,
        });

        let text = output(sink);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "[phase:begin] frame=3 cull",
                "[skip] frame=3 layer=7 reason=not-cullable",
                "[phase:end] frame=3 cull",
            ]
        );
    }

    #[test]
    fn summary_reports_occluded_area() {
        let mut sink = PrettyPrintSink::with_writer(Vec::new());
        sink.on_pass_summary(&PassSummary {
            frame_index: 0,
            culled: 3,
            skipped: 0,
            surface_area: 1000,
            remaining_area: 250,
        });
        assert_eq!(
            output(sink),
            "[summary] frame=0 culled=3 skipped=0 occluded=750px remaining=250px\n"
        );
    }

    #[test]
    fn rect_listing_is_opt_in() {
        let rects = [IntRect::new(0, 0, 4, 4), IntRect::new(4, 0, 2, 8)];

        let mut quiet = PrettyPrintSink::with_writer(Vec::new());
        quiet.on_visible_rects(1, 2, &rects);
        assert_eq!(output(quiet).lines().count(), 1);

        let mut loud = PrettyPrintSink::with_writer(Vec::new()).with_rects(true);
        loud.on_visible_rects(1, 2, &rects);
        let text = output(loud);
        assert!(text.starts_with("[visible] frame=1 layer=2 rects=2 area=32px\n"));
        assert!(text.contains("    2x8+4+0\n"));
    }
}
