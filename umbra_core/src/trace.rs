// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the occlusion pass.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! pass calls as it culls, paints and resets. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates the per-node visible rectangle
//!   dump ([`TraceSink::on_visible_rects`]).

use crate::geometry::IntRect;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of the pass is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Top-to-bottom region subtraction.
    Cull,
    /// The bottom-to-top real paint.
    Paint,
    /// Clearing the stored per-node regions.
    Reset,
}

impl PhaseKind {
    /// Returns a short lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cull => "cull",
            Self::Paint => "paint",
            Self::Reset => "reset",
        }
    }
}

/// Why a node was left out of culling.
///
/// A skipped node is painted in full and contributes no occlusion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The node is hidden.
    Hidden,
    /// The node has visual effects attached.
    Effects,
    /// The node does not take part in culling.
    NotCullable,
    /// The node is not an integer-translated, unscaled rectangle on screen.
    Transformed,
}

impl SkipReason {
    /// Returns a short lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Effects => "effects",
            Self::NotCullable => "not-cullable",
            Self::Transformed => "transformed",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a pass starts.
#[derive(Clone, Copy, Debug)]
pub struct PassBeginEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// The paintable surface the shared region starts from.
    pub surface: IntRect,
}

/// Marks the beginning of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
}

/// Marks the end of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
}

/// Emitted when a node is entered and handed the regions.
#[derive(Clone, Copy, Debug)]
pub struct NodeCulledEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Raw slot index of the node.
    pub layer_index: u32,
    /// Screen-space pixel origin of the node's frame.
    pub origin: (i32, i32),
    /// Pixels of the clip region still unclaimed when the node was entered.
    pub visible_area: u64,
}

/// Emitted when a child is left out of culling.
#[derive(Clone, Copy, Debug)]
pub struct NodeSkippedEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Raw slot index of the node.
    pub layer_index: u32,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Per-pass totals, emitted once the cull phase has finished.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Nodes that received regions.
    pub culled: u32,
    /// Nodes that were skipped.
    pub skipped: u32,
    /// Pixels in the paintable surface.
    pub surface_area: u64,
    /// Pixels left unclaimed after every node was visited.
    pub remaining_area: u64,
}

impl PassSummary {
    /// Pixels claimed by opaque nodes during the pass.
    #[must_use]
    pub const fn occluded_area(&self) -> u64 {
        self.surface_area.saturating_sub(self.remaining_area)
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the occlusion pass.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a pass starts.
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        _ = e;
    }

    /// Called at the beginning of a phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called when a node is entered during culling.
    fn on_node_culled(&mut self, e: &NodeCulledEvent) {
        _ = e;
    }

    /// Called when a child is left out of culling.
    fn on_node_skipped(&mut self, e: &NodeSkippedEvent) {
        _ = e;
    }

    /// Called with the per-pass totals.
    fn on_pass_summary(&mut self, s: &PassSummary) {
        _ = s;
    }

    /// Called with a node's stored visible region (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    fn on_visible_rects(&mut self, frame_index: u64, layer_index: u32, rects: &[IntRect]) {
        _ = (frame_index, layer_index, rects);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Returns a shorter-lived tracer dispatching to the same sink.
    #[inline]
    #[must_use]
    pub fn reborrow(&mut self) -> Tracer<'_> {
        #[cfg(feature = "trace")]
        {
            let sink: Option<&mut dyn TraceSink> = match &mut self.sink {
                Some(s) => Some(&mut **s),
                None => None,
            };
            Tracer { sink }
        }
        #[cfg(not(feature = "trace"))]
        {
            Tracer::none()
        }
    }

    /// Emits a [`PassBeginEvent`].
    #[inline]
    pub fn pass_begin(&mut self, e: &PassBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NodeCulledEvent`].
    #[inline]
    pub fn node_culled(&mut self, e: &NodeCulledEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_node_culled(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NodeSkippedEvent`].
    #[inline]
    pub fn node_skipped(&mut self, e: &NodeSkippedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_node_skipped(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PassSummary`].
    #[inline]
    pub fn pass_summary(&mut self, s: &PassSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_pass_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits a node's visible rectangles (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn visible_rects(&mut self, frame_index: u64, layer_index: u32, rects: &[IntRect]) {
        if let Some(s) = &mut self.sink {
            s.on_visible_rects(frame_index, layer_index, rects);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_pass_begin(&PassBeginEvent {
            frame_index: 0,
            surface: IntRect::new(0, 0, 640, 480),
        });
        sink.on_pass_summary(&PassSummary::default());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: 1,
            phase: PhaseKind::Cull,
        });
        tracer.node_skipped(&NodeSkippedEvent {
            frame_index: 1,
            layer_index: 3,
            reason: SkipReason::Effects,
        });
    }

    #[test]
    fn summary_occluded_area() {
        let s = PassSummary {
            frame_index: 0,
            culled: 3,
            skipped: 0,
            surface_area: 1000,
            remaining_area: 250,
        };
        assert_eq!(s.occluded_area(), 750);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            skipped: Vec<(u32, SkipReason)>,
        }
        impl TraceSink for RecordingSink {
            fn on_node_skipped(&mut self, e: &NodeSkippedEvent) {
                self.skipped.push((e.layer_index, e.reason));
            }
        }

        let mut sink = RecordingSink {
            skipped: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.node_skipped(&NodeSkippedEvent {
            frame_index: 9,
            layer_index: 4,
            reason: SkipReason::Transformed,
        });
        drop(tracer);
        assert_eq!(sink.skipped, &[(4, SkipReason::Transformed)]);
    }
}
