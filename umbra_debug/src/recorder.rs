// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Visible rectangle dumps ([`on_visible_rects`](TraceSink::on_visible_rects))
//! store only the rectangle count and total area.

use umbra_core::geometry::IntRect;
use umbra_core::trace::{
    NodeCulledEvent, NodeSkippedEvent, PassBeginEvent, PassSummary, PhaseBeginEvent,
    PhaseEndEvent, PhaseKind, SkipReason, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PASS_BEGIN: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_NODE_CULLED: u8 = 4;
const TAG_NODE_SKIPPED: u8 = 5;
const TAG_PASS_SUMMARY: u8 = 6;
const TAG_VISIBLE_RECTS: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Drops everything recorded so far.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_rect(&mut self, r: IntRect) {
        self.write_i32(r.x);
        self.write_i32(r.y);
        self.write_i32(r.width);
        self.write_i32(r.height);
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Cull => 0,
            PhaseKind::Paint => 1,
            PhaseKind::Reset => 2,
        });
    }

    fn write_reason(&mut self, r: SkipReason) {
        self.write_u8(match r {
            SkipReason::Hidden => 0,
            SkipReason::Effects => 1,
            SkipReason::NotCullable => 2,
            SkipReason::Transformed => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.write_u8(TAG_PASS_BEGIN);
        self.write_u64(e.frame_index);
        self.write_rect(e.surface);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
    }

    fn on_node_culled(&mut self, e: &NodeCulledEvent) {
        self.write_u8(TAG_NODE_CULLED);
        self.write_u64(e.frame_index);
        self.write_u32(e.layer_index);
        self.write_i32(e.origin.0);
        self.write_i32(e.origin.1);
        self.write_u64(e.visible_area);
    }

    fn on_node_skipped(&mut self, e: &NodeSkippedEvent) {
        self.write_u8(TAG_NODE_SKIPPED);
        self.write_u64(e.frame_index);
        self.write_u32(e.layer_index);
        self.write_reason(e.reason);
    }

    fn on_pass_summary(&mut self, s: &PassSummary) {
        self.write_u8(TAG_PASS_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_u32(s.culled);
        self.write_u32(s.skipped);
        self.write_u64(s.surface_area);
        self.write_u64(s.remaining_area);
    }

    fn on_visible_rects(&mut self, frame_index: u64, layer_index: u32, rects: &[IntRect]) {
        self.write_u8(TAG_VISIBLE_RECTS);
        self.write_u64(frame_index);
        self.write_u32(layer_index);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "rect count capped at u32::MAX for recording"
        )]
        self.write_u32(rects.len().min(u32::MAX as usize) as u32);
        self.write_u64(rects.iter().map(|r| r.area()).sum());
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`PassBeginEvent`].
    PassBegin(PassBeginEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`NodeCulledEvent`].
    NodeCulled(NodeCulledEvent),
    /// A [`NodeSkippedEvent`].
    NodeSkipped(NodeSkippedEvent),
    /// A [`PassSummary`].
    PassSummary(PassSummary),
    /// Shape of a node's stored visible region.
    VisibleRects {
        /// Frame counter.
        frame_index: u64,
        /// Raw slot index of the node.
        layer_index: u32,
        /// Number of rectangles in the region.
        count: u32,
        /// Total pixel area of the region.
        area: u64,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?;
        self.pos += N;
        bytes.try_into().ok()
    }

    fn read_u8(&mut self) -> Option<u8> {
        let [v] = self.read_array::<1>()?;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    fn read_rect(&mut self) -> Option<IntRect> {
        Some(IntRect::new(
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
        ))
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Cull,
            1 => PhaseKind::Paint,
            _ => PhaseKind::Reset,
        })
    }

    fn read_reason(&mut self) -> Option<SkipReason> {
        Some(match self.read_u8()? {
            0 => SkipReason::Hidden,
            1 => SkipReason::Effects,
            2 => SkipReason::NotCullable,
            _ => SkipReason::Transformed,
        })
    }

    fn decode_pass_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassBegin(PassBeginEvent {
            frame_index: self.read_u64()?,
            surface: self.read_rect()?,
        }))
    }

    fn decode_node_culled(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::NodeCulled(NodeCulledEvent {
            frame_index: self.read_u64()?,
            layer_index: self.read_u32()?,
            origin: (self.read_i32()?, self.read_i32()?),
            visible_area: self.read_u64()?,
        }))
    }

    fn decode_node_skipped(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::NodeSkipped(NodeSkippedEvent {
            frame_index: self.read_u64()?,
            layer_index: self.read_u32()?,
            reason: self.read_reason()?,
        }))
    }

    fn decode_pass_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassSummary(PassSummary {
            frame_index: self.read_u64()?,
            culled: self.read_u32()?,
            skipped: self.read_u32()?,
            surface_area: self.read_u64()?,
            remaining_area: self.read_u64()?,
        }))
    }

    fn decode_visible_rects(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::VisibleRects {
            frame_index: self.read_u64()?,
            layer_index: self.read_u32()?,
            count: self.read_u32()?,
            area: self.read_u64()?,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_PASS_BEGIN => self.decode_pass_begin(),
            TAG_PHASE_BEGIN => Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
                frame_index: self.read_u64()?,
                phase: self.read_phase()?,
            })),
            TAG_PHASE_END => Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
                frame_index: self.read_u64()?,
                phase: self.read_phase()?,
            })),
            TAG_NODE_CULLED => self.decode_node_culled(),
            TAG_NODE_SKIPPED => self.decode_node_skipped(),
            TAG_PASS_SUMMARY => self.decode_pass_summary(),
            TAG_VISIBLE_RECTS => self.decode_visible_rects(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
