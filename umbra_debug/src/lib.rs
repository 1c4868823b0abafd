// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON export for umbra culling
//! diagnostics.
//!
//! This crate provides [`TraceSink`](umbra_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`json::export`]: writes a JSON array of events from recorded bytes.
//!
//! # Example
//!
//! ```
//! use umbra_core::geometry::IntRect;
//! use umbra_core::layer::{LayerKind, LayerStore};
//! use umbra_core::occlusion::OcclusionPass;
//! use umbra_core::trace::Tracer;
//! use umbra_debug::recorder::RecorderSink;
//!
//! let mut store = LayerStore::new();
//! let group = store.create_layer_with(LayerKind::Group, kurbo::Size::new(64.0, 64.0));
//! let _ = store.evaluate();
//!
//! let mut rec = RecorderSink::new();
//! let mut pass = OcclusionPass::new(IntRect::new(0, 0, 64, 64));
//! pass.run(&mut store, group, &mut |_: &LayerStore| {}, &mut Tracer::new(&mut rec));
//!
//! let mut json = Vec::new();
//! umbra_debug::json::export(rec.as_bytes(), &mut json).unwrap();
//! assert!(!json.is_empty());
//! ```

pub mod json;
pub mod pretty;
pub mod recorder;
