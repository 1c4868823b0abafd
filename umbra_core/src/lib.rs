// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pre-paint occlusion culling for compositors.
//!
//! `umbra_core` decides, before a frame is painted, which screen area each
//! window actually needs to paint, so that pixels about to be covered by an
//! opaque window above are never drawn. It is `no_std` compatible (with
//! `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   LayerStore (set_* mutations)
//!       │
//!       ▼
//!   LayerStore::evaluate() ──► world transforms, paint opacity, hidden
//!       │
//!       ▼
//!   OcclusionPass::run()
//!       ├─ cull:  windows topmost first, Region subtracted in place
//!       ├─ paint: Painter reads each layer's visible region
//!       └─ reset: recorded regions cleared (drop guard)
//! ```
//!
//! **[`geometry`]**: integer pixel rectangles and screen-space quads.
//!
//! **[`region`]**: [`Region`](region::Region), a set of disjoint pixel
//! rectangles with subtraction, intersection and containment tests.
//!
//! **[`classify`]**: decides from a projected quad whether a layer is an
//! unscaled, unrotated rectangle on the pixel grid, using exact 24.8
//! fixed-point comparisons.
//!
//! **[`cull`]**: the [`SceneGraph`](cull::SceneGraph) /
//! [`Cullable`](cull::Cullable) traits, the scoped
//! [`CullFrame`](cull::CullFrame) that keeps region translation paired, and
//! the default topmost-first child recursion.
//!
//! **[`layer`]**: struct-of-arrays layer tree with generational handles;
//! implements the culling traits by dispatching on
//! [`LayerKind`](layer::LayerKind).
//!
//! **[`dirty`]**: dirty-tracking channels via `understory_dirty`.
//!
//! **[`occlusion`]**: [`OcclusionPass`](occlusion::OcclusionPass), the
//! per-frame cull, paint and reset driver, and the
//! [`Painter`](occlusion::Painter) seam.
//!
//! **[`transform`]**: 4×4 transform with point projection.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) events with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-layer
//!   visible rectangle events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod classify;
pub mod cull;
pub mod dirty;
pub mod geometry;
pub mod layer;
pub mod occlusion;
pub mod region;
pub mod trace;
pub mod transform;
