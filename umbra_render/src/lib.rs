// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plans built from culled layer trees.
//!
//! This crate sits between [`umbra_core`]'s occlusion pass and a backend that
//! actually draws. [`RenderPlan`] implements
//! [`Painter`](umbra_core::occlusion::Painter): during the paint phase it
//! walks the evaluated layer tree back to front and records one or more
//! [`RenderItem`]s per drawable layer, clipped to what culling left visible.
//!
//! - [`RenderItem`]: a single draw command
//! - [`RenderPlan`]: the ordered draw commands for one frame
//! - [`BlendMode`]: how an item composites over what is beneath it

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod plan;

pub use plan::{BlendMode, DEFAULT_MAX_CLIP_RECTS, RenderItem, RenderPlan};
