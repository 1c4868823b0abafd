// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer tree data model.
//!
//! A *layer* is a node in the compositor's scene. Each layer has:
//!
//! - An identity ([`LayerId`]), a generational handle that goes stale when
//!   the layer is destroyed.
//! - Topology: parent, first and last child, and sibling links. Later
//!   siblings paint on top of earlier ones.
//! - **Local properties** set by the caller:
//!   [`transform`](LayerStore::set_transform),
//!   [`opacity`](LayerStore::set_opacity), [`size`](LayerStore::set_size),
//!   [`shape`](LayerStore::set_shape), [`content`](LayerStore::set_content),
//!   [`flags`](LayerStore::set_flags) and [`kind`](LayerStore::set_kind).
//! - **Computed properties** produced by [`evaluate`](LayerStore::evaluate):
//!   world transform, paint opacity and effective hidden state.
//! - **Culling results** written by the occlusion pass and cleared after
//!   paint: [`visible_region`](LayerStore::visible_region),
//!   [`unobscured_region`](LayerStore::unobscured_region),
//!   [`beneath_region`](LayerStore::beneath_region) and
//!   [`shadow_needs_paint`](LayerStore::shadow_needs_paint).
//!
//! [`LayerKind`] selects how a layer culls. The store implements
//! [`SceneGraph`](crate::cull::SceneGraph) and
//! [`Cullable`](crate::cull::Cullable) by dispatching on it.

mod cull;
mod evaluate;
mod id;
mod kind;
mod store;
mod traverse;

pub use evaluate::FrameChanges;
pub use id::{INVALID, LayerId, SurfaceId};
pub use kind::{LayerKind, WindowProps};
pub use store::{LayerFlags, LayerStore};
pub use traverse::Children;
