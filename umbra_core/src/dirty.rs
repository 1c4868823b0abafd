// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channels for the layer tree.
//!
//! Property setters on [`LayerStore`](crate::layer::LayerStore) mark one of
//! these [`understory_dirty`] channels; [`evaluate`] drains them all.
//!
//! - [`TRANSFORM`] and [`OPACITY`] are marked with
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) over child-to-parent
//!   dependency edges, so marking a layer also marks its descendants. Hidden
//!   and effect flag changes ride on [`TRANSFORM`] because effective hidden
//!   state is inherited the same way.
//! - [`SHAPE`] and [`CONTENT`] are local. Size, input shape and kind changes
//!   go through [`SHAPE`]; surface attachment goes through [`CONTENT`].
//! - [`TOPOLOGY`] records structural edits and forces a traversal rebuild.
//!
//! [`evaluate`]: crate::layer::LayerStore::evaluate

use understory_dirty::Channel;

/// World transform or hidden state must be recomputed for the subtree.
pub const TRANSFORM: Channel = Channel::new(0);

/// Paint opacity must be recomputed for the subtree.
pub const OPACITY: Channel = Channel::new(1);

/// Size, shape region or kind changed.
pub const SHAPE: Channel = Channel::new(2);

/// Attached surface changed.
pub const CONTENT: Channel = Channel::new(3);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(4);
