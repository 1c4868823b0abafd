// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handles for layers and the surfaces they present.

use core::fmt;

/// Sentinel slot index meaning "none" in topology arrays.
pub const INVALID: u32 = u32::MAX;

/// A generational handle to a layer in a [`LayerStore`](super::LayerStore).
///
/// A handle goes stale once its layer is destroyed, even if the slot is later
/// reused; the store rejects stale handles with a panic.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl LayerId {
    /// Raw slot index, as used in [`FrameChanges`](super::FrameChanges),
    /// the traversal order and trace events.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Generation of the slot when this handle was issued.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({}@gen{})", self.idx, self.generation)
    }
}

/// An externally owned texture or buffer a layer presents.
///
/// The store never looks inside it; it is carried through to the render plan.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceId({})", self.0)
    }
}
