// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer kinds and the per-layer regions recorded by culling.

use crate::geometry::IntRect;
use crate::region::Region;

/// What a layer is, which decides how it takes part in culling.
///
/// Every kind except [`Plain`](Self::Plain) is cullable.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LayerKind {
    /// An ordinary layer. Never culled; its subtree paints in full.
    #[default]
    Plain,
    /// A container whose children are culled topmost first.
    Group,
    /// A textured leaf, opaque over `opaque` (local coordinates) when its
    /// paint opacity is 255.
    Surface {
        /// Area known to be fully opaque, if any.
        opaque: Option<Region>,
    },
    /// A top-level window frame.
    Window(WindowProps),
    /// A desktop background. Records what is left but never occludes.
    Background,
}

impl LayerKind {
    /// Whether layers of this kind take part in culling.
    #[inline]
    #[must_use]
    pub const fn is_cullable(&self) -> bool {
        !matches!(self, Self::Plain)
    }
}

/// Properties of a [`LayerKind::Window`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowProps {
    /// The window content carries an alpha channel, so it never occludes
    /// even at full paint opacity.
    pub argb32: bool,
    /// Drop shadow bounds in window-local coordinates.
    pub shadow: Option<IntRect>,
}

/// Regions a layer recorded during the last cull.
///
/// All regions are in the layer's local coordinates.
#[derive(Clone, Debug)]
pub(crate) struct CullState {
    /// Part of the layer that still needs pixels.
    pub(crate) visible: Option<Region>,
    /// Part of the layer not covered by anything opaque above it.
    pub(crate) unobscured: Option<Region>,
    /// Clip left for whatever paints beneath this layer.
    pub(crate) beneath: Option<Region>,
    pub(crate) shadow_needs_paint: bool,
}

impl CullState {
    pub(crate) const CLEARED: Self = Self {
        visible: None,
        unobscured: None,
        beneath: None,
        shadow_needs_paint: true,
    };

    pub(crate) fn clear(&mut self) {
        *self = Self::CLEARED;
    }
}

impl Default for CullState {
    fn default() -> Self {
        Self::CLEARED
    }
}
