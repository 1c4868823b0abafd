// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The cullable capability and its default child recursion.
//!
//! Culling walks a scene top-to-bottom carrying two regions:
//!
//! - the **unobscured** region: screen area not yet covered by anything
//!   opaque, independent of what the current paint is clipped to;
//! - the **clip** region: the part of the current paint that still needs
//!   pixels.
//!
//! Every node that takes part is handed both regions in its *own* coordinate
//! space through a [`CullFrame`]. It may record what it needs to paint and, if
//! it is opaque somewhere, subtract that area so nodes beneath it skip it.
//!
//! The scene is reached through two traits. [`SceneGraph`] is the read-only
//! query surface (visibility, effects, size, projected quad, opacity, child
//! order). [`Cullable`] adds the per-node capability: [`Cullable::cull_out`]
//! and [`Cullable::reset_culling`], dispatched by node so that an
//! implementation can select behaviour from the node's kind.
//!
//! # Frame discipline
//!
//! Entering a child's coordinate space translates both regions in place.
//! [`CullFrame::enter`] returns a [`LocalFrame`] guard that translates them
//! back when dropped, so the parent's frame is restored on every exit path,
//! including early returns and unwinding.

use core::ops::{Deref, DerefMut};

use crate::classify::classify;
use crate::geometry::Quad;
use crate::region::Region;
use crate::trace::{NodeCulledEvent, NodeSkippedEvent, SkipReason, Tracer};

/// Read-only scene queries consumed by culling.
///
/// Children are reached back-to-front through [`last_child`] and
/// [`prev_sibling`] so that the walk holds no borrow of the scene while a
/// child is being culled.
///
/// [`last_child`]: Self::last_child
/// [`prev_sibling`]: Self::prev_sibling
pub trait SceneGraph {
    /// Node handle.
    type Node: Copy;

    /// Topmost child of `node` in paint order.
    fn last_child(&self, node: Self::Node) -> Option<Self::Node>;

    /// Sibling painted immediately before `node`.
    fn prev_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// Whether the node is shown.
    fn is_visible(&self, node: Self::Node) -> bool;

    /// Whether any visual effect is attached to the node.
    fn has_effects(&self, node: Self::Node) -> bool;

    /// Untransformed logical size.
    fn size(&self, node: Self::Node) -> kurbo::Size;

    /// The node's corners projected to screen space.
    fn screen_quad(&self, node: Self::Node) -> Quad;

    /// Accumulated paint opacity, where 255 is fully opaque.
    fn paint_opacity(&self, node: Self::Node) -> u8;

    /// Whether the node implements the cullable capability.
    fn is_cullable(&self, node: Self::Node) -> bool;

    /// Stable index used in trace events.
    fn trace_index(&self, node: Self::Node) -> u32;
}

/// Per-node culling behaviour.
pub trait Cullable: SceneGraph {
    /// Culls `node` with both regions expressed in the node's local space.
    ///
    /// The node may record the part of itself that needs painting and may
    /// subtract areas where it is fully opaque. It must never add area to
    /// either region, and must not assume anything outside its own bounds.
    fn cull_out(&mut self, node: Self::Node, frame: &mut CullFrame<'_, '_>);

    /// Discards anything recorded by [`cull_out`](Self::cull_out).
    ///
    /// Calling this on a node that was never culled, or twice, is a no-op.
    fn reset_culling(&mut self, node: Self::Node);
}

/// Per-pass bookkeeping shared by every frame of one traversal.
#[derive(Debug)]
pub struct CullContext<'t> {
    tracer: Tracer<'t>,
    frame_index: u64,
    culled: u32,
    skipped: u32,
}

impl<'t> CullContext<'t> {
    /// Creates the context for one pass.
    #[must_use]
    pub fn new(frame_index: u64, tracer: Tracer<'t>) -> Self {
        Self {
            tracer,
            frame_index,
            culled: 0,
            skipped: 0,
        }
    }

    /// Frame counter of the pass.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Nodes entered so far.
    #[must_use]
    pub fn culled(&self) -> u32 {
        self.culled
    }

    /// Nodes skipped so far.
    #[must_use]
    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    /// The tracer events are reported through.
    pub fn tracer(&mut self) -> &mut Tracer<'t> {
        &mut self.tracer
    }
}

/// The two culling regions, expressed relative to one node's frame.
///
/// `origin` is the screen-space pixel position of the frame's `(0, 0)`.
#[derive(Debug)]
pub struct CullFrame<'a, 't> {
    unobscured: &'a mut Region,
    clip: &'a mut Region,
    origin: (i32, i32),
    cx: &'a mut CullContext<'t>,
}

impl<'a, 't> CullFrame<'a, 't> {
    /// Wraps screen-space regions in the root frame (origin `(0, 0)`).
    pub fn new(
        unobscured: &'a mut Region,
        clip: &'a mut Region,
        cx: &'a mut CullContext<'t>,
    ) -> Self {
        Self {
            unobscured,
            clip,
            origin: (0, 0),
            cx,
        }
    }

    /// Screen-space origin of this frame.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> (i32, i32) {
        self.origin
    }

    /// Area not covered by anything opaque above, in local coordinates.
    #[inline]
    #[must_use]
    pub fn unobscured(&self) -> &Region {
        self.unobscured
    }

    /// Area of the current paint still needing pixels, in local coordinates.
    #[inline]
    #[must_use]
    pub fn clip(&self) -> &Region {
        self.clip
    }

    /// Mutable access to the unobscured region.
    #[inline]
    pub fn unobscured_mut(&mut self) -> &mut Region {
        self.unobscured
    }

    /// Mutable access to the clip region.
    #[inline]
    pub fn clip_mut(&mut self) -> &mut Region {
        self.clip
    }

    /// Removes an opaque area (local coordinates) from both regions.
    pub fn subtract(&mut self, opaque: &Region) {
        self.unobscured.subtract(opaque);
        self.clip.subtract(opaque);
    }

    /// The pass-wide context.
    pub fn context(&mut self) -> &mut CullContext<'t> {
        self.cx
    }

    /// Translates both regions into the frame whose screen origin is
    /// `origin`, returning a guard that restores this frame on drop.
    pub fn enter(&mut self, origin: (i32, i32)) -> LocalFrame<'_, 't> {
        let dx = origin.0 - self.origin.0;
        let dy = origin.1 - self.origin.1;
        self.unobscured.translate(-dx, -dy);
        self.clip.translate(-dx, -dy);
        LocalFrame {
            frame: CullFrame {
                unobscured: &mut *self.unobscured,
                clip: &mut *self.clip,
                origin,
                cx: &mut *self.cx,
            },
            dx,
            dy,
        }
    }

    fn note_culled(&mut self, trace_index: u32) {
        self.cx.culled += 1;
        let e = NodeCulledEvent {
            frame_index: self.cx.frame_index,
            layer_index: trace_index,
            origin: self.origin,
            visible_area: self.clip.area(),
        };
        self.cx.tracer.node_culled(&e);
    }

    pub(crate) fn note_skipped(&mut self, trace_index: u32, reason: SkipReason) {
        self.cx.skipped += 1;
        let e = NodeSkippedEvent {
            frame_index: self.cx.frame_index,
            layer_index: trace_index,
            reason,
        };
        self.cx.tracer.node_skipped(&e);
    }
}

/// A child's frame, entered with [`CullFrame::enter`].
///
/// Dropping the guard translates both regions back into the parent frame.
#[derive(Debug)]
pub struct LocalFrame<'a, 't> {
    frame: CullFrame<'a, 't>,
    dx: i32,
    dy: i32,
}

impl<'a, 't> Deref for LocalFrame<'a, 't> {
    type Target = CullFrame<'a, 't>;

    fn deref(&self) -> &Self::Target {
        &self.frame
    }
}

impl DerefMut for LocalFrame<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.frame
    }
}

impl Drop for LocalFrame<'_, '_> {
    fn drop(&mut self) {
        self.frame.unobscured.translate(self.dx, self.dy);
        self.frame.clip.translate(self.dx, self.dy);
    }
}

/// Decides whether `node` can take part in culling, returning its
/// screen-space pixel origin if so.
///
/// Checks run in order: visibility, attached effects, capability, and finally
/// [`classify`] on the projected quad. Effects are excluded because they can
/// change both the painted area and its opacity, and because effects that
/// cache their rendering would be corrupted by clipped redraws.
pub fn cull_origin<S: SceneGraph + ?Sized>(scene: &S, node: S::Node) -> Result<(i32, i32), SkipReason> {
    if !scene.is_visible(node) {
        return Err(SkipReason::Hidden);
    }
    if scene.has_effects(node) {
        return Err(SkipReason::Effects);
    }
    if !scene.is_cullable(node) {
        return Err(SkipReason::NotCullable);
    }
    let size = scene.size(node);
    classify(&scene.screen_quad(node), size.width, size.height)
        .origin()
        .ok_or(SkipReason::Transformed)
}

/// Culls the children of `parent`, topmost first.
///
/// Each child that passes [`cull_origin`] is culled inside its own frame;
/// the rest are skipped, which leaves them painting in full and leaves the
/// regions untouched for the siblings beneath them.
pub fn cull_out_children<S: Cullable + ?Sized>(
    scene: &mut S,
    parent: S::Node,
    frame: &mut CullFrame<'_, '_>,
) {
    let mut next = scene.last_child(parent);
    while let Some(child) = next {
        next = scene.prev_sibling(child);
        let index = scene.trace_index(child);
        match cull_origin(scene, child) {
            Ok(origin) => {
                let mut local = frame.enter(origin);
                local.note_culled(index);
                scene.cull_out(child, &mut local);
            }
            Err(reason) => frame.note_skipped(index, reason),
        }
    }
}

/// Resets every cullable child of `parent`.
pub fn reset_culling_children<S: Cullable + ?Sized>(scene: &mut S, parent: S::Node) {
    let mut next = scene.last_child(parent);
    while let Some(child) = next {
        next = scene.prev_sibling(child);
        if scene.is_cullable(child) {
            scene.reset_culling(child);
        }
    }
}
