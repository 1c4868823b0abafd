// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays layer storage: allocation, topology and properties.

use alloc::vec::Vec;

use kurbo::{Point, Size};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::dirty;
use crate::geometry::{IntRect, Quad};
use crate::region::Region;
use crate::transform::Transform3d;

use super::id::{INVALID, LayerId, SurfaceId};
use super::kind::{CullState, LayerKind};
use super::traverse::Children;

/// Per-layer boolean flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LayerFlags {
    /// Whether the layer and its subtree are hidden.
    pub hidden: bool,
    /// Whether a visual effect (blur, desaturation, offscreen redirect, ...)
    /// is attached. Such layers are never culled.
    pub has_effects: bool,
}

/// Struct-of-arrays storage for all layers.
///
/// Layers are addressed by [`LayerId`] handles. Destroyed slots are recycled
/// through a free list and generation counters catch stale handles.
#[derive(Debug)]
pub struct LayerStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) last_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties --
    pub(crate) local_transform: Vec<Transform3d>,
    pub(crate) local_opacity: Vec<u8>,
    pub(crate) size: Vec<Size>,
    pub(crate) shape: Vec<Option<Region>>,
    pub(crate) content: Vec<Option<SurfaceId>>,
    pub(crate) flags: Vec<LayerFlags>,
    pub(crate) kind: Vec<LayerKind>,

    // -- Computed by evaluate --
    pub(crate) world_transform: Vec<Transform3d>,
    pub(crate) paint_opacity: Vec<u8>,
    pub(crate) effective_hidden: Vec<bool>,

    // -- Written by culling --
    pub(crate) cull: Vec<CullState>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    pub(crate) dirty: DirtyTracker<u32>,

    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStore {
    /// Creates an empty layer store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            last_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            local_transform: Vec::new(),
            local_opacity: Vec::new(),
            size: Vec::new(),
            shape: Vec::new(),
            content: Vec::new(),
            flags: Vec::new(),
            kind: Vec::new(),
            world_transform: Vec::new(),
            paint_opacity: Vec::new(),
            effective_hidden: Vec::new(),
            cull: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new layer and returns its handle.
    ///
    /// The layer starts detached, [`Plain`](LayerKind::Plain), zero-sized,
    /// fully opaque, with an identity transform and no shape or content.
    pub fn create_layer(&mut self) -> LayerId {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.last_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.local_transform[i] = Transform3d::IDENTITY;
            self.local_opacity[i] = u8::MAX;
            self.size[i] = Size::ZERO;
            self.shape[i] = None;
            self.content[i] = None;
            self.flags[i] = LayerFlags::default();
            self.kind[i] = LayerKind::Plain;
            self.world_transform[i] = Transform3d::IDENTITY;
            self.paint_opacity[i] = u8::MAX;
            self.effective_hidden[i] = false;
            self.cull[i].clear();
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.last_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.local_transform.push(Transform3d::IDENTITY);
            self.local_opacity.push(u8::MAX);
            self.size.push(Size::ZERO);
            self.shape.push(None);
            self.content.push(None);
            self.flags.push(LayerFlags::default());
            self.kind.push(LayerKind::Plain);
            self.world_transform.push(Transform3d::IDENTITY);
            self.paint_opacity.push(u8::MAX);
            self.effective_hidden.push(false);
            self.cull.push(CullState::CLEARED);
            self.generation.push(0);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);

        LayerId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Creates a layer of the given kind and size.
    pub fn create_layer_with(&mut self, kind: LayerKind, size: Size) -> LayerId {
        let id = self.create_layer();
        self.kind[id.idx as usize] = kind;
        self.size[id.idx as usize] = size;
        id
    }

    /// Destroys a layer, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the layer has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_layer(&mut self, id: LayerId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy layer with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }
        self.dirty.remove_key(idx);
        self.cull[idx as usize].clear();
        self.shape[idx as usize] = None;
        self.kind[idx as usize] = LayerKind::Plain;

        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    /// Returns whether the given handle refers to a live layer.
    #[must_use]
    pub fn is_alive(&self, id: LayerId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Adds `child` as the topmost child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: LayerId, child: LayerId) {
        self.validate(parent);
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] == INVALID,
            "child already has a parent"
        );
        self.link_last(parent.idx, child.idx);
    }

    /// Detaches `child` from its parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the layer has no parent.
    pub fn remove_from_parent(&mut self, child: LayerId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "layer has no parent");
        self.detach(c);
        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
    }

    /// Moves `child` to be the topmost child of `new_parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `new_parent` is `child` itself
    /// or one of its descendants.
    pub fn reparent(&mut self, child: LayerId, new_parent: LayerId) {
        self.validate(child);
        self.validate(new_parent);
        assert!(
            !self.is_ancestor_or_self(child.idx, new_parent.idx),
            "cannot reparent a layer under its own subtree"
        );
        if self.parent[child.idx as usize] != INVALID {
            self.detach(child.idx);
        }
        self.link_last(new_parent.idx, child.idx);
    }

    /// Inserts `child` directly beneath `sibling` in paint order.
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `child` already has a parent, or `sibling`
    /// has no parent.
    pub fn insert_before(&mut self, child: LayerId, sibling: LayerId) {
        self.validate(child);
        self.validate(sibling);
        let c = child.idx;
        let s = sibling.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");

        let prev = self.prev_sibling[s as usize];
        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = prev;
        if prev == INVALID {
            self.first_child[p as usize] = c;
        } else {
            self.next_sibling[prev as usize] = c;
        }
        self.prev_sibling[s as usize] = c;

        self.attach_dependencies(c, p);
    }

    /// Returns the parent of a layer, if any.
    #[must_use]
    pub fn parent(&self, id: LayerId) -> Option<LayerId> {
        self.validate(id);
        self.handle(self.parent[id.idx as usize])
    }

    /// Iterates the direct children of a layer in paint order (bottom first).
    #[must_use]
    pub fn children(&self, id: LayerId) -> Children<'_> {
        self.validate(id);
        Children::back_to_front(self, self.first_child[id.idx as usize])
    }

    /// Iterates the direct children of a layer topmost first.
    #[must_use]
    pub fn children_rev(&self, id: LayerId) -> Children<'_> {
        self.validate(id);
        Children::front_to_back(self, self.last_child[id.idx as usize])
    }

    /// Returns all live layers with no parent.
    #[must_use]
    pub fn roots(&self) -> Vec<LayerId> {
        (0..self.len)
            .filter(|idx| self.parent[*idx as usize] == INVALID && !self.free_list.contains(idx))
            .filter_map(|idx| self.handle(idx))
            .collect()
    }

    // -- Property getters --

    /// Returns the local transform of a layer.
    #[must_use]
    pub fn local_transform(&self, id: LayerId) -> Transform3d {
        self.validate(id);
        self.local_transform[id.idx as usize]
    }

    /// Returns the local opacity of a layer.
    #[must_use]
    pub fn local_opacity(&self, id: LayerId) -> u8 {
        self.validate(id);
        self.local_opacity[id.idx as usize]
    }

    /// Returns the untransformed size of a layer.
    #[must_use]
    pub fn size(&self, id: LayerId) -> Size {
        self.validate(id);
        self.size[id.idx as usize]
    }

    /// Returns the input shape of a layer, in local coordinates.
    #[must_use]
    pub fn shape(&self, id: LayerId) -> Option<&Region> {
        self.validate(id);
        self.shape[id.idx as usize].as_ref()
    }

    /// Returns the surface a layer presents.
    #[must_use]
    pub fn content(&self, id: LayerId) -> Option<SurfaceId> {
        self.validate(id);
        self.content[id.idx as usize]
    }

    /// Returns the flags of a layer.
    #[must_use]
    pub fn flags(&self, id: LayerId) -> LayerFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Returns the kind of a layer.
    #[must_use]
    pub fn kind(&self, id: LayerId) -> &LayerKind {
        self.validate(id);
        &self.kind[id.idx as usize]
    }

    /// Returns the computed world transform.
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn world_transform(&self, id: LayerId) -> Transform3d {
        self.validate(id);
        self.world_transform[id.idx as usize]
    }

    /// Returns the accumulated paint opacity, 255 meaning fully opaque.
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn paint_opacity(&self, id: LayerId) -> u8 {
        self.validate(id);
        self.paint_opacity[id.idx as usize]
    }

    /// Returns whether the layer or any ancestor is hidden.
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn effective_hidden(&self, id: LayerId) -> bool {
        self.validate(id);
        self.effective_hidden[id.idx as usize]
    }

    /// Returns whether the layer is shown.
    #[must_use]
    pub fn is_visible(&self, id: LayerId) -> bool {
        !self.effective_hidden(id)
    }

    /// Returns whether the layer has visual effects attached.
    #[must_use]
    pub fn has_effects(&self, id: LayerId) -> bool {
        self.flags(id).has_effects
    }

    /// Returns the layer's corners projected to screen space, in the winding
    /// documented on [`Quad`].
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn screen_quad(&self, id: LayerId) -> Quad {
        self.validate(id);
        self.screen_quad_at(id.idx)
    }

    // -- Culling results --

    /// The region the layer still needs to paint, recorded by the last cull.
    ///
    /// `None` outside a pass, or if the layer was not culled.
    #[must_use]
    pub fn visible_region(&self, id: LayerId) -> Option<&Region> {
        self.validate(id);
        self.cull[id.idx as usize].visible.as_ref()
    }

    /// The part of the layer not covered by anything opaque above it.
    #[must_use]
    pub fn unobscured_region(&self, id: LayerId) -> Option<&Region> {
        self.validate(id);
        self.cull[id.idx as usize].unobscured.as_ref()
    }

    /// The clip left for whatever paints beneath a window.
    #[must_use]
    pub fn beneath_region(&self, id: LayerId) -> Option<&Region> {
        self.validate(id);
        self.cull[id.idx as usize].beneath.as_ref()
    }

    /// Whether a window's shadow still shows anywhere.
    ///
    /// `true` unless the last cull proved the shadow fully covered.
    #[must_use]
    pub fn shadow_needs_paint(&self, id: LayerId) -> bool {
        self.validate(id);
        self.cull[id.idx as usize].shadow_needs_paint
    }

    // -- Mutation API --

    /// Sets the local transform of a layer.
    pub fn set_transform(&mut self, id: LayerId, transform: Transform3d) {
        self.validate(id);
        self.local_transform[id.idx as usize] = transform;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets the local opacity of a layer (255 is fully opaque).
    pub fn set_opacity(&mut self, id: LayerId, opacity: u8) {
        self.validate(id);
        self.local_opacity[id.idx as usize] = opacity;
        self.dirty.mark_with(id.idx, dirty::OPACITY, &EagerPolicy);
    }

    /// Sets the untransformed size of a layer.
    pub fn set_size(&mut self, id: LayerId, size: Size) {
        self.validate(id);
        self.size[id.idx as usize] = size;
        self.dirty.mark(id.idx, dirty::SHAPE);
    }

    /// Sets the input shape of a layer, in local coordinates.
    ///
    /// A shaped window paints and occludes only inside its shape.
    pub fn set_shape(&mut self, id: LayerId, shape: Option<Region>) {
        self.validate(id);
        self.shape[id.idx as usize] = shape;
        self.dirty.mark(id.idx, dirty::SHAPE);
    }

    /// Sets the surface a layer presents.
    pub fn set_content(&mut self, id: LayerId, content: Option<SurfaceId>) {
        self.validate(id);
        self.content[id.idx as usize] = content;
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Sets the flags of a layer.
    pub fn set_flags(&mut self, id: LayerId, flags: LayerFlags) {
        self.validate(id);
        self.flags[id.idx as usize] = flags;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets the kind of a layer, discarding anything it recorded while culled.
    pub fn set_kind(&mut self, id: LayerId, kind: LayerKind) {
        self.validate(id);
        self.kind[id.idx as usize] = kind;
        self.cull[id.idx as usize].clear();
        self.dirty.mark(id.idx, dirty::SHAPE);
    }

    // -- Raw-index accessors --
    //
    // These take slot indices as found in `FrameChanges` or
    // `traversal_order()` and skip generation checks.

    /// Returns the live handle for raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn id_at(&self, idx: u32) -> LayerId {
        let i = self.slot(idx);
        LayerId {
            idx,
            generation: self.generation[i],
        }
    }

    /// Returns the world transform at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn world_transform_at(&self, idx: u32) -> Transform3d {
        self.world_transform[self.slot(idx)]
    }

    /// Returns the paint opacity at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn paint_opacity_at(&self, idx: u32) -> u8 {
        self.paint_opacity[self.slot(idx)]
    }

    /// Returns whether the layer at raw slot `idx` is effectively hidden.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_hidden_at(&self, idx: u32) -> bool {
        self.effective_hidden[self.slot(idx)]
    }

    /// Returns the surface at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn content_at(&self, idx: u32) -> Option<SurfaceId> {
        self.content[self.slot(idx)]
    }

    /// Returns the flags at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn flags_at(&self, idx: u32) -> LayerFlags {
        self.flags[self.slot(idx)]
    }

    /// Returns the kind at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn kind_at(&self, idx: u32) -> &LayerKind {
        &self.kind[self.slot(idx)]
    }

    /// Returns the recorded visible region at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn visible_region_at(&self, idx: u32) -> Option<&Region> {
        self.cull[self.slot(idx)].visible.as_ref()
    }

    /// Returns the shadow flag at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn shadow_needs_paint_at(&self, idx: u32) -> bool {
        self.cull[self.slot(idx)].shadow_needs_paint
    }

    /// Returns every pixel the layer at raw slot `idx` touches, as
    /// `(0, 0, ceil(width), ceil(height))`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn bounds_at(&self, idx: u32) -> IntRect {
        size_rect(self.size[self.slot(idx)].ceil())
    }

    /// Returns the pixels the layer at raw slot `idx` covers completely, as
    /// `(0, 0, floor(width), floor(height))`.
    ///
    /// Only these may occlude what is beneath; a partly covered edge pixel
    /// still shows through.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn opaque_bounds_at(&self, idx: u32) -> IntRect {
        size_rect(self.size[self.slot(idx)].floor())
    }

    /// Returns the area the layer at raw slot `idx` paints fully opaque when
    /// its paint opacity is 255, in layer-local pixels.
    ///
    /// Surfaces report their opaque region and non-ARGB windows their shape
    /// (or whole rectangle); both are clipped to [`opaque_bounds_at`], so a
    /// layer never claims pixels outside itself. Other kinds report `None`.
    ///
    /// [`opaque_bounds_at`]: Self::opaque_bounds_at
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn opaque_region_at(&self, idx: u32) -> Option<Region> {
        let i = self.slot(idx);
        let covered = self.opaque_bounds_at(idx);
        let area = match &self.kind[i] {
            LayerKind::Surface { opaque } => opaque.as_ref()?,
            LayerKind::Window(props) if !props.argb32 => match &self.shape[i] {
                Some(shape) => shape,
                None => return Some(Region::from_rect(covered)),
            },
            _ => return None,
        };
        let mut area = area.clone();
        area.intersect_rect(covered);
        Some(area)
    }

    /// Returns the screen-space quad at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn screen_quad_at(&self, idx: u32) -> Quad {
        let i = self.slot(idx);
        let Size { width, height } = self.size[i];
        let xf = self.world_transform[i];
        [
            Point::new(0.0, 0.0),
            Point::new(0.0, height),
            Point::new(width, height),
            Point::new(width, 0.0),
        ]
        .map(|p| xf.transform_point(p))
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: LayerId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale LayerId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn slot(&self, idx: u32) -> usize {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        idx as usize
    }

    fn handle(&self, idx: u32) -> Option<LayerId> {
        (idx != INVALID).then(|| LayerId {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    fn is_ancestor_or_self(&self, ancestor: u32, mut idx: u32) -> bool {
        while idx != INVALID {
            if idx == ancestor {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }

    /// Appends detached `c` as the last child of `p`.
    fn link_last(&mut self, p: u32, c: u32) {
        let last = self.last_child[p as usize];
        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = INVALID;
        self.prev_sibling[c as usize] = last;
        if last == INVALID {
            self.first_child[p as usize] = c;
        } else {
            self.next_sibling[last as usize] = c;
        }
        self.last_child[p as usize] = c;
        self.attach_dependencies(c, p);
    }

    fn attach_dependencies(&mut self, c: u32, p: u32) {
        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);
        let _ = self.dirty.add_dependency(c, p, dirty::OPACITY);
        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Unlinks `c` from its parent and drops its dependency edges.
    fn detach(&mut self, c: u32) {
        let p = self.parent[c as usize];
        self.unlink_from_parent(c);
        self.dirty.remove_dependency(c, p, dirty::TRANSFORM);
        self.dirty.remove_dependency(c, p, dirty::OPACITY);
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev == INVALID {
            self.first_child[p as usize] = next;
        } else {
            self.next_sibling[prev as usize] = next;
        }
        if next == INVALID {
            self.last_child[p as usize] = prev;
        } else {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    fn mark_subtree_inherited_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::OPACITY, &EagerPolicy);
    }
}

fn size_rect(size: Size) -> IntRect {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "layer sizes are screen-sized; out-of-range sizes saturate"
    )]
    let (width, height) = (size.width as i32, size.height as i32);
    IntRect::new(0, 0, width, height)
}
