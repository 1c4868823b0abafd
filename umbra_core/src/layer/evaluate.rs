// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame evaluation and change tracking.
//!
//! Evaluation drains each dirty channel in turn:
//!
//! 1. **TRANSFORM**: `world_transform = parent_world * local_transform` and
//!    `effective_hidden = parent_hidden || flags.hidden`.
//! 2. **OPACITY**: `paint_opacity = parent_paint * local / 255`, truncating,
//!    so a chain of fully opaque layers stays exactly 255.
//! 3. **SHAPE** / **CONTENT**: collected only.
//! 4. **TOPOLOGY**: consumed; the traversal order was already rebuilt.
//!
//! The occlusion pass reads world transforms, paint opacities and hidden
//! state, so [`LayerStore::evaluate`] must run before culling.

use alloc::vec::Vec;

use super::id::INVALID;
use super::store::LayerStore;
use crate::dirty;
use crate::transform::Transform3d;

/// Changes produced by one [`LayerStore::evaluate`] call, as raw slot
/// indices.
#[derive(Clone, Debug, Default)]
pub struct FrameChanges {
    /// Layers whose world transform was recomputed.
    pub transforms: Vec<u32>,
    /// Layers whose paint opacity was recomputed.
    pub opacities: Vec<u32>,
    /// Layers whose size, shape or kind changed.
    pub shapes: Vec<u32>,
    /// Layers whose surface changed.
    pub content: Vec<u32>,
    /// Layers that became effectively hidden.
    pub hidden: Vec<u32>,
    /// Layers that became visible again.
    pub unhidden: Vec<u32>,
    /// Layers created since the last evaluate.
    pub added: Vec<u32>,
    /// Layers destroyed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether the traversal order was rebuilt.
    pub topology_changed: bool,
}

impl FrameChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.opacities.clear();
        self.shapes.clear();
        self.content.clear();
        self.hidden.clear();
        self.unhidden.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Whether anything at all changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.topology_changed
            && self.transforms.is_empty()
            && self.opacities.is_empty()
            && self.shapes.is_empty()
            && self.content.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
    }
}

/// Combines a parent's paint opacity with a local opacity.
#[inline]
fn mul_opacity(parent: u8, local: u8) -> u8 {
    let product = u16::from(parent) * u16::from(local) / 255;
    u8::try_from(product).unwrap_or(u8::MAX)
}

impl LayerStore {
    /// Recomputes dirty properties and returns the set of changes.
    pub fn evaluate(&mut self) -> FrameChanges {
        let mut changes = FrameChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer.
    pub fn evaluate_into(&mut self, changes: &mut FrameChanges) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        let dirty_transforms: Vec<u32> = self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_transforms {
            let i = idx as usize;
            let p = self.parent[i];
            let (parent_world, parent_hidden) = if p == INVALID {
                (Transform3d::IDENTITY, false)
            } else {
                (
                    self.world_transform[p as usize],
                    self.effective_hidden[p as usize],
                )
            };
            self.world_transform[i] = parent_world * self.local_transform[i];

            let hidden = parent_hidden || self.flags[i].hidden;
            if hidden != self.effective_hidden[i] {
                if hidden {
                    changes.hidden.push(idx);
                } else {
                    changes.unhidden.push(idx);
                }
                self.effective_hidden[i] = hidden;
            }
        }
        changes.transforms = dirty_transforms;

        let dirty_opacities: Vec<u32> = self
            .dirty
            .drain(dirty::OPACITY)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_opacities {
            let i = idx as usize;
            let p = self.parent[i];
            let parent_opacity = if p == INVALID {
                u8::MAX
            } else {
                self.paint_opacity[p as usize]
            };
            self.paint_opacity[i] = mul_opacity(parent_opacity, self.local_opacity[i]);
        }
        changes.opacities = dirty_opacities;

        changes.shapes = self
            .dirty
            .drain(dirty::SHAPE)
            .deterministic()
            .run()
            .collect();

        changes.content = self
            .dirty
            .drain(dirty::CONTENT)
            .deterministic()
            .run()
            .collect();

        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }

    /// The depth-first pre-order of all live layers, which is paint order
    /// (back to front).
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                self.dfs_collect(idx);
            }
        }
    }

    fn dfs_collect(&mut self, idx: u32) {
        self.traversal_order.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child);
            child = self.next_sibling[child as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::*;
    use crate::layer::{LayerFlags, SurfaceId};

    #[test]
    fn opacity_product_rule() {
        assert_eq!(mul_opacity(255, 255), 255);
        assert_eq!(mul_opacity(255, 0), 0);
        assert_eq!(mul_opacity(128, 255), 128);
        assert_eq!(mul_opacity(128, 128), 64);
        assert_eq!(mul_opacity(254, 255), 254);
    }

    #[test]
    fn evaluate_computes_world_transforms() {
        let mut store = LayerStore::new();
        let parent = store.create_layer();
        let child = store.create_layer();

        let parent_xf = Transform3d::from_translation(10.0, 0.0, 0.0);
        let child_xf = Transform3d::from_translation(0.0, 5.0, 0.0);
        store.set_transform(parent, parent_xf);
        store.set_transform(child, child_xf);
        store.add_child(parent, child);

        let _ = store.evaluate();

        assert_eq!(store.world_transform(parent), parent_xf);
        assert_eq!(store.world_transform(child), parent_xf * child_xf);
    }

    #[test]
    fn evaluate_computes_paint_opacity() {
        let mut store = LayerStore::new();
        let grandparent = store.create_layer();
        let parent = store.create_layer();
        let child = store.create_layer();
        store.add_child(grandparent, parent);
        store.add_child(parent, child);

        store.set_opacity(parent, 128);
        let _ = store.evaluate();

        assert_eq!(store.paint_opacity(grandparent), 255);
        assert_eq!(store.paint_opacity(parent), 128);
        assert_eq!(store.paint_opacity(child), 128);

        store.set_opacity(parent, 255);
        let changes = store.evaluate();
        assert!(changes.opacities.contains(&child.index()));
        assert_eq!(store.paint_opacity(child), 255);
    }

    #[test]
    fn no_change_evaluate_returns_empty() {
        let mut store = LayerStore::new();
        let _root = store.create_layer();
        let _ = store.evaluate();

        let changes = store.evaluate();
        assert!(changes.is_empty());
    }

    #[test]
    fn traversal_order_is_paint_order() {
        let mut store = LayerStore::new();
        let a = store.create_layer();
        let b = store.create_layer();
        let c = store.create_layer();
        let d = store.create_layer();

        // a -> [b -> [d], c]
        store.add_child(a, b);
        store.add_child(a, c);
        store.add_child(b, d);

        let _ = store.evaluate();
        assert_eq!(
            store.traversal_order(),
            &[a.index(), b.index(), d.index(), c.index()]
        );
    }

    #[test]
    fn evaluate_tracks_shape_and_content_changes() {
        let mut store = LayerStore::new();
        let id = store.create_layer();
        let _ = store.evaluate();

        store.set_size(id, Size::new(50.0, 50.0));
        store.set_content(id, Some(SurfaceId(1)));
        let changes = store.evaluate();
        assert!(changes.shapes.contains(&id.index()));
        assert!(changes.content.contains(&id.index()));
    }

    #[test]
    fn added_and_removed_lifecycle() {
        let mut store = LayerStore::new();
        let id = store.create_layer();

        let changes = store.evaluate();
        assert!(changes.added.contains(&id.index()));

        let changes = store.evaluate();
        assert!(changes.added.is_empty());
        assert!(changes.removed.is_empty());

        store.destroy_layer(id);
        let changes = store.evaluate();
        assert!(changes.removed.contains(&id.index()));
    }

    #[test]
    fn hidden_propagates_and_restores() {
        let mut store = LayerStore::new();
        let parent = store.create_layer();
        let child = store.create_layer();
        store.add_child(parent, child);
        let _ = store.evaluate();

        store.set_flags(
            parent,
            LayerFlags {
                hidden: true,
                ..LayerFlags::default()
            },
        );
        let changes = store.evaluate();
        assert!(!store.is_visible(parent));
        assert!(!store.is_visible(child));
        assert!(changes.hidden.contains(&child.index()));

        store.set_flags(parent, LayerFlags::default());
        let changes = store.evaluate();
        assert!(store.is_visible(child));
        assert!(changes.unhidden.contains(&child.index()));
    }

    #[test]
    fn reparent_recomputes_inherited_properties() {
        let mut store = LayerStore::new();
        let old_parent = store.create_layer();
        let new_parent = store.create_layer();
        let child = store.create_layer();
        let grandchild = store.create_layer();
        store.add_child(child, grandchild);
        store.add_child(old_parent, child);

        store.set_transform(old_parent, Transform3d::from_translation(10.0, 0.0, 0.0));
        store.set_opacity(old_parent, 100);
        store.set_transform(new_parent, Transform3d::from_translation(25.0, 0.0, 0.0));
        let _ = store.evaluate();
        assert_eq!(store.paint_opacity(grandchild), 100);

        store.reparent(child, new_parent);
        let changes = store.evaluate();

        assert!(changes.transforms.contains(&grandchild.index()));
        assert!(changes.opacities.contains(&grandchild.index()));
        assert_eq!(
            store.world_transform(grandchild),
            Transform3d::from_translation(25.0, 0.0, 0.0)
        );
        assert_eq!(store.paint_opacity(grandchild), 255);
    }

    #[test]
    fn remove_from_parent_resets_inherited_properties() {
        let mut store = LayerStore::new();
        let parent = store.create_layer();
        let child = store.create_layer();
        store.add_child(parent, child);
        store.set_transform(parent, Transform3d::from_translation(10.0, 0.0, 0.0));
        store.set_opacity(parent, 10);
        let _ = store.evaluate();

        store.remove_from_parent(child);
        let _ = store.evaluate();
        assert_eq!(store.world_transform(child), Transform3d::IDENTITY);
        assert_eq!(store.paint_opacity(child), 255);
    }

    #[test]
    fn evaluate_into_reuses_buffer() {
        let mut store = LayerStore::new();
        let a = store.create_layer();
        let b = store.create_layer();

        let mut changes = FrameChanges::default();
        store.evaluate_into(&mut changes);
        assert_eq!(changes.added.len(), 2);

        store.set_opacity(a, 9);
        store.evaluate_into(&mut changes);
        assert!(changes.added.is_empty(), "added should be cleared");
        assert!(changes.opacities.contains(&a.index()));
        assert!(!changes.opacities.contains(&b.index()));
    }
}
