// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plan: an ordered sequence of draw items for one frame.

use alloc::vec::Vec;

use umbra_core::geometry::IntRect;
use umbra_core::layer::{LayerId, LayerKind, LayerStore, SurfaceId};
use umbra_core::occlusion::Painter;
use umbra_core::region::Region;
use umbra_core::transform::Transform3d;

/// Clip complexity above which an item is drawn unclipped.
pub const DEFAULT_MAX_CLIP_RECTS: usize = 16;

/// How a render item composites over what is beneath it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Standard source-over alpha compositing.
    #[default]
    SourceOver,
    /// Overwrite the destination. Only emitted for fully opaque pixels.
    Replace,
}

/// A single draw command in the render plan.
#[derive(Clone, Debug)]
pub struct RenderItem {
    /// The layer this item originates from.
    pub layer_id: LayerId,
    /// The surface to draw, or `None` for a shadow item.
    pub surface: Option<SurfaceId>,
    /// Shadow bounds in layer-local coordinates, for shadow items.
    pub shadow: Option<IntRect>,
    /// World transform of the layer.
    pub world_transform: Transform3d,
    /// Paint opacity, 255 being fully opaque.
    pub opacity: u8,
    /// Pixels to draw, in layer-local coordinates. `None` draws everything.
    pub clip: Option<Region>,
    /// Blend mode.
    pub blend: BlendMode,
}

/// An ordered list of draw commands for one frame, back to front.
///
/// A plan is rebuilt from scratch on every [`Painter::paint`] call.
#[derive(Clone, Debug)]
pub struct RenderPlan {
    /// Draw items in back-to-front order.
    pub items: Vec<RenderItem>,
    /// Clips with more rectangles than this are dropped in favour of an
    /// unclipped draw.
    pub max_clip_rects: usize,
    /// Layers left out because culling proved them fully covered.
    pub culled_layers: u32,
    /// Items that fell back to an unclipped draw.
    pub unclipped_fallbacks: u32,
}

impl Default for RenderPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPlan {
    /// Creates an empty plan with [`DEFAULT_MAX_CLIP_RECTS`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_clip_rects(DEFAULT_MAX_CLIP_RECTS)
    }

    /// Creates an empty plan with a custom clip complexity limit.
    #[must_use]
    pub fn with_max_clip_rects(max_clip_rects: usize) -> Self {
        Self {
            items: Vec::new(),
            max_clip_rects,
            culled_layers: 0,
            unclipped_fallbacks: 0,
        }
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
        self.culled_layers = 0;
        self.unclipped_fallbacks = 0;
    }

    /// Rebuilds the plan from an evaluated store.
    ///
    /// Regions recorded by culling are honoured when present; layers that
    /// were not culled are drawn in full.
    pub fn build(&mut self, store: &LayerStore) {
        self.clear();
        for &idx in store.traversal_order() {
            if store.effective_hidden_at(idx) {
                continue;
            }
            if let LayerKind::Window(props) = store.kind_at(idx)
                && let Some(shadow) = props.shadow
                && store.shadow_needs_paint_at(idx)
            {
                self.items.push(RenderItem {
                    layer_id: store.id_at(idx),
                    surface: None,
                    shadow: Some(shadow),
                    world_transform: store.world_transform_at(idx),
                    opacity: store.paint_opacity_at(idx),
                    clip: None,
                    blend: BlendMode::SourceOver,
                });
            }
            if let Some(surface) = store.content_at(idx) {
                self.push_content(store, idx, surface);
            }
        }
    }

    fn push_content(&mut self, store: &LayerStore, idx: u32, surface: SurfaceId) {
        let bounds = store.bounds_at(idx);
        let clip = match store.visible_region_at(idx) {
            Some(visible) => {
                let mut clip = visible.clone();
                clip.intersect_rect(bounds);
                if clip.is_empty() {
                    self.culled_layers += 1;
                    return;
                }
                Some(clip)
            }
            None => None,
        };
        let item = RenderItem {
            layer_id: store.id_at(idx),
            surface: Some(surface),
            shadow: None,
            world_transform: store.world_transform_at(idx),
            opacity: store.paint_opacity_at(idx),
            clip,
            blend: BlendMode::SourceOver,
        };

        let opaque = if item.opacity == u8::MAX {
            store.opaque_region_at(idx)
        } else {
            None
        };
        let Some(opaque) = opaque else {
            self.push_clipped(item);
            return;
        };

        // Opaque pixels can be written without blending; the rest blends.
        let mut opaque_part = item
            .clip
            .clone()
            .unwrap_or_else(|| Region::from_rect(bounds));
        let mut blended_part = opaque_part.clone();
        opaque_part.intersect(&opaque);
        blended_part.subtract(&opaque);

        if opaque_part.num_rects() > self.max_clip_rects
            || blended_part.num_rects() > self.max_clip_rects
        {
            self.push_clipped(item);
            return;
        }
        if !opaque_part.is_empty() {
            self.items.push(RenderItem {
                clip: Some(opaque_part),
                blend: BlendMode::Replace,
                ..item.clone()
            });
        }
        if !blended_part.is_empty() {
            self.items.push(RenderItem {
                clip: Some(blended_part),
                ..item
            });
        }
    }

    /// Pushes a source-over item, dropping a clip that is too complex.
    fn push_clipped(&mut self, mut item: RenderItem) {
        if item
            .clip
            .as_ref()
            .is_some_and(|clip| clip.num_rects() > self.max_clip_rects)
        {
            item.clip = None;
            self.unclipped_fallbacks += 1;
        }
        self.items.push(item);
    }
}

impl Painter for RenderPlan {
    fn paint(&mut self, store: &LayerStore) {
        self.build(store);
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;
    use umbra_core::layer::{LayerFlags, WindowProps};
    use umbra_core::occlusion::OcclusionPass;
    use umbra_core::trace::Tracer;

    use super::*;

    const SCREEN: IntRect = IntRect::new(0, 0, 1024, 768);

    fn desktop() -> (LayerStore, LayerId) {
        let mut store = LayerStore::new();
        let group = store.create_layer_with(LayerKind::Group, Size::new(1024.0, 768.0));
        (store, group)
    }

    fn add(
        store: &mut LayerStore,
        parent: LayerId,
        kind: LayerKind,
        r: IntRect,
        surface: u32,
    ) -> LayerId {
        let id = store.create_layer_with(kind, Size::new(f64::from(r.width), f64::from(r.height)));
        store.set_transform(
            id,
            Transform3d::from_translation(f64::from(r.x), f64::from(r.y), 0.0),
        );
        store.set_content(id, Some(SurfaceId(surface)));
        store.add_child(parent, id);
        id
    }

    fn window() -> LayerKind {
        LayerKind::Window(WindowProps::default())
    }

    fn paint(store: &mut LayerStore, group: LayerId, plan: &mut RenderPlan) {
        let _ = store.evaluate();
        let mut pass = OcclusionPass::new(SCREEN);
        pass.run(store, group, plan, &mut Tracer::none());
    }

    #[test]
    fn covered_window_is_left_out() {
        let (mut store, group) = desktop();
        let w3 = add(&mut store, group, window(), SCREEN, 3);
        let _w2 = add(&mut store, group, window(), IntRect::new(0, 0, 100, 100), 2);
        let w1 = add(&mut store, group, window(), IntRect::new(0, 0, 200, 200), 1);

        let mut plan = RenderPlan::new();
        paint(&mut store, group, &mut plan);

        let layers: Vec<_> = plan.items.iter().map(|i| i.layer_id).collect();
        assert_eq!(layers, [w3, w1]);
        assert_eq!(plan.culled_layers, 1);
        assert!(plan.items.iter().all(|i| i.blend == BlendMode::Replace));

        let mut expected = Region::from_rect(SCREEN);
        expected.subtract_rect(IntRect::new(0, 0, 200, 200));
        assert_eq!(plan.items[0].clip, Some(expected));
    }

    #[test]
    fn complex_clip_falls_back_to_unclipped_blend() {
        let (mut store, group) = desktop();
        let w2 = add(&mut store, group, window(), SCREEN, 2);
        let _w1 = add(&mut store, group, window(), IntRect::new(100, 100, 50, 50), 1);

        let mut plan = RenderPlan::with_max_clip_rects(1);
        paint(&mut store, group, &mut plan);

        let bottom = &plan.items[0];
        assert_eq!(bottom.layer_id, w2);
        assert_eq!(bottom.clip, None);
        assert_eq!(bottom.blend, BlendMode::SourceOver);
        assert_eq!(plan.unclipped_fallbacks, 1);
    }

    #[test]
    fn surface_splits_into_opaque_and_blended_parts() {
        let (mut store, group) = desktop();
        let argb = LayerKind::Window(WindowProps {
            argb32: true,
            shadow: None,
        });
        let frame = store.create_layer_with(argb, Size::new(100.0, 100.0));
        store.add_child(group, frame);
        let opaque = Region::from_rect(IntRect::new(0, 0, 100, 60));
        let s = add(
            &mut store,
            frame,
            LayerKind::Surface {
                opaque: Some(opaque.clone()),
            },
            IntRect::new(0, 0, 100, 100),
            7,
        );

        let mut plan = RenderPlan::new();
        paint(&mut store, group, &mut plan);

        assert_eq!(plan.items.len(), 2);
        assert!(plan.items.iter().all(|i| i.layer_id == s));
        assert_eq!(plan.items[0].blend, BlendMode::Replace);
        assert_eq!(plan.items[0].clip, Some(opaque));
        assert_eq!(plan.items[1].blend, BlendMode::SourceOver);
        assert_eq!(
            plan.items[1].clip,
            Some(Region::from_rect(IntRect::new(0, 60, 100, 40)))
        );
    }

    #[test]
    fn partly_covered_edge_column_is_blended() {
        let (mut store, group) = desktop();
        let _bottom = add(&mut store, group, window(), SCREEN, 1);
        let top = add(&mut store, group, window(), IntRect::new(0, 0, 100, 100), 2);
        store.set_size(top, Size::new(100.5, 100.0));

        let mut plan = RenderPlan::new();
        paint(&mut store, group, &mut plan);

        let top_items: Vec<_> = plan.items.iter().filter(|i| i.layer_id == top).collect();
        assert_eq!(top_items.len(), 2);
        assert_eq!(top_items[0].blend, BlendMode::Replace);
        assert_eq!(
            top_items[0].clip,
            Some(Region::from_rect(IntRect::new(0, 0, 100, 100)))
        );
        assert_eq!(top_items[1].blend, BlendMode::SourceOver);
        assert_eq!(
            top_items[1].clip,
            Some(Region::from_rect(IntRect::new(100, 0, 1, 100)))
        );
    }

    #[test]
    fn translucent_surface_blends_everything() {
        let (mut store, group) = desktop();
        let w = add(&mut store, group, window(), IntRect::new(0, 0, 10, 10), 1);
        store.set_opacity(w, 200);

        let mut plan = RenderPlan::new();
        paint(&mut store, group, &mut plan);

        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].blend, BlendMode::SourceOver);
        assert_eq!(plan.items[0].opacity, 200);
    }

    #[test]
    fn covered_shadow_is_not_drawn() {
        let (mut store, group) = desktop();
        let shadowed = LayerKind::Window(WindowProps {
            argb32: false,
            shadow: Some(IntRect::new(-4, -4, 28, 28)),
        });
        let low = add(&mut store, group, shadowed.clone(), IntRect::new(50, 50, 20, 20), 1);
        let _cover = add(&mut store, group, window(), IntRect::new(40, 40, 40, 40), 2);
        let high = add(&mut store, group, shadowed, IntRect::new(500, 500, 20, 20), 3);

        let mut plan = RenderPlan::new();
        paint(&mut store, group, &mut plan);

        let shadows: Vec<_> = plan
            .items
            .iter()
            .filter(|i| i.shadow.is_some())
            .map(|i| i.layer_id)
            .collect();
        assert_eq!(shadows, [high]);
        assert!(plan.items.iter().all(|i| i.layer_id != low));
    }

    #[test]
    fn unculled_plan_draws_everything_in_full() {
        let (mut store, group) = desktop();
        let a = add(&mut store, group, window(), SCREEN, 1);
        let b = add(&mut store, group, window(), SCREEN, 2);
        let hidden = add(&mut store, group, window(), SCREEN, 3);
        store.set_flags(
            hidden,
            LayerFlags {
                hidden: true,
                has_effects: false,
            },
        );
        let _ = store.evaluate();

        let mut plan = RenderPlan::new();
        plan.build(&store);
        let layers: Vec<_> = plan.items.iter().map(|i| i.layer_id).collect();
        assert_eq!(layers, [a, b]);
        assert_eq!(plan.culled_layers, 0);
    }
}
