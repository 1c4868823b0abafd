// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Culling behaviour of each [`LayerKind`].
//!
//! Nodes are raw slot indices. Every query here reads state produced by
//! [`LayerStore::evaluate`].

use kurbo::Size;

use crate::cull::{CullFrame, Cullable, SceneGraph, cull_out_children, reset_culling_children};
use crate::geometry::{IntRect, Quad};
use crate::region::Overlap;

use super::id::INVALID;
use super::kind::{LayerKind, WindowProps};
use super::store::LayerStore;

impl SceneGraph for LayerStore {
    type Node = u32;

    fn last_child(&self, node: u32) -> Option<u32> {
        let c = self.last_child[node as usize];
        (c != INVALID).then_some(c)
    }

    fn prev_sibling(&self, node: u32) -> Option<u32> {
        let s = self.prev_sibling[node as usize];
        (s != INVALID).then_some(s)
    }

    fn is_visible(&self, node: u32) -> bool {
        !self.effective_hidden[node as usize]
    }

    fn has_effects(&self, node: u32) -> bool {
        self.flags[node as usize].has_effects
    }

    fn size(&self, node: u32) -> Size {
        self.size[node as usize]
    }

    fn screen_quad(&self, node: u32) -> Quad {
        self.screen_quad_at(node)
    }

    fn paint_opacity(&self, node: u32) -> u8 {
        self.paint_opacity[node as usize]
    }

    fn is_cullable(&self, node: u32) -> bool {
        self.kind[node as usize].is_cullable()
    }

    fn trace_index(&self, node: u32) -> u32 {
        node
    }
}

impl Cullable for LayerStore {
    fn cull_out(&mut self, node: u32, frame: &mut CullFrame<'_, '_>) {
        match self.kind[node as usize] {
            LayerKind::Plain => {}
            LayerKind::Group => cull_out_children(self, node, frame),
            LayerKind::Surface { .. } => self.cull_out_surface(node, frame),
            LayerKind::Window(props) => self.cull_out_window(node, props, frame),
            LayerKind::Background => self.cull_out_background(node, frame),
        }
    }

    fn reset_culling(&mut self, node: u32) {
        self.cull[node as usize].clear();
        reset_culling_children(self, node);
    }
}

impl LayerStore {
    fn is_opaque(&self, node: u32) -> bool {
        self.paint_opacity[node as usize] == u8::MAX
    }

    /// Removes the node's fully covered opaque pixels from both regions.
    fn subtract_opaque(&self, node: u32, frame: &mut CullFrame<'_, '_>) {
        if self.is_opaque(node)
            && let Some(opaque) = self.opaque_region_at(node)
        {
            frame.subtract(&opaque);
        }
    }

    fn cull_out_surface(&mut self, node: u32, frame: &mut CullFrame<'_, '_>) {
        let i = node as usize;
        let mut unobscured = frame.unobscured().clone();
        unobscured.intersect_rect(self.bounds_at(node));
        self.cull[i].unobscured = Some(unobscured);
        self.cull[i].visible = Some(frame.clip().clone());
        trace_visible(frame, node, frame_visible(self, node));

        self.subtract_opaque(node, frame);
    }

    fn cull_out_window(&mut self, node: u32, props: WindowProps, frame: &mut CullFrame<'_, '_>) {
        let i = node as usize;
        let bounds = self.bounds_at(node);

        let mut visible = frame.clip().clone();
        if let Some(shape) = &self.shape[i] {
            visible.intersect(shape);
        }
        visible.intersect_rect(bounds);
        let mut unobscured = frame.unobscured().clone();
        unobscured.intersect_rect(bounds);
        self.cull[i].visible = Some(visible);
        self.cull[i].unobscured = Some(unobscured);
        trace_visible(frame, node, frame_visible(self, node));

        cull_out_children(self, node, frame);

        self.subtract_opaque(node, frame);

        let beneath = frame.clip().clone();
        self.cull[i].shadow_needs_paint = props
            .shadow
            .is_none_or(|shadow| beneath.contains_rect(shadow) != Overlap::Out);
        self.cull[i].beneath = Some(beneath);
    }

    fn cull_out_background(&mut self, node: u32, frame: &mut CullFrame<'_, '_>) {
        let mut visible = frame.clip().clone();
        visible.intersect_rect(self.bounds_at(node));
        self.cull[node as usize].visible = Some(visible);
        trace_visible(frame, node, frame_visible(self, node));
    }
}

fn frame_visible(store: &LayerStore, node: u32) -> &[IntRect] {
    match &store.cull[node as usize].visible {
        Some(visible) => visible.rects(),
        None => &[],
    }
}

#[cfg(feature = "trace-rich")]
fn trace_visible(frame: &mut CullFrame<'_, '_>, node: u32, rects: &[IntRect]) {
    let cx = frame.context();
    let frame_index = cx.frame_index();
    cx.tracer().visible_rects(frame_index, node, rects);
}

#[cfg(not(feature = "trace-rich"))]
#[inline(always)]
fn trace_visible(_: &mut CullFrame<'_, '_>, _: u32, _: &[IntRect]) {}
