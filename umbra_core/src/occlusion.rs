// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame occlusion pass.
//!
//! A pass runs three phases over the window group of an evaluated
//! [`LayerStore`]:
//!
//! 1. **Cull**: a region covering the whole paintable surface is walked
//!    through the window stack topmost first. Each window records the part of
//!    itself that still needs pixels and, if opaque, removes its area from the
//!    region before the windows beneath it see it.
//! 2. **Paint**: the [`Painter`] draws bottom to top, consulting the recorded
//!    regions.
//! 3. **Reset**: every recorded region is cleared so that later out-of-band
//!    paints of a window (thumbnails, screen casts) see the whole window.
//!
//! The reset is owned by a drop guard, so it also runs when the painter
//! unwinds.
//!
//! ```text
//!   LayerStore::evaluate()
//!           │
//!           ▼
//!   OcclusionPass::run() ─► cull ─► Painter::paint() ─► reset
//!           │
//!           ▼
//!      PassSummary
//! ```

use crate::cull::{CullContext, CullFrame, cull_origin, cull_out_children, reset_culling_children};
use crate::geometry::IntRect;
use crate::layer::{LayerId, LayerStore};
use crate::region::Region;
use crate::trace::{PassBeginEvent, PassSummary, PhaseBeginEvent, PhaseEndEvent, PhaseKind, Tracer};

/// The real paint of a frame, run between culling and reset.
///
/// Implementations read the culling results through
/// [`LayerStore::visible_region`] and friends.
pub trait Painter {
    /// Paints the evaluated, culled store.
    fn paint(&mut self, store: &LayerStore);
}

impl<F: FnMut(&LayerStore)> Painter for F {
    fn paint(&mut self, store: &LayerStore) {
        self(store);
    }
}

/// Where an [`OcclusionPass`] is in its frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PassState {
    /// No pass has run yet.
    #[default]
    Idle,
    /// Regions have been recorded and not yet reset.
    Running,
    /// The last pass has been reset.
    Done,
}

fn assert_surface_in_range(surface: IntRect) {
    assert!(
        surface.is_within_coord_limit(),
        "surface {surface:?} reaches past the supported coordinate range"
    );
}

/// Drives culling, paint and reset for one frame at a time.
#[derive(Clone, Debug)]
pub struct OcclusionPass {
    surface: IntRect,
    state: PassState,
    frame_index: u64,
}

impl OcclusionPass {
    /// Creates a pass over the given paintable surface, in screen pixels.
    ///
    /// # Panics
    ///
    /// Panics if the surface reaches past [`COORD_LIMIT`](crate::geometry::COORD_LIMIT).
    #[must_use]
    pub fn new(surface: IntRect) -> Self {
        assert_surface_in_range(surface);
        Self {
            surface,
            state: PassState::Idle,
            frame_index: 0,
        }
    }

    /// The paintable surface.
    #[must_use]
    pub fn surface(&self) -> IntRect {
        self.surface
    }

    /// Changes the paintable surface, e.g. after a monitor change.
    ///
    /// # Panics
    ///
    /// Panics while a pass is running, or if the surface reaches past
    /// [`COORD_LIMIT`](crate::geometry::COORD_LIMIT).
    pub fn set_surface(&mut self, surface: IntRect) {
        assert!(
            self.state != PassState::Running,
            "cannot change surface while a pass is running"
        );
        assert_surface_in_range(surface);
        self.surface = surface;
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> PassState {
        self.state
    }

    /// Index of the next (or current) frame.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Culls, paints and resets one frame.
    ///
    /// `store` must have been [evaluated](LayerStore::evaluate) since its last
    /// mutation. `window_group` is the parent of the top-level windows.
    ///
    /// # Panics
    ///
    /// Panics if `window_group` is stale or a pass is already running.
    pub fn run<P: Painter + ?Sized>(
        &mut self,
        store: &mut LayerStore,
        window_group: LayerId,
        painter: &mut P,
        tracer: &mut Tracer<'_>,
    ) -> PassSummary {
        let summary = self.cull_only(store, window_group, tracer);
        let mut guard = ResetGuard {
            pass: self,
            store,
            window_group,
            tracer,
        };
        let frame_index = guard.pass.frame_index;
        guard.tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: PhaseKind::Paint,
        });
        painter.paint(&*guard.store);
        guard.tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: PhaseKind::Paint,
        });
        drop(guard);
        summary
    }

    /// Runs only the cull phase, leaving the recorded regions in place.
    ///
    /// The caller paints and must then call [`reset`](Self::reset).
    ///
    /// # Panics
    ///
    /// Panics if `window_group` is stale or a pass is already running.
    pub fn cull_only(
        &mut self,
        store: &mut LayerStore,
        window_group: LayerId,
        tracer: &mut Tracer<'_>,
    ) -> PassSummary {
        store.validate(window_group);
        assert!(
            self.state != PassState::Running,
            "occlusion pass already running; reset it first"
        );
        self.state = PassState::Running;
        let frame_index = self.frame_index;

        tracer.pass_begin(&PassBeginEvent {
            frame_index,
            surface: self.surface,
        });
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: PhaseKind::Cull,
        });

        let mut unobscured = Region::from_rect(self.surface);
        let mut clip = unobscured.clone();
        let mut cx = CullContext::new(frame_index, tracer.reborrow());
        {
            let mut frame = CullFrame::new(&mut unobscured, &mut clip, &mut cx);
            let group = window_group.index();
            match cull_origin(&*store, group) {
                Ok(origin) => {
                    let mut local = frame.enter(origin);
                    cull_out_children(store, group, &mut local);
                }
                // Every window paints in full.
                Err(reason) => frame.note_skipped(group, reason),
            }
        }
        let summary = PassSummary {
            frame_index,
            culled: cx.culled(),
            skipped: cx.skipped(),
            surface_area: self.surface.area(),
            remaining_area: clip.area(),
        };

        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: PhaseKind::Cull,
        });
        tracer.pass_summary(&summary);
        summary
    }

    /// Clears every region recorded under `window_group`.
    ///
    /// Calling this when nothing was culled, or more than once, is a no-op
    /// apart from the state change.
    ///
    /// # Panics
    ///
    /// Panics if `window_group` is stale.
    pub fn reset(&mut self, store: &mut LayerStore, window_group: LayerId, tracer: &mut Tracer<'_>) {
        store.validate(window_group);
        let frame_index = self.frame_index;
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: PhaseKind::Reset,
        });
        reset_culling_children(store, window_group.index());
        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: PhaseKind::Reset,
        });
        if self.state == PassState::Running {
            self.frame_index += 1;
        }
        self.state = PassState::Done;
    }
}

/// Resets the pass when dropped, including during unwinding.
struct ResetGuard<'g, 't> {
    pass: &'g mut OcclusionPass,
    store: &'g mut LayerStore,
    window_group: LayerId,
    tracer: &'g mut Tracer<'t>,
}

impl Drop for ResetGuard<'_, '_> {
    fn drop(&mut self) {
        self.pass.reset(self.store, self.window_group, self.tracer);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec::Vec;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use kurbo::Size;

    use super::*;
    use crate::layer::{LayerKind, WindowProps};
    use crate::transform::Transform3d;

    const SCREEN: IntRect = IntRect::new(0, 0, 1024, 768);

    struct Desktop {
        store: LayerStore,
        group: LayerId,
    }

    impl Desktop {
        fn new() -> Self {
            let mut store = LayerStore::new();
            let group = store.create_layer_with(
                LayerKind::Group,
                Size::new(f64::from(SCREEN.width), f64::from(SCREEN.height)),
            );
            Self { store, group }
        }

        /// Adds an opaque window on top of the stack.
        fn window(&mut self, r: IntRect) -> LayerId {
            let id = self.store.create_layer_with(
                LayerKind::Window(WindowProps::default()),
                Size::new(f64::from(r.width), f64::from(r.height)),
            );
            self.store.set_transform(
                id,
                Transform3d::from_translation(f64::from(r.x), f64::from(r.y), 0.0),
            );
            self.store.add_child(self.group, id);
            id
        }

        /// Runs a full pass, returning each listed window's visible region as
        /// seen by the painter.
        fn run(&mut self, windows: &[LayerId]) -> (PassSummary, Vec<Option<Region>>) {
            let _ = self.store.evaluate();
            let mut seen = Vec::new();
            let mut painter = |store: &LayerStore| {
                seen = windows
                    .iter()
                    .map(|w| store.visible_region(*w).cloned())
                    .collect();
            };
            let mut pass = OcclusionPass::new(SCREEN);
            let summary = pass.run(&mut self.store, self.group, &mut painter, &mut Tracer::none());
            assert_eq!(pass.state(), PassState::Done);
            (summary, seen)
        }
    }

    fn screen_minus(rects: &[IntRect]) -> Region {
        let mut r = Region::from_rect(SCREEN);
        for &hole in rects {
            r.subtract_rect(hole);
        }
        r
    }

    #[test]
    fn stacked_windows_scenario() {
        let mut d = Desktop::new();
        let w3 = d.window(SCREEN);
        let w2 = d.window(IntRect::new(0, 0, 100, 100));
        let w1 = d.window(IntRect::new(0, 0, 200, 200));

        let (summary, seen) = d.run(&[w1, w2, w3]);

        assert_eq!(seen[0], Some(Region::from_rect(IntRect::new(0, 0, 200, 200))));
        assert!(seen[1].as_ref().is_some_and(Region::is_empty));
        assert_eq!(seen[2], Some(screen_minus(&[IntRect::new(0, 0, 200, 200)])));

        assert_eq!(summary.culled, 3);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.remaining_area, 0);
        assert_eq!(summary.occluded_area(), SCREEN.area());
    }

    #[test]
    fn rotated_top_window_contributes_nothing() {
        let mut d = Desktop::new();
        let w3 = d.window(SCREEN);
        let w2 = d.window(IntRect::new(0, 0, 100, 100));
        let w1 = d.window(IntRect::new(0, 0, 200, 200));
        d.store
            .set_transform(w1, Transform3d::from_rotation_z(10.0_f64.to_radians()));

        let (summary, seen) = d.run(&[w1, w2, w3]);

        assert_eq!(seen[0], None);
        assert_eq!(seen[1], Some(Region::from_rect(IntRect::new(0, 0, 100, 100))));
        assert_eq!(seen[2], Some(screen_minus(&[IntRect::new(0, 0, 100, 100)])));
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn visible_regions_partition_the_surface() {
        let mut d = Desktop::new();
        let rects = [
            IntRect::new(0, 0, 512, 384),
            IntRect::new(512, 0, 512, 384),
            IntRect::new(0, 384, 512, 384),
            IntRect::new(512, 384, 512, 384),
            IntRect::new(300, 200, 400, 300),
            IntRect::new(-50, 700, 200, 200),
        ];
        let windows: Vec<_> = rects.iter().map(|r| d.window(*r)).collect();

        let (summary, seen) = d.run(&windows);
        assert_eq!(summary.remaining_area, 0);

        let mut union = Region::new();
        let mut total = 0;
        for (r, visible) in rects.iter().zip(&seen) {
            let mut screen = visible.clone().unwrap_or_default();
            screen.translate(r.x, r.y);
            total += screen.area();
            union.union(&screen);
        }
        // Every on-screen pixel is claimed by exactly one window.
        assert_eq!(total, SCREEN.area());
        assert_eq!(union, Region::from_rect(SCREEN));
    }

    #[test]
    fn fractional_width_keeps_partly_covered_column() {
        let mut d = Desktop::new();
        let bottom = d.window(SCREEN);
        let top = d.window(IntRect::new(0, 0, 100, 100));
        d.store.set_size(top, Size::new(100.5, 100.0));

        let (_, seen) = d.run(&[top, bottom]);

        // The top window touches column 100 but only covers half of it.
        let top_visible = seen[0].as_ref().unwrap();
        assert!(top_visible.contains_point(100, 0));
        let bottom_visible = seen[1].as_ref().unwrap();
        assert!(bottom_visible.contains_point(100, 0));
        assert!(!bottom_visible.contains_point(99, 0));
        assert_eq!(*bottom_visible, screen_minus(&[IntRect::new(0, 0, 100, 100)]));
    }

    #[test]
    fn far_off_screen_window_is_skipped() {
        let mut d = Desktop::new();
        let bottom = d.window(SCREEN);
        let far = d.window(IntRect::new(-2_147_483_000, 0, 1024, 768));

        let (summary, seen) = d.run(&[far, bottom]);

        assert_eq!(seen[0], None);
        assert_eq!(seen[1], Some(Region::from_rect(SCREEN)));
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    #[should_panic(expected = "reaches past the supported coordinate range")]
    fn out_of_range_surface_panics() {
        let _ = OcclusionPass::new(IntRect::new(i32::MAX - 10, 0, 1024, 768));
    }

    #[test]
    fn regions_are_cleared_after_run() {
        let mut d = Desktop::new();
        let w = d.window(IntRect::new(10, 10, 10, 10));
        let _ = d.run(&[w]);
        assert!(d.store.visible_region(w).is_none());
        assert!(d.store.beneath_region(w).is_none());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut d = Desktop::new();
        let w = d.window(IntRect::new(0, 0, 10, 10));
        let _ = d.store.evaluate();
        let mut pass = OcclusionPass::new(SCREEN);

        // Never culled.
        pass.reset(&mut d.store, d.group, &mut Tracer::none());
        assert_eq!(pass.frame_index(), 0);

        pass.cull_only(&mut d.store, d.group, &mut Tracer::none());
        assert_eq!(pass.state(), PassState::Running);
        assert!(d.store.visible_region(w).is_some());

        pass.reset(&mut d.store, d.group, &mut Tracer::none());
        pass.reset(&mut d.store, d.group, &mut Tracer::none());
        assert_eq!(pass.state(), PassState::Done);
        assert_eq!(pass.frame_index(), 1);
        assert!(d.store.visible_region(w).is_none());
    }

    #[test]
    #[should_panic(expected = "occlusion pass already running")]
    fn cull_twice_without_reset_panics() {
        let mut d = Desktop::new();
        let _ = d.store.evaluate();
        let mut pass = OcclusionPass::new(SCREEN);
        pass.cull_only(&mut d.store, d.group, &mut Tracer::none());
        pass.cull_only(&mut d.store, d.group, &mut Tracer::none());
    }

    #[test]
    fn painter_panic_still_resets() {
        let mut d = Desktop::new();
        let w = d.window(IntRect::new(0, 0, 10, 10));
        let _ = d.store.evaluate();
        let mut pass = OcclusionPass::new(SCREEN);

        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut painter = |_: &LayerStore| {
                panic!("paint failed");
            };
            pass.run(&mut d.store, d.group, &mut painter, &mut Tracer::none());
        }));

        assert!(result.is_err());
        assert_eq!(pass.state(), PassState::Done);
        assert!(d.store.visible_region(w).is_none());
    }

    #[test]
    fn transformed_group_disables_culling() {
        let mut d = Desktop::new();
        let below = d.window(SCREEN);
        let w = d.window(IntRect::new(0, 0, 100, 100));
        d.store
            .set_transform(d.group, Transform3d::from_translation(0.5, 0.0, 0.0));

        let (summary, seen) = d.run(&[w, below]);
        assert_eq!(summary.culled, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.remaining_area, SCREEN.area());
        assert_eq!(seen, [None, None]);
    }

    #[test]
    fn occlusion_reaches_into_nested_groups() {
        let mut d = Desktop::new();
        let bottom = d.window(SCREEN);
        let nested = d
            .store
            .create_layer_with(LayerKind::Group, Size::new(400.0, 400.0));
        d.store
            .set_transform(nested, Transform3d::from_translation(100.0, 100.0, 0.0));
        d.store.add_child(d.group, nested);
        let inner = d.store.create_layer_with(
            LayerKind::Window(WindowProps::default()),
            Size::new(50.0, 50.0),
        );
        d.store
            .set_transform(inner, Transform3d::from_translation(10.0, 20.0, 0.0));
        d.store.add_child(nested, inner);

        let (_, seen) = d.run(&[inner, bottom]);
        assert_eq!(seen[0], Some(Region::from_rect(IntRect::new(0, 0, 50, 50))));
        assert_eq!(seen[1], Some(screen_minus(&[IntRect::new(110, 120, 50, 50)])));
    }

    #[test]
    fn clip_shrinks_monotonically_across_passes() {
        let mut d = Desktop::new();
        let _ = d.window(IntRect::new(0, 0, 300, 300));
        let (first, _) = d.run(&[]);
        let _ = d.window(IntRect::new(200, 200, 300, 300));
        let (second, _) = d.run(&[]);
        assert!(first.remaining_area <= SCREEN.area());
        assert!(second.remaining_area < first.remaining_area);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn phases_are_traced_in_order() {
        use crate::trace::{NodeSkippedEvent, SkipReason, TraceSink};

        #[derive(Default)]
        struct Phases {
            log: Vec<(PhaseKind, bool)>,
            skipped: Vec<SkipReason>,
            summaries: u32,
        }
        impl TraceSink for Phases {
            fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
                self.log.push((e.phase, true));
            }
            fn on_phase_end(&mut self, e: &PhaseEndEvent) {
                self.log.push((e.phase, false));
            }
            fn on_node_skipped(&mut self, e: &NodeSkippedEvent) {
                self.skipped.push(e.reason);
            }
            fn on_pass_summary(&mut self, _: &PassSummary) {
                self.summaries += 1;
            }
        }

        let mut d = Desktop::new();
        let _ = d.window(IntRect::new(0, 0, 10, 10));
        let hidden = d.window(IntRect::new(0, 0, 10, 10));
        d.store.set_flags(
            hidden,
            crate::layer::LayerFlags {
                hidden: true,
                has_effects: false,
            },
        );
        let _ = d.store.evaluate();

        let mut sink = Phases::default();
        let mut pass = OcclusionPass::new(SCREEN);
        pass.run(
            &mut d.store,
            d.group,
            &mut |_: &LayerStore| {},
            &mut Tracer::new(&mut sink),
        );

        assert_eq!(
            sink.log,
            [
                (PhaseKind::Cull, true),
                (PhaseKind::Cull, false),
                (PhaseKind::Paint, true),
                (PhaseKind::Paint, false),
                (PhaseKind::Reset, true),
                (PhaseKind::Reset, false),
            ]
        );
        assert_eq!(sink.skipped, [SkipReason::Hidden]);
        assert_eq!(sink.summaries, 1);
    }
}
