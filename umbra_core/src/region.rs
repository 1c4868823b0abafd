// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel regions as sets of disjoint rectangles.
//!
//! [`Region`] supports the handful of boolean operations the culling pass
//! needs: union with a rectangle, subtraction, intersection, translation and
//! containment tests. It is not a general-purpose region library; it keeps no
//! banded representation and never coalesces adjacent rectangles, so the
//! rectangle list may be longer than the minimal decomposition. Equality is
//! by coverage, not by decomposition.

use alloc::vec::Vec;

use crate::geometry::IntRect;

/// How a rectangle relates to a region.
///
/// Mirrors the classic cairo/pixman overlap classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Overlap {
    /// The rectangle lies entirely inside the region.
    In,
    /// The rectangle does not touch the region.
    Out,
    /// The rectangle is partially inside the region.
    Part,
}

/// A set of screen pixels, stored as non-empty pairwise-disjoint rectangles.
#[derive(Clone, Debug, Default)]
pub struct Region {
    rects: Vec<IntRect>,
}

impl Region {
    /// Creates an empty region.
    #[must_use]
    pub const fn new() -> Self {
        Self { rects: Vec::new() }
    }

    /// Creates a region covering a single rectangle.
    #[must_use]
    pub fn from_rect(rect: IntRect) -> Self {
        let mut region = Self::new();
        if !rect.is_empty() {
            region.rects.push(rect);
        }
        region
    }

    /// Creates a region covering the union of the given rectangles.
    #[must_use]
    pub fn from_rects(rects: &[IntRect]) -> Self {
        let mut region = Self::new();
        for &r in rects {
            region.union_rect(r);
        }
        region
    }

    /// Returns `true` if the region covers no pixels.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// The disjoint rectangles making up the region, in no particular order.
    #[inline]
    #[must_use]
    pub fn rects(&self) -> &[IntRect] {
        &self.rects
    }

    /// Number of rectangles in the current decomposition.
    #[inline]
    #[must_use]
    pub fn num_rects(&self) -> usize {
        self.rects.len()
    }

    /// Number of pixels covered.
    #[must_use]
    pub fn area(&self) -> u64 {
        self.rects.iter().map(|r| r.area()).sum()
    }

    /// Smallest rectangle containing the whole region.
    ///
    /// Returns [`IntRect::ZERO`] for an empty region.
    #[must_use]
    pub fn extents(&self) -> IntRect {
        self.rects
            .iter()
            .fold(IntRect::ZERO, |acc, r| acc.union_bounds(*r))
    }

    /// Moves every pixel of the region by `(dx, dy)`.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        if dx == 0 && dy == 0 {
            return;
        }
        for r in &mut self.rects {
            *r = r.translate(dx, dy);
        }
    }

    /// Adds `rect` to the region.
    pub fn union_rect(&mut self, rect: IntRect) {
        if rect.is_empty() {
            return;
        }
        // Only the parts of `rect` not already covered are appended, which
        // keeps the stored rectangles disjoint.
        let mut pieces = Vec::from([rect]);
        for &existing in &self.rects {
            pieces = pieces
                .into_iter()
                .flat_map(|p| p.subtract(existing))
                .filter(|p| !p.is_empty())
                .collect();
            if pieces.is_empty() {
                return;
            }
        }
        self.rects.extend(pieces);
    }

    /// Adds every pixel of `other` to the region.
    pub fn union(&mut self, other: &Self) {
        for &r in &other.rects {
            self.union_rect(r);
        }
    }

    /// Removes `rect` from the region.
    pub fn subtract_rect(&mut self, rect: IntRect) {
        if rect.is_empty() || self.is_empty() {
            return;
        }
        let rects = core::mem::take(&mut self.rects);
        self.rects = rects
            .into_iter()
            .flat_map(|r| r.subtract(rect))
            .filter(|r| !r.is_empty())
            .collect();
    }

    /// Removes every pixel of `other` from the region.
    pub fn subtract(&mut self, other: &Self) {
        for &r in &other.rects {
            if self.is_empty() {
                return;
            }
            self.subtract_rect(r);
        }
    }

    /// Restricts the region to `rect`.
    pub fn intersect_rect(&mut self, rect: IntRect) {
        self.rects = self
            .rects
            .iter()
            .filter_map(|r| r.intersect(rect))
            .collect();
    }

    /// Restricts the region to the pixels also covered by `other`.
    pub fn intersect(&mut self, other: &Self) {
        // Both inputs are disjoint, so pairwise overlaps are disjoint too.
        let mut out = Vec::new();
        for a in &self.rects {
            out.extend(other.rects.iter().filter_map(|b| a.intersect(*b)));
        }
        self.rects = out;
    }

    /// Classifies how `rect` relates to the region.
    ///
    /// An empty rectangle is always [`Overlap::Out`].
    #[must_use]
    pub fn contains_rect(&self, rect: IntRect) -> Overlap {
        let target = rect.area();
        if target == 0 {
            return Overlap::Out;
        }
        let covered: u64 = self
            .rects
            .iter()
            .filter_map(|r| r.intersect(rect))
            .map(IntRect::area)
            .sum();
        if covered == 0 {
            Overlap::Out
        } else if covered == target {
            Overlap::In
        } else {
            Overlap::Part
        }
    }

    /// Returns `true` if the pixel `(x, y)` is in the region.
    #[must_use]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.rects
            .iter()
            .any(|r| x >= r.x && x < r.right() && y >= r.y && y < r.bottom())
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        let area = self.area();
        if area != other.area() {
            return false;
        }
        let mut common = self.clone();
        common.intersect(other);
        common.area() == area
    }
}

impl Eq for Region {}

impl From<IntRect> for Region {
    fn from(rect: IntRect) -> Self {
        Self::from_rect(rect)
    }
}
