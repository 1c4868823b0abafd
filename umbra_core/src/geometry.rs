// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer pixel geometry.
//!
//! Culling works on the pixel grid, so rectangles here are integral. Layer
//! geometry coming out of the scene graph is floating point ([`kurbo`]) and is
//! only snapped to this grid once [`classify`](crate::classify::classify) has
//! proven that snapping is exact.

use core::fmt;

/// Largest pixel coordinate magnitude culling works with.
///
/// Layers reaching past it are never culled and the paintable surface must
/// lie inside it, so that regions translated between any two frames keep
/// their edges well inside `i32`.
pub const COORD_LIMIT: i32 = 1 << 28;

/// A screen-space quad: the four projected corners of a layer.
///
/// Corners are in the winding top-left, bottom-left, bottom-right, top-right
/// of the untransformed layer, so an unrotated layer at `(x, y)` of size
/// `w × h` has the quad `[(x, y), (x, y + h), (x + w, y + h), (x + w, y)]`.
pub type Quad = [kurbo::Point; 4];

/// An axis-aligned rectangle on the integer pixel grid.
///
/// Rectangles with a non-positive width or height are empty.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IntRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl IntRect {
    /// The empty rectangle at the origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Creates a rectangle from its origin and size.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from its left, top, right and bottom edges.
    #[inline]
    #[must_use]
    pub const fn from_edges(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(self) -> i32 {
        self.y + self.height
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Number of pixels covered.
    #[inline]
    #[must_use]
    pub const fn area(self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.width as u64 * self.height as u64
        }
    }

    /// Returns `true` if every edge lies within [`COORD_LIMIT`] of the origin.
    #[must_use]
    pub const fn is_within_coord_limit(self) -> bool {
        let limit = COORD_LIMIT as i64;
        let (x, y) = (self.x as i64, self.y as i64);
        let (right, bottom) = (x + self.width as i64, y + self.height as i64);
        x >= -limit && y >= -limit && right <= limit && bottom <= limit
    }

    /// Returns the overlap of two rectangles, or `None` if they are disjoint.
    #[must_use]
    pub fn intersect(self, other: Self) -> Option<Self> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        let r = Self::from_edges(x0, y0, x1, y1);
        if r.is_empty() { None } else { Some(r) }
    }

    /// Returns the rectangle moved by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Returns `true` if `other` lies entirely within `self`.
    #[must_use]
    pub const fn contains_rect(self, other: Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Splits `self − other` into at most four disjoint rectangles.
    ///
    /// Unused slots are [`IntRect::ZERO`]; callers filter with
    /// [`is_empty`](Self::is_empty). The top and bottom strips span the full
    /// width of `self`; the left and right strips fill the band between them.
    #[must_use]
    pub fn subtract(self, other: Self) -> [Self; 4] {
        let mut out = [Self::ZERO; 4];
        let Some(overlap) = self.intersect(other) else {
            out[0] = self;
            return out;
        };
        if overlap.y > self.y {
            out[0] = Self::from_edges(self.x, self.y, self.right(), overlap.y);
        }
        if overlap.bottom() < self.bottom() {
            out[1] = Self::from_edges(self.x, overlap.bottom(), self.right(), self.bottom());
        }
        if overlap.x > self.x {
            out[2] = Self::from_edges(self.x, overlap.y, overlap.x, overlap.bottom());
        }
        if overlap.right() < self.right() {
            out[3] = Self::from_edges(overlap.right(), overlap.y, self.right(), overlap.bottom());
        }
        out
    }

    /// Returns the smallest rectangle containing both.
    #[must_use]
    pub fn union_bounds(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }
}

impl fmt::Debug for IntRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

impl From<IntRect> for kurbo::Rect {
    fn from(r: IntRect) -> Self {
        Self::new(
            f64::from(r.x),
            f64::from(r.y),
            f64::from(r.right()),
            f64::from(r.bottom()),
        )
    }
}
