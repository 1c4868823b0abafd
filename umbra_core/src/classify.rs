// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Detection of layers that paint as plain integer-translated rectangles.
//!
//! Region arithmetic is only valid for a layer whose on-screen footprint is
//! exactly its own untransformed bounds shifted by a whole number of pixels.
//! [`classify`] decides that from the layer's projected corners.
//!
//! All comparisons are done on 24.8 fixed-point values: every coordinate is
//! scaled by 256 and rounded to the nearest integer, then compared for exact
//! equality. A layer that is off the pixel grid by less than half of 1/256 of
//! a pixel is still accepted; anything further off is rejected. A false
//! negative only costs an optimization, while a false positive would clip
//! visible pixels, so there is no epsilon anywhere in this module.
//!
//! Quads or sizes reaching past [`COORD_LIMIT`] are rejected outright, which
//! keeps every fixed-point value and every later region translation far
//! from integer overflow.

use kurbo::{Point, Size};

use crate::geometry::{COORD_LIMIT, Quad};

/// Result of [`classify`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Alignment {
    /// Whether the quad is an unscaled, unrotated rectangle on the pixel grid.
    pub is_axis_aligned_integer: bool,
    /// Pixel x of the top-left corner (0 when not aligned).
    pub origin_x: i32,
    /// Pixel y of the top-left corner (0 when not aligned).
    pub origin_y: i32,
}

impl Alignment {
    const REJECTED: Self = Self {
        is_axis_aligned_integer: false,
        origin_x: 0,
        origin_y: 0,
    };

    /// Returns the integer origin if the quad was accepted.
    #[inline]
    #[must_use]
    pub const fn origin(self) -> Option<(i32, i32)> {
        if self.is_axis_aligned_integer {
            Some((self.origin_x, self.origin_y))
        } else {
            None
        }
    }
}

/// Fractional bits of the fixed-point representation.
const FIXED_SHIFT: u32 = 8;
const FIXED_ONE: i64 = 1 << FIXED_SHIFT;

#[expect(
    clippy::cast_possible_truncation,
    reason = "inputs are finite and rounded; out-of-range values saturate and then fail the grid check"
)]
fn to_fixed(p: Point) -> (i64, i64) {
    let scaled = Point::new(p.x * FIXED_ONE as f64, p.y * FIXED_ONE as f64).round();
    (scaled.x as i64, scaled.y as i64)
}

/// Decides whether `quad` is `width × height` translated by whole pixels.
///
/// `quad` is in the winding documented on [`Quad`]. A quad is accepted iff
///
/// 1. its top-left corner sits exactly on the pixel grid,
/// 2. its top edge is exactly `width` long and its left edge exactly `height`
///    long, and
/// 3. the top and bottom edges are horizontal and the left and right edges
///    vertical.
///
/// Quads with any corner, or sizes with either dimension, beyond
/// [`COORD_LIMIT`] are rejected.
///
/// On success the origin is the grid-aligned top-left corner, obtained by an
/// arithmetic shift so that negative coordinates floor correctly.
#[must_use]
pub fn classify(quad: &Quad, width: f64, height: f64) -> Alignment {
    let limit = f64::from(COORD_LIMIT);
    let in_range = |v: f64| v.is_finite() && v.abs() <= limit;
    if !in_range(width) || !in_range(height) || !quad.iter().all(|p| in_range(p.x) && in_range(p.y)) {
        return Alignment::REJECTED;
    }

    let size = Size::new(width * FIXED_ONE as f64, height * FIXED_ONE as f64).round();
    #[expect(
        clippy::cast_possible_truncation,
        reason = "finite and rounded; saturation can only cause a rejection"
    )]
    let (w, h) = (size.width as i64, size.height as i64);

    let [tl, bl, br, tr] = quad.map(to_fixed);

    let x = tl.0 >> FIXED_SHIFT;
    let y = tl.1 >> FIXED_SHIFT;

    // On the pixel grid?
    if x * FIXED_ONE != tl.0 || y * FIXED_ONE != tl.1 {
        return Alignment::REJECTED;
    }

    // Unscaled?
    if tr.0 - tl.0 != w || bl.1 - tl.1 != h {
        return Alignment::REJECTED;
    }

    // Unrotated and unskewed?
    if tl.0 != bl.0 || tl.1 != tr.1 || br.0 != tr.0 || br.1 != bl.1 {
        return Alignment::REJECTED;
    }

    match (i32::try_from(x), i32::try_from(y)) {
        (Ok(origin_x), Ok(origin_y)) => Alignment {
            is_axis_aligned_integer: true,
            origin_x,
            origin_y,
        },
        _ => Alignment::REJECTED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform3d;

    fn rect_quad(x: f64, y: f64, w: f64, h: f64) -> Quad {
        [
            Point::new(x, y),
            Point::new(x, y + h),
            Point::new(x + w, y + h),
            Point::new(x + w, y),
        ]
    }

    fn projected(xf: Transform3d, w: f64, h: f64) -> Quad {
        rect_quad(0.0, 0.0, w, h).map(|p| xf.transform_point(p))
    }

    #[test]
    fn integer_translation_is_accepted() {
        for &(x, y) in &[(0, 0), (1, 1), (17, 923), (-40, 12), (-1, -1), (3000, -3000)] {
            let quad = rect_quad(f64::from(x), f64::from(y), 200.0, 100.0);
            let a = classify(&quad, 200.0, 100.0);
            assert_eq!(a.origin(), Some((x, y)), "origin ({x}, {y})");
        }
    }

    #[test]
    fn negative_origin_floors_via_shift() {
        let a = classify(&rect_quad(-3.0, -256.0, 4.0, 4.0), 4.0, 4.0);
        assert_eq!(a.origin(), Some((-3, -256)));
    }

    #[test]
    fn subpixel_origin_is_rejected() {
        assert_eq!(classify(&rect_quad(10.5, 0.0, 20.0, 20.0), 20.0, 20.0).origin(), None);
        assert_eq!(classify(&rect_quad(0.0, -0.25, 20.0, 20.0), 20.0, 20.0).origin(), None);
        // 1/256 of a pixel is representable and must be rejected.
        assert_eq!(
            classify(&rect_quad(1.0 / 256.0, 0.0, 20.0, 20.0), 20.0, 20.0).origin(),
            None
        );
    }

    #[test]
    fn tiny_float_noise_is_tolerated() {
        let quad = rect_quad(100.0 + 1e-7, 50.0 - 1e-7, 20.0, 20.0);
        assert_eq!(classify(&quad, 20.0, 20.0).origin(), Some((100, 50)));
    }

    #[test]
    fn scaled_is_rejected() {
        let xf = Transform3d::from_translation(10.0, 10.0, 0.0) * Transform3d::from_scale(2.0, 2.0, 1.0);
        assert_eq!(classify(&projected(xf, 50.0, 50.0), 50.0, 50.0).origin(), None);
        let xf = Transform3d::from_scale(1.0, 0.5, 1.0);
        assert_eq!(classify(&projected(xf, 50.0, 50.0), 50.0, 50.0).origin(), None);
    }

    #[test]
    fn rotated_is_rejected() {
        for degrees in [10.0_f64, 45.0, 90.0, 180.0] {
            let xf = Transform3d::from_rotation_z(degrees.to_radians());
            let quad = projected(xf, 200.0, 200.0);
            assert_eq!(classify(&quad, 200.0, 200.0).origin(), None, "{degrees} deg");
        }
    }

    #[test]
    fn skewed_is_rejected() {
        let mut quad = rect_quad(0.0, 0.0, 20.0, 20.0);
        quad[2].x += 3.0;
        quad[3].x += 3.0;
        assert_eq!(classify(&quad, 20.0, 20.0).origin(), None);
    }

    #[test]
    fn non_finite_is_rejected() {
        let mut quad = rect_quad(0.0, 0.0, 20.0, 20.0);
        quad[1].y = f64::NAN;
        assert_eq!(classify(&quad, 20.0, 20.0), Alignment::default());
        assert_eq!(
            classify(&rect_quad(0.0, 0.0, 1.0, 1.0), f64::INFINITY, 1.0).origin(),
            None
        );
    }

    #[test]
    fn wrong_size_is_rejected() {
        let quad = rect_quad(0.0, 0.0, 20.0, 20.0);
        assert_eq!(classify(&quad, 21.0, 20.0).origin(), None);
        assert_eq!(classify(&quad, 20.0, 19.0).origin(), None);
    }

    #[test]
    fn far_off_grid_is_rejected() {
        let far = -2_147_483_000.0;
        let quad = rect_quad(far, 0.0, 1024.0, 768.0);
        assert_eq!(classify(&quad, 1024.0, 768.0).origin(), None);

        let edge = f64::from(COORD_LIMIT) - 10.0;
        let quad = rect_quad(edge, 0.0, 10.0, 10.0);
        assert_eq!(classify(&quad, 10.0, 10.0).origin(), Some((COORD_LIMIT - 10, 0)));
        let quad = rect_quad(edge, 0.0, 11.0, 10.0);
        assert_eq!(classify(&quad, 11.0, 10.0).origin(), None);
    }
}
