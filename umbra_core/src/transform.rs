// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal column-major 4×4 transform.
//!
//! Layers carry a local transform relative to their parent; evaluation
//! composes them into a world transform, and the culling pass only ever asks
//! one question of the result: where do the layer's corners land on screen?
//! [`Transform3d::transform_point`] answers that with a full perspective
//! divide so that projected layers classify as transformed.

use core::ops::Mul;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Point;

/// A column-major 4×4 transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Z axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        #[cfg(feature = "std")]
        let (s, c) = radians.sin_cos();
        #[cfg(not(feature = "std"))]
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Maps a point on the layer's `z = 0` plane to screen space.
    ///
    /// The homogeneous result is divided by `w`; a point that projects to
    /// `w = 0` comes back non-finite.
    #[must_use]
    pub fn transform_point(&self, p: Point) -> Point {
        let c = &self.cols;
        let x = c[0][0] * p.x + c[1][0] * p.y + c[3][0];
        let y = c[0][1] * p.x + c[1][1] * p.y + c[3][1];
        let w = c[0][3] * p.x + c[1][3] * p.y + c[3][3];
        if w == 1.0 {
            Point::new(x, y)
        } else {
            Point::new(x / w, y / w)
        }
    }

    /// Is every entry of this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        for (j, col) in out.iter_mut().enumerate() {
            for (i, v) in col.iter_mut().enumerate() {
                *v = a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
            }
        }
        Self { cols: out }
    }
}
