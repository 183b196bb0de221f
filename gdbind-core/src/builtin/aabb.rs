/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::math::ApproxEq;
use crate::builtin::{real, Vector3};

/// Axis-aligned bounding box in 3D space.
///
/// `Aabb` consists of a position and a size: six `real` values in native layout. The 2D counterpart is
/// [`Rect2`](super::Rect2).
#[derive(Default, Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Aabb {
    pub position: Vector3,
    pub size: Vector3,
}

impl Aabb {
    /// Create a new `Aabb` from a position and a size.
    #[inline]
    pub const fn new(position: Vector3, size: Vector3) -> Self {
        Self { position, size }
    }

    /// Smallest box containing both corners, in any order.
    #[inline]
    pub fn from_corners(a: Vector3, b: Vector3) -> Self {
        let position = a.coord_min(b);
        Self {
            position,
            size: a.coord_max(b) - position,
        }
    }

    /// The end of the `Aabb` calculated as `position + size`.
    #[inline]
    pub fn end(&self) -> Vector3 {
        self.position + self.size
    }

    #[inline]
    pub fn volume(&self) -> real {
        self.size.x * self.size.y * self.size.z
    }

    #[inline]
    pub fn center(&self) -> Vector3 {
        self.position + self.size * 0.5
    }

    /// Smallest box enclosing `self` and `point`.
    pub fn expand(&self, point: Vector3) -> Self {
        Self::from_corners(self.position.coord_min(point), self.end().coord_max(point))
    }

    /// Smallest box enclosing both boxes.
    pub fn merge(&self, other: &Aabb) -> Self {
        Self::from_corners(
            self.position.coord_min(other.position),
            self.end().coord_max(other.end()),
        )
    }

    /// Whether the boxes overlap; touching faces do not count.
    pub fn intersects(&self, other: &Aabb) -> bool {
        let (a_end, b_end) = (self.end(), other.end());
        self.position.x < b_end.x
            && other.position.x < a_end.x
            && self.position.y < b_end.y
            && other.position.y < a_end.y
            && self.position.z < b_end.z
            && other.position.z < a_end.z
    }
}

impl ApproxEq for Aabb {
    fn approx_eq(&self, other: &Self) -> bool {
        self.position.approx_eq(&other.position) && self.size.approx_eq(&other.size)
    }
}
