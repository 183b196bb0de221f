/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::math::ApproxEq;
use crate::builtin::{real, Vector2};

/// 2D axis-aligned bounding box, as position and size.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Rect2 {
    pub position: Vector2,
    pub size: Vector2,
}

impl Rect2 {
    #[inline]
    pub const fn new(position: Vector2, size: Vector2) -> Self {
        Self { position, size }
    }

    #[inline]
    pub const fn from_components(x: real, y: real, width: real, height: real) -> Self {
        Self::new(Vector2::new(x, y), Vector2::new(width, height))
    }

    #[inline]
    pub fn end(&self) -> Vector2 {
        self.position + self.size
    }

    #[inline]
    pub fn area(&self) -> real {
        self.size.x * self.size.y
    }

    /// Whether `point` lies inside; the end edges are exclusive.
    #[inline]
    pub fn contains_point(&self, point: Vector2) -> bool {
        let end = self.end();
        point.x >= self.position.x && point.y >= self.position.y && point.x < end.x && point.y < end.y
    }
}

impl ApproxEq for Rect2 {
    fn approx_eq(&self, other: &Self) -> bool {
        self.position.approx_eq(&other.position) && self.size.approx_eq(&other.size)
    }
}
