/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Value types that cross the boundary by value (vectors, colors, transforms) or through a handle (strings, arrays,
//! dictionaries, packed arrays).

mod aabb;
mod array;
mod color;
mod dictionary;
mod packed_array;
mod rect2;
mod string;
mod transforms;
mod variant;
mod vectors;

pub mod math;

pub use aabb::Aabb;
pub use array::{Array, ArrayKind};
pub use color::Color;
pub use dictionary::{Dictionary, DictionaryKind};
pub use packed_array::{PackedArray, PackedArrayElement, PackedByteArray, PackedColorArray, PackedFloat32Array};
pub use packed_array::{PackedFloat64Array, PackedInt32Array, PackedInt64Array, PackedVector2Array, PackedVector3Array};
pub use rect2::Rect2;
pub use string::GString;
pub use transforms::{Basis, Transform2D, Transform3D};
pub use variant::Variant;
pub use vectors::{Vector2, Vector2i, Vector3, Vector3i};

pub use crate::sys::real;

/// Constants of the `real` type, i.e. `f32` or `f64` depending on the `double-precision` feature.
pub mod real_consts {
    #[cfg(not(feature = "double-precision"))]
    pub use std::f32::consts::*;

    #[cfg(feature = "double-precision")]
    pub use std::f64::consts::*;
}

// Glam types matching `real`.
#[cfg(not(feature = "double-precision"))]
pub(crate) mod glam_types {
    pub type RVec2 = glam::Vec2;
    pub type RVec3 = glam::Vec3;
    pub type RMat3 = glam::Mat3;
    pub type RAffine2 = glam::Affine2;
}

#[cfg(feature = "double-precision")]
pub(crate) mod glam_types {
    pub type RVec2 = glam::DVec2;
    pub type RVec3 = glam::DVec3;
    pub type RMat3 = glam::DMat3;
    pub type RAffine2 = glam::DAffine2;
}
