/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ops::Mul;

use crate::builtin::glam_types::{RAffine2, RMat3};
use crate::builtin::math::{ApproxEq, GlamConv};
use crate::builtin::{real, Vector2, Vector3};

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Transform2D

/// Affine 2D transform: two basis vectors plus an origin (2x3 matrix, column-major in memory).
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Transform2D {
    /// First basis vector (the X axis).
    pub a: Vector2,
    /// Second basis vector (the Y axis).
    pub b: Vector2,
    pub origin: Vector2,
}

impl Transform2D {
    pub const IDENTITY: Self = Self::from_cols(Vector2::new(1.0, 0.0), Vector2::new(0.0, 1.0), Vector2::ZERO);

    pub const fn from_cols(a: Vector2, b: Vector2, origin: Vector2) -> Self {
        Self { a, b, origin }
    }

    /// Rotation by `angle` radians, followed by translation to `origin`.
    pub fn from_angle_origin(angle: real, origin: Vector2) -> Self {
        Self::from_glam(RAffine2::from_angle_translation(angle, origin.to_glam()))
    }

    pub fn rotation(&self) -> real {
        self.a.y.atan2(self.a.x)
    }

    /// Transforms a point: basis, then origin.
    pub fn xform(&self, v: Vector2) -> Vector2 {
        Vector2::from_glam(self.to_glam().transform_point2(v.to_glam()))
    }

    /// Inverse assuming the basis is invertible.
    pub fn affine_inverse(&self) -> Self {
        self.glam(|t| t.inverse())
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform2D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from_glam(self.to_glam() * rhs.to_glam())
    }
}

impl GlamConv for Transform2D {
    type Glam = RAffine2;

    fn to_glam(self) -> RAffine2 {
        RAffine2::from_cols(self.a.to_glam(), self.b.to_glam(), self.origin.to_glam())
    }

    fn from_glam(t: RAffine2) -> Self {
        Self::from_cols(
            Vector2::from_glam(t.matrix2.x_axis),
            Vector2::from_glam(t.matrix2.y_axis),
            Vector2::from_glam(t.translation),
        )
    }
}

impl ApproxEq for Transform2D {
    fn approx_eq(&self, other: &Self) -> bool {
        self.a.approx_eq(&other.a) && self.b.approx_eq(&other.b) && self.origin.approx_eq(&other.origin)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Basis

/// 3x3 matrix for 3D rotation and scale, stored as three rows (the engine's layout).
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Basis {
    pub rows: [Vector3; 3],
}

impl Basis {
    pub const IDENTITY: Self = Self::from_rows(
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
    );

    pub const fn from_rows(x: Vector3, y: Vector3, z: Vector3) -> Self {
        Self { rows: [x, y, z] }
    }

    /// Rotation of `angle` radians around the unit vector `axis`.
    pub fn from_axis_angle(axis: Vector3, angle: real) -> Self {
        Self::from_glam(RMat3::from_axis_angle(axis.to_glam(), angle))
    }

    pub fn from_scale(scale: Vector3) -> Self {
        Self::from_glam(RMat3::from_diagonal(scale.to_glam()))
    }

    pub fn determinant(&self) -> real {
        self.to_glam().determinant()
    }

    pub fn transposed(&self) -> Self {
        self.glam(|m| m.transpose())
    }

    pub fn xform(&self, v: Vector3) -> Vector3 {
        Vector3::from_glam(self.to_glam() * v.to_glam())
    }
}

impl Default for Basis {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Basis {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from_glam(self.to_glam() * rhs.to_glam())
    }
}

impl GlamConv for Basis {
    type Glam = RMat3;

    fn to_glam(self) -> RMat3 {
        let [x, y, z] = self.rows.map(Vector3::to_glam);
        RMat3::from_cols(x, y, z).transpose()
    }

    fn from_glam(m: RMat3) -> Self {
        let rows = m.transpose();
        Self::from_rows(
            Vector3::from_glam(rows.x_axis),
            Vector3::from_glam(rows.y_axis),
            Vector3::from_glam(rows.z_axis),
        )
    }
}

impl ApproxEq for Basis {
    fn approx_eq(&self, other: &Self) -> bool {
        self.rows.iter().zip(other.rows.iter()).all(|(a, b)| a.approx_eq(b))
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Transform3D

/// Affine 3D transform: a [`Basis`] plus an origin.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Transform3D {
    pub basis: Basis,
    pub origin: Vector3,
}

impl Transform3D {
    pub const IDENTITY: Self = Self::new(Basis::IDENTITY, Vector3::ZERO);

    pub const fn new(basis: Basis, origin: Vector3) -> Self {
        Self { basis, origin }
    }

    pub fn xform(&self, v: Vector3) -> Vector3 {
        self.basis.xform(v) + self.origin
    }

    pub fn translated(&self, offset: Vector3) -> Self {
        Self::new(self.basis, self.origin + offset)
    }
}

impl Mul for Transform3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(self.basis * rhs.basis, self.xform(rhs.origin))
    }
}

impl ApproxEq for Transform3D {
    fn approx_eq(&self, other: &Self) -> bool {
        self.basis.approx_eq(&other.basis) && self.origin.approx_eq(&other.origin)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
