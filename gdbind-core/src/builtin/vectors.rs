/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::builtin::glam_types::{RVec2, RVec3};
use crate::builtin::math::{ApproxEq, GlamConv};
use crate::builtin::real;

/// Component-wise operators shared by all vector types.
macro_rules! impl_vector_ops {
    ($Vector:ident, $Scalar:ty, ($($comp:ident),+)) => {
        impl $Vector {
            /// Vector with all components set to `value`.
            #[inline]
            pub const fn splat(value: $Scalar) -> Self {
                Self { $($comp: value),+ }
            }
        }

        impl Add for $Vector {
            type Output = Self;

            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self { $($comp: self.$comp + rhs.$comp),+ }
            }
        }

        impl AddAssign for $Vector {
            #[inline]
            fn add_assign(&mut self, rhs: Self) {
                $(self.$comp += rhs.$comp;)+
            }
        }

        impl Sub for $Vector {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self { $($comp: self.$comp - rhs.$comp),+ }
            }
        }

        impl SubAssign for $Vector {
            #[inline]
            fn sub_assign(&mut self, rhs: Self) {
                $(self.$comp -= rhs.$comp;)+
            }
        }

        impl Mul<$Scalar> for $Vector {
            type Output = Self;

            #[inline]
            fn mul(self, rhs: $Scalar) -> Self {
                Self { $($comp: self.$comp * rhs),+ }
            }
        }

        impl Neg for $Vector {
            type Output = Self;

            #[inline]
            fn neg(self) -> Self {
                Self { $($comp: -self.$comp),+ }
            }
        }
    };
}

/// Functions only meaningful for floating-point vectors.
macro_rules! impl_float_vector_fns {
    ($Vector:ident, ($($comp:ident),+)) => {
        impl $Vector {
            #[inline]
            pub fn dot(self, with: Self) -> real {
                0.0 $(+ self.$comp * with.$comp)+
            }

            #[inline]
            pub fn length_squared(self) -> real {
                self.dot(self)
            }

            #[inline]
            pub fn length(self) -> real {
                self.length_squared().sqrt()
            }

            /// Vector scaled to unit length, or zero if the length is zero.
            #[inline]
            pub fn normalized(self) -> Self {
                self.glam(|v| v.normalize_or_zero())
            }

            /// True if all components are finite (not NaN, not infinite).
            #[inline]
            pub fn is_finite(self) -> bool {
                true $(&& self.$comp.is_finite())+
            }
        }

        impl ApproxEq for $Vector {
            #[inline]
            fn approx_eq(&self, other: &Self) -> bool {
                true $(&& self.$comp.approx_eq(&other.$comp))+
            }
        }
    };
}

macro_rules! impl_vector_display {
    ($Vector:ident, ($first:ident $(, $comp:ident)*)) => {
        impl fmt::Display for $Vector {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "({}", self.$first)?;
                $(write!(f, ", {}", self.$comp)?;)*
                write!(f, ")")
            }
        }
    };
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// 2D

/// Vector used for 2D math using floating point coordinates.
///
/// Components are `real`: `f32` by default, `f64` with the `double-precision` feature.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Vector2 {
    pub x: real,
    pub y: real,
}

impl Vector2 {
    pub const ZERO: Self = Self::splat(0.0);
    pub const ONE: Self = Self::splat(1.0);
    pub const RIGHT: Self = Self::new(1.0, 0.0);
    pub const DOWN: Self = Self::new(0.0, 1.0);

    #[inline]
    pub const fn new(x: real, y: real) -> Self {
        Self { x, y }
    }

    /// Unit vector rotated by `angle` radians from the positive X axis.
    #[inline]
    pub fn from_angle(angle: real) -> Self {
        Self::from_glam(RVec2::from_angle(angle))
    }

    /// Angle with respect to the positive X axis, in radians.
    #[inline]
    pub fn angle(self) -> real {
        self.y.atan2(self.x)
    }

    /// Components truncated towards zero.
    #[inline]
    pub fn cast_int(self) -> Vector2i {
        Vector2i::new(self.x as i32, self.y as i32)
    }
}

impl_vector_ops!(Vector2, real, (x, y));
impl_float_vector_fns!(Vector2, (x, y));
impl_vector_display!(Vector2, (x, y));

impl GlamConv for Vector2 {
    type Glam = RVec2;

    #[inline]
    fn to_glam(self) -> RVec2 {
        RVec2::new(self.x, self.y)
    }

    #[inline]
    fn from_glam(v: RVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Vector used for 2D math using integer coordinates, e.g. tile map cells.
#[derive(Default, Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Vector2i {
    pub x: i32,
    pub y: i32,
}

impl Vector2i {
    pub const ZERO: Self = Self::splat(0);
    pub const ONE: Self = Self::splat(1);

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn cast_float(self) -> Vector2 {
        Vector2::new(self.x as real, self.y as real)
    }
}

impl_vector_ops!(Vector2i, i32, (x, y));
impl_vector_display!(Vector2i, (x, y));

impl GlamConv for Vector2i {
    type Glam = glam::IVec2;

    #[inline]
    fn to_glam(self) -> glam::IVec2 {
        glam::IVec2::new(self.x, self.y)
    }

    #[inline]
    fn from_glam(v: glam::IVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// 3D

/// Vector used for 3D math using floating point coordinates.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Vector3 {
    pub x: real,
    pub y: real,
    pub z: real,
}

impl Vector3 {
    pub const ZERO: Self = Self::splat(0.0);
    pub const ONE: Self = Self::splat(1.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);

    #[inline]
    pub const fn new(x: real, y: real, z: real) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn cross(self, with: Self) -> Self {
        Self::from_glam(self.to_glam().cross(with.to_glam()))
    }

    /// Component-wise minimum.
    #[inline]
    pub fn coord_min(self, other: Self) -> Self {
        Self::from_glam(self.to_glam().min(other.to_glam()))
    }

    /// Component-wise maximum.
    #[inline]
    pub fn coord_max(self, other: Self) -> Self {
        Self::from_glam(self.to_glam().max(other.to_glam()))
    }

    #[inline]
    pub fn cast_int(self) -> Vector3i {
        Vector3i::new(self.x as i32, self.y as i32, self.z as i32)
    }
}

impl_vector_ops!(Vector3, real, (x, y, z));
impl_float_vector_fns!(Vector3, (x, y, z));
impl_vector_display!(Vector3, (x, y, z));

impl GlamConv for Vector3 {
    type Glam = RVec3;

    #[inline]
    fn to_glam(self) -> RVec3 {
        RVec3::new(self.x, self.y, self.z)
    }

    #[inline]
    fn from_glam(v: RVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Vector used for 3D math using integer coordinates.
#[derive(Default, Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Vector3i {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Vector3i {
    pub const ZERO: Self = Self::splat(0);

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl_vector_ops!(Vector3i, i32, (x, y, z));
impl_vector_display!(Vector3i, (x, y, z));

impl GlamConv for Vector3i {
    type Glam = glam::IVec3;

    #[inline]
    fn to_glam(self) -> glam::IVec3 {
        glam::IVec3::new(self.x, self.y, self.z)
    }

    #[inline]
    fn from_glam(v: glam::IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_eq_approx;

    #[test]
    fn vector2_arithmetic() {
        let a = Vector2::new(3.0, 4.0);
        assert_eq!(a.length(), 5.0);
        assert_eq!(a + Vector2::ONE, Vector2::new(4.0, 5.0));
        assert_eq!(-a, Vector2::new(-3.0, -4.0));
        assert_eq_approx!(a.normalized(), Vector2::new(0.6, 0.8));
        assert_eq!(Vector2::ZERO.normalized(), Vector2::ZERO);
        assert_eq!(a.to_string(), "(3, 4)");
    }

    #[test]
    fn vector3_cross_and_bounds() {
        let x = Vector3::new(1.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(y), Vector3::new(0.0, 0.0, 1.0));

        let a = Vector3::new(1.0, 5.0, -2.0);
        let b = Vector3::new(3.0, -1.0, 0.0);
        assert_eq!(a.coord_min(b), Vector3::new(1.0, -1.0, -2.0));
        assert_eq!(a.coord_max(b), Vector3::new(3.0, 5.0, 0.0));
    }

    #[test]
    fn int_float_casts() {
        assert_eq!(Vector2::new(2.7, -1.2).cast_int(), Vector2i::new(2, -1));
        assert_eq!(Vector2i::new(4, 5).cast_float(), Vector2::new(4.0, 5.0));
        assert_eq!(Vector3i::new(1, 2, 3) + Vector3i::new(1, 1, 1), Vector3i::new(2, 3, 4));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn vector_serde() {
        let v = Vector2i::new(7, -3);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"x":7,"y":-3}"#);

        let back: Vector2i = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
