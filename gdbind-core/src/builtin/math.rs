/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Glam conversions and approximate comparison.

use crate::builtin::real;

/// Tolerance used by [`ApproxEq`] for `real` components.
pub const CMP_EPSILON: real = 0.00001;

/// Approximate equality-comparison of geometric types.
///
/// Mostly used for tests; no precision guarantees are given.
pub trait ApproxEq: PartialEq {
    fn approx_eq(&self, other: &Self) -> bool;
}

impl ApproxEq for f32 {
    fn approx_eq(&self, other: &Self) -> bool {
        is_equal_approx_f32(*self, *other)
    }
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &Self) -> bool {
        // Infinity equality is not covered by the tolerance check.
        *self == *other || (self - other).abs() < (CMP_EPSILON as f64) * self.abs().max(1.0)
    }
}

fn is_equal_approx_f32(a: f32, b: f32) -> bool {
    a == b || (a - b).abs() < (CMP_EPSILON as f32) * a.abs().max(1.0)
}

/// Asserts that two values are approximately equal, using [`ApproxEq`].
#[macro_export]
macro_rules! assert_eq_approx {
    ($actual:expr, $expected:expr $(,)?) => {
        match (&$actual, &$expected) {
            (a, b) => assert!(
                $crate::builtin::math::ApproxEq::approx_eq(a, b),
                "\n  left: {:?},\n right: {:?}",
                a,
                b
            ),
        }
    };
}

/// Conversion between a builtin and its `glam` counterpart.
pub trait GlamConv: Sized {
    type Glam;

    fn to_glam(self) -> Self::Glam;
    fn from_glam(glam: Self::Glam) -> Self;

    /// Applies a function in glam space and converts back.
    #[inline]
    fn glam<F>(self, f: F) -> Self
    where
        F: FnOnce(Self::Glam) -> Self::Glam,
    {
        Self::from_glam(f(self.to_glam()))
    }
}
