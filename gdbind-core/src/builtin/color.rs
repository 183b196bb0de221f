/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::builtin::math::{ApproxEq, GlamConv};

/// Color in RGBA format, each component a 32-bit float in `0..=1` (values outside are allowed for HDR).
///
/// Unlike vectors, colors are always single precision on the boundary, independent of `double-precision`.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT_BLACK: Color = Color::from_rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::from_rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::from_rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::from_rgb(1.0, 0.0, 0.0);

    pub const fn from_rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub const fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self::from_rgba(r, g, b, 1.0)
    }

    /// Builds a color from 8-bit channels.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_rgba(from_u8(r), from_u8(g), from_u8(b), from_u8(a))
    }

    /// Packs the color as `0xRRGGBBAA`, clamping each channel.
    pub fn to_rgba32(self) -> u32 {
        let [r, g, b, a] = [self.r, self.g, self.b, self.a].map(to_u8);
        u32::from_be_bytes([r, g, b, a])
    }

    /// Linear interpolation towards `to` by `weight` in `0..=1`.
    pub fn lerp(self, to: Color, weight: f32) -> Self {
        Self::from_glam(self.to_glam().lerp(to.to_glam(), weight))
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

fn from_u8(c: u8) -> f32 {
    c as f32 / 255.0
}

fn to_u8(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl GlamConv for Color {
    type Glam = glam::Vec4;

    fn to_glam(self) -> glam::Vec4 {
        glam::Vec4::new(self.r, self.g, self.b, self.a)
    }

    fn from_glam(v: glam::Vec4) -> Self {
        Self::from_rgba(v.x, v.y, v.z, v.w)
    }
}

impl ApproxEq for Color {
    fn approx_eq(&self, other: &Self) -> bool {
        self.r.approx_eq(&other.r)
            && self.g.approx_eq(&other.g)
            && self.b.approx_eq(&other.b)
            && self.a.approx_eq(&other.a)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_8bit_round_trip() {
        let c = Color::from_rgba8(255, 128, 0, 255);
        assert_eq!(c.to_rgba32(), 0xff80_00ff);
        assert_eq!(Color::RED.to_rgba32(), 0xff00_00ff);
    }

    #[test]
    fn color_lerp() {
        let mid = Color::BLACK.lerp(Color::WHITE, 0.5);
        assert!(mid.approx_eq(&Color::from_rgb(0.5, 0.5, 0.5)));
    }
}
