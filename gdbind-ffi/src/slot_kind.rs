/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::mem::size_of;

use crate::real;

/// Native representation of one argument or return slot.
///
/// The discriminants are part of the binary contract: they are folded into signature hashes and passed to
/// `packed_array_new_from` as element kinds.
#[repr(u32)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SlotKind {
    Nil = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    String = 4,
    Vector2 = 5,
    Vector2i = 6,
    Rect2 = 7,
    Vector3 = 8,
    Vector3i = 9,
    Transform2D = 10,
    Color = 11,
    Aabb = 12,
    Basis = 13,
    Transform3D = 14,
    Object = 15,
    Array = 16,
    Dictionary = 17,
    PackedByteArray = 18,
    PackedInt32Array = 19,
    PackedInt64Array = 20,
    PackedFloat32Array = 21,
    PackedFloat64Array = 22,
    PackedVector2Array = 23,
    PackedVector3Array = 24,
    PackedColorArray = 25,
    /// Packed array element only: 32-bit integer.
    Int32 = 26,
    /// Packed array element only: 32-bit float.
    Float32 = 27,
    /// Packed array element only: byte.
    Byte = 28,
}

impl SlotKind {
    pub const ALL: [SlotKind; 29] = [
        SlotKind::Nil,
        SlotKind::Bool,
        SlotKind::Int,
        SlotKind::Float,
        SlotKind::String,
        SlotKind::Vector2,
        SlotKind::Vector2i,
        SlotKind::Rect2,
        SlotKind::Vector3,
        SlotKind::Vector3i,
        SlotKind::Transform2D,
        SlotKind::Color,
        SlotKind::Aabb,
        SlotKind::Basis,
        SlotKind::Transform3D,
        SlotKind::Object,
        SlotKind::Array,
        SlotKind::Dictionary,
        SlotKind::PackedByteArray,
        SlotKind::PackedInt32Array,
        SlotKind::PackedInt64Array,
        SlotKind::PackedFloat32Array,
        SlotKind::PackedFloat64Array,
        SlotKind::PackedVector2Array,
        SlotKind::PackedVector3Array,
        SlotKind::PackedColorArray,
        SlotKind::Int32,
        SlotKind::Float32,
        SlotKind::Byte,
    ];

    /// Size in bytes of the native representation.
    pub const fn byte_size(self) -> usize {
        let r = size_of::<real>();
        match self {
            SlotKind::Nil => 0,
            SlotKind::Bool | SlotKind::Byte => 1,
            SlotKind::Int32 | SlotKind::Float32 => 4,
            SlotKind::Int | SlotKind::Float => 8,
            SlotKind::String | SlotKind::Object | SlotKind::Array | SlotKind::Dictionary => size_of::<usize>(),
            SlotKind::PackedByteArray
            | SlotKind::PackedInt32Array
            | SlotKind::PackedInt64Array
            | SlotKind::PackedFloat32Array
            | SlotKind::PackedFloat64Array
            | SlotKind::PackedVector2Array
            | SlotKind::PackedVector3Array
            | SlotKind::PackedColorArray => 2 * size_of::<usize>(),
            SlotKind::Vector2 => 2 * r,
            SlotKind::Vector2i => 8,
            SlotKind::Rect2 => 4 * r,
            SlotKind::Vector3 => 3 * r,
            SlotKind::Vector3i => 12,
            SlotKind::Transform2D => 6 * r,
            SlotKind::Color => 16,
            SlotKind::Aabb => 6 * r,
            SlotKind::Basis => 9 * r,
            SlotKind::Transform3D => 12 * r,
        }
    }

    /// Number of 8-byte frame words a value of this kind occupies.
    pub const fn words(self) -> usize {
        self.byte_size().div_ceil(8)
    }

    pub const fn ord(self) -> u32 {
        self as u32
    }

    pub fn try_from_ord(ord: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.ord() == ord)
    }

    /// Whether a value of this kind is a handle to native-managed memory.
    pub const fn is_handle(self) -> bool {
        matches!(self, SlotKind::String | SlotKind::Object | SlotKind::Array | SlotKind::Dictionary)
            || self.packed_element().is_some()
    }

    /// Element kind of a packed array kind, `None` for every other kind.
    pub const fn packed_element(self) -> Option<SlotKind> {
        let element = match self {
            SlotKind::PackedByteArray => SlotKind::Byte,
            SlotKind::PackedInt32Array => SlotKind::Int32,
            SlotKind::PackedInt64Array => SlotKind::Int,
            SlotKind::PackedFloat32Array => SlotKind::Float32,
            SlotKind::PackedFloat64Array => SlotKind::Float,
            SlotKind::PackedVector2Array => SlotKind::Vector2,
            SlotKind::PackedVector3Array => SlotKind::Vector3,
            SlotKind::PackedColorArray => SlotKind::Color,
            _ => return None,
        };
        Some(element)
    }

    /// Packed array kind holding elements of kind `element`, if the engine has one.
    pub fn packed_of(element: SlotKind) -> Option<SlotKind> {
        Self::ALL.into_iter().find(|kind| kind.packed_element() == Some(element))
    }

    /// Whether values of this kind can be stored in an `Array` or `Dictionary`.
    pub const fn is_variant_element(self) -> bool {
        matches!(
            self,
            SlotKind::Nil
                | SlotKind::Bool
                | SlotKind::Int
                | SlotKind::Float
                | SlotKind::String
                | SlotKind::Vector2
                | SlotKind::Vector2i
                | SlotKind::Vector3
                | SlotKind::Vector3i
                | SlotKind::Color
        )
    }
}

/// Size of the buffer the host provides for one `Array` or `Dictionary` element read back from the engine.
pub const VARIANT_ELEMENT_MAX_SIZE: usize = 32;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Signature hashing

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;
const RETURN_MARKER: u32 = 0xff;

const fn fnv_step(hash: u32, value: u32) -> u32 {
    let bytes = value.to_le_bytes();
    let mut hash = hash;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// Initial value of a running signature hash, before any argument is folded in.
pub const SIGNATURE_SEED: u32 = FNV_OFFSET;

/// Folds one argument kind into a running signature hash.
pub const fn signature_step(hash: u32, arg: SlotKind) -> u32 {
    fnv_step(hash, arg.ord())
}

/// Completes a running signature hash with the return kind.
pub const fn signature_finish(hash: u32, ret: SlotKind) -> u32 {
    fnv_step(fnv_step(hash, RETURN_MARKER), ret.ord())
}

/// Hash identifying a method signature, as passed to `classdb_get_method_bind`.
///
/// Computed identically by generated wrappers and by the engine, so that a bind is only handed out when both sides agree on
/// the argument layout.
pub const fn signature_hash(ret: SlotKind, args: &[SlotKind]) -> u32 {
    let mut hash = SIGNATURE_SEED;
    let mut i = 0;
    while i < args.len() {
        hash = signature_step(hash, args[i]);
        i += 1;
    }
    signature_finish(hash, ret)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_round_up() {
        assert_eq!(SlotKind::Nil.words(), 0);
        assert_eq!(SlotKind::Bool.words(), 1);
        assert_eq!(SlotKind::Int.words(), 1);
        assert_eq!(SlotKind::Color.words(), 2);
        assert_eq!(SlotKind::PackedVector3Array.words(), 2);
        assert_eq!(SlotKind::Dictionary.words(), 1);

        #[cfg(not(feature = "double-precision"))]
        {
            assert_eq!(SlotKind::Vector2.words(), 1);
            assert_eq!(SlotKind::Vector3.words(), 2);
            assert_eq!(SlotKind::Aabb.words(), 3);
            assert_eq!(SlotKind::Transform3D.words(), 6);
        }
    }

    #[test]
    fn ord_round_trip() {
        for kind in SlotKind::ALL {
            assert_eq!(SlotKind::try_from_ord(kind.ord()), Some(kind));
        }
        assert_eq!(SlotKind::try_from_ord(999), None);
    }

    #[test]
    fn signature_hash_depends_on_order_and_return() {
        let a = signature_hash(SlotKind::Nil, &[SlotKind::Int, SlotKind::Float]);
        let b = signature_hash(SlotKind::Nil, &[SlotKind::Float, SlotKind::Int]);
        let c = signature_hash(SlotKind::Int, &[SlotKind::Int, SlotKind::Float]);

        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn packed_kinds_differ_by_element() {
        let vertices = signature_hash(SlotKind::PackedVector3Array, &[SlotKind::Int]);
        let colors = signature_hash(SlotKind::PackedColorArray, &[SlotKind::Int]);
        assert_ne!(vertices, colors);

        assert_eq!(SlotKind::PackedColorArray.packed_element(), Some(SlotKind::Color));
        assert_eq!(SlotKind::packed_of(SlotKind::Vector3), Some(SlotKind::PackedVector3Array));
        assert_eq!(SlotKind::packed_of(SlotKind::Transform3D), None);
        assert!(SlotKind::PackedByteArray.is_handle());
        assert!(!SlotKind::Byte.is_handle());
    }

    #[test]
    fn variant_elements_fit_buffer() {
        for kind in SlotKind::ALL.into_iter().filter(|kind| kind.is_variant_element()) {
            assert!(kind.byte_size() <= VARIANT_ELEMENT_MAX_SIZE, "{kind:?}");
        }
    }

    #[test]
    fn signature_hash_incremental_matches() {
        const EXPECTED: u32 = signature_hash(SlotKind::Aabb, &[SlotKind::Vector2, SlotKind::Bool]);

        let mut running = SIGNATURE_SEED;
        running = signature_step(running, SlotKind::Vector2);
        running = signature_step(running, SlotKind::Bool);

        assert_eq!(signature_finish(running, SlotKind::Aabb), EXPECTED);
    }
}
