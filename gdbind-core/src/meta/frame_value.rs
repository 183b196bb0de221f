/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::*;
use crate::meta::error::ConvertError;
use crate::obj::{Gd, GdClass};
use crate::sys;
use sys::SlotKind;

/// Ownership contract of a value returned by the engine.
///
/// Part of a method's generated metadata. Most methods use [`Default`][Self::Default], which follows the memory strategy of
/// the returned object.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ReturnOwnership {
    /// The engine hands one ownership unit to the host.
    Owned,

    /// The engine keeps ownership (e.g. a child node that stays in the tree).
    Borrowed,

    /// Owned for reference-counted objects, borrowed for manually managed ones. Strings and packed arrays are always owned.
    #[default]
    Default,
}

impl ReturnOwnership {
    /// Whether the host receives ownership of an object with the given memory strategy.
    pub fn resolve(self, ref_counted: bool) -> bool {
        match self {
            Self::Owned => true,
            Self::Borrowed => false,
            Self::Default => ref_counted,
        }
    }
}

/// Number of 8-byte frame words taken up by an FFI representation.
pub const fn frame_words<F>() -> usize {
    std::mem::size_of::<F>().div_ceil(8)
}

/// Type that can be returned from a native call or received as argument of a virtual call.
///
/// `Ffi` is the exact native representation in a frame slot. Scalars narrower than the engine's native width (`i32`, `f32`)
/// widen on encode and narrow on decode.
pub trait FrameValue: Sized {
    type Ffi: Copy;
    const KIND: SlotKind;

    /// Decodes a value the engine wrote into a return slot.
    ///
    /// # Safety
    /// `ffi` must have been produced by the engine for a slot of kind `KIND`. Handles are taken over according to `ownership`.
    unsafe fn from_return(ffi: Self::Ffi, ownership: ReturnOwnership) -> Self;

    /// Decodes an argument of a virtual call. Handles are copied, never taken over: the engine still owns the arguments.
    ///
    /// # Safety
    /// `ffi` must be a live value of kind `KIND`.
    unsafe fn from_arg(ffi: Self::Ffi) -> Self;

    /// Encodes a value returned to the engine from a virtual call. Owned handles are transferred.
    fn into_return(self) -> Self::Ffi;
}

/// Type that can be passed as argument of a native call.
///
/// Value types and references to handles are copied into the frame (the host keeps ownership). Passing a `Gd<T>` by value
/// transfers its ownership to the engine.
pub trait FrameArg {
    type Ffi: Copy;
    const KIND: SlotKind;

    fn into_arg(self) -> Self::Ffi;
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Values with identical Rust and native layout

macro_rules! impl_frame_by_value {
    ($($T:ty => $Kind:ident),* $(,)?) => {
        $(
            impl FrameValue for $T {
                type Ffi = $T;
                const KIND: SlotKind = SlotKind::$Kind;

                unsafe fn from_return(ffi: Self::Ffi, _ownership: ReturnOwnership) -> Self {
                    ffi
                }

                unsafe fn from_arg(ffi: Self::Ffi) -> Self {
                    ffi
                }

                fn into_return(self) -> Self::Ffi {
                    self
                }
            }

            impl FrameArg for $T {
                type Ffi = $T;
                const KIND: SlotKind = SlotKind::$Kind;

                fn into_arg(self) -> Self::Ffi {
                    self
                }
            }

            sys::static_assert!(
                std::mem::size_of::<$T>() == SlotKind::$Kind.byte_size(),
                "frame layout differs from engine"
            );
        )*
    };
}

impl_frame_by_value!(
    i64 => Int,
    f64 => Float,
    Vector2 => Vector2,
    Vector2i => Vector2i,
    Rect2 => Rect2,
    Vector3 => Vector3,
    Vector3i => Vector3i,
    Transform2D => Transform2D,
    Color => Color,
    Aabb => Aabb,
    Basis => Basis,
    Transform3D => Transform3D,
);

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Widened scalars

/// Narrows an engine integer, panicking if it does not fit.
#[track_caller]
fn narrow_int(ffi: i64) -> i32 {
    match i32::try_from(ffi) {
        Ok(value) => value,
        Err(_) => panic!("{}", ConvertError::int_out_of_range(ffi, "i32")),
    }
}

impl FrameValue for i32 {
    type Ffi = i64;
    const KIND: SlotKind = SlotKind::Int;

    unsafe fn from_return(ffi: Self::Ffi, _ownership: ReturnOwnership) -> Self {
        narrow_int(ffi)
    }

    unsafe fn from_arg(ffi: Self::Ffi) -> Self {
        narrow_int(ffi)
    }

    fn into_return(self) -> Self::Ffi {
        i64::from(self)
    }
}

impl FrameArg for i32 {
    type Ffi = i64;
    const KIND: SlotKind = SlotKind::Int;

    fn into_arg(self) -> Self::Ffi {
        i64::from(self)
    }
}

// Precision loss is accepted for floats, as the engine does.
impl FrameValue for f32 {
    type Ffi = f64;
    const KIND: SlotKind = SlotKind::Float;

    unsafe fn from_return(ffi: Self::Ffi, _ownership: ReturnOwnership) -> Self {
        ffi as f32
    }

    unsafe fn from_arg(ffi: Self::Ffi) -> Self {
        ffi as f32
    }

    fn into_return(self) -> Self::Ffi {
        f64::from(self)
    }
}

impl FrameArg for f32 {
    type Ffi = f64;
    const KIND: SlotKind = SlotKind::Float;

    fn into_arg(self) -> Self::Ffi {
        f64::from(self)
    }
}

impl FrameValue for bool {
    type Ffi = sys::NativeBool;
    const KIND: SlotKind = SlotKind::Bool;

    unsafe fn from_return(ffi: Self::Ffi, _ownership: ReturnOwnership) -> Self {
        sys::to_bool(ffi)
    }

    unsafe fn from_arg(ffi: Self::Ffi) -> Self {
        sys::to_bool(ffi)
    }

    fn into_return(self) -> Self::Ffi {
        sys::to_native_bool(self)
    }
}

impl FrameArg for bool {
    type Ffi = sys::NativeBool;
    const KIND: SlotKind = SlotKind::Bool;

    fn into_arg(self) -> Self::Ffi {
        sys::to_native_bool(self)
    }
}

impl FrameValue for () {
    type Ffi = ();
    const KIND: SlotKind = SlotKind::Nil;

    unsafe fn from_return(_ffi: (), _ownership: ReturnOwnership) -> Self {}

    unsafe fn from_arg(_ffi: ()) -> Self {}

    fn into_return(self) {}
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Handles

impl FrameValue for GString {
    type Ffi = sys::Opaque<8>;
    const KIND: SlotKind = SlotKind::String;

    unsafe fn from_return(ffi: Self::Ffi, _ownership: ReturnOwnership) -> Self {
        unsafe { GString::from_owned_token(ffi) }
    }

    unsafe fn from_arg(ffi: Self::Ffi) -> Self {
        unsafe { GString::copied_from(ffi) }
    }

    fn into_return(self) -> Self::Ffi {
        self.into_transferred()
    }
}

impl FrameArg for &GString {
    type Ffi = sys::Opaque<8>;
    const KIND: SlotKind = SlotKind::String;

    fn into_arg(self) -> Self::Ffi {
        self.token()
    }
}

impl<T: PackedArrayElement> FrameValue for PackedArray<T> {
    type Ffi = sys::Opaque<16>;
    const KIND: SlotKind = T::ARRAY_KIND;

    unsafe fn from_return(ffi: Self::Ffi, _ownership: ReturnOwnership) -> Self {
        unsafe { PackedArray::from_owned_token(ffi) }
    }

    unsafe fn from_arg(ffi: Self::Ffi) -> Self {
        unsafe { PackedArray::copied_from(ffi) }
    }

    fn into_return(self) -> Self::Ffi {
        self.into_transferred()
    }
}

impl<T: PackedArrayElement> FrameArg for &PackedArray<T> {
    type Ffi = sys::Opaque<16>;
    const KIND: SlotKind = T::ARRAY_KIND;

    fn into_arg(self) -> Self::Ffi {
        self.token()
    }
}

/// Arrays and dictionaries honor the ownership contract: borrowed returns are copied, so the host value is always owned.
macro_rules! impl_frame_collection {
    ($($T:ident => $Kind:ident),* $(,)?) => {
        $(
            impl FrameValue for $T {
                type Ffi = sys::Opaque<8>;
                const KIND: SlotKind = SlotKind::$Kind;

                unsafe fn from_return(ffi: Self::Ffi, ownership: ReturnOwnership) -> Self {
                    match ownership {
                        ReturnOwnership::Borrowed => unsafe { $T::copied_from(ffi) },
                        ReturnOwnership::Owned | ReturnOwnership::Default => unsafe { $T::from_owned_token(ffi) },
                    }
                }

                unsafe fn from_arg(ffi: Self::Ffi) -> Self {
                    unsafe { $T::copied_from(ffi) }
                }

                fn into_return(self) -> Self::Ffi {
                    self.into_transferred()
                }
            }

            impl FrameArg for &$T {
                type Ffi = sys::Opaque<8>;
                const KIND: SlotKind = SlotKind::$Kind;

                fn into_arg(self) -> Self::Ffi {
                    self.token()
                }
            }
        )*
    };
}

impl_frame_collection!(
    Array => Array,
    Dictionary => Dictionary,
);

impl<T: GdClass> FrameValue for Gd<T> {
    type Ffi = sys::ObjectPtr;
    const KIND: SlotKind = SlotKind::Object;

    /// # Panics
    /// If the engine returned null. Methods that may return null use `Option<Gd<T>>`.
    unsafe fn from_return(ffi: Self::Ffi, ownership: ReturnOwnership) -> Self {
        match unsafe { Gd::from_ffi(ffi, ownership) } {
            Some(gd) => gd,
            None => panic!("{}", ConvertError::null_object(T::class_name().as_str())),
        }
    }

    unsafe fn from_arg(ffi: Self::Ffi) -> Self {
        match unsafe { Gd::from_ffi(ffi, ReturnOwnership::Borrowed) } {
            Some(gd) => gd,
            None => panic!("{}", ConvertError::null_object(T::class_name().as_str())),
        }
    }

    fn into_return(self) -> Self::Ffi {
        self.into_ffi_transferred()
    }
}

impl<T: GdClass> FrameValue for Option<Gd<T>> {
    type Ffi = sys::ObjectPtr;
    const KIND: SlotKind = SlotKind::Object;

    unsafe fn from_return(ffi: Self::Ffi, ownership: ReturnOwnership) -> Self {
        unsafe { Gd::from_ffi(ffi, ownership) }
    }

    unsafe fn from_arg(ffi: Self::Ffi) -> Self {
        unsafe { Gd::from_ffi(ffi, ReturnOwnership::Borrowed) }
    }

    fn into_return(self) -> Self::Ffi {
        match self {
            Some(gd) => gd.into_ffi_transferred(),
            None => std::ptr::null_mut(),
        }
    }
}

/// Ownership transfer: the engine takes over the host's ownership unit.
impl<T: GdClass> FrameArg for Gd<T> {
    type Ffi = sys::ObjectPtr;
    const KIND: SlotKind = SlotKind::Object;

    fn into_arg(self) -> Self::Ffi {
        self.into_ffi_transferred()
    }
}

impl<T: GdClass> FrameArg for &Gd<T> {
    type Ffi = sys::ObjectPtr;
    const KIND: SlotKind = SlotKind::Object;

    fn into_arg(self) -> Self::Ffi {
        self.token().ptr()
    }
}

impl<T: GdClass> FrameArg for Option<&Gd<T>> {
    type Ffi = sys::ObjectPtr;
    const KIND: SlotKind = SlotKind::Object;

    fn into_arg(self) -> Self::Ffi {
        match self {
            Some(gd) => gd.token().ptr(),
            None => std::ptr::null_mut(),
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ffi_sizes_match_slot_words() {
        fn check<T: FrameValue>() {
            assert_eq!(frame_words::<T::Ffi>(), T::KIND.words(), "{:?}", T::KIND);
        }

        check::<bool>();
        check::<i32>();
        check::<i64>();
        check::<f32>();
        check::<f64>();
        check::<Vector2>();
        check::<Vector3i>();
        check::<Rect2>();
        check::<Transform2D>();
        check::<Color>();
        check::<Aabb>();
        check::<Basis>();
        check::<Transform3D>();
        check::<GString>();
        check::<PackedInt32Array>();
        check::<Array>();
        check::<Dictionary>();
        check::<()>();
    }

    #[test]
    fn packed_arrays_hash_by_element() {
        assert_eq!(<PackedVector3Array as FrameValue>::KIND, SlotKind::PackedVector3Array);
        assert_eq!(<&PackedColorArray as FrameArg>::KIND, SlotKind::PackedColorArray);
        assert_ne!(
            sys::signature_hash(<PackedVector3Array as FrameValue>::KIND, &[SlotKind::Int]),
            sys::signature_hash(<PackedColorArray as FrameValue>::KIND, &[SlotKind::Int]),
        );
    }

    #[test]
    fn narrowing_keeps_i32_range() {
        let decode = |ffi: i64| unsafe { <i32 as FrameValue>::from_return(ffi, ReturnOwnership::Default) };
        assert_eq!(decode(i64::from(i32::MAX)), i32::MAX);
        assert_eq!(decode(i64::from(i32::MIN)), i32::MIN);
    }

    #[test]
    #[should_panic(expected = "integer 4294967303 does not fit in i32")]
    fn narrowing_rejects_truncation() {
        let _ = unsafe { <i32 as FrameValue>::from_return((1i64 << 32) + 7, ReturnOwnership::Default) };
    }

    #[test]
    #[should_panic(expected = "does not fit in i32")]
    fn narrowing_rejects_negative_overflow() {
        let _ = unsafe { <i32 as FrameValue>::from_arg(i64::from(i32::MIN) - 1) };
    }

    #[test]
    fn return_ownership_resolution() {
        assert!(ReturnOwnership::Default.resolve(true));
        assert!(!ReturnOwnership::Default.resolve(false));
        assert!(ReturnOwnership::Owned.resolve(false));
        assert!(!ReturnOwnership::Borrowed.resolve(true));
    }

    #[test]
    fn scalars_widen_and_narrow() {
        assert_eq!(FrameArg::into_arg(-7i32), -7i64);
        assert_eq!(unsafe { <i32 as FrameValue>::from_return(-7, ReturnOwnership::Default) }, -7);

        assert_eq!(FrameArg::into_arg(0.5f32), 0.5f64);
        assert_eq!(FrameArg::into_arg(true), sys::NATIVE_TRUE);
        assert!(unsafe { <bool as FrameValue>::from_arg(2) });
    }
}
