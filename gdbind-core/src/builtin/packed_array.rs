/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::marker::PhantomData;

use crate::builtin::{Color, Vector2, Vector3};
use crate::obj::{Handle, HandleKind};
use crate::sys;
use sys::{interface_fn, Opaque, SlotKind};

/// Native token of a packed array: two pointer-sized words.
pub(crate) type PackedArrayToken = Opaque<16>;

/// Handle kind for engine packed arrays.
pub struct PackedArrayKind;

impl HandleKind for PackedArrayKind {
    type Token = PackedArrayToken;
    const NAME: &'static str = "packed array";

    unsafe fn release(token: PackedArrayToken) {
        let mut token = token;
        unsafe { interface_fn!(packed_array_destroy)(token.as_mut_ptr()) };
    }

    fn ledger_key(token: &PackedArrayToken) -> u64 {
        token.key()
    }
}

/// Element types that can be stored in a [`PackedArray`]. Their layout matches the engine's.
pub trait PackedArrayElement: Copy + 'static {
    #[doc(hidden)]
    const ELEMENT_KIND: SlotKind;

    /// Slot kind of the whole array. Distinct per element type, so that signatures disagreeing on it never match.
    #[doc(hidden)]
    const ARRAY_KIND: SlotKind;
}

macro_rules! impl_packed_array_element {
    ($($T:ty => $Kind:ident in $ArrayKind:ident),* $(,)?) => {
        $(
            impl PackedArrayElement for $T {
                const ELEMENT_KIND: SlotKind = SlotKind::$Kind;
                const ARRAY_KIND: SlotKind = SlotKind::$ArrayKind;
            }

            sys::static_assert!(
                std::mem::size_of::<$T>() == SlotKind::$Kind.byte_size(),
                "packed array element layout differs from engine"
            );
            sys::static_assert!(
                matches!(SlotKind::$ArrayKind.packed_element(), Some(SlotKind::$Kind)),
                "packed array kind does not hold this element"
            );
        )*
    };
}

impl_packed_array_element!(
    u8 => Byte in PackedByteArray,
    i32 => Int32 in PackedInt32Array,
    i64 => Int in PackedInt64Array,
    f32 => Float32 in PackedFloat32Array,
    f64 => Float in PackedFloat64Array,
    Vector2 => Vector2 in PackedVector2Array,
    Vector3 => Vector3 in PackedVector3Array,
    Color => Color in PackedColorArray,
);

/// Contiguous array of elements of a single type, stored on the native side.
///
/// Owned like [`GString`][crate::builtin::GString]: dropped arrays are destroyed, clones are native copies.
pub struct PackedArray<T: PackedArrayElement> {
    handle: Handle<PackedArrayKind>,
    _marker: PhantomData<T>,
}

pub type PackedByteArray = PackedArray<u8>;
pub type PackedInt32Array = PackedArray<i32>;
pub type PackedInt64Array = PackedArray<i64>;
pub type PackedFloat32Array = PackedArray<f32>;
pub type PackedFloat64Array = PackedArray<f64>;
pub type PackedVector2Array = PackedArray<Vector2>;
pub type PackedVector3Array = PackedArray<Vector3>;
pub type PackedColorArray = PackedArray<Color>;

impl<T: PackedArrayElement> PackedArray<T> {
    pub fn new() -> Self {
        Self::from_slice(&[])
    }

    /// Copies `elements` into a new native array.
    pub fn from_slice(elements: &[T]) -> Self {
        let mut dest = PackedArrayToken::zeroed();
        let len = sys::NativeInt::try_from(elements.len()).unwrap_or(sys::NativeInt::MAX);
        unsafe {
            interface_fn!(packed_array_new_from)(
                dest.as_mut_ptr(),
                T::ELEMENT_KIND.ord(),
                elements.as_ptr().cast(),
                len,
            );
            Self::from_owned_token(dest)
        }
    }

    /// # Safety
    /// `token` must be a native packed array of `T` whose ownership was handed to the host.
    pub(crate) unsafe fn from_owned_token(token: PackedArrayToken) -> Self {
        Self {
            handle: unsafe { Handle::owned(token) },
            _marker: PhantomData,
        }
    }

    /// # Safety
    /// `token` must be a live native packed array of `T`.
    pub(crate) unsafe fn copied_from(token: PackedArrayToken) -> Self {
        let mut dest = PackedArrayToken::zeroed();
        unsafe {
            interface_fn!(packed_array_new_copy)(dest.as_mut_ptr(), token.as_ptr());
            Self::from_owned_token(dest)
        }
    }

    pub(crate) fn token(&self) -> PackedArrayToken {
        self.handle.token()
    }

    pub(crate) fn into_transferred(self) -> PackedArrayToken {
        self.handle.into_transferred()
    }

    pub fn len(&self) -> usize {
        let token = self.token();
        let len = unsafe { interface_fn!(packed_array_size)(token.as_ptr()) };
        usize::try_from(len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, or `None` if out of bounds.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len() {
            return None;
        }

        let data = self.data_ptr();
        // SAFETY: index checked above; native storage is tightly packed.
        Some(unsafe { data.add(index).read_unaligned() })
    }

    /// Copies all elements into a `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        let len = self.len();
        if len == 0 {
            return Vec::new();
        }

        let data = self.data_ptr();
        (0..len).map(|i| unsafe { data.add(i).read_unaligned() }).collect()
    }

    fn data_ptr(&self) -> *const T {
        let token = self.token();
        unsafe { interface_fn!(packed_array_data)(token.as_ptr()) }.cast()
    }
}

impl<T: PackedArrayElement> Default for PackedArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PackedArrayElement> From<&[T]> for PackedArray<T> {
    fn from(elements: &[T]) -> Self {
        Self::from_slice(elements)
    }
}

impl<T: PackedArrayElement> From<Vec<T>> for PackedArray<T> {
    fn from(elements: Vec<T>) -> Self {
        Self::from_slice(&elements)
    }
}

impl<T: PackedArrayElement> Clone for PackedArray<T> {
    fn clone(&self) -> Self {
        unsafe { Self::copied_from(self.token()) }
    }
}

impl<T: PackedArrayElement + PartialEq> PartialEq for PackedArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.to_vec() == other.to_vec()
    }
}

impl<T: PackedArrayElement + fmt::Debug> fmt::Debug for PackedArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_vec()).finish()
    }
}
