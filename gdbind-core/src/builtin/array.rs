/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::builtin::variant::ElementBuffer;
use crate::builtin::Variant;
use crate::obj::{Handle, HandleKind};
use crate::sys;
use sys::{interface_fn, Opaque};

/// Native token of an array: one pointer-sized word.
pub(crate) type ArrayToken = Opaque<8>;

/// Handle kind for engine arrays.
pub struct ArrayKind;

impl HandleKind for ArrayKind {
    type Token = ArrayToken;
    const NAME: &'static str = "array";

    unsafe fn release(token: ArrayToken) {
        let mut token = token;
        unsafe { interface_fn!(array_destroy)(token.as_mut_ptr()) };
    }

    fn ledger_key(token: &ArrayToken) -> u64 {
        token.key()
    }
}

/// Ordered list of [`Variant`]s, stored on the native side.
///
/// Ownership works like for [`PackedArray`][crate::builtin::PackedArray]: dropped arrays are destroyed, `Clone` makes a native
/// copy of the array and its elements.
pub struct Array {
    handle: Handle<ArrayKind>,
}

impl Array {
    pub fn new() -> Self {
        let mut dest = ArrayToken::zeroed();
        unsafe {
            interface_fn!(array_new)(dest.as_mut_ptr());
            Self::from_owned_token(dest)
        }
    }

    /// # Safety
    /// `token` must be a native array whose ownership was handed to the host.
    pub(crate) unsafe fn from_owned_token(token: ArrayToken) -> Self {
        Self {
            handle: unsafe { Handle::owned(token) },
        }
    }

    /// # Safety
    /// `token` must be a live native array.
    pub(crate) unsafe fn copied_from(token: ArrayToken) -> Self {
        let mut dest = ArrayToken::zeroed();
        unsafe {
            interface_fn!(array_new_copy)(dest.as_mut_ptr(), token.as_ptr());
            Self::from_owned_token(dest)
        }
    }

    pub(crate) fn token(&self) -> ArrayToken {
        self.handle.token()
    }

    pub(crate) fn into_transferred(self) -> ArrayToken {
        self.handle.into_transferred()
    }

    pub fn len(&self) -> usize {
        let token = self.token();
        let len = unsafe { interface_fn!(array_size)(token.as_ptr()) };
        usize::try_from(len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends `value`. The engine stores its own copy.
    pub fn push(&mut self, value: impl Into<Variant>) {
        let mut token = self.token();
        value
            .into()
            .with_element(|kind, ptr| unsafe { interface_fn!(array_push)(token.as_mut_ptr(), kind, ptr) });
    }

    /// Replaces the element at `index`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    #[track_caller]
    pub fn set(&mut self, index: usize, value: impl Into<Variant>) {
        let mut token = self.token();
        let native_index = sys::NativeInt::try_from(index).unwrap_or(sys::NativeInt::MAX);

        let stored = value.into().with_element(|kind, ptr| unsafe {
            interface_fn!(array_set)(token.as_mut_ptr(), native_index, kind, ptr)
        });

        if !sys::to_bool(stored) {
            panic!("Array::set(): index {index} out of bounds (len {})", self.len());
        }
    }

    /// Copy of the element at `index`, or `None` if out of bounds.
    pub fn get(&self, index: usize) -> Option<Variant> {
        let token = self.token();
        let native_index = sys::NativeInt::try_from(index).ok()?;

        let mut kind = 0u32;
        let mut buffer = ElementBuffer::new();
        let found =
            unsafe { interface_fn!(array_get)(token.as_ptr(), native_index, &mut kind, buffer.as_mut_ptr()) };

        // SAFETY: the engine wrote a new element of `kind`, which now belongs to us.
        sys::to_bool(found).then(|| unsafe { Variant::from_element(kind, &buffer) })
    }

    /// Copies of all elements.
    pub fn to_vec(&self) -> Vec<Variant> {
        (0..self.len()).filter_map(|index| self.get(index)).collect()
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Array {
    fn clone(&self) -> Self {
        unsafe { Self::copied_from(self.token()) }
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.to_vec() == other.to_vec()
    }
}

impl<V: Into<Variant>> FromIterator<V> for Array {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<V: Into<Variant>> Extend<V> for Array {
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_vec()).finish()
    }
}
