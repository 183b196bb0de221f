/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

/// Storage for an opaque native token of `N` bytes.
///
/// The host never interprets the bytes; it only copies them into and out of call frames. Equality is byte equality.
///
/// Note: due to `align(8)` and not `packed` repr, this type may be bigger than `N` bytes when `N` is not a multiple of 8
/// (which is fine, the engine only reads/writes the first `N` bytes).
#[repr(C, align(8))]
#[derive(Copy, Clone)]
pub struct Opaque<const N: usize> {
    storage: [u8; N],
    marker: std::marker::PhantomData<*const u8>, // disable Send/Sync
}

impl<const N: usize> Opaque<N> {
    /// All-zero token, used as the "uninitialized" destination handed to native constructors.
    pub const fn zeroed() -> Self {
        Self {
            storage: [0; N],
            marker: std::marker::PhantomData,
        }
    }

    pub const fn from_bytes(storage: [u8; N]) -> Self {
        Self {
            storage,
            marker: std::marker::PhantomData,
        }
    }

    pub const fn as_bytes(&self) -> &[u8; N] {
        &self.storage
    }

    pub fn is_zeroed(&self) -> bool {
        self.storage.iter().all(|&b| b == 0)
    }

    /// Folds the bytes into a `u64`, for use as a lookup key. Tokens up to 8 bytes map injectively.
    pub fn key(&self) -> u64 {
        self.storage
            .chunks(8)
            .map(|chunk| {
                let mut word = [0u8; 8];
                word[..chunk.len()].copy_from_slice(chunk);
                u64::from_ne_bytes(word)
            })
            .fold(0u64, |acc, word| acc.rotate_left(17) ^ word)
    }

    pub fn as_mut_ptr(&mut self) -> *mut std::ffi::c_void {
        self.storage.as_mut_ptr().cast()
    }

    pub fn as_ptr(&self) -> *const std::ffi::c_void {
        self.storage.as_ptr().cast()
    }
}

impl<const N: usize> PartialEq for Opaque<N> {
    fn eq(&self, other: &Self) -> bool {
        self.storage == other.storage
    }
}

impl<const N: usize> Eq for Opaque<N> {}

impl<const N: usize> fmt::Debug for Opaque<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque(")?;
        for b in self.storage.iter() {
            write!(f, "{b:02x}")?;
        }
        write!(f, ")")
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_byte_equality() {
        let a = Opaque::<8>::from_bytes(7u64.to_ne_bytes());
        let b = Opaque::<8>::from_bytes(7u64.to_ne_bytes());
        let c = Opaque::<8>::from_bytes(8u64.to_ne_bytes());

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.key(), 7);
        assert!(Opaque::<16>::zeroed().is_zeroed());
    }

    #[test]
    fn opaque_layout() {
        assert_eq!(std::mem::align_of::<Opaque<8>>(), 8);
        assert_eq!(std::mem::size_of::<Opaque<8>>(), 8);
        assert_eq!(std::mem::size_of::<Opaque<16>>(), 16);
    }
}
