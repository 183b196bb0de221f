/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::builtin::array::ArrayToken;
use crate::builtin::variant::ElementBuffer;
use crate::builtin::{Array, Variant};
use crate::obj::{Handle, HandleKind};
use crate::sys;
use sys::{interface_fn, Opaque};

/// Native token of a dictionary: one pointer-sized word.
pub(crate) type DictionaryToken = Opaque<8>;

/// Handle kind for engine dictionaries.
pub struct DictionaryKind;

impl HandleKind for DictionaryKind {
    type Token = DictionaryToken;
    const NAME: &'static str = "dictionary";

    unsafe fn release(token: DictionaryToken) {
        let mut token = token;
        unsafe { interface_fn!(dictionary_destroy)(token.as_mut_ptr()) };
    }

    fn ledger_key(token: &DictionaryToken) -> u64 {
        token.key()
    }
}

/// Map from [`Variant`] keys to `Variant` values, stored on the native side. Keys keep their insertion order.
///
/// Owned like [`Array`]; clones are native copies.
pub struct Dictionary {
    handle: Handle<DictionaryKind>,
}

impl Dictionary {
    pub fn new() -> Self {
        let mut dest = DictionaryToken::zeroed();
        unsafe {
            interface_fn!(dictionary_new)(dest.as_mut_ptr());
            Self::from_owned_token(dest)
        }
    }

    /// # Safety
    /// `token` must be a native dictionary whose ownership was handed to the host.
    pub(crate) unsafe fn from_owned_token(token: DictionaryToken) -> Self {
        Self {
            handle: unsafe { Handle::owned(token) },
        }
    }

    /// # Safety
    /// `token` must be a live native dictionary.
    pub(crate) unsafe fn copied_from(token: DictionaryToken) -> Self {
        let mut dest = DictionaryToken::zeroed();
        unsafe {
            interface_fn!(dictionary_new_copy)(dest.as_mut_ptr(), token.as_ptr());
            Self::from_owned_token(dest)
        }
    }

    pub(crate) fn token(&self) -> DictionaryToken {
        self.handle.token()
    }

    pub(crate) fn into_transferred(self) -> DictionaryToken {
        self.handle.into_transferred()
    }

    pub fn len(&self) -> usize {
        let token = self.token();
        let len = unsafe { interface_fn!(dictionary_size)(token.as_ptr()) };
        usize::try_from(len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts or replaces the value for `key`.
    pub fn set(&mut self, key: impl Into<Variant>, value: impl Into<Variant>) {
        let mut token = self.token();
        let (key, value) = (key.into(), value.into());

        key.with_element(|key_kind, key_ptr| {
            value.with_element(|value_kind, value_ptr| unsafe {
                interface_fn!(dictionary_set)(token.as_mut_ptr(), key_kind, key_ptr, value_kind, value_ptr)
            })
        });
    }

    /// Copy of the value for `key`, or `None` if absent.
    pub fn get(&self, key: impl Into<Variant>) -> Option<Variant> {
        let token = self.token();

        let mut kind = 0u32;
        let mut buffer = ElementBuffer::new();
        let found = key.into().with_element(|key_kind, key_ptr| unsafe {
            interface_fn!(dictionary_get)(token.as_ptr(), key_kind, key_ptr, &mut kind, buffer.as_mut_ptr())
        });

        // SAFETY: the engine wrote a new value of `kind`, which now belongs to us.
        sys::to_bool(found).then(|| unsafe { Variant::from_element(kind, &buffer) })
    }

    pub fn contains_key(&self, key: impl Into<Variant>) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove(&mut self, key: impl Into<Variant>) -> Option<Variant> {
        let key = key.into();
        let value = self.get(&key)?;

        let mut token = self.token();
        key.with_element(|key_kind, key_ptr| unsafe {
            interface_fn!(dictionary_erase)(token.as_mut_ptr(), key_kind, key_ptr)
        });
        Some(value)
    }

    /// All keys, in insertion order.
    pub fn keys_array(&self) -> Array {
        let token = self.token();
        let mut dest = ArrayToken::zeroed();
        unsafe {
            interface_fn!(dictionary_keys)(token.as_ptr(), dest.as_mut_ptr());
            Array::from_owned_token(dest)
        }
    }

    /// Copies of all entries, in insertion order.
    pub fn to_vec(&self) -> Vec<(Variant, Variant)> {
        self.keys_array()
            .to_vec()
            .into_iter()
            .filter_map(|key| {
                let value = self.get(&key)?;
                Some((key, value))
            })
            .collect()
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Dictionary {
    fn clone(&self) -> Self {
        unsafe { Self::copied_from(self.token()) }
    }
}

/// Equal if both hold the same entries, regardless of order.
impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.to_vec().into_iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Into<Variant>, V: Into<Variant>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Self::new();
        for (key, value) in iter {
            dict.set(key, value);
        }
        dict
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.to_vec()).finish()
    }
}
