/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::meta::error::ConvertError;
use crate::obj::{Handle, HandleKind};
use crate::sys;
use sys::{interface_fn, Opaque};

/// Native token of a string: one pointer-sized word.
pub(crate) type StringToken = Opaque<8>;

/// Handle kind for engine strings.
pub struct StringKind;

impl HandleKind for StringKind {
    type Token = StringToken;
    const NAME: &'static str = "string";

    unsafe fn release(token: StringToken) {
        let mut token = token;
        unsafe { interface_fn!(string_destroy)(token.as_mut_ptr()) };
    }

    fn ledger_key(token: &StringToken) -> u64 {
        token.key()
    }
}

/// Engine string, stored on the native side.
///
/// Always owned: strings returned by the engine are copies that the host must destroy, which happens on drop. `Clone` makes
/// another native copy.
pub struct GString {
    handle: Handle<StringKind>,
}

impl GString {
    /// Empty string.
    pub fn new() -> Self {
        Self::from("")
    }

    /// # Safety
    /// `token` must be a native string whose ownership was handed to the host.
    pub(crate) unsafe fn from_owned_token(token: StringToken) -> Self {
        Self {
            handle: unsafe { Handle::owned(token) },
        }
    }

    /// New native copy of the string behind `token`.
    ///
    /// # Safety
    /// `token` must be a live native string.
    pub(crate) unsafe fn copied_from(token: StringToken) -> Self {
        let mut dest = StringToken::zeroed();
        unsafe { interface_fn!(string_new_copy)(dest.as_mut_ptr(), token.as_ptr()) };
        unsafe { Self::from_owned_token(dest) }
    }

    pub(crate) fn token(&self) -> StringToken {
        self.handle.token()
    }

    pub(crate) fn into_transferred(self) -> StringToken {
        self.handle.into_transferred()
    }

    /// Length of the UTF-8 encoding, in bytes.
    pub fn len(&self) -> usize {
        let token = self.token();
        let len = unsafe { interface_fn!(string_to_utf8_chars)(token.as_ptr(), std::ptr::null_mut(), 0) };
        usize::try_from(len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the string back into Rust.
    pub fn try_to_string(&self) -> Result<String, ConvertError> {
        let token = self.token();
        let len = self.len();

        let mut bytes = vec![0u8; len];
        if len > 0 {
            let max_len = sys::NativeInt::try_from(len).unwrap_or(sys::NativeInt::MAX);
            unsafe { interface_fn!(string_to_utf8_chars)(token.as_ptr(), bytes.as_mut_ptr().cast(), max_len) };
        }

        String::from_utf8(bytes).map_err(|_| ConvertError::invalid_utf8())
    }
}

impl Default for GString {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for GString {
    fn from(s: &str) -> Self {
        let mut dest = StringToken::zeroed();
        let len = sys::NativeInt::try_from(s.len()).unwrap_or(sys::NativeInt::MAX);
        unsafe {
            interface_fn!(string_new_with_utf8_chars_and_len)(dest.as_mut_ptr(), s.as_ptr().cast(), len);
            Self::from_owned_token(dest)
        }
    }
}

impl From<String> for GString {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<&GString> for String {
    fn from(s: &GString) -> Self {
        s.to_string()
    }
}

impl Clone for GString {
    fn clone(&self) -> Self {
        unsafe { Self::copied_from(self.token()) }
    }
}

impl PartialEq for GString {
    fn eq(&self, other: &Self) -> bool {
        self.try_to_string().ok() == other.try_to_string().ok()
    }
}

impl PartialEq<&str> for GString {
    fn eq(&self, other: &&str) -> bool {
        self.try_to_string().is_ok_and(|s| s == *other)
    }
}

impl fmt::Display for GString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_to_string() {
            Ok(s) => f.write_str(&s),
            Err(_) => f.write_str("\u{FFFD}"),
        }
    }
}

impl fmt::Debug for GString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GString({:?})", self.to_string())
    }
}
