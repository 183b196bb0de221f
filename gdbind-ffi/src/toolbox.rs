/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Functions and macros that are not very specific to gdbind, but come in handy.

use std::ffi::{c_char, CStr, CString};

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Macros

/// Verifies a condition at compile time.
#[macro_export]
macro_rules! static_assert {
    ($cond:expr) => {
        const _: () = assert!($cond);
    };
    ($cond:expr, $msg:literal) => {
        const _: () = assert!($cond, $msg);
    };
}

/// Verifies at compile time that two types `T` and `U` have the same size.
#[macro_export]
macro_rules! static_assert_eq_size {
    ($T:ty, $U:ty) => {
        $crate::static_assert!(std::mem::size_of::<$T>() == std::mem::size_of::<$U>());
    };
    ($T:ty, $U:ty, $msg:literal) => {
        $crate::static_assert!(std::mem::size_of::<$T>() == std::mem::size_of::<$U>(), $msg);
    };
}

/// Trace output.
#[cfg(feature = "trace")]
#[macro_export]
macro_rules! out {
    ()                          => (eprintln!());
    ($fmt:literal)              => (eprintln!($fmt));
    ($fmt:literal, $($arg:tt)*) => (eprintln!($fmt, $($arg)*));
}

/// Trace output.
#[cfg(not(feature = "trace"))]
#[macro_export]
macro_rules! out {
    () => {};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        // Formats into nothing, so that arguments count as used.
        let _ = format_args!($fmt $(, $arg)*);
    }};
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Strings across the boundary

/// Converts a static byte string with trailing NUL into a C string pointer.
///
/// # Panics
/// If `s` is not NUL-terminated or contains interior NULs.
#[track_caller]
pub fn c_str(s: &'static [u8]) -> *const c_char {
    match CStr::from_bytes_with_nul(s) {
        Ok(cstr) => cstr.as_ptr(),
        Err(e) => panic!("invalid C string literal {s:?}: {e}"),
    }
}

/// Owned NUL-terminated copy of a Rust string, for names passed to the engine.
///
/// Interior NULs cannot occur in class or method identifiers; they are stripped instead of failing.
pub fn to_c_string(s: &str) -> CString {
    match CString::new(s) {
        Ok(cstring) => cstring,
        Err(e) => {
            let mut bytes = e.into_vec();
            bytes.retain(|&b| b != 0);
            CString::new(bytes).unwrap_or_default()
        }
    }
}

/// Reads a NUL-terminated string coming from the engine.
///
/// # Safety
/// `ptr` must be null or point to a valid NUL-terminated string that lives for `'a`.
pub unsafe fn read_c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }

    // SAFETY: upheld by caller.
    let cstr = unsafe { CStr::from_ptr(ptr) };
    cstr.to_str().ok()
}

/// Joins the `Display` representations of items with `", "`.
pub fn join<T, I>(iter: I) -> String
where
    T: std::fmt::Display,
    I: IntoIterator<Item = T>,
{
    iter.into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_string_conversions() {
        let owned = to_c_string("Node2D");
        let read = unsafe { read_c_str(owned.as_ptr()) };
        assert_eq!(read, Some("Node2D"));

        assert_eq!(to_c_string("a\0b").to_str(), Ok("ab"));
        assert_eq!(unsafe { read_c_str(std::ptr::null()) }, None);

        let lit = unsafe { read_c_str(c_str(b"get_aabb\0")) };
        assert_eq!(lit, Some("get_aabb"));
    }

    #[test]
    fn join_items() {
        assert_eq!(join([1, 2, 3]), "1, 2, 3");
        assert_eq!(join(Vec::<i32>::new()), "");
    }
}
