/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Marshalling core of the gdbind engine bindings.
//!
//! Object handles with ownership semantics, fixed-layout call frames, the method bind table, the call dispatcher and the
//! virtual override table. Engine classes in [`classes`] are thin consumers of those mechanisms.

#![cfg_attr(test, allow(unused))]

pub mod builtin;
pub mod classes;
pub mod init;
pub mod log;
pub mod meta;
pub mod obj;
pub mod registry;

mod storage;

#[doc(hidden)]
pub mod private;

pub use gdbind_ffi as sys;

// Output of trace macro, used by macros in other crates.
pub use sys::out;
