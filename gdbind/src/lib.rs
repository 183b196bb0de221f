/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! # Rust bindings for a native game engine
//!
//! This crate marshals calls between Rust and the engine's class hierarchy: object pointers with explicit ownership
//! ([`obj::Gd`]), engine methods called through fixed-layout argument frames, and user classes whose virtual methods the engine
//! calls back into.
//!
//! ## Getting started
//!
//! The engine hands its function table to the library on load; pass it to [`init::initialize()`]. After that, objects can be
//! created and engine methods called through the `*Api` traits in the [`prelude`]:
//!
//! ```ignore
//! use gdbind::prelude::*;
//!
//! let mut node = Gd::<Node2D>::new_alloc();
//! node.set_position(Vector2::new(3.0, 4.0));
//! assert_eq!(node.get_position(), Vector2::new(3.0, 4.0));
//! node.free();
//! ```
//!
//! ## Cargo features
//!
//! * **`double-precision`**: vectors and transforms use `f64`, for engines built with double precision.
//! * **`serde`**: `Serialize` and `Deserialize` for builtin value types.

#[doc(inline)]
pub use gdbind_core::{builtin, classes, init, log, meta, obj, registry};

#[doc(hidden)]
pub use gdbind_core::sys;

#[doc(hidden)]
pub use gdbind_core::private;

pub use gdbind_core::{gd_error, gd_print, gd_warn, user_class};

pub mod prelude;
