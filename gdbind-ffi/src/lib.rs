/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Low level bindings to the native engine interface.
//!
//! Everything in here mirrors the binary contract of the engine: the function table it hands out on load, the layout of opaque
//! tokens, and the slot layout of argument frames. Nothing in this crate knows about typed classes; see `gdbind-core` for that.

#![cfg_attr(test, allow(unused))]

mod binding;
mod global;
mod interface;
mod opaque;
mod plugins;
mod slot_kind;
mod toolbox;

// See https://github.com/dtolnay/paste/issues/69#issuecomment-962418430
// and https://users.rust-lang.org/t/proc-macros-using-third-party-crate/42465/4
#[doc(hidden)]
pub use paste;

pub use binding::*;
pub use global::{Global, GlobalGuard};
pub use interface::*;
pub use opaque::Opaque;
pub use plugins::PluginRegistry;
pub use slot_kind::{
    signature_finish, signature_hash, signature_step, SlotKind, SIGNATURE_SEED, VARIANT_ELEMENT_MAX_SIZE,
};
pub use toolbox::*;

/// Floating-point type used by vectors, rects, transforms and bounding boxes.
///
/// Follows the engine's build: `f32` by default, `f64` with the `double-precision` feature. Scalar `float` parameters of methods
/// are always `f64` on the boundary, independent of this setting.
#[cfg(not(feature = "double-precision"))]
#[allow(non_camel_case_types)]
pub type real = f32;

#[cfg(feature = "double-precision")]
#[allow(non_camel_case_types)]
pub type real = f64;

