/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Types and traits related to objects.
//!
//! The most important symbols in this module are:
//! * [`Handle`] and [`Ownership`], the ownership-typed wrapper around every native token.
//! * [`GdClass`], which is implemented for every class that the engine can work with (either engine- or user-provided).
//! * [`Gd`], a smart pointer that manages instances of engine classes.

mod base;
mod gd;
mod guards;
mod handle;
mod instance_id;
mod ledger;
mod raw;
mod traits;

pub use base::*;
pub use gd::*;
pub use guards::{GdMut, GdRef};
pub use handle::{Handle, HandleKind, Ownership};
pub use instance_id::*;
pub use ledger::live_owned_count;
pub use raw::{ObjectKind, ObjectToken};
pub use traits::*;

#[cfg(test)]
pub(crate) use handle::test_kind;
