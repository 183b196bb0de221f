/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::marker::PhantomData;

use crate::obj::raw::ObjectToken;
use crate::obj::{Gd, GdClass};

/// Restricted version of `Gd`, to hold the engine part of a user class instance.
///
/// A `Base<T>` never owns the object: the user instance lives inside the object, so owning it would form a cycle. Use
/// [`to_gd()`](Self::to_gd) to get a regular pointer.
pub struct Base<T: GdClass> {
    token: ObjectToken,
    _marker: PhantomData<*const T>,
}

impl<T: GdClass> Base<T> {
    /// # Safety
    /// `token` must be the live object that is being bound to the new instance.
    pub(crate) unsafe fn from_token(token: ObjectToken) -> Self {
        Self {
            token,
            _marker: PhantomData,
        }
    }

    /// Returns a [`Gd`] referencing the same object.
    ///
    /// For reference-counted classes this takes a new reference; otherwise the result is borrowed. Do not store the result in
    /// the instance itself, as that would keep a reference-counted object alive forever.
    pub fn to_gd(&self) -> Gd<T> {
        // SAFETY: the base object outlives the user instance that holds this `Base`.
        unsafe { Gd::from_token_copied(self.token) }
    }
}

impl<T: GdClass> fmt::Debug for Base<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Base<{}>({:?})", T::class_name(), self.token)
    }
}
