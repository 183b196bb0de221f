/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;
use std::fmt;

use crate::meta::ClassName;
use crate::obj::handle::HandleKind;
use crate::sys;
use sys::{interface_fn, Global};

/// Raw pointer to an engine object, plus its memory strategy.
///
/// Whether an object is reference-counted is asked once, when the token is created, and then travels with the pointer.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct ObjectToken {
    ptr: sys::ObjectPtr,
    ref_counted: bool,
}

impl ObjectToken {
    /// Token for a non-null object pointer, querying the engine for its memory strategy.
    ///
    /// # Safety
    /// `ptr` must point to a live engine object.
    pub unsafe fn from_live_ptr(ptr: sys::ObjectPtr) -> Self {
        debug_assert!(!ptr.is_null(), "object token from null pointer");

        let ref_counted = sys::to_bool(unsafe { interface_fn!(object_is_ref_counted)(ptr) });
        Self { ptr, ref_counted }
    }

    pub fn ptr(self) -> sys::ObjectPtr {
        self.ptr
    }

    pub fn is_null(self) -> bool {
        self.ptr.is_null()
    }

    pub fn is_ref_counted(self) -> bool {
        self.ref_counted
    }

    /// Takes one more reference on a reference-counted object; no-op for manually managed ones.
    ///
    /// # Safety
    /// The object must be alive.
    pub(crate) unsafe fn add_reference(self) {
        if self.ref_counted {
            unsafe { interface_fn!(object_reference)(self.ptr) };
        }
    }
}

impl fmt::Debug for ObjectToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = if self.ref_counted { "ref-counted" } else { "manual" };
        write!(f, "ObjectToken({:p}, {strategy})", self.ptr)
    }
}

/// Handle kind for engine objects.
///
/// Releasing a reference-counted object drops one reference and destroys it once the count reaches zero. A manually managed
/// object is destroyed right away.
pub struct ObjectKind;

impl HandleKind for ObjectKind {
    type Token = ObjectToken;
    const NAME: &'static str = "object";

    unsafe fn release(token: ObjectToken) {
        if token.is_null() {
            return;
        }

        if token.ref_counted {
            let reached_zero = sys::to_bool(unsafe { interface_fn!(object_unreference)(token.ptr) });
            if reached_zero {
                sys::out!("destroy ref-counted {token:?}");
                unsafe { interface_fn!(object_destroy)(token.ptr) };
            }
        } else {
            sys::out!("destroy manual {token:?}");
            unsafe { interface_fn!(object_destroy)(token.ptr) };
        }
    }

    fn is_exclusive(token: &ObjectToken) -> bool {
        !token.ref_counted
    }

    fn ledger_key(token: &ObjectToken) -> u64 {
        token.ptr as usize as u64
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Class tags

// Tags are stable for the lifetime of the engine, keyed by class. Stored as address since raw pointers are not Send.
static CLASS_TAGS: Global<HashMap<ClassName, usize>> = Global::default();

/// Engine-side tag identifying `class`, for use with `object_cast_to`.
pub(crate) fn class_tag(class: ClassName) -> sys::ClassTagPtr {
    if let Some(&addr) = CLASS_TAGS.lock().get(&class) {
        return addr as sys::ClassTagPtr;
    }

    let tag = unsafe { interface_fn!(classdb_get_class_tag)(class.as_c_str().as_ptr()) };
    if !tag.is_null() {
        CLASS_TAGS.lock().insert(class, tag as usize);
    }
    tag
}

/// Returns `token` if the object is an instance of `class` (or a subclass), as determined by the engine.
///
/// # Safety
/// The object must be alive.
pub(crate) unsafe fn cast_to(token: ObjectToken, class: ClassName) -> Option<ObjectToken> {
    let tag = class_tag(class);
    if tag.is_null() {
        return None;
    }

    let cast = unsafe { interface_fn!(object_cast_to)(token.ptr, tag) };
    if cast.is_null() {
        None
    } else {
        Some(ObjectToken {
            ptr: cast,
            ref_counted: token.ref_counted,
        })
    }
}
