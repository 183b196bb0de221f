/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::num::NonZeroU64;

use crate::sys;
use sys::interface_fn;

/// Engine-assigned, non-zero identifier of an object.
///
/// Unlike the object pointer, an instance ID is never reused while the process runs, so it can tell whether an object is still
/// alive.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct InstanceId {
    value: NonZeroU64,
}

impl InstanceId {
    /// Constructs an instance ID from an integer, or `None` if the integer is zero.
    ///
    /// This does *not* check if the instance is valid.
    pub fn try_from_u64(id: u64) -> Option<Self> {
        NonZeroU64::new(id).map(|value| Self { value })
    }

    pub fn to_u64(self) -> u64 {
        self.value.get()
    }

    /// Asks the engine for the ID of a live object.
    ///
    /// # Safety
    /// `ptr` must point to a live object.
    pub(crate) unsafe fn of_object(ptr: sys::ObjectPtr) -> Option<Self> {
        let id = unsafe { interface_fn!(object_get_instance_id)(ptr) };
        Self::try_from_u64(id)
    }

    /// Object pointer currently registered under this ID, or null if the object is gone.
    pub(crate) fn lookup_ptr(self) -> sys::ObjectPtr {
        unsafe { interface_fn!(object_get_instance_from_id)(self.to_u64()) }
    }

    /// Whether the engine still knows an object with this ID.
    pub fn is_alive(self) -> bool {
        !self.lookup_ptr().is_null()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_u64())
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({})", self.to_u64())
    }
}
