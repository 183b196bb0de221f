/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Performs native method calls: argument frame in, decoded return value out.

use std::mem::MaybeUninit;

use crate::meta::error::CallError;
use crate::meta::{CallFrame, FrameValue, ReturnOwnership};
use crate::obj::InstanceId;
use crate::registry::{MethodBind, MethodSite};
use crate::sys;
use sys::interface_fn;

/// Object a native method is called on.
#[derive(Copy, Clone, Debug)]
pub struct Receiver {
    ptr: sys::ObjectPtr,
    id: Option<InstanceId>,
}

impl Receiver {
    pub fn new(ptr: sys::ObjectPtr, id: Option<InstanceId>) -> Self {
        Self { ptr, id }
    }

    pub fn ptr(&self) -> sys::ObjectPtr {
        self.ptr
    }

    /// Fails with `InvalidReceiver` for null pointers and, in debug builds, for objects that were freed.
    #[track_caller]
    pub(crate) fn validate(&self, site: &MethodSite) {
        if self.ptr.is_null() {
            CallError::invalid_receiver(site.class(), site.method(), "null object").fail();
        }

        #[cfg(debug_assertions)]
        if let Some(id) = self.id {
            if id.lookup_ptr() != self.ptr {
                CallError::invalid_receiver(site.class(), site.method(), format!("object {id} was freed")).fail();
            }
        }
    }
}

/// Calls `bind` on `receiver` with the arguments in `frame`, and decodes the result as `R`.
///
/// The return slot is zero-initialized, so that a value the engine leaves unwritten decodes as zero/null rather than garbage.
///
/// # Panics
/// - `ArgumentFrameMismatch` if the frame is not completely filled, or its signature (pushed argument kinds plus `R`) has a
///   different hash than the bind.
/// - `InvalidReceiver` if the receiver is null or freed.
#[track_caller]
pub fn invoke<R, const WORDS: usize, const ARGS: usize>(
    bind: MethodBind,
    receiver: Receiver,
    frame: CallFrame<WORDS, ARGS>,
    ownership: ReturnOwnership,
) -> R
where
    R: FrameValue,
{
    let site = frame.site();

    if !frame.is_complete() {
        frame.mismatch(format!("frame holds {} of {ARGS} arguments", frame.len()));
    }

    let hash = frame.signature_hash(R::KIND);
    if hash != bind.hash() {
        frame.mismatch(format!(
            "frame signature {hash:#010x} (returning {:?}) differs from bind signature {:#010x}",
            R::KIND,
            bind.hash()
        ));
    }

    receiver.validate(site);

    sys::out!("ptrcall {}::{} on {:p}", site.class(), site.method(), receiver.ptr);

    let args = frame.arg_ptrs();
    let mut ret = MaybeUninit::<R::Ffi>::zeroed();

    // SAFETY: bind, argument layout and return slot agree with the signature hash checked above.
    unsafe {
        interface_fn!(object_method_bind_ptrcall)(bind.ptr(), receiver.ptr, args.as_ptr(), ret.as_mut_ptr().cast());
    }

    // The frame (and any borrowed handles in it) lives until here.
    drop(frame);

    // SAFETY: zero-initialized, possibly overwritten by the engine with a valid value of kind R::KIND.
    unsafe { R::from_return(ret.assume_init(), ownership) }
}
