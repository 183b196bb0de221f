/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::init;
use crate::meta::error::CallError;
use crate::meta::{frame_words, invoke, FrameArg, FrameValue, Receiver, ReturnOwnership};
use crate::registry::MethodSite;
use crate::sys;
use sys::SlotKind;

/// Fixed-capacity argument frame for one native call.
///
/// `WORDS` is the total number of 8-byte slots of all arguments, `ARGS` the number of arguments. Both are computed at compile
/// time from the parameter types of the call site, so the frame lives on the stack and is never resized.
///
/// Each argument starts at a word boundary. The frame also folds the kind of each pushed argument into a running signature
/// hash, which the dispatcher compares with the hash of the method bind.
pub struct CallFrame<const WORDS: usize, const ARGS: usize> {
    site: &'static MethodSite,
    words: [u64; WORDS],
    offsets: [usize; ARGS],
    next_word: usize,
    len: usize,
    hash: u32,
}

impl<const WORDS: usize, const ARGS: usize> CallFrame<WORDS, ARGS> {
    pub fn new(site: &'static MethodSite) -> Self {
        Self {
            site,
            words: [0; WORDS],
            offsets: [0; ARGS],
            next_word: 0,
            len: 0,
            hash: sys::SIGNATURE_SEED,
        }
    }

    /// Encodes the next argument.
    ///
    /// # Panics
    /// With `ArgumentFrameMismatch` if the frame has no room left for a value of this type.
    #[track_caller]
    pub fn push<A: FrameArg>(&mut self, arg: A) {
        let width = frame_words::<A::Ffi>();
        if self.len >= ARGS || self.next_word + width > WORDS {
            self.mismatch(format!(
                "no room for argument #{} ({:?}, {width} words); capacity is {ARGS} args / {WORDS} words",
                self.len,
                A::KIND
            ));
        }

        debug_assert!(std::mem::align_of::<A::Ffi>() <= std::mem::align_of::<u64>());

        let ffi = arg.into_arg();
        // SAFETY: bounds checked above; word storage is 8-aligned, and no FFI type needs more.
        unsafe {
            let slot = self.words.as_mut_ptr().add(self.next_word);
            slot.cast::<A::Ffi>().write(ffi);
        }

        self.offsets[self.len] = self.next_word;
        self.next_word += width;
        self.len += 1;
        self.hash = sys::signature_step(self.hash, A::KIND);
    }

    /// Number of arguments pushed so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether every argument slot has been filled.
    pub fn is_complete(&self) -> bool {
        self.len == ARGS && self.next_word == WORDS
    }

    /// Hash of the pushed argument kinds, completed with `ret`.
    pub fn signature_hash(&self, ret: SlotKind) -> u32 {
        sys::signature_finish(self.hash, ret)
    }

    pub fn site(&self) -> &'static MethodSite {
        self.site
    }

    /// Pointers to each argument, in the layout the engine expects for `args`.
    pub(crate) fn arg_ptrs(&self) -> [sys::ConstTypePtr; ARGS] {
        let base = self.words.as_ptr();
        std::array::from_fn(|i| unsafe { base.add(self.offsets[i]) }.cast())
    }

    /// Resolves the method bind of the call site and dispatches the call.
    #[track_caller]
    pub fn call<R: FrameValue>(self, receiver: Receiver, ownership: ReturnOwnership) -> R {
        let site = self.site;
        let bind = init::runtime()
            .binds
            .resolve(site.class_name(), site.method_name(), site.hash());
        invoke(bind, receiver, self, ownership)
    }

    #[cold]
    #[track_caller]
    pub(crate) fn mismatch(&self, reason: String) -> ! {
        CallError::frame_mismatch(self.site.class(), self.site.method(), reason).fail()
    }
}

impl<const WORDS: usize, const ARGS: usize> fmt::Debug for CallFrame<WORDS, ARGS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallFrame")
            .field("site", &format_args!("{}::{}", self.site.class(), self.site.method()))
            .field("args", &format_args!("{}/{ARGS}", self.len))
            .field("words", &format_args!("{}/{WORDS}", self.next_word))
            .finish()
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
