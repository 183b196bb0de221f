/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::meta::FrameValue;
use crate::sys;

/// Arguments of a call coming from the engine: an array of pointers, one per argument.
#[derive(Copy, Clone, Debug)]
pub struct ArgFrame {
    args: *const sys::ConstTypePtr,
}

impl ArgFrame {
    /// # Safety
    /// `args` must point to as many valid argument pointers as will be read, and stay valid while the frame is used.
    pub unsafe fn from_raw(args: *const sys::ConstTypePtr) -> Self {
        Self { args }
    }

    /// Decodes argument `index` as `T`, copying handles.
    ///
    /// # Safety
    /// Argument `index` must exist and be of kind `T::KIND`.
    pub unsafe fn get<T: FrameValue>(&self, index: usize) -> T {
        let slot = unsafe { *self.args.add(index) };
        let ffi = unsafe { slot.cast::<T::Ffi>().read_unaligned() };
        unsafe { T::from_arg(ffi) }
    }
}

/// Return slot of a call coming from the engine.
#[derive(Debug)]
pub struct RetSlot {
    ptr: sys::TypePtr,
}

impl RetSlot {
    /// # Safety
    /// `ptr` must be null or point to writable memory large enough for the return kind of the call.
    pub unsafe fn from_raw(ptr: sys::TypePtr) -> Self {
        Self { ptr }
    }

    /// Encodes `value` into the slot, transferring owned handles to the engine. Consumes the slot: a call returns once.
    ///
    /// Values of zero size are not written; a null slot drops the value.
    pub fn write<T: FrameValue>(self, value: T) {
        if self.ptr.is_null() {
            return;
        }

        let ffi = value.into_return();
        if std::mem::size_of::<T::Ffi>() > 0 {
            // SAFETY: upheld by from_raw's contract.
            unsafe { self.ptr.cast::<T::Ffi>().write_unaligned(ffi) };
        }
    }
}

/// Parameter list of a virtual method, decoded from an [`ArgFrame`].
pub trait InParamTuple: Sized {
    const LEN: usize;

    /// # Safety
    /// The frame must hold `LEN` arguments matching the tuple element kinds.
    unsafe fn from_arg_frame(args: &ArgFrame) -> Self;

    /// Kinds of the parameters, in order.
    fn kinds() -> Vec<sys::SlotKind>;
}

macro_rules! impl_in_param_tuple {
    ($len:literal; $($P:ident : $n:tt),*) => {
        impl<$($P: FrameValue),*> InParamTuple for ($($P,)*) {
            const LEN: usize = $len;

            #[allow(unused_unsafe, clippy::unused_unit)]
            unsafe fn from_arg_frame(args: &ArgFrame) -> Self {
                let _ = args;
                ($( unsafe { args.get::<$P>($n) }, )*)
            }

            fn kinds() -> Vec<sys::SlotKind> {
                vec![$($P::KIND),*]
            }
        }
    };
}

impl_in_param_tuple!(0;);
impl_in_param_tuple!(1; P0: 0);
impl_in_param_tuple!(2; P0: 0, P1: 1);
impl_in_param_tuple!(3; P0: 0, P1: 1, P2: 2);
impl_in_param_tuple!(4; P0: 0, P1: 1, P2: 2, P3: 3);
impl_in_param_tuple!(5; P0: 0, P1: 1, P2: 2, P3: 3, P4: 4);
