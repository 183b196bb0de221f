/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Meta-information and marshalling: how values cross the boundary, and how a native call is put together.

mod call_frame;
mod class_name;
mod dispatch;
mod frame_value;
mod param_tuple;

pub mod error;

pub use call_frame::CallFrame;
pub use class_name::{ClassName, MethodName};
pub use dispatch::{invoke, Receiver};
pub use frame_value::{frame_words, FrameArg, FrameValue, ReturnOwnership};
pub use param_tuple::{ArgFrame, InParamTuple, RetSlot};
