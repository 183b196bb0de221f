/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Callbacks from the engine into user classes.
//!
//! Panics never unwind into the engine: each callback catches them, logs them, and reports "not handled" or null.

use std::ffi::{c_char, c_void};

use crate::init;
use crate::meta::{ArgFrame, ClassName, MethodName, RetSlot};
use crate::private::handle_panic;
use crate::registry::Resolution;
use crate::storage::InstanceKey;
use crate::sys;

pub(crate) unsafe extern "C" fn create_instance(class_userdata: *mut c_void) -> sys::ObjectPtr {
    let class = ClassName::from_index(class_userdata as usize as u32);

    let outcome = handle_panic(
        || format!("create instance of {class}"),
        || init::runtime().classes.construct(class),
    );

    match outcome {
        Ok(Some(ptr)) => ptr,
        Ok(None) => {
            crate::gd_error!("cannot create instance of unknown class {class}");
            std::ptr::null_mut()
        }
        Err(_) => std::ptr::null_mut(),
    }
}

pub(crate) unsafe extern "C" fn free_instance(_class_userdata: *mut c_void, instance: sys::ClassInstancePtr) {
    let Some(key) = InstanceKey::from_instance_ptr(instance) else {
        return;
    };

    let _ = handle_panic(
        || format!("free instance {key:?}"),
        || {
            // Dropped here, after the registry lock was released: user Drop impls may call back into the registry.
            let storage = init::runtime().instances.tear_down(key);
            if storage.is_none() {
                crate::gd_warn!("engine freed instance {key:?} twice");
            }
            sys::out!("tore down instance {key:?}");
            drop(storage);
        },
    );
}

/// Answers whether instances of the class handle the virtual `name`, asked once per method by the engine.
///
/// Non-null results are method tokens, passed back to [`call_virtual`].
pub(crate) unsafe extern "C" fn get_virtual(class_userdata: *mut c_void, name: *const c_char) -> *mut c_void {
    let class = ClassName::from_index(class_userdata as usize as u32);
    let Some(name) = (unsafe { sys::read_c_str(name) }) else {
        return std::ptr::null_mut();
    };

    let outcome = handle_panic(
        || format!("get virtual {class}::{name}"),
        || {
            let runtime = init::runtime();
            let method = MethodName::new(name);

            // Declared virtuals stay reachable for instance overrides registered later.
            let overridden = matches!(
                runtime.virtuals.resolve(&runtime.classes, class, method),
                Resolution::Override { .. }
            );
            let declared = runtime.classes.declared_virtual(class, method).is_some();
            (overridden || declared).then_some(method)
        },
    );

    match outcome {
        Ok(Some(method)) => method_token(method),
        Ok(None) | Err(_) => std::ptr::null_mut(),
    }
}

fn method_token(method: MethodName) -> *mut c_void {
    (method.index() as usize + 1) as *mut c_void
}

fn method_from_token(token: *mut c_void) -> Option<MethodName> {
    let index = (token as usize).checked_sub(1)?;
    let method = MethodName::from_index(u32::try_from(index).ok()?);
    (!method.is_none()).then_some(method)
}

pub(crate) unsafe extern "C" fn call_virtual(
    _class_userdata: *mut c_void,
    instance: sys::ClassInstancePtr,
    method_token: *mut c_void,
    args: *const sys::ConstTypePtr,
    r_ret: sys::TypePtr,
) -> sys::NativeBool {
    let Some(method) = method_from_token(method_token) else {
        crate::gd_warn!("virtual call with unknown method token {method_token:?}");
        return sys::NATIVE_FALSE;
    };

    let Some(key) = InstanceKey::from_instance_ptr(instance) else {
        crate::gd_warn!("virtual {method} called without an instance");
        return sys::NATIVE_FALSE;
    };

    let outcome = handle_panic(
        || format!("virtual {method} on instance {key:?}"),
        // SAFETY: the engine passes the argument and return slots of `method`'s signature.
        || unsafe {
            let args = ArgFrame::from_raw(args);
            let ret = RetSlot::from_raw(r_ret);
            init::runtime().dispatch_virtual(key, method, args, ret)
        },
    );

    match outcome {
        Ok(outcome) => sys::to_native_bool(outcome.is_handled()),
        Err(_) => sys::NATIVE_FALSE,
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
