/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ffi::c_void;
use std::marker::PhantomData;

use crate::init;
use crate::meta::error::CallError;
use crate::meta::{ClassName, FrameValue, InParamTuple, MethodName};
use crate::obj::{Gd, GdClass, UserClass};
use crate::registry::virtuals::{self, ErasedVirtual};
use crate::registry::{callbacks, ClassEntry, ClassKind, ClassRegistry};
use crate::sys;
use sys::interface_fn;

struct PendingVirtual {
    method: MethodName,
    hash: u32,
    f: ErasedVirtual,
}

/// Collects the class-level behavior of a user class during [`UserClass::register()`].
pub struct ClassBuilder<T: UserClass> {
    virtuals: Vec<PendingVirtual>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: UserClass> ClassBuilder<T> {
    fn new() -> Self {
        Self {
            virtuals: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Overrides the virtual method `name` with a closure taking the instance by shared reference.
    ///
    /// `P` is the tuple of parameters, `R` the return type; together they must match the signature the engine declares for
    /// `name`, which is checked in [`register_class()`].
    pub fn virtual_method<P, R>(&mut self, name: &str, f: impl Fn(&T, P) -> R + Send + Sync + 'static) -> &mut Self
    where
        P: InParamTuple,
        R: FrameValue,
    {
        self.push::<P, R>(name, virtuals::erase_method::<T, P, R, _>(f))
    }

    /// Like [`virtual_method()`](Self::virtual_method), but the closure gets exclusive access to the instance.
    pub fn virtual_method_mut<P, R>(
        &mut self,
        name: &str,
        f: impl Fn(&mut T, P) -> R + Send + Sync + 'static,
    ) -> &mut Self
    where
        P: InParamTuple,
        R: FrameValue,
    {
        self.push::<P, R>(name, virtuals::erase_method_mut::<T, P, R, _>(f))
    }

    fn push<P: InParamTuple, R: FrameValue>(&mut self, name: &str, f: ErasedVirtual) -> &mut Self {
        self.virtuals.push(PendingVirtual {
            method: MethodName::new(name),
            hash: virtuals::virtual_signature::<P, R>(),
            f,
        });
        self
    }
}

/// Checks `hash` against the virtual `method` as declared by `class` or an ancestor.
///
/// Methods no ancestor declares are accepted with a warning: the engine will never call them.
#[track_caller]
fn check_virtual_signature(classes: &ClassRegistry, class: ClassName, method: MethodName, hash: u32) {
    match classes.declared_virtual(class, method) {
        Some((_, declared)) if declared == hash => {}
        Some((level, declared)) => CallError::frame_mismatch(
            class.as_str(),
            method.as_str(),
            format!("override has signature {hash:#010x}, {level} declares {declared:#010x}"),
        )
        .fail(),
        None => crate::gd_warn!("{class}::{method} does not override a virtual method of any base class"),
    }
}

fn construct_user<T: UserClass>() -> sys::ObjectPtr {
    Gd::<T>::new_user().into_ffi_transferred()
}

/// Registers the user class `T` with the class registry and the engine.
///
/// Runs [`UserClass::register()`] to collect virtual overrides. Registering a class twice is a no-op.
///
/// # Panics
/// - If the base class of `T` is not known.
/// - With `ArgumentFrameMismatch`, if a virtual override does not match the engine's declared signature.
#[track_caller]
pub fn register_class<T: UserClass>() {
    let runtime = init::runtime();
    let class = T::class_name();
    let parent = <T::Base as GdClass>::class_name();

    if runtime.classes.is_user_class(class) {
        sys::out!("user class {class} already registered");
        return;
    }
    if !runtime.classes.contains(parent) {
        panic!("register_class::<{class}>(): base class {parent} is unknown");
    }

    let mut builder = ClassBuilder::<T>::new();
    T::register(&mut builder);

    // A bad signature must leave no half-registered class behind.
    for pending in builder.virtuals.iter() {
        check_virtual_signature(&runtime.classes, parent, pending.method, pending.hash);
    }

    let entry = ClassEntry {
        parent: Some(parent),
        ..ClassEntry::new(class.as_str(), None, ClassKind::User)
    }
    .with_ref_counted(T::IS_REF_COUNTED)
    .with_constructor(construct_user::<T>);

    runtime.classes.register(entry);
    for pending in builder.virtuals {
        runtime.virtuals.register(class, pending.method, pending.f);
    }
    runtime.virtuals.invalidate();

    let info = sys::ClassCreationInfo {
        is_abstract: sys::NATIVE_FALSE,
        create_instance_func: Some(callbacks::create_instance),
        free_instance_func: Some(callbacks::free_instance),
        get_virtual_func: Some(callbacks::get_virtual),
        call_virtual_func: Some(callbacks::call_virtual),
        class_userdata: class.index() as usize as *mut c_void,
    };

    unsafe {
        interface_fn!(classdb_register_extension_class)(
            sys::get_library(),
            class.as_c_str().as_ptr(),
            parent.as_c_str().as_ptr(),
            &info,
        )
    };

    crate::gd_print!("registered class {class} (base {parent})");
}

/// Overrides the virtual method `name` for one object only, taking precedence over class-level overrides.
///
/// The closure gets the decoded parameters `P` and returns `R`.
///
/// # Panics
/// - With `InvalidReceiver`, if the object has no live Rust instance.
/// - With `ArgumentFrameMismatch`, if the closure does not match the engine's declared signature.
#[track_caller]
pub fn register_instance_override<T, P, R>(object: &Gd<T>, name: &str, f: impl Fn(P) -> R + Send + Sync + 'static)
where
    T: GdClass,
    P: InParamTuple,
    R: FrameValue,
{
    let runtime = init::runtime();
    let method = MethodName::new(name);

    let key = object
        .instance_id_or_none()
        .and_then(|id| runtime.instances.key_by_object(id));
    let Some(key) = key else {
        CallError::invalid_receiver(
            T::class_name().as_str(),
            name,
            "instance overrides need an object with a live Rust instance",
        )
        .fail()
    };

    if let Some(class) = runtime.instances.class_of(key) {
        check_virtual_signature(&runtime.classes, class, method, virtuals::virtual_signature::<P, R>());
    }

    runtime
        .instances
        .register_override(key, method, virtuals::erase_fn::<P, R, _>(f));
}
