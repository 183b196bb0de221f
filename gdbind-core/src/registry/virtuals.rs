/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::meta::{ArgFrame, ClassName, FrameValue, InParamTuple, MethodName, RetSlot};
use crate::obj::GdClass;
use crate::registry::ClassRegistry;
use crate::storage::{ErasedStorage, InstanceStorage};
use crate::sys;

/// Type-erased virtual method implementation.
pub type ErasedVirtual = Arc<dyn Fn(VirtualCall<'_>) + Send + Sync>;

/// One virtual call from the engine, as seen by an [`ErasedVirtual`].
pub struct VirtualCall<'a> {
    storage: &'a dyn ErasedStorage,
    class: ClassName,
    method: MethodName,
    args: ArgFrame,
    ret: RetSlot,
}

impl<'a> VirtualCall<'a> {
    /// # Safety
    /// `args` and `ret` must match the signature of `method` as the engine calls it.
    pub(crate) unsafe fn new(
        storage: &'a dyn ErasedStorage,
        class: ClassName,
        method: MethodName,
        args: ArgFrame,
        ret: RetSlot,
    ) -> Self {
        Self {
            storage,
            class,
            method,
            args,
            ret,
        }
    }

    /// Class of the instance being called (most derived).
    pub fn class(&self) -> ClassName {
        self.class
    }

    pub fn method(&self) -> MethodName {
        self.method
    }

    /// Decodes all arguments.
    ///
    /// # Safety
    /// `P` must match the argument kinds of the call.
    pub unsafe fn params<P: InParamTuple>(&self) -> P {
        unsafe { P::from_arg_frame(&self.args) }
    }

    /// Storage of the instance, typed.
    ///
    /// # Panics
    /// If the instance is not a `T`.
    #[track_caller]
    pub fn storage<T: GdClass>(&self) -> &'a InstanceStorage<T> {
        match self.storage.as_any().downcast_ref::<InstanceStorage<T>>() {
            Some(storage) => storage,
            None => panic!(
                "virtual {} registered for {}, but called on instance of {}",
                self.method,
                T::class_name(),
                self.storage.class_name()
            ),
        }
    }

    /// Writes the return value; consumes the call.
    pub fn write_return<R: FrameValue>(self, value: R) {
        self.ret.write(value)
    }
}

impl fmt::Debug for VirtualCall<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtualCall({}::{})", self.class, self.method)
    }
}

/// Signature hash of a virtual implemented as `Fn(P) -> R`.
pub(crate) fn virtual_signature<P: InParamTuple, R: FrameValue>() -> u32 {
    let running = P::kinds().into_iter().fold(sys::SIGNATURE_SEED, sys::signature_step);
    sys::signature_finish(running, R::KIND)
}

pub(crate) fn erase_method<T, P, R, F>(f: F) -> ErasedVirtual
where
    T: GdClass,
    P: InParamTuple,
    R: FrameValue,
    F: Fn(&T, P) -> R + Send + Sync + 'static,
{
    Arc::new(move |call: VirtualCall<'_>| {
        let params = unsafe { call.params::<P>() };
        let storage = call.storage::<T>();
        let ret = {
            let instance = storage.get();
            f(&instance, params)
        };
        call.write_return(ret);
    })
}

pub(crate) fn erase_method_mut<T, P, R, F>(f: F) -> ErasedVirtual
where
    T: GdClass,
    P: InParamTuple,
    R: FrameValue,
    F: Fn(&mut T, P) -> R + Send + Sync + 'static,
{
    Arc::new(move |call: VirtualCall<'_>| {
        let params = unsafe { call.params::<P>() };
        let storage = call.storage::<T>();
        let ret = {
            let mut instance = storage.get_mut();
            f(&mut instance, params)
        };
        call.write_return(ret);
    })
}

pub(crate) fn erase_fn<P, R, F>(f: F) -> ErasedVirtual
where
    P: InParamTuple,
    R: FrameValue,
    F: Fn(P) -> R + Send + Sync + 'static,
{
    Arc::new(move |call: VirtualCall<'_>| {
        let params = unsafe { call.params::<P>() };
        call.write_return(f(params));
    })
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Where a virtual method is implemented, for one class.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Resolution {
    /// Overridden in `level`: the class itself or the nearest ancestor that overrides it.
    Override { level: ClassName },

    /// No override anywhere in the hierarchy.
    NativeDefault,
}

/// Where a dispatched virtual call ended up.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DispatchLevel {
    Instance,
    Class(ClassName),
}

/// Result of dispatching one virtual call.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DispatchOutcome {
    Handled { level: DispatchLevel },

    /// Nothing on the host side handles the call; the engine runs its own implementation.
    NativeDefault,
}

impl DispatchOutcome {
    pub fn is_handled(self) -> bool {
        matches!(self, DispatchOutcome::Handled { .. })
    }
}

#[derive(Clone)]
pub(crate) struct ResolvedEntry {
    pub level: ClassName,
    pub f: ErasedVirtual,
}

/// Flattened overrides of one class: every method overridden by it or an ancestor, mapped to the most derived override.
pub(crate) struct ResolvedVtable {
    entries: HashMap<MethodName, ResolvedEntry>,
}

impl ResolvedVtable {
    pub fn get(&self, method: MethodName) -> Option<&ResolvedEntry> {
        self.entries.get(&method)
    }
}

/// Class-level virtual overrides, with a lazily built vtable per class.
///
/// The vtable cache is dropped whenever an override is added or the hierarchy changes; it is rebuilt on the next lookup.
#[derive(Default)]
pub struct VirtualTable {
    overrides: RwLock<HashMap<ClassName, HashMap<MethodName, ErasedVirtual>>>,
    resolved: RwLock<HashMap<ClassName, Arc<ResolvedVtable>>>,
}

impl VirtualTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides `method` for `class` and all its subclasses that do not override it themselves.
    pub fn register(&self, class: ClassName, method: MethodName, f: ErasedVirtual) {
        self.overrides
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(class)
            .or_default()
            .insert(method, f);

        self.invalidate();
    }

    /// Drops all cached vtables.
    pub fn invalidate(&self) {
        self.resolved.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Finds the class that implements `method` for instances of `class`: the class itself, then each ancestor.
    pub fn resolve(&self, classes: &ClassRegistry, class: ClassName, method: MethodName) -> Resolution {
        match self.vtable(classes, class).get(method) {
            Some(entry) => Resolution::Override { level: entry.level },
            None => Resolution::NativeDefault,
        }
    }

    pub(crate) fn vtable(&self, classes: &ClassRegistry, class: ClassName) -> Arc<ResolvedVtable> {
        let cached = self
            .resolved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&class)
            .cloned();
        if let Some(vtable) = cached {
            return vtable;
        }

        let vtable = Arc::new(self.build_vtable(classes, class));
        self.resolved
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(class)
            .or_insert(vtable)
            .clone()
    }

    fn build_vtable(&self, classes: &ClassRegistry, class: ClassName) -> ResolvedVtable {
        let overrides = self.overrides.read().unwrap_or_else(PoisonError::into_inner);
        let mut entries = HashMap::new();

        for level in classes.ancestors(class) {
            let Some(methods) = overrides.get(&level) else {
                continue;
            };

            for (&method, f) in methods.iter() {
                entries.entry(method).or_insert_with(|| ResolvedEntry {
                    level,
                    f: f.clone(),
                });
            }
        }

        sys::out!("built vtable for {class} with {} entries", entries.len());
        ResolvedVtable { entries }
    }
}

impl fmt::Debug for VirtualTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let classes = self.overrides.read().unwrap_or_else(PoisonError::into_inner).len();
        f.debug_struct("VirtualTable").field("classes", &classes).finish()
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
