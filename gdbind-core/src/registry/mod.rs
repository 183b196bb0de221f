/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Process-wide registries: method binds, classes, virtual overrides and user instances.

mod builder;
mod callbacks;
mod class;
mod method_bind;
mod plugin;
mod virtuals;

pub use builder::{register_class, register_instance_override, ClassBuilder};
pub use class::{ClassEntry, ClassKind, ClassRegistry, Constructor};
pub use method_bind::{BindKey, BindResolver, MethodBind, MethodBindTable, MethodSite, NativeResolver};
pub use plugin::ClassPlugin;
pub use virtuals::{DispatchLevel, DispatchOutcome, ErasedVirtual, Resolution, VirtualCall, VirtualTable};

pub use crate::storage::{ErasedStorage, InstanceKey, InstanceRegistry, InstanceStorage, Lifecycle};

use crate::meta::{ArgFrame, MethodName, RetSlot};
use crate::storage::DispatchTarget;

/// All registries of one initialized binding.
///
/// Created once by [`init::initialize()`][crate::init::initialize] and reachable through [`init::runtime()`][crate::init::runtime].
#[derive(Debug)]
pub struct Runtime {
    pub binds: MethodBindTable,
    pub classes: ClassRegistry,
    pub virtuals: VirtualTable,
    pub instances: InstanceRegistry,
}

impl Runtime {
    pub fn new(resolver: Box<dyn BindResolver>) -> Self {
        Self {
            binds: MethodBindTable::new(resolver),
            classes: ClassRegistry::new(),
            virtuals: VirtualTable::new(),
            instances: InstanceRegistry::new(),
        }
    }

    /// Runs the override of `method` for the instance `key`.
    ///
    /// Looks for an override of the instance itself, then of its class, then of each ancestor class. If none is found, or the
    /// instance does not take calls (not yet bound, torn down, unknown), the engine's native implementation should run.
    ///
    /// No registry lock is held while the override runs, so it may call back into the engine and the registries.
    ///
    /// # Safety
    /// `args` and `ret` must hold the argument and return slots of `method`, as the engine declares it.
    pub unsafe fn dispatch_virtual(
        &self,
        key: InstanceKey,
        method: MethodName,
        args: ArgFrame,
        ret: RetSlot,
    ) -> DispatchOutcome {
        // `_invocation` keeps the instance `Invoked` until this function returns or unwinds.
        let (f, storage, class, level, _invocation) = match self.instances.prepare_dispatch(key, method) {
            DispatchTarget::Instance {
                f,
                storage,
                class,
                invocation,
            } => (f, storage, class, DispatchLevel::Instance, invocation),

            DispatchTarget::Class {
                storage,
                class,
                invocation,
            } => {
                let vtable = self.virtuals.vtable(&self.classes, class);
                let Some(entry) = vtable.get(method) else {
                    return DispatchOutcome::NativeDefault;
                };
                (entry.f.clone(), storage, class, DispatchLevel::Class(entry.level), invocation)
            }

            DispatchTarget::Unavailable(lifecycle) => {
                match lifecycle {
                    Some(lifecycle) => {
                        crate::gd_warn!("virtual {method} on instance {key:?} in state {lifecycle:?}; using native default")
                    }
                    None => crate::gd_warn!("virtual {method} on unknown instance {key:?}; using native default"),
                }
                return DispatchOutcome::NativeDefault;
            }
        };

        crate::sys::out!("dispatch {class}::{method} on {key:?} at {level:?}");

        let call = unsafe { VirtualCall::new(&*storage, class, method, args, ret) };
        f(call);

        DispatchOutcome::Handled { level }
    }
}
