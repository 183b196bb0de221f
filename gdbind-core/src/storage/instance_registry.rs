/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use crate::meta::error::CallError;
use crate::meta::{ClassName, MethodName};
use crate::obj::InstanceId;
use crate::registry::ErasedVirtual;
use crate::storage::{ErasedStorage, Lifecycle};
use crate::sys;

/// Key of a user instance, handed to the engine as its class instance pointer.
///
/// Keys are never reused, so a key that is no longer registered identifies a torn-down instance.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct InstanceKey(u64);

impl InstanceKey {
    pub fn as_instance_ptr(self) -> sys::ClassInstancePtr {
        self.0 as usize as sys::ClassInstancePtr
    }

    pub fn from_instance_ptr(ptr: sys::ClassInstancePtr) -> Option<Self> {
        if ptr.is_null() {
            None
        } else {
            Some(Self(ptr as usize as u64))
        }
    }
}

struct InstanceRecord {
    storage: Arc<dyn ErasedStorage>,
    class: ClassName,
    object_id: Option<InstanceId>,
    lifecycle: Lifecycle,
    /// Virtual calls currently running on this instance; more than one when calls re-enter.
    active_calls: u32,
    overrides: HashMap<MethodName, ErasedVirtual>,
}

struct Instances {
    next_key: u64,
    records: HashMap<InstanceKey, InstanceRecord>,
    by_object: HashMap<InstanceId, InstanceKey>,
}

/// What a virtual call on an instance should run, as determined under the registry lock.
pub(crate) enum DispatchTarget<'a> {
    /// Instance-level override.
    Instance {
        f: ErasedVirtual,
        storage: Arc<dyn ErasedStorage>,
        class: ClassName,
        invocation: Invocation<'a>,
    },

    /// No instance override; the class hierarchy decides.
    Class {
        storage: Arc<dyn ErasedStorage>,
        class: ClassName,
        invocation: Invocation<'a>,
    },

    /// The instance does not take calls in this state (`None`: the key was never handed out).
    Unavailable(Option<Lifecycle>),
}

/// Keeps an instance in state `Invoked` while alive. Dropping it (also during unwinding) ends the call.
pub(crate) struct Invocation<'a> {
    registry: &'a InstanceRegistry,
    key: InstanceKey,
}

impl Drop for Invocation<'_> {
    fn drop(&mut self) {
        self.registry.finish_dispatch(self.key);
    }
}

/// All live user instances, with their lifecycle and per-instance virtual overrides.
pub struct InstanceRegistry {
    inner: RwLock<Instances>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Instances {
                next_key: 1,
                records: HashMap::new(),
                by_object: HashMap::new(),
            }),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Instances> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read<R>(&self, f: impl FnOnce(&Instances) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Registers a new instance in state `Unbound`.
    pub fn create(
        &self,
        storage: Arc<dyn ErasedStorage>,
        class: ClassName,
        object_id: Option<InstanceId>,
    ) -> InstanceKey {
        let mut inner = self.write();
        let key = InstanceKey(inner.next_key);
        inner.next_key += 1;

        inner.records.insert(
            key,
            InstanceRecord {
                storage,
                class,
                object_id,
                lifecycle: Lifecycle::Unbound,
                active_calls: 0,
                overrides: HashMap::new(),
            },
        );
        if let Some(id) = object_id {
            inner.by_object.insert(id, key);
        }

        key
    }

    /// `Unbound -> Bound`, once the engine object holds the instance.
    pub fn mark_bound(&self, key: InstanceKey) {
        if let Some(record) = self.write().records.get_mut(&key) {
            if record.lifecycle == Lifecycle::Unbound {
                record.lifecycle = Lifecycle::Bound;
            }
        }
    }

    /// Current stage of an instance, or `None` for keys never handed out.
    pub fn lifecycle(&self, key: InstanceKey) -> Option<Lifecycle> {
        self.read(|inner| match inner.records.get(&key) {
            Some(record) => Some(record.lifecycle),
            None if key.0 > 0 && key.0 < inner.next_key => Some(Lifecycle::TornDown),
            None => None,
        })
    }

    /// Removes the instance, returning its storage so the caller can drop it outside the lock.
    pub fn tear_down(&self, key: InstanceKey) -> Option<Arc<dyn ErasedStorage>> {
        let mut inner = self.write();
        let record = inner.records.remove(&key)?;
        if let Some(id) = record.object_id {
            inner.by_object.remove(&id);
        }

        Some(record.storage)
    }

    /// Whether the object with this ID has a bound Rust instance.
    pub fn is_bound_object(&self, id: InstanceId) -> bool {
        self.read(|inner| {
            inner
                .by_object
                .get(&id)
                .and_then(|key| inner.records.get(key))
                .is_some_and(|record| record.lifecycle.accepts_calls())
        })
    }

    pub fn storage_by_object(&self, id: InstanceId) -> Option<Arc<dyn ErasedStorage>> {
        self.read(|inner| {
            let key = inner.by_object.get(&id)?;
            inner.records.get(key).map(|record| record.storage.clone())
        })
    }

    pub fn key_by_object(&self, id: InstanceId) -> Option<InstanceKey> {
        self.read(|inner| inner.by_object.get(&id).copied())
    }

    /// Class of a live instance.
    pub fn class_of(&self, key: InstanceKey) -> Option<ClassName> {
        self.read(|inner| inner.records.get(&key).map(|record| record.class))
    }

    /// Number of live (not torn down) instances.
    pub fn live_count(&self) -> usize {
        self.read(|inner| inner.records.len())
    }

    /// Overrides `method` for one instance only. Takes precedence over class-level overrides.
    ///
    /// # Panics
    /// With `InvalidReceiver` if the instance was torn down or never existed.
    #[track_caller]
    pub fn register_override(&self, key: InstanceKey, method: MethodName, f: ErasedVirtual) {
        let registered = match self.write().records.get_mut(&key) {
            Some(record) => {
                record.overrides.insert(method, f);
                true
            }
            None => false,
        };

        if !registered {
            CallError::invalid_receiver(
                "",
                method.as_str(),
                format!("cannot override on instance {key:?}; it is not alive"),
            )
            .fail();
        }
    }

    /// Looks up what to run for a virtual call, and moves `Bound -> Invoked` until the returned invocation is dropped.
    pub(crate) fn prepare_dispatch(&self, key: InstanceKey, method: MethodName) -> DispatchTarget<'_> {
        let mut inner = self.write();
        let next_key = inner.next_key;

        let Some(record) = inner.records.get_mut(&key) else {
            let lifecycle = (key.0 > 0 && key.0 < next_key).then_some(Lifecycle::TornDown);
            return DispatchTarget::Unavailable(lifecycle);
        };

        if !record.lifecycle.accepts_calls() {
            return DispatchTarget::Unavailable(Some(record.lifecycle));
        }
        record.lifecycle = Lifecycle::Invoked;
        record.active_calls += 1;

        let invocation = Invocation { registry: self, key };
        let storage = record.storage.clone();
        let class = record.class;
        match record.overrides.get(&method) {
            Some(f) => DispatchTarget::Instance {
                f: f.clone(),
                storage,
                class,
                invocation,
            },
            None => DispatchTarget::Class {
                storage,
                class,
                invocation,
            },
        }
    }

    /// Ends one virtual call; the outermost one moves `Invoked -> Bound`. No-op if the instance was torn down meanwhile.
    fn finish_dispatch(&self, key: InstanceKey) {
        let mut inner = self.write();
        let Some(record) = inner.records.get_mut(&key) else {
            return;
        };

        record.active_calls = record.active_calls.saturating_sub(1);
        if record.active_calls == 0 && record.lifecycle == Lifecycle::Invoked {
            record.lifecycle = Lifecycle::Bound;
        }
    }
}

impl Default for InstanceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceRegistry").field("live", &self.live_count()).finish()
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
