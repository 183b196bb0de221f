/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::any::Any;
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};

use crate::meta::ClassName;
use crate::obj::GdClass;

/// Stage of a user instance, from creation to native destruction.
///
/// `Unbound -> Bound <-> Invoked -> TornDown`. Only bound (or invoked) instances take virtual calls.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Lifecycle {
    /// Rust part created, not yet attached to its engine object.
    Unbound,

    /// Attached with `object_set_instance`; no virtual call running.
    Bound,

    /// A virtual call from the engine is running on the instance. Back to `Bound` once the outermost call returns.
    Invoked,

    /// The engine destroyed the object and freed the instance.
    TornDown,
}

impl Lifecycle {
    pub fn accepts_calls(self) -> bool {
        matches!(self, Lifecycle::Bound | Lifecycle::Invoked)
    }
}

/// Type-erased view of an [`InstanceStorage`], as kept by the instance registry.
pub trait ErasedStorage: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn class_name(&self) -> ClassName;

    /// Whether a `bind()` or `bind_mut()` guard is currently alive.
    fn is_bound(&self) -> bool;
}

/// Holds the Rust part of a user class instance.
///
/// Access follows the borrow rules at runtime: any number of shared binds, or one exclusive bind. Conflicting access panics
/// instead of blocking, as it can only come from re-entrant calls on the engine's main thread.
pub struct InstanceStorage<T: GdClass> {
    user: RwLock<T>,
    class: ClassName,
}

// SAFETY: user instances are only accessed from the thread the engine calls into the extension on. Locks guard against
// re-entrancy, not against concurrency.
unsafe impl<T: GdClass> Send for InstanceStorage<T> {}
unsafe impl<T: GdClass> Sync for InstanceStorage<T> {}

impl<T: GdClass> InstanceStorage<T> {
    pub fn new(user: T, class: ClassName) -> Self {
        Self {
            user: RwLock::new(user),
            class,
        }
    }

    #[track_caller]
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        match self.user.try_read() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                panic!("Gd<{}>::bind() failed, already bound mutably", self.class)
            }
        }
    }

    #[track_caller]
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        match self.user.try_write() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                panic!("Gd<{}>::bind_mut() failed, already bound", self.class)
            }
        }
    }
}

impl<T: GdClass> ErasedStorage for InstanceStorage<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn class_name(&self) -> ClassName {
        self.class
    }

    fn is_bound(&self) -> bool {
        matches!(self.user.try_write(), Err(TryLockError::WouldBlock))
    }
}

impl<T: GdClass> fmt::Debug for InstanceStorage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceStorage")
            .field("class", &self.class)
            .field("bound", &self.is_bound())
            .finish()
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::NoBase;

    struct Counter {
        value: i32,
    }

    impl GdClass for Counter {
        type Base = NoBase;
        const IS_REF_COUNTED: bool = false;

        fn class_name() -> ClassName {
            ClassName::new("Counter")
        }
    }

    #[test]
    fn shared_binds_coexist() {
        let storage = InstanceStorage::new(Counter { value: 3 }, Counter::class_name());
        let a = storage.get();
        let b = storage.get();
        assert_eq!(a.value + b.value, 6);
        assert!(storage.is_bound());

        drop((a, b));
        assert!(!storage.is_bound());

        storage.get_mut().value += 1;
        assert_eq!(storage.get().value, 4);
    }

    #[test]
    #[should_panic(expected = "already bound")]
    fn exclusive_bind_conflicts() {
        let storage = InstanceStorage::new(Counter { value: 0 }, Counter::class_name());
        let _shared = storage.get();
        let _exclusive = storage.get_mut();
    }

    #[test]
    fn erased_downcast() {
        let storage: std::sync::Arc<dyn ErasedStorage> =
            std::sync::Arc::new(InstanceStorage::new(Counter { value: 9 }, Counter::class_name()));

        let typed = storage.as_any().downcast_ref::<InstanceStorage<Counter>>();
        assert_eq!(typed.map(|s| s.get().value), Some(9));
        assert_eq!(storage.class_name().as_str(), "Counter");
    }
}
