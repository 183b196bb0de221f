/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lazily initialized, mutex-protected global.
///
/// Usable in `static` items thanks to the `const` constructors; the initializer runs on first [`lock()`](Self::lock).
/// Access goes through a guard that derefs to both `&T` and `&mut T`.
///
/// A panic while the guard is held does not poison the global for later users.
pub struct Global<T> {
    value: Mutex<Option<T>>,
    init_fn: fn() -> T,
}

impl<T> Global<T> {
    /// Creates a global with a lazy initialization function.
    pub const fn new(init_fn: fn() -> T) -> Self {
        Self {
            value: Mutex::new(None),
            init_fn,
        }
    }

    /// Creates a global initialized with `T::default()`.
    ///
    /// Inherent rather than the `Default` trait, because the latter is not `const`.
    pub const fn default() -> Self
    where
        T: Default,
    {
        Self::new(T::default)
    }

    /// Blocks until the global is available, initializing it if needed.
    pub fn lock(&self) -> GlobalGuard<'_, T> {
        let mut guard = self.value.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_none() {
            *guard = Some((self.init_fn)());
        }

        GlobalGuard { guard }
    }
}

/// Guard that temporarily gives access to a `Global<T>`'s inner value.
pub struct GlobalGuard<'a, T> {
    guard: MutexGuard<'a, Option<T>>,
}

impl<T> Deref for GlobalGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.guard.as_ref() {
            Some(value) => value,
            None => unreachable!("guard only handed out after initialization"),
        }
    }
}

impl<T> DerefMut for GlobalGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match self.guard.as_mut() {
            Some(value) => value,
            None => unreachable!("guard only handed out after initialization"),
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    static NAMES: Global<HashMap<&'static str, u16>> = Global::default();
    static KINDS: Global<Vec<&'static str>> = Global::new(|| vec!["Object", "Node"]);

    #[test]
    fn global_lazy_default() {
        {
            let mut names = NAMES.lock();
            names.insert("Node2D", 2);
            names.insert("Mesh", 3);
        }

        let names = NAMES.lock();
        assert_eq!(names.get("Node2D"), Some(&2));
        assert_eq!(names.get("Mesh"), Some(&3));
    }

    #[test]
    fn global_custom_init() {
        KINDS.lock().push("Resource");

        let kinds = KINDS.lock();
        assert_eq!(*kinds, ["Object", "Node", "Resource"]);
    }

    #[test]
    fn global_survives_panic_in_guard() {
        static COUNTER: Global<u32> = Global::default();

        let result = std::panic::catch_unwind(|| {
            let mut guard = COUNTER.lock();
            *guard += 1;
            panic!("boom");
        });
        assert!(result.is_err());

        assert_eq!(*COUNTER.lock(), 1);
    }
}
