/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;
use std::fmt;
use std::sync::{OnceLock, PoisonError, RwLock};

use crate::meta::error::{BindCheckError, CallError};
use crate::meta::{ClassName, MethodName};
use crate::sys;
use sys::interface_fn;

/// Resolved method bind: an engine pointer plus the signature hash it was resolved for.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct MethodBind {
    ptr: sys::MethodBindPtr,
    hash: u32,
}

// SAFETY: method binds are immutable engine-global descriptors, valid for the lifetime of the engine and usable from any thread
// the engine allows calls on.
unsafe impl Send for MethodBind {}
unsafe impl Sync for MethodBind {}

impl MethodBind {
    /// # Safety
    /// `ptr` must be a method bind returned by the engine for a signature with hash `hash`.
    pub unsafe fn from_raw(ptr: sys::MethodBindPtr, hash: u32) -> Self {
        Self { ptr, hash }
    }

    pub fn ptr(&self) -> sys::MethodBindPtr {
        self.ptr
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }
}

impl fmt::Debug for MethodBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodBind({:p}, {:#010x})", self.ptr, self.hash)
    }
}

/// Source of method binds. The table consults it at most once per `(class, method)` pair.
pub trait BindResolver: Send + Sync {
    /// Pointer to the engine's method bind, or null if the engine has no method with this signature.
    fn resolve(&self, class: ClassName, method: MethodName, hash: u32) -> sys::MethodBindPtr;
}

/// Resolves through the engine's `classdb_get_method_bind`.
#[derive(Default)]
pub struct NativeResolver;

impl BindResolver for NativeResolver {
    fn resolve(&self, class: ClassName, method: MethodName, hash: u32) -> sys::MethodBindPtr {
        unsafe {
            interface_fn!(classdb_get_method_bind)(class.as_c_str().as_ptr(), method.as_c_str().as_ptr(), hash)
        }
    }
}

/// Identifies a method bind that generated code depends on: class name, method name and signature hash.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct BindKey {
    pub class: &'static str,
    pub method: &'static str,
    pub hash: u32,
}

impl BindKey {
    pub const fn new(class: &'static str, method: &'static str, hash: u32) -> Self {
        Self { class, method, hash }
    }
}

/// Static description of one generated method wrapper.
///
/// One `static` per wrapper; names are interned on first use and cached here.
pub struct MethodSite {
    class: &'static str,
    method: &'static str,
    hash: u32,
    names: OnceLock<(ClassName, MethodName)>,
}

impl MethodSite {
    pub const fn new(class: &'static str, method: &'static str, hash: u32) -> Self {
        Self {
            class,
            method,
            hash,
            names: OnceLock::new(),
        }
    }

    pub fn class(&self) -> &'static str {
        self.class
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }

    pub fn class_name(&self) -> ClassName {
        self.names().0
    }

    pub fn method_name(&self) -> MethodName {
        self.names().1
    }

    pub fn key(&self) -> BindKey {
        BindKey::new(self.class, self.method, self.hash)
    }

    fn names(&self) -> (ClassName, MethodName) {
        *self
            .names
            .get_or_init(|| (ClassName::new(self.class), MethodName::new(self.method)))
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Cache of resolved method binds, keyed by `(class, method)`.
///
/// Reads take a shared lock; a miss takes the exclusive lock, re-checks, and only then asks the resolver. So each pair is
/// resolved at most once, even when many threads miss at the same time.
pub struct MethodBindTable {
    resolver: Box<dyn BindResolver>,
    cache: RwLock<HashMap<(ClassName, MethodName), MethodBind>>,
}

impl MethodBindTable {
    pub fn new(resolver: Box<dyn BindResolver>) -> Self {
        Self {
            resolver,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Method bind for `class::method`, resolving it on first use.
    ///
    /// # Panics
    /// - `BindNotFound` if the engine has no such method with this signature.
    /// - `ArgumentFrameMismatch` if the pair was already resolved with a different signature hash.
    #[track_caller]
    pub fn resolve(&self, class: ClassName, method: MethodName, hash: u32) -> MethodBind {
        match self.try_resolve(class, method, hash) {
            Ok(bind) => bind,
            Err(err) => err.fail(),
        }
    }

    /// Like [`resolve()`](Self::resolve), but reports errors as values.
    pub fn try_resolve(&self, class: ClassName, method: MethodName, hash: u32) -> Result<MethodBind, CallError> {
        let key = (class, method);

        let cached = self.cache.read().unwrap_or_else(PoisonError::into_inner).get(&key).copied();
        if let Some(bind) = cached {
            return Self::check_hash(bind, class, method, hash);
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(&bind) = cache.get(&key) {
            return Self::check_hash(bind, class, method, hash);
        }

        let ptr = self.resolver.resolve(class, method, hash);
        if ptr.is_null() {
            return Err(CallError::bind_not_found(class.as_str(), method.as_str(), hash));
        }

        sys::out!("resolved {class}::{method} ({hash:#010x}) -> {ptr:p}");

        let bind = unsafe { MethodBind::from_raw(ptr, hash) };
        cache.insert(key, bind);
        Ok(bind)
    }

    fn check_hash(bind: MethodBind, class: ClassName, method: MethodName, hash: u32) -> Result<MethodBind, CallError> {
        if bind.hash == hash {
            Ok(bind)
        } else {
            Err(CallError::frame_mismatch(
                class.as_str(),
                method.as_str(),
                format!(
                    "bind was resolved with signature {:#010x}, call site expects {hash:#010x}",
                    bind.hash
                ),
            ))
        }
    }

    /// Resolves every key, collecting all failures instead of stopping at the first.
    pub fn verify(&self, keys: &[BindKey]) -> Result<(), BindCheckError> {
        let missing: Vec<CallError> = keys
            .iter()
            .filter_map(|key| {
                self.try_resolve(ClassName::new(key.class), MethodName::new(key.method), key.hash)
                    .err()
            })
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(BindCheckError::new(missing))
        }
    }

    /// Number of cached binds.
    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for MethodBindTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodBindTable").field("cached", &self.len()).finish()
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::error::CallErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};

    /// Hands out fake pointers for known methods and counts every resolution.
    struct CountingResolver {
        known: Vec<(&'static str, &'static str, u32)>,
        calls: Arc<AtomicUsize>,
    }

    impl BindResolver for CountingResolver {
        fn resolve(&self, class: ClassName, method: MethodName, hash: u32) -> sys::MethodBindPtr {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let found = self
                .known
                .iter()
                .position(|&(c, m, h)| c == class.as_str() && m == method.as_str() && h == hash);

            match found {
                Some(index) => (0x1000 + index * 0x10) as sys::MethodBindPtr,
                None => std::ptr::null(),
            }
        }
    }

    fn table(known: Vec<(&'static str, &'static str, u32)>) -> (MethodBindTable, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = CountingResolver {
            known,
            calls: calls.clone(),
        };
        (MethodBindTable::new(Box::new(resolver)), calls)
    }

    #[test]
    fn resolve_is_cached() {
        let (table, calls) = table(vec![("Node2D", "set_position", 7)]);
        let class = ClassName::new("Node2D");
        let method = MethodName::new("set_position");

        let first = table.resolve(class, method, 7);
        let second = table.resolve(class, method, 7);

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn concurrent_resolution_happens_once() {
        const THREADS: usize = 16;

        let (table, calls) = table(vec![("Mesh", "get_aabb", 42)]);
        let table = Arc::new(table);
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let table = table.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    let bind = table.resolve(ClassName::new("Mesh"), MethodName::new("get_aabb"), 42);
                    bind.ptr() as usize
                })
            })
            .collect();

        let ptrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(ptrs.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_bind_is_error_value() {
        let (table, _) = table(vec![]);
        let err = table
            .try_resolve(ClassName::new("Node"), MethodName::new("no_such_method"), 1)
            .unwrap_err();

        assert_eq!(err.kind(), CallErrorKind::BindNotFound);
        assert_eq!(err.class_name(), Some("Node"));
        assert_eq!(err.method_name(), "no_such_method");
        assert!(table.is_empty());
    }

    #[test]
    #[should_panic(expected = "bind not found in Node::no_such_method")]
    fn missing_bind_panics_on_call_path() {
        let (table, _) = table(vec![]);
        table.resolve(ClassName::new("Node"), MethodName::new("no_such_method"), 1);
    }

    #[test]
    fn hash_disagreement_is_frame_mismatch() {
        let (table, _) = table(vec![("Light3D", "set_color", 3)]);
        let class = ClassName::new("Light3D");
        let method = MethodName::new("set_color");

        table.resolve(class, method, 3);
        let err = table.try_resolve(class, method, 4).unwrap_err();
        assert_eq!(err.kind(), CallErrorKind::ArgumentFrameMismatch);
    }

    #[test]
    fn verify_lists_every_missing_bind() {
        let (table, _) = table(vec![("Node", "get_name", 1)]);
        let keys = [
            BindKey::new("Node", "get_name", 1),
            BindKey::new("Node", "get_name_v2", 2),
            BindKey::new("TileMap", "set_cell", 3),
        ];

        let err = table.verify(&keys).unwrap_err();
        let missing: Vec<&str> = err.missing().iter().map(|e| e.method_name()).collect();
        assert_eq!(missing, ["get_name_v2", "set_cell"]);

        assert!(table.verify(&keys[..1]).is_ok());
    }

    #[test]
    fn method_site_interns_lazily() {
        static SITE: MethodSite = MethodSite::new("Engine", "get_frames_drawn", 9);

        assert_eq!(SITE.class_name(), ClassName::new("Engine"));
        assert_eq!(SITE.method_name().as_str(), "get_frames_drawn");
        assert_eq!(SITE.key(), BindKey::new("Engine", "get_frames_drawn", 9));
    }
}
