/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::cell::OnceCell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::init;
use crate::meta::error::{CallError, ConvertError};
use crate::meta::{Receiver, ReturnOwnership};
use crate::obj::raw::{self, ObjectKind, ObjectToken};
use crate::obj::{Base, GdClass, GdMut, GdRef, Handle, HasHandle, Inherits, InstanceId, Ownership, UserClass};
use crate::storage::{ErasedStorage, InstanceStorage};
use crate::sys;
use sys::interface_fn;

/// Smart pointer to an engine object.
///
/// A `Gd<T>` carries the [`Ownership`] of its object handle:
/// - **Owned** pointers release the object when dropped: one reference for reference-counted classes, the object itself for
///   manually managed ones.
/// - **Borrowed** pointers refer to objects the engine keeps alive (children in a tree, singletons); they never release.
///
/// Cloning a reference-counted `Gd` takes another reference, so each clone is owned. Cloning a manually managed `Gd` yields a
/// borrowed pointer, since there can only be one owner.
///
/// Methods of the engine class `T` and its ancestors are available through the per-class `*Api` traits, e.g.
/// [`Node2DApi`][crate::classes::Node2DApi].
pub struct Gd<T: GdClass> {
    handle: Handle<ObjectKind>,
    cached_id: Option<InstanceId>,

    // Rust instance of a user class, looked up on first bind.
    storage: OnceCell<Option<Arc<dyn ErasedStorage>>>,

    _marker: PhantomData<*const T>,
}

impl<T: GdClass> Gd<T> {
    /// Creates a new instance of a manually managed class.
    ///
    /// The returned pointer is owned: dropping it destroys the object, unless ownership was transferred to the engine (e.g. by
    /// `add_child`) or [`free()`](Self::free) was called.
    ///
    /// # Panics
    /// If `T` is reference-counted; use [`new_gd()`](Self::new_gd) instead.
    #[track_caller]
    pub fn new_alloc() -> Self {
        if T::IS_REF_COUNTED {
            panic!("new_alloc(): {} is reference-counted, use new_gd()", T::class_name());
        }
        Self::construct()
    }

    /// Creates a new instance of a reference-counted class, holding the first reference.
    ///
    /// # Panics
    /// If `T` is manually managed; use [`new_alloc()`](Self::new_alloc) instead.
    #[track_caller]
    pub fn new_gd() -> Self {
        if !T::IS_REF_COUNTED {
            panic!("new_gd(): {} is manually managed, use new_alloc()", T::class_name());
        }
        Self::construct()
    }

    #[track_caller]
    fn construct() -> Self {
        let class = T::class_name();
        let ptr = unsafe { interface_fn!(classdb_construct_object)(class.as_c_str().as_ptr()) };
        if ptr.is_null() {
            panic!("engine failed to construct object of class {class}");
        }

        sys::out!("construct {class} at {ptr:p}");

        // SAFETY: constructed objects come with one ownership unit for the caller.
        unsafe { Self::from_handle(Handle::owned(ObjectToken::from_live_ptr(ptr))) }
    }

    /// Looks up an object by its instance ID.
    ///
    /// Reference-counted objects are returned owned (a new reference is taken), manually managed ones borrowed.
    pub fn try_from_instance_id(id: InstanceId) -> Result<Self, ConvertError> {
        let ptr = id.lookup_ptr();
        if ptr.is_null() {
            return Err(ConvertError::null_object(T::class_name().as_str()));
        }

        // SAFETY: the engine just resolved the ID to a live object.
        let token = unsafe { ObjectToken::from_live_ptr(ptr) };
        let token = match unsafe { raw::cast_to(token, T::class_name()) } {
            Some(token) => token,
            None => return Err(ConvertError::failed_cast("Object", T::class_name().as_str())),
        };

        Ok(unsafe { Self::from_token_copied(token) })
    }

    /// ⚠️ Looks up an object by its instance ID.
    ///
    /// # Panics
    /// If no object with this ID exists, or it is not a `T`.
    #[track_caller]
    pub fn from_instance_id(id: InstanceId) -> Self {
        match Self::try_from_instance_id(id) {
            Ok(gd) => gd,
            Err(err) => panic!("Gd::from_instance_id({id}): {err}"),
        }
    }

    /// # Safety
    /// The handle must refer to a live object of class `T` (or a subclass).
    pub(crate) unsafe fn from_handle(handle: Handle<ObjectKind>) -> Self {
        let token = handle.token();
        let cached_id = if token.is_null() {
            None
        } else {
            unsafe { InstanceId::of_object(token.ptr()) }
        };

        Self {
            handle,
            cached_id,
            storage: OnceCell::new(),
            _marker: PhantomData,
        }
    }

    /// A second pointer to an object someone else already holds: a new reference if reference-counted, borrowed otherwise.
    ///
    /// # Safety
    /// `token` must refer to a live object of class `T`.
    pub(crate) unsafe fn from_token_copied(token: ObjectToken) -> Self {
        let handle = if token.is_ref_counted() {
            unsafe {
                token.add_reference();
                Handle::owned(token)
            }
        } else {
            unsafe { Handle::borrowed(token) }
        };

        unsafe { Self::from_handle(handle) }
    }

    /// Wraps an object pointer coming from the engine, according to the ownership contract of the call that produced it.
    ///
    /// Returns `None` for null.
    ///
    /// # Safety
    /// `ptr` must be null or point to a live object of class `T`. If `ownership` says owned, the engine must have handed over
    /// one ownership unit.
    pub(crate) unsafe fn from_ffi(ptr: sys::ObjectPtr, ownership: ReturnOwnership) -> Option<Self> {
        if ptr.is_null() {
            return None;
        }

        let token = unsafe { ObjectToken::from_live_ptr(ptr) };
        let owned = ownership.resolve(token.is_ref_counted());

        let handle = match (owned, token.is_ref_counted()) {
            (true, _) => unsafe { Handle::owned(token) },

            // Borrowed reference-counted objects could be freed any time; hold a reference of our own.
            (false, true) => unsafe {
                token.add_reference();
                Handle::owned(token)
            },

            (false, false) => unsafe { Handle::borrowed(token) },
        };

        Some(unsafe { Self::from_handle(handle) })
    }

    /// ID of the object, as assigned by the engine.
    ///
    /// # Panics
    /// If the pointer is null.
    #[track_caller]
    pub fn instance_id(&self) -> InstanceId {
        match self.cached_id {
            Some(id) => id,
            None => panic!("instance_id() on null Gd<{}>", T::class_name()),
        }
    }

    /// ID of the object, or `None` for a null pointer.
    pub fn instance_id_or_none(&self) -> Option<InstanceId> {
        self.cached_id
    }

    /// Whether the object is still alive on the engine side.
    pub fn is_instance_valid(&self) -> bool {
        self.cached_id.is_some_and(|id| id.lookup_ptr() == self.handle.token().ptr())
    }

    pub fn ownership(&self) -> Ownership {
        self.handle.ownership()
    }

    /// **Upcast:** convert into a smart pointer to a base class. Always succeeds.
    pub fn upcast<Base>(self) -> Gd<Base>
    where
        Base: GdClass,
        T: Inherits<Base>,
    {
        let token = self.handle.token();
        self.retype(token)
    }

    /// **Downcast:** try to convert into a smart pointer to a derived class.
    ///
    /// The check is done by the engine (class tag comparison). On failure, the original pointer is returned.
    pub fn try_cast<Derived>(self) -> Result<Gd<Derived>, Self>
    where
        Derived: GdClass,
    {
        let token = self.handle.token();
        match unsafe { raw::cast_to(token, Derived::class_name()) } {
            Some(cast) => Ok(self.retype(cast)),
            None => Err(self),
        }
    }

    /// ⚠️ **Downcast:** convert into a smart pointer to a derived class.
    ///
    /// # Panics
    /// If the object is not an instance of `Derived`.
    #[track_caller]
    pub fn cast<Derived>(self) -> Gd<Derived>
    where
        Derived: GdClass,
    {
        match self.try_cast::<Derived>() {
            Ok(cast) => cast,
            Err(original) => {
                let err = ConvertError::failed_cast(T::class_name().as_str(), Derived::class_name().as_str());
                panic!("{err} (instance {:?})", original.cached_id)
            }
        }
    }

    fn retype<U: GdClass>(self, token: ObjectToken) -> Gd<U> {
        let Gd {
            handle,
            cached_id,
            storage,
            ..
        } = self;

        let handle = if handle.token() == token {
            handle
        } else {
            // Same object under a different pointer: move the ownership unit over.
            let ownership = handle.ownership();
            let _ = handle.into_token_leaked();
            match ownership {
                Ownership::Owned => unsafe { Handle::owned(token) },
                Ownership::Borrowed => unsafe { Handle::borrowed(token) },
                Ownership::Unowned => Handle::unowned(token),
            }
        };

        Gd {
            handle,
            cached_id,
            storage,
            _marker: PhantomData,
        }
    }

    /// Destroys a manually managed object now.
    ///
    /// # Panics
    /// - If the object is reference-counted; drop all pointers instead.
    /// - If this pointer is not the owner, e.g. a child returned by `get_child()`. The engine owns that object.
    #[track_caller]
    pub fn free(self) {
        let token = self.handle.token();
        if token.is_ref_counted() {
            panic!("free() on reference-counted {}; drop it instead", T::class_name());
        }

        if !self.handle.is_owned() {
            CallError::ownership_violation(format!(
                "free() on {:?} Gd<{}>; only the owner may free an object",
                self.handle.ownership(),
                T::class_name()
            ))
            .fail();
        }

        self.handle.release();
    }

    /// Hands the object over to the engine, returning the raw pointer.
    ///
    /// Owned pointers give their ownership unit away; borrowed ones pass the pointer along.
    pub(crate) fn into_ffi_transferred(self) -> sys::ObjectPtr {
        if self.handle.is_owned() {
            self.handle.into_transferred().ptr()
        } else {
            self.handle.into_token_leaked().ptr()
        }
    }

    pub(crate) fn token(&self) -> ObjectToken {
        self.handle.token()
    }

    /// Instance storage of a user class, or panics.
    #[track_caller]
    fn erased_storage(&self) -> &Arc<dyn ErasedStorage> {
        let Some(id) = self.cached_id else {
            CallError::invalid_receiver(T::class_name().as_str(), "bind", "null object").fail()
        };

        let instances = &init::runtime().instances;
        if !instances.is_bound_object(id) {
            CallError::invalid_receiver(
                T::class_name().as_str(),
                "bind",
                format!("no live Rust instance for object {id}"),
            )
            .fail();
        }

        let storage = self.storage.get_or_init(|| instances.storage_by_object(id));
        match storage {
            Some(storage) => storage,
            None => CallError::invalid_receiver(
                T::class_name().as_str(),
                "bind",
                format!("no Rust instance bound to object {id}"),
            )
            .fail(),
        }
    }
}

impl<T: UserClass> Gd<T> {
    /// Creates a user class instance through a custom initializer.
    ///
    /// Constructs the native base object, creates the Rust part with `init`, and binds it to the object. The class must have
    /// been registered with [`register_class()`][crate::registry::register_class].
    #[track_caller]
    pub fn from_init_fn(init: impl FnOnce(Base<T::Base>) -> T) -> Self {
        let class = T::class_name();
        let runtime = init::runtime();
        if !runtime.classes.is_user_class(class) {
            panic!("user class {class} is not registered; call register_class() first");
        }

        let native = T::native_class_name();
        let ptr = unsafe { interface_fn!(classdb_construct_object)(native.as_c_str().as_ptr()) };
        if ptr.is_null() {
            panic!("engine failed to construct native base {native} of {class}");
        }

        // Own the object before running user code, so a panicking initializer does not leak it.
        let token = unsafe { ObjectToken::from_live_ptr(ptr) };
        let handle = unsafe { Handle::owned(token) };

        let user = init(unsafe { Base::from_token(token) });
        let cached_id = unsafe { InstanceId::of_object(ptr) };

        let storage: Arc<dyn ErasedStorage> = Arc::new(InstanceStorage::new(user, class));
        let key = runtime.instances.create(storage.clone(), class, cached_id);

        unsafe { interface_fn!(object_set_instance)(ptr, class.as_c_str().as_ptr(), key.as_instance_ptr()) };
        runtime.instances.mark_bound(key);

        sys::out!("bound {class} instance {key:?} to {ptr:p}");

        Self {
            handle,
            cached_id,
            storage: OnceCell::from(Some(storage)),
            _marker: PhantomData,
        }
    }

    /// Creates a user class instance through [`UserClass::init()`].
    #[track_caller]
    pub fn new_user() -> Self {
        Self::from_init_fn(T::init)
    }

    /// Shared access to the Rust instance.
    ///
    /// # Panics
    /// If the instance is currently bound mutably, or was torn down.
    #[track_caller]
    pub fn bind(&self) -> GdRef<'_, T> {
        GdRef::from_guard(self.typed_storage().get())
    }

    /// Exclusive access to the Rust instance.
    ///
    /// # Panics
    /// If the instance is currently bound, or was torn down.
    #[track_caller]
    pub fn bind_mut(&mut self) -> GdMut<'_, T> {
        GdMut::from_guard(self.typed_storage().get_mut())
    }

    #[track_caller]
    fn typed_storage(&self) -> &InstanceStorage<T> {
        match self.erased_storage().as_any().downcast_ref::<InstanceStorage<T>>() {
            Some(storage) => storage,
            None => panic!("object is bound to a different Rust class than {}", T::class_name()),
        }
    }
}

impl<T: GdClass> HasHandle for Gd<T> {
    fn receiver(&self) -> Receiver {
        Receiver::new(self.handle.token().ptr(), self.cached_id)
    }
}

impl<T: GdClass> Clone for Gd<T> {
    fn clone(&self) -> Self {
        // SAFETY: `self` keeps the object alive at this point.
        let mut clone = unsafe { Self::from_token_copied(self.handle.token()) };
        if let Some(storage) = self.storage.get() {
            let _ = clone.storage.set(storage.clone());
        }
        clone.cached_id = self.cached_id;
        clone
    }
}

impl<T: GdClass> PartialEq for Gd<T> {
    /// Two pointers are equal if they point to the same object.
    fn eq(&self, other: &Self) -> bool {
        self.handle.token().ptr() == other.handle.token().ptr()
    }
}

impl<T: GdClass> Eq for Gd<T> {}

impl<T: GdClass> fmt::Debug for Gd<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gd")
            .field("class", &T::class_name())
            .field("id", &self.cached_id)
            .field("ownership", &self.handle.ownership())
            .finish()
    }
}
