/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::mem::ManuallyDrop;

use crate::meta::error::CallError;
use crate::obj::ledger;

/// Kind of native resource behind a [`Handle`], and how to give it back.
pub trait HandleKind: 'static {
    /// Raw token identifying the resource. Compared byte-wise.
    type Token: Copy + Eq + fmt::Debug;

    /// Name used in diagnostics.
    const NAME: &'static str;

    /// Returns the resource to the engine (free, destroy or unreference).
    ///
    /// # Safety
    /// `token` must be owned by the host and not released yet.
    unsafe fn release(token: Self::Token);

    /// Whether at most one owned handle may exist per token. Reference-counted resources return `false`.
    fn is_exclusive(_token: &Self::Token) -> bool {
        true
    }

    /// Key under which the debug ledger tracks this token.
    fn ledger_key(token: &Self::Token) -> u64;
}

/// Who is responsible for giving a handle back to the engine.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Ownership {
    /// The host owns the resource and releases it exactly once, on drop.
    Owned,

    /// The engine owns the resource; the host must not release it.
    Borrowed,

    /// A by-value view (e.g. an argument slot); nothing to release.
    Unowned,
}

/// Opaque engine token together with its [`Ownership`].
///
/// A handle can only be created by [`owned()`](Self::owned), [`borrowed()`](Self::borrowed) or [`unowned()`](Self::unowned).
/// Owned handles are released when dropped; [`release()`](Self::release) and [`into_transferred()`](Self::into_transferred)
/// consume the handle, so a second release of the same handle does not type-check.
pub struct Handle<K: HandleKind> {
    token: K::Token,
    ownership: Ownership,
}

impl<K: HandleKind> Handle<K> {
    /// Acquire-as-owned: the host now must release `token`.
    ///
    /// # Safety
    /// The engine must have handed ownership of `token` to the host (e.g. a freshly constructed object, a returned string, or an
    /// extra reference that was just taken).
    pub unsafe fn owned(token: K::Token) -> Self {
        ledger::acquire::<K>(&token);
        Self {
            token,
            ownership: Ownership::Owned,
        }
    }

    /// Acquire-as-borrowed: the engine keeps ownership.
    ///
    /// # Safety
    /// `token` must stay valid as long as the handle is used.
    pub unsafe fn borrowed(token: K::Token) -> Self {
        Self {
            token,
            ownership: Ownership::Borrowed,
        }
    }

    /// Non-owning view of a token that lives in a frame or on the stack.
    pub fn unowned(token: K::Token) -> Self {
        Self {
            token,
            ownership: Ownership::Unowned,
        }
    }

    pub fn token(&self) -> K::Token {
        self.token
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn is_owned(&self) -> bool {
        self.ownership == Ownership::Owned
    }

    /// Another handle to the same token that does not own it.
    ///
    /// # Safety
    /// The returned handle must not outlive the resource.
    pub unsafe fn to_borrowed(&self) -> Self {
        unsafe { Self::borrowed(self.token) }
    }

    /// Releases the handle now; a no-op for borrowed and unowned handles.
    pub fn release(self) {
        drop(self)
    }

    /// Hands ownership to the engine without releasing, returning the raw token.
    ///
    /// # Panics
    /// With `OwnershipViolation` if the handle is not owned; the host cannot give away what it does not own.
    #[track_caller]
    pub fn into_transferred(self) -> K::Token {
        if self.ownership != Ownership::Owned {
            CallError::ownership_violation(format!(
                "cannot transfer {:?} {} handle {:?}",
                self.ownership,
                K::NAME,
                self.token
            ))
            .fail();
        }

        ledger::forget::<K>(&self.token);
        let this = ManuallyDrop::new(self);
        this.token
    }

    /// Raw token without any release; ownership (if any) is dropped on the floor.
    ///
    /// Used for borrowed and unowned handles whose token is copied into a frame.
    pub fn into_token_leaked(self) -> K::Token {
        if self.ownership == Ownership::Owned {
            ledger::forget::<K>(&self.token);
        }
        let this = ManuallyDrop::new(self);
        this.token
    }
}

impl<K: HandleKind> Drop for Handle<K> {
    fn drop(&mut self) {
        if self.ownership == Ownership::Owned {
            ledger::release::<K>(&self.token);

            // SAFETY: owned handles are released exactly once, here; the other exits use ManuallyDrop.
            unsafe { K::release(self.token) };
        }
    }
}

impl<K: HandleKind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("kind", &K::NAME)
            .field("token", &self.token)
            .field("ownership", &self.ownership)
            .finish()
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test_kind {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};

    thread_local! {
        static RELEASES: RefCell<HashMap<u64, usize>> = RefCell::new(HashMap::new());
    }

    static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

    /// Handle kind whose "native release" just counts, per token.
    pub struct CountingKind;

    impl CountingKind {
        pub fn fresh_token() -> u64 {
            NEXT_TOKEN.fetch_add(1, Ordering::Relaxed)
        }

        pub fn releases(token: u64) -> usize {
            RELEASES.with(|r| r.borrow().get(&token).copied().unwrap_or(0))
        }
    }

    impl HandleKind for CountingKind {
        type Token = u64;
        const NAME: &'static str = "counting";

        unsafe fn release(token: u64) {
            RELEASES.with(|r| *r.borrow_mut().entry(token).or_default() += 1);
        }

        fn ledger_key(token: &u64) -> u64 {
            *token
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_kind::CountingKind;
    use super::*;

    #[test]
    fn owned_released_once_on_drop() {
        let token = CountingKind::fresh_token();
        {
            let handle = unsafe { Handle::<CountingKind>::owned(token) };
            assert!(handle.is_owned());
        }
        assert_eq!(CountingKind::releases(token), 1);
    }

    #[test]
    fn borrowed_and_unowned_never_release() {
        let token = CountingKind::fresh_token();
        let borrowed = unsafe { Handle::<CountingKind>::borrowed(token) };
        let unowned = Handle::<CountingKind>::unowned(token);
        borrowed.release();
        drop(unowned);

        assert_eq!(CountingKind::releases(token), 0);
    }

    #[test]
    fn owned_plus_borrowed_copy_releases_once() {
        let token = CountingKind::fresh_token();
        let owner = unsafe { Handle::<CountingKind>::owned(token) };
        let view = unsafe { owner.to_borrowed() };
        assert_eq!(view.token(), owner.token());

        owner.release();
        drop(view);
        assert_eq!(CountingKind::releases(token), 1);
    }

    #[test]
    fn transfer_skips_release() {
        let token = CountingKind::fresh_token();
        let handle = unsafe { Handle::<CountingKind>::owned(token) };
        assert_eq!(handle.into_transferred(), token);
        assert_eq!(CountingKind::releases(token), 0);
    }

    #[test]
    #[should_panic(expected = "ownership violation")]
    fn transfer_of_borrowed_fails() {
        let token = CountingKind::fresh_token();
        let handle = unsafe { Handle::<CountingKind>::borrowed(token) };
        handle.into_transferred();
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "ownership violation")]
    fn double_owned_exclusive_token_detected() {
        let token = CountingKind::fresh_token();
        let first = unsafe { Handle::<CountingKind>::owned(token) };
        let _second = unsafe { Handle::<CountingKind>::owned(token) };
        std::mem::forget(first);
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Property tests
