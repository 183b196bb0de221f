/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Debug-only bookkeeping of live owned handles.
//!
//! Ownership typing already rules out double release of one `Handle`. The ledger catches what typing cannot see: two owned
//! handles minted for the same exclusive token through separate `unsafe` acquisitions. Compiled out in release builds.

use crate::obj::handle::HandleKind;

#[cfg(debug_assertions)]
mod imp {
    use std::any::TypeId;
    use std::collections::HashMap;

    use crate::meta::error::CallError;
    use crate::obj::handle::HandleKind;
    use crate::sys::Global;

    static OWNED: Global<HashMap<(TypeId, u64), usize>> = Global::default();

    fn key<K: HandleKind>(token: &K::Token) -> (TypeId, u64) {
        (TypeId::of::<K>(), K::ledger_key(token))
    }

    #[track_caller]
    pub fn acquire<K: HandleKind>(token: &K::Token) {
        let violation = {
            let mut owned = OWNED.lock();
            let count = owned.entry(key::<K>(token)).or_default();
            if *count > 0 && K::is_exclusive(token) {
                true
            } else {
                *count += 1;
                false
            }
        };

        // Panic outside the lock.
        if violation {
            CallError::ownership_violation(format!(
                "{} handle {token:?} acquired as owned while another owner is alive",
                K::NAME
            ))
            .fail();
        }
    }

    #[track_caller]
    pub fn release<K: HandleKind>(token: &K::Token) {
        if !remove_one::<K>(token) {
            CallError::ownership_violation(format!("{} handle {token:?} released without a live owner", K::NAME))
                .fail();
        }
    }

    pub fn forget<K: HandleKind>(token: &K::Token) {
        remove_one::<K>(token);
    }

    fn remove_one<K: HandleKind>(token: &K::Token) -> bool {
        let mut owned = OWNED.lock();
        let key = key::<K>(token);
        match owned.get_mut(&key) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                owned.remove(&key);
                true
            }
            None => false,
        }
    }

    pub fn live_count<K: HandleKind>(token: &K::Token) -> usize {
        OWNED.lock().get(&key::<K>(token)).copied().unwrap_or(0)
    }
}

#[cfg(not(debug_assertions))]
mod imp {
    use crate::obj::handle::HandleKind;

    #[inline]
    pub fn acquire<K: HandleKind>(_token: &K::Token) {}

    #[inline]
    pub fn release<K: HandleKind>(_token: &K::Token) {}

    #[inline]
    pub fn forget<K: HandleKind>(_token: &K::Token) {}

    #[inline]
    pub fn live_count<K: HandleKind>(_token: &K::Token) -> usize {
        0
    }
}

#[track_caller]
pub(crate) fn acquire<K: HandleKind>(token: &K::Token) {
    imp::acquire::<K>(token)
}

#[track_caller]
pub(crate) fn release<K: HandleKind>(token: &K::Token) {
    imp::release::<K>(token)
}

pub(crate) fn forget<K: HandleKind>(token: &K::Token) {
    imp::forget::<K>(token)
}

/// Number of owned handles currently alive for `token`. Always 0 in release builds.
pub fn live_owned_count<K: HandleKind>(token: &K::Token) -> usize {
    imp::live_count::<K>(token)
}
