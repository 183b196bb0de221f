/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::registry::{BindKey, ClassEntry, ClassKind};

/// Self-registration record of an engine class wrapper, collected at load time.
#[doc(hidden)]
#[derive(Copy, Clone)]
pub struct ClassPlugin {
    pub class_name: &'static str,
    pub parent: Option<&'static str>,
    pub is_ref_counted: bool,

    /// Appends the method binds the wrapper calls.
    pub bind_keys: fn(&mut Vec<BindKey>),

    /// Virtual methods the class declares, with signature hashes.
    pub virtuals: &'static [(&'static str, u32)],
}

impl ClassPlugin {
    pub(crate) fn to_entry(self) -> ClassEntry {
        let entry = ClassEntry::new(self.class_name, self.parent, ClassKind::Engine).with_ref_counted(self.is_ref_counted);

        self.virtuals
            .iter()
            .fold(entry, |entry, &(method, hash)| entry.with_virtual(method, hash))
    }
}

impl fmt::Debug for ClassPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassPlugin")
            .field("class_name", &self.class_name)
            .field("parent", &self.parent)
            .finish()
    }
}
