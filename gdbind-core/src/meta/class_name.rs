/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;
use std::ffi::CStr;
use std::fmt;

use crate::sys;
use sys::Global;

// Alternative optimizations:
// - Pre-computed hashes, to avoid rehashing the string on each lookup.
// - Lock-free read path; currently each `new()` takes the mutex, which is why generated code caches names in statics.
//
// First element (index 0) is always the empty name, which is used for "no class"/"no method".

static CLASS_NAMES: Global<SymbolTable> = Global::new(SymbolTable::with_empty);
static METHOD_NAMES: Global<SymbolTable> = Global::new(SymbolTable::with_empty);

/// Interned strings with stable indices. Entries are leaked; the set of class and method names is finite per process.
struct SymbolTable {
    entries: Vec<SymbolEntry>,
    index: HashMap<&'static str, u32>,
}

#[derive(Copy, Clone)]
struct SymbolEntry {
    text: &'static str,
    c_text: &'static CStr,
}

impl SymbolTable {
    fn with_empty() -> Self {
        let mut table = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        table.intern("");
        table
    }

    fn intern(&mut self, text: &str) -> u32 {
        if let Some(&index) = self.index.get(text) {
            return index;
        }

        let c_text: &'static CStr = Box::leak(sys::to_c_string(text).into_boxed_c_str());
        let text: &'static str = Box::leak(text.to_owned().into_boxed_str());

        let index = u32::try_from(self.entries.len()).unwrap_or_else(|_| panic!("too many interned names"));
        self.entries.push(SymbolEntry { text, c_text });
        self.index.insert(text, index);
        index
    }

    fn entry(&self, index: u32) -> SymbolEntry {
        self.entries[index as usize]
    }
}

/// Defines an interned name type over one symbol table.
macro_rules! interned_name {
    ($(#[$attr:meta])* $Name:ident, $table:ident) => {
        $(#[$attr])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        pub struct $Name {
            global_index: u32,
        }

        impl $Name {
            /// Looks up or interns the name.
            ///
            /// Takes a global lock; hot paths should cache the result.
            pub fn new(name: &str) -> Self {
                Self {
                    global_index: $table.lock().intern(name),
                }
            }

            /// The empty name.
            pub fn none() -> Self {
                Self { global_index: 0 }
            }

            pub fn is_none(&self) -> bool {
                self.global_index == 0
            }

            /// Index into the symbol table; stable for the process lifetime.
            #[allow(dead_code)]
            pub(crate) fn index(&self) -> u32 {
                self.global_index
            }

            /// Inverse of [`index()`](Self::index). Indices not handed out by this table map to the empty name.
            #[allow(dead_code)]
            pub(crate) fn from_index(index: u32) -> Self {
                let known = (index as usize) < $table.lock().entries.len();
                Self {
                    global_index: if known { index } else { 0 },
                }
            }

            pub fn as_str(&self) -> &'static str {
                $table.lock().entry(self.global_index).text
            }

            /// NUL-terminated form, as passed to the engine.
            pub fn as_c_str(&self) -> &'static CStr {
                $table.lock().entry(self.global_index).c_text
            }
        }

        impl fmt::Display for $Name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl fmt::Debug for $Name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($Name), self.as_str())
            }
        }

        impl From<&str> for $Name {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }
    };
}

interned_name! {
    /// Name of a class known to the engine, either native or registered by this library.
    ///
    /// Very cheap to copy and compare; the actual names live in a global table.
    ///
    /// # Ordering
    /// Deliberately not `Ord`: index order depends on registration order. Sort by [`as_str()`][Self::as_str] where a stable order
    /// is needed.
    ClassName, CLASS_NAMES
}

interned_name! {
    /// Identifier of a method, used as key in method bind and virtual override tables.
    ///
    /// Virtual dispatch compares these indices instead of strings.
    MethodName, METHOD_NAMES
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
