/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{PoisonError, RwLock};

use crate::meta::{ClassName, MethodName};
use crate::sys;
use sys::interface_fn;

/// Creates the engine object of a user class, with its Rust instance bound. Returns one ownership unit to the caller.
pub type Constructor = fn() -> sys::ObjectPtr;

/// Who provides a class.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ClassKind {
    Engine,
    User,
}

/// One class in the hierarchy.
#[derive(Clone, Debug)]
pub struct ClassEntry {
    pub name: ClassName,
    pub parent: Option<ClassName>,
    pub kind: ClassKind,
    pub is_ref_counted: bool,

    /// Virtual methods the class declares, with their signature hashes.
    pub virtuals: HashMap<MethodName, u32>,

    /// Set for user classes; engine classes are constructed natively.
    pub constructor: Option<Constructor>,
}

impl ClassEntry {
    pub fn new(name: &str, parent: Option<&str>, kind: ClassKind) -> Self {
        Self {
            name: ClassName::new(name),
            parent: parent.map(ClassName::new),
            kind,
            is_ref_counted: false,
            virtuals: HashMap::new(),
            constructor: None,
        }
    }

    pub fn with_ref_counted(mut self, is_ref_counted: bool) -> Self {
        self.is_ref_counted = is_ref_counted;
        self
    }

    pub fn with_virtual(mut self, method: &str, hash: u32) -> Self {
        self.virtuals.insert(MethodName::new(method), hash);
        self
    }

    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = Some(constructor);
        self
    }
}

/// Known classes and their parent links, both engine-provided and user-defined.
#[derive(Default)]
pub struct ClassRegistry {
    classes: RwLock<HashMap<ClassName, ClassEntry>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class, replacing an earlier entry with the same name.
    pub fn register(&self, entry: ClassEntry) {
        sys::out!("register class {} (parent {:?})", entry.name, entry.parent);

        self.classes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entry.name, entry);
    }

    pub fn contains(&self, class: ClassName) -> bool {
        self.read(|classes| classes.contains_key(&class))
    }

    pub fn get(&self, class: ClassName) -> Option<ClassEntry> {
        self.read(|classes| classes.get(&class).cloned())
    }

    pub fn is_user_class(&self, class: ClassName) -> bool {
        self.read(|classes| classes.get(&class).is_some_and(|e| e.kind == ClassKind::User))
    }

    /// Creates an object of a known class: through its constructor for user classes, natively otherwise.
    ///
    /// Returns `None` for unknown classes, or if the engine failed to construct the object.
    pub fn construct(&self, class: ClassName) -> Option<sys::ObjectPtr> {
        let entry = self.get(class)?;

        // Constructors run user code, which may register more classes: no lock held here.
        let ptr = match entry.constructor {
            Some(constructor) => constructor(),
            None => unsafe { interface_fn!(classdb_construct_object)(class.as_c_str().as_ptr()) },
        };

        (!ptr.is_null()).then_some(ptr)
    }

    /// The class followed by its ancestors, most derived first.
    ///
    /// Stops at the first class without a known parent. A cycle in the parent links ends the walk at the repeated class.
    pub fn ancestors(&self, class: ClassName) -> Vec<ClassName> {
        self.read(|classes| {
            let mut chain = vec![class];
            let mut seen = HashSet::from([class]);

            let mut current = class;
            while let Some(parent) = classes.get(&current).and_then(|e| e.parent) {
                if !seen.insert(parent) {
                    break;
                }
                chain.push(parent);
                current = parent;
            }

            chain
        })
    }

    /// Whether `class` is `base` or one of its subclasses.
    pub fn inherits(&self, class: ClassName, base: ClassName) -> bool {
        self.ancestors(class).contains(&base)
    }

    /// The closest class in the hierarchy of `class` that declares `method` as virtual, with the declared signature hash.
    pub fn declared_virtual(&self, class: ClassName, method: MethodName) -> Option<(ClassName, u32)> {
        let chain = self.ancestors(class);
        self.read(|classes| {
            chain.iter().find_map(|level| {
                let hash = classes.get(level)?.virtuals.get(&method)?;
                Some((*level, *hash))
            })
        })
    }

    pub fn len(&self) -> usize {
        self.read(|classes| classes.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read<R>(&self, f: impl FnOnce(&HashMap<ClassName, ClassEntry>) -> R) -> R {
        let guard = self.classes.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry").field("classes", &self.len()).finish()
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
