/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Load-time self-registration of class wrappers.
//!
//! Each wrapper announces itself (name, parent, declared method binds) from a static constructor that the platform runs
//! before `main`, or before the engine first calls into the library. Initialization later drains the registry in sorted order,
//! so the result never depends on link order.

use std::sync::{Mutex, PoisonError};

/// Append-only list of plugins of one kind, filled by static constructors.
pub struct PluginRegistry<T> {
    items: Mutex<Vec<T>>,
}

impl<T> PluginRegistry<T> {
    pub const fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, plugin: T) {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).push(plugin);
    }

    /// Runs `f` on every plugin, in registration order.
    pub fn for_each(&self, mut f: impl FnMut(&T)) {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.iter().for_each(&mut f);
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> PluginRegistry<T> {
    /// Copy of all plugins, sorted by `key`.
    pub fn sorted_by_key<K: Ord>(&self, key: impl FnMut(&T) -> K) -> Vec<T> {
        let mut all = self.items.lock().unwrap_or_else(PoisonError::into_inner).clone();
        all.sort_by_key(key);
        all
    }
}

impl<T> Default for PluginRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Declares a registry named `$registry` for plugins of type `$Type`.
///
/// The static itself gets a mangled lowercase name; refer to it through [`plugin_add!`] and [`plugin_registry_ref!`].
#[doc(hidden)]
#[macro_export]
macro_rules! plugin_registry {
    ($vis:vis $registry:ident: $Type:ty) => {
        $crate::paste::paste! {
            #[used]
            #[doc(hidden)]
            #[allow(non_upper_case_globals)]
            $vis static [< __gdbind_plugins_ $registry:lower >]: $crate::PluginRegistry<$Type> = $crate::PluginRegistry::new();
        }
    };
}

/// Refers to a registry declared with [`plugin_registry!`], optionally in another module.
#[doc(hidden)]
#[macro_export]
macro_rules! plugin_registry_ref {
    ($registry:ident) => {
        $crate::paste::paste!([< __gdbind_plugins_ $registry:lower >])
    };

    ($registry:ident in $path:path) => {
        $crate::paste::paste!($path :: [< __gdbind_plugins_ $registry:lower >])
    };
}

/// Adds a plugin to a registry before `main` runs.
#[doc(hidden)]
#[macro_export]
#[cfg_attr(rustfmt, rustfmt::skip)]
macro_rules! plugin_add {
    (@ctor { $target:expr }; $plugin:expr) => {
        const _: () = {
            // Platform sections for static constructors.
            #[used]
            #[cfg_attr(target_os = "windows", link_section = ".CRT$XCU")]
            #[cfg_attr(any(target_os = "macos", target_os = "ios"), link_section = "__DATA,__mod_init_func")]
            #[cfg_attr(
                any(
                    target_os = "linux",
                    target_os = "android",
                    target_os = "freebsd",
                    target_os = "netbsd",
                    target_os = "openbsd",
                    target_os = "dragonfly"
                ),
                link_section = ".init_array"
            )]
            static REGISTER: extern "C" fn() = {
                extern "C" fn register() {
                    $target.push($plugin);
                }
                register
            };
        };
    };

    ($registry:ident; $plugin:expr) => {
        $crate::plugin_add!(@ctor { $crate::plugin_registry_ref!($registry) }; $plugin);
    };

    ($registry:ident in $path:path; $plugin:expr) => {
        $crate::plugin_add!(@ctor { $crate::plugin_registry_ref!($registry in $path) }; $plugin);
    };
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    plugin_registry!(CLASSES: (&'static str, &'static str));

    plugin_add!(CLASSES; ("Node2D", "CanvasItem"));
    plugin_add!(CLASSES; ("Object", ""));
    plugin_add!(CLASSES; ("CanvasItem", "Node"));
    plugin_add!(CLASSES; ("Node", "Object"));

    #[test]
    fn plugin_registry_collects_all() {
        let registry = &plugin_registry_ref!(CLASSES);
        assert_eq!(registry.len(), 4);

        let sorted = registry.sorted_by_key(|(name, _)| *name);
        assert_eq!(
            sorted,
            [
                ("CanvasItem", "Node"),
                ("Node", "Object"),
                ("Node2D", "CanvasItem"),
                ("Object", ""),
            ]
        );

        let mut roots = 0;
        registry.for_each(|(_, parent)| roots += usize::from(parent.is_empty()));
        assert_eq!(roots, 1);
    }

    #[test]
    fn registry_starts_empty() {
        let registry = PluginRegistry::<u32>::new();
        assert!(registry.is_empty());

        registry.push(3);
        registry.push(1);
        assert_eq!(registry.sorted_by_key(|n| *n), [1, 3]);
    }
}
