/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::sync::OnceLock;

use crate::{LibraryPtr, NativeInterface};

/// Late-init state handed over by the engine on load.
struct NativeBinding {
    interface: &'static NativeInterface,
    library: LibraryToken,
}

// Only an identifier for the engine; never dereferenced on the host side.
#[derive(Copy, Clone)]
struct LibraryToken(LibraryPtr);

// SAFETY: the library pointer is an opaque cookie passed back to the engine unchanged.
unsafe impl Send for LibraryToken {}
unsafe impl Sync for LibraryToken {}

static BINDING: OnceLock<NativeBinding> = OnceLock::new();

/// Returned when the binding was already initialized with a different function table.
#[derive(Debug)]
pub struct AlreadyInitialized;

impl fmt::Display for AlreadyInitialized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "native binding already initialized with a different interface table")
    }
}

impl std::error::Error for AlreadyInitialized {}

/// Stores the engine's function table for the rest of the process.
///
/// Initializing again with the same table is a no-op, so that multiple test harnesses in one process can share a binding.
///
/// # Safety
/// - `interface` must point to a function table that outlives the process.
/// - `library` must be the pointer the engine gave to the library on load.
pub unsafe fn initialize(
    interface: *const NativeInterface,
    library: LibraryPtr,
) -> Result<(), AlreadyInitialized> {
    assert!(!interface.is_null(), "native interface pointer is null");

    // SAFETY: caller guarantees the table lives for the rest of the process.
    let interface: &'static NativeInterface = unsafe { &*interface };

    let binding = BINDING.get_or_init(|| NativeBinding {
        interface,
        library: LibraryToken(library),
    });

    if std::ptr::eq(binding.interface, interface) {
        crate::out!("native binding initialized");
        Ok(())
    } else {
        Err(AlreadyInitialized)
    }
}

/// Whether [`initialize`] has completed.
pub fn is_initialized() -> bool {
    BINDING.get().is_some()
}

/// The engine's function table.
///
/// # Panics
/// If the binding has not been initialized.
#[inline]
#[track_caller]
pub fn get_interface() -> &'static NativeInterface {
    match BINDING.get() {
        Some(binding) => binding.interface,
        None => panic!("native binding not initialized; call the library's `initialize` first"),
    }
}

/// The function table, if initialized.
#[inline]
pub fn try_get_interface() -> Option<&'static NativeInterface> {
    BINDING.get().map(|binding| binding.interface)
}

/// Library pointer the engine gave to this extension.
///
/// # Panics
/// If the binding has not been initialized.
#[track_caller]
pub fn get_library() -> LibraryPtr {
    match BINDING.get() {
        Some(binding) => binding.library.0,
        None => panic!("native binding not initialized; no library pointer available"),
    }
}

#[doc(hidden)]
#[cold]
#[track_caller]
pub fn __missing_interface_fn(name: &str) -> ! {
    panic!("native interface does not provide function `{name}`")
}

/// Fetches a function from the native interface table.
///
/// Panics with the function's name if the engine did not provide it.
#[macro_export]
macro_rules! interface_fn {
    ($name:ident) => {{
        match $crate::get_interface().$name {
            Some(f) => f,
            None => $crate::__missing_interface_fn(stringify!($name)),
        }
    }};
}
