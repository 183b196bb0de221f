/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Startup of the binding: storing the engine's interface table, building the registries, checking method binds.

use std::error::Error;
use std::fmt;
use std::sync::OnceLock;

use crate::meta::error::BindCheckError;
use crate::registry::{BindKey, BindResolver, NativeResolver, Runtime};
use crate::{private, sys};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Runtime options for [`initialize()`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct InitConfig {
    /// Resolve every method bind of the engine class wrappers at startup, and fail on missing ones.
    ///
    /// Without this, a missing bind is only detected when first called, as a `BindNotFound` panic.
    pub verify_binds: bool,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self { verify_binds: true }
    }
}

/// Error returned by [`initialize()`].
#[derive(Debug)]
pub enum InitError {
    /// The binding was already initialized with a different interface table.
    AlreadyInitialized,

    /// Some method binds the wrappers use are missing from the engine.
    IncompatibleBinds(BindCheckError),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInitialized => write!(f, "binding already initialized with a different interface table"),
            Self::IncompatibleBinds(err) => write!(f, "{err}"),
        }
    }
}

impl Error for InitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AlreadyInitialized => None,
            Self::IncompatibleBinds(err) => Some(err),
        }
    }
}

/// Initializes the binding with the engine's interface table.
///
/// Builds the class registry from all engine class wrappers, and with [`InitConfig::verify_binds`] resolves every method bind
/// they use. Calling this again with the same table only repeats the bind check.
///
/// # Safety
/// - `interface` must point to a function table that lives for the rest of the process.
/// - `library` must be the library pointer the engine handed over on load.
pub unsafe fn initialize(
    interface: *const sys::NativeInterface,
    library: sys::LibraryPtr,
    config: InitConfig,
) -> Result<(), InitError> {
    unsafe { initialize_with_resolver(interface, library, config, Box::new(NativeResolver)) }
}

/// Like [`initialize()`], with a custom source of method binds.
///
/// The resolver is only used on first initialization.
///
/// # Safety
/// See [`initialize()`].
pub unsafe fn initialize_with_resolver(
    interface: *const sys::NativeInterface,
    library: sys::LibraryPtr,
    config: InitConfig,
    resolver: Box<dyn BindResolver>,
) -> Result<(), InitError> {
    unsafe { sys::initialize(interface, library) }.map_err(|_| InitError::AlreadyInitialized)?;

    let runtime = RUNTIME.get_or_init(|| {
        let runtime = Runtime::new(resolver);
        for plugin in private::collect_engine_classes() {
            runtime.classes.register(plugin.to_entry());
        }

        crate::gd_print!("gdbind initialized with {} engine classes", runtime.classes.len());
        runtime
    });

    if config.verify_binds {
        verify_binds().map_err(InitError::IncompatibleBinds)?;
        sys::out!("verified {} method binds", runtime.binds.len());
    }

    Ok(())
}

/// Every method bind used by the engine class wrappers, in a stable order.
pub fn declared_binds() -> Vec<BindKey> {
    let mut keys = Vec::new();
    for plugin in private::collect_engine_classes() {
        (plugin.bind_keys)(&mut keys);
    }
    keys
}

/// Resolves every method bind used by the engine class wrappers, listing all missing ones on failure.
///
/// # Panics
/// If the binding is not initialized.
pub fn verify_binds() -> Result<(), BindCheckError> {
    runtime().binds.verify(&declared_binds())
}

/// The registries of the initialized binding.
///
/// # Panics
/// If [`initialize()`] has not been called.
#[track_caller]
pub fn runtime() -> &'static Runtime {
    match RUNTIME.get() {
        Some(runtime) => runtime,
        None => panic!("gdbind not initialized; call gdbind::init::initialize() first"),
    }
}

pub fn try_runtime() -> Option<&'static Runtime> {
    RUNTIME.get()
}

pub fn is_initialized() -> bool {
    RUNTIME.get().is_some()
}
