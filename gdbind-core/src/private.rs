/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Items used by macros; not part of the public API.

use std::panic::AssertUnwindSafe;
use std::sync::atomic;

pub use crate::meta::{frame_words, CallFrame, FrameArg, FrameValue, ReturnOwnership};
pub use crate::registry::{BindKey, ClassPlugin, MethodSite};
pub use crate::sys::{signature_hash, SlotKind};

use crate::sys;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Global variables

// Engine class wrappers, registered by `engine_class!`.
sys::plugin_registry!(pub ENGINE_CLASSES: ClassPlugin);

/// Level:
/// - 0: no error printing (during expected panics in tests)
/// - 1: print errors of caught panics (default)
static ERROR_PRINT_LEVEL: atomic::AtomicU8 = atomic::AtomicU8::new(1);

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Plugin handling

/// All engine class plugins, sorted by class name so that startup does not depend on link order.
pub(crate) fn collect_engine_classes() -> Vec<ClassPlugin> {
    sys::plugin_registry_ref!(ENGINE_CLASSES).sorted_by_key(|plugin| plugin.class_name)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Panic handling

fn extract_panic_message(err: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = err.downcast_ref::<&'static str>() {
        s.to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        format!("(panic of type ID {:?})", (*err).type_id())
    }
}

fn format_panic_message(msg: String) -> String {
    // Multi-line messages: every line on its own, indented.
    let lbegin = "\n  ";
    let indented = msg.replace('\n', lbegin);

    if indented.len() != msg.len() {
        format!("[panic]{lbegin}{indented}")
    } else {
        format!("[panic]  {msg}")
    }
}

pub fn set_error_print_level(level: u8) -> u8 {
    assert!(level <= 1);
    ERROR_PRINT_LEVEL.swap(level, atomic::Ordering::Relaxed)
}

fn has_error_print_level(level: u8) -> bool {
    ERROR_PRINT_LEVEL.load(atomic::Ordering::Relaxed) >= level
}

/// Executes `code`. If it panics, the panic is caught and reported through the engine's error output.
///
/// Returns `Err(message)` if a panic occurred, and `Ok(result)` with the result of `code` otherwise. Used at every boundary where
/// the engine calls into Rust, since unwinding into native frames is undefined behavior.
pub fn handle_panic<E, F, R, S>(error_context: E, code: F) -> Result<R, String>
where
    E: FnOnce() -> S,
    F: FnOnce() -> R,
    S: std::fmt::Display,
{
    // Callers only pass on plain data from the engine; state touched by `code` lives behind locks that tolerate poisoning.
    match std::panic::catch_unwind(AssertUnwindSafe(code)) {
        Ok(result) => Ok(result),
        Err(err) => {
            let msg = format_panic_message(extract_panic_message(err));

            if has_error_print_level(1) {
                crate::gd_error!("Rust function panicked.\n  Context: {}\n{}", error_context(), msg);
            }

            Err(msg)
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caught_panic_becomes_message() {
        let prev = set_error_print_level(0);
        let outcome: Result<(), String> = handle_panic(|| "test", || panic!("first\nsecond"));
        set_error_print_level(prev);

        assert_eq!(outcome.unwrap_err(), "[panic]\n  first\n  second");
    }

    #[test]
    fn no_panic_passes_result() {
        assert_eq!(handle_panic(|| "test", || 5), Ok(5));
    }
}
