/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Printing and logging through the engine's output.
//!
//! Before the native binding is initialized (e.g. in unit tests that never load an engine), messages fall back to stderr.

use std::ffi::CString;

use crate::sys;

/// Pushes a message to the engine's standard output.
#[macro_export]
macro_rules! gd_print {
    ($fmt:literal $(, $args:expr)* $(,)?) => {
        $crate::log::print_message(&format!($fmt $(, $args)*))
    };
}

/// Pushes a warning to the engine's warning output, tagged with the Rust source location.
#[macro_export]
macro_rules! gd_warn {
    ($fmt:literal $(, $args:expr)* $(,)?) => {
        $crate::log::print_diagnostic(
            $crate::log::Severity::Warning,
            &format!($fmt $(, $args)*),
            module_path!(),
            file!(),
            line!(),
        )
    };
}

/// Pushes an error to the engine's error output, tagged with the Rust source location.
#[macro_export]
macro_rules! gd_error {
    ($fmt:literal $(, $args:expr)* $(,)?) => {
        $crate::log::print_diagnostic(
            $crate::log::Severity::Error,
            &format!($fmt $(, $args)*),
            module_path!(),
            file!(),
            line!(),
        )
    };
}

pub use crate::{gd_error, gd_print, gd_warn};

#[doc(hidden)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Severity {
    Warning,
    Error,
}

#[doc(hidden)]
pub fn print_message(message: &str) {
    match sys::try_get_interface().and_then(|i| i.print_message) {
        Some(print) => {
            let message = sys::to_c_string(message);
            unsafe { print(message.as_ptr()) };
        }
        None => eprintln!("{message}"),
    }
}

#[doc(hidden)]
pub fn print_diagnostic(severity: Severity, description: &str, function: &str, file: &str, line: u32) {
    let sink = sys::try_get_interface().and_then(|i| match severity {
        Severity::Warning => i.print_warning,
        Severity::Error => i.print_error,
    });

    let Some(print) = sink else {
        let tag = match severity {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        eprintln!("{tag}: {description}\n   at {function} ({file}:{line})");
        return;
    };

    let description: CString = sys::to_c_string(description);
    let function = sys::to_c_string(function);
    let file = sys::to_c_string(file);
    let line = i32::try_from(line).unwrap_or(i32::MAX);

    unsafe { print(description.as_ptr(), function.as_ptr(), file.as_ptr(), line) };
}
