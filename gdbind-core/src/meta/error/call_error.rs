/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::error::Error;
use std::fmt;

/// Category of a failed native call.
///
/// All of them indicate a programming error (mismatched generated code, use-after-free upstream) rather than bad input, and are
/// raised as panics on the call path. Only the startup bind check hands them out as values, see [`BindCheckError`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CallErrorKind {
    /// The engine has no method bind for a `(class, method, hash)` triple: bindings and engine version disagree.
    BindNotFound,

    /// Call through a null, freed or otherwise invalid object handle.
    InvalidReceiver,

    /// Double release, release of a borrowed handle, or two owners of an exclusively owned object.
    OwnershipViolation,

    /// Encoded arguments do not match the signature the method bind expects.
    ArgumentFrameMismatch,
}

impl CallErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::BindNotFound => "bind not found",
            Self::InvalidReceiver => "invalid receiver",
            Self::OwnershipViolation => "ownership violation",
            Self::ArgumentFrameMismatch => "argument frame mismatch",
        }
    }
}

impl fmt::Display for CallErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error describing a failed native call.
///
/// Carries the class and method of the call site where available. Implements `std::error::Error`.
pub struct CallError {
    // Boxed to keep Result<_, CallError> small.
    b: Box<InnerCallError>,
}

#[derive(Debug)]
struct InnerCallError {
    kind: CallErrorKind,
    class_name: String,
    method_name: String,
    reason: String,
}

impl CallError {
    fn new(kind: CallErrorKind, class_name: &str, method_name: &str, reason: impl Into<String>) -> Self {
        Self {
            b: Box::new(InnerCallError {
                kind,
                class_name: class_name.to_string(),
                method_name: method_name.to_string(),
                reason: reason.into(),
            }),
        }
    }

    pub(crate) fn bind_not_found(class_name: &str, method_name: &str, hash: u32) -> Self {
        Self::new(
            CallErrorKind::BindNotFound,
            class_name,
            method_name,
            format!("engine has no method bind with signature hash {hash:#010x}"),
        )
    }

    pub(crate) fn invalid_receiver(class_name: &str, method_name: &str, reason: impl Into<String>) -> Self {
        Self::new(CallErrorKind::InvalidReceiver, class_name, method_name, reason)
    }

    pub(crate) fn ownership_violation(reason: impl Into<String>) -> Self {
        Self::new(CallErrorKind::OwnershipViolation, "", "", reason)
    }

    pub(crate) fn frame_mismatch(class_name: &str, method_name: &str, reason: impl Into<String>) -> Self {
        Self::new(CallErrorKind::ArgumentFrameMismatch, class_name, method_name, reason)
    }

    pub fn kind(&self) -> CallErrorKind {
        self.b.kind
    }

    /// Name of the class whose method failed, or `None` if the error is not tied to a call site.
    pub fn class_name(&self) -> Option<&str> {
        if self.b.class_name.is_empty() {
            None
        } else {
            Some(&self.b.class_name)
        }
    }

    /// Name of the method that failed; empty if the error is not tied to a call site.
    pub fn method_name(&self) -> &str {
        &self.b.method_name
    }

    pub fn reason(&self) -> &str {
        &self.b.reason
    }

    /// Aborts the current operation with this error.
    #[cold]
    #[track_caller]
    pub(crate) fn fail(self) -> ! {
        panic!("{self}")
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.b.kind)?;
        match self.class_name() {
            Some(class) => write!(f, " in {class}::{}", self.b.method_name)?,
            None if !self.b.method_name.is_empty() => write!(f, " in {}", self.b.method_name)?,
            None => {}
        }
        write!(f, ": {}", self.b.reason)
    }
}

impl fmt::Debug for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallError({self})")
    }
}

impl Error for CallError {}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Result of the startup bind verification: every method bind the engine failed to provide.
///
/// Unlike the panicking call path, this is a recoverable error, so that a host program can report an incompatible engine version
/// before any game code runs.
#[derive(Debug)]
pub struct BindCheckError {
    missing: Vec<CallError>,
}

impl BindCheckError {
    pub(crate) fn new(missing: Vec<CallError>) -> Self {
        Self { missing }
    }

    pub fn missing(&self) -> &[CallError] {
        &self.missing
    }
}

impl fmt::Display for BindCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bindings are incompatible with the loaded engine; {} method bind(s) missing",
            self.missing.len()
        )?;
        for err in self.missing.iter() {
            write!(f, "\n  - {err}")?;
        }
        Ok(())
    }
}

impl Error for BindCheckError {}

// ----------------------------------------------------------------------------------------------------------------------------------------------
