/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::error::Error;
use std::fmt;

/// Failed conversion of a value coming from the engine.
///
/// Unlike [`CallError`](super::CallError), these are regular runtime conditions (a downcast to the wrong class, a string that is
/// not valid UTF-8) and are returned as values.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ConvertError {
    kind: ConvertErrorKind,
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[non_exhaustive]
pub enum ConvertErrorKind {
    /// Object is not an instance of the requested class.
    FailedCast { from: String, to: String },

    /// Expected an object, got a null handle.
    NullObject { expected: String },

    /// The engine returned bytes that are not valid UTF-8.
    InvalidUtf8,

    /// Integer from the engine does not fit the narrower Rust type.
    IntOutOfRange { value: i64, target: &'static str },

    /// Array or dictionary element of a kind the host cannot represent.
    UnsupportedElement { kind: u32 },
}

impl ConvertError {
    pub(crate) fn failed_cast(from: &str, to: &str) -> Self {
        Self {
            kind: ConvertErrorKind::FailedCast {
                from: from.to_string(),
                to: to.to_string(),
            },
        }
    }

    pub(crate) fn null_object(expected: &str) -> Self {
        Self {
            kind: ConvertErrorKind::NullObject {
                expected: expected.to_string(),
            },
        }
    }

    pub(crate) fn invalid_utf8() -> Self {
        Self {
            kind: ConvertErrorKind::InvalidUtf8,
        }
    }

    pub(crate) fn int_out_of_range(value: i64, target: &'static str) -> Self {
        Self {
            kind: ConvertErrorKind::IntOutOfRange { value, target },
        }
    }

    pub(crate) fn unsupported_element(kind: u32) -> Self {
        Self {
            kind: ConvertErrorKind::UnsupportedElement { kind },
        }
    }

    pub fn kind(&self) -> &ConvertErrorKind {
        &self.kind
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ConvertErrorKind::FailedCast { from, to } => write!(f, "cannot cast object of class {from} to {to}"),
            ConvertErrorKind::NullObject { expected } => write!(f, "expected {expected}, got null object"),
            ConvertErrorKind::InvalidUtf8 => write!(f, "engine string is not valid UTF-8"),
            ConvertErrorKind::IntOutOfRange { value, target } => write!(f, "integer {value} does not fit in {target}"),
            ConvertErrorKind::UnsupportedElement { kind } => write!(f, "unsupported array element kind {kind}"),
        }
    }
}

impl Error for ConvertError {}
