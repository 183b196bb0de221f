/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::ptr;

use crate::builtin::string::StringToken;
use crate::builtin::{Color, GString, Vector2, Vector2i, Vector3, Vector3i};
use crate::meta::error::ConvertError;
use crate::sys;
use sys::SlotKind;

/// Receives one array or dictionary element written by the engine.
#[repr(C, align(8))]
pub(crate) struct ElementBuffer {
    bytes: [u8; sys::VARIANT_ELEMENT_MAX_SIZE],
}

impl ElementBuffer {
    pub fn new() -> Self {
        Self {
            bytes: [0; sys::VARIANT_ELEMENT_MAX_SIZE],
        }
    }

    pub fn as_mut_ptr(&mut self) -> sys::UninitTypePtr {
        self.bytes.as_mut_ptr().cast()
    }

    /// # Safety
    /// The buffer must hold a value of type `T`, as written by the engine.
    unsafe fn read<T: Copy>(&self) -> T {
        unsafe { self.bytes.as_ptr().cast::<T>().read_unaligned() }
    }
}

/// Dynamically typed value, as stored in an [`Array`][crate::builtin::Array] or a [`Dictionary`][crate::builtin::Dictionary].
///
/// Covers the value kinds the binding can marshal as elements. A `String` variant owns its native string.
#[derive(Clone, PartialEq, Debug, Default)]
pub enum Variant {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(GString),
    Vector2(Vector2),
    Vector2i(Vector2i),
    Vector3(Vector3),
    Vector3i(Vector3i),
    Color(Color),
}

impl Variant {
    pub fn nil() -> Self {
        Self::Nil
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Slot kind of the contained value.
    pub fn kind(&self) -> SlotKind {
        match self {
            Self::Nil => SlotKind::Nil,
            Self::Bool(_) => SlotKind::Bool,
            Self::Int(_) => SlotKind::Int,
            Self::Float(_) => SlotKind::Float,
            Self::String(_) => SlotKind::String,
            Self::Vector2(_) => SlotKind::Vector2,
            Self::Vector2i(_) => SlotKind::Vector2i,
            Self::Vector3(_) => SlotKind::Vector3,
            Self::Vector3i(_) => SlotKind::Vector3i,
            Self::Color(_) => SlotKind::Color,
        }
    }

    /// Runs `f` with the element kind and a pointer to the native representation, which is valid during the call only.
    pub(crate) fn with_element<R>(&self, f: impl FnOnce(u32, sys::ConstTypePtr) -> R) -> R {
        let kind = self.kind().ord();
        match self {
            Self::Nil => f(kind, ptr::null()),
            Self::Bool(value) => {
                let native = sys::to_native_bool(*value);
                f(kind, ptr::from_ref(&native).cast())
            }
            Self::Int(value) => f(kind, ptr::from_ref(value).cast()),
            Self::Float(value) => f(kind, ptr::from_ref(value).cast()),
            Self::String(value) => {
                let token = value.token();
                f(kind, token.as_ptr())
            }
            Self::Vector2(value) => f(kind, ptr::from_ref(value).cast()),
            Self::Vector2i(value) => f(kind, ptr::from_ref(value).cast()),
            Self::Vector3(value) => f(kind, ptr::from_ref(value).cast()),
            Self::Vector3i(value) => f(kind, ptr::from_ref(value).cast()),
            Self::Color(value) => f(kind, ptr::from_ref(value).cast()),
        }
    }

    /// Takes over an element the engine wrote into `buffer`.
    ///
    /// # Safety
    /// `buffer` must hold a value of kind `kind` that the engine handed to the host.
    ///
    /// # Panics
    /// If `kind` is not an element kind the host can represent.
    #[track_caller]
    pub(crate) unsafe fn from_element(kind: u32, buffer: &ElementBuffer) -> Self {
        let Some(slot) = SlotKind::try_from_ord(kind).filter(|slot| slot.is_variant_element()) else {
            panic!("{}", ConvertError::unsupported_element(kind));
        };

        unsafe {
            match slot {
                SlotKind::Bool => Self::Bool(sys::to_bool(buffer.read())),
                SlotKind::Int => Self::Int(buffer.read()),
                SlotKind::Float => Self::Float(buffer.read()),
                SlotKind::String => Self::String(GString::from_owned_token(buffer.read::<StringToken>())),
                SlotKind::Vector2 => Self::Vector2(buffer.read()),
                SlotKind::Vector2i => Self::Vector2i(buffer.read()),
                SlotKind::Vector3 => Self::Vector3(buffer.read()),
                SlotKind::Vector3i => Self::Vector3i(buffer.read()),
                SlotKind::Color => Self::Color(buffer.read()),
                _ => Self::Nil,
            }
        }
    }
}

macro_rules! impl_variant_accessors {
    ($($Variant:ident($T:ty) => $as_fn:ident),* $(,)?) => {
        impl Variant {
            $(
                #[doc = concat!("The contained value, if this is a `", stringify!($Variant), "`.")]
                pub fn $as_fn(&self) -> Option<$T> {
                    match self {
                        Self::$Variant(value) => Some(*value),
                        _ => None,
                    }
                }
            )*
        }

        $(
            impl From<$T> for Variant {
                fn from(value: $T) -> Self {
                    Self::$Variant(value)
                }
            }
        )*
    };
}

impl_variant_accessors!(
    Bool(bool) => as_bool,
    Int(i64) => as_int,
    Float(f64) => as_float,
    Vector2(Vector2) => as_vector2,
    Vector2i(Vector2i) => as_vector2i,
    Vector3(Vector3) => as_vector3,
    Vector3i(Vector3i) => as_vector3i,
    Color(Color) => as_color,
);

impl Variant {
    pub fn as_string(&self) -> Option<&GString> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }
}

impl From<i32> for Variant {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<GString> for Variant {
    fn from(value: GString) -> Self {
        Self::String(value)
    }
}

impl From<&GString> for Variant {
    fn from(value: &GString) -> Self {
        Self::String(value.clone())
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Self::String(GString::from(value))
    }
}

impl From<&Variant> for Variant {
    fn from(value: &Variant) -> Self {
        value.clone()
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("<null>"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value}"),
            Self::Vector2(value) => write!(f, "{value}"),
            Self::Vector2i(value) => write!(f, "{value}"),
            Self::Vector3(value) => write!(f, "{value}"),
            Self::Vector3i(value) => write!(f, "{value}"),
            Self::Color(value) => write!(f, "{value}"),
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_elements_decode() {
        let mut buffer = ElementBuffer::new();
        unsafe { buffer.as_mut_ptr().cast::<i64>().write(-42) };
        assert_eq!(unsafe { Variant::from_element(SlotKind::Int.ord(), &buffer) }, Variant::Int(-42));

        let mut buffer = ElementBuffer::new();
        unsafe { buffer.as_mut_ptr().cast::<Vector3i>().write(Vector3i::new(1, 2, 3)) };
        let value = unsafe { Variant::from_element(SlotKind::Vector3i.ord(), &buffer) };
        assert_eq!(value.as_vector3i(), Some(Vector3i::new(1, 2, 3)));
        assert_eq!(value.as_int(), None);
    }

    #[test]
    fn element_pointer_points_at_value() {
        let value = Variant::from(2.5);
        let read = value.with_element(|kind, ptr| {
            assert_eq!(kind, SlotKind::Float.ord());
            unsafe { ptr.cast::<f64>().read() }
        });
        assert_eq!(read, 2.5);

        assert!(Variant::nil().with_element(|_, ptr| ptr.is_null()));
    }

    #[test]
    #[should_panic(expected = "unsupported array element kind")]
    fn object_elements_are_rejected() {
        let buffer = ElementBuffer::new();
        let _ = unsafe { Variant::from_element(SlotKind::Object.ord(), &buffer) };
    }
}
