/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::meta::{ClassName, Receiver};
use crate::obj::Base;
use crate::registry::ClassBuilder;

/// Makes `T` eligible to be managed by the engine and stored in [`Gd<T>`][crate::obj::Gd] pointers.
///
/// Engine classes get this from `engine_class!`, user classes from [`user_class!`](crate::user_class).
pub trait GdClass: 'static
where
    Self: Sized,
{
    /// The immediate superclass of `T`.
    type Base: GdClass;

    /// Whether instances are reference-counted (i.e. inherit `RefCounted`).
    const IS_REF_COUNTED: bool;

    /// Name under which the class is known to the engine.
    fn class_name() -> ClassName;

    /// The closest engine class in the hierarchy; `Self` for engine classes.
    fn native_class_name() -> ClassName {
        <Self::Base as GdClass>::native_class_name()
    }

    /// Returns whether `Self` inherits from `Base`. Reflexive.
    fn inherits<Base: GdClass>() -> bool {
        if Self::class_name() == Base::class_name() {
            true
        } else if Self::Base::class_name().is_none() {
            false
        } else {
            Self::Base::inherits::<Base>()
        }
    }
}

/// Type representing the absence of a base class, at the root of the hierarchy.
///
/// Used as the base class of exactly one class: [`Object`][crate::classes::Object]. Has no values.
pub enum NoBase {}

impl GdClass for NoBase {
    type Base = NoBase;
    const IS_REF_COUNTED: bool = false;

    fn class_name() -> ClassName {
        ClassName::none()
    }

    fn native_class_name() -> ClassName {
        ClassName::none()
    }
}

/// Non-strict inheritance relationship in the class hierarchy.
///
/// `Derived: Inherits<Base>` means that either `Derived` is a subclass of `Base`, or the class `Base` itself. Transitive across
/// indirect base classes: `Node2D` implements `Inherits<Node>` and `Inherits<Object>`.
///
/// # Safety
/// Must only be implemented for subclasses of `Base`, so that upcasting `Gd<Self>` to `Gd<Base>` is always sound.
pub unsafe trait Inherits<Base: GdClass>: GdClass {}

unsafe impl<T: GdClass> Inherits<T> for T {}

/// Marker for classes provided by the engine.
pub trait EngineClass: GdClass {}

/// Classes defined in Rust, whose instances are bound to an engine object of their native base class.
pub trait UserClass: GdClass {
    /// Creates the Rust part of a new instance. The engine part (`base`) already exists.
    fn init(base: Base<Self::Base>) -> Self;

    /// Declares virtual overrides and other class-level behavior.
    fn register(builder: &mut ClassBuilder<Self>) {
        let _ = builder;
    }
}

/// Anything that can act as receiver of an engine method call.
///
/// Implemented by [`Gd<T>`][crate::obj::Gd]; the per-class `*Api` traits are blanket-implemented on top of it.
pub trait HasHandle {
    #[doc(hidden)]
    fn receiver(&self) -> Receiver;
}

/// Implements [`GdClass`] and [`Inherits`] for a user class.
///
/// The first class after the colon is the direct base, the rest are its ancestors up to `Object`:
/// ```ignore
/// user_class!(Player: Node2D, CanvasItem, Node, Object);
/// ```
#[macro_export]
macro_rules! user_class {
    ($Class:ident : $Base:ty $(, $Ancestor:ty)* $(,)?) => {
        impl $crate::obj::GdClass for $Class {
            type Base = $Base;
            const IS_REF_COUNTED: bool = <$Base as $crate::obj::GdClass>::IS_REF_COUNTED;

            fn class_name() -> $crate::meta::ClassName {
                static NAME: std::sync::OnceLock<$crate::meta::ClassName> = std::sync::OnceLock::new();
                *NAME.get_or_init(|| $crate::meta::ClassName::new(stringify!($Class)))
            }
        }

        unsafe impl $crate::obj::Inherits<$Base> for $Class {}
        $( unsafe impl $crate::obj::Inherits<$Ancestor> for $Class {} )*
    };
}
