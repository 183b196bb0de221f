/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Generator for engine class wrappers.
//!
//! Each class declaration yields:
//! - a marker type implementing `GdClass`, `EngineClass` and `Inherits` for every ancestor,
//! - an `*Api` trait with one method per engine method, implemented for `Gd<T>` whenever `T` inherits the class,
//! - a `ClassPlugin` with the class's method binds and declared virtuals, registered at load time.
//!
//! Method wrappers compute their signature hash and frame size at compile time, and keep their call site in a `static`.

#[doc(hidden)]
#[macro_export]
macro_rules! gdbind_count_idents {
    () => {
        0
    };
    ($name:ident $(, $other:ident)*) => {
        1 + $crate::gdbind_count_idents!($($other),*)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! gdbind_or_unit {
    () => {
        ()
    };
    ($Ret:ty) => {
        $Ret
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! gdbind_return_ownership {
    () => {
        $crate::private::ReturnOwnership::Default
    };
    (owned) => {
        $crate::private::ReturnOwnership::Owned
    };
    (borrowed) => {
        $crate::private::ReturnOwnership::Borrowed
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! gdbind_parent_name {
    (NoBase) => {
        None
    };
    ($Base:ident) => {
        Some(stringify!($Base))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! gdbind_inherits {
    ($Class:ident : NoBase) => {};
    ($Class:ident : $($Ancestor:ident),+) => {
        $( unsafe impl $crate::obj::Inherits<$Ancestor> for $Class {} )+
    };
}

/// Signature hash of an engine method: argument kinds as passed, return kind as decoded.
#[doc(hidden)]
#[macro_export]
macro_rules! gdbind_method_hash {
    ([$($Ret:ty)?]; $($Arg:ty),*) => {
        $crate::private::signature_hash(
            <$crate::gdbind_or_unit!($($Ret)?) as $crate::private::FrameValue>::KIND,
            &[$(<$Arg as $crate::private::FrameArg>::KIND),*],
        )
    };
}

/// Signature hash of a virtual method: all kinds as decoded.
#[doc(hidden)]
#[macro_export]
macro_rules! gdbind_virtual_hash {
    ([$($Ret:ty)?]; $($Arg:ty),*) => {
        $crate::private::signature_hash(
            <$crate::gdbind_or_unit!($($Ret)?) as $crate::private::FrameValue>::KIND,
            &[$(<$Arg as $crate::private::FrameValue>::KIND),*],
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! gdbind_ptrcall {
    (
        $Class:ident :: $method:ident;
        $receiver:ident;
        ($($arg:ident : $Arg:ty),*);
        [$($Ret:ty)?];
        [$($own:ident)?]
    ) => {{
        type Ret = $crate::gdbind_or_unit!($($Ret)?);

        const HASH: u32 = $crate::gdbind_method_hash!([$($Ret)?]; $($Arg),*);
        const WORDS: usize = 0 $(+ $crate::private::frame_words::<<$Arg as $crate::private::FrameArg>::Ffi>())*;
        const ARGS: usize = $crate::gdbind_count_idents!($($arg),*);

        static SITE: $crate::private::MethodSite =
            $crate::private::MethodSite::new(stringify!($Class), stringify!($method), HASH);

        #[allow(unused_mut)]
        let mut frame = $crate::private::CallFrame::<WORDS, ARGS>::new(&SITE);
        $( frame.push($arg); )*

        frame.call::<Ret>(
            $crate::obj::HasHandle::receiver(&*$receiver),
            $crate::gdbind_return_ownership!($($own)?),
        )
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! gdbind_engine_method {
    // Trait method taking `&mut self`. Must come before `&self`.
    (
        @api $Class:ident;
        $(#[$meta:meta])*
        fn $method:ident (&mut $receiver:ident $(, $arg:ident : $Arg:ty)* $(,)?) [$($Ret:ty)?] [$($own:ident)?]
    ) => {
        $(#[$meta])*
        fn $method(&mut $receiver $(, $arg: $Arg)*) -> $crate::gdbind_or_unit!($($Ret)?) {
            $crate::gdbind_ptrcall!($Class::$method; $receiver; ($($arg: $Arg),*); [$($Ret)?]; [$($own)?])
        }
    };

    (
        @api $Class:ident;
        $(#[$meta:meta])*
        fn $method:ident (& $receiver:ident $(, $arg:ident : $Arg:ty)* $(,)?) [$($Ret:ty)?] [$($own:ident)?]
    ) => {
        $(#[$meta])*
        fn $method(&$receiver $(, $arg: $Arg)*) -> $crate::gdbind_or_unit!($($Ret)?) {
            $crate::gdbind_ptrcall!($Class::$method; $receiver; ($($arg: $Arg),*); [$($Ret)?]; [$($own)?])
        }
    };

    (
        @key $Class:ident; $keys:ident;
        fn $method:ident (&mut $receiver:ident $(, $arg:ident : $Arg:ty)* $(,)?) [$($Ret:ty)?]
    ) => {
        $keys.push($crate::private::BindKey::new(
            stringify!($Class),
            stringify!($method),
            $crate::gdbind_method_hash!([$($Ret)?]; $($Arg),*),
        ));
    };

    (
        @key $Class:ident; $keys:ident;
        fn $method:ident (& $receiver:ident $(, $arg:ident : $Arg:ty)* $(,)?) [$($Ret:ty)?]
    ) => {
        $keys.push($crate::private::BindKey::new(
            stringify!($Class),
            stringify!($method),
            $crate::gdbind_method_hash!([$($Ret)?]; $($Arg),*),
        ));
    };
}

/// Declares an engine class wrapper.
///
/// ```ignore
/// engine_class! {
///     /// Docs of the class.
///     class Node2D: CanvasItem, Node, Object;
///     ref_counted = false;
///     api Node2DApi;
///
///     virtuals {}
///
///     methods {
///         fn set_position(&mut self, position: Vector2);
///         fn get_position(&self) -> Vector2;
///         fn get_parent(&self) -> Option<Gd<Node>> [borrowed];
///     }
/// }
/// ```
///
/// The first class after the colon is the direct base, followed by all further ancestors (or `NoBase` for the root class).
/// A trailing `[owned]` or `[borrowed]` overrides the ownership contract of a returned object.
#[doc(hidden)]
#[macro_export]
macro_rules! engine_class {
    (
        $(#[$attr:meta])*
        class $Class:ident : $Base:ident $(, $Ancestor:ident)*;
        ref_counted = $ref_counted:literal;
        api $Api:ident;

        virtuals {
            $( fn $vmethod:ident ($($VArg:ty),*) $(-> $VRet:ty)?; )*
        }

        methods {
            $(
                $(#[$meta:meta])*
                fn $method:ident ($($params:tt)*) $(-> $Ret:ty)? $([$own:ident])?;
            )*
        }
    ) => {
        $(#[$attr])*
        pub struct $Class {
            _cannot_construct: (),
        }

        impl $crate::obj::GdClass for $Class {
            type Base = $Base;
            const IS_REF_COUNTED: bool = $ref_counted;

            fn class_name() -> $crate::meta::ClassName {
                static NAME: std::sync::OnceLock<$crate::meta::ClassName> = std::sync::OnceLock::new();
                *NAME.get_or_init(|| $crate::meta::ClassName::new(stringify!($Class)))
            }

            fn native_class_name() -> $crate::meta::ClassName {
                <Self as $crate::obj::GdClass>::class_name()
            }
        }

        impl $crate::obj::EngineClass for $Class {}

        $crate::gdbind_inherits!($Class: $Base $(, $Ancestor)*);

        #[doc = concat!("Methods of [`", stringify!($Class), "`], available on `Gd<T>` for every `T` inheriting it.")]
        pub trait $Api: $crate::obj::HasHandle {
            $(
                $crate::gdbind_engine_method!(
                    @api $Class;
                    $(#[$meta])*
                    fn $method ($($params)*) [$($Ret)?] [$($own)?]
                );
            )*
        }

        impl<T> $Api for $crate::obj::Gd<T> where T: $crate::obj::Inherits<$Class> {}

        const _: () = {
            const VIRTUALS: &[(&str, u32)] = &[
                $( (stringify!($vmethod), $crate::gdbind_virtual_hash!([$($VRet)?]; $($VArg),*)), )*
            ];

            #[allow(unused_variables)]
            fn bind_keys(keys: &mut Vec<$crate::private::BindKey>) {
                $(
                    $crate::gdbind_engine_method!(@key $Class; keys; fn $method ($($params)*) [$($Ret)?]);
                )*
            }

            $crate::sys::plugin_add!(ENGINE_CLASSES in $crate::private; $crate::private::ClassPlugin {
                class_name: stringify!($Class),
                parent: $crate::gdbind_parent_name!($Base),
                is_ref_counted: $ref_counted,
                bind_keys,
                virtuals: VIRTUALS,
            });
        };
    };
}
