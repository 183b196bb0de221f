/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! C layout of the function table the engine hands to the library on load.

use std::ffi::{c_char, c_void};

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Pointer and scalar aliases

pub type ObjectPtr = *mut c_void;
pub type ConstObjectPtr = *const c_void;
pub type TypePtr = *mut c_void;
pub type ConstTypePtr = *const c_void;
pub type UninitTypePtr = *mut c_void;
pub type StringPtr = *mut c_void;
pub type ConstStringPtr = *const c_void;
pub type UninitStringPtr = *mut c_void;
pub type PackedArrayPtr = *mut c_void;
pub type ConstPackedArrayPtr = *const c_void;
pub type UninitPackedArrayPtr = *mut c_void;
pub type ArrayPtr = *mut c_void;
pub type ConstArrayPtr = *const c_void;
pub type UninitArrayPtr = *mut c_void;
pub type DictionaryPtr = *mut c_void;
pub type ConstDictionaryPtr = *const c_void;
pub type UninitDictionaryPtr = *mut c_void;
pub type MethodBindPtr = *const c_void;
pub type ClassTagPtr = *const c_void;
pub type LibraryPtr = *mut c_void;

/// Token the host hands to the engine when binding an instance to an object; handed back on every virtual call.
pub type ClassInstancePtr = *mut c_void;

pub type NativeBool = u8;
pub type NativeInt = i64;

pub const NATIVE_TRUE: NativeBool = 1;
pub const NATIVE_FALSE: NativeBool = 0;

/// Converts a native boolean to a Rust one. Any non-zero byte counts as `true`.
#[inline]
pub const fn to_bool(b: NativeBool) -> bool {
    b != NATIVE_FALSE
}

#[inline]
pub const fn to_native_bool(b: bool) -> NativeBool {
    if b {
        NATIVE_TRUE
    } else {
        NATIVE_FALSE
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Callbacks from engine into host

pub type ClassCreateInstance = unsafe extern "C" fn(class_userdata: *mut c_void) -> ObjectPtr;

pub type ClassFreeInstance = unsafe extern "C" fn(class_userdata: *mut c_void, instance: ClassInstancePtr);

/// Resolves the virtual method `name` of a class to a token for [`ClassCallVirtual`].
///
/// Asked once per (class, method); the engine caches the result. Null means the class never handles `name`.
pub type ClassGetVirtual = unsafe extern "C" fn(class_userdata: *mut c_void, name: *const c_char) -> *mut c_void;

/// Returns `NATIVE_TRUE` if the host handled the call and wrote `r_ret`, `NATIVE_FALSE` to let the engine run its default.
///
/// `method_token` is a non-null value previously returned by [`ClassGetVirtual`] for the same class.
pub type ClassCallVirtual = unsafe extern "C" fn(
    class_userdata: *mut c_void,
    instance: ClassInstancePtr,
    method_token: *mut c_void,
    args: *const ConstTypePtr,
    r_ret: TypePtr,
) -> NativeBool;

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct ClassCreationInfo {
    pub is_abstract: NativeBool,
    pub create_instance_func: Option<ClassCreateInstance>,
    pub free_instance_func: Option<ClassFreeInstance>,
    pub get_virtual_func: Option<ClassGetVirtual>,
    pub call_virtual_func: Option<ClassCallVirtual>,
    pub class_userdata: *mut c_void,
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct NativeVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub string: *const c_char,
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Function table

/// Functions exported by the engine.
///
/// Every field is optional at the C level; a missing entry is reported by [`interface_fn!`](crate::interface_fn) on first use.
/// String-typed parameters named `class_name`/`method_name`/`name` are NUL-terminated UTF-8.
#[repr(C)]
#[derive(Copy, Clone, Default)]
pub struct NativeInterface {
    pub get_version: Option<unsafe extern "C" fn(r_version: *mut NativeVersion)>,

    pub print_message: Option<unsafe extern "C" fn(message: *const c_char)>,
    pub print_warning: Option<
        unsafe extern "C" fn(description: *const c_char, function: *const c_char, file: *const c_char, line: i32),
    >,
    pub print_error: Option<
        unsafe extern "C" fn(description: *const c_char, function: *const c_char, file: *const c_char, line: i32),
    >,

    pub string_new_with_utf8_chars_and_len:
        Option<unsafe extern "C" fn(r_dest: UninitStringPtr, contents: *const c_char, len: NativeInt)>,
    pub string_new_copy: Option<unsafe extern "C" fn(r_dest: UninitStringPtr, src: ConstStringPtr)>,
    /// Writes at most `max_len` bytes, returns the full UTF-8 length. Pass a null buffer to query the length.
    pub string_to_utf8_chars:
        Option<unsafe extern "C" fn(src: ConstStringPtr, r_text: *mut c_char, max_len: NativeInt) -> NativeInt>,
    pub string_destroy: Option<unsafe extern "C" fn(s: StringPtr)>,

    /// `element_kind` is a [`SlotKind`](crate::SlotKind) discriminant; `data` points to `len` tightly packed elements.
    pub packed_array_new_from: Option<
        unsafe extern "C" fn(r_dest: UninitPackedArrayPtr, element_kind: u32, data: *const c_void, len: NativeInt),
    >,
    pub packed_array_new_copy: Option<unsafe extern "C" fn(r_dest: UninitPackedArrayPtr, src: ConstPackedArrayPtr)>,
    pub packed_array_size: Option<unsafe extern "C" fn(src: ConstPackedArrayPtr) -> NativeInt>,
    pub packed_array_data: Option<unsafe extern "C" fn(src: ConstPackedArrayPtr) -> *const c_void>,
    pub packed_array_destroy: Option<unsafe extern "C" fn(p: PackedArrayPtr)>,

    // Array and dictionary elements are passed as `(kind, pointer)` pairs. The engine copies values passed in, and hands out
    // new values (owned by the host) when reading; `r_value` must have room for `VARIANT_ELEMENT_MAX_SIZE` bytes.
    pub array_new: Option<unsafe extern "C" fn(r_dest: UninitArrayPtr)>,
    pub array_new_copy: Option<unsafe extern "C" fn(r_dest: UninitArrayPtr, src: ConstArrayPtr)>,
    pub array_size: Option<unsafe extern "C" fn(src: ConstArrayPtr) -> NativeInt>,
    pub array_push: Option<unsafe extern "C" fn(array: ArrayPtr, kind: u32, value: ConstTypePtr)>,
    /// Returns `NATIVE_FALSE` if `index` is out of bounds.
    pub array_set:
        Option<unsafe extern "C" fn(array: ArrayPtr, index: NativeInt, kind: u32, value: ConstTypePtr) -> NativeBool>,
    /// Returns `NATIVE_FALSE` if `index` is out of bounds; `r_kind` and `r_value` are then untouched.
    pub array_get: Option<
        unsafe extern "C" fn(src: ConstArrayPtr, index: NativeInt, r_kind: *mut u32, r_value: UninitTypePtr) -> NativeBool,
    >,
    pub array_destroy: Option<unsafe extern "C" fn(p: ArrayPtr)>,

    pub dictionary_new: Option<unsafe extern "C" fn(r_dest: UninitDictionaryPtr)>,
    pub dictionary_new_copy: Option<unsafe extern "C" fn(r_dest: UninitDictionaryPtr, src: ConstDictionaryPtr)>,
    pub dictionary_size: Option<unsafe extern "C" fn(src: ConstDictionaryPtr) -> NativeInt>,
    pub dictionary_set: Option<
        unsafe extern "C" fn(
            dict: DictionaryPtr,
            key_kind: u32,
            key: ConstTypePtr,
            value_kind: u32,
            value: ConstTypePtr,
        ),
    >,
    /// Returns `NATIVE_FALSE` if `key` is absent; `r_kind` and `r_value` are then untouched.
    pub dictionary_get: Option<
        unsafe extern "C" fn(
            src: ConstDictionaryPtr,
            key_kind: u32,
            key: ConstTypePtr,
            r_kind: *mut u32,
            r_value: UninitTypePtr,
        ) -> NativeBool,
    >,
    pub dictionary_erase:
        Option<unsafe extern "C" fn(dict: DictionaryPtr, key_kind: u32, key: ConstTypePtr) -> NativeBool>,
    /// Writes a new array of all keys, in insertion order.
    pub dictionary_keys: Option<unsafe extern "C" fn(src: ConstDictionaryPtr, r_keys: UninitArrayPtr)>,
    pub dictionary_destroy: Option<unsafe extern "C" fn(p: DictionaryPtr)>,

    pub classdb_construct_object: Option<unsafe extern "C" fn(class_name: *const c_char) -> ObjectPtr>,
    pub classdb_get_method_bind: Option<
        unsafe extern "C" fn(class_name: *const c_char, method_name: *const c_char, hash: u32) -> MethodBindPtr,
    >,
    pub classdb_get_class_tag: Option<unsafe extern "C" fn(class_name: *const c_char) -> ClassTagPtr>,
    pub classdb_register_extension_class: Option<
        unsafe extern "C" fn(
            library: LibraryPtr,
            class_name: *const c_char,
            parent_class_name: *const c_char,
            info: *const ClassCreationInfo,
        ),
    >,
    pub classdb_unregister_extension_class:
        Option<unsafe extern "C" fn(library: LibraryPtr, class_name: *const c_char)>,

    pub object_method_bind_ptrcall: Option<
        unsafe extern "C" fn(method_bind: MethodBindPtr, object: ObjectPtr, args: *const ConstTypePtr, r_ret: TypePtr),
    >,
    pub object_destroy: Option<unsafe extern "C" fn(object: ObjectPtr)>,
    pub object_get_instance_id: Option<unsafe extern "C" fn(object: ConstObjectPtr) -> u64>,
    pub object_get_instance_from_id: Option<unsafe extern "C" fn(instance_id: u64) -> ObjectPtr>,
    pub object_cast_to: Option<unsafe extern "C" fn(object: ConstObjectPtr, class_tag: ClassTagPtr) -> ObjectPtr>,
    pub object_set_instance:
        Option<unsafe extern "C" fn(object: ObjectPtr, class_name: *const c_char, instance: ClassInstancePtr)>,
    pub object_is_ref_counted: Option<unsafe extern "C" fn(object: ConstObjectPtr) -> NativeBool>,
    pub object_reference: Option<unsafe extern "C" fn(object: ObjectPtr)>,
    /// Returns `NATIVE_TRUE` if the count dropped to zero; the caller must then destroy the object.
    pub object_unreference: Option<unsafe extern "C" fn(object: ObjectPtr) -> NativeBool>,

    pub global_get_singleton: Option<unsafe extern "C" fn(name: *const c_char) -> ObjectPtr>,
}
