/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The function table handed to the host, and the functions behind it.
//!
//! No function here holds the state lock while calling back into the host: user code may re-enter the engine.

use std::collections::HashMap;
use std::ffi::{c_char, c_void};

use gdbind_ffi as sys;
use sys::SlotKind;

use crate::classes;
use crate::methods::{self, PtrCall};
use crate::state::{object_id, object_ptr, read_token, state, BoundInstance, ExtensionClass, LogLevel, PackedData, Prop, Violation};

pub(crate) static INTERFACE: sys::NativeInterface = sys::NativeInterface {
    get_version: Some(get_version),

    print_message: Some(print_message),
    print_warning: Some(print_warning),
    print_error: Some(print_error),

    string_new_with_utf8_chars_and_len: Some(string_new_with_utf8_chars_and_len),
    string_new_copy: Some(string_new_copy),
    string_to_utf8_chars: Some(string_to_utf8_chars),
    string_destroy: Some(string_destroy),

    packed_array_new_from: Some(packed_array_new_from),
    packed_array_new_copy: Some(packed_array_new_copy),
    packed_array_size: Some(packed_array_size),
    packed_array_data: Some(packed_array_data),
    packed_array_destroy: Some(packed_array_destroy),

    array_new: Some(array_new),
    array_new_copy: Some(array_new_copy),
    array_size: Some(array_size),
    array_push: Some(array_push),
    array_set: Some(array_set),
    array_get: Some(array_get),
    array_destroy: Some(array_destroy),

    dictionary_new: Some(dictionary_new),
    dictionary_new_copy: Some(dictionary_new_copy),
    dictionary_size: Some(dictionary_size),
    dictionary_set: Some(dictionary_set),
    dictionary_get: Some(dictionary_get),
    dictionary_erase: Some(dictionary_erase),
    dictionary_keys: Some(dictionary_keys),
    dictionary_destroy: Some(dictionary_destroy),

    classdb_construct_object: Some(classdb_construct_object),
    classdb_get_method_bind: Some(classdb_get_method_bind),
    classdb_get_class_tag: Some(classdb_get_class_tag),
    classdb_register_extension_class: Some(classdb_register_extension_class),
    classdb_unregister_extension_class: Some(classdb_unregister_extension_class),

    object_method_bind_ptrcall: Some(object_method_bind_ptrcall),
    object_destroy: Some(object_destroy),
    object_get_instance_id: Some(object_get_instance_id),
    object_get_instance_from_id: Some(object_get_instance_from_id),
    object_cast_to: Some(object_cast_to),
    object_set_instance: Some(object_set_instance),
    object_is_ref_counted: Some(object_is_ref_counted),
    object_reference: Some(object_reference),
    object_unreference: Some(object_unreference),

    global_get_singleton: Some(global_get_singleton),
};

pub(crate) const VERSION: (u32, u32, u32) = (4, 3, 0);

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Version and output

unsafe extern "C" fn get_version(r_version: *mut sys::NativeVersion) {
    let (major, minor, patch) = VERSION;
    let version = sys::NativeVersion {
        major,
        minor,
        patch,
        string: sys::c_str(b"mock engine 4.3.0\0"),
    };
    unsafe { r_version.write(version) };
}

fn log_c_str(level: LogLevel, message: *const c_char) {
    let message = unsafe { sys::read_c_str(message) }.unwrap_or("<invalid UTF-8>");
    state().log(level, message);
}

unsafe extern "C" fn print_message(message: *const c_char) {
    log_c_str(LogLevel::Message, message);
}

unsafe extern "C" fn print_warning(description: *const c_char, _function: *const c_char, _file: *const c_char, _line: i32) {
    log_c_str(LogLevel::Warning, description);
}

unsafe extern "C" fn print_error(description: *const c_char, _function: *const c_char, _file: *const c_char, _line: i32) {
    log_c_str(LogLevel::Error, description);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Strings

unsafe extern "C" fn string_new_with_utf8_chars_and_len(r_dest: sys::UninitStringPtr, contents: *const c_char, len: sys::NativeInt) {
    let content = match usize::try_from(len) {
        Ok(len) if !contents.is_null() && len > 0 => {
            let bytes = unsafe { std::slice::from_raw_parts(contents.cast::<u8>(), len) };
            String::from_utf8_lossy(bytes).into_owned()
        }
        _ => String::new(),
    };

    let token = state().create_string(content);
    unsafe { r_dest.cast::<u64>().write_unaligned(token) };
}

unsafe extern "C" fn string_new_copy(r_dest: sys::UninitStringPtr, src: sys::ConstStringPtr) {
    let mut st = state();
    let content = st.string_content(unsafe { read_token(src) });
    let token = st.create_string(content);
    unsafe { r_dest.cast::<u64>().write_unaligned(token) };
}

unsafe extern "C" fn string_to_utf8_chars(src: sys::ConstStringPtr, r_text: *mut c_char, max_len: sys::NativeInt) -> sys::NativeInt {
    let content = state().string_content(unsafe { read_token(src) });

    if !r_text.is_null() {
        let max_len = usize::try_from(max_len).unwrap_or(0);
        let written = content.len().min(max_len);
        unsafe { std::ptr::copy_nonoverlapping(content.as_ptr(), r_text.cast::<u8>(), written) };
    }

    sys::NativeInt::try_from(content.len()).unwrap_or(sys::NativeInt::MAX)
}

unsafe extern "C" fn string_destroy(s: sys::StringPtr) {
    let token = unsafe { read_token(s) };
    let mut st = state();
    if st.strings.remove(&token).is_none() {
        st.violations.push(Violation::StringFreedTwice { token });
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Packed arrays

unsafe fn write_packed_token(r_dest: sys::UninitPackedArrayPtr, token: u64, kind: SlotKind) {
    unsafe { r_dest.cast::<[u64; 2]>().write_unaligned([token, kind.ord() as u64]) };
}

unsafe extern "C" fn packed_array_new_from(
    r_dest: sys::UninitPackedArrayPtr,
    element_kind: u32,
    data: *const c_void,
    len: sys::NativeInt,
) {
    let mut st = state();
    let kind = match SlotKind::try_from_ord(element_kind) {
        Some(kind) if kind != SlotKind::Nil => kind,
        _ => {
            st.log(LogLevel::Error, format!("packed_array_new_from: invalid element kind {element_kind}"));
            SlotKind::Byte
        }
    };

    let len = usize::try_from(len).unwrap_or(0);
    let bytes = if data.is_null() || len == 0 {
        &[][..]
    } else {
        unsafe { std::slice::from_raw_parts(data.cast::<u8>(), len * kind.byte_size()) }
    };
    let len = if bytes.is_empty() { 0 } else { len };

    let token = st.create_packed_array(PackedData::from_bytes(kind, len, bytes));
    unsafe { write_packed_token(r_dest, token, kind) };
}

unsafe extern "C" fn packed_array_new_copy(r_dest: sys::UninitPackedArrayPtr, src: sys::ConstPackedArrayPtr) {
    let mut st = state();
    let data = st.packed_data(unsafe { read_token(src) }).cloned();
    let data = data.unwrap_or_else(|| PackedData::from_bytes(SlotKind::Byte, 0, &[]));

    let kind = data.kind;
    let token = st.create_packed_array(data);
    unsafe { write_packed_token(r_dest, token, kind) };
}

unsafe extern "C" fn packed_array_size(src: sys::ConstPackedArrayPtr) -> sys::NativeInt {
    let mut st = state();
    let len = st.packed_data(unsafe { read_token(src) }).map_or(0, |data| data.len);
    sys::NativeInt::try_from(len).unwrap_or(0)
}

unsafe extern "C" fn packed_array_data(src: sys::ConstPackedArrayPtr) -> *const c_void {
    // The buffer is never mutated in place, so the pointer stays valid until the array is destroyed.
    let mut st = state();
    match st.packed_data(unsafe { read_token(src) }) {
        Some(data) => data.data_ptr(),
        None => std::ptr::null(),
    }
}

unsafe extern "C" fn packed_array_destroy(p: sys::PackedArrayPtr) {
    let token = unsafe { read_token(p) };
    let mut st = state();
    if st.packed_arrays.remove(&token).is_none() {
        st.violations.push(Violation::PackedArrayFreedTwice { token });
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Arrays and dictionaries

unsafe fn write_token(r_dest: *mut c_void, token: u64) {
    unsafe { r_dest.cast::<u64>().write_unaligned(token) };
}

fn native_len(len: usize) -> sys::NativeInt {
    sys::NativeInt::try_from(len).unwrap_or(0)
}

unsafe extern "C" fn array_new(r_dest: sys::UninitArrayPtr) {
    let token = state().create_array(Vec::new());
    unsafe { write_token(r_dest, token) };
}

unsafe extern "C" fn array_new_copy(r_dest: sys::UninitArrayPtr, src: sys::ConstArrayPtr) {
    let mut st = state();
    let elements = st.array(unsafe { read_token(src) }).cloned().unwrap_or_default();
    let token = st.create_array(elements);
    unsafe { write_token(r_dest, token) };
}

unsafe extern "C" fn array_size(src: sys::ConstArrayPtr) -> sys::NativeInt {
    let mut st = state();
    native_len(st.array(unsafe { read_token(src) }).map_or(0, |elements| elements.len()))
}

unsafe extern "C" fn array_push(array: sys::ArrayPtr, kind: u32, value: sys::ConstTypePtr) {
    let mut st = state();
    let element = unsafe { st.read_element(kind, value) };
    if let Some(elements) = st.array(unsafe { read_token(array) }) {
        elements.push(element);
    }
}

unsafe extern "C" fn array_set(
    array: sys::ArrayPtr,
    index: sys::NativeInt,
    kind: u32,
    value: sys::ConstTypePtr,
) -> sys::NativeBool {
    let mut st = state();
    let element = unsafe { st.read_element(kind, value) };
    let slot = st
        .array(unsafe { read_token(array) })
        .and_then(|elements| elements.get_mut(usize::try_from(index).ok()?));

    match slot {
        Some(slot) => {
            *slot = element;
            sys::NATIVE_TRUE
        }
        None => sys::NATIVE_FALSE,
    }
}

unsafe extern "C" fn array_get(
    src: sys::ConstArrayPtr,
    index: sys::NativeInt,
    r_kind: *mut u32,
    r_value: sys::UninitTypePtr,
) -> sys::NativeBool {
    let mut st = state();
    let element = st
        .array(unsafe { read_token(src) })
        .and_then(|elements| elements.get(usize::try_from(index).ok()?).cloned());

    match element {
        Some(element) => {
            unsafe { st.write_element(&element, r_kind, r_value) };
            sys::NATIVE_TRUE
        }
        None => sys::NATIVE_FALSE,
    }
}

unsafe extern "C" fn array_destroy(p: sys::ArrayPtr) {
    let token = unsafe { read_token(p) };
    let mut st = state();
    if st.arrays.remove(&token).is_none() {
        st.violations.push(Violation::ArrayFreedTwice { token });
    }
}

unsafe extern "C" fn dictionary_new(r_dest: sys::UninitDictionaryPtr) {
    let token = state().create_dictionary(Vec::new());
    unsafe { write_token(r_dest, token) };
}

unsafe extern "C" fn dictionary_new_copy(r_dest: sys::UninitDictionaryPtr, src: sys::ConstDictionaryPtr) {
    let mut st = state();
    let entries = st.dictionary(unsafe { read_token(src) }).cloned().unwrap_or_default();
    let token = st.create_dictionary(entries);
    unsafe { write_token(r_dest, token) };
}

unsafe extern "C" fn dictionary_size(src: sys::ConstDictionaryPtr) -> sys::NativeInt {
    let mut st = state();
    native_len(st.dictionary(unsafe { read_token(src) }).map_or(0, |entries| entries.len()))
}

unsafe extern "C" fn dictionary_set(
    dict: sys::DictionaryPtr,
    key_kind: u32,
    key: sys::ConstTypePtr,
    value_kind: u32,
    value: sys::ConstTypePtr,
) {
    let mut st = state();
    let key = unsafe { st.read_element(key_kind, key) };
    let value = unsafe { st.read_element(value_kind, value) };

    let Some(entries) = st.dictionary(unsafe { read_token(dict) }) else {
        return;
    };
    match entries.iter_mut().find(|(existing, _)| *existing == key) {
        Some((_, slot)) => *slot = value,
        None => entries.push((key, value)),
    }
}

unsafe extern "C" fn dictionary_get(
    src: sys::ConstDictionaryPtr,
    key_kind: u32,
    key: sys::ConstTypePtr,
    r_kind: *mut u32,
    r_value: sys::UninitTypePtr,
) -> sys::NativeBool {
    let mut st = state();
    let key = unsafe { st.read_element(key_kind, key) };
    let value = st
        .dictionary(unsafe { read_token(src) })
        .and_then(|entries| entries.iter().find(|(existing, _)| *existing == key))
        .map(|(_, value)| value.clone());

    match value {
        Some(value) => {
            unsafe { st.write_element(&value, r_kind, r_value) };
            sys::NATIVE_TRUE
        }
        None => sys::NATIVE_FALSE,
    }
}

unsafe extern "C" fn dictionary_erase(dict: sys::DictionaryPtr, key_kind: u32, key: sys::ConstTypePtr) -> sys::NativeBool {
    let mut st = state();
    let key = unsafe { st.read_element(key_kind, key) };
    let Some(entries) = st.dictionary(unsafe { read_token(dict) }) else {
        return sys::NATIVE_FALSE;
    };

    let before = entries.len();
    entries.retain(|(existing, _)| *existing != key);
    sys::to_native_bool(entries.len() != before)
}

unsafe extern "C" fn dictionary_keys(src: sys::ConstDictionaryPtr, r_keys: sys::UninitArrayPtr) {
    let mut st = state();
    let keys = st
        .dictionary(unsafe { read_token(src) })
        .map(|entries| entries.iter().map(|(key, _)| key.clone()).collect())
        .unwrap_or_default();

    let token = st.create_array(keys);
    unsafe { write_token(r_keys, token) };
}

unsafe extern "C" fn dictionary_destroy(p: sys::DictionaryPtr) {
    let token = unsafe { read_token(p) };
    let mut st = state();
    if st.dictionaries.remove(&token).is_none() {
        st.violations.push(Violation::DictionaryFreedTwice { token });
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Class DB

unsafe extern "C" fn classdb_construct_object(class_name: *const c_char) -> sys::ObjectPtr {
    let Some(name) = (unsafe { sys::read_c_str(class_name) }) else {
        return std::ptr::null_mut();
    };

    let mut st = state();
    if let Some(native) = classes::find(name) {
        return object_ptr(st.create_object(native));
    }

    let Some(extension) = st.extensions.get(name).cloned() else {
        st.log(LogLevel::Error, format!("cannot construct unknown class {name}"));
        return std::ptr::null_mut();
    };
    drop(st);

    match extension.create {
        Some(create) => unsafe { create(extension.userdata as *mut c_void) },
        None => std::ptr::null_mut(),
    }
}

unsafe extern "C" fn classdb_get_method_bind(
    class_name: *const c_char,
    method_name: *const c_char,
    hash: u32,
) -> sys::MethodBindPtr {
    let (Some(class), Some(method)) = (unsafe { sys::read_c_str(class_name) }, unsafe { sys::read_c_str(method_name) }) else {
        return std::ptr::null();
    };

    let mut st = state();
    *st.bind_lookups.entry((class.to_string(), method.to_string())).or_insert(0) += 1;

    // Methods are also found on ancestors of the named class.
    let mut current = classes::find(class);
    while let Some(native) = current {
        if let Some(def) = methods::find_declared(native.name, method) {
            if def.hash() == hash {
                return def.bind_ptr();
            }

            st.log(
                LogLevel::Error,
                format!("method {class}::{method} has hash {:#010x}, requested {hash:#010x}", def.hash()),
            );
            return std::ptr::null();
        }
        current = native.parent.and_then(classes::find);
    }

    std::ptr::null()
}

unsafe extern "C" fn classdb_get_class_tag(class_name: *const c_char) -> sys::ClassTagPtr {
    let Some(name) = (unsafe { sys::read_c_str(class_name) }) else {
        return std::ptr::null();
    };

    let mut st = state();
    if st.class_exists(name) {
        st.tag_of(name)
    } else {
        std::ptr::null()
    }
}

unsafe extern "C" fn classdb_register_extension_class(
    _library: sys::LibraryPtr,
    class_name: *const c_char,
    parent_class_name: *const c_char,
    info: *const sys::ClassCreationInfo,
) {
    let (Some(name), Some(parent)) = (unsafe { sys::read_c_str(class_name) }, unsafe { sys::read_c_str(parent_class_name) }) else {
        return;
    };

    let mut st = state();
    if info.is_null() || !st.class_exists(parent) {
        st.log(LogLevel::Error, format!("cannot register class {name}: unknown parent {parent}"));
        return;
    }
    if st.class_exists(name) {
        st.log(LogLevel::Error, format!("class {name} is already registered"));
        return;
    }

    let info = unsafe { *info };
    st.extensions.insert(
        name.to_string(),
        ExtensionClass {
            parent: parent.to_string(),
            create: info.create_instance_func,
            free: info.free_instance_func,
            get_virtual: info.get_virtual_func,
            call_virtual: info.call_virtual_func,
            userdata: info.class_userdata as usize,
            virtual_tokens: HashMap::new(),
        },
    );
}

unsafe extern "C" fn classdb_unregister_extension_class(_library: sys::LibraryPtr, class_name: *const c_char) {
    if let Some(name) = unsafe { sys::read_c_str(class_name) } {
        state().extensions.remove(name);
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Objects

unsafe extern "C" fn object_method_bind_ptrcall(
    method_bind: sys::MethodBindPtr,
    object: sys::ObjectPtr,
    args: *const sys::ConstTypePtr,
    r_ret: sys::TypePtr,
) {
    let id = object_id(object);

    let mut st = state();
    let Some(def) = methods::from_bind_ptr(method_bind) else {
        st.violations.push(Violation::UnknownMethodBind);
        return;
    };

    let Some(receiver) = st.live_object(id, def.name) else {
        return;
    };
    if !classes::native_inherits(receiver.class, def.class) {
        let class = receiver.class.name.to_string();
        st.violations.push(Violation::ReceiverClassMismatch {
            id,
            class,
            method: def.name,
        });
        return;
    }
    drop(st);

    let call = unsafe { PtrCall::new(id, args, r_ret) };
    unsafe { methods::execute(def, &call) };
}

unsafe extern "C" fn object_destroy(object: sys::ObjectPtr) {
    destroy(object_id(object));
}

/// Destroys an object: children first, then the bound user instance, then the object itself.
pub(crate) fn destroy(id: u64) {
    let mut st = state();
    let Some(object) = st.objects.get(&id) else {
        st.violations.push(Violation::ObjectDestroyedTwice { id });
        return;
    };

    let children = object.children.clone();
    let bound = object.bound.clone();
    let extension = bound.as_ref().and_then(|bound| st.extensions.get(&bound.class).cloned());
    drop(st);

    for child in children {
        destroy(child);
    }

    if let (Some(bound), Some(extension)) = (bound, extension) {
        if let Some(free) = extension.free {
            unsafe { free(extension.userdata as *mut c_void, bound.instance as sys::ClassInstancePtr) };
        }
    }

    let mut st = state();
    let Some(object) = st.objects.remove(&id) else {
        // Freed again from within the instance's teardown.
        return;
    };

    if let Some(parent) = object.parent.and_then(|parent| st.objects.get_mut(&parent)) {
        parent.children.retain(|&child| child != id);
    }
    for prop in object.props.values() {
        if let Prop::Array(token) = prop {
            st.arrays.remove(token);
        }
    }
    *st.destroys.entry(id).or_insert(0) += 1;
}

unsafe extern "C" fn object_get_instance_id(object: sys::ConstObjectPtr) -> u64 {
    let id = object_id(object);
    if state().objects.contains_key(&id) {
        id
    } else {
        0
    }
}

unsafe extern "C" fn object_get_instance_from_id(instance_id: u64) -> sys::ObjectPtr {
    if instance_id != 0 && state().objects.contains_key(&instance_id) {
        object_ptr(instance_id)
    } else {
        std::ptr::null_mut()
    }
}

unsafe extern "C" fn object_cast_to(object: sys::ConstObjectPtr, class_tag: sys::ClassTagPtr) -> sys::ObjectPtr {
    let id = object_id(object);

    let mut st = state();
    let Some(target) = st.class_of_tag(class_tag).map(str::to_string) else {
        return std::ptr::null_mut();
    };
    if st.live_object(id, "cast_to").is_none() {
        return std::ptr::null_mut();
    }

    let class = match st.objects.get(&id) {
        Some(object) => st.dynamic_class(object),
        None => return std::ptr::null_mut(),
    };
    if st.class_inherits(&class, &target) {
        object_ptr(id)
    } else {
        std::ptr::null_mut()
    }
}

unsafe extern "C" fn object_set_instance(object: sys::ObjectPtr, class_name: *const c_char, instance: sys::ClassInstancePtr) {
    let id = object_id(object);
    let Some(class) = (unsafe { sys::read_c_str(class_name) }) else {
        return;
    };

    let mut st = state();
    if !st.extensions.contains_key(class) {
        st.log(LogLevel::Error, format!("set_instance: {class} is not an extension class"));
        return;
    }

    if let Some(object) = st.live_object(id, "set_instance") {
        object.bound = Some(BoundInstance {
            class: class.to_string(),
            instance: instance as usize,
        });
    }
}

unsafe extern "C" fn object_is_ref_counted(object: sys::ConstObjectPtr) -> sys::NativeBool {
    let ref_counted = state()
        .live_object(object_id(object), "is_ref_counted")
        .is_some_and(|object| object.class.ref_counted);
    sys::to_native_bool(ref_counted)
}

unsafe extern "C" fn object_reference(object: sys::ObjectPtr) {
    let mut st = state();
    if let Some(object) = st.live_object(object_id(object), "reference") {
        object.ref_count += 1;
    }
}

unsafe extern "C" fn object_unreference(object: sys::ObjectPtr) -> sys::NativeBool {
    let id = object_id(object);

    let mut st = state();
    let Some(live) = st.live_object(id, "unreference") else {
        return sys::NATIVE_FALSE;
    };

    if live.ref_count == 0 {
        st.violations.push(Violation::RefCountUnderflow { id });
        return sys::NATIVE_FALSE;
    }

    live.ref_count -= 1;
    let reached_zero = live.ref_count == 0;
    *st.unreferences.entry(id).or_insert(0) += 1;

    sys::to_native_bool(reached_zero)
}

unsafe extern "C" fn global_get_singleton(name: *const c_char) -> sys::ObjectPtr {
    let Some(name) = (unsafe { sys::read_c_str(name) }) else {
        return std::ptr::null_mut();
    };

    // Only classes that exist once per engine.
    let Some(class) = classes::find(name).filter(|class| class.name == "Engine") else {
        return std::ptr::null_mut();
    };

    let mut st = state();
    if let Some(&id) = st.singletons.get(class.name) {
        return object_ptr(id);
    }

    let id = st.create_object(class);
    st.singletons.insert(class.name, id);
    object_ptr(id)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Virtual calls

/// Offers `method` to the user instance bound to object `id`, if any. Returns whether the instance handled it.
///
/// # Safety
/// `args` and `ret` must match the signature of the virtual.
pub(crate) unsafe fn dispatch_virtual(id: u64, method: &str, args: *const sys::ConstTypePtr, ret: sys::TypePtr) -> bool {
    let st = state();
    let Some(bound) = st.objects.get(&id).and_then(|object| object.bound.clone()) else {
        return false;
    };
    let Some(extension) = st.extensions.get(&bound.class).cloned() else {
        return false;
    };
    drop(st);

    let Some(call_virtual) = extension.call_virtual else {
        return false;
    };
    let token = match extension.virtual_tokens.get(method) {
        Some(&token) => token,
        None => resolve_virtual(&bound.class, &extension, method),
    };
    if token == 0 {
        return false;
    }

    let handled = unsafe {
        call_virtual(
            extension.userdata as *mut c_void,
            bound.instance as sys::ClassInstancePtr,
            token as *mut c_void,
            args,
            ret,
        )
    };

    sys::to_bool(handled)
}

/// Asks the extension class once for its token of `method`, and caches the answer.
fn resolve_virtual(class: &str, extension: &ExtensionClass, method: &str) -> usize {
    let token = match extension.get_virtual {
        Some(get_virtual) => {
            let name = sys::to_c_string(method);
            unsafe { get_virtual(extension.userdata as *mut c_void, name.as_ptr()) as usize }
        }
        None => 0,
    };

    // Threads racing on the first call agree on one cached answer.
    let mut st = state();
    let Some(extension) = st.extensions.get_mut(class) else {
        return token;
    };
    if extension.virtual_tokens.insert(method.to_string(), token).is_none() {
        *st.virtual_lookups.entry((class.to_string(), method.to_string())).or_insert(0) += 1;
    }
    token
}
