/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! In-process stand-in for the native engine.
//!
//! Provides a complete [`NativeInterface`](sys::NativeInterface) over a small class hierarchy (`Object` to `Node2D`, `Mesh`,
//! `Light3D`, `Engine` and a few more), with method binds whose signature hashes follow the same scheme as the generated
//! wrappers. Objects, strings, packed arrays, arrays and dictionaries live in a process-wide table.
//!
//! Virtual calls follow the engine's protocol: each extension class is asked once per method for a token (`get_virtual`), and
//! later calls of that method pass the cached token.
//!
//! Contract breaches by the host (double frees, use of dead objects, ref-count underflow) do not crash: they are recorded as
//! [`Violation`]s. Tests running in parallel share the engine, so assertions should be made per object ID.

mod classes;
mod interface;
mod methods;
mod state;

use std::ffi::c_void;

use gdbind_ffi as sys;

pub use state::{LogEntry, LogLevel, Violation};

use state::state;

// Opaque cookie handed to the host as library pointer.
static LIBRARY: u8 = 0;

/// The engine's function table and library pointer, as the engine would pass them on load.
pub fn install() -> (*const sys::NativeInterface, sys::LibraryPtr) {
    (&interface::INTERFACE as *const sys::NativeInterface, library())
}

pub fn library() -> sys::LibraryPtr {
    (&LIBRARY as *const u8).cast_mut().cast::<c_void>()
}

/// `(major, minor, patch)` reported through `get_version`.
pub fn version() -> (u32, u32, u32) {
    interface::VERSION
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Objects

pub fn is_alive(id: u64) -> bool {
    state().objects.contains_key(&id)
}

/// Current reference count of a live object. Manually managed objects keep their initial count of 1.
pub fn reference_count(id: u64) -> Option<u32> {
    state().objects.get(&id).map(|object| object.ref_count)
}

/// How often the object was destroyed. More than 1 never happens; a second destroy is a [`Violation`] instead.
pub fn destroy_count(id: u64) -> u32 {
    state().destroys.get(&id).copied().unwrap_or(0)
}

/// How often a reference to the object was released.
pub fn unreference_count(id: u64) -> u32 {
    state().unreferences.get(&id).copied().unwrap_or(0)
}

pub fn parent_of(id: u64) -> Option<u64> {
    state().objects.get(&id).and_then(|object| object.parent)
}

/// User class bound to the object, if any.
pub fn bound_class(id: u64) -> Option<String> {
    let st = state();
    let object = st.objects.get(&id)?;
    object.bound.as_ref().map(|bound| bound.class.clone())
}

/// Destroys an object from the engine side, like the engine freeing a node at the end of a frame.
pub fn destroy_object(id: u64) {
    interface::destroy(id);
}

/// Calls a virtual on the user instance bound to object `id`, as the engine would. Returns whether the instance handled it.
///
/// # Safety
/// `args` must hold one pointer per parameter of the virtual, and `ret` must point to a slot of its return type (or may be null
/// for virtuals without return value).
pub unsafe fn call_virtual_raw(id: u64, method: &str, args: &[sys::ConstTypePtr], ret: sys::TypePtr) -> bool {
    unsafe { interface::dispatch_virtual(id, method, args.as_ptr(), ret) }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Builtins

/// Number of strings currently alive on the engine side.
pub fn string_count() -> usize {
    state().strings.len()
}

/// Takes over a string the host wrote into a return slot, returning its content.
pub fn take_string(token: u64) -> Option<String> {
    state().strings.remove(&token)
}

/// Number of packed arrays currently alive on the engine side.
pub fn packed_array_count() -> usize {
    state().packed_arrays.len()
}

pub fn array_count() -> usize {
    state().arrays.len()
}

pub fn dictionary_count() -> usize {
    state().dictionaries.len()
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Engine state

/// Number of `classdb_get_method_bind` calls for one method, successful or not.
pub fn bind_lookups(class: &str, method: &str) -> u32 {
    let key = (class.to_string(), method.to_string());
    state().bind_lookups.get(&key).copied().unwrap_or(0)
}

/// How often a `get_virtual` answer was cached for one method of an extension class.
pub fn virtual_lookups(class: &str, method: &str) -> u32 {
    let key = (class.to_string(), method.to_string());
    state().virtual_lookups.get(&key).copied().unwrap_or(0)
}

pub fn is_class_registered(class: &str) -> bool {
    state().extensions.contains_key(class)
}

/// Advances `Engine.get_frames_drawn()`.
pub fn advance_frames(frames: i64) {
    state().frames_drawn += frames;
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Diagnostics

/// All contract breaches recorded so far.
pub fn violations() -> Vec<Violation> {
    state().violations.clone()
}

/// Contract breaches involving object `id`.
pub fn violations_of(id: u64) -> Vec<Violation> {
    violations()
        .into_iter()
        .filter(|violation| match violation {
            Violation::ObjectDestroyedTwice { id: other }
            | Violation::DeadObjectUsed { id: other, .. }
            | Violation::RefCountUnderflow { id: other }
            | Violation::ReceiverClassMismatch { id: other, .. } => *other == id,
            _ => false,
        })
        .collect()
}

/// Everything printed through the engine's message, warning and error output.
pub fn logs() -> Vec<LogEntry> {
    state().logs.clone()
}

/// Whether some log entry of `level` contains `needle`.
pub fn has_log(level: LogLevel, needle: &str) -> bool {
    state()
        .logs
        .iter()
        .any(|entry| entry.level == level && entry.message.contains(needle))
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use sys::SlotKind;

    fn table() -> &'static sys::NativeInterface {
        unsafe { &*install().0 }
    }

    fn construct(class: &str) -> sys::ObjectPtr {
        let name = CString::new(class).unwrap();
        unsafe { table().classdb_construct_object.unwrap()(name.as_ptr()) }
    }

    fn id_of(ptr: sys::ObjectPtr) -> u64 {
        unsafe { table().object_get_instance_id.unwrap()(ptr) }
    }

    #[test]
    fn every_slot_of_the_table_is_filled() {
        let t = table();
        assert!(t.get_version.is_some());
        assert!(t.print_error.is_some());
        assert!(t.string_to_utf8_chars.is_some());
        assert!(t.packed_array_data.is_some());
        assert!(t.array_get.is_some());
        assert!(t.dictionary_keys.is_some());
        assert!(t.classdb_register_extension_class.is_some());
        assert!(t.object_cast_to.is_some());
        assert!(t.global_get_singleton.is_some());
    }

    #[test]
    fn bind_requires_matching_hash() {
        let class = CString::new("Node2D").unwrap();
        let method = CString::new("set_position").unwrap();
        let hash = sys::signature_hash(SlotKind::Nil, &[SlotKind::Vector2]);

        let get_bind = table().classdb_get_method_bind.unwrap();
        let bind = unsafe { get_bind(class.as_ptr(), method.as_ptr(), hash) };
        assert!(!bind.is_null());

        let wrong = unsafe { get_bind(class.as_ptr(), method.as_ptr(), hash ^ 1) };
        assert!(wrong.is_null());
        assert!(has_log(LogLevel::Error, "Node2D::set_position"));
    }

    #[test]
    fn binds_are_found_on_ancestors() {
        let class = CString::new("TileMap").unwrap();
        let method = CString::new("get_name").unwrap();
        let hash = sys::signature_hash(SlotKind::String, &[]);

        let bind = unsafe { table().classdb_get_method_bind.unwrap()(class.as_ptr(), method.as_ptr(), hash) };
        assert!(!bind.is_null());
    }

    #[test]
    fn ref_counted_lifecycle() {
        let ptr = construct("ArrayMesh");
        let id = id_of(ptr);
        let t = table();

        unsafe {
            assert!(sys::to_bool(t.object_is_ref_counted.unwrap()(ptr)));
            t.object_reference.unwrap()(ptr);
            assert_eq!(reference_count(id), Some(2));

            assert!(!sys::to_bool(t.object_unreference.unwrap()(ptr)));
            assert!(sys::to_bool(t.object_unreference.unwrap()(ptr)));
            t.object_destroy.unwrap()(ptr);
        }

        assert!(!is_alive(id));
        assert_eq!(destroy_count(id), 1);
        assert_eq!(unreference_count(id), 2);
        assert!(violations_of(id).is_empty());
    }

    #[test]
    fn double_destroy_is_recorded() {
        let ptr = construct("Node");
        let id = id_of(ptr);
        let destroy = table().object_destroy.unwrap();

        unsafe {
            destroy(ptr);
            destroy(ptr);
        }

        assert_eq!(destroy_count(id), 1);
        assert_eq!(violations_of(id), vec![Violation::ObjectDestroyedTwice { id }]);
    }

    #[test]
    fn children_die_with_parent() {
        let parent = construct("Node");
        let child = construct("Node2D");
        let (parent_id, child_id) = (id_of(parent), id_of(child));

        let class = CString::new("Node").unwrap();
        let method = CString::new("add_child").unwrap();
        let hash = sys::signature_hash(SlotKind::Nil, &[SlotKind::Object]);

        unsafe {
            let bind = table().classdb_get_method_bind.unwrap()(class.as_ptr(), method.as_ptr(), hash);
            let args = [(&child as *const sys::ObjectPtr).cast::<c_void>()];
            table().object_method_bind_ptrcall.unwrap()(bind, parent, args.as_ptr(), std::ptr::null_mut());
        }
        assert_eq!(parent_of(child_id), Some(parent_id));

        destroy_object(parent_id);
        assert!(!is_alive(child_id));
        assert_eq!(destroy_count(child_id), 1);
    }

    #[test]
    fn cast_follows_hierarchy() {
        let ptr = construct("Light3D");
        let t = table();

        let tag_of = |class: &str| {
            let name = CString::new(class).unwrap();
            unsafe { t.classdb_get_class_tag.unwrap()(name.as_ptr()) }
        };

        unsafe {
            assert_eq!(t.object_cast_to.unwrap()(ptr, tag_of("Node3D")), ptr);
            assert!(t.object_cast_to.unwrap()(ptr, tag_of("Node2D")).is_null());
        }
        assert!(tag_of("NoSuchClass").is_null());
    }

    #[test]
    fn strings_report_full_length() {
        let t = table();
        let text = "héllo";
        let mut token = [0u8; 8];

        unsafe {
            t.string_new_with_utf8_chars_and_len.unwrap()(token.as_mut_ptr().cast(), text.as_ptr().cast(), text.len() as i64);
            let len = t.string_to_utf8_chars.unwrap()(token.as_ptr().cast(), std::ptr::null_mut(), 0);
            assert_eq!(len, text.len() as i64);

            let mut buf = [0u8; 3];
            let len = t.string_to_utf8_chars.unwrap()(token.as_ptr().cast(), buf.as_mut_ptr().cast(), 3);
            assert_eq!(len, text.len() as i64);
            assert_eq!(&buf, &text.as_bytes()[..3]);

            t.string_destroy.unwrap()(token.as_mut_ptr().cast());
        }
    }

    #[test]
    fn array_elements_are_copied() {
        let t = table();
        let mut array = [0u64; 1];
        let array_ptr = array.as_mut_ptr().cast::<c_void>();

        unsafe {
            t.array_new.unwrap()(array_ptr);
            let value = 17i64;
            t.array_push.unwrap()(array_ptr, SlotKind::Int.ord(), (&value as *const i64).cast());
            assert_eq!(t.array_size.unwrap()(array_ptr), 1);

            let mut kind = 0u32;
            let mut read = 0i64;
            let found = t.array_get.unwrap()(array_ptr, 0, &mut kind, (&mut read as *mut i64).cast());
            assert!(sys::to_bool(found));
            assert_eq!((kind, read), (SlotKind::Int.ord(), 17));

            assert!(!sys::to_bool(t.array_get.unwrap()(array_ptr, 1, &mut kind, (&mut read as *mut i64).cast())));
            t.array_destroy.unwrap()(array_ptr);
            t.array_destroy.unwrap()(array_ptr);
        }

        let token = array[0];
        assert!(violations().contains(&Violation::ArrayFreedTwice { token }));
    }

    #[test]
    fn dictionary_keys_are_unique() {
        let t = table();
        let mut dict = [0u64; 1];
        let dict_ptr = dict.as_mut_ptr().cast::<c_void>();
        let key = 1i64;

        unsafe {
            t.dictionary_new.unwrap()(dict_ptr);
            for value in [2.0f64, 3.0] {
                t.dictionary_set.unwrap()(
                    dict_ptr,
                    SlotKind::Int.ord(),
                    (&key as *const i64).cast(),
                    SlotKind::Float.ord(),
                    (&value as *const f64).cast(),
                );
            }
            assert_eq!(t.dictionary_size.unwrap()(dict_ptr), 1);

            let mut kind = 0u32;
            let mut read = 0f64;
            t.dictionary_get.unwrap()(dict_ptr, SlotKind::Int.ord(), (&key as *const i64).cast(), &mut kind, (&mut read as *mut f64).cast());
            assert_eq!((kind, read), (SlotKind::Float.ord(), 3.0));

            assert!(sys::to_bool(t.dictionary_erase.unwrap()(dict_ptr, SlotKind::Int.ord(), (&key as *const i64).cast())));
            assert_eq!(t.dictionary_size.unwrap()(dict_ptr), 0);
            t.dictionary_destroy.unwrap()(dict_ptr);
        }
    }
}
