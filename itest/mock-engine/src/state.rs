/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Process-wide state of the mock engine: objects, strings, packed arrays, arrays, dictionaries and diagnostics.

use std::collections::HashMap;
use std::ffi::c_void;

use gdbind_ffi as sys;
use sys::{Global, GlobalGuard};

use crate::classes::{self, NativeClass};

static STATE: Global<MockState> = Global::default();

pub(crate) fn state() -> GlobalGuard<'static, MockState> {
    STATE.lock()
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Diagnostics

/// Contract breach detected by the engine.
///
/// A real engine would crash or corrupt memory; the mock records the breach and carries on, so tests can assert on it.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Violation {
    ObjectDestroyedTwice { id: u64 },
    DeadObjectUsed { id: u64, operation: &'static str },
    RefCountUnderflow { id: u64 },
    ReceiverClassMismatch { id: u64, class: String, method: &'static str },
    UnknownMethodBind,
    StringFreedTwice { token: u64 },
    DeadStringUsed { token: u64 },
    PackedArrayFreedTwice { token: u64 },
    DeadPackedArrayUsed { token: u64 },
    ArrayFreedTwice { token: u64 },
    DeadArrayUsed { token: u64 },
    DictionaryFreedTwice { token: u64 },
    DeadDictionaryUsed { token: u64 },
    UnsupportedElement { kind: u32 },
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LogLevel {
    Message,
    Warning,
    Error,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Objects

/// Property value of a mock object.
#[derive(Clone, Debug)]
pub(crate) enum Prop {
    /// Native slot bytes, exactly as passed through a frame.
    Raw(Vec<u8>),
    Text(String),
    Cells(HashMap<(i64, i32, i32), i64>),
    Surfaces(Vec<Vec<u8>>),
    Params(HashMap<i64, f64>),
    /// Token of an array the object owns.
    Array(u64),
    Entries(Vec<(MockValue, MockValue)>),
}

/// User class bound to an object through `object_set_instance`.
#[derive(Clone, Debug)]
pub(crate) struct BoundInstance {
    pub class: String,
    pub instance: usize,
}

#[derive(Debug)]
pub(crate) struct MockObject {
    pub class: &'static NativeClass,
    pub bound: Option<BoundInstance>,
    pub ref_count: u32,
    pub parent: Option<u64>,
    pub children: Vec<u64>,
    pub props: HashMap<&'static str, Prop>,
}

/// Extension class registered through `classdb_register_extension_class`.
#[derive(Clone, Debug)]
pub(crate) struct ExtensionClass {
    pub parent: String,
    pub create: Option<sys::ClassCreateInstance>,
    pub free: Option<sys::ClassFreeInstance>,
    pub get_virtual: Option<sys::ClassGetVirtual>,
    pub call_virtual: Option<sys::ClassCallVirtual>,
    pub userdata: usize,

    /// Method tokens from `get_virtual`, by method name. Null tokens are cached too.
    pub virtual_tokens: HashMap<String, usize>,
}

/// Backing store of a packed array. Words keep the data 8-aligned for every element kind.
#[derive(Clone, Debug)]
pub(crate) struct PackedData {
    pub kind: sys::SlotKind,
    pub len: usize,
    pub words: Vec<u64>,
}

impl PackedData {
    pub fn from_bytes(kind: sys::SlotKind, len: usize, bytes: &[u8]) -> Self {
        let mut words = vec![0u64; bytes.len().div_ceil(8)];
        // SAFETY: `words` spans at least `bytes.len()` bytes.
        unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), words.as_mut_ptr().cast::<u8>(), bytes.len()) };
        Self { kind, len, words }
    }

    pub fn bytes(&self) -> &[u8] {
        let byte_len = self.len * self.kind.byte_size();
        // SAFETY: `words` was sized from the same byte length.
        unsafe { std::slice::from_raw_parts(self.words.as_ptr().cast::<u8>(), byte_len) }
    }

    pub fn data_ptr(&self) -> *const c_void {
        self.words.as_ptr().cast()
    }
}

/// Element of an array or dictionary. Strings are stored by content; the host gets a fresh string for each read.
#[derive(Clone, PartialEq, Debug)]
pub(crate) enum MockValue {
    Nil,
    Text(String),
    Raw { kind: sys::SlotKind, bytes: Vec<u8> },
}

impl MockValue {
    pub fn kind(&self) -> sys::SlotKind {
        match self {
            Self::Nil => sys::SlotKind::Nil,
            Self::Text(_) => sys::SlotKind::String,
            Self::Raw { kind, .. } => *kind,
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// State

#[derive(Default)]
pub(crate) struct MockState {
    next_id: u64,
    pub objects: HashMap<u64, MockObject>,
    pub strings: HashMap<u64, String>,
    pub packed_arrays: HashMap<u64, PackedData>,
    pub arrays: HashMap<u64, Vec<MockValue>>,
    pub dictionaries: HashMap<u64, Vec<(MockValue, MockValue)>>,
    pub extensions: HashMap<String, ExtensionClass>,
    pub tags: Vec<String>,
    pub singletons: HashMap<&'static str, u64>,

    pub violations: Vec<Violation>,
    pub logs: Vec<LogEntry>,
    pub destroys: HashMap<u64, u32>,
    pub unreferences: HashMap<u64, u32>,
    pub bind_lookups: HashMap<(String, String), u32>,
    pub virtual_lookups: HashMap<(String, String), u32>,
    pub frames_drawn: i64,
}

impl MockState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn create_object(&mut self, class: &'static NativeClass) -> u64 {
        let id = self.next_id();
        let object = MockObject {
            class,
            bound: None,
            ref_count: 1,
            parent: None,
            children: Vec::new(),
            props: classes::default_props(class),
        };

        self.objects.insert(id, object);
        id
    }

    pub fn create_string(&mut self, content: String) -> u64 {
        let token = self.next_id();
        self.strings.insert(token, content);
        token
    }

    pub fn create_packed_array(&mut self, data: PackedData) -> u64 {
        let token = self.next_id();
        self.packed_arrays.insert(token, data);
        token
    }

    pub fn create_array(&mut self, elements: Vec<MockValue>) -> u64 {
        let token = self.next_id();
        self.arrays.insert(token, elements);
        token
    }

    pub fn create_dictionary(&mut self, entries: Vec<(MockValue, MockValue)>) -> u64 {
        let token = self.next_id();
        self.dictionaries.insert(token, entries);
        token
    }

    /// Live object with this ID, or records that a dead one was used.
    pub fn live_object(&mut self, id: u64, operation: &'static str) -> Option<&mut MockObject> {
        if !self.objects.contains_key(&id) {
            self.violations.push(Violation::DeadObjectUsed { id, operation });
        }
        self.objects.get_mut(&id)
    }

    pub fn string_content(&mut self, token: u64) -> String {
        match self.strings.get(&token) {
            Some(content) => content.clone(),
            None => {
                self.violations.push(Violation::DeadStringUsed { token });
                String::new()
            }
        }
    }

    pub fn packed_data(&mut self, token: u64) -> Option<&PackedData> {
        if !self.packed_arrays.contains_key(&token) {
            self.violations.push(Violation::DeadPackedArrayUsed { token });
        }
        self.packed_arrays.get(&token)
    }

    pub fn array(&mut self, token: u64) -> Option<&mut Vec<MockValue>> {
        if !self.arrays.contains_key(&token) {
            self.violations.push(Violation::DeadArrayUsed { token });
        }
        self.arrays.get_mut(&token)
    }

    pub fn dictionary(&mut self, token: u64) -> Option<&mut Vec<(MockValue, MockValue)>> {
        if !self.dictionaries.contains_key(&token) {
            self.violations.push(Violation::DeadDictionaryUsed { token });
        }
        self.dictionaries.get_mut(&token)
    }

    /// Copies an element passed by the host as kind and pointer.
    ///
    /// # Safety
    /// `value` must point to a value of `kind`, or be null for nil.
    pub unsafe fn read_element(&mut self, kind: u32, value: *const c_void) -> MockValue {
        let slot = sys::SlotKind::try_from_ord(kind).filter(|slot| slot.is_variant_element());
        match slot {
            Some(sys::SlotKind::Nil) => MockValue::Nil,
            Some(_) if value.is_null() => {
                self.log(LogLevel::Error, format!("null pointer for element of kind {kind}"));
                MockValue::Nil
            }
            Some(sys::SlotKind::String) => MockValue::Text(self.string_content(unsafe { read_token(value) })),
            Some(slot) => {
                let bytes = unsafe { std::slice::from_raw_parts(value.cast::<u8>(), slot.byte_size()) };
                MockValue::Raw {
                    kind: slot,
                    bytes: bytes.to_vec(),
                }
            }
            None => {
                self.violations.push(Violation::UnsupportedElement { kind });
                MockValue::Nil
            }
        }
    }

    /// Hands a copy of `value` to the host: its kind into `r_kind`, its representation into `r_value`.
    ///
    /// # Safety
    /// `r_kind` must be writable; `r_value` must have room for the largest element kind.
    pub unsafe fn write_element(&mut self, value: &MockValue, r_kind: *mut u32, r_value: *mut c_void) {
        unsafe { r_kind.write(value.kind().ord()) };
        match value {
            MockValue::Nil => {}
            MockValue::Text(content) => {
                let token = self.create_string(content.clone());
                unsafe { r_value.cast::<u64>().write_unaligned(token) };
            }
            MockValue::Raw { bytes, .. } => unsafe {
                std::ptr::copy_nonoverlapping(bytes.as_ptr(), r_value.cast::<u8>(), bytes.len());
            },
        }
    }

    /// Most derived class of an object: its user class if bound, its native class otherwise.
    pub fn dynamic_class(&self, object: &MockObject) -> String {
        match &object.bound {
            Some(bound) => bound.class.clone(),
            None => object.class.name.to_string(),
        }
    }

    /// Whether `class` is `ancestor` or derives from it, through extension and native classes.
    pub fn class_inherits(&self, class: &str, ancestor: &str) -> bool {
        let mut current = class.to_string();
        loop {
            if current == ancestor {
                return true;
            }

            if let Some(extension) = self.extensions.get(&current) {
                current = extension.parent.clone();
                continue;
            }

            return match classes::find(&current) {
                Some(native) => classes::native_inherits(native, ancestor),
                None => false,
            };
        }
    }

    pub fn class_exists(&self, class: &str) -> bool {
        classes::find(class).is_some() || self.extensions.contains_key(class)
    }

    /// Stable tag of a class, as handed out by `classdb_get_class_tag`.
    pub fn tag_of(&mut self, class: &str) -> sys::ClassTagPtr {
        let index = match self.tags.iter().position(|tag| tag == class) {
            Some(index) => index,
            None => {
                self.tags.push(class.to_string());
                self.tags.len() - 1
            }
        };

        (index + 1) as *const c_void
    }

    pub fn class_of_tag(&self, tag: sys::ClassTagPtr) -> Option<&str> {
        let index = (tag as usize).checked_sub(1)?;
        self.tags.get(index).map(String::as_str)
    }

    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.logs.push(LogEntry {
            level,
            message: message.into(),
        });
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Pointer encoding

// Object pointers are never dereferenced by the host; the ID is encoded in the address, away from null.
const PTR_SHIFT: u32 = 4;

pub(crate) fn object_ptr(id: u64) -> sys::ObjectPtr {
    (id << PTR_SHIFT) as usize as sys::ObjectPtr
}

pub(crate) fn object_id(ptr: sys::ConstObjectPtr) -> u64 {
    (ptr as usize as u64) >> PTR_SHIFT
}

/// Reads the ID stored in the first word of a string, packed array, array or dictionary token.
///
/// # Safety
/// `token` must point to at least 8 readable bytes.
pub(crate) unsafe fn read_token(token: *const c_void) -> u64 {
    unsafe { token.cast::<u64>().read_unaligned() }
}
