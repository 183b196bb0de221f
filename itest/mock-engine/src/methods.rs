/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Method binds of the mock engine and their behavior.

use std::ffi::c_void;

use gdbind_ffi as sys;
use sys::{real, SlotKind};

use crate::classes::{self, IDENTITY_3D};
use crate::interface;
use crate::state::{state, LogLevel, MockObject, MockState, MockValue, PackedData, Prop};

/// Pixel size of a tile cell, for `TileMap::local_to_map`.
const TILE_SIZE: real = 16.0;

pub(crate) type CustomFn = unsafe fn(&PtrCall);

pub(crate) enum Behavior {
    /// Writes a stored property into the return slot.
    Get(&'static str),
    /// Stores the first argument as a property.
    Set(&'static str),
    /// Runs without the state lock held, so that it can call virtuals.
    Custom(CustomFn),
}

pub(crate) struct MethodDef {
    pub class: &'static str,
    pub name: &'static str,
    pub ret: SlotKind,
    pub args: &'static [SlotKind],
    pub behavior: Behavior,
}

impl MethodDef {
    pub fn hash(&self) -> u32 {
        sys::signature_hash(self.ret, self.args)
    }

    pub fn bind_ptr(&'static self) -> sys::MethodBindPtr {
        (self as *const MethodDef).cast()
    }
}

const fn method(
    class: &'static str,
    name: &'static str,
    args: &'static [SlotKind],
    ret: SlotKind,
    behavior: Behavior,
) -> MethodDef {
    MethodDef {
        class,
        name,
        ret,
        args,
        behavior,
    }
}

const fn getter(class: &'static str, name: &'static str, ret: SlotKind, prop: &'static str) -> MethodDef {
    method(class, name, &[], ret, Behavior::Get(prop))
}

const fn setter(class: &'static str, name: &'static str, arg: &'static [SlotKind], prop: &'static str) -> MethodDef {
    method(class, name, arg, SlotKind::Nil, Behavior::Set(prop))
}

use Behavior::Custom;
use SlotKind as K;

pub(crate) static METHODS: &[MethodDef] = &[
    method("Object", "get_class", &[], K::String, Custom(object_get_class)),
    method("Object", "get_instance_id", &[], K::Int, Custom(object_get_instance_id)),
    method("RefCounted", "get_reference_count", &[], K::Int, Custom(ref_counted_get_reference_count)),
    //
    setter("Resource", "set_resource_name", &[K::String], "resource_name"),
    getter("Resource", "get_resource_name", K::String, "resource_name"),
    method("Resource", "set_meta_entries", &[K::Dictionary], K::Nil, Custom(resource_set_meta_entries)),
    method("Resource", "get_meta_entries", &[], K::Dictionary, Custom(resource_get_meta_entries)),
    method("Mesh", "get_aabb", &[], K::Aabb, Custom(mesh_get_aabb)),
    method("Mesh", "get_surface_count", &[], K::Int, Custom(mesh_get_surface_count)),
    method("ArrayMesh", "add_surface_from_vertices", &[K::PackedVector3Array], K::Nil, Custom(array_mesh_add_surface)),
    method("ArrayMesh", "surface_get_vertices", &[K::Int], K::PackedVector3Array, Custom(array_mesh_surface_get_vertices)),
    method("ArrayMesh", "clear_surfaces", &[], K::Nil, Custom(array_mesh_clear_surfaces)),
    method("Shape2D", "get_rect", &[], K::Rect2, Custom(shape_get_rect)),
    setter("CircleShape2D", "set_radius", &[K::Float], "radius"),
    getter("CircleShape2D", "get_radius", K::Float, "radius"),
    //
    setter("Node", "set_name", &[K::String], "name"),
    getter("Node", "get_name", K::String, "name"),
    method("Node", "add_child", &[K::Object], K::Nil, Custom(node_add_child)),
    method("Node", "get_child_count", &[], K::Int, Custom(node_get_child_count)),
    method("Node", "get_child", &[K::Int], K::Object, Custom(node_get_child)),
    method("Node", "get_parent", &[], K::Object, Custom(node_get_parent)),
    method("Node", "add_to_group", &[K::String], K::Nil, Custom(node_add_to_group)),
    method("Node", "get_groups", &[], K::Array, Custom(node_get_groups)),
    method("Node", "get_configuration_warnings", &[], K::Array, Custom(node_get_configuration_warnings)),
    setter("CanvasItem", "set_visible", &[K::Bool], "visible"),
    getter("CanvasItem", "is_visible", K::Bool, "visible"),
    setter("CanvasItem", "set_modulate", &[K::Color], "modulate"),
    getter("CanvasItem", "get_modulate", K::Color, "modulate"),
    setter("Node2D", "set_position", &[K::Vector2], "position"),
    getter("Node2D", "get_position", K::Vector2, "position"),
    setter("Node2D", "set_rotation", &[K::Float], "rotation"),
    getter("Node2D", "get_rotation", K::Float, "rotation"),
    setter("Node2D", "set_scale", &[K::Vector2], "scale"),
    getter("Node2D", "get_scale", K::Vector2, "scale"),
    method("Node2D", "get_transform", &[], K::Transform2D, Custom(node2d_get_transform)),
    method("TileMap", "set_cell", &[K::Int, K::Vector2i, K::Int], K::Nil, Custom(tile_map_set_cell)),
    method("TileMap", "get_cell_source_id", &[K::Int, K::Vector2i], K::Int, Custom(tile_map_get_cell_source_id)),
    method("TileMap", "local_to_map", &[K::Vector2], K::Vector2i, Custom(tile_map_local_to_map)),
    //
    method("Node3D", "set_position", &[K::Vector3], K::Nil, Custom(node3d_set_position)),
    method("Node3D", "get_position", &[], K::Vector3, Custom(node3d_get_position)),
    setter("Node3D", "set_transform", &[K::Transform3D], "transform"),
    getter("Node3D", "get_transform", K::Transform3D, "transform"),
    setter("VisualInstance3D", "set_layer_mask", &[K::Int], "layer_mask"),
    getter("VisualInstance3D", "get_layer_mask", K::Int, "layer_mask"),
    setter("Light3D", "set_color", &[K::Color], "color"),
    getter("Light3D", "get_color", K::Color, "color"),
    method("Light3D", "set_param", &[K::Int, K::Float], K::Nil, Custom(light_set_param)),
    method("Light3D", "get_param", &[K::Int], K::Float, Custom(light_get_param)),
    //
    setter("AudioStreamPlayer", "set_volume_db", &[K::Float], "volume_db"),
    getter("AudioStreamPlayer", "get_volume_db", K::Float, "volume_db"),
    setter("AudioStreamPlayer", "set_pitch_scale", &[K::Float], "pitch_scale"),
    getter("AudioStreamPlayer", "get_pitch_scale", K::Float, "pitch_scale"),
    method("AudioStreamPlayer", "play", &[K::Float], K::Nil, Custom(audio_play)),
    method("AudioStreamPlayer", "stop", &[], K::Nil, Custom(audio_stop)),
    getter("AudioStreamPlayer", "is_playing", K::Bool, "playing"),
    getter("AudioStreamPlayer", "get_playback_position", K::Float, "playback_position"),
    //
    method("Engine", "get_frames_drawn", &[], K::Int, Custom(engine_get_frames_drawn)),
    setter("Engine", "set_time_scale", &[K::Float], "time_scale"),
    getter("Engine", "get_time_scale", K::Float, "time_scale"),
    method("Engine", "get_architecture_name", &[], K::String, Custom(engine_get_architecture_name)),
    method("Engine", "get_version_info", &[], K::Dictionary, Custom(engine_get_version_info)),
];

/// Method declared on `class` itself, regardless of signature.
pub(crate) fn find_declared(class: &str, name: &str) -> Option<&'static MethodDef> {
    METHODS.iter().find(|def| def.class == class && def.name == name)
}

pub(crate) fn from_bind_ptr(ptr: sys::MethodBindPtr) -> Option<&'static MethodDef> {
    METHODS.iter().find(|def| std::ptr::eq(def.bind_ptr(), ptr))
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Call context

/// Arguments and return slot of one ptrcall, for an object that was alive when the call started.
pub(crate) struct PtrCall {
    pub id: u64,
    args: *const sys::ConstTypePtr,
    ret: sys::TypePtr,
}

impl PtrCall {
    /// # Safety
    /// `args` must point to one valid pointer per argument of the method, and `ret` to a slot of its return kind.
    pub unsafe fn new(id: u64, args: *const sys::ConstTypePtr, ret: sys::TypePtr) -> Self {
        Self { id, args, ret }
    }

    unsafe fn arg_ptr(&self, index: usize) -> *const c_void {
        unsafe { *self.args.add(index) }
    }

    pub unsafe fn arg<T: Copy>(&self, index: usize) -> T {
        unsafe { self.arg_ptr(index).cast::<T>().read_unaligned() }
    }

    pub unsafe fn arg_bytes(&self, index: usize, len: usize) -> Vec<u8> {
        unsafe { std::slice::from_raw_parts(self.arg_ptr(index).cast::<u8>(), len).to_vec() }
    }

    /// ID in the first word of a string, packed array, array or dictionary argument.
    pub unsafe fn arg_token(&self, index: usize) -> u64 {
        unsafe { crate::state::read_token(self.arg_ptr(index)) }
    }

    pub unsafe fn write_ret<T>(&self, value: T) {
        unsafe { self.ret.cast::<T>().write_unaligned(value) }
    }

    pub unsafe fn write_ret_bytes(&self, bytes: &[u8]) {
        unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), self.ret.cast::<u8>(), bytes.len()) }
    }

    /// Hands a new string to the caller, which then owns it.
    pub unsafe fn write_ret_string(&self, st: &mut MockState, content: String) {
        let token = st.create_string(content);
        unsafe { self.write_ret(token) };
    }

    pub unsafe fn write_ret_packed(&self, st: &mut MockState, data: PackedData) {
        let kind = data.kind.ord() as u64;
        let token = st.create_packed_array(data);
        unsafe { self.write_ret([token, kind]) };
    }

    /// Hands a new array to the caller, which then owns it.
    pub unsafe fn write_ret_array(&self, st: &mut MockState, elements: Vec<MockValue>) {
        let token = st.create_array(elements);
        unsafe { self.write_ret(token) };
    }

    pub unsafe fn write_ret_dictionary(&self, st: &mut MockState, entries: Vec<(MockValue, MockValue)>) {
        let token = st.create_dictionary(entries);
        unsafe { self.write_ret(token) };
    }

    /// Lets a bound user instance handle the call through one of its virtuals. Returns whether it did.
    unsafe fn forward_virtual(&self, method: &str) -> bool {
        unsafe { interface::dispatch_virtual(self.id, method, self.args, self.ret) }
    }
}

/// Runs the behavior of `def`. Must be called without holding the state lock.
///
/// # Safety
/// See [`PtrCall::new()`].
pub(crate) unsafe fn execute(def: &'static MethodDef, call: &PtrCall) {
    match def.behavior {
        Behavior::Get(prop) => {
            let mut st = state();
            let value = st.objects.get(&call.id).and_then(|object| object.props.get(prop)).cloned();
            match value {
                Some(Prop::Raw(bytes)) => unsafe { call.write_ret_bytes(&bytes) },
                Some(Prop::Text(text)) => unsafe { call.write_ret_string(&mut st, text) },
                other => st.log(LogLevel::Error, format!("{}::{}: no readable property {prop} ({other:?})", def.class, def.name)),
            }
        }

        Behavior::Set(prop) => {
            let Some(&kind) = def.args.first() else {
                return;
            };

            let mut st = state();
            let value = match kind {
                SlotKind::String => Prop::Text(st.string_content(unsafe { call.arg_token(0) })),
                _ => Prop::Raw(unsafe { call.arg_bytes(0, kind.byte_size()) }),
            };

            if let Some(object) = st.objects.get_mut(&call.id) {
                object.props.insert(prop, value);
            }
        }

        Behavior::Custom(f) => unsafe { f(call) },
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Property helpers

fn raw<'a>(object: &'a MockObject, prop: &str) -> &'a [u8] {
    match object.props.get(prop) {
        Some(Prop::Raw(bytes)) => bytes,
        _ => &[],
    }
}

fn read_f64(object: &MockObject, prop: &str) -> f64 {
    let bytes = raw(object, prop);
    match bytes.try_into() {
        Ok(bytes) => f64::from_ne_bytes(bytes),
        Err(_) => 0.0,
    }
}

fn read_reals<const N: usize>(object: &MockObject, prop: &str) -> [real; N] {
    let mut out = [0.0; N];
    let width = std::mem::size_of::<real>();
    for (i, chunk) in raw(object, prop).chunks_exact(width).take(N).enumerate() {
        let mut bytes = [0u8; std::mem::size_of::<real>()];
        bytes.copy_from_slice(chunk);
        out[i] = real::from_ne_bytes(bytes);
    }
    out
}

fn reals_bytes(values: &[real]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

fn with_object<R>(id: u64, f: impl FnOnce(&mut MockObject) -> R) -> Option<R> {
    state().objects.get_mut(&id).map(f)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Object, RefCounted

unsafe fn object_get_class(call: &PtrCall) {
    let mut st = state();
    let class = match st.objects.get(&call.id) {
        Some(object) => st.dynamic_class(object),
        None => return,
    };
    unsafe { call.write_ret_string(&mut st, class) };
}

unsafe fn object_get_instance_id(call: &PtrCall) {
    unsafe { call.write_ret(call.id as i64) };
}

unsafe fn ref_counted_get_reference_count(call: &PtrCall) {
    let count = state().objects.get(&call.id).map_or(0, |object| object.ref_count);
    unsafe { call.write_ret(i64::from(count)) };
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Resources

unsafe fn resource_set_meta_entries(call: &PtrCall) {
    let token = unsafe { call.arg_token(0) };

    let mut st = state();
    let Some(entries) = st.dictionary(token).cloned() else {
        return;
    };
    if let Some(object) = st.objects.get_mut(&call.id) {
        object.props.insert("meta", Prop::Entries(entries));
    }
}

unsafe fn resource_get_meta_entries(call: &PtrCall) {
    let mut st = state();
    let entries = match st.objects.get(&call.id).and_then(|object| object.props.get("meta")) {
        Some(Prop::Entries(entries)) => entries.clone(),
        _ => Vec::new(),
    };
    unsafe { call.write_ret_dictionary(&mut st, entries) };
}

unsafe fn mesh_get_aabb(call: &PtrCall) {
    if unsafe { call.forward_virtual("_get_aabb") } {
        return;
    }

    let aabb = with_object(call.id, |object| {
        let Some(Prop::Surfaces(surfaces)) = object.props.get("surfaces") else {
            return [0.0; 6];
        };
        vertex_bounds(surfaces)
    });

    unsafe { call.write_ret_bytes(&reals_bytes(&aabb.unwrap_or([0.0; 6]))) };
}

fn vertex_bounds(surfaces: &[Vec<u8>]) -> [real; 6] {
    let width = std::mem::size_of::<real>();
    let mut vertices = surfaces.iter().flat_map(|bytes| bytes.chunks_exact(3 * width)).map(|chunk| {
        let mut v = [0.0; 3];
        for (i, component) in chunk.chunks_exact(width).enumerate() {
            let mut bytes = [0u8; std::mem::size_of::<real>()];
            bytes.copy_from_slice(component);
            v[i] = real::from_ne_bytes(bytes);
        }
        v
    });

    let Some(first) = vertices.next() else {
        return [0.0; 6];
    };

    let (min, max) = vertices.fold((first, first), |(mut min, mut max), v| {
        for i in 0..3 {
            min[i] = min[i].min(v[i]);
            max[i] = max[i].max(v[i]);
        }
        (min, max)
    });

    [min[0], min[1], min[2], max[0] - min[0], max[1] - min[1], max[2] - min[2]]
}

unsafe fn mesh_get_surface_count(call: &PtrCall) {
    if unsafe { call.forward_virtual("_get_surface_count") } {
        return;
    }

    let count = with_object(call.id, |object| match object.props.get("surfaces") {
        Some(Prop::Surfaces(surfaces)) => surfaces.len() as i64,
        _ => 0,
    });
    unsafe { call.write_ret(count.unwrap_or(0)) };
}

unsafe fn array_mesh_add_surface(call: &PtrCall) {
    let token = unsafe { call.arg_token(0) };

    let mut st = state();
    let Some(data) = st.packed_data(token) else {
        return;
    };
    if data.kind != SlotKind::Vector3 {
        let kind = data.kind;
        st.log(LogLevel::Error, format!("add_surface_from_vertices: expected Vector3 elements, got {kind:?}"));
        return;
    }

    let bytes = data.bytes().to_vec();
    if let Some(Prop::Surfaces(surfaces)) = st.objects.get_mut(&call.id).and_then(|object| object.props.get_mut("surfaces")) {
        surfaces.push(bytes);
    }
}

unsafe fn array_mesh_surface_get_vertices(call: &PtrCall) {
    let index: i64 = unsafe { call.arg(0) };
    let mut st = state();

    let surface = match st.objects.get(&call.id).and_then(|object| object.props.get("surfaces")) {
        Some(Prop::Surfaces(surfaces)) => usize::try_from(index).ok().and_then(|i| surfaces.get(i)).cloned(),
        _ => None,
    };

    let bytes = match surface {
        Some(bytes) => bytes,
        None => {
            st.log(LogLevel::Error, format!("surface_get_vertices: surface index {index} out of bounds"));
            Vec::new()
        }
    };

    let len = bytes.len() / SlotKind::Vector3.byte_size();
    let data = PackedData::from_bytes(SlotKind::Vector3, len, &bytes);
    unsafe { call.write_ret_packed(&mut st, data) };
}

unsafe fn array_mesh_clear_surfaces(call: &PtrCall) {
    with_object(call.id, |object| {
        object.props.insert("surfaces", Prop::Surfaces(Vec::new()));
    });
}

unsafe fn shape_get_rect(call: &PtrCall) {
    let rect = with_object(call.id, |object| {
        if classes::native_inherits(object.class, "CircleShape2D") {
            let r = read_f64(object, "radius") as real;
            [-r, -r, 2.0 * r, 2.0 * r]
        } else {
            [0.0; 4]
        }
    });

    unsafe { call.write_ret_bytes(&reals_bytes(&rect.unwrap_or([0.0; 4]))) };
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Node tree

unsafe fn node_add_child(call: &PtrCall) {
    let child_ptr: sys::ObjectPtr = unsafe { call.arg(0) };
    let child = crate::state::object_id(child_ptr);

    let mut st = state();
    if child == call.id {
        st.log(LogLevel::Error, "add_child: cannot add a node as its own child");
        return;
    }

    let current_parent = match st.live_object(child, "add_child") {
        Some(child_object) => child_object.parent,
        None => return,
    };
    if let Some(parent) = current_parent {
        st.log(LogLevel::Error, format!("add_child: node {child} already has parent {parent}"));
        return;
    }

    if let Some(child_object) = st.objects.get_mut(&child) {
        child_object.parent = Some(call.id);
    }
    if let Some(object) = st.objects.get_mut(&call.id) {
        object.children.push(child);
    }
}

unsafe fn node_get_child_count(call: &PtrCall) {
    let count = state().objects.get(&call.id).map_or(0, |object| object.children.len());
    unsafe { call.write_ret(count as i64) };
}

unsafe fn node_get_child(call: &PtrCall) {
    let index: i64 = unsafe { call.arg(0) };
    let mut st = state();

    let children = st.objects.get(&call.id).map(|object| object.children.clone()).unwrap_or_default();
    let count = children.len() as i64;
    // Negative indices count from the end.
    let resolved = if index < 0 { index + count } else { index };

    match usize::try_from(resolved).ok().and_then(|i| children.get(i)) {
        Some(&child) => unsafe { call.write_ret(crate::state::object_ptr(child)) },
        None => {
            st.log(LogLevel::Error, format!("get_child: index {index} out of bounds (child count {count})"));
            unsafe { call.write_ret(std::ptr::null_mut::<c_void>()) };
        }
    }
}

unsafe fn node_get_parent(call: &PtrCall) {
    let parent = state().objects.get(&call.id).and_then(|object| object.parent);
    let ptr = parent.map_or(std::ptr::null_mut(), crate::state::object_ptr);
    unsafe { call.write_ret(ptr) };
}

/// Array of the node's groups. The node keeps it and frees it on destruction; callers only borrow it.
fn node_groups_array(st: &mut MockState, id: u64) -> Option<u64> {
    if let Some(Prop::Array(token)) = st.objects.get(&id)?.props.get("groups") {
        return Some(*token);
    }

    let token = st.create_array(Vec::new());
    if let Some(object) = st.objects.get_mut(&id) {
        object.props.insert("groups", Prop::Array(token));
    }
    Some(token)
}

unsafe fn node_add_to_group(call: &PtrCall) {
    let mut st = state();
    let group = MockValue::Text(st.string_content(unsafe { call.arg_token(0) }));

    let Some(token) = node_groups_array(&mut st, call.id) else {
        return;
    };
    if let Some(groups) = st.arrays.get_mut(&token) {
        if !groups.contains(&group) {
            groups.push(group);
        }
    }
}

unsafe fn node_get_groups(call: &PtrCall) {
    let mut st = state();
    let token = node_groups_array(&mut st, call.id).unwrap_or(0);
    unsafe { call.write_ret(token) };
}

unsafe fn node_get_configuration_warnings(call: &PtrCall) {
    if unsafe { call.forward_virtual("_get_configuration_warnings") } {
        return;
    }

    let mut st = state();
    unsafe { call.write_ret_array(&mut st, Vec::new()) };
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// 2D

unsafe fn node2d_get_transform(call: &PtrCall) {
    let transform = with_object(call.id, |object| {
        let rotation = read_f64(object, "rotation") as real;
        let [sx, sy] = read_reals::<2>(object, "scale");
        let [px, py] = read_reals::<2>(object, "position");
        let (sin, cos) = rotation.sin_cos();

        [cos * sx, sin * sx, -sin * sy, cos * sy, px, py]
    });

    let transform = transform.unwrap_or([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    unsafe { call.write_ret_bytes(&reals_bytes(&transform)) };
}

unsafe fn tile_map_set_cell(call: &PtrCall) {
    let layer: i64 = unsafe { call.arg(0) };
    let [x, y]: [i32; 2] = unsafe { call.arg(1) };
    let source: i64 = unsafe { call.arg(2) };

    with_object(call.id, |object| {
        if let Some(Prop::Cells(cells)) = object.props.get_mut("cells") {
            if source < 0 {
                cells.remove(&(layer, x, y));
            } else {
                cells.insert((layer, x, y), source);
            }
        }
    });
}

unsafe fn tile_map_get_cell_source_id(call: &PtrCall) {
    let layer: i64 = unsafe { call.arg(0) };
    let [x, y]: [i32; 2] = unsafe { call.arg(1) };

    let source = with_object(call.id, |object| match object.props.get("cells") {
        Some(Prop::Cells(cells)) => cells.get(&(layer, x, y)).copied(),
        _ => None,
    });
    unsafe { call.write_ret(source.flatten().unwrap_or(-1)) };
}

unsafe fn tile_map_local_to_map(call: &PtrCall) {
    let [x, y]: [real; 2] = unsafe { call.arg(0) };
    let cell = [(x / TILE_SIZE).floor() as i32, (y / TILE_SIZE).floor() as i32];
    unsafe { call.write_ret(cell) };
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// 3D

unsafe fn node3d_set_position(call: &PtrCall) {
    let position: [real; 3] = unsafe { call.arg(0) };
    with_object(call.id, |object| {
        let mut transform = read_reals::<12>(object, "transform");
        if transform == [0.0; 12] {
            transform = IDENTITY_3D;
        }
        transform[9..].copy_from_slice(&position);
        object.props.insert("transform", classes::reals(&transform));
    });
}

unsafe fn node3d_get_position(call: &PtrCall) {
    let transform = with_object(call.id, |object| read_reals::<12>(object, "transform"));
    let transform = transform.unwrap_or(IDENTITY_3D);
    unsafe { call.write_ret_bytes(&reals_bytes(&transform[9..])) };
}

unsafe fn light_set_param(call: &PtrCall) {
    let param: i64 = unsafe { call.arg(0) };
    let value: f64 = unsafe { call.arg(1) };
    with_object(call.id, |object| {
        if let Some(Prop::Params(params)) = object.props.get_mut("params") {
            params.insert(param, value);
        }
    });
}

unsafe fn light_get_param(call: &PtrCall) {
    let param: i64 = unsafe { call.arg(0) };
    let value = with_object(call.id, |object| match object.props.get("params") {
        Some(Prop::Params(params)) => params.get(&param).copied().unwrap_or(0.0),
        _ => 0.0,
    });
    unsafe { call.write_ret(value.unwrap_or(0.0)) };
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Audio

unsafe fn audio_play(call: &PtrCall) {
    let from: f64 = unsafe { call.arg(0) };
    with_object(call.id, |object| {
        object.props.insert("playing", classes::boolean(true));
        object.props.insert("playback_position", classes::float(from.max(0.0)));
    });
}

unsafe fn audio_stop(call: &PtrCall) {
    with_object(call.id, |object| {
        object.props.insert("playing", classes::boolean(false));
        object.props.insert("playback_position", classes::float(0.0));
    });
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Engine

unsafe fn engine_get_frames_drawn(call: &PtrCall) {
    let frames = state().frames_drawn;
    unsafe { call.write_ret(frames) };
}

unsafe fn engine_get_architecture_name(call: &PtrCall) {
    let mut st = state();
    unsafe { call.write_ret_string(&mut st, std::env::consts::ARCH.to_string()) };
}

unsafe fn engine_get_version_info(call: &PtrCall) {
    let (major, minor, patch) = interface::VERSION;
    let int = |value: u32| MockValue::Raw {
        kind: SlotKind::Int,
        bytes: i64::from(value).to_ne_bytes().to_vec(),
    };
    let key = |name: &str| MockValue::Text(name.to_string());

    let entries = vec![
        (key("major"), int(major)),
        (key("minor"), int(minor)),
        (key("patch"), int(patch)),
        (key("string"), MockValue::Text(format!("{major}.{minor}.{patch}"))),
    ];

    let mut st = state();
    unsafe { call.write_ret_dictionary(&mut st, entries) };
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
