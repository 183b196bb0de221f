/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Often-imported symbols.

pub use super::builtin::{
    Aabb, Array, Basis, Color, Dictionary, GString, PackedArray, PackedByteArray, PackedColorArray, PackedFloat32Array, PackedFloat64Array,
    PackedInt32Array, PackedInt64Array, PackedVector2Array, PackedVector3Array, Rect2, Transform2D, Transform3D, Vector2,
    Variant, Vector2i, Vector3, Vector3i,
};
pub use super::classes::{
    ArrayMesh, AudioStreamPlayer, CanvasItem, CircleShape2D, Engine, Light3D, Mesh, Node, Node2D, Node3D, Object,
    RefCounted, Resource, Shape2D, TileMap, VisualInstance3D,
};
pub use super::meta::error::{CallError, CallErrorKind, ConvertError};
pub use super::obj::{Base, Gd, GdClass, GdMut, GdRef, Inherits, InstanceId, Ownership, UserClass};
pub use super::registry::{register_class, register_instance_override, ClassBuilder};
pub use super::{gd_error, gd_print, gd_warn, user_class};

// Make trait methods available.
pub use super::classes::prelude::*;
