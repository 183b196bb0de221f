/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind_core::assert_eq_approx;
use gdbind_core::builtin::{Color, GString, PackedByteArray, PackedInt64Array, PackedVector3Array, Vector3};
use gdbind_core::classes::prelude::*;
use gdbind_core::classes::{ArrayMesh, Node2D, Resource};
use gdbind_core::obj::Gd;

use crate::framework::setup;

#[test]
fn string_round_trip() {
    setup();

    let mut resource = Gd::<Resource>::new_gd();
    assert_eq!(resource.get_resource_name(), "");

    let name = GString::from("crate_wood");
    resource.set_resource_name(&name);

    // The argument stays usable after the call.
    assert_eq!(name, "crate_wood");
    assert_eq!(resource.get_resource_name(), name);
}

#[test]
fn string_non_ascii() {
    setup();

    let mut node = Gd::<Node2D>::new_alloc();
    let text = "Ärger über Ünïcödé ✓";

    node.set_name(&GString::from(text));
    let name = node.get_name();

    assert_eq!(name.len(), text.len());
    assert_eq!(name.try_to_string().unwrap(), text);
    assert_eq!(name.to_string(), text);

    node.free();
}

#[test]
fn string_clone_is_independent() {
    setup();

    let original = GString::from("left");
    let copy = original.clone();
    drop(original);

    assert_eq!(copy, "left");
    assert_eq!(format!("{copy:?}"), "GString(\"left\")");
}

#[test]
fn packed_array_round_trip() {
    setup();

    let mut mesh = Gd::<ArrayMesh>::new_gd();
    let vertices = PackedVector3Array::from(vec![
        Vector3::new(-1.0, 0.0, 2.0),
        Vector3::new(3.0, 4.0, -5.0),
        Vector3::new(0.5, 0.5, 0.5),
    ]);

    mesh.add_surface_from_vertices(&vertices);
    assert_eq!(mesh.get_surface_count(), 1);

    let back = mesh.surface_get_vertices(0);
    assert_eq!(back, vertices);
    assert_eq!(back.len(), 3);
    assert_eq!(back.get(1), Some(Vector3::new(3.0, 4.0, -5.0)));
    assert_eq!(back.get(3), None);
}

#[test]
fn packed_array_empty() {
    setup();

    let mut mesh = Gd::<ArrayMesh>::new_gd();
    mesh.add_surface_from_vertices(&PackedVector3Array::new());

    let back = mesh.surface_get_vertices(0);
    assert!(back.is_empty());
    assert_eq!(back.to_vec(), Vec::<Vector3>::new());
}

#[test]
fn packed_array_out_of_range_surface() {
    setup();

    let mesh = Gd::<ArrayMesh>::new_gd();
    let back = mesh.surface_get_vertices(17);

    assert!(back.is_empty());
    assert!(gdbind_mock::has_log(
        gdbind_mock::LogLevel::Error,
        "surface index 17 out of bounds"
    ));
}

#[test]
fn packed_array_element_kinds() {
    setup();

    let bytes = PackedByteArray::from(&[1u8, 2, 255][..]);
    assert_eq!(bytes.to_vec(), vec![1, 2, 255]);

    let ints = PackedInt64Array::from(vec![i64::MIN, 0, i64::MAX]);
    assert_eq!(ints.get(0), Some(i64::MIN));
    assert_eq!(ints.get(2), Some(i64::MAX));
    assert_eq!(ints.clone(), ints);
}

#[test]
fn color_round_trip() {
    setup();

    let mut node = Gd::<Node2D>::new_alloc();
    assert_eq!(node.get_modulate(), Color::WHITE);

    let tint = Color::from_rgba(0.25, 0.5, 0.75, 0.125);
    node.set_modulate(tint);
    assert_eq_approx!(node.get_modulate(), tint);

    node.free();
}
