/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind_core::builtin::{real, Vector2};
use gdbind_core::classes::{Node2D, Node2DApi};
use gdbind_core::init::{self, InitConfig};
use gdbind_core::meta::error::CallErrorKind;
use gdbind_core::obj::Gd;
use gdbind_core::registry::BindKey;
use gdbind_core::sys;

use crate::framework::setup;

#[test]
fn all_declared_binds_resolve() {
    setup();

    assert!(init::is_initialized());
    assert!(init::verify_binds().is_ok());

    let keys = init::declared_binds();
    assert!(keys.iter().any(|key| key.class == "Node2D" && key.method == "set_position"));
    assert!(keys.iter().any(|key| key.class == "Engine" && key.method == "get_architecture_name"));
}

#[test]
fn declared_binds_are_unique() {
    let keys = init::declared_binds();
    for (i, key) in keys.iter().enumerate() {
        let duplicate = keys[..i].iter().any(|other| other.class == key.class && other.method == key.method);
        assert!(!duplicate, "{}::{} declared twice", key.class, key.method);
    }
}

#[test]
fn binds_are_looked_up_once() {
    setup();

    let mut node = Gd::<Node2D>::new_alloc();
    for i in 0..10 {
        node.set_scale(Vector2::new(i as real, 1.0));
        let _ = node.get_scale();
    }
    node.free();

    assert_eq!(gdbind_mock::bind_lookups("Node2D", "set_scale"), 1);
    assert_eq!(gdbind_mock::bind_lookups("Node2D", "get_scale"), 1);
}

#[test]
fn missing_binds_are_all_reported() {
    setup();

    let keys = [
        BindKey::new("Node2D", "look_at", 0x0bad_f00d),
        BindKey::new("Node2D", "get_position", sys::signature_hash(sys::SlotKind::Vector2, &[])),
        BindKey::new("Node", "teleport", 7),
        BindKey::new("NoSuchClass", "get_name", 1),
    ];

    let err = init::runtime().binds.verify(&keys).expect_err("binds must be missing");
    assert_eq!(err.missing().len(), 3);
    assert!(err.missing().iter().all(|e| e.kind() == CallErrorKind::BindNotFound));
    assert_eq!(err.missing()[1].class_name(), Some("Node"));
    assert_eq!(err.missing()[1].method_name(), "teleport");

    let message = err.to_string();
    assert!(message.contains("3 method bind(s) missing"), "{message}");
    assert!(message.contains("Node::teleport"), "{message}");
    assert!(message.contains("NoSuchClass::get_name"), "{message}");
}

#[test]
fn resolved_bind_rejects_other_signature() {
    setup();

    let wrong = sys::signature_hash(sys::SlotKind::Vector3, &[]);
    let err = init::runtime()
        .binds
        .verify(&[BindKey::new("Node2D", "get_position", wrong)])
        .expect_err("signature differs from resolved bind");

    assert_eq!(err.missing()[0].kind(), CallErrorKind::ArgumentFrameMismatch);
}

#[test]
fn packed_array_element_is_part_of_signature() {
    setup();

    let binds = &init::runtime().binds;
    let returns = |kind| sys::signature_hash(kind, &[sys::SlotKind::Int]);
    let vertices = BindKey::new("ArrayMesh", "surface_get_vertices", returns(sys::SlotKind::PackedVector3Array));
    let colors = BindKey::new("ArrayMesh", "surface_get_vertices", returns(sys::SlotKind::PackedColorArray));

    assert_ne!(vertices.hash, colors.hash);
    assert!(binds.verify(&[vertices]).is_ok());

    let err = binds.verify(&[colors]).expect_err("color array where vertices are returned");
    assert_eq!(err.missing()[0].kind(), CallErrorKind::ArgumentFrameMismatch);
}

#[test]
fn reinitialize_with_same_table() {
    setup();

    let (interface, library) = gdbind_mock::install();
    let config = InitConfig { verify_binds: false };

    // SAFETY: same static table and library as the first initialization.
    let result = unsafe { init::initialize(interface, library, config) };
    assert!(result.is_ok());
    assert!(init::try_runtime().is_some());
}
