/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind_core::classes::{
    ArrayMesh, Engine, EngineApi, Mesh, Node, Node2D, Object, ObjectApi, RefCounted, RefCountedApi, Resource, TileMap,
};
use gdbind_core::obj::{Gd, InstanceId, Ownership};

use crate::framework::{expect_panic, id_of, setup};

#[test]
fn upcast_keeps_identity() {
    setup();

    let node = Gd::<TileMap>::new_alloc();
    let id = node.instance_id();

    let object: Gd<Object> = node.upcast::<Node2D>().upcast();
    assert_eq!(object.instance_id(), id);
    assert_eq!(object.get_class(), "TileMap");
    assert_eq!(object.ownership(), Ownership::Owned);

    object.free();
    assert!(!gdbind_mock::is_alive(id.to_u64()));
}

#[test]
fn try_cast_follows_engine_hierarchy() {
    setup();

    let object: Gd<Object> = Gd::<Node2D>::new_alloc().upcast();

    let object = match object.try_cast::<Mesh>() {
        Ok(mesh) => panic!("Node2D must not cast to Mesh: {mesh:?}"),
        Err(original) => original,
    };

    let node = object.try_cast::<Node>().expect("Node2D is a Node");
    let node2d = node.cast::<Node2D>();
    assert_eq!(node2d.get_class(), "Node2D");

    node2d.free();
}

#[test]
fn cast_panics_on_wrong_class() {
    setup();

    let node = Gd::<Node>::new_alloc();
    let id = node.instance_id();
    let borrowed = Gd::<Node>::from_instance_id(id);

    expect_panic("cast Node to TileMap", "TileMap", move || {
        let _ = borrowed.cast::<TileMap>();
    });

    node.free();
}

#[test]
fn from_instance_id() {
    setup();

    let node = Gd::<Node2D>::new_alloc();
    let id = node.instance_id();

    let found = Gd::<Node>::from_instance_id(id);
    assert_eq!(found.ownership(), Ownership::Borrowed);
    assert_eq!(found.get_class(), "Node2D");

    assert!(Gd::<Mesh>::try_from_instance_id(id).is_err());

    node.free();
    assert!(!id.is_alive());
    assert!(Gd::<Node>::try_from_instance_id(id).is_err());
    assert!(!found.is_instance_valid());
}

#[test]
fn from_instance_id_ref_counted_takes_reference() {
    setup();

    let mesh = Gd::<ArrayMesh>::new_gd();
    assert_eq!(mesh.get_reference_count(), 1);

    let found = Gd::<Resource>::from_instance_id(mesh.instance_id());
    assert_eq!(found.ownership(), Ownership::Owned);
    assert_eq!(mesh.get_reference_count(), 2);

    drop(found);
    assert_eq!(mesh.get_reference_count(), 1);
}

#[test]
fn instance_id_zero_is_none() {
    assert_eq!(InstanceId::try_from_u64(0), None);
    assert!(InstanceId::try_from_u64(42).is_some());
}

#[test]
fn new_alloc_rejects_ref_counted() {
    setup();

    expect_panic("new_alloc on RefCounted", "new_gd()", || {
        let _ = Gd::<RefCounted>::new_alloc();
    });
    expect_panic("new_gd on Node", "new_alloc()", || {
        let _ = Gd::<Node>::new_gd();
    });
}

#[test]
fn ref_counted_clone_takes_reference() {
    setup();

    let first = Gd::<RefCounted>::new_gd();
    let id = id_of(&first);

    let second = first.clone();
    assert_eq!(second.ownership(), Ownership::Owned);
    assert_eq!(gdbind_mock::reference_count(id), Some(2));

    drop(first);
    assert_eq!(gdbind_mock::reference_count(id), Some(1));
    assert!(second.is_instance_valid());

    drop(second);
    assert!(!gdbind_mock::is_alive(id));
    assert_eq!(gdbind_mock::unreference_count(id), 2);
    assert_eq!(gdbind_mock::destroy_count(id), 1);
    assert!(gdbind_mock::violations_of(id).is_empty());
}

#[test]
fn engine_singleton() {
    setup();

    let mut engine = Engine::singleton();
    assert_eq!(engine.ownership(), Ownership::Borrowed);

    let before = engine.get_frames_drawn();
    gdbind_mock::advance_frames(3);
    assert!(engine.get_frames_drawn() >= before + 3);

    assert_eq!(engine.get_architecture_name(), std::env::consts::ARCH);

    engine.set_time_scale(1.0);
    assert_eq!(engine.get_time_scale(), 1.0);

    // Same object each time, never released by the host.
    let again = Engine::singleton();
    assert_eq!(again, engine);
    drop(again);
    drop(engine);
    assert!(Engine::singleton().is_instance_valid());
}
