/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind_core::classes::{ArrayMesh, Mesh, MeshApi, Node, Node2D, Node2DApi, NodeApi};
use gdbind_core::obj::{Gd, Ownership};

use crate::framework::{expect_panic, id_of, setup};

#[test]
fn owner_and_borrower_release_once() {
    setup();

    let owner = Gd::<Node>::new_alloc();
    let id = id_of(&owner);

    let borrower = owner.clone();
    assert_eq!(owner.ownership(), Ownership::Owned);
    assert_eq!(borrower.ownership(), Ownership::Borrowed);

    drop(owner);
    assert_eq!(gdbind_mock::destroy_count(id), 1);

    drop(borrower);
    assert_eq!(gdbind_mock::destroy_count(id), 1);
    assert!(gdbind_mock::violations_of(id).is_empty());
}

#[test]
fn upcast_moves_reference() {
    setup();

    let mesh = Gd::<ArrayMesh>::new_gd();
    let mesh_id = id_of(&mesh);

    // The single reference moves over; nothing is taken or released.
    let mesh: Gd<Mesh> = mesh.upcast();
    assert_eq!(gdbind_mock::reference_count(mesh_id), Some(1));
    assert_eq!(mesh.get_surface_count(), 0);

    drop(mesh);
    assert_eq!(gdbind_mock::unreference_count(mesh_id), 1);
    assert_eq!(gdbind_mock::destroy_count(mesh_id), 1);
    assert!(gdbind_mock::violations_of(mesh_id).is_empty());
}

#[test]
fn borrowed_child_is_not_released() {
    setup();

    let mut parent = Gd::<Node>::new_alloc();
    let child = Gd::<Node2D>::new_alloc();
    let child_id = id_of(&child);
    parent.add_child(child.upcast());

    let borrowed = parent.get_child(0).expect("child exists");
    assert_eq!(borrowed.ownership(), Ownership::Borrowed);
    drop(borrowed);

    assert!(gdbind_mock::is_alive(child_id));
    assert_eq!(gdbind_mock::destroy_count(child_id), 0);

    parent.free();
    assert_eq!(gdbind_mock::destroy_count(child_id), 1);
    assert!(gdbind_mock::violations_of(child_id).is_empty());
}

#[test]
fn transferred_child_is_freed_by_engine_only() {
    setup();

    let mut parent = Gd::<Node>::new_alloc();
    let parent_id = id_of(&parent);

    let child = Gd::<Node>::new_alloc();
    let child_id = id_of(&child);
    parent.add_child(child);
    assert_eq!(gdbind_mock::parent_of(child_id), Some(parent_id));

    parent.free();
    assert_eq!(gdbind_mock::destroy_count(parent_id), 1);
    assert_eq!(gdbind_mock::destroy_count(child_id), 1);
    assert!(gdbind_mock::violations_of(child_id).is_empty());
}

#[test]
fn free_on_borrowed_child_panics() {
    setup();

    let mut parent = Gd::<Node>::new_alloc();
    parent.add_child(Gd::<Node>::new_alloc());

    let child = parent.get_child(0).expect("child exists");
    let child_id = id_of(&child);

    expect_panic("free() on borrowed child", "ownership violation", move || child.free());
    assert!(gdbind_mock::is_alive(child_id));

    parent.free();
    assert_eq!(gdbind_mock::destroy_count(child_id), 1);
    assert!(gdbind_mock::violations_of(child_id).is_empty());
}

#[test]
fn free_on_ref_counted_panics() {
    setup();

    let mesh: Gd<Mesh> = Gd::<ArrayMesh>::new_gd().upcast();
    let id = id_of(&mesh);
    let object = mesh.clone().upcast::<gdbind_core::classes::Object>();

    expect_panic("free() on RefCounted", "reference-counted", move || object.free());

    drop(mesh);
    assert!(!gdbind_mock::is_alive(id));
    assert!(gdbind_mock::violations_of(id).is_empty());
}

#[test]
#[cfg(debug_assertions)]
fn call_on_freed_object_panics() {
    setup();

    let mut parent = Gd::<Node>::new_alloc();
    parent.add_child(Gd::<Node2D>::new_alloc().upcast());
    let child = parent.get_child(0).expect("child exists").cast::<Node2D>();
    let child_id = id_of(&child);

    // The engine frees the tree; the host still holds a borrowed pointer.
    let parent_id = id_of(&parent);
    gdbind_mock::destroy_object(parent_id);
    std::mem::forget(parent);

    assert!(!child.is_instance_valid());
    expect_panic("call on freed child", "invalid receiver in Node2D::get_position", move || {
        let _ = child.get_position();
    });

    assert!(gdbind_mock::violations_of(child_id).is_empty());
}
