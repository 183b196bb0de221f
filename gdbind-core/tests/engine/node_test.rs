/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind_core::assert_eq_approx;
use gdbind_core::builtin::real_consts::FRAC_PI_2;
use gdbind_core::builtin::{Transform2D, Vector2, Vector2i};
use gdbind_core::classes::{CanvasItemApi, Node, Node2D, Node2DApi, NodeApi, ObjectApi, TileMap, TileMapApi};
use gdbind_core::obj::Gd;

use crate::framework::{id_of, setup};

#[test]
fn node2d_position_round_trip() {
    setup();

    let mut node = Gd::<Node2D>::new_alloc();
    node.set_position(Vector2::new(3.0, 4.0));

    // Exact: the vector crosses the boundary bit for bit.
    assert_eq!(node.get_position(), Vector2::new(3.0, 4.0));

    node.free();
}

#[test]
fn node2d_defaults() {
    setup();

    let node = Gd::<Node2D>::new_alloc();
    assert_eq!(node.get_position(), Vector2::ZERO);
    assert_eq!(node.get_scale(), Vector2::ONE);
    assert_eq!(node.get_rotation(), 0.0);
    assert!(node.is_visible());
    assert_eq!(node.get_class(), "Node2D");

    node.free();
}

#[test]
fn node2d_transform_composes() {
    setup();

    let mut node = Gd::<Node2D>::new_alloc();
    node.set_position(Vector2::new(10.0, -2.0));
    node.set_rotation(FRAC_PI_2 as f64);
    node.set_scale(Vector2::new(2.0, 3.0));

    let expected = Transform2D::from_cols(Vector2::new(0.0, 2.0), Vector2::new(-3.0, 0.0), Vector2::new(10.0, -2.0));
    assert_eq_approx!(node.get_transform(), expected);

    node.free();
}

#[test]
fn bool_round_trip() {
    setup();

    let mut node = Gd::<Node2D>::new_alloc();
    node.set_visible(false);
    assert!(!node.is_visible());
    node.set_visible(true);
    assert!(node.is_visible());

    node.free();
}

#[test]
fn instance_id_matches_engine() {
    setup();

    let node = Gd::<Node>::new_alloc();
    assert_eq!(node.get_instance_id(), id_of(&node) as i64);
    assert!(node.is_instance_valid());

    node.free();
}

#[test]
fn tree_children_and_parent() {
    setup();

    let mut parent = Gd::<Node>::new_alloc();
    let first = Gd::<Node2D>::new_alloc();
    let second = Gd::<Node>::new_alloc();
    let first_id = id_of(&first);

    parent.add_child(first.upcast());
    parent.add_child(second);
    assert_eq!(parent.get_child_count(), 2);

    let child = parent.get_child(0).expect("child 0 exists");
    assert_eq!(id_of(&child), first_id);
    assert_eq!(child.get_parent(), Some(parent.clone()));

    // Negative indices count from the end.
    let last = parent.get_child(-1).expect("last child exists");
    assert_eq!(last.get_class(), "Node");

    assert!(parent.get_child(5).is_none());
    assert!(parent.get_parent().is_none());

    parent.free();
    assert!(!gdbind_mock::is_alive(first_id));
}

#[test]
fn tile_map_cells() {
    setup();

    let mut map = Gd::<TileMap>::new_alloc();
    let coords = Vector2i::new(-3, 7);

    assert_eq!(map.get_cell_source_id(0, coords), -1);

    map.set_cell(0, coords, 4);
    assert_eq!(map.get_cell_source_id(0, coords), 4);
    assert_eq!(map.get_cell_source_id(1, coords), -1);

    map.set_cell(0, coords, -1);
    assert_eq!(map.get_cell_source_id(0, coords), -1);

    map.free();
}

#[test]
fn tile_map_local_to_map() {
    setup();

    let map = Gd::<TileMap>::new_alloc();
    assert_eq!(map.local_to_map(Vector2::new(40.0, 15.9)), Vector2i::new(2, 0));
    assert_eq!(map.local_to_map(Vector2::new(-0.5, -16.0)), Vector2i::new(-1, -1));

    map.free();
}
