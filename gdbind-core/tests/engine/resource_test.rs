/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind_core::assert_eq_approx;
use gdbind_core::builtin::{Aabb, PackedVector3Array, Rect2, Vector2, Vector3};
use gdbind_core::classes::{
    ArrayMesh, ArrayMeshApi, AudioStreamPlayer, AudioStreamPlayerApi, CircleShape2D, CircleShape2DApi, MeshApi, Shape2DApi,
};
use gdbind_core::obj::Gd;

use crate::framework::setup;

#[test]
fn mesh_bounds_cover_all_surfaces() {
    setup();

    let mut mesh = Gd::<ArrayMesh>::new_gd();
    assert_eq!(mesh.get_aabb(), Aabb::default());

    mesh.add_surface_from_vertices(&PackedVector3Array::from(vec![Vector3::new(1.0, 1.0, 1.0), Vector3::new(2.0, 0.0, 1.5)]));
    mesh.add_surface_from_vertices(&PackedVector3Array::from(vec![Vector3::new(-1.0, 3.0, 0.0)]));
    assert_eq!(mesh.get_surface_count(), 2);

    let expected = Aabb::new(Vector3::new(-1.0, 0.0, 0.0), Vector3::new(3.0, 3.0, 1.5));
    assert_eq_approx!(mesh.get_aabb(), expected);

    mesh.clear_surfaces();
    assert_eq!(mesh.get_surface_count(), 0);
}

#[test]
fn circle_shape_rect() {
    setup();

    let mut shape = Gd::<CircleShape2D>::new_gd();
    assert_eq!(shape.get_radius(), 10.0);

    shape.set_radius(2.5);
    assert_eq!(shape.get_radius(), 2.5);
    assert_eq_approx!(shape.get_rect(), Rect2::new(Vector2::new(-2.5, -2.5), Vector2::new(5.0, 5.0)));
}

#[test]
fn audio_player_playback() {
    setup();

    let mut player = Gd::<AudioStreamPlayer>::new_alloc();
    assert!(!player.is_playing());
    assert_eq!(player.get_pitch_scale(), 1.0);

    // Single precision on the Rust side, widened to double on the wire.
    player.set_volume_db(-6.5);
    assert_eq!(player.get_volume_db(), -6.5);

    player.play(1.25);
    assert!(player.is_playing());
    assert_eq!(player.get_playback_position(), 1.25);

    player.stop();
    assert!(!player.is_playing());
    assert_eq!(player.get_playback_position(), 0.0);

    player.free();
}
