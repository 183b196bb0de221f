/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind_core::assert_eq_approx;
use gdbind_core::builtin::{Basis, Color, Transform3D, Vector3};
use gdbind_core::classes::{Light3D, Light3DApi, Node3D, Node3DApi, VisualInstance3DApi};
use gdbind_core::obj::Gd;

use crate::framework::setup;

const PARAM_ENERGY: i64 = 0;

#[test]
fn node3d_position_and_transform() {
    setup();

    let mut node = Gd::<Node3D>::new_alloc();
    assert_eq!(node.get_transform(), Transform3D::IDENTITY);

    node.set_position(Vector3::new(1.0, -2.0, 3.5));
    assert_eq!(node.get_position(), Vector3::new(1.0, -2.0, 3.5));
    assert_eq!(node.get_transform().origin, Vector3::new(1.0, -2.0, 3.5));

    let scaled = Transform3D::new(
        Basis::from_rows(Vector3::new(2.0, 0.0, 0.0), Vector3::new(0.0, 2.0, 0.0), Vector3::new(0.0, 0.0, 2.0)),
        Vector3::new(0.0, 5.0, 0.0),
    );
    node.set_transform(scaled);
    assert_eq_approx!(node.get_transform(), scaled);
    assert_eq!(node.get_position(), Vector3::new(0.0, 5.0, 0.0));

    node.free();
}

#[test]
fn light_inherits_spatial_methods() {
    setup();

    let mut light = Gd::<Light3D>::new_alloc();
    light.set_position(Vector3::UP);
    assert_eq!(light.get_position(), Vector3::UP);

    assert_eq!(light.get_layer_mask(), 1);
    light.set_layer_mask(0b1010);
    assert_eq!(light.get_layer_mask(), 0b1010);

    light.free();
}

#[test]
fn light_color_and_params() {
    setup();

    let mut light = Gd::<Light3D>::new_alloc();
    assert_eq!(light.get_color(), Color::WHITE);
    assert_eq!(light.get_param(PARAM_ENERGY), 1.0);

    light.set_color(Color::from_rgb(1.0, 0.5, 0.0));
    light.set_param(PARAM_ENERGY, 16.0);
    light.set_param(3, 0.25);

    assert_eq!(light.get_color(), Color::from_rgb(1.0, 0.5, 0.0));
    assert_eq!(light.get_param(PARAM_ENERGY), 16.0);
    assert_eq!(light.get_param(3), 0.25);

    light.free();
}
