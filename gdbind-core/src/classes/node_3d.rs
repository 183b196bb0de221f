/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::{Color, Transform3D, Vector3};
use crate::classes::{Node, Object};

crate::engine_class! {
    class Node3D: Node, Object;
    ref_counted = false;
    api Node3DApi;

    virtuals {}

    methods {
        fn set_position(&mut self, position: Vector3);
        fn get_position(&self) -> Vector3;
        fn set_transform(&mut self, transform: Transform3D);
        fn get_transform(&self) -> Transform3D;
    }
}

crate::engine_class! {
    class VisualInstance3D: Node3D, Node, Object;
    ref_counted = false;
    api VisualInstance3DApi;

    virtuals {}

    methods {
        /// Render layers this instance is drawn on, one bit per layer.
        fn set_layer_mask(&mut self, mask: i64);
        fn get_layer_mask(&self) -> i64;
    }
}

crate::engine_class! {
    class Light3D: VisualInstance3D, Node3D, Node, Object;
    ref_counted = false;
    api Light3DApi;

    virtuals {}

    methods {
        fn set_color(&mut self, color: Color);
        fn get_color(&self) -> Color;

        /// Sets one of the numeric light parameters (energy, range, ...), identified by index.
        fn set_param(&mut self, param: i64, value: f64);
        fn get_param(&self, param: i64) -> f64;
    }
}
