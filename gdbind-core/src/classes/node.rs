/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::{Array, Color, GString, Transform2D, Vector2, Vector2i};
use crate::classes::Object;
use crate::obj::Gd;

crate::engine_class! {
    /// Element of the scene tree. Manually managed; a node added as child is owned by its parent.
    class Node: Object;
    ref_counted = false;
    api NodeApi;

    virtuals {
        fn _ready();
        fn _process(f64);
        fn _get_configuration_warnings() -> Array;
    }

    methods {
        fn set_name(&mut self, name: &GString);
        fn get_name(&self) -> GString;

        /// Adds `node` as last child. The parent takes ownership: `node` is freed together with it.
        fn add_child(&mut self, node: Gd<Node>);

        fn get_child_count(&self) -> i64;

        /// Child at `index`, or `None` if out of range. The child stays owned by this node.
        fn get_child(&self, index: i64) -> Option<Gd<Node>> [borrowed];

        fn get_parent(&self) -> Option<Gd<Node>> [borrowed];

        fn add_to_group(&mut self, group: &GString);

        /// Names of the groups the node is in. The node keeps its own array; the result is a copy.
        fn get_groups(&self) -> Array [borrowed];

        /// Problems with the node's setup. Calls `_get_configuration_warnings` for user classes that override it.
        fn get_configuration_warnings(&self) -> Array;
    }
}

crate::engine_class! {
    class CanvasItem: Node, Object;
    ref_counted = false;
    api CanvasItemApi;

    virtuals {
        fn _draw();
    }

    methods {
        fn set_visible(&mut self, visible: bool);
        fn is_visible(&self) -> bool;
        fn set_modulate(&mut self, modulate: Color);
        fn get_modulate(&self) -> Color;
    }
}

crate::engine_class! {
    /// 2D scene node with position, rotation (radians) and scale.
    class Node2D: CanvasItem, Node, Object;
    ref_counted = false;
    api Node2DApi;

    virtuals {}

    methods {
        fn set_position(&mut self, position: Vector2);
        fn get_position(&self) -> Vector2;
        fn set_rotation(&mut self, radians: f64);
        fn get_rotation(&self) -> f64;
        fn set_scale(&mut self, scale: Vector2);
        fn get_scale(&self) -> Vector2;

        /// Local transform, composed of position, rotation and scale.
        fn get_transform(&self) -> Transform2D;
    }
}

crate::engine_class! {
    /// Grid of tiles on top of a [`Node2D`].
    class TileMap: Node2D, CanvasItem, Node, Object;
    ref_counted = false;
    api TileMapApi;

    virtuals {}

    methods {
        fn set_cell(&mut self, layer: i32, coords: Vector2i, source_id: i32);

        /// Source of the tile at `coords`, or -1 for an empty cell.
        fn get_cell_source_id(&self, layer: i32, coords: Vector2i) -> i32;

        /// Cell containing the local position `local`.
        fn local_to_map(&self, local: Vector2) -> Vector2i;
    }
}
