/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::{Aabb, Dictionary, GString, PackedVector3Array, Rect2};
use crate::classes::{Object, RefCounted};

crate::engine_class! {
    class Resource: RefCounted, Object;
    ref_counted = true;
    api ResourceApi;

    virtuals {}

    methods {
        fn set_resource_name(&mut self, name: &GString);
        fn get_resource_name(&self) -> GString;

        /// Replaces the resource's metadata with a copy of `entries`.
        fn set_meta_entries(&mut self, entries: &Dictionary);
        fn get_meta_entries(&self) -> Dictionary;
    }
}

crate::engine_class! {
    /// Geometry resource. User classes can provide their own geometry by overriding `_get_aabb` and `_get_surface_count`.
    class Mesh: Resource, RefCounted, Object;
    ref_counted = true;
    api MeshApi;

    virtuals {
        fn _get_aabb() -> Aabb;
        fn _get_surface_count() -> i64;
    }

    methods {
        /// Bounding box of all surfaces. Calls `_get_aabb` for user classes that override it.
        fn get_aabb(&self) -> Aabb;

        fn get_surface_count(&self) -> i64;
    }
}

crate::engine_class! {
    class ArrayMesh: Mesh, Resource, RefCounted, Object;
    ref_counted = true;
    api ArrayMeshApi;

    virtuals {}

    methods {
        /// Adds a surface made of `vertices`.
        fn add_surface_from_vertices(&mut self, vertices: &PackedVector3Array);

        fn surface_get_vertices(&self, surface: i64) -> PackedVector3Array;

        fn clear_surfaces(&mut self);
    }
}

crate::engine_class! {
    class Shape2D: Resource, RefCounted, Object;
    ref_counted = true;
    api Shape2DApi;

    virtuals {}

    methods {
        /// Rectangle enclosing the shape, in local coordinates.
        fn get_rect(&self) -> Rect2;
    }
}

crate::engine_class! {
    class CircleShape2D: Shape2D, Resource, RefCounted, Object;
    ref_counted = true;
    api CircleShape2DApi;

    virtuals {}

    methods {
        fn set_radius(&mut self, radius: f64);
        fn get_radius(&self) -> f64;
    }
}
