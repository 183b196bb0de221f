/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Global balance of native strings, packed arrays, arrays and dictionaries.
//!
//! Kept in its own binary with a single test, so that no other test creates or frees values while counting.

use gdbind_core::builtin::{Array, Dictionary, GString, PackedVector3Array, Variant, Vector3};
use gdbind_core::classes::{ArrayMesh, ArrayMeshApi, Engine, EngineApi, Node, NodeApi, ResourceApi};
use gdbind_core::init::{self, InitConfig};
use gdbind_core::obj::Gd;

#[test]
fn values_crossing_the_boundary_are_released() {
    let (interface, library) = gdbind_mock::install();
    if let Err(err) = unsafe { init::initialize(interface, library, InitConfig::default()) } {
        panic!("binding failed to initialize against the mock engine: {err}");
    }

    let strings = gdbind_mock::string_count();
    let packed_arrays = gdbind_mock::packed_array_count();
    let arrays = gdbind_mock::array_count();
    let dictionaries = gdbind_mock::dictionary_count();

    {
        let mut node = Gd::<Node>::new_alloc();
        for name in ["first", "second", "third"] {
            let name = GString::from(name);
            node.set_name(&name);
            assert_eq!(node.get_name(), name);
        }

        // Properties keep a copy of the content, not the string passed in.
        assert_eq!(gdbind_mock::string_count(), strings);
        node.free();

        let mut mesh = Gd::<ArrayMesh>::new_gd();
        let vertices = PackedVector3Array::from(vec![Vector3::ONE; 4]);
        mesh.add_surface_from_vertices(&vertices);

        let copy = mesh.surface_get_vertices(0);
        let _ = copy.clone();
        assert_eq!(copy, vertices);

        mesh.set_resource_name(&GString::from("quad"));
        let _ = mesh.get_resource_name();

        // String elements are copied in and out.
        let mut tags: Array = ["solid", "quad"].into_iter().collect();
        tags.set(0, "hollow");
        let _ = tags.clone().to_vec();

        let meta: Dictionary = [("tags", Variant::Int(2)), ("name", Variant::from("quad"))].into_iter().collect();
        mesh.set_meta_entries(&meta);
        assert_eq!(mesh.get_meta_entries(), meta);
        let _ = meta.keys_array();

        let mut grouped = Gd::<Node>::new_alloc();
        grouped.add_to_group(&GString::from("walls"));
        assert_eq!(grouped.get_groups().len(), 1);
        grouped.free();

        let _ = Engine::singleton().get_version_info().to_vec();
    }

    assert_eq!(gdbind_mock::string_count(), strings, "strings leaked");
    assert_eq!(gdbind_mock::packed_array_count(), packed_arrays, "packed arrays leaked");
    assert_eq!(gdbind_mock::array_count(), arrays, "arrays leaked");
    assert_eq!(gdbind_mock::dictionary_count(), dictionaries, "dictionaries leaked");
    assert!(gdbind_mock::violations().is_empty(), "{:?}", gdbind_mock::violations());
}
