/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::Once;

use gdbind_core::builtin::{Array, Color, Dictionary, GString, Variant, Vector2i, Vector3};
use gdbind_core::classes::prelude::*;
use gdbind_core::classes::{Engine, Node, Object, Resource};
use gdbind_core::obj::{Base, Gd, UserClass};
use gdbind_core::registry::{register_class, ClassBuilder};
use gdbind_core::user_class;

use crate::framework::{expect_panic, id_of, setup};

/// Node that reports one warning per missing child.
struct Spawner {
    _base: Base<Node>,
    expected_children: i64,
}

user_class!(Spawner: Node, Object);

impl UserClass for Spawner {
    fn init(base: Base<Node>) -> Self {
        Self {
            _base: base,
            expected_children: 2,
        }
    }

    fn register(builder: &mut ClassBuilder<Self>) {
        builder.virtual_method("_get_configuration_warnings", |this: &Spawner, ()| {
            (0..this.expected_children)
                .map(|i| format!("missing child {i}"))
                .map(|text| Variant::from(text.as_str()))
                .collect::<Array>()
        });
    }
}

fn setup_classes() {
    static REGISTER: Once = Once::new();

    setup();
    REGISTER.call_once(register_class::<Spawner>);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Array

#[test]
fn array_push_get_set() {
    setup();

    let mut array = Array::new();
    assert!(array.is_empty());

    array.push(7);
    array.push("seven");
    array.push(Vector2i::new(7, -7));
    array.push(Variant::nil());

    assert_eq!(array.len(), 4);
    assert_eq!(array.get(0), Some(Variant::Int(7)));
    assert_eq!(array.get(1).as_ref().and_then(Variant::as_string), Some(&GString::from("seven")));
    assert_eq!(array.get(2).and_then(|v| v.as_vector2i()), Some(Vector2i::new(7, -7)));
    assert_eq!(array.get(3), Some(Variant::Nil));
    assert_eq!(array.get(4), None);

    array.set(0, true);
    assert_eq!(array.get(0), Some(Variant::Bool(true)));
}

#[test]
fn array_set_out_of_bounds() {
    setup();

    let mut array: Array = [1, 2].into_iter().collect();
    expect_panic("set past the end", "index 2 out of bounds (len 2)", || {
        array.set(2, 3);
    });
    assert_eq!(array.len(), 2);
}

#[test]
fn array_clone_is_independent() {
    setup();

    let mut original: Array = ["a", "b"].into_iter().collect();
    let copy = original.clone();

    original.push("c");
    original.set(0, Color::from_rgb(1.0, 0.0, 0.0));

    assert_eq!(copy.len(), 2);
    assert_eq!(copy.get(0), Some(Variant::from("a")));
    assert_ne!(copy, original);
    assert_eq!(format!("{copy:?}"), r#"[String(GString("a")), String(GString("b"))]"#);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Dictionary

#[test]
fn dictionary_set_get_remove() {
    setup();

    let mut dict = Dictionary::new();
    dict.set("health", 100);
    dict.set("speed", 2.5);
    dict.set(3, Vector3::UP);
    dict.set("health", 80);

    assert_eq!(dict.len(), 3);
    assert_eq!(dict.get("health"), Some(Variant::Int(80)));
    assert_eq!(dict.get(3).and_then(|v| v.as_vector3()), Some(Vector3::UP));
    assert!(!dict.contains_key("mana"));

    assert_eq!(dict.remove("speed"), Some(Variant::Float(2.5)));
    assert_eq!(dict.remove("speed"), None);

    let keys = dict.keys_array().to_vec();
    assert_eq!(keys, vec![Variant::from("health"), Variant::Int(3)]);
}

#[test]
fn dictionary_equality_ignores_order() {
    setup();

    let forward: Dictionary = [("a", 1), ("b", 2)].into_iter().collect();
    let backward: Dictionary = [("b", 2), ("a", 1)].into_iter().collect();
    let other: Dictionary = [("a", 1), ("b", 3)].into_iter().collect();

    assert_eq!(forward, backward);
    assert_ne!(forward, other);
    assert_eq!(forward.clone(), forward);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Engine round trips

#[test]
fn dictionary_argument_and_owned_return() {
    setup();

    let mut resource = Gd::<Resource>::new_gd();
    assert!(resource.get_meta_entries().is_empty());

    let mut entries: Dictionary = [("author", Variant::from("ada")), ("revision", Variant::Int(4))].into_iter().collect();
    resource.set_meta_entries(&entries);

    // The engine stored a copy; later changes to the argument do not reach it.
    entries.set("revision", 5);

    let stored = resource.get_meta_entries();
    assert_eq!(stored.get("revision"), Some(Variant::Int(4)));
    assert_eq!(stored.get("author"), Some(Variant::from("ada")));
}

#[test]
fn borrowed_array_return_is_copied() {
    setup();

    let mut node = Gd::<Node>::new_alloc();
    node.add_to_group(&GString::from("enemies"));

    let mut groups = node.get_groups();
    assert_eq!(groups.to_vec(), vec![Variant::from("enemies")]);

    // Modifying the copy leaves the node's own array alone.
    groups.push("friends");
    node.add_to_group(&GString::from("bosses"));
    assert_eq!(node.get_groups().to_vec(), vec![Variant::from("enemies"), Variant::from("bosses")]);

    drop(groups);
    assert_eq!(node.get_groups().len(), 2);
    assert!(gdbind_mock::violations_of(id_of(&node)).is_empty());

    node.free();
}

#[test]
fn engine_version_info() {
    setup();

    let info = Engine::singleton().get_version_info();
    let (major, minor, patch) = gdbind_mock::version();

    assert_eq!(info.get("major"), Some(Variant::Int(i64::from(major))));
    assert_eq!(info.get("minor"), Some(Variant::Int(i64::from(minor))));
    assert_eq!(info.get("patch"), Some(Variant::Int(i64::from(patch))));
    assert_eq!(info.get("string"), Some(Variant::from(format!("{major}.{minor}.{patch}").as_str())));
}

#[test]
fn virtual_returns_array_to_engine() {
    setup_classes();

    let mut spawner = Gd::<Spawner>::new_user();
    let warnings = spawner.get_configuration_warnings();
    assert_eq!(warnings.to_vec(), vec![Variant::from("missing child 0"), Variant::from("missing child 1")]);

    spawner.bind_mut().expected_children = 0;
    assert!(spawner.get_configuration_warnings().is_empty());

    let plain = Gd::<Node>::new_alloc();
    assert!(plain.get_configuration_warnings().is_empty());

    spawner.free();
    plain.free();
}
