/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Native class hierarchy of the mock engine, with default property values.

use std::collections::HashMap;

use gdbind_ffi as sys;
use sys::real;

use crate::state::Prop;

#[derive(Debug)]
pub(crate) struct NativeClass {
    pub name: &'static str,
    pub parent: Option<&'static str>,
    pub ref_counted: bool,
}

const fn class(name: &'static str, parent: Option<&'static str>, ref_counted: bool) -> NativeClass {
    NativeClass {
        name,
        parent,
        ref_counted,
    }
}

pub(crate) static NATIVE_CLASSES: &[NativeClass] = &[
    class("Object", None, false),
    class("RefCounted", Some("Object"), true),
    class("Resource", Some("RefCounted"), true),
    class("Mesh", Some("Resource"), true),
    class("ArrayMesh", Some("Mesh"), true),
    class("Shape2D", Some("Resource"), true),
    class("CircleShape2D", Some("Shape2D"), true),
    class("Node", Some("Object"), false),
    class("CanvasItem", Some("Node"), false),
    class("Node2D", Some("CanvasItem"), false),
    class("TileMap", Some("Node2D"), false),
    class("Node3D", Some("Node"), false),
    class("VisualInstance3D", Some("Node3D"), false),
    class("Light3D", Some("VisualInstance3D"), false),
    class("AudioStreamPlayer", Some("Node"), false),
    class("Engine", Some("Object"), false),
];

pub(crate) fn find(name: &str) -> Option<&'static NativeClass> {
    NATIVE_CLASSES.iter().find(|class| class.name == name)
}

pub(crate) fn native_inherits(class: &'static NativeClass, ancestor: &str) -> bool {
    let mut current = Some(class);
    while let Some(class) = current {
        if class.name == ancestor {
            return true;
        }
        current = class.parent.and_then(find);
    }
    false
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Slot encoding

pub(crate) fn reals(values: &[real]) -> Prop {
    Prop::Raw(values.iter().flat_map(|v| v.to_ne_bytes()).collect())
}

pub(crate) fn float(value: f64) -> Prop {
    Prop::Raw(value.to_ne_bytes().to_vec())
}

pub(crate) fn int(value: i64) -> Prop {
    Prop::Raw(value.to_ne_bytes().to_vec())
}

pub(crate) fn boolean(value: bool) -> Prop {
    Prop::Raw(vec![sys::to_native_bool(value)])
}

pub(crate) fn color(r: f32, g: f32, b: f32, a: f32) -> Prop {
    Prop::Raw([r, g, b, a].iter().flat_map(|v| v.to_ne_bytes()).collect())
}

pub(crate) const IDENTITY_3D: [real; 12] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];

/// Light parameter holding the energy, which starts at 1.
pub(crate) const LIGHT_PARAM_ENERGY: i64 = 0;

/// Properties of a freshly constructed object, including those of all its ancestors.
pub(crate) fn default_props(class: &'static NativeClass) -> HashMap<&'static str, Prop> {
    let mut props = HashMap::new();

    let mut current = Some(class);
    while let Some(class) = current {
        add_defaults_of(class.name, &mut props);
        current = class.parent.and_then(find);
    }

    props
}

fn add_defaults_of(class: &str, props: &mut HashMap<&'static str, Prop>) {
    let defaults: Vec<(&'static str, Prop)> = match class {
        "Resource" => vec![("resource_name", Prop::Text(String::new()))],
        "ArrayMesh" => vec![("surfaces", Prop::Surfaces(Vec::new()))],
        "CircleShape2D" => vec![("radius", float(10.0))],
        "Node" => vec![("name", Prop::Text(String::new()))],
        "CanvasItem" => vec![("visible", boolean(true)), ("modulate", color(1.0, 1.0, 1.0, 1.0))],
        "Node2D" => vec![
            ("position", reals(&[0.0, 0.0])),
            ("rotation", float(0.0)),
            ("scale", reals(&[1.0, 1.0])),
        ],
        "TileMap" => vec![("cells", Prop::Cells(HashMap::new()))],
        "Node3D" => vec![("transform", reals(&IDENTITY_3D))],
        "VisualInstance3D" => vec![("layer_mask", int(1))],
        "Light3D" => vec![
            ("color", color(1.0, 1.0, 1.0, 1.0)),
            ("params", Prop::Params(HashMap::from([(LIGHT_PARAM_ENERGY, 1.0)]))),
        ],
        "AudioStreamPlayer" => vec![
            ("volume_db", float(0.0)),
            ("pitch_scale", float(1.0)),
            ("playing", boolean(false)),
            ("playback_position", float(0.0)),
        ],
        "Engine" => vec![("time_scale", float(1.0))],
        _ => Vec::new(),
    };

    for (name, value) in defaults {
        props.entry(name).or_insert(value);
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchy_is_closed() {
        for class in NATIVE_CLASSES {
            if let Some(parent) = class.parent {
                let parent = find(parent).unwrap_or_else(|| panic!("parent of {} missing", class.name));
                assert!(!parent.ref_counted || class.ref_counted, "{} loses ref-counting", class.name);
            }
            assert!(native_inherits(class, "Object"));
        }
    }

    #[test]
    fn defaults_include_ancestors() {
        let props = default_props(find("TileMap").unwrap());
        for name in ["cells", "position", "visible", "name"] {
            assert!(props.contains_key(name), "{name}");
        }
    }
}
