/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ptr;
use std::sync::Once;

use gdbind_core::builtin::{real, Aabb, GString, Vector3};
use gdbind_core::classes::{CanvasItem, Mesh, MeshApi, Node, Object, ObjectApi, RefCounted, Resource};
use gdbind_core::init;
use gdbind_core::meta::MethodName;
use gdbind_core::obj::{Base, Gd, GdClass, InstanceId, UserClass};
use gdbind_core::registry::{register_class, register_instance_override, ClassBuilder, Lifecycle, Resolution};
use gdbind_core::{sys, user_class};
use gdbind_mock::LogLevel;

use crate::framework::{expect_panic, id_of, setup};

// ----------------------------------------------------------------------------------------------------------------------------------------------
// User classes

/// Cube centered on the origin.
struct BoxMesh {
    base: Base<Mesh>,
    size: real,
}

user_class!(BoxMesh: Mesh, Resource, RefCounted, Object);

impl UserClass for BoxMesh {
    fn init(base: Base<Mesh>) -> Self {
        Self { base, size: 2.0 }
    }

    fn register(builder: &mut ClassBuilder<Self>) {
        builder
            .virtual_method("_get_aabb", |this: &BoxMesh, ()| {
                let half = this.size / 2.0;
                Aabb::new(Vector3::splat(-half), Vector3::splat(this.size))
            })
            .virtual_method("_get_surface_count", |_, ()| 6i64);
    }
}

/// Mesh without overrides; the engine's implementation applies.
struct PlainMesh {
    _base: Base<Mesh>,
}

user_class!(PlainMesh: Mesh, Resource, RefCounted, Object);

impl UserClass for PlainMesh {
    fn init(base: Base<Mesh>) -> Self {
        Self { _base: base }
    }
}

struct Ticker {
    _base: Base<Node>,
    elapsed: f64,
    ticks: u32,
}

user_class!(Ticker: Node, Object);

impl UserClass for Ticker {
    fn init(base: Base<Node>) -> Self {
        Self {
            _base: base,
            elapsed: 0.0,
            ticks: 0,
        }
    }

    fn register(builder: &mut ClassBuilder<Self>) {
        builder
            .virtual_method_mut("_process", |this: &mut Ticker, (delta,): (f64,)| {
                this.elapsed += delta;
                this.ticks += 1;
            })
            .virtual_method("_to_string", |this: &Ticker, ()| GString::from(format!("Ticker({})", this.ticks)));
    }
}

struct Canvas {
    _base: Base<CanvasItem>,
}

user_class!(Canvas: CanvasItem, Node, Object);

impl UserClass for Canvas {
    fn init(base: Base<CanvasItem>) -> Self {
        Self { _base: base }
    }

    fn register(builder: &mut ClassBuilder<Self>) {
        builder.virtual_method::<(), ()>("_draw", |_, ()| panic!("nothing to draw"));
    }
}

/// Overrides `_get_aabb` with the wrong return type.
struct BrokenMesh {
    _base: Base<Mesh>,
}

user_class!(BrokenMesh: Mesh, Resource, RefCounted, Object);

impl UserClass for BrokenMesh {
    fn init(base: Base<Mesh>) -> Self {
        Self { _base: base }
    }

    fn register(builder: &mut ClassBuilder<Self>) {
        builder.virtual_method("_get_aabb", |_, ()| 1.5f64);
    }
}

fn setup_classes() {
    static REGISTER: Once = Once::new();

    setup();
    REGISTER.call_once(|| {
        register_class::<BoxMesh>();
        register_class::<PlainMesh>();
        register_class::<Ticker>();
        register_class::<Canvas>();
    });
}

fn lifecycle_of(id: u64) -> Option<Lifecycle> {
    let instances = &init::runtime().instances;
    instances.lifecycle(instances.key_by_object(InstanceId::try_from_u64(id)?)?)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[test]
fn engine_calls_class_override() {
    setup_classes();

    let mesh = Gd::<BoxMesh>::new_user();
    let expected = Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(2.0, 2.0, 2.0));

    // Engine-side get_aabb() calls back into the _get_aabb override; the box crosses the boundary twice.
    assert_eq!(mesh.get_aabb(), expected);
    assert_eq!(mesh.get_surface_count(), 6);

    let as_mesh: Gd<Mesh> = mesh.clone().upcast();
    assert_eq!(as_mesh.get_aabb(), expected);
}

#[test]
fn override_sees_instance_state() {
    setup_classes();

    let mut mesh = Gd::<BoxMesh>::new_user();
    mesh.bind_mut().size = 5.0;

    let aabb = mesh.get_aabb();
    assert_eq!(aabb.position, Vector3::splat(-2.5));
    assert_eq!(aabb.size, Vector3::splat(5.0));
}

#[test]
fn no_override_falls_back_to_engine() {
    setup_classes();

    let mesh = Gd::<PlainMesh>::new_user();
    assert_eq!(mesh.get_aabb(), Aabb::default());
    assert_eq!(mesh.get_surface_count(), 0);

    let resolution = init::runtime().virtuals.resolve(
        &init::runtime().classes,
        PlainMesh::class_name(),
        MethodName::new("_get_aabb"),
    );
    assert_eq!(resolution, Resolution::NativeDefault);
}

#[test]
fn resolution_names_overriding_class() {
    setup_classes();

    let runtime = init::runtime();
    let resolution = runtime
        .virtuals
        .resolve(&runtime.classes, BoxMesh::class_name(), MethodName::new("_get_surface_count"));

    assert_eq!(
        resolution,
        Resolution::Override {
            level: BoxMesh::class_name()
        }
    );
}

#[test]
fn instance_override_takes_precedence() {
    setup_classes();

    let mesh = Gd::<BoxMesh>::new_user();
    let other = Gd::<BoxMesh>::new_user();

    register_instance_override(&mesh, "_get_surface_count", |()| 42i64);

    assert_eq!(mesh.get_surface_count(), 42);
    assert_eq!(other.get_surface_count(), 6);

    // Methods without instance override still use the class.
    assert_eq!(mesh.get_aabb(), other.get_aabb());
}

#[test]
fn instance_override_checks_signature() {
    setup_classes();

    let mesh = Gd::<BoxMesh>::new_user();
    expect_panic("instance override with wrong return", "argument frame mismatch", || {
        register_instance_override(&mesh, "_get_surface_count", |()| GString::from("six"));
    });

    assert_eq!(mesh.get_surface_count(), 6);
}

#[test]
fn instance_override_needs_user_instance() {
    setup_classes();

    let engine_mesh = Gd::<Mesh>::new_gd();
    expect_panic("instance override on engine object", "invalid receiver", || {
        register_instance_override(&engine_mesh, "_get_surface_count", |()| 1i64);
    });
}

#[test]
fn class_override_checks_signature() {
    setup();

    expect_panic("register class with wrong override", "argument frame mismatch in Mesh::_get_aabb", || {
        register_class::<BrokenMesh>();
    });

    assert!(!init::runtime().classes.is_user_class(BrokenMesh::class_name()));
    assert!(!gdbind_mock::is_class_registered("BrokenMesh"));
}

#[test]
fn register_class_is_idempotent() {
    setup_classes();
    register_class::<BoxMesh>();

    assert!(init::runtime().classes.is_user_class(BoxMesh::class_name()));
    assert!(gdbind_mock::is_class_registered("BoxMesh"));
}

#[test]
fn virtual_with_arguments_and_string_return() {
    setup_classes();

    let ticker = Gd::<Ticker>::new_user();
    let id = id_of(&ticker);
    assert_eq!(ticker.get_class(), "Ticker");
    assert_eq!(gdbind_mock::bound_class(id).as_deref(), Some("Ticker"));

    for delta in [0.25f64, 0.5] {
        let args: [sys::ConstTypePtr; 1] = [ptr::from_ref(&delta).cast()];
        let handled = unsafe { gdbind_mock::call_virtual_raw(id, "_process", &args, ptr::null_mut()) };
        assert!(handled);
    }

    assert_eq!(ticker.bind().ticks, 2);
    assert_eq!(ticker.bind().elapsed, 0.75);
    assert_eq!(lifecycle_of(id), Some(Lifecycle::Bound));

    let mut token = 0u64;
    let handled = unsafe { gdbind_mock::call_virtual_raw(id, "_to_string", &[], ptr::from_mut(&mut token).cast()) };
    assert!(handled);
    assert_eq!(gdbind_mock::take_string(token).as_deref(), Some("Ticker(2)"));

    ticker.free();
    assert!(!gdbind_mock::is_alive(id));
}

#[test]
fn virtual_token_resolved_once_per_class() {
    setup_classes();

    let mesh = Gd::<BoxMesh>::new_user();
    for _ in 0..3 {
        assert_eq!(mesh.get_surface_count(), 6);
    }

    let other = Gd::<BoxMesh>::new_user();
    assert_eq!(other.get_surface_count(), 6);

    assert_eq!(gdbind_mock::virtual_lookups("BoxMesh", "_get_surface_count"), 1);
}

#[test]
fn virtual_not_overridden_is_not_handled() {
    setup_classes();

    let ticker = Gd::<Ticker>::new_user();
    let handled = unsafe { gdbind_mock::call_virtual_raw(id_of(&ticker), "_ready", &[], ptr::null_mut()) };
    assert!(!handled);

    ticker.free();
}

#[test]
fn panicking_override_reports_and_falls_back() {
    setup_classes();

    let canvas = Gd::<Canvas>::new_user();
    let id = id_of(&canvas);

    let handled = unsafe { gdbind_mock::call_virtual_raw(id, "_draw", &[], ptr::null_mut()) };
    assert!(!handled);
    assert!(gdbind_mock::has_log(LogLevel::Error, "nothing to draw"));

    // The instance survives the panic.
    assert!(canvas.is_instance_valid());
    assert_eq!(lifecycle_of(id), Some(Lifecycle::Bound));
    assert_eq!(canvas.get_class(), "Canvas");

    canvas.free();
}

#[test]
fn user_instance_dies_with_last_reference() {
    setup_classes();

    let mesh = Gd::<BoxMesh>::new_user();
    let id = id_of(&mesh);

    let base = mesh.bind().base.to_gd();
    assert_eq!(base.instance_id(), mesh.instance_id());
    assert_eq!(gdbind_mock::reference_count(id), Some(2));

    drop(mesh);
    assert!(gdbind_mock::is_alive(id));
    assert_eq!(base.get_surface_count(), 6);

    drop(base);
    assert!(!gdbind_mock::is_alive(id));
    assert_eq!(gdbind_mock::destroy_count(id), 1);
    assert!(gdbind_mock::violations_of(id).is_empty());
}

#[test]
fn custom_init_fn() {
    setup_classes();

    let mesh = Gd::<BoxMesh>::from_init_fn(|base| BoxMesh { base, size: 8.0 });
    assert_eq!(mesh.get_aabb().size, Vector3::splat(8.0));
}

#[test]
fn unregistered_class_cannot_be_instantiated() {
    setup();

    expect_panic("new_user() before register_class()", "not registered", || {
        let _ = Gd::<BrokenMesh>::new_user();
    });
}
