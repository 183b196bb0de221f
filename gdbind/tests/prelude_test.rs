/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gdbind::init::{self, InitConfig};
use gdbind::prelude::*;

fn setup() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let (interface, library) = gdbind_mock::install();
        if let Err(err) = unsafe { init::initialize(interface, library, InitConfig::default()) } {
            panic!("binding failed to initialize against the mock engine: {err}");
        }
        register_class::<Spinner>();
    });
}

struct Spinner {
    base: Base<Node2D>,
    speed: f64,
}

user_class!(Spinner: Node2D, CanvasItem, Node, Object);

impl UserClass for Spinner {
    fn init(base: Base<Node2D>) -> Self {
        Self { base, speed: 2.0 }
    }

    fn register(builder: &mut ClassBuilder<Self>) {
        builder.virtual_method("_process", |this: &Spinner, (delta,): (f64,)| {
            let mut node = this.base.to_gd();
            let rotation = node.get_rotation();
            node.set_rotation(rotation + this.speed * delta);
        });
    }
}

#[test]
fn scene_through_prelude() {
    setup();

    let mut root = Gd::<Node>::new_alloc();
    let mut player = Gd::<Node2D>::new_alloc();
    let mut lamp = Gd::<Light3D>::new_alloc();

    // Same method name on 2D and 3D nodes; each resolves through its own class.
    player.set_position(Vector2::new(3.0, 4.0));
    lamp.set_position(Vector3::new(0.0, 2.0, 0.0));
    assert_eq!(player.get_position(), Vector2::new(3.0, 4.0));
    assert_eq!(lamp.get_position(), Vector3::new(0.0, 2.0, 0.0));

    root.add_child(player.upcast());
    root.add_child(lamp.upcast());
    assert_eq!(root.get_child_count(), 2);

    root.free();
}

#[test]
fn user_class_through_prelude() {
    setup();

    let spinner = Gd::<Spinner>::new_user();
    let id = spinner.instance_id().to_u64();
    let delta = 0.5f64;
    let args: [gdbind::sys::ConstTypePtr; 1] = [std::ptr::from_ref(&delta).cast()];

    let handled = unsafe { gdbind_mock::call_virtual_raw(id, "_process", &args, std::ptr::null_mut()) };
    assert!(handled);
    assert_eq!(spinner.get_rotation(), 1.0);
    assert_eq!(spinner.get_class(), "Spinner");

    spinner.free();
}
