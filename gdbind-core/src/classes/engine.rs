/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::{Dictionary, GString};
use crate::classes::Object;
use crate::meta::ReturnOwnership;
use crate::obj::{Gd, GdClass};
use crate::sys;
use sys::interface_fn;

crate::engine_class! {
    /// Engine-wide settings and counters. Only exists as singleton, see [`Engine::singleton()`].
    class Engine: Object;
    ref_counted = false;
    api EngineApi;

    virtuals {}

    methods {
        fn get_frames_drawn(&self) -> i64;
        fn set_time_scale(&mut self, time_scale: f64);
        fn get_time_scale(&self) -> f64;
        fn get_architecture_name(&self) -> GString;

        /// `major`, `minor` and `patch` as integers, and the full version as `string`.
        fn get_version_info(&self) -> Dictionary;
    }
}

impl Engine {
    /// The engine singleton. The engine owns it, so the returned pointer is borrowed.
    ///
    /// # Panics
    /// If the engine does not provide the singleton.
    #[track_caller]
    pub fn singleton() -> Gd<Engine> {
        let name = Self::class_name();
        let ptr = unsafe { interface_fn!(global_get_singleton)(name.as_c_str().as_ptr()) };

        // SAFETY: singletons are live objects of their class, kept alive by the engine.
        match unsafe { Gd::from_ffi(ptr, ReturnOwnership::Borrowed) } {
            Some(engine) => engine,
            None => panic!("engine singleton {name} not available"),
        }
    }
}
