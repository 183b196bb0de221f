/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::panic;
use std::sync::Once;

use gdbind_core::init::{self, InitConfig};
use gdbind_core::obj::{Gd, GdClass};

/// Loads the binding into the mock engine, once per test binary.
pub fn setup() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let (interface, library) = gdbind_mock::install();

        // SAFETY: the mock's table is a `static`, and the library pointer comes from the same mock.
        if let Err(err) = unsafe { init::initialize(interface, library, InitConfig::default()) } {
            panic!("binding failed to initialize against the mock engine: {err}");
        }
    });
}

/// Runs `code` and asserts that it panics with a message containing `needle`.
#[track_caller]
pub fn expect_panic(context: &str, needle: &str, code: impl FnOnce()) {
    // Handles and guards in the closures are unwind safe enough for testing; this keeps `&mut` captures ergonomic.
    let code = panic::AssertUnwindSafe(code);

    let payload = match panic::catch_unwind(code) {
        Ok(()) => panic!("code should have panicked but did not: {context}"),
        Err(payload) => payload,
    };

    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&'static str>() {
        s.to_string()
    } else {
        String::new()
    };

    assert!(
        message.contains(needle),
        "{context}: panic message {message:?} does not contain {needle:?}"
    );
}

/// Raw engine-side ID of an object, as used by the mock's diagnostics.
pub fn id_of<T: GdClass>(gd: &Gd<T>) -> u64 {
    gd.instance_id().to_u64()
}
