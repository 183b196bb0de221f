/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::GString;
use crate::obj::NoBase;

crate::engine_class! {
    /// Root of the class hierarchy. Manually managed: whoever owns an `Object` must [`free()`][crate::obj::Gd::free] it.
    class Object: NoBase;
    ref_counted = false;
    api ObjectApi;

    virtuals {
        fn _to_string() -> GString;
    }

    methods {
        /// Name of the object's most derived class, as the engine sees it (user classes included).
        fn get_class(&self) -> GString;

        fn get_instance_id(&self) -> i64;
    }
}

crate::engine_class! {
    /// Base of all reference-counted classes. `Gd` pointers to them are owned and keep the object alive.
    class RefCounted: Object;
    ref_counted = true;
    api RefCountedApi;

    virtuals {}

    methods {
        fn get_reference_count(&self) -> i64;
    }
}
