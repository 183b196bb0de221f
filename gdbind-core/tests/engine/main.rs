/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Tests of the whole binding against the in-process mock engine.
//!
//! All tests share one engine, and run in parallel. Assertions on engine state are therefore made per object, never on global
//! counts; see the `leaks` test binary for the latter.

mod framework;

mod builtin_test;
mod collections_test;
mod node_test;
mod object_test;
mod ownership_test;
mod resource_test;
mod spatial_test;
mod startup_test;
mod virtual_test;
