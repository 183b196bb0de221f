/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

mod instance_registry;
mod instance_storage;

pub(crate) use instance_registry::DispatchTarget;
pub use instance_registry::{InstanceKey, InstanceRegistry};
pub use instance_storage::*;
