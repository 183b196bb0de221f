/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Engine classes.
//!
//! Each class is a marker type used as `T` in [`Gd<T>`][crate::obj::Gd]; its methods live in a per-class `*Api` trait that
//! every `Gd<T>` implements when `T` inherits the class. Import [`prelude`](crate::classes::prelude) (or `gdbind::prelude`)
//! to bring all of them in scope.

mod class_macros;

mod audio;
mod engine;
mod node;
mod node_3d;
mod object;
mod resource;

pub use audio::*;
pub use engine::*;
pub use node::*;
pub use node_3d::*;
pub use object::*;
pub use resource::*;

/// All `*Api` traits.
pub mod prelude {
    pub use super::{
        ArrayMeshApi, AudioStreamPlayerApi, CanvasItemApi, CircleShape2DApi, EngineApi, Light3DApi, MeshApi, Node2DApi,
        Node3DApi, NodeApi, ObjectApi, RefCountedApi, ResourceApi, Shape2DApi, TileMapApi, VisualInstance3DApi,
    };
}
