/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::classes::{Node, Object};

crate::engine_class! {
    class AudioStreamPlayer: Node, Object;
    ref_counted = false;
    api AudioStreamPlayerApi;

    virtuals {}

    methods {
        fn set_volume_db(&mut self, volume_db: f32);
        fn get_volume_db(&self) -> f32;
        fn set_pitch_scale(&mut self, pitch_scale: f32);
        fn get_pitch_scale(&self) -> f32;

        /// Starts playback at `from_position` seconds.
        fn play(&mut self, from_position: f64);
        fn stop(&mut self);
        fn is_playing(&self) -> bool;
        fn get_playback_position(&self) -> f64;
    }
}
