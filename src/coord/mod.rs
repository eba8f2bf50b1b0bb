// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Geometry primitives: station position, pointing vectors, and
//! the simple/rigorous AzEl computation modes.

mod azel;
mod position;
mod pointing_vector;
mod radec;

pub use azel::{rigorous_az_el_from_radec, AzElCache};
pub use position::Position;
pub use pointing_vector::PointingVector;
pub use radec::RADec;
