// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::id::{SourceId, StationId};
use crate::time::SessionSeconds;

/// `(station_id, source_id, az, el, ha, dc, time)` (`PointingVector`).
///
/// Equality and ordering are by time only.
#[derive(Clone, Copy, Debug)]
pub struct PointingVector {
    pub station_id: StationId,
    pub source_id: SourceId,
    /// Azimuth, radians. May be unwrapped beyond `[0, 2*pi)` when tracking a
    /// cable-wrap section.
    pub az: f64,
    /// Elevation, radians.
    pub el: f64,
    /// Hour angle, radians.
    pub ha: f64,
    /// Declination, radians.
    pub dc: f64,
    pub time: SessionSeconds,
}

impl PointingVector {
    pub fn new(
        station_id: StationId,
        source_id: SourceId,
        az: f64,
        el: f64,
        ha: f64,
        dc: f64,
        time: SessionSeconds,
    ) -> Self {
        Self {
            station_id,
            source_id,
            az,
            el,
            ha,
            dc,
            time,
        }
    }
}

impl PartialEq for PointingVector {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time
    }
}

impl Eq for PointingVector {}

impl PartialOrd for PointingVector {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PointingVector {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.time.cmp(&other.time)
    }
}
