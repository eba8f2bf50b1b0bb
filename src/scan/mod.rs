// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A scan's per-station timing segments and their alignment rule, and the
//! scan itself (`Scan`/`ScanTimes`).

pub mod times;

use std::collections::HashMap;

use crate::coord::PointingVector;
use crate::id::{ObservationId, ScanId, SourceId, StationId};
use crate::observation::Observation;

pub use times::{AlignmentAnchor, ScanTimes};

/// The kind of scan, driving which scoring formula and build-time filters
/// apply (`Scan`: "`type ∈ {single, subnet, fillin, fringeFinder,
/// astroCalibrator, parallacticAngle, diffParallacticAngle}`").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanType {
    Single,
    Subnet,
    Fillin,
    FringeFinder,
    AstroCalibrator,
    ParallacticAngle,
    DiffParallacticAngle,
}

/// A committed or candidate scan (`Scan`).
#[derive(Clone, Debug)]
pub struct Scan {
    pub id: ScanId,
    pub scan_type: ScanType,
    pub source_id: SourceId,
    /// One pointing vector per participating station, keyed by station id.
    pub pointing_vectors: HashMap<StationId, PointingVector>,
    pub times: ScanTimes,
    pub observations: Vec<Observation>,
    /// Populated once scoring has run; `None` for a freshly
    /// built, unscored candidate.
    pub score: Option<f64>,
}

impl Scan {
    pub fn new(
        id: ScanId,
        scan_type: ScanType,
        source_id: SourceId,
        pointing_vectors: HashMap<StationId, PointingVector>,
        times: ScanTimes,
        observations: Vec<Observation>,
    ) -> Self {
        Self {
            id,
            scan_type,
            source_id,
            pointing_vectors,
            times,
            observations,
            score: None,
        }
    }

    pub fn num_stations(&self) -> usize {
        self.pointing_vectors.len()
    }

    pub fn station_ids(&self) -> impl Iterator<Item = &StationId> {
        self.pointing_vectors.keys()
    }

    pub fn observations_for_station(&self, station_id: StationId) -> impl Iterator<Item = &Observation> {
        self.observations
            .iter()
            .filter(move |obs| obs.station1 == station_id || obs.station2 == station_id)
    }

    pub fn observation_ids(&self) -> impl Iterator<Item = ObservationId> + '_ {
        self.observations.iter().map(|o| o.id)
    }

    /// Removes a station and every observation that touches it: used to
    /// drop a station that can't satisfy a constraint and retry with the
    /// remainder.
    pub fn drop_station(&mut self, station_id: StationId) {
        self.pointing_vectors.remove(&station_id);
        self.observations
            .retain(|obs| obs.station1 != station_id && obs.station2 != station_id);
        self.times.drop_station(station_id);
    }

    /// Appends a station to an already-built scan without affecting its
    /// selection (Tagalong). The caller is responsible for
    /// having already checked visibility and slew limits, and for supplying
    /// the observations this station forms with the scan's existing
    /// stations.
    pub fn insert_tagalong_station(
        &mut self,
        pv: PointingVector,
        end_last_scan: crate::time::SessionSeconds,
        new_observations: Vec<Observation>,
    ) {
        self.times.insert_station(pv.station_id, end_last_scan);
        self.pointing_vectors.insert(pv.station_id, pv);
        self.observations.extend(new_observations);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdRegistry;

    #[test]
    fn drop_station_removes_its_observations() {
        let mut ids = IdRegistry::new();
        let scan_id = ids.next_scan();
        let source_id = ids.next_source();
        let s1 = ids.next_station();
        let s2 = ids.next_station();
        let pv1 = PointingVector::new(s1, source_id, 0.0, 0.5, 0.0, 0.0, 100);
        let pv2 = PointingVector::new(s2, source_id, 0.1, 0.5, 0.0, 0.0, 100);
        let obs = Observation::new(ids.next_observation(), s1, s2, "X".to_string(), 100, 30);

        let mut pvs = HashMap::new();
        pvs.insert(s1, pv1);
        pvs.insert(s2, pv2);
        let mut scan = Scan::new(
            scan_id,
            ScanType::Single,
            source_id,
            pvs,
            ScanTimes::new(vec![s1, s2]),
            vec![obs],
        );
        assert_eq!(scan.observations.len(), 1);
        scan.drop_station(s1);
        assert_eq!(scan.observations.len(), 0);
        assert_eq!(scan.num_stations(), 1);
    }
}
