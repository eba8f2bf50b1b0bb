// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The station model (`Station`).

pub mod antenna;
pub mod cable_wrap;
pub mod equipment;
pub mod horizon_mask;
pub mod parameters;
pub mod station_log;

use std::collections::HashMap;

use crate::coord::{AzElCache, Position, PointingVector};
use crate::event::EventList;
use crate::id::{SourceId, StationId};

pub use antenna::MountKinematics;
pub use cable_wrap::CableWrap;
pub use equipment::Equipment;
pub use horizon_mask::HorizonMask;
pub use parameters::StationParameters;
pub use station_log::{StationLog, StationLogEntry};

/// Per-station running counters (Station: "counters (observations,
/// scans, total scans)").
#[derive(Clone, Copy, Debug, Default)]
pub struct StationCounters {
    pub num_observations: u32,
    pub num_scans: u32,
    pub num_total_scans: u32,
    pub total_obs_time_s: u32,
}

/// A single VLBI station (`Station`).
#[derive(Clone, Debug)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub antenna: MountKinematics,
    pub cable_wrap: CableWrap,
    pub position: Position,
    pub equipment: Equipment,
    pub horizon_mask: HorizonMask,

    pub current: Option<PointingVector>,
    pub counters: StationCounters,
    pub parameters: StationParameters,

    pub events: EventList<StationParameters>,

    /// Per-source simple/rigorous AzEl cache.
    az_el_cache: HashMap<SourceId, AzElCache>,
}

impl Station {
    pub fn new(
        id: StationId,
        name: impl Into<String>,
        antenna: MountKinematics,
        cable_wrap: CableWrap,
        position: Position,
        equipment: Equipment,
        horizon_mask: HorizonMask,
        parameters: StationParameters,
        events: EventList<StationParameters>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            antenna,
            cable_wrap,
            position,
            equipment,
            horizon_mask,
            current: None,
            counters: StationCounters::default(),
            parameters,
            events,
            az_el_cache: HashMap::new(),
        }
    }

    pub fn az_el_cache_for(&mut self, source_id: SourceId) -> &mut AzElCache {
        self.az_el_cache.entry(source_id).or_default()
    }

    pub fn az_el_cache_ref(&self, source_id: SourceId) -> Option<&AzElCache> {
        self.az_el_cache.get(&source_id)
    }

    /// `isVisible`: elevation, horizon mask, and cable-wrap
    /// all agree the pointing is observable.
    pub fn is_visible(&self, pv: &PointingVector, source_min_elevation_rad: f64) -> bool {
        let min_el = self.parameters.min_elevation_rad.max(source_min_elevation_rad);
        pv.el >= min_el && self.horizon_mask.visible(pv) && self.cable_wrap.angles_inside(pv)
    }

    /// Slew time from the station's current pointing to `new_pv`. Returns
    /// `0` if this is the station's first scan.
    pub fn slew_time(&self, new_pv: &PointingVector) -> u32 {
        match &self.current {
            None => 0,
            Some(old) => {
                if self.parameters.first_scan {
                    0
                } else {
                    self.antenna.slew(old, new_pv)
                }
            }
        }
    }

    /// Commit a scan ending at `end_pointing` (`Update`).
    pub fn commit(&mut self, end_pointing: PointingVector, obs_duration_s: u32, is_subnetting_partner: bool) {
        self.current = Some(end_pointing);
        self.parameters.first_scan = false;
        self.counters.num_observations += 1;
        self.counters.num_scans += 1;
        self.counters.num_total_scans += 1;
        self.counters.total_obs_time_s += obs_duration_s;
        let _ = is_subnetting_partner;
    }

    /// Reset bookkeeping when an event transitions this station from
    /// unavailable to available: `current.time` resets to the event time
    /// and `firstScan = true` so no slew cost is charged on re-entry.
    pub fn reset_on_reactivation(&mut self, event_time: crate::time::SessionSeconds) {
        self.parameters.first_scan = true;
        if let Some(pv) = &mut self.current {
            pv.time = event_time;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventList;
    use crate::id::IdRegistry;

    fn make_station(ids: &mut IdRegistry) -> Station {
        let rate = 1.0;
        let axis = antenna::AxisRate {
            rate,
            accel: rate,
            settle_s: 0.0,
        };
        Station::new(
            ids.next_station(),
            "TEST",
            MountKinematics::AzElSimple { az: axis, el: axis },
            CableWrap::new(0.0, crate::constants::TAU, 0.0, crate::constants::TAU),
            Position::from_ecef(6_378_137.0, 0.0, 0.0),
            Equipment::Constant {
                sefd_jy: HashMap::from([("X".to_string(), 1000.0)]),
            },
            HorizonMask::None,
            StationParameters::default(),
            EventList::new(vec![]),
        )
    }

    #[test]
    fn first_scan_has_no_slew_cost() {
        let mut ids = IdRegistry::new();
        let st = make_station(&mut ids);
        let src = ids.next_source();
        let pv = PointingVector::new(st.id, src, 0.0, 0.5, 0.0, 0.0, 100);
        assert_eq!(st.slew_time(&pv), 0);
    }

    #[test]
    fn commit_updates_counters_and_current() {
        let mut ids = IdRegistry::new();
        let mut st = make_station(&mut ids);
        let src = ids.next_source();
        let pv = PointingVector::new(st.id, src, 0.0, 0.5, 0.0, 0.0, 100);
        st.commit(pv, 30, false);
        assert_eq!(st.counters.num_scans, 1);
        assert_eq!(st.counters.total_obs_time_s, 30);
        assert!(!st.parameters.first_scan);
        assert_eq!(st.current.unwrap().time, 100);
    }
}
