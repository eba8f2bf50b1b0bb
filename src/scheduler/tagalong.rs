// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The tagalong overlay: stations flagged `tagalong` ride along on any scan
//! they can reach without affecting that scan's selection, contributing
//! whatever baselines they can form with the stations already in it.

use std::collections::HashMap;

use crate::coord::rigorous_az_el_from_radec;
use crate::id::StationId;
use crate::scan::{Scan, ScanTimes};
use crate::subcon::feasibility::size_observation;

use super::Scheduler;

/// Attempt to append every eligible `tagalong` station onto
/// `committed[scan_index]`. Runs after the scan's own selection/commit, so
/// a tagalong station never changes which scan was chosen.
pub fn run(scheduler: &mut Scheduler, committed: &mut [Scan], scan_index: usize) {
    let (source_id, busy, common_time) = {
        let scan = &committed[scan_index];
        let busy: Vec<StationId> = scan.station_ids().copied().collect();
        let common_time = scan
            .station_ids()
            .filter_map(|&id| scan.times.segments(id))
            .map(|seg| seg.end_preob)
            .max()
            .unwrap_or(0);
        (scan.source_id, busy, common_time)
    };

    let Some(source) = scheduler.sources.iter().find(|s| s.id == source_id).cloned() else {
        return;
    };

    let candidate_ids: Vec<StationId> = scheduler
        .network
        .stations_in_order()
        .filter(|s| s.parameters.tagalong && s.parameters.available && !busy.contains(&s.id))
        .map(|s| s.id)
        .collect();

    for station_id in candidate_ids {
        let radec = source.position_at(common_time);

        let pv = {
            let station = scheduler.network.station_mut(station_id).expect("candidate station must exist");
            let cache = station.az_el_cache_for(source.id);
            match cache.simple(station_id, source.id, common_time) {
                Some(pv) => pv,
                None => {
                    let position = station.position;
                    let pv = rigorous_az_el_from_radec(station_id, source.id, &position, &radec, &scheduler.astro, &scheduler.time_system, common_time);
                    cache.push_rigorous(pv);
                    pv
                }
            }
        };

        let station = scheduler.network.station(station_id).expect("candidate station must exist");
        if !station.is_visible(&pv, source.parameters.min_elevation_rad) {
            continue;
        }
        let slew_s = station.slew_time(&pv);
        if slew_s < station.parameters.min_slew_time_s || slew_s > station.parameters.max_slew_time_s {
            continue;
        }

        let end_last_scan = station.current.map(|c| c.time).unwrap_or(common_time);

        let scan = &committed[scan_index];
        let mut temp_pointing_vectors: HashMap<StationId, crate::coord::PointingVector> = scan.pointing_vectors.clone();
        temp_pointing_vectors.insert(station_id, pv);
        let mut temp_times: ScanTimes = scan.times.clone();
        temp_times.insert_station(station_id, end_last_scan);
        temp_times.add_segment(station_id, 0, slew_s, station.parameters.preob_s);

        let mut new_observations = Vec::new();
        for &other in &busy {
            if let Some(obs) = size_observation(station_id, other, &source, &scheduler.network, &temp_pointing_vectors, &temp_times, &mut scheduler.ids) {
                new_observations.push(obs);
            }
        }
        if new_observations.is_empty() {
            continue;
        }

        let min_duration = new_observations.iter().map(|o| o.duration_s).min().unwrap_or(0);
        if min_duration < station.parameters.min_scan_s || min_duration > station.parameters.max_scan_s {
            continue;
        }

        let scan = &mut committed[scan_index];
        scan.insert_tagalong_station(pv, end_last_scan, new_observations);
        scan.times.add_segment(station_id, 0, slew_s, station.parameters.preob_s);
        scan.times.set_observing_duration(station_id, min_duration);

        let mut end_pv = pv;
        end_pv.time = scan.times.segments(station_id).map(|seg| seg.end_observing).unwrap_or(common_time);
        if let Some(station) = scheduler.network.station_mut(station_id) {
            station.commit(end_pv, min_duration, true);
        }
        scheduler.sky_coverage.record(end_pv, scheduler.config.sky_coverage.max_influence_time_s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro::AstronomicalParameters;
    use crate::config::Config;
    use crate::coord::{Position, RADec};
    use crate::event::EventList;
    use crate::id::IdRegistry;
    use crate::network::{Network, SkyCoverage};
    use crate::scan::ScanType;
    use crate::source::{FluxModel, Source, SourceKind, SourceParameters};
    use crate::station::{antenna, CableWrap, Equipment, HorizonMask, MountKinematics, Station, StationParameters};
    use crate::time::TimeSystem;

    fn make_station(ids: &mut IdRegistry, name: &str, x: f64, y: f64, z: f64, tagalong: bool) -> Station {
        let axis = antenna::AxisRate {
            rate: 0.1,
            accel: 0.1,
            settle_s: 1.0,
        };
        let mut params = StationParameters::default();
        params.min_elevation_rad = 0.0;
        params.tagalong = tagalong;
        params.preob_s = 1;
        params.min_scan_s = 1;
        params.max_scan_s = 600;
        params.recording_rate_mbps.insert("X".to_string(), 512.0);
        params.min_snr.insert("X".to_string(), 5.0);
        Station::new(
            ids.next_station(),
            name,
            MountKinematics::AzElSimple { az: axis, el: axis },
            CableWrap::new(0.0, crate::constants::TAU, 0.0, crate::constants::TAU),
            Position::from_ecef(x, y, z),
            Equipment::Constant {
                sefd_jy: HashMap::from([("X".to_string(), 500.0)]),
            },
            HorizonMask::None,
            params,
            EventList::new(vec![]),
        )
    }

    #[test]
    fn no_tagalong_stations_leaves_the_scan_unchanged() {
        let mut ids = IdRegistry::new();
        let a = make_station(&mut ids, "A", 6_378_137.0, 0.0, 0.0, false);
        let b = make_station(&mut ids, "B", 0.0, 6_378_137.0, 0.0, false);
        let (a_id, b_id) = (a.id, b.id);
        let network = Network::new(vec![a, b], &mut ids);

        let source = Source::new(
            ids.next_source(),
            "SRC",
            SourceKind::Quasar { radec: RADec::new_degrees(30.0, 45.0) },
            HashMap::from([("X".to_string(), FluxModel::Constant { flux_jy: 10.0 })]),
            SourceParameters::default(),
            EventList::new(vec![]),
        );
        let source_id = source.id;

        let astro = AstronomicalParameters::build(3600, 60, |_t| (0.0, 0.0, 0.0, [0.0; 3]));
        let time_system = TimeSystem::new(hifitime::Epoch::from_mjd_utc(58849.0), hifitime::Epoch::from_mjd_utc(58849.0 + 3600.0 / 86400.0));
        let sky_coverage = SkyCoverage::build(&network, 0.0);
        let config = Config {
            weights: Default::default(),
            sky_coverage: Default::default(),
            subnetting: Default::default(),
            alignment_anchor: crate::scan::AlignmentAnchor::Start,
            calibrator_block: None,
            avoid_satellites: Default::default(),
            astro_grid_step_s: 60,
            max_number_of_scans: 5,
            max_step_retries: 25,
        };
        let mut scheduler = Scheduler::new(network, vec![source], astro, time_system, config, ids, sky_coverage);

        let mut pvs = HashMap::new();
        pvs.insert(a_id, crate::coord::PointingVector::new(a_id, source_id, 0.5, 0.6, 0.1, 0.3, 0));
        pvs.insert(b_id, crate::coord::PointingVector::new(b_id, source_id, 0.5, 0.6, 0.1, 0.3, 0));
        let scan = Scan::new(scheduler.ids.next_scan(), ScanType::Single, source_id, pvs, ScanTimes::new(vec![a_id, b_id]), vec![]);
        let mut committed = vec![scan];

        run(&mut scheduler, &mut committed, 0);
        assert_eq!(committed[0].num_stations(), 2);
    }
}
