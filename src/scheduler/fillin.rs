// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The fillin overlay: after committing the main scan, any
//! station left idle by it gets a chance at a short fillin scan of its
//! own, built with `fillin_mode` and [`ScanType::Fillin`].

use crate::id::StationId;
use crate::scan::{Scan, ScanType};
use crate::subcon::select::select_best;
use crate::subcon::{self, Endposition};

use super::Scheduler;

/// Build and, if one qualifies, commit a single fillin scan for whichever
/// stations the just-committed scan left idle ("Fillin").
/// Busy stations are temporarily marked unavailable so [`subcon::build::station_is_eligible`]
/// excludes them without disturbing their real `available` flag.
pub fn run(scheduler: &mut Scheduler, last_scan: Scan, committed: &mut Vec<Scan>) {
    let busy: Vec<StationId> = last_scan.station_ids().copied().collect();
    let idle_count = scheduler
        .network
        .stations_in_order()
        .filter(|s| !busy.contains(&s.id) && s.parameters.available && s.parameters.available_for_fillin)
        .count();
    if idle_count < 2 {
        return;
    }

    let mut saved = Vec::new();
    for &station_id in &busy {
        if let Some(station) = scheduler.network.station_mut(station_id) {
            saved.push((station_id, station.parameters.available));
            station.parameters.available = false;
        }
    }

    let sources: Vec<crate::source::Source> = if scheduler.config.avoid_satellites.0 {
        scheduler
            .sources
            .iter()
            .filter(|s| !matches!(s.kind, crate::source::SourceKind::Satellite { .. }))
            .cloned()
            .collect()
    } else {
        scheduler.sources.clone()
    };

    let past_influences = scheduler.past_influences_by_station();
    let current_time = scheduler.current_time;

    let candidates = subcon::build_single_candidates(
        &sources,
        &mut scheduler.network,
        &scheduler.astro,
        &scheduler.time_system,
        &scheduler.config,
        &mut scheduler.ids,
        current_time,
        true,
        false,
        ScanType::Fillin,
        &past_influences,
    );

    let found = candidates.ok().and_then(|candidates| {
        if candidates.is_empty() {
            return None;
        }
        let network = &mut scheduler.network;
        let astro = &scheduler.astro;
        let time_system = &scheduler.time_system;
        let config = &scheduler.config;
        let ids = &mut scheduler.ids;

        select_best(candidates, move |scan| {
            let source = sources.iter().find(|s| s.id == scan.source_id)?;
            let candidate = subcon::build::build_candidate(source, network, astro, time_system, current_time, true, false)?;
            let endpositions: Vec<Endposition> = Vec::new();
            let refined = subcon::feasibility::refine_candidate(candidate, source, network, config, ids, &endpositions, ScanType::Fillin)?;
            let (mean_station, mean_baseline, mean_source) = subcon::mean_stats(&sources, network);
            let n_avail = network
                .stations_in_order()
                .filter(|st| subcon::build::station_is_eligible(st, source, false))
                .count() as u32;
            let score = subcon::score_single_scan(&refined, source, network, config, n_avail, mean_station, mean_baseline, mean_source, &std::collections::HashMap::new());
            Some(subcon::ScoredScan { scan: refined, score })
        })
    });

    for (station_id, available) in saved {
        if let Some(station) = scheduler.network.station_mut(station_id) {
            station.parameters.available = available;
        }
    }

    if let Some(scan) = found {
        scheduler.commit_scan(&scan, false);
        committed.push(scan);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro::AstronomicalParameters;
    use crate::config::Config;
    use crate::coord::Position;
    use crate::event::EventList;
    use crate::id::IdRegistry;
    use crate::network::{Network, SkyCoverage};
    use crate::scan::ScanTimes;
    use crate::station::{antenna, CableWrap, Equipment, HorizonMask, MountKinematics, Station, StationParameters};
    use crate::time::TimeSystem;
    use std::collections::HashMap;

    fn make_station(ids: &mut IdRegistry, name: &str, x: f64, y: f64, z: f64) -> Station {
        let axis = antenna::AxisRate {
            rate: 0.1,
            accel: 0.1,
            settle_s: 1.0,
        };
        let mut params = StationParameters::default();
        params.min_elevation_rad = 0.0;
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
    fn too_few_idle_stations_skips_fillin_without_panicking() {
        let mut ids = IdRegistry::new();
        let a = make_station(&mut ids, "A", 6_378_137.0, 0.0, 0.0);
        let network = Network::new(vec![a], &mut ids);
        let astro = AstronomicalParameters::build(60, 60, |_t| (0.0, 0.0, 0.0, [0.0; 3]));
        let time_system = TimeSystem::new(hifitime::Epoch::from_mjd_utc(58849.0), hifitime::Epoch::from_mjd_utc(58849.0 + 60.0 / 86400.0));
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
            max_step_retries: 3,
        };
        let mut scheduler = Scheduler::new(network, vec![], astro, time_system, config, ids, sky_coverage);
        let mut committed = Vec::new();
        let empty_scan = Scan::new(
            scheduler.ids.next_scan(),
            ScanType::Single,
            scheduler.ids.next_source(),
            HashMap::new(),
            ScanTimes::new(vec![]),
            vec![],
        );
        run(&mut scheduler, empty_scan, &mut committed);
        assert!(committed.is_empty());
    }
}
