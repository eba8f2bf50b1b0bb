// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Feasibility filtering and timing.

use std::collections::HashMap;

use crate::config::{AlignmentAnchor, Config};
use crate::id::{IdRegistry, StationId};
use crate::network::Network;
use crate::observation::{self, Observation};
use crate::scan::{Scan, ScanTimes, ScanType};
use crate::source::Source;
use crate::time::SessionSeconds;

use super::build::CandidateScan;

/// An optional constraint that a later scan already requires a station to
/// reach a specific pointing by a given time (`Endposition`).
#[derive(Clone, Copy, Debug)]
pub struct Endposition {
    pub station_id: StationId,
    pub required_by_time: SessionSeconds,
}

/// Turn a [`CandidateScan`] into a fully timed [`Scan`] with sized
/// observations, dropping stations that cannot satisfy a constraint.
/// Returns `None` if the scan falls below the source's
/// `minNumberOfStations` at any point.
pub fn refine_candidate(
    candidate: CandidateScan,
    source: &Source,
    network: &Network,
    config: &Config,
    ids: &mut IdRegistry,
    endpositions: &[Endposition],
    scan_type: ScanType,
) -> Option<Scan> {
    let mut pointing_vectors = candidate.pointing_vectors;

    // Step 1: unwrap az relative to current az, compute slew, enforce
    // station slew bounds.
    let mut dropped = Vec::new();
    for (&station_id, pv) in pointing_vectors.iter_mut() {
        let Some(station) = network.station(station_id) else {
            dropped.push(station_id);
            continue;
        };
        if let Some(current_pv) = &station.current {
            station.cable_wrap.unwrap_az_near_az(pv, current_pv.az);
        }
        let slew_s = station.slew_time(pv);
        let slew_distance = station
            .current
            .map(|current| (pv.az - current.az).abs().max((pv.el - current.el).abs()))
            .unwrap_or(0.0);
        if slew_s < station.parameters.min_slew_time_s
            || slew_s > station.parameters.max_slew_time_s
            || slew_distance < station.parameters.min_slew_distance_rad
            || slew_distance > station.parameters.max_slew_distance_rad
        {
            dropped.push(station_id);
        }
    }
    for station_id in dropped {
        pointing_vectors.remove(&station_id);
    }
    if below_minimum(pointing_vectors.len() as u32, source) {
        return None;
    }

    // Step 2: endposition reachability — an optimistic 5s-slew + minScan
    // must still leave room before the required time.
    for ep in endpositions {
        if let Some(pv) = pointing_vectors.get(&ep.station_id) {
            let min_scan = network
                .station(ep.station_id)
                .map(|s| s.parameters.min_scan_s)
                .unwrap_or(1);
            if pv.time + 5 + min_scan > ep.required_by_time {
                pointing_vectors.remove(&ep.station_id);
            }
        }
    }
    if below_minimum(pointing_vectors.len() as u32, source) {
        return None;
    }

    // Step 3: compute (fs, slew, preob) per station and build the scan's
    // timeline.
    let stations: Vec<StationId> = pointing_vectors.keys().copied().collect();
    let mut times = ScanTimes::new(stations.clone());
    for &station_id in &stations {
        let station = network.station(station_id).expect("station retained above must exist");
        let pv = pointing_vectors[&station_id];
        let last_time = station.current.map(|c| c.time).unwrap_or(pv.time);
        times.set_end_last_scan(station_id, last_time);

        let slew_s = station.slew_time(&pv);
        let fs_s = 0; // Field-system duration is a catalog-provided constant
                      // not modelled further here.
        times.add_segment(station_id, fs_s, slew_s, station.parameters.preob_s);
    }

    // Step 4: build and size one Observation per baseline fully inside the
    // scan.
    let mut observations = Vec::new();
    for i in 0..stations.len() {
        for j in (i + 1)..stations.len() {
            let (a, b) = (stations[i], stations[j]);
            if let Some(obs) = size_observation(a, b, source, network, &pointing_vectors, &times, ids) {
                observations.push(obs);
            }
        }
    }

    // Step 5: per-station observing duration is the minimum over its
    // baseline durations; apply alignment; drop stations below minScan.
    let mut min_duration_by_station: HashMap<StationId, u32> = HashMap::new();
    for obs in &observations {
        for station_id in [obs.station1, obs.station2] {
            min_duration_by_station
                .entry(station_id)
                .and_modify(|d| *d = (*d).min(obs.duration_s))
                .or_insert(obs.duration_s);
        }
    }

    times.align(config.alignment_anchor, &min_duration_by_station);

    let mut to_drop = Vec::new();
    for &station_id in &stations {
        let Some(station) = network.station(station_id) else {
            continue;
        };
        let Some(seg) = times.segments(station_id) else {
            continue;
        };
        let observing_s = seg.end_observing.saturating_sub(seg.end_preob);
        let below_or_over_scan = observing_s < station.parameters.min_scan_s || observing_s > station.parameters.max_scan_s;
        // check max idle per station vs alignment anchor; if maxWait is
        // exceeded, drop the laggard station.
        let idle_s = seg.end_idle.saturating_sub(seg.end_slew);
        let over_max_wait = idle_s > station.parameters.max_wait_s;
        if below_or_over_scan || over_max_wait {
            to_drop.push(station_id);
        }
    }
    for station_id in to_drop {
        pointing_vectors.remove(&station_id);
        times.drop_station(station_id);
        observations.retain(|o| o.station1 != station_id && o.station2 != station_id);
    }

    if below_minimum(pointing_vectors.len() as u32, source) {
        return None;
    }
    if observations.is_empty() {
        // Every observation was pruned: this candidate cannot produce
        // correlatable data regardless of station count.
        return None;
    }

    let scan_id = ids.next_scan();
    Some(Scan::new(scan_id, scan_type, source.id, pointing_vectors, times, observations))
}

fn below_minimum(n: u32, source: &Source) -> bool {
    n < source.parameters.min_number_of_stations.max(2)
}

/// Size one baseline's observation for the given band set.
/// Uses the first band both stations' equipment declares a recording rate
/// and the source a flux model for, a simplification of a full per-band
/// IF/BBC stack.
pub(crate) fn size_observation(
    station1: StationId,
    station2: StationId,
    source: &Source,
    network: &Network,
    pointing_vectors: &HashMap<StationId, crate::coord::PointingVector>,
    times: &ScanTimes,
    ids: &mut IdRegistry,
) -> Option<Observation> {
    let st1 = network.station(station1)?;
    let st2 = network.station(station2)?;
    let pv1 = pointing_vectors.get(&station1)?;
    let pv2 = pointing_vectors.get(&station2)?;

    let band = common_band(st1, st2, source)?;

    let sefd1 = st1.equipment.sefd(&band, pv1.el)?;
    let sefd2 = st2.equipment.sefd(&band, pv2.el)?;

    let flux_model = source.flux_model(&band)?;
    let flux_jy = if flux_model.needs_el_dist() {
        let min_el = pv1.el.min(pv2.el);
        let dist_km = st1.position.distance_to(&st2.position) / 1000.0;
        flux_model.observed_el_dist(min_el, dist_km)
    } else if flux_model.needs_uv() {
        let baseline_m = st1.position.vector_to(&st2.position);
        let (u, v) = observation::project_uv(baseline_m, pv1.ha, pv1.dc);
        flux_model.observed_uv(u, v)
    } else {
        flux_model.max()
    };

    let rec_rate = st1
        .parameters
        .recording_rate_mbps
        .get(&band)
        .copied()
        .unwrap_or(0.0)
        .min(st2.parameters.recording_rate_mbps.get(&band).copied().unwrap_or(0.0));

    let min_snr = st1
        .parameters
        .min_snr
        .get(&band)
        .copied()
        .unwrap_or(0.0)
        .max(st2.parameters.min_snr.get(&band).copied().unwrap_or(0.0));

    let min_scan = st1.parameters.min_scan_s.max(st2.parameters.min_scan_s);
    let max_scan = st1.parameters.max_scan_s.min(st2.parameters.max_scan_s);

    let snr_per_s = observation::snr_per_second(flux_jy, sefd1, sefd2, rec_rate);
    let duration_s = observation::required_duration_s(min_snr, snr_per_s, min_scan, max_scan)?;

    let start = times
        .segments(station1)
        .map(|s| s.end_preob)
        .unwrap_or(pv1.time)
        .max(times.segments(station2).map(|s| s.end_preob).unwrap_or(pv2.time));

    Some(Observation::new(ids.next_observation(), station1, station2, band, start, duration_s))
}

pub(crate) fn common_band(st1: &crate::station::Station, st2: &crate::station::Station, source: &Source) -> Option<String> {
    st1.parameters
        .recording_rate_mbps
        .keys()
        .find(|band| st2.parameters.recording_rate_mbps.contains_key(*band) && source.flux_model(band).is_some())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{Position, RADec};
    use crate::event::EventList;
    use crate::source::{FluxModel, SourceKind, SourceParameters};
    use crate::station::{antenna, CableWrap, Equipment, HorizonMask, MountKinematics, Station, StationParameters};
    use std::collections::HashMap as StdHashMap;

    fn make_station(ids: &mut IdRegistry, x: f64, y: f64, z: f64, rec_rate: f64) -> Station {
        let rate = 0.5;
        let axis = antenna::AxisRate {
            rate,
            accel: rate,
            settle_s: 1.0,
        };
        let mut params = StationParameters::default();
        params.recording_rate_mbps.insert("X".to_string(), rec_rate);
        params.min_snr.insert("X".to_string(), 10.0);
        params.preob_s = 5;
        params.min_scan_s = 5;
        params.max_scan_s = 600;
        params.min_elevation_rad = 0.0;
        Station::new(
            ids.next_station(),
            "TEST",
            MountKinematics::AzElSimple { az: axis, el: axis },
            CableWrap::new(0.0, crate::constants::TAU, 0.0, crate::constants::TAU),
            Position::from_ecef(x, y, z),
            Equipment::Constant {
                sefd_jy: StdHashMap::from([("X".to_string(), 500.0)]),
            },
            HorizonMask::None,
            params,
            EventList::new(vec![]),
        )
    }

    #[test]
    fn refine_candidate_produces_sized_observations() {
        let mut ids = IdRegistry::new();
        let a = make_station(&mut ids, 6_378_137.0, 0.0, 0.0, 512.0);
        let b = make_station(&mut ids, 0.0, 6_378_137.0, 0.0, 512.0);
        let (a_id, b_id) = (a.id, b.id);
        let network = Network::new(vec![a, b], &mut ids);

        let source = Source::new(
            ids.next_source(),
            "SRC",
            SourceKind::Quasar {
                radec: RADec::new_degrees(45.0, 30.0),
            },
            StdHashMap::from([("X".to_string(), FluxModel::Constant { flux_jy: 5.0 })]),
            SourceParameters::default(),
            EventList::new(vec![]),
        );

        let mut pvs = HashMap::new();
        pvs.insert(a_id, crate::coord::PointingVector::new(a_id, source.id, 0.5, 0.6, 0.1, 0.3, 0));
        pvs.insert(b_id, crate::coord::PointingVector::new(b_id, source.id, 0.5, 0.6, 0.1, 0.3, 0));
        let candidate = CandidateScan {
            source_id: source.id,
            pointing_vectors: pvs,
        };

        let config = Config {
            weights: Default::default(),
            sky_coverage: Default::default(),
            subnetting: Default::default(),
            alignment_anchor: AlignmentAnchor::Start,
            calibrator_block: None,
            avoid_satellites: Default::default(),
            astro_grid_step_s: 300,
            max_number_of_scans: u32::MAX,
            max_step_retries: 25,
        };

        let scan = refine_candidate(candidate, &source, &network, &config, &mut ids, &[], ScanType::Single);
        let scan = scan.expect("two visible stations with matching bands should produce a scan");
        assert_eq!(scan.observations.len(), 1);
        assert!(scan.observations[0].duration_s >= 5);
    }

    #[test]
    fn mismatched_bands_yield_no_observations_and_no_scan() {
        let mut ids = IdRegistry::new();
        let mut a = make_station(&mut ids, 6_378_137.0, 0.0, 0.0, 512.0);
        let mut b = make_station(&mut ids, 0.0, 6_378_137.0, 0.0, 512.0);
        a.parameters.recording_rate_mbps.clear();
        a.parameters.recording_rate_mbps.insert("S".to_string(), 256.0);
        b.parameters.recording_rate_mbps.clear();
        b.parameters.recording_rate_mbps.insert("X".to_string(), 512.0);
        let (a_id, b_id) = (a.id, b.id);
        let network = Network::new(vec![a, b], &mut ids);

        let source = Source::new(
            ids.next_source(),
            "SRC",
            SourceKind::Quasar {
                radec: RADec::new_degrees(45.0, 30.0),
            },
            StdHashMap::from([("X".to_string(), FluxModel::Constant { flux_jy: 5.0 })]),
            SourceParameters::default(),
            EventList::new(vec![]),
        );

        let mut pvs = HashMap::new();
        pvs.insert(a_id, crate::coord::PointingVector::new(a_id, source.id, 0.5, 0.6, 0.1, 0.3, 0));
        pvs.insert(b_id, crate::coord::PointingVector::new(b_id, source.id, 0.5, 0.6, 0.1, 0.3, 0));
        let candidate = CandidateScan {
            source_id: source.id,
            pointing_vectors: pvs,
        };

        let config = Config {
            weights: Default::default(),
            sky_coverage: Default::default(),
            subnetting: Default::default(),
            alignment_anchor: AlignmentAnchor::Start,
            calibrator_block: None,
            avoid_satellites: Default::default(),
            astro_grid_step_s: 300,
            max_number_of_scans: u32::MAX,
            max_step_retries: 25,
        };

        let scan = refine_candidate(candidate, &source, &network, &config, &mut ids, &[], ScanType::Single);
        assert!(scan.is_none());
    }
}
