// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Candidate-scan construction: source/station eligibility and per-station
//! tentative pointing placement.

use std::collections::HashMap;

use crate::astro::AstronomicalParameters;
use crate::coord::{rigorous_az_el_from_radec, PointingVector};
use crate::id::{SourceId, StationId};
use crate::network::Network;
use crate::source::Source;
use crate::time::{SessionSeconds, TimeSystem};

/// A just-built candidate, before feasibility filtering has computed its
/// `ScanTimes`/`Observation`s (the output, consumed by ).
#[derive(Clone, Debug)]
pub struct CandidateScan {
    pub source_id: SourceId,
    pub pointing_vectors: HashMap<StationId, PointingVector>,
}

/// `s.available` false, or the source was scheduled within `minRepeat/2`
/// (step 1).
pub(crate) fn source_is_buildable(source: &Source, current_time: SessionSeconds, fillin_mode: bool) -> bool {
    if !source.parameters.available || !source.parameters.global_available {
        return false;
    }
    if fillin_mode && !source.parameters.available_for_fillin {
        return false;
    }
    if !source.has_scan_quota_remaining() {
        return false;
    }
    // step 1: skip if already scheduled within minRepeat/2.
    let half_repeat = source.parameters.min_repeat_s / 2;
    match source.seconds_since_last_scan(current_time) {
        Some(elapsed) => elapsed >= half_repeat,
        None => true,
    }
}

/// Whether a station is eligible to be considered for this source at all
/// (step 2): available, non-tagalong (unless a calibrator/
/// parallactic mode explicitly allows tagalong), under its total-obs and
/// scan-count caps, and not on either side's ignore list.
pub(crate) fn station_is_eligible(station: &crate::station::Station, source: &Source, allow_tagalong: bool) -> bool {
    if !station.parameters.available {
        return false;
    }
    if station.parameters.tagalong && !allow_tagalong {
        return false;
    }
    if station.counters.total_obs_time_s >= station.parameters.max_total_obs_time_s {
        return false;
    }
    if station.counters.num_scans >= station.parameters.max_number_of_scans {
        return false;
    }
    if station.parameters.ignore_sources.contains(&source.id) {
        return false;
    }
    if source.parameters.ignores(station.id) {
        return false;
    }
    true
}

/// Build one candidate scan for `source` at `current_time`.
/// Mutates each considered station's AzEl cache when a rigorous seed sample
/// is needed ("A station must call the rigorous path before
/// relying on the simple path for new times").
pub fn build_candidate(
    source: &Source,
    network: &mut Network,
    astro: &AstronomicalParameters,
    time_system: &TimeSystem,
    current_time: SessionSeconds,
    fillin_mode: bool,
    allow_tagalong: bool,
) -> Option<CandidateScan> {
    if !source_is_buildable(source, current_time, fillin_mode) {
        return None;
    }

    let station_ids: Vec<StationId> = network.stations_in_order().map(|s| s.id).collect();
    let mut eligible_count = 0u32;
    let mut pointing_vectors = HashMap::new();

    for station_id in station_ids {
        let (eligible, tentative_time) = {
            let station = network.station(station_id).expect("station must exist");
            let eligible = station_is_eligible(station, source, allow_tagalong);
            if !eligible {
                (false, 0)
            } else {
                let tentative_time = if station.parameters.first_scan {
                    current_time
                } else {
                    let base = station.current.map(|pv| pv.time).unwrap_or(current_time);
                    base + station.parameters.system_delay_s + station.parameters.preob_s
                };
                (true, tentative_time)
            }
        };
        if !eligible {
            continue;
        }
        eligible_count += 1;

        let radec = source.position_at(tentative_time);
        let station = network.station_mut(station_id).expect("station must exist");
        let cache = station.az_el_cache_for(source.id);
        let pv = match cache.simple(station_id, source.id, tentative_time) {
            Some(pv) => pv,
            None => {
                let pv = rigorous_az_el_from_radec(station_id, source.id, &station.position, &radec, astro, time_system, tentative_time);
                cache.push_rigorous(pv);
                pv
            }
        };

        if station.is_visible(&pv, source.parameters.min_elevation_rad) {
            pointing_vectors.insert(station_id, pv);
        }
    }

    let has_required = source
        .parameters
        .required_stations
        .iter()
        .all(|s| pointing_vectors.contains_key(s));
    if !has_required {
        return None;
    }

    let n = pointing_vectors.len() as u32;
    let meets_minimum = n >= source.parameters.min_number_of_stations;
    let uses_all_eligible = n == eligible_count && n >= 2;
    if !(meets_minimum || uses_all_eligible) {
        return None;
    }

    Some(CandidateScan {
        source_id: source.id,
        pointing_vectors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Position;
    use crate::event::EventList;
    use crate::id::IdRegistry;
    use crate::source::{FluxModel, SourceKind, SourceParameters};
    use crate::station::{antenna, CableWrap, Equipment, HorizonMask, MountKinematics, Station, StationParameters};
    use std::collections::HashMap as StdHashMap;

    fn make_station(ids: &mut IdRegistry, x: f64, y: f64, z: f64) -> Station {
        let rate = 0.0349;
        let axis = antenna::AxisRate {
            rate,
            accel: rate,
            settle_s: 6.0,
        };
        let mut params = StationParameters::default();
        params.min_elevation_rad = 0.0;
        Station::new(
            ids.next_station(),
            "TEST",
            MountKinematics::AzElSimple { az: axis, el: axis },
            CableWrap::new(0.0, crate::constants::TAU, 0.0, crate::constants::TAU),
            Position::from_ecef(x, y, z),
            Equipment::Constant {
                sefd_jy: StdHashMap::from([("X".to_string(), 1000.0)]),
            },
            HorizonMask::None,
            params,
            EventList::new(vec![]),
        )
    }

    fn flat_astro() -> AstronomicalParameters {
        AstronomicalParameters::build(3600, 60, |_t| (0.0, 0.0, 0.0, [0.0; 3]))
    }

    #[test]
    fn unavailable_source_yields_no_candidate() {
        let mut ids = IdRegistry::new();
        let a = make_station(&mut ids, 6_378_137.0, 0.0, 0.0);
        let b = make_station(&mut ids, 0.0, 6_378_137.0, 0.0);
        let mut network = Network::new(vec![a, b], &mut ids);
        let mut source = Source::new(
            ids.next_source(),
            "SRC",
            SourceKind::Quasar {
                radec: crate::coord::RADec::new_degrees(45.0, 20.0),
            },
            StdHashMap::from([("X".to_string(), FluxModel::Constant { flux_jy: 1.0 })]),
            SourceParameters::default(),
            EventList::new(vec![]),
        );
        source.parameters.available = false;
        let astro = flat_astro();
        let ts = crate::time::TimeSystem::new(
            hifitime::Epoch::from_mjd_utc(58849.0),
            hifitime::Epoch::from_mjd_utc(58850.0),
        );
        let candidate = build_candidate(&source, &mut network, &astro, &ts, 0, false, false);
        assert!(candidate.is_none());
    }

    #[test]
    fn source_with_quota_exhausted_is_skipped() {
        let mut ids = IdRegistry::new();
        let a = make_station(&mut ids, 6_378_137.0, 0.0, 0.0);
        let mut network = Network::new(vec![a], &mut ids);
        let mut source = Source::new(
            ids.next_source(),
            "SRC",
            SourceKind::Quasar {
                radec: crate::coord::RADec::new_degrees(45.0, 20.0),
            },
            StdHashMap::new(),
            SourceParameters::default(),
            EventList::new(vec![]),
        );
        source.parameters.max_number_of_scans = 0;
        let astro = flat_astro();
        let ts = crate::time::TimeSystem::new(
            hifitime::Epoch::from_mjd_utc(58849.0),
            hifitime::Epoch::from_mjd_utc(58850.0),
        );
        assert!(build_candidate(&source, &mut network, &astro, &ts, 0, false, false).is_none());
    }
}
