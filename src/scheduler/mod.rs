// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The scheduler driver: the main decision loop plus the
//! fillin, calibration, and tagalong overlays.

mod calibration;
mod fillin;
mod tagalong;

use std::collections::HashMap;

use thiserror::Error;

use crate::astro::AstronomicalParameters;
use crate::config::Config;
use crate::constants::DEFAULT_STEP_ADVANCE_S;
use crate::id::{IdRegistry, StationId};
use crate::network::{Network, SkyCoverage};
use crate::scan::{Scan, ScanType};
use crate::source::Source;
use crate::subcon::{self, scoring::PastInfluence, select::select_best, Endposition, ScoredScan, Selection, SubconError};
use crate::time::{AngularDistanceTable, SessionSeconds, TimeSystem};

/// Errors that escape per-candidate and per-step local recovery (:
/// "then abort the session with a diagnostic summary").
#[derive(Debug, Error)]
pub enum SchedulerLoopError {
    #[error("subcon produced no feasible scan for {retries} consecutive steps, aborting session at t={current_time}")]
    EmptyAfterRetries { retries: u32, current_time: SessionSeconds },

    #[error(transparent)]
    Subcon(#[from] SubconError),
}

/// The full mutable scheduling session: network, sources, and the
/// process-wide tables built once before the loop starts ("Shared
/// resources... owned by the scheduler; no locks are required").
pub struct Scheduler {
    pub network: Network,
    pub sources: Vec<Source>,
    pub astro: AstronomicalParameters,
    pub time_system: TimeSystem,
    pub config: Config,
    pub ids: IdRegistry,
    pub sky_coverage: SkyCoverage,
    angular_distance_table: AngularDistanceTable,
    current_time: SessionSeconds,
    scans_since_calibration: u32,
    time_since_calibration_s: SessionSeconds,
}

impl Scheduler {
    pub fn new(
        network: Network,
        sources: Vec<Source>,
        astro: AstronomicalParameters,
        time_system: TimeSystem,
        config: Config,
        ids: IdRegistry,
        sky_coverage: SkyCoverage,
    ) -> Self {
        Self {
            network,
            sources,
            astro,
            time_system,
            config,
            ids,
            sky_coverage,
            angular_distance_table: AngularDistanceTable::build(),
            current_time: 0,
            scans_since_calibration: 0,
            time_since_calibration_s: 0,
        }
    }

    /// Run the full session to completion and return every committed scan
    /// in strict start-time order ("Ordering").
    pub fn run(&mut self) -> Result<Vec<Scan>, SchedulerLoopError> {
        let mut committed = Vec::new();

        while !self.time_system.is_past_end(self.current_time) && committed.len() < self.config.max_number_of_scans as usize {
            let use_calibrator_mode = calibration::due(&self.config, self.scans_since_calibration, self.time_since_calibration_s);

            let Some(selection) = self.step(use_calibrator_mode)? else {
                break;
            };

            self.commit(selection, &mut committed, use_calibrator_mode);

            if let Some(last) = committed.last().cloned() {
                let scan_index = committed.len() - 1;
                fillin::run(self, last, &mut committed);
                tagalong::run(self, &mut committed, scan_index);
            }
        }

        Ok(committed)
    }

    /// One decision point: poll events, build and select a scan, retrying
    /// with a time advance on an empty subcon up to `max_step_retries`
    /// times ("Infeasibility (per step)").
    fn step(&mut self, calibrator_mode: bool) -> Result<Option<Selection>, SchedulerLoopError> {
        let mut retries = 0u32;
        loop {
            self.poll_events();
            if self.time_system.is_past_end(self.current_time) {
                return Ok(None);
            }

            if let Some(selection) = self.build_and_select(calibrator_mode)? {
                return Ok(Some(selection));
            }

            retries += 1;
            if retries > self.config.max_step_retries {
                return Err(SchedulerLoopError::EmptyAfterRetries {
                    retries,
                    current_time: self.current_time,
                });
            }
            if !self.advance_time() {
                return Ok(None);
            }
        }
    }

    /// Apply every station/source/baseline event due at `current_time`.
    /// A hard break forces the current decision point to end cleanly and
    /// re-plan; since every [`Self::step`] already builds a fresh candidate
    /// set at `current_time` after polling, that re-plan falls out for free
    /// here and we only need the reactivation side effect on station
    /// bookkeeping.
    fn poll_events(&mut self) {
        let station_ids: Vec<StationId> = self.network.stations_in_order().map(|s| s.id).collect();
        for station_id in station_ids {
            let was_available;
            let mut hard_break = false;
            let new_params = {
                let station = self.network.station_mut(station_id).expect("station must exist");
                was_available = station.parameters.available;
                station.events.check_for_new_event(self.current_time, &mut hard_break)
            };
            if let Some(params) = new_params {
                let station = self.network.station_mut(station_id).expect("station must exist");
                let became_available = params.available && !was_available;
                station.parameters = params;
                if became_available {
                    station.reset_on_reactivation(self.current_time);
                }
            }
        }

        for source in self.sources.iter_mut() {
            let mut hard_break = false;
            if let Some(params) = source.events.check_for_new_event(self.current_time, &mut hard_break) {
                source.parameters = params;
            }
        }

        let baseline_pairs: Vec<(StationId, StationId)> = self.network.baselines().map(|b| (b.station1, b.station2)).collect();
        for (a, b) in baseline_pairs {
            let baseline = self.network.baseline_between_mut(a, b).expect("baseline must exist");
            let mut hard_break = false;
            if let Some(params) = baseline.events.check_for_new_event(self.current_time, &mut hard_break) {
                baseline.parameters = params;
            }
        }
    }

    /// Build every candidate at the current decision point and pick the
    /// best single scan or subnetting pair .
    fn build_and_select(&mut self, calibrator_mode: bool) -> Result<Option<Selection>, SchedulerLoopError> {
        let sources: Vec<Source> = if calibrator_mode {
            self.sources.iter().filter(|s| s.parameters.fringe_finder || s.parameters.astro_calibrator).cloned().collect()
        } else if self.config.avoid_satellites.0 {
            self.sources
                .iter()
                .filter(|s| !matches!(s.kind, crate::source::SourceKind::Satellite { .. }))
                .cloned()
                .collect()
        } else {
            self.sources.clone()
        };
        if sources.is_empty() {
            return Ok(None);
        }

        let scan_type = if calibrator_mode { ScanType::AstroCalibrator } else { ScanType::Single };

        let past_influences = self.past_influences_by_station();

        let singles = subcon::build_single_candidates(
            &sources,
            &mut self.network,
            &self.astro,
            &self.time_system,
            &self.config,
            &mut self.ids,
            self.current_time,
            false,
            false,
            scan_type,
            &past_influences,
        )?;

        let best_single = self.select_best_single(singles, &sources);

        let best_subnet = if calibrator_mode { None } else { self.select_best_subnet(&sources)? };

        let adjusted_single = best_single.map(|scan| {
            let score = if calibrator_mode { calibration::apply_elevation_ramps(&self.config, &self.network, &scan) } else { scan.score.unwrap_or(0.0) };
            (Selection::Single(scan), score)
        });

        match (adjusted_single, best_subnet) {
            (Some((sel, score)), Some((sub_sel, sub_score))) => {
                if sub_score > score {
                    Ok(Some(sub_sel))
                } else {
                    Ok(Some(sel))
                }
            }
            (Some((sel, _)), None) => Ok(Some(sel)),
            (None, Some((sub_sel, _))) => Ok(Some(sub_sel)),
            (None, None) => Ok(None),
        }
    }

    fn select_best_single(&mut self, singles: Vec<ScoredScan>, sources: &[Source]) -> Option<Scan> {
        if singles.is_empty() {
            return None;
        }
        let network = &mut self.network;
        let astro = &self.astro;
        let time_system = &self.time_system;
        let config = &self.config;
        let ids = &mut self.ids;
        let current_time = self.current_time;

        select_best(singles, move |scan| {
            let source = sources.iter().find(|s| s.id == scan.source_id)?;
            let candidate = subcon::build::build_candidate(source, network, astro, time_system, current_time, false, false)?;
            let refined = crate::subcon::feasibility::refine_candidate(candidate, source, network, config, ids, &[], scan.scan_type)?;
            let (mean_station, mean_baseline, mean_source) = subcon::mean_stats(sources, network);
            let n_avail = network.stations_in_order().filter(|st| subcon::build::station_is_eligible(st, source, false)).count() as u32;
            let score = subcon::score_single_scan(&refined, source, network, config, n_avail, mean_station, mean_baseline, mean_source, &HashMap::new());
            Some(ScoredScan { scan: refined, score })
        })
    }

    /// Build, refine, and score the best subnetting pair, if any qualifies.
    /// Both sides are refined independently and must still pass the hard
    /// time-separation guard.
    fn select_best_subnet(&mut self, sources: &[Source]) -> Result<Option<(Selection, f64)>, SchedulerLoopError> {
        let mut raw_candidates = HashMap::new();
        let mut n_avail_by_source = HashMap::new();
        for source in sources {
            if let Some(candidate) = subcon::build::build_candidate(source, &mut self.network, &self.astro, &self.time_system, self.current_time, false, false) {
                let n_avail = self.network.stations_in_order().filter(|st| subcon::build::station_is_eligible(st, source, false)).count() as u32;
                n_avail_by_source.insert(source.id, n_avail);
                raw_candidates.insert(source.id, candidate);
            }
        }
        if raw_candidates.len() < 2 {
            return Ok(None);
        }

        let (mean_station, mean_baseline, mean_source) = subcon::mean_stats(sources, &self.network);
        let partitions = subcon::build_subnet_candidates(sources, &self.network, &self.config, &raw_candidates, &n_avail_by_source, (mean_station, mean_baseline, mean_source))?;

        let mut best: Option<(Scan, Scan, f64)> = None;
        for (partition, source_a_id, source_b_id, score) in partitions {
            let Some(source_a) = sources.iter().find(|s| s.id == source_a_id) else { continue };
            let Some(source_b) = sources.iter().find(|s| s.id == source_b_id) else { continue };
            let Some(cand_a) = raw_candidates.get(&source_a_id) else { continue };
            let Some(cand_b) = raw_candidates.get(&source_b_id) else { continue };

            let restricted_a = restrict_candidate(cand_a, &partition.stations_a);
            let restricted_b = restrict_candidate(cand_b, &partition.stations_b);

            let endpositions_a: Vec<Endposition> = Vec::new();
            let endpositions_b: Vec<Endposition> = Vec::new();
            let Some(scan_a) = crate::subcon::feasibility::refine_candidate(restricted_a, source_a, &self.network, &self.config, &mut self.ids, &endpositions_a, ScanType::Subnet) else { continue };
            let Some(scan_b) = crate::subcon::feasibility::refine_candidate(restricted_b, source_b, &self.network, &self.config, &mut self.ids, &endpositions_b, ScanType::Subnet) else { continue };

            let end_a = scan_a.station_ids().filter_map(|&s| scan_a.times.segments(s)).map(|seg| seg.end_observing).max().unwrap_or(0);
            let end_b = scan_b.station_ids().filter_map(|&s| scan_b.times.segments(s)).map(|seg| seg.end_observing).max().unwrap_or(0);
            if !crate::subcon::subnetting::time_separation_ok(end_a, end_b, &self.config.subnetting) {
                continue;
            }

            if best.as_ref().map(|(_, _, best_score)| score > *best_score).unwrap_or(true) {
                best = Some((scan_a, scan_b, score));
            }
        }

        Ok(best.map(|(a, b, score)| (Selection::Subnet(Box::new(a), Box::new(b)), score)))
    }

    /// Commit a selection: update station/source/baseline counters, the
    /// sky-coverage streams, and the global current time (:
    /// "committed candidates update..."; calibration cadence
    /// bookkeeping).
    fn commit(&mut self, selection: Selection, committed: &mut Vec<Scan>, was_calibrator: bool) {
        match selection {
            Selection::Single(scan) => {
                self.commit_scan(&scan, false);
                committed.push(scan);
            }
            Selection::Subnet(a, b) => {
                self.commit_scan(&a, true);
                self.commit_scan(&b, true);
                committed.push(*a);
                committed.push(*b);
            }
        }

        let advance_to = committed
            .last()
            .map(|s| s.station_ids().filter_map(|&id| s.times.segments(id)).map(|seg| seg.end_observing).max().unwrap_or(self.current_time))
            .unwrap_or(self.current_time);
        self.current_time = self.current_time.max(advance_to);

        if was_calibrator {
            self.scans_since_calibration = 0;
            self.time_since_calibration_s = 0;
        } else {
            self.scans_since_calibration += 1;
        }
    }

    fn commit_scan(&mut self, scan: &Scan, is_subnetting_partner: bool) {
        for (&station_id, pv) in scan.pointing_vectors.iter() {
            let Some(seg) = scan.times.segments(station_id) else { continue };
            let obs_duration = seg.end_observing.saturating_sub(seg.end_preob);
            let mut end_pv = *pv;
            end_pv.time = seg.end_observing;
            if let Some(station) = self.network.station_mut(station_id) {
                station.commit(end_pv, obs_duration, is_subnetting_partner);
            }
            self.sky_coverage.record(end_pv, self.config.sky_coverage.max_influence_time_s);
        }
        for obs in &scan.observations {
            if let Some(baseline) = self.network.baseline_between_mut(obs.station1, obs.station2) {
                baseline.commit();
            }
        }
        let end_time = scan.station_ids().filter_map(|&id| scan.times.segments(id)).map(|seg| seg.end_observing).max().unwrap_or(self.current_time);
        if let Some(source) = self.sources.iter_mut().find(|s| s.id == scan.source_id) {
            source.commit(end_time);
        }
    }

    /// Advance `current_time` to the nearest pending event across stations,
    /// sources, and baselines, or by [`DEFAULT_STEP_ADVANCE_S`] if none is
    /// imminent . Returns `false` if doing so would run past
    /// the session end.
    fn advance_time(&mut self) -> bool {
        let mut next = self.current_time.saturating_add(DEFAULT_STEP_ADVANCE_S);

        for station in self.network.stations_in_order() {
            if let Some(t) = station.events.next_event_time() {
                if t > self.current_time && t < next {
                    next = t;
                }
            }
        }
        for source in &self.sources {
            if let Some(t) = source.events.next_event_time() {
                if t > self.current_time && t < next {
                    next = t;
                }
            }
        }
        for baseline in self.network.baselines() {
            if let Some(t) = baseline.events.next_event_time() {
                if t > self.current_time && t < next {
                    next = t;
                }
            }
        }

        if self.time_system.is_past_end(next) {
            self.current_time = self.time_system.duration_s;
            return false;
        }
        self.current_time = next;
        true
    }

    /// Raw `(angular_distance, time_since)` pairs per station from the
    /// sky-coverage streams, the input [`subcon::build_single_candidates`]
    /// needs for its `skyCoverage` scoring term.
    fn past_influences_by_station(&self) -> HashMap<StationId, Vec<PastInfluence>> {
        let mut map = HashMap::new();
        for station in self.network.stations_in_order() {
            let Some(current) = station.current else { continue };
            let raw = self.sky_coverage.past_influences(station.id, current.az, current.el, self.current_time, &self.angular_distance_table);
            let influences = raw
                .into_iter()
                .map(|(angular_distance_rad, time_since_s)| PastInfluence { angular_distance_rad, time_since_s })
                .collect();
            map.insert(station.id, influences);
        }
        map
    }
}

/// Restrict a raw candidate's pointing vectors to one subnetting side's
/// station list ("every way to split the shared stations").
fn restrict_candidate(candidate: &subcon::CandidateScan, stations: &[StationId]) -> subcon::CandidateScan {
    subcon::CandidateScan {
        source_id: candidate.source_id,
        pointing_vectors: candidate
            .pointing_vectors
            .iter()
            .filter(|(id, _)| stations.contains(id))
            .map(|(&id, &pv)| (id, pv))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{Position, RADec};
    use crate::event::EventList;
    use crate::source::{FluxModel, SourceKind, SourceParameters};
    use crate::station::{antenna, CableWrap, Equipment, HorizonMask, MountKinematics, Station, StationParameters};
    use std::collections::HashMap as StdHashMap;

    fn make_station(ids: &mut IdRegistry, name: &str, x: f64, y: f64, z: f64) -> Station {
        let rate = 0.1;
        let axis = antenna::AxisRate {
            rate,
            accel: rate,
            settle_s: 1.0,
        };
        let mut params = StationParameters::default();
        params.min_elevation_rad = 0.0;
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
                sefd_jy: StdHashMap::from([("X".to_string(), 500.0)]),
            },
            HorizonMask::None,
            params,
            EventList::new(vec![]),
        )
    }

    fn make_scheduler() -> Scheduler {
        let mut ids = IdRegistry::new();
        let a = make_station(&mut ids, "A", 6_378_137.0, 0.0, 0.0);
        let b = make_station(&mut ids, "B", 0.0, 6_378_137.0, 0.0);
        let network = Network::new(vec![a, b], &mut ids);
        let source = Source::new(
            ids.next_source(),
            "SRC",
            SourceKind::Quasar {
                radec: RADec::new_degrees(30.0, 45.0),
            },
            StdHashMap::from([("X".to_string(), FluxModel::Constant { flux_jy: 10.0 })]),
            SourceParameters::default(),
            EventList::new(vec![]),
        );
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
        Scheduler::new(network, vec![source], astro, time_system, config, ids, sky_coverage)
    }

    #[test]
    fn run_commits_at_least_one_scan_for_a_simple_two_station_network() {
        let mut scheduler = make_scheduler();
        let committed = scheduler.run().expect("session should not error");
        assert!(!committed.is_empty());
        assert!(committed[0].observations.iter().all(|o| o.duration_s >= 1));
    }

    #[test]
    fn commit_advances_station_counters() {
        let mut scheduler = make_scheduler();
        let committed = scheduler.run().expect("session should not error");
        let any_station_scanned = scheduler.network.stations_in_order().any(|s| s.counters.num_scans > 0);
        assert!(any_station_scanned);
        assert!(!committed.is_empty());
    }

    #[test]
    fn empty_network_session_ends_without_error() {
        let mut ids = IdRegistry::new();
        let network = Network::new(vec![], &mut ids);
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
        let committed = scheduler.run().expect("an empty network should end cleanly, not error");
        assert!(committed.is_empty());
    }
}
