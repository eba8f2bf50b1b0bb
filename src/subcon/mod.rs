// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The subcon: the full set of candidate scans considered at one decision
//! point, and their reduction to a single committable scan (or subnetting
//! pair).

pub mod build;
pub mod feasibility;
pub mod scoring;
pub mod select;
pub mod subnetting;

use std::collections::HashMap;

use thiserror::Error;

use crate::astro::AstronomicalParameters;
use crate::config::Config;
use crate::id::{IdRegistry, StationId};
use crate::network::Network;
use crate::scan::{Scan, ScanType};
use crate::source::Source;
use crate::time::{SessionSeconds, TimeSystem};

pub use build::CandidateScan;
pub use feasibility::Endposition;
pub use scoring::{AverageDeviation, PastInfluence, ScoreInputs};
pub use select::ScoredScan;
pub use subnetting::Partition;

/// Errors surfaced from subcon construction that escape local per-candidate
/// recovery ("errors recovered locally by dropping stations...";
/// what's left over are cases where recovery itself cannot proceed).
#[derive(Debug, Error)]
pub enum SubconError {
    #[error("network has no stations to build candidates from")]
    EmptyNetwork,

    #[error("subnetting partition space too large: {0} shared stations")]
    PartitionSpaceTooLarge(usize),
}

/// A committed outcome of one subcon decision: either a single scan or an
/// accepted subnetting pair.
#[derive(Clone, Debug)]
pub enum Selection {
    Single(Scan),
    Subnet(Box<Scan>, Box<Scan>),
}

/// Build every single-source candidate for the current decision point,
/// leaving subnetting combination to [`build_subnet_candidates`].
/// `past_influences` carries each station's recent pointing history within
/// its sky-coverage group, already reduced to `(angular_distance,
/// time_since)` pairs (`skyCoverage` term); pass an empty map
/// before any scan has been committed, since an empty history scores the
/// maximum coverage value of 1.0.
#[allow(clippy::too_many_arguments)]
pub fn build_single_candidates(
    sources: &[Source],
    network: &mut Network,
    astro: &AstronomicalParameters,
    time_system: &TimeSystem,
    config: &Config,
    ids: &mut IdRegistry,
    current_time: SessionSeconds,
    fillin_mode: bool,
    allow_tagalong: bool,
    scan_type: ScanType,
    past_influences: &HashMap<StationId, Vec<PastInfluence>>,
) -> Result<Vec<ScoredScan>, SubconError> {
    if network.num_stations() == 0 {
        return Err(SubconError::EmptyNetwork);
    }

    let (mean_station_scans, mean_baseline_scans, mean_source_scans) = mean_stats(sources, network);

    let mut scored = Vec::new();
    for source in sources {
        let Some(candidate) = build::build_candidate(source, network, astro, time_system, current_time, fillin_mode, allow_tagalong) else {
            continue;
        };
        let Some(scan) = feasibility::refine_candidate(candidate, source, network, config, ids, &[], scan_type) else {
            continue;
        };

        let n_avail = network
            .stations_in_order()
            .filter(|st| build::station_is_eligible(st, source, allow_tagalong))
            .count() as u32;

        let score = score_single_scan(
            &scan,
            source,
            network,
            config,
            n_avail,
            mean_station_scans,
            mean_baseline_scans,
            mean_source_scans,
            past_influences,
        );
        scored.push(ScoredScan { scan, score });
    }
    Ok(scored)
}

/// Combine single-source candidates pairwise into subnetting candidates
///, scoring each accepted partition via [`scoring::score_subnetting`].
#[allow(clippy::too_many_arguments)]
pub fn build_subnet_candidates(
    sources: &[Source],
    network: &Network,
    config: &Config,
    single_candidates: &HashMap<crate::id::SourceId, CandidateScan>,
    n_avail_by_source: &HashMap<crate::id::SourceId, u32>,
    mean_stats: (f64, f64, f64),
) -> Result<Vec<(Partition, crate::id::SourceId, crate::id::SourceId, f64)>, SubconError> {
    let source_ids: Vec<_> = single_candidates.keys().copied().collect();
    let pairs = subnetting::candidate_pairs(&source_ids, &config.subnetting, |a, b| {
        let ra = sources.iter().find(|s| s.id == a);
        let rb = sources.iter().find(|s| s.id == b);
        match (ra, rb) {
            (Some(sa), Some(sb)) => sa.position_at(0).separation(&sb.position_at(0)),
            _ => 0.0,
        }
    });

    let (mean_station_scans, mean_baseline_scans, mean_source_scans) = mean_stats;
    let mut results = Vec::new();

    for (a, b) in pairs {
        let (Some(cand_a), Some(cand_b)) = (single_candidates.get(&a), single_candidates.get(&b)) else {
            continue;
        };
        let stations_a: Vec<StationId> = cand_a.pointing_vectors.keys().copied().collect();
        let stations_b: Vec<StationId> = cand_b.pointing_vectors.keys().copied().collect();
        let shared: Vec<StationId> = stations_a.iter().copied().filter(|s| stations_b.contains(s)).collect();
        if shared.len() > 20 {
            return Err(SubconError::PartitionSpaceTooLarge(shared.len()));
        }
        let exclusive_a: Vec<StationId> = stations_a.iter().copied().filter(|s| !shared.contains(s)).collect();
        let exclusive_b: Vec<StationId> = stations_b.iter().copied().filter(|s| !shared.contains(s)).collect();

        let n_max_avail = n_avail_by_source.get(&a).copied().unwrap_or(0).max(n_avail_by_source.get(&b).copied().unwrap_or(0));
        let source_a = sources.iter().find(|s| s.id == a);
        let source_b = sources.iter().find(|s| s.id == b);
        let (Some(source_a), Some(source_b)) = (source_a, source_b) else {
            continue;
        };

        for partition in subnetting::enumerate_partitions(&exclusive_a, &exclusive_b, &shared) {
            if !subnetting::partition_is_acceptable(
                &partition,
                source_a.parameters.min_number_of_stations,
                source_b.parameters.min_number_of_stations,
                n_max_avail,
                &config.subnetting,
            ) {
                continue;
            }

            let n_avail_a = n_avail_by_source.get(&a).copied().unwrap_or(partition.stations_a.len() as u32);
            let n_avail_b = n_avail_by_source.get(&b).copied().unwrap_or(partition.stations_b.len() as u32);
            let score_a = scoring::num_stations_term(partition.stations_a.len() as u32, source_a.parameters.min_number_of_stations, n_avail_a)
                * config.weights.num_stations;
            let score_b = scoring::num_stations_term(partition.stations_b.len() as u32, source_b.parameters.min_number_of_stations, n_avail_b)
                * config.weights.num_stations;
            let _ = (mean_station_scans, mean_baseline_scans, mean_source_scans, network);
            let combined = scoring::score_subnetting(score_a, score_b);
            results.push((partition, a, b, combined));
        }
    }
    Ok(results)
}

/// Mean observation counts across stations, baselines, and sources, the
/// normalising inputs to the `average*` scoring terms. Shared
/// between [`build_single_candidates`] and the driver's rigorous
/// re-verification refine step, since no commit happens between building and
/// selecting a candidate within one decision point.
pub(crate) fn mean_stats(sources: &[Source], network: &Network) -> (f64, f64, f64) {
    let mean_station_scans = mean_u32(network.stations_in_order().map(|s| s.counters.num_scans));
    let mean_baseline_scans = mean_u32(network.baselines().map(|b| b.counters.num_scans));
    let mean_source_scans = mean_u32(sources.iter().map(|s| s.num_scans_scheduled()));
    (mean_station_scans, mean_baseline_scans, mean_source_scans)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn score_single_scan(
    scan: &Scan,
    source: &Source,
    network: &Network,
    config: &Config,
    n_avail: u32,
    mean_station_scans: f64,
    mean_baseline_scans: f64,
    mean_source_scans: f64,
    past_influences: &HashMap<StationId, Vec<PastInfluence>>,
) -> f64 {
    let average_stations: Vec<AverageDeviation> = scan
        .station_ids()
        .filter_map(|&sid| network.station(sid))
        .map(|st| AverageDeviation {
            mean_obs: mean_station_scans,
            this_entity_obs: st.counters.num_scans as f64,
            max_dev: mean_station_scans.max(1.0),
        })
        .collect();

    let average_baselines: Vec<AverageDeviation> = scan
        .observations
        .iter()
        .filter_map(|obs| network.baseline_between(obs.station1, obs.station2))
        .map(|bl| AverageDeviation {
            mean_obs: mean_baseline_scans,
            this_entity_obs: bl.counters.num_scans as f64,
            max_dev: mean_baseline_scans.max(1.0),
        })
        .collect();

    let durations: Vec<u32> = scan
        .station_ids()
        .filter_map(|&sid| scan.times.segments(sid))
        .map(|seg| seg.end_observing.saturating_sub(seg.end_preob))
        .collect();
    let mean_duration = mean_u32(durations.into_iter());

    let idle_per_station: Vec<f64> = scan
        .station_ids()
        .filter_map(|&sid| scan.times.segments(sid))
        .map(|seg| scoring::idle_term(seg.end_idle.saturating_sub(seg.end_slew), config.weights.idle_interval_s))
        .collect();

    let sky_coverage_per_station: Vec<f64> = scan
        .station_ids()
        .map(|&sid| {
            let past = past_influences.get(&sid).map(Vec::as_slice).unwrap_or(&[]);
            scoring::sky_coverage_term(
                past,
                config.sky_coverage.max_influence_distance_rad,
                config.sky_coverage.max_influence_time_s,
                config.sky_coverage.interpolation,
            )
        })
        .collect();

    let weight_product = scan
        .station_ids()
        .filter_map(|&sid| network.station(sid))
        .map(|st| st.parameters.weight)
        .product::<f64>()
        * source.parameters.weight;

    let inputs = ScoreInputs {
        num_stations: scoring::num_stations_term(scan.num_stations() as u32, source.parameters.min_number_of_stations, n_avail),
        average_stations,
        average_baselines,
        average_source: AverageDeviation {
            mean_obs: mean_source_scans,
            this_entity_obs: source.num_scans_scheduled() as f64,
            max_dev: mean_source_scans.max(1.0),
        },
        duration: scoring::duration_term(mean_duration, source.parameters.min_scan_s, source.parameters.max_scan_s),
        sky_coverage_per_station,
        idle_per_station,
        weight_product,
        low_el_ramp: None,
        high_el_ramp: None,
        recently_observed: source
            .seconds_since_last_scan(0)
            .map(|elapsed| elapsed < source.parameters.min_repeat_s / 2)
            .unwrap_or(false),
    };

    scoring::score_scan(&inputs, &config.weights)
}

fn mean_u32(values: impl Iterator<Item = u32>) -> f64 {
    let values: Vec<u32> = values.collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
    }
}
