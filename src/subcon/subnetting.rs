// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The subnetting combinator: splitting the network into two disjoint
//! groups observing different sources in parallel.

use itertools::Itertools;

use crate::config::SubnettingConfig;
use crate::id::{SourceId, StationId};
use crate::time::SessionSeconds;

/// Two sources qualify as a subnetting candidate pair iff their angular
/// separation exceeds the configured threshold ("pairs whose
/// angular separation exceeds the operator-chosen threshold").
pub fn is_subnetting_candidate_pair(separation_rad: f64, config: &SubnettingConfig) -> bool {
    separation_rad > config.min_angular_separation_rad
}

/// All unordered source-id pairs among `sources` whose angular separation
/// (looked up via `separation_of`) clears the configured threshold.
pub fn candidate_pairs(
    sources: &[SourceId],
    config: &SubnettingConfig,
    separation_of: impl Fn(SourceId, SourceId) -> f64,
) -> Vec<(SourceId, SourceId)> {
    sources
        .iter()
        .copied()
        .tuple_combinations()
        .filter(|&(a, b)| is_subnetting_candidate_pair(separation_of(a, b), config))
        .collect()
}

/// One candidate way of splitting the union of two sources' visible
/// stations between them.
#[derive(Clone, Debug)]
pub struct Partition {
    pub stations_a: Vec<StationId>,
    pub stations_b: Vec<StationId>,
}

/// Whether a partition is acceptable: each side must meet its
/// source's `minNumberOfStations`, and the combined station count must meet
/// the configured subnetting strategy's minimum given the maximum stations
/// available to either source alone.
pub fn partition_is_acceptable(
    partition: &Partition,
    min_stations_a: u32,
    min_stations_b: u32,
    n_max_avail: u32,
    config: &SubnettingConfig,
) -> bool {
    let na = partition.stations_a.len() as u32;
    let nb = partition.stations_b.len() as u32;
    if na < min_stations_a || nb < min_stations_b {
        return false;
    }
    let min_total = config.strategy.min_total_stations(n_max_avail);
    na + nb >= min_total
}

/// The hard 10-minute temporal-separation guard between the two sub-scans'
/// end times .
pub fn time_separation_ok(end_a: SessionSeconds, end_b: SessionSeconds, config: &SubnettingConfig) -> bool {
    let delta = end_a.abs_diff(end_b);
    delta <= config.max_time_separation_s
}

/// Every way to split `shared` (stations visible to both sources) between A
/// and B, with `exclusive_a`/`exclusive_b` (visible to only one source)
/// always assigned to their own side. There are `2^|shared|` partitions;
/// the original iterates a bitmask over the shared set ("try
/// every partition of the shared stations").
pub fn enumerate_partitions(exclusive_a: &[StationId], exclusive_b: &[StationId], shared: &[StationId]) -> Vec<Partition> {
    let n = shared.len();
    if n > 20 {
        // A shared-station set this large would enumerate over a million
        // partitions; no real VLBI network approaches this, so this is a
        // sanity bound rather than a real limitation.
        return Vec::new();
    }
    let mut partitions = Vec::with_capacity(1 << n);
    for mask in 0..(1u32 << n) {
        let mut stations_a = exclusive_a.to_vec();
        let mut stations_b = exclusive_b.to_vec();
        for (i, &station) in shared.iter().enumerate() {
            if mask & (1 << i) != 0 {
                stations_a.push(station);
            } else {
                stations_b.push(station);
            }
        }
        partitions.push(Partition { stations_a, stations_b });
    }
    partitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdRegistry;

    #[test]
    fn scenario_5_subnetting_time_guard() {
        // two candidate scans end at t=1800 and t=3000.
        // |delta|=1200 > 600 -> discarded.
        let config = SubnettingConfig {
            max_time_separation_s: 600,
            ..SubnettingConfig::default()
        };
        assert!(!time_separation_ok(1800, 3000, &config));
    }

    #[test]
    fn within_bound_time_separation_is_ok() {
        let config = SubnettingConfig {
            max_time_separation_s: 600,
            ..SubnettingConfig::default()
        };
        assert!(time_separation_ok(1800, 2300, &config));
    }

    #[test]
    fn candidate_pair_requires_separation_above_threshold() {
        let config = SubnettingConfig {
            min_angular_separation_rad: 60f64.to_radians(),
            ..SubnettingConfig::default()
        };
        assert!(is_subnetting_candidate_pair(90f64.to_radians(), &config));
        assert!(!is_subnetting_candidate_pair(30f64.to_radians(), &config));
    }

    #[test]
    fn enumerate_partitions_covers_every_assignment_of_shared_stations() {
        let mut ids = IdRegistry::new();
        let shared = vec![ids.next_station(), ids.next_station()];
        let partitions = enumerate_partitions(&[], &[], &shared);
        assert_eq!(partitions.len(), 4);
    }

    #[test]
    fn partition_rejected_below_per_source_minimum() {
        let mut ids = IdRegistry::new();
        let partition = Partition {
            stations_a: vec![ids.next_station()],
            stations_b: vec![ids.next_station(), ids.next_station()],
        };
        let config = SubnettingConfig::default();
        assert!(!partition_is_acceptable(&partition, 2, 2, 10, &config));
    }
}
