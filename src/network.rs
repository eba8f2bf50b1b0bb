// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The network: the full set of participating stations, their pairwise
//! baselines, and the sky-coverage grouping derived from station proximity
//! (`Network`/`Baseline`).

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::coord::PointingVector;
use crate::event::EventList;
use crate::id::{BaselineId, IdRegistry, StationId};
use crate::station::Station;
use crate::time::{AngularDistanceTable, SessionSeconds};

/// A baseline's mutable tuning-parameter snapshot, the same
/// hot-swap shape as [`crate::station::parameters::StationParameters`] and
/// [`crate::source::parameters::SourceParameters`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BaselineParameters {
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default = "default_one")]
    pub weight: f64,
    #[serde(default = "default_min_scan")]
    pub min_scan_s: u32,
    #[serde(default = "default_max_scan")]
    pub max_scan_s: u32,
    /// Per-band minimum SNR override for this specific pair; absent bands
    /// fall back to the per-station minima.
    #[serde(default)]
    pub min_snr: HashMap<String, f64>,
}

fn default_true() -> bool {
    true
}
fn default_one() -> f64 {
    1.0
}
fn default_min_scan() -> u32 {
    1
}
fn default_max_scan() -> u32 {
    600
}

impl Default for BaselineParameters {
    fn default() -> Self {
        Self {
            available: true,
            weight: 1.0,
            min_scan_s: 1,
            max_scan_s: 600,
            min_snr: HashMap::new(),
        }
    }
}

/// Per-baseline running counters ("counters (observations,
/// scans)").
#[derive(Clone, Copy, Debug, Default)]
pub struct BaselineCounters {
    pub num_observations: u32,
    pub num_scans: u32,
}

/// An unordered pair of stations (`Baseline`). `station1 < station2`
/// always holds ("id derivation `(staid1,staid2) -> blid` with
/// `staid1 < staid2`").
#[derive(Clone, Debug)]
pub struct Baseline {
    pub id: BaselineId,
    pub station1: StationId,
    pub station2: StationId,
    pub parameters: BaselineParameters,
    pub events: EventList<BaselineParameters>,
    pub counters: BaselineCounters,
}

impl Baseline {
    pub fn involves(&self, station_id: StationId) -> bool {
        self.station1 == station_id || self.station2 == station_id
    }

    pub fn other(&self, station_id: StationId) -> Option<StationId> {
        if self.station1 == station_id {
            Some(self.station2)
        } else if self.station2 == station_id {
            Some(self.station1)
        } else {
            None
        }
    }

    pub fn commit(&mut self) {
        self.counters.num_observations += 1;
        self.counters.num_scans += 1;
    }
}

/// A grouping of stations into mutually-nearby clusters, used to space scans
/// across the sky rather than always picking the highest-scoring but
/// geographically clustered source (`SkyCoverage`). Each group
/// also carries the stream of past pointing vectors committed by any of its
/// member stations, the "stream of past pointing vectors belonging to a
/// group of stations" the sky-coverage score term is computed against.
#[derive(Clone, Debug)]
pub struct SkyCoverage {
    /// Each inner vector is one coverage group's station ids.
    pub groups: Vec<Vec<StationId>>,
    /// Parallel to `groups`: every pointing committed by a member station,
    /// oldest first.
    histories: Vec<Vec<PointingVector>>,
}

impl SkyCoverage {
    /// Greedily cluster stations: a station joins the first group whose
    /// representative (its first member) lies within
    /// `max_dist_between_corresponding_telescopes_m`, else it starts a new
    /// group.
    pub fn build(network: &Network, max_dist_between_corresponding_telescopes_m: f64) -> Self {
        let mut groups: Vec<Vec<StationId>> = Vec::new();
        for station in network.stations_in_order() {
            let mut placed = false;
            for group in groups.iter_mut() {
                let representative = network.station(group[0]).expect("group representative must exist");
                if representative.position.distance_to(&station.position) <= max_dist_between_corresponding_telescopes_m {
                    group.push(station.id);
                    placed = true;
                    break;
                }
            }
            if !placed {
                groups.push(vec![station.id]);
            }
        }
        let histories = vec![Vec::new(); groups.len()];
        Self { groups, histories }
    }

    pub fn group_of(&self, station_id: StationId) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(&station_id))
    }

    /// Record a committed pointing in its station's group history, dropping
    /// anything older than `max_influence_time_s` relative to the pointing
    /// just recorded so the history does not grow without bound over a long
    /// session (only pointings within `MaxInfluenceTime`
    /// can contribute a nonzero score anyway).
    pub fn record(&mut self, pv: PointingVector, max_influence_time_s: u32) {
        let Some(idx) = self.group_of(pv.station_id) else {
            return;
        };
        let history = &mut self.histories[idx];
        history.push(pv);
        if max_influence_time_s > 0 {
            let cutoff = pv.time.saturating_sub(max_influence_time_s);
            history.retain(|p| p.time >= cutoff);
        }
    }

    /// Raw `(angular_distance_rad, time_since_s)` pairs between `station_id`'s
    /// group history and a candidate pointing `(current_az, current_el)` at
    /// `current_time`, for the caller to wrap into a scoring-side
    /// `PastInfluence` (kept untyped here so `network` does not depend on
    /// `subcon`).
    pub fn past_influences(
        &self,
        station_id: StationId,
        current_az: f64,
        current_el: f64,
        current_time: SessionSeconds,
        table: &AngularDistanceTable,
    ) -> Vec<(f64, u32)> {
        let Some(idx) = self.group_of(station_id) else {
            return Vec::new();
        };
        self.histories[idx]
            .iter()
            .map(|pv| {
                (
                    table.lookup(pv.el, pv.az, current_az, current_el),
                    current_time.saturating_sub(pv.time),
                )
            })
            .collect()
    }
}

/// The full participating network: stations plus every pairwise baseline
/// (`Network`).
#[derive(Clone, Debug)]
pub struct Network {
    stations: Vec<Station>,
    /// Keyed by `StationId` in network order; an `IndexMap` rather than a
    /// plain `HashMap` so iteration order matches insertion order for
    /// anything that needs to walk the index deterministically.
    station_index: IndexMap<StationId, usize>,
    baselines: Vec<Baseline>,
    baseline_index: IndexMap<(StationId, StationId), usize>,
}

impl Network {
    /// Build the network and mint one baseline per unordered station pair.
    pub fn new(stations: Vec<Station>, ids: &mut IdRegistry) -> Self {
        let mut station_index = IndexMap::new();
        for (i, s) in stations.iter().enumerate() {
            station_index.insert(s.id, i);
        }

        let mut baselines = Vec::new();
        let mut baseline_index = IndexMap::new();
        for i in 0..stations.len() {
            for j in (i + 1)..stations.len() {
                let (a, b) = (stations[i].id, stations[j].id);
                let (lo, hi) = if a.value() < b.value() { (a, b) } else { (b, a) };
                let baseline = Baseline {
                    id: ids.next_baseline(),
                    station1: lo,
                    station2: hi,
                    parameters: BaselineParameters::default(),
                    events: EventList::new(vec![]),
                    counters: BaselineCounters::default(),
                };
                baseline_index.insert((lo, hi), baselines.len());
                baselines.push(baseline);
            }
        }

        Self {
            stations,
            station_index,
            baselines,
            baseline_index,
        }
    }

    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.station_index.get(&id).map(|&i| &self.stations[i])
    }

    pub fn station_mut(&mut self, id: StationId) -> Option<&mut Station> {
        self.station_index.get(&id).copied().map(move |i| &mut self.stations[i])
    }

    pub fn stations_in_order(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    pub fn num_stations(&self) -> usize {
        self.stations.len()
    }

    /// `(staid1,staid2) -> blid` with `staid1 < staid2`.
    pub fn baseline_between(&self, a: StationId, b: StationId) -> Option<&Baseline> {
        let (lo, hi) = if a.value() < b.value() { (a, b) } else { (b, a) };
        self.baseline_index.get(&(lo, hi)).map(|&i| &self.baselines[i])
    }

    pub fn baseline_between_mut(&mut self, a: StationId, b: StationId) -> Option<&mut Baseline> {
        let (lo, hi) = if a.value() < b.value() { (a, b) } else { (b, a) };
        self.baseline_index.get(&(lo, hi)).copied().map(move |i| &mut self.baselines[i])
    }

    pub fn baselines(&self) -> impl Iterator<Item = &Baseline> {
        self.baselines.iter()
    }
}
