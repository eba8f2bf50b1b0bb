// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A source's mutable tuning-parameter snapshot. Mirrors the
//! shape of [`crate::station::parameters::StationParameters`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::id::StationId;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceParameters {
    #[serde(default = "default_true")]
    pub available: bool,
    /// Whether the catalog-wide availability flag (as opposed to a
    /// session-local one) permits scheduling this source at all.
    #[serde(default = "default_true")]
    pub global_available: bool,
    #[serde(default = "default_true")]
    pub available_for_fillin: bool,
    #[serde(default = "default_one")]
    pub weight: f64,
    #[serde(default)]
    pub min_elevation_rad: f64,
    /// Per-band minimum flux density, Jy.
    #[serde(default)]
    pub min_flux_jy: HashMap<String, f64>,
    #[serde(default = "default_two")]
    pub min_number_of_stations: u32,
    /// Minimum seconds between repeated scans of this source.
    #[serde(default)]
    pub min_repeat_s: u32,
    #[serde(default = "default_max_u32")]
    pub max_number_of_scans: u32,
    #[serde(default = "default_min_scan")]
    pub min_scan_s: u32,
    #[serde(default = "default_max_scan")]
    pub max_scan_s: u32,
    #[serde(default)]
    pub ignore_stations: Vec<StationId>,
    #[serde(default)]
    pub required_stations: Vec<StationId>,
    #[serde(default)]
    pub fringe_finder: bool,
    #[serde(default)]
    pub astro_calibrator: bool,
}

fn default_true() -> bool {
    true
}
fn default_one() -> f64 {
    1.0
}
fn default_two() -> u32 {
    2
}
fn default_max_u32() -> u32 {
    u32::MAX
}
fn default_min_scan() -> u32 {
    1
}
fn default_max_scan() -> u32 {
    600
}

impl Default for SourceParameters {
    fn default() -> Self {
        Self {
            available: true,
            global_available: true,
            available_for_fillin: true,
            weight: 1.0,
            min_elevation_rad: 0.0,
            min_flux_jy: HashMap::new(),
            min_number_of_stations: 2,
            min_repeat_s: 0,
            max_number_of_scans: u32::MAX,
            min_scan_s: 1,
            max_scan_s: 600,
            ignore_stations: Vec::new(),
            required_stations: Vec::new(),
            fringe_finder: false,
            astro_calibrator: false,
        }
    }
}

impl SourceParameters {
    pub fn ignores(&self, station_id: StationId) -> bool {
        self.ignore_stations.contains(&station_id)
    }

    pub fn requires(&self, station_id: StationId) -> bool {
        self.required_stations.contains(&station_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_requires_at_least_two_stations() {
        let p = SourceParameters::default();
        assert_eq!(p.min_number_of_stations, 2);
    }

    #[test]
    fn ignore_and_require_lists_are_independent() {
        let mut p = SourceParameters::default();
        let reg = crate::id::IdRegistry::new();
        let mut reg = reg;
        let a = reg.next_station();
        let b = reg.next_station();
        p.ignore_stations.push(a);
        p.required_stations.push(b);
        assert!(p.ignores(a));
        assert!(!p.ignores(b));
        assert!(p.requires(b));
        assert!(!p.requires(a));
    }
}
