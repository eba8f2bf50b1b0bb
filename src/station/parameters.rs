// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A station's mutable tuning-parameter snapshot.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::id::SourceId;

/// A station's mutable `Parameters` snapshot. Hot-swapped
/// wholesale by [`crate::event::Event`]s.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StationParameters {
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub tagalong: bool,
    #[serde(default = "default_true")]
    pub available_for_fillin: bool,
    #[serde(default = "default_true")]
    pub first_scan: bool,
    #[serde(default = "default_one")]
    pub weight: f64,
    #[serde(default)]
    pub min_elevation_rad: f64,
    #[serde(default)]
    pub min_snr: HashMap<String, f64>,
    #[serde(default)]
    pub min_slew_time_s: u32,
    #[serde(default = "default_max_u32")]
    pub max_slew_time_s: u32,
    #[serde(default)]
    pub min_slew_distance_rad: f64,
    #[serde(default = "default_two_pi")]
    pub max_slew_distance_rad: f64,
    #[serde(default = "default_max_u32")]
    pub max_wait_s: u32,
    #[serde(default = "default_min_scan")]
    pub min_scan_s: u32,
    #[serde(default = "default_max_scan")]
    pub max_scan_s: u32,
    #[serde(default = "default_max_u32")]
    pub max_number_of_scans: u32,
    /// Per-band recording rate, Mbps.
    #[serde(default)]
    pub recording_rate_mbps: HashMap<String, f64>,
    /// Optional ceiling on disk write rate, Mbps; used to derive the
    /// minimum slew time required to flush the previous scan's data.
    #[serde(default)]
    pub data_write_rate_mbps: Option<f64>,
    #[serde(default)]
    pub ignore_sources: HashSet<SourceId>,
    #[serde(default)]
    pub preob_s: u32,
    #[serde(default)]
    pub midob_s: u32,
    #[serde(default)]
    pub system_delay_s: u32,
    #[serde(default = "default_max_total")]
    pub max_total_obs_time_s: u32,
}

fn default_true() -> bool {
    true
}
fn default_one() -> f64 {
    1.0
}
fn default_max_u32() -> u32 {
    u32::MAX
}
fn default_two_pi() -> f64 {
    crate::constants::TAU
}
fn default_min_scan() -> u32 {
    1
}
fn default_max_scan() -> u32 {
    600
}
fn default_max_total() -> u32 {
    u32::MAX
}

impl Default for StationParameters {
    fn default() -> Self {
        Self {
            available: true,
            tagalong: false,
            available_for_fillin: true,
            first_scan: true,
            weight: 1.0,
            min_elevation_rad: 0.0,
            min_snr: HashMap::new(),
            min_slew_time_s: 0,
            max_slew_time_s: u32::MAX,
            min_slew_distance_rad: 0.0,
            max_slew_distance_rad: crate::constants::TAU,
            max_wait_s: u32::MAX,
            min_scan_s: 1,
            max_scan_s: 600,
            max_number_of_scans: u32::MAX,
            recording_rate_mbps: HashMap::new(),
            data_write_rate_mbps: None,
            ignore_sources: HashSet::new(),
            preob_s: 0,
            midob_s: 0,
            system_delay_s: 0,
            max_total_obs_time_s: u32::MAX,
        }
    }
}

impl StationParameters {
    /// Minimum slew time required by the disk write rate:
    /// `t_min = ceil(obs * (recRate/writeRate - 1))` when positive.
    pub fn min_slew_for_write_rate(&self, band: &str, obs_duration_s: u32) -> u32 {
        let Some(write_rate) = self.data_write_rate_mbps else {
            return 0;
        };
        let Some(&rec_rate) = self.recording_rate_mbps.get(band) else {
            return 0;
        };
        if write_rate <= 0.0 {
            return 0;
        }
        let ratio = rec_rate / write_rate - 1.0;
        if ratio <= 0.0 {
            return 0;
        }
        (obs_duration_s as f64 * ratio).ceil().max(0.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_slew_for_write_rate_is_zero_when_under_budget() {
        let mut p = StationParameters::default();
        p.data_write_rate_mbps = Some(1024.0);
        p.recording_rate_mbps.insert("X".into(), 512.0);
        assert_eq!(p.min_slew_for_write_rate("X", 60), 0);
    }

    #[test]
    fn min_slew_for_write_rate_scales_with_overflow() {
        let mut p = StationParameters::default();
        p.data_write_rate_mbps = Some(512.0);
        p.recording_rate_mbps.insert("X".into(), 1024.0);
        // ratio = 1024/512 - 1 = 1.0; t_min = ceil(60*1.0) = 60
        assert_eq!(p.min_slew_for_write_rate("X", 60), 60);
    }
}
