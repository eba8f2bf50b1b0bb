// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The single immutable `Config` value handed to the scheduler constructor,
//! bundling every global tunable. Deserialised from YAML/TOML via `serde`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::scan::AlignmentAnchor;

/// Errors in an ingested `Config` ("Configuration error... Fatal —
/// abort initialisation").
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config file: {0}")]
    Parse(String),

    #[error("failed to read config file {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("weight factor '{name}' must be non-negative, got {value}")]
    NegativeWeight { name: String, value: f64 },

    #[error("sky-coverage maxInfluenceDistance must be non-negative, got {0}")]
    NegativeSkyCoverageDistance(f64),

    #[error("subnetting percent threshold must be within [0,1], got {0}")]
    SubnettingPercentOutOfRange(f64),
}

/// Per-term weights for scan scoring ("Engine inputs").
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightFactors {
    pub num_stations: f64,
    pub average_stations: f64,
    pub average_baselines: f64,
    pub average_sources: f64,
    pub duration: f64,
    pub sky_coverage: f64,
    pub idle_time: f64,
    /// Seconds over which idle time is normalised (`idle`
    /// term: "per-station idle seconds / `idleInterval`").
    pub idle_interval_s: u32,
    pub low_el_start_rad: f64,
    pub low_el_full_rad: f64,
    pub high_el_start_rad: f64,
    pub high_el_full_rad: f64,
}

impl Default for WeightFactors {
    fn default() -> Self {
        Self {
            num_stations: 1.0,
            average_stations: 1.0,
            average_baselines: 1.0,
            average_sources: 1.0,
            duration: 1.0,
            sky_coverage: 1.0,
            idle_time: 1.0,
            idle_interval_s: 600,
            low_el_start_rad: 0.0,
            low_el_full_rad: 0.0,
            high_el_start_rad: std::f64::consts::FRAC_PI_2,
            high_el_full_rad: std::f64::consts::FRAC_PI_2,
        }
    }
}

impl WeightFactors {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields: [(&str, f64); 7] = [
            ("numStations", self.num_stations),
            ("averageStations", self.average_stations),
            ("averageBaselines", self.average_baselines),
            ("averageSources", self.average_sources),
            ("duration", self.duration),
            ("skyCoverage", self.sky_coverage),
            ("idleTime", self.idle_time),
        ];
        for (name, value) in fields {
            if value < 0.0 {
                return Err(ConfigError::NegativeWeight {
                    name: name.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Sky-coverage kernel shape (`skyCoverage` term: "using
/// `linear` or `cosine` kernels").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkyCoverageInterpolation {
    Linear,
    Cosine,
}

/// Sky-coverage thresholds: `maxInfluenceTime`, `maxInfluenceDistance`,
/// and interpolation mode.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyCoverageConfig {
    pub max_influence_time_s: u32,
    pub max_influence_distance_rad: f64,
    pub interpolation: SkyCoverageInterpolation,
    /// Stations within this ECEF distance (metres) of each other are
    /// grouped into one sky-coverage cluster (:
    /// `maxDistBetweenCorrespondingTelescopes`).
    pub max_dist_between_corresponding_telescopes_m: f64,
}

impl Default for SkyCoverageConfig {
    fn default() -> Self {
        Self {
            max_influence_time_s: 3600,
            max_influence_distance_rad: 30f64.to_radians(),
            interpolation: SkyCoverageInterpolation::Linear,
            max_dist_between_corresponding_telescopes_m: 0.0,
        }
    }
}

impl SkyCoverageConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_dist_between_corresponding_telescopes_m < 0.0 {
            return Err(ConfigError::NegativeSkyCoverageDistance(
                self.max_dist_between_corresponding_telescopes_m,
            ));
        }
        Ok(())
    }
}

/// Which subnetting acceptance rule applies ("`Subnetting`
/// as a trait with two strategies"). `Percent` requires at least
/// `threshold * n_max_avail` total participating stations; `MinIdle`
/// requires at least `n_max_avail - max_idle`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum SubnettingStrategy {
    Percent { threshold: f64 },
    MinIdle { max_idle: u32 },
}

impl SubnettingStrategy {
    pub fn min_total_stations(&self, n_max_avail: u32) -> u32 {
        match self {
            SubnettingStrategy::Percent { threshold } => (*threshold * n_max_avail as f64).ceil() as u32,
            SubnettingStrategy::MinIdle { max_idle } => n_max_avail.saturating_sub(*max_idle),
        }
    }
}

/// Subnetting configuration: the accept/reject strategy plus
/// the angular-separation threshold defining which source pairs are even
/// considered for subnetting.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SubnettingConfig {
    pub strategy: SubnettingStrategy,
    /// Minimum angular separation (radians) between two sources for them to
    /// be considered a subnetting candidate pair.
    pub min_angular_separation_rad: f64,
    /// Hard cap on the temporal separation between the two sub-scans' end
    /// times ("10 minutes (hard cap)").
    pub max_time_separation_s: u32,
}

impl Default for SubnettingConfig {
    fn default() -> Self {
        Self {
            strategy: SubnettingStrategy::Percent { threshold: 0.6 },
            min_angular_separation_rad: 60f64.to_radians(),
            max_time_separation_s: crate::constants::SUBNETTING_MAX_TIME_SEPARATION_S,
        }
    }
}

impl SubnettingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let SubnettingStrategy::Percent { threshold } = self.strategy {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::SubnettingPercentOutOfRange(threshold));
            }
        }
        Ok(())
    }
}

/// Which quantity a calibration block targets ("target-length
/// semantics (`parameters`|`minSNR`|`seconds`)").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibratorTargetLength {
    Parameters,
    MinSnr,
    Seconds(u32),
}

/// At what cadence calibration/high-impact blocks fire (:
/// "configurable cadence (`scans` or `seconds`)").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibratorCadence {
    EveryNScans(u32),
    EverySeconds(u32),
}

/// The optional calibrator-block descriptor ("optional calibrator
/// block descriptor").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalibratorBlock {
    pub cadence: CalibratorCadence,
    pub target_length: CalibratorTargetLength,
}

/// Whether satellite-type sources should be avoided entirely when building
/// a subcon ("Global tunables (... `AvoidSatellites` ...)").
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct AvoidSatellites(pub bool);

/// The full, immutable scheduling configuration ("Engine
/// inputs"). Built once and handed to the scheduler constructor; never
/// mutated during scheduling ("Shared resources").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub weights: WeightFactors,
    #[serde(default)]
    pub sky_coverage: SkyCoverageConfig,
    #[serde(default)]
    pub subnetting: SubnettingConfig,
    #[serde(default = "default_alignment_anchor")]
    pub alignment_anchor: AlignmentAnchor,
    #[serde(default)]
    pub calibrator_block: Option<CalibratorBlock>,
    #[serde(default)]
    pub avoid_satellites: AvoidSatellites,
    /// Grid step for the precomputed astronomical-parameters interpolation
    /// table ("typical step: minutes").
    #[serde(default = "default_astro_grid_step")]
    pub astro_grid_step_s: u32,
    /// Session bound: scheduling stops once this many scans are committed.
    #[serde(default = "default_max_scans")]
    pub max_number_of_scans: u32,
    /// Bound on retries advancing time after an empty subcon before giving
    /// up on the session.
    #[serde(default = "default_max_step_retries")]
    pub max_step_retries: u32,
}

fn default_alignment_anchor() -> AlignmentAnchor {
    AlignmentAnchor::Start
}
fn default_astro_grid_step() -> u32 {
    crate::constants::DEFAULT_ASTRO_GRID_STEP_S
}
fn default_max_scans() -> u32 {
    u32::MAX
}
fn default_max_step_retries() -> u32 {
    crate::constants::MAX_STEP_RETRIES
}

impl Config {
    /// Parse a YAML-formatted config.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML-formatted config.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.sky_coverage.validate()?;
        self.subnetting.validate()?;
        Ok(())
    }
}
