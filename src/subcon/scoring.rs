// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The weighted scan-scoring function.

use crate::config::{SkyCoverageInterpolation, WeightFactors};
use crate::constants::RECENTLY_OBSERVED_SCORE_PENALTY;

/// Precomputed per-entity statistics the scoring function needs, gathered
/// by the caller from `Network`/`SourceList` counters before scoring a
/// candidate (`averageStations`/`averageBaselines`/
/// `averageSources` terms: "mean observation count across the relevant
/// entity set").
#[derive(Clone, Copy, Debug)]
pub struct AverageDeviation {
    pub mean_obs: f64,
    pub this_entity_obs: f64,
    /// The normalising denominator for this deviation term. Not specified
    /// exactly by the source material beyond "maxDev"; taken here as
    /// `mean_obs.max(1.0)` so the term stays within `[0, 1]` for any
    /// observation-count distribution, matching the other terms' `[0,1]`
    /// contract (preamble).
    pub max_dev: f64,
}

impl AverageDeviation {
    pub fn term(&self) -> f64 {
        if self.max_dev <= 0.0 {
            return 0.0;
        }
        (self.mean_obs - self.this_entity_obs).max(0.0) / self.max_dev
    }
}

/// `numStations` term: `(n_participating - n_min) / (n_avail -
/// n_min)`, clipped to `>= 0`.
pub fn num_stations_term(n_participating: u32, n_min: u32, n_avail: u32) -> f64 {
    let denom = (n_avail as f64 - n_min as f64).max(1.0);
    ((n_participating as f64 - n_min as f64) / denom).max(0.0)
}

/// `duration` term: shorter scans score higher.
/// `(t_max_scan - t_this) / (t_max_scan - t_min_scan)`.
pub fn duration_term(t_this_s: u32, t_min_scan_s: u32, t_max_scan_s: u32) -> f64 {
    let denom = (t_max_scan_s as f64 - t_min_scan_s as f64).max(1.0);
    ((t_max_scan_s as f64 - t_this_s as f64) / denom).clamp(0.0, 1.0)
}

/// One past pointing's contribution to a sky-coverage group's influence at
/// a new candidate pointing (`skyCoverage` term).
#[derive(Clone, Copy, Debug)]
pub struct PastInfluence {
    pub angular_distance_rad: f64,
    pub time_since_s: u32,
}

/// `skyCoverage` term: `1 - max over past pv's in the
/// station's group of max(0, 1 - Δangle/D) * max(0, 1 - Δt/T)`, using the
/// configured kernel shape.
pub fn sky_coverage_term(
    past: &[PastInfluence],
    max_influence_distance_rad: f64,
    max_influence_time_s: u32,
    kernel: SkyCoverageInterpolation,
) -> f64 {
    if max_influence_time_s == 0 {
        // boundary: "MaxInfluenceTime = 0 collapses sky-coverage
        // score to constant 1".
        return 1.0;
    }
    let max_influence = past
        .iter()
        .map(|p| {
            let dist_factor = distance_kernel(p.angular_distance_rad, max_influence_distance_rad, kernel);
            let time_factor = (1.0 - p.time_since_s as f64 / max_influence_time_s as f64).max(0.0);
            dist_factor * time_factor
        })
        .fold(0.0, f64::max);
    1.0 - max_influence
}

fn distance_kernel(delta_angle_rad: f64, d: f64, kernel: SkyCoverageInterpolation) -> f64 {
    if d <= 0.0 {
        return 0.0;
    }
    let frac = (delta_angle_rad / d).min(1.0);
    match kernel {
        SkyCoverageInterpolation::Linear => (1.0 - frac).max(0.0),
        SkyCoverageInterpolation::Cosine => {
            if frac >= 1.0 {
                0.0
            } else {
                0.5 * (1.0 + (std::f64::consts::PI * frac).cos())
            }
        }
    }
}

/// `idle` term: per-station idle seconds normalised by
/// `idleInterval`, clipped to `[0, 1]`.
pub fn idle_term(idle_s: u32, idle_interval_s: u32) -> f64 {
    if idle_interval_s == 0 {
        return 0.0;
    }
    (idle_s as f64 / idle_interval_s as f64).clamp(0.0, 1.0)
}

/// `lowEl`/`highEl` ramp terms (calibrator mode): a linear
/// ramp outside `[low_full, low_start]` (rising as elevation drops below
/// `low_start` toward `low_full`) or `[high_start, high_full]` (rising as
/// elevation climbs above `high_start` toward `high_full`).
pub fn elevation_ramp_term(el_rad: f64, start_rad: f64, full_rad: f64) -> f64 {
    if (full_rad - start_rad).abs() < 1e-12 {
        return 0.0;
    }
    ((el_rad - start_rad) / (full_rad - start_rad)).clamp(0.0, 1.0)
}

/// All the per-term inputs for a single (non-subnetting) candidate scan's
/// score.
#[derive(Clone, Debug)]
pub struct ScoreInputs {
    pub num_stations: f64,
    pub average_stations: Vec<AverageDeviation>,
    pub average_baselines: Vec<AverageDeviation>,
    pub average_source: AverageDeviation,
    pub duration: f64,
    pub sky_coverage_per_station: Vec<f64>,
    pub idle_per_station: Vec<f64>,
    /// Product of station, source, and baseline weights.
    pub weight_product: f64,
    /// `None` outside calibrator mode.
    pub low_el_ramp: Option<f64>,
    pub high_el_ramp: Option<f64>,
    /// Whether the source was observed within `minRepeat/2` recently
    /// enough to incur the penalty ("Observed-recently sources
    /// are penalised by a factor 0.01").
    pub recently_observed: bool,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Compose every term into the final scan score.
pub fn score_scan(inputs: &ScoreInputs, weights: &WeightFactors) -> f64 {
    let average_stations: Vec<f64> = inputs.average_stations.iter().map(|d| d.term()).collect();
    let average_baselines: Vec<f64> = inputs.average_baselines.iter().map(|d| d.term()).collect();

    let mut score = weights.num_stations * inputs.num_stations
        + weights.average_stations * mean(&average_stations)
        + weights.average_baselines * mean(&average_baselines)
        + weights.average_sources * inputs.average_source.term()
        + weights.duration * inputs.duration
        + weights.sky_coverage * mean(&inputs.sky_coverage_per_station)
        + weights.idle_time * mean(&inputs.idle_per_station);

    score *= inputs.weight_product.max(0.0);

    if let Some(low) = inputs.low_el_ramp {
        score += low;
    }
    if let Some(high) = inputs.high_el_ramp {
        score += high;
    }

    if inputs.recently_observed {
        score *= RECENTLY_OBSERVED_SCORE_PENALTY;
    }

    score
}

/// Subnetting scans sum the two sub-scan scores.
pub fn score_subnetting(score_a: f64, score_b: f64) -> f64 {
    score_a + score_b
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn num_stations_term_clips_at_zero() {
        assert_eq!(num_stations_term(2, 4, 10), 0.0);
        assert_abs_diff_eq!(num_stations_term(10, 2, 10), 1.0);
    }

    #[test]
    fn duration_term_favours_shorter_scans() {
        let short = duration_term(10, 5, 600);
        let long = duration_term(500, 5, 600);
        assert!(short > long);
    }

    #[test]
    fn zero_influence_time_collapses_sky_coverage_to_one() {
        let past = vec![PastInfluence {
            angular_distance_rad: 0.0,
            time_since_s: 0,
        }];
        let score = sky_coverage_term(&past, 1.0, 0, SkyCoverageInterpolation::Linear);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn sky_coverage_drops_for_nearby_recent_pointing() {
        let past = vec![PastInfluence {
            angular_distance_rad: 0.0,
            time_since_s: 0,
        }];
        let score = sky_coverage_term(&past, 1.0, 3600, SkyCoverageInterpolation::Linear);
        assert_abs_diff_eq!(score, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn idle_term_clips_at_one() {
        assert_eq!(idle_term(10_000, 600), 1.0);
        assert_abs_diff_eq!(idle_term(300, 600), 0.5);
    }

    #[test]
    fn subnetting_score_sums_sub_scores() {
        assert_abs_diff_eq!(score_subnetting(0.3, 0.4), 0.7);
    }

    #[test]
    fn recently_observed_applies_penalty_factor() {
        let weights = WeightFactors::default();
        let base_inputs = ScoreInputs {
            num_stations: 1.0,
            average_stations: vec![],
            average_baselines: vec![],
            average_source: AverageDeviation {
                mean_obs: 0.0,
                this_entity_obs: 0.0,
                max_dev: 1.0,
            },
            duration: 1.0,
            sky_coverage_per_station: vec![1.0],
            idle_per_station: vec![0.0],
            weight_product: 1.0,
            low_el_ramp: None,
            high_el_ramp: None,
            recently_observed: false,
        };
        let mut penalized = base_inputs.clone();
        penalized.recently_observed = true;
        let normal_score = score_scan(&base_inputs, &weights);
        let penalized_score = score_scan(&penalized, &weights);
        assert_abs_diff_eq!(penalized_score, normal_score * RECENTLY_OBSERVED_SCORE_PENALTY, epsilon = 1e-9);
    }
}
