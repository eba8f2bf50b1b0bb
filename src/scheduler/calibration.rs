// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The calibration / high-impact overlay: a cadence-gated
//! block restricted to fringe-finder and astro-calibrator sources, scored
//! with the low/high elevation ramp terms that ordinary scans never use.

use crate::config::{CalibratorCadence, Config};
use crate::network::Network;
use crate::scan::Scan;
use crate::time::SessionSeconds;

/// Whether a calibration block is due given scans/time elapsed since the
/// last one ("configurable cadence (`scans` or `seconds`)").
pub fn due(config: &Config, scans_since: u32, time_since_s: SessionSeconds) -> bool {
    let Some(block) = &config.calibrator_block else {
        return false;
    };
    match block.cadence {
        CalibratorCadence::EveryNScans(n) => scans_since >= n,
        CalibratorCadence::EverySeconds(s) => time_since_s >= s,
    }
}

/// Add the `lowEl`/`highEl` ramp terms to an already-scored calibrator
/// candidate ("outside calibrator mode these terms are
/// absent"), the one place [`crate::subcon::scoring::elevation_ramp_term`]
/// is actually used.
pub fn apply_elevation_ramps(config: &Config, network: &Network, scan: &Scan) -> f64 {
    let base = scan.score.unwrap_or(0.0);

    let ramps: Vec<f64> = scan
        .station_ids()
        .filter_map(|&sid| {
            let pv = scan.pointing_vectors.get(&sid)?;
            Some(pv.el)
        })
        .map(|el| {
            let low = crate::subcon::scoring::elevation_ramp_term(el, config.weights.low_el_start_rad, config.weights.low_el_full_rad);
            let high = crate::subcon::scoring::elevation_ramp_term(el, config.weights.high_el_start_rad, config.weights.high_el_full_rad);
            low.max(high)
        })
        .collect();

    let _ = network;
    if ramps.is_empty() {
        return base;
    }
    let mean_ramp = ramps.iter().sum::<f64>() / ramps.len() as f64;
    base + mean_ramp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CalibratorBlock, CalibratorTargetLength};

    fn base_config(block: Option<CalibratorBlock>) -> Config {
        Config {
            weights: Default::default(),
            sky_coverage: Default::default(),
            subnetting: Default::default(),
            alignment_anchor: crate::scan::AlignmentAnchor::Start,
            calibrator_block: block,
            avoid_satellites: Default::default(),
            astro_grid_step_s: 60,
            max_number_of_scans: 100,
            max_step_retries: 25,
        }
    }

    #[test]
    fn no_block_configured_is_never_due() {
        let config = base_config(None);
        assert!(!due(&config, 1000, 1_000_000));
    }

    #[test]
    fn every_n_scans_cadence_fires_once_threshold_reached() {
        let config = base_config(Some(CalibratorBlock {
            cadence: CalibratorCadence::EveryNScans(5),
            target_length: CalibratorTargetLength::Parameters,
        }));
        assert!(!due(&config, 4, 0));
        assert!(due(&config, 5, 0));
    }

    #[test]
    fn every_seconds_cadence_fires_once_threshold_reached() {
        let config = base_config(Some(CalibratorBlock {
            cadence: CalibratorCadence::EverySeconds(600),
            target_length: CalibratorTargetLength::Parameters,
        }));
        assert!(!due(&config, 0, 599));
        assert!(due(&config, 0, 600));
    }
}
