// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Per-baseline SNR-driven duration sizing.

use crate::id::{ObservationId, StationId};
use crate::time::SessionSeconds;

/// A nominal observing wavelength used only to express baseline length in
/// kilo-lambda for the `knots` flux model ("piecewise-constant
/// flux vs projected baseline length in kλ"). The source material ties this
/// to the station's actual tuned frequency per band (an out-of-scope
/// observing-mode record, ); a single representative X-band
/// wavelength stands in here.
const NOMINAL_WAVELENGTH_M: f64 = 0.036;

/// The per-baseline, per-band portion of a scan (`Observation`).
#[derive(Clone, Copy, Debug)]
pub struct Observation {
    pub id: ObservationId,
    pub station1: StationId,
    pub station2: StationId,
    pub start: SessionSeconds,
    pub duration_s: u32,
    /// Achieved SNR at `duration_s`, filled in once sized.
    pub noise_snr: Option<f64>,
}

impl Observation {
    pub fn new(id: ObservationId, station1: StationId, station2: StationId, _band: String, start: SessionSeconds, duration_s: u32) -> Self {
        Self {
            id,
            station1,
            station2,
            start,
            duration_s,
            noise_snr: None,
        }
    }

    pub fn end(&self) -> SessionSeconds {
        self.start + self.duration_s
    }

    pub fn involves(&self, station_id: StationId) -> bool {
        self.station1 == station_id || self.station2 == station_id
    }
}

/// Project a baseline vector onto the source's `(u, v)` plane (:
/// "standard projection"), using the classical hour-angle/declination
/// formula. `baseline_ecef_m` is `station2.position - station1.position` in
/// ECEF metres; `ha_rad`/`dec_rad` are the source's geocentric hour angle
/// and declination at the observation's start time. Returns `(u, v)` in
/// metres.
pub fn project_uv(baseline_ecef_m: [f64; 3], ha_rad: f64, dec_rad: f64) -> (f64, f64) {
    let (sin_h, cos_h) = ha_rad.sin_cos();
    let (sin_d, cos_d) = dec_rad.sin_cos();
    let [x, y, z] = baseline_ecef_m;

    let u = x * sin_h + y * cos_h;
    let v = -x * sin_d * cos_h + y * sin_d * sin_h + z * cos_d;
    (u, v)
}

/// Convert a metre-valued `(u, v)` into kilo-lambda at the nominal
/// wavelength.
pub fn uv_to_klambda(u_m: f64, v_m: f64) -> (f64, f64) {
    let scale = 1.0 / (NOMINAL_WAVELENGTH_M * 1000.0);
    (u_m * scale, v_m * scale)
}

/// SNR accumulated per second of integration:
/// `snr_per_s = F_Jy / sqrt(SEFD_i * SEFD_j) * sqrt(2 * recRate)`.
pub fn snr_per_second(flux_jy: f64, sefd_i_jy: f64, sefd_j_jy: f64, rec_rate_mbps: f64) -> f64 {
    if sefd_i_jy <= 0.0 || sefd_j_jy <= 0.0 || flux_jy <= 0.0 {
        return 0.0;
    }
    flux_jy / (sefd_i_jy * sefd_j_jy).sqrt() * (2.0 * rec_rate_mbps * 1e6).sqrt()
}

/// Duration in seconds required to reach `min_snr` at `snr_per_s`, clipped
/// to `[min_scan_s, max_scan_s]`. Returns `None` if the
/// baseline can never reach `min_snr` within `max_scan_s`.
pub fn required_duration_s(min_snr: f64, snr_per_s: f64, min_scan_s: u32, max_scan_s: u32) -> Option<u32> {
    if snr_per_s <= 0.0 {
        return None;
    }
    let t_band = (min_snr / snr_per_s).powi(2);
    let clipped = t_band.ceil().max(min_scan_s as f64);
    if clipped > max_scan_s as f64 {
        None
    } else {
        Some(clipped as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn scenario_4_snr_driven_duration() {
        // SEFD_i=SEFD_j=1000 Jy, flux=1 Jy, recRate=256 Mbps ->
        // snr_per_s = 1/1000 * sqrt(2*256e6) = 22.6.
        let snr_per_s = snr_per_second(1.0, 1000.0, 1000.0, 256.0);
        assert_abs_diff_eq!(snr_per_s, 22.627_416_997_969_52, epsilon = 1e-6);

        // t = (20/22.6)^2 = 0.78s -> clipped up to minScan.
        let duration = required_duration_s(20.0, snr_per_s, 10, 600).unwrap();
        assert_eq!(duration, 10);
    }

    #[test]
    fn unreachable_snr_returns_none() {
        let snr_per_s = snr_per_second(0.001, 5000.0, 5000.0, 16.0);
        assert!(required_duration_s(1000.0, snr_per_s, 1, 600).is_none());
    }

    #[test]
    fn zero_flux_never_reaches_snr() {
        assert_eq!(snr_per_second(0.0, 1000.0, 1000.0, 256.0), 0.0);
    }
}
