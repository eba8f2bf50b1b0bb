// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Session time system and MJD/UTC/GMST conversions (`TimeSystem`).

mod lookup;

pub use lookup::{AngularDistanceTable, LookupTable};

use hifitime::Epoch;

use crate::constants::TAU;

/// A non-negative integer second offset from [`TimeSystem::start_time`].
///
/// All internal scheduler times are expressed this way.
pub type SessionSeconds = u32;

/// Process-wide, read-only-after-init session clock (`TimeSystem`).
#[derive(Clone, Copy, Debug)]
pub struct TimeSystem {
    /// Modified Julian Date of the session start.
    pub mjd_start: f64,
    /// Absolute epoch corresponding to session second 0.
    pub start_time: Epoch,
    /// Absolute epoch corresponding to the session's nominal end.
    pub end_time: Epoch,
    /// `end_time - start_time`, in whole seconds.
    pub duration_s: u32,
}

impl TimeSystem {
    pub fn new(start_time: Epoch, end_time: Epoch) -> Self {
        let duration_s = (end_time - start_time).to_seconds().round().max(0.0) as u32;
        let mjd_start = start_time.to_mjd_utc_days();
        Self {
            mjd_start,
            start_time,
            end_time,
            duration_s,
        }
    }

    /// Convert an absolute epoch into session seconds, saturating at zero.
    pub fn to_session_seconds(&self, epoch: Epoch) -> SessionSeconds {
        let secs = (epoch - self.start_time).to_seconds();
        secs.round().max(0.0) as u32
    }

    /// Convert session seconds back into an absolute epoch.
    pub fn to_epoch(&self, seconds: SessionSeconds) -> Epoch {
        self.start_time + hifitime::Duration::from_seconds(seconds as f64)
    }

    /// Modified Julian Date at the given session second.
    pub fn mjd(&self, seconds: SessionSeconds) -> f64 {
        self.mjd_start + (seconds as f64) / 86400.0
    }

    /// Greenwich Mean Sidereal Time in radians at the given session second,
    /// from the standard IAU-1982-style MJD polynomial.
    pub fn gmst_rad(&self, seconds: SessionSeconds) -> f64 {
        mjd_to_gmst_rad(self.mjd(seconds))
    }

    /// Whether `seconds` lies at or after the session's nominal end.
    pub fn is_past_end(&self, seconds: SessionSeconds) -> bool {
        seconds >= self.duration_s
    }
}

/// GMST (radians, wrapped to `[0, 2*pi)`) from a Modified Julian Date, using
/// the standard low-precision polynomial expressed in UT1 days since J2000.
///
/// `GMST = 24110.54841s + 8640184.812866s*T + 0.093104s*T^2 - 6.2e-6s*T^3`
/// evaluated at `T` Julian centuries of UT1 since J2000.0, plus the sidereal
/// rotation for the fractional day.
pub fn mjd_to_gmst_rad(mjd: f64) -> f64 {
    const MJD_J2000: f64 = 51544.5;
    let d = mjd - MJD_J2000;
    let t = d / 36525.0;

    let mjd_floor = mjd.floor();
    let frac_day = mjd - mjd_floor;

    let gmst_secs = 24110.54841
        + 8640184.812866 * t
        + 0.093104 * t * t
        - 6.2e-6 * t * t * t
        + frac_day * 86400.0 * 1.00273790935;

    let gmst_rad = (gmst_secs / 86400.0) * TAU;
    gmst_rad.rem_euclid(TAU)
}
