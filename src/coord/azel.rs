// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Simple (cached/interpolated) and rigorous AzEl computation.

use crate::astro::{source_crs_to_itrs, AstronomicalParameters};
use crate::constants::{PI, TAU};
use crate::coord::{Position, RADec};
use crate::id::{SourceId, StationId};
use crate::time::{SessionSeconds, TimeSystem};

use super::PointingVector;

/// A per-(station, source) ordered cache of rigorously-computed pointing
/// samples, used to serve the cheap "simple" interpolation path. The
/// rigorous path is authoritative and always appends here.
#[derive(Debug, Clone, Default)]
pub struct AzElCache {
    samples: Vec<PointingVector>,
}

impl AzElCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rigorously-computed sample, keeping the cache ordered by
    /// time.
    pub fn push_rigorous(&mut self, pv: PointingVector) {
        let idx = self
            .samples
            .binary_search_by_key(&pv.time, |s| s.time)
            .unwrap_or_else(|i| i);
        self.samples.insert(idx, pv);
    }

    /// Simple (interpolated) AzEl at `time`, using the two bracketing cached
    /// rigorous samples. Returns `None` if `time` falls outside the cached
    /// range: the caller must call the rigorous path before relying on the
    /// simple path for new times.
    pub fn simple(
        &self,
        station_id: StationId,
        source_id: SourceId,
        time: SessionSeconds,
    ) -> Option<PointingVector> {
        if self.samples.len() < 2 {
            return self
                .samples
                .first()
                .filter(|s| s.time == time)
                .copied();
        }
        let idx = self.samples.partition_point(|s| s.time <= time);
        if idx == 0 || idx >= self.samples.len() {
            // Exact match at either boundary is still usable.
            if let Some(s) = self.samples.iter().find(|s| s.time == time) {
                return Some(*s);
            }
            return None;
        }
        let before = &self.samples[idx - 1];
        let after = &self.samples[idx];
        if before.time == time {
            return Some(*before);
        }
        if after.time == before.time {
            return Some(*before);
        }

        let frac = (time as f64 - before.time as f64) / (after.time as f64 - before.time as f64);
        let az = interpolate_angle_half_turn(before.az, after.az, frac);
        let el = before.el + (after.el - before.el) * frac;
        let ha = interpolate_angle_half_turn(before.ha, after.ha, frac);
        let dc = after.dc;

        Some(PointingVector::new(station_id, source_id, az, el, ha, dc, time))
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Linearly interpolate an angle, unwrapping by half a turn so the shorter
/// arc between `a` and `b` is taken ("azimuth is linearly
/// interpolated with half-turn unwrapping").
fn interpolate_angle_half_turn(a: f64, b: f64, frac: f64) -> f64 {
    let mut delta = b - a;
    while delta > PI {
        delta -= TAU;
    }
    while delta < -PI {
        delta += TAU;
    }
    a + delta * frac
}

/// The full rigorous AzEl computation ("Rigorous"): MJD, ERA,
/// CIO-based precession-nutation from interpolated (X,Y,S), aberration using
/// interpolated Earth velocity, GCRS→ITRS, then ITRS→local via the station's
/// geodetic rotation.
#[allow(clippy::too_many_arguments)]
pub fn rigorous_az_el(
    station_id: StationId,
    source_id: SourceId,
    position: &Position,
    source_crs: [f64; 3],
    astro: &AstronomicalParameters,
    time_system: &TimeSystem,
    time: SessionSeconds,
) -> PointingVector {
    let jd_ut1 = 2_400_000.5 + time_system.mjd(time);
    let itrs = source_crs_to_itrs(astro, time as f64, jd_ut1, source_crs);
    let local = position.ecef_to_local(itrs);
    let (east, north, up) = (local[0], local[1], local[2]);

    let el = up.clamp(-1.0, 1.0).asin();
    let mut az = east.atan2(north);
    if az < 0.0 {
        az += TAU;
    }

    let lat = position.latitude;
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_el, cos_el) = el.sin_cos();
    let sin_dec = sin_lat * sin_el + cos_lat * cos_el * az.cos();
    let dec = sin_dec.clamp(-1.0, 1.0).asin();
    let cos_dec = dec.cos();
    let ha = if cos_dec.abs() > 1e-12 {
        let sin_ha = -az.sin() * cos_el / cos_dec;
        let cos_ha = (sin_el - sin_lat * sin_dec) / (cos_lat * cos_dec);
        sin_ha.atan2(cos_ha)
    } else {
        0.0
    };

    PointingVector::new(station_id, source_id, az, el, ha, dec, time)
}

/// Convenience: build a `RADec`'s CRS vector and feed it through
/// [`rigorous_az_el`] in one call.
pub fn rigorous_az_el_from_radec(
    station_id: StationId,
    source_id: SourceId,
    position: &Position,
    radec: &RADec,
    astro: &AstronomicalParameters,
    time_system: &TimeSystem,
    time: SessionSeconds,
) -> PointingVector {
    rigorous_az_el(
        station_id,
        source_id,
        position,
        radec.to_crs_vector(),
        astro,
        time_system,
        time,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdRegistry;
    use approx::assert_abs_diff_eq;

    fn flat_astro(duration: u32) -> AstronomicalParameters {
        AstronomicalParameters::build(duration, 60, |_t| (0.0, 0.0, 0.0, [0.0; 3]))
    }

    #[test]
    fn simple_matches_cached_sample_exactly() {
        let mut reg = IdRegistry::new();
        let st = reg.next_station();
        let src = reg.next_source();
        let mut cache = AzElCache::new();
        let pv = PointingVector::new(st, src, 1.0, 0.5, 0.1, 0.2, 100);
        cache.push_rigorous(pv);
        cache.push_rigorous(PointingVector::new(st, src, 1.5, 0.6, 0.2, 0.3, 200));

        let got = cache.simple(st, src, 100).unwrap();
        assert_abs_diff_eq!(got.az, pv.az);
        assert_abs_diff_eq!(got.el, pv.el);
    }

    #[test]
    fn simple_interpolates_linearly() {
        let mut reg = IdRegistry::new();
        let st = reg.next_station();
        let src = reg.next_source();
        let mut cache = AzElCache::new();
        cache.push_rigorous(PointingVector::new(st, src, 0.0, 0.0, 0.0, 0.0, 0));
        cache.push_rigorous(PointingVector::new(st, src, 1.0, 1.0, 1.0, 1.0, 100));

        let got = cache.simple(st, src, 50).unwrap();
        assert_abs_diff_eq!(got.az, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(got.el, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn rigorous_azel_is_self_consistent_with_lat_derivation() {
        let mut reg = IdRegistry::new();
        let st = reg.next_station();
        let src = reg.next_source();
        let pos = Position::from_ecef(6_378_137.0 + 500.0, 0.0, 0.0); // equator
        let astro = flat_astro(3600);
        let ts = TimeSystem::new(
            hifitime::Epoch::from_mjd_utc(58849.0),
            hifitime::Epoch::from_mjd_utc(58850.0),
        );
        let radec = RADec::new_degrees(0.0, 0.0);
        let pv = rigorous_az_el_from_radec(st, src, &pos, &radec, &astro, &ts, 0);
        assert!(pv.el.is_finite());
        assert!((0.0..TAU).contains(&pv.az));
    }
}
