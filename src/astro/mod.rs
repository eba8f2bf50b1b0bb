// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Earth-orientation interpolation tables and the rigorous GCRS→ITRS transform
(`AstronomicalParameters`/ "rigorous" AzEl path).

This follows SOFA/CIO-based conventions structurally (CIP X/Y/s,
Earth-rotation-angle, precession-nutation matrix construction as in IERS
Technical Note 32) without linking the C SOFA/ERFA library: the transform is
implemented directly in Rust over a precomputed, linearly-interpolated
Earth-orientation grid, keeping the dependency stack free of an unverifiable
FFI surface (see DESIGN.md).
*/

mod matrix;

pub use matrix::Mat3;

use crate::constants::TAU;

/// Astronomical speed of light, m/s; used for classical stellar aberration.
const SPEED_OF_LIGHT_M_PER_S: f64 = 299_792_458.0;

/// One sample of the Earth-orientation grid.
#[derive(Clone, Copy, Debug)]
struct Sample {
    /// Session seconds at which this sample applies.
    t: f64,
    /// CIP coordinates (dimensionless, radians-scale) X, Y and the CIO
    /// locator s, in radians.
    x: f64,
    y: f64,
    s: f64,
    /// Earth barycentric velocity, in units of the speed of light (so the
    /// aberration correction is `v/c`).
    vel: [f64; 3],
}

/// Process-wide, read-only-after-init Earth-orientation interpolation table
/// (`AstronomicalParameters`).
#[derive(Debug, Clone)]
pub struct AstronomicalParameters {
    samples: Vec<Sample>,
}

impl AstronomicalParameters {
    /// Build a grid covering `[0, duration_s]` at `step_s` spacing (typical
    /// step: minutes).
    ///
    /// `model` supplies X/Y/s and Earth velocity at arbitrary session
    /// seconds; it is evaluated once per grid point and then never touched
    /// again during scheduling.
    pub fn build(
        duration_s: u32,
        step_s: u32,
        model: impl Fn(f64) -> (f64, f64, f64, [f64; 3]),
    ) -> Self {
        let step_s = step_s.max(1);
        let mut samples = Vec::new();
        let mut t = 0u32;
        loop {
            let (x, y, s, vel) = model(t as f64);
            samples.push(Sample {
                t: t as f64,
                x,
                y,
                s,
                vel,
            });
            if t >= duration_s {
                break;
            }
            t = t.saturating_add(step_s).min(duration_s.max(t));
            if t == duration_s && samples.last().map(|s| s.t) == Some(t as f64) {
                break;
            }
        }
        Self { samples }
    }

    /// Linear interpolation at `t` (session seconds, may be fractional).
    fn interpolate(&self, t: f64) -> (f64, f64, f64, [f64; 3]) {
        if self.samples.is_empty() {
            return (0.0, 0.0, 0.0, [0.0; 3]);
        }
        if t <= self.samples[0].t {
            let s = &self.samples[0];
            return (s.x, s.y, s.s, s.vel);
        }
        let last = self.samples.len() - 1;
        if t >= self.samples[last].t {
            let s = &self.samples[last];
            return (s.x, s.y, s.s, s.vel);
        }
        let idx = self
            .samples
            .partition_point(|s| s.t <= t)
            .saturating_sub(1)
            .min(last - 1);
        let a = &self.samples[idx];
        let b = &self.samples[idx + 1];
        let frac = if b.t > a.t { (t - a.t) / (b.t - a.t) } else { 0.0 };
        let lerp = |u: f64, v: f64| u + (v - u) * frac;
        let vel = [
            lerp(a.vel[0], b.vel[0]),
            lerp(a.vel[1], b.vel[1]),
            lerp(a.vel[2], b.vel[2]),
        ];
        (lerp(a.x, b.x), lerp(a.y, b.y), lerp(a.s, b.s), vel)
    }
}

/// Earth rotation angle (radians) at a UT1 Julian date, via the standard
/// IAU 2000 linear model.
pub fn earth_rotation_angle_rad(jd_ut1: f64) -> f64 {
    let t = jd_ut1 - 2_451_545.0;
    let frac = jd_ut1.fract();
    let era = TAU * (frac + 0.779_057_273_264_0 + 0.002_737_811_911_354_48 * t);
    era.rem_euclid(TAU)
}

/// Build the CIO-based GCRS→CIRS rotation matrix from the CIP coordinates
/// `(x, y)` and the CIO locator `s`, following the construction in SOFA's
/// `eraC2ixys` (IERS TN32 ).
pub fn precession_nutation_matrix(x: f64, y: f64, s: f64) -> Mat3 {
    let r2 = x * x + y * y;
    let e = if r2 > 0.0 { y.atan2(x) } else { 0.0 };
    let d = (r2 / (1.0 - r2).max(1e-12)).sqrt().atan();
    Mat3::rotation_z(-(e + s)) * Mat3::rotation_y(d) * Mat3::rotation_z(e)
}

/// Apply classical (first-order) stellar aberration given the Earth's
/// barycentric velocity in units of `c`.
pub fn apply_aberration(source_gcrs: [f64; 3], earth_vel_over_c: [f64; 3]) -> [f64; 3] {
    let dot = source_gcrs[0] * earth_vel_over_c[0]
        + source_gcrs[1] * earth_vel_over_c[1]
        + source_gcrs[2] * earth_vel_over_c[2];
    let mut out = [0.0; 3];
    for i in 0..3 {
        out[i] = source_gcrs[i] + earth_vel_over_c[i] - dot * source_gcrs[i];
    }
    matrix::normalize(out)
}

/// The full rigorous GCRS→ITRS rotation for a single epoch: CIO-based
/// precession-nutation, then Earth rotation, then (identity) polar motion.
///
/// Polar motion is treated as zero: a real session would source `(xp, yp)`
/// from the same IERS bulletin as the nutation series, but it is not an
/// engine input here, so it is fixed at the SOFA default of no offset
/// (documented Open Question resolution in DESIGN.md).
pub fn gcrs_to_itrs_matrix(jd_ut1: f64, x: f64, y: f64, s: f64) -> Mat3 {
    let pn = precession_nutation_matrix(x, y, s);
    let era = earth_rotation_angle_rad(jd_ut1);
    let r3 = Mat3::rotation_z(era);
    r3 * pn
}

/// Transform a source's CRS unit vector into ITRS, aberration-corrected,
/// at the given UT1 Julian date using the interpolated Earth-orientation
/// parameters.
pub fn source_crs_to_itrs(
    params: &AstronomicalParameters,
    session_seconds: f64,
    jd_ut1: f64,
    source_crs: [f64; 3],
) -> [f64; 3] {
    let (x, y, s, vel) = params.interpolate(session_seconds);
    let vel_over_c = [
        vel[0] / SPEED_OF_LIGHT_M_PER_S,
        vel[1] / SPEED_OF_LIGHT_M_PER_S,
        vel[2] / SPEED_OF_LIGHT_M_PER_S,
    ];
    let aberrated = apply_aberration(source_crs, vel_over_c);
    let m = gcrs_to_itrs_matrix(jd_ut1, x, y, s);
    m.mul_vec(aberrated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn era_is_wrapped() {
        let era = earth_rotation_angle_rad(2_451_545.25);
        assert!((0.0..TAU).contains(&era));
    }

    #[test]
    fn precession_nutation_identity_when_xys_zero() {
        let m = precession_nutation_matrix(0.0, 0.0, 0.0);
        let v = [1.0, 0.0, 0.0];
        let out = m.mul_vec(v);
        assert_abs_diff_eq!(out[0], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out[1], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out[2], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn aberration_preserves_unit_length() {
        let v = apply_aberration([0.0, 0.0, 1.0], [1e-4, 2e-4, -3e-4]);
        let norm = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn interpolation_matches_grid_samples() {
        let params = AstronomicalParameters::build(600, 60, |t| (t * 1e-6, 0.0, 0.0, [0.0; 3]));
        let (x, _, _, _) = params.interpolate(60.0);
        assert_abs_diff_eq!(x, 60.0 * 1e-6, epsilon = 1e-12);
    }
}
