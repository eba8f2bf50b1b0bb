// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Horizon mask visibility.

use crate::coord::PointingVector;

/// Minimum-elevation-vs-azimuth mask. Variant `{step, line, none}`.
#[derive(Clone, Debug)]
pub enum HorizonMask {
    /// No mask: everything above the horizon is visible.
    None,
    /// Piecewise-constant minimum elevation: `mask_el(az)` is the elevation
    /// knot whose azimuth is the greatest knot `<= az` (wrapping).
    Step { az_rad: Vec<f64>, el_rad: Vec<f64> },
    /// Piecewise-linear minimum elevation between consecutive knots.
    Line { az_rad: Vec<f64>, el_rad: Vec<f64> },
}

impl HorizonMask {
    /// Minimum elevation (radians) at `az` (radians, any range; wrapped to
    /// `[0, 2*pi)` before lookup).
    pub fn mask_el(&self, az: f64) -> f64 {
        match self {
            HorizonMask::None => f64::NEG_INFINITY,
            HorizonMask::Step { az_rad, el_rad } => {
                let az = az.rem_euclid(crate::constants::TAU);
                // Linear search ends when the next az knot exceeds the
                // query.
                let mut result = el_rad.first().copied().unwrap_or(f64::NEG_INFINITY);
                for (knot_az, knot_el) in az_rad.iter().zip(el_rad.iter()) {
                    if *knot_az > az {
                        break;
                    }
                    result = *knot_el;
                }
                result
            }
            HorizonMask::Line { az_rad, el_rad } => {
                let az = az.rem_euclid(crate::constants::TAU);
                if az_rad.is_empty() {
                    return f64::NEG_INFINITY;
                }
                if az <= az_rad[0] {
                    return el_rad[0];
                }
                for w in az_rad.windows(2).zip(el_rad.windows(2)) {
                    let ((a0, a1), (e0, e1)) = ((w.0[0], w.0[1]), (w.1[0], w.1[1]));
                    if az >= a0 && az <= a1 {
                        if (a1 - a0).abs() < 1e-12 {
                            return e0;
                        }
                        let frac = (az - a0) / (a1 - a0);
                        return e0 + (e1 - e0) * frac;
                    }
                }
                *el_rad.last().unwrap()
            }
        }
    }

    /// `visible`: `pv.el >= mask_el(pv.az)`.
    pub fn visible(&self, pv: &PointingVector) -> bool {
        pv.el >= self.mask_el(pv.az)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdRegistry;

    fn pv(az_deg: f64, el_deg: f64) -> PointingVector {
        let mut ids = IdRegistry::new();
        let st = ids.next_station();
        let src = ids.next_source();
        PointingVector::new(st, src, az_deg.to_radians(), el_deg.to_radians(), 0.0, 0.0, 0)
    }

    #[test]
    fn scenario_3_step_mask_invisible() {
        // scenario 3.
        let mask = HorizonMask::Step {
            az_rad: [0.0, 90.0, 180.0, 270.0, 360.0]
                .iter()
                .map(|d: &f64| d.to_radians())
                .collect(),
            el_rad: vec![
                5f64.to_radians(),
                15f64.to_radians(),
                5f64.to_radians(),
                10f64.to_radians(),
                5f64.to_radians(),
            ],
        };
        let pv = pv(95.0, 12.0);
        assert!(!mask.visible(&pv));
    }

    #[test]
    fn no_mask_always_visible() {
        let mask = HorizonMask::None;
        assert!(mask.visible(&pv(10.0, 0.5)));
    }

    #[test]
    fn line_mask_interpolates() {
        let mask = HorizonMask::Line {
            az_rad: vec![0.0, 100f64.to_radians()],
            el_rad: vec![0.0, 10f64.to_radians()],
        };
        let el = mask.mask_el(50f64.to_radians());
        assert!(el > 0.0 && el < 10f64.to_radians());
    }
}
