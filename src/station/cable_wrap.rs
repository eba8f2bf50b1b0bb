// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Cable-wrap limits, sections, and unwrapping.
*/

use itertools::Itertools;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::constants::TAU;
use crate::coord::PointingVector;

/// Which of the (possibly overlapping) axis-1 sections a pointing falls in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter, EnumString)]
pub enum Section {
    /// Counter-clockwise ("W" in the original VieSched++ naming).
    #[strum(serialize = "W")]
    Ccw,
    /// Neutral ("-"), the only section when the range doesn't exceed 2*pi.
    #[strum(serialize = "-")]
    Neutral,
    /// Clockwise ("C").
    #[strum(serialize = "C")]
    Cw,
}

lazy_static::lazy_static! {
    /// Comma-joined section names, for log/error messages that need to
    /// name the valid set.
    pub static ref SECTION_NAMES: String = Section::iter().join(", ");
}

/// Axis limits (radians) plus small safety offsets.
#[derive(Clone, Copy, Debug)]
pub struct CableWrap {
    axis1_low: f64,
    axis1_up: f64,
    axis2_low: f64,
    axis2_up: f64,
    axis1_low_offset: f64,
    axis1_up_offset: f64,
    axis2_low_offset: f64,
    axis2_up_offset: f64,

    // Precomputed section limits, mirroring the original's w/n/c Low/Up.
    w_low: f64,
    w_up: f64,
    n_low: f64,
    n_up: f64,
    c_low: f64,
    c_up: f64,
}

impl CableWrap {
    pub fn new(axis1_low: f64, axis1_up: f64, axis2_low: f64, axis2_up: f64) -> Self {
        let (w_low, w_up, n_low, n_up, c_low, c_up) = if (axis1_up - axis1_low) > TAU {
            let overlap = (axis1_up - axis1_low) - TAU;
            (
                axis1_low,
                axis1_low + overlap,
                axis1_low + overlap,
                axis1_up - overlap,
                axis1_up - overlap,
                axis1_up,
            )
        } else {
            (axis1_low, axis1_low, axis1_low, axis1_up, axis1_up, axis1_up)
        };

        Self {
            axis1_low,
            axis1_up,
            axis2_low,
            axis2_up,
            axis1_low_offset: 0.0,
            axis1_up_offset: 0.0,
            axis2_low_offset: 0.0,
            axis2_up_offset: 0.0,
            w_low,
            w_up,
            n_low,
            n_up,
            c_low,
            c_up,
        }
    }

    pub fn with_offsets(
        mut self,
        axis1_low_offset: f64,
        axis1_up_offset: f64,
        axis2_low_offset: f64,
        axis2_up_offset: f64,
    ) -> Self {
        self.axis1_low_offset = axis1_low_offset;
        self.axis1_up_offset = axis1_up_offset;
        self.axis2_low_offset = axis2_low_offset;
        self.axis2_up_offset = axis2_up_offset;
        self
    }

    pub fn limits(&self, section: Section) -> (f64, f64) {
        match section {
            Section::Neutral => (self.n_low, self.n_up),
            Section::Cw => (self.c_low, self.c_up),
            Section::Ccw => (self.w_low, self.w_up),
        }
    }

    /// `anglesInside`: true iff both axes are within limits
    /// minus offsets, respecting whether axis 1's range wraps zero.
    pub fn angles_inside(&self, pv: &PointingVector) -> bool {
        let axis2_ok =
            pv.el >= self.axis2_low + self.axis2_low_offset && pv.el <= self.axis2_up - self.axis2_up_offset;

        if (self.axis1_up - self.axis1_up_offset - self.axis1_low + self.axis1_low_offset) >= TAU {
            return axis2_ok;
        }

        let ax1_1 = (self.axis1_low + self.axis1_low_offset).rem_euclid(TAU);
        let ax1_2 = (self.axis1_up - self.axis1_up_offset).rem_euclid(TAU);
        let az = pv.az.rem_euclid(TAU);

        let axis1_ok = if ax1_2 < ax1_1 {
            // Range wraps through zero.
            az >= ax1_1 || az <= ax1_2
        } else {
            az >= ax1_1 && az <= ax1_2
        };

        axis1_ok && axis2_ok
    }

    /// `unwrapAzNearAz`: bring `pv.az` into
    /// `[axis1_low, axis1_low + 2*pi)`, then pick among the valid `+2*pi`
    /// ambiguities the one closest to `ref_az`.
    pub fn unwrap_az_near_az(&self, pv: &mut PointingVector, ref_az: f64) {
        let mut az = self.axis1_low + (pv.az - self.axis1_low).rem_euclid(TAU);
        let mut best = az;
        let mut best_dist = (az - ref_az).abs();
        loop {
            az -= TAU;
            if az < self.axis1_low - 1e-9 {
                break;
            }
            let dist = (az - ref_az).abs();
            if dist < best_dist {
                best_dist = dist;
                best = az;
            }
        }
        let mut az = best;
        loop {
            az += TAU;
            if az > self.axis1_up + 1e-9 {
                break;
            }
            let dist = (az - ref_az).abs();
            if dist < best_dist {
                best_dist = dist;
                best = az;
            }
        }
        pv.az = best;
    }

    /// `unwrapAzInSection`: force `pv.az` into `section`'s
    /// limits, disambiguating the two adjacent equal-length residues by
    /// proximity to the section midpoint. Returns whether the result still
    /// falls inside the section (it can legitimately fail for a section too
    /// narrow to contain any representative of the angle).
    ///
    /// See DESIGN.md for the reasoning behind these semantics (force into
    /// the section; report `false` when the result falls outside).
    pub fn unwrap_az_in_section(&self, pv: &mut PointingVector, section: Section) -> bool {
        let (low, up) = self.limits(section);
        let mid = (low + up) / 2.0;

        let mut az = low + (pv.az - low).rem_euclid(TAU);
        // The residue `az` and `az - 2*pi` (or `az + 2*pi`) are the two
        // candidates of equal wrap-distance; pick whichever is closer to
        // the section midpoint.
        let alt_low = az - TAU;
        let alt_high = az + TAU;
        let mut best = az;
        let mut best_dist = (az - mid).abs();
        for candidate in [alt_low, alt_high] {
            let dist = (candidate - mid).abs();
            if dist < best_dist {
                best_dist = dist;
                best = candidate;
            }
        }
        az = best;
        pv.az = az;
        let inside = az >= low - 1e-9 && az <= up + 1e-9;
        if !inside {
            log::trace!("az {az} fell outside section {section} (valid sections: {})", *SECTION_NAMES);
        }
        inside
    }

    /// `section`: the section containing an already-unwrapped
    /// azimuth.
    pub fn section(&self, unwrapped_az: f64) -> Option<Section> {
        if unwrapped_az >= self.n_low - 1e-9 && unwrapped_az <= self.n_up + 1e-9 {
            return Some(Section::Neutral);
        }
        if unwrapped_az >= self.c_low - 1e-9 && unwrapped_az <= self.c_up + 1e-9 {
            return Some(Section::Cw);
        }
        if unwrapped_az >= self.w_low - 1e-9 && unwrapped_az <= self.w_up + 1e-9 {
            return Some(Section::Ccw);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdRegistry;
    use approx::assert_abs_diff_eq;

    fn pv(az_deg: f64) -> PointingVector {
        let mut ids = IdRegistry::new();
        let st = ids.next_station();
        let src = ids.next_source();
        PointingVector::new(st, src, az_deg.to_radians(), 0.5, 0.0, 0.0, 0)
    }

    #[test]
    fn scenario_2_cable_wrap_ambiguity() {
        // wrap [-90, 450] deg, current az=350, new az=10. unwrapAzNearAz
        // should prefer 370 (closer to 350) over 10.
        let wrap = CableWrap::new((-90f64).to_radians(), 450f64.to_radians(), 0.0, TAU);
        let mut new_pv = pv(10.0);
        wrap.unwrap_az_near_az(&mut new_pv, 350f64.to_radians());
        assert_abs_diff_eq!(new_pv.az.to_degrees(), 370.0, epsilon = 1e-6);
    }

    #[test]
    fn no_overlap_when_range_under_2pi() {
        let wrap = CableWrap::new(0.0, 180f64.to_radians(), 0.0, TAU);
        assert_eq!(wrap.section(90f64.to_radians()), Some(Section::Neutral));
        assert_eq!(wrap.section(200f64.to_radians()), None);
    }

    #[test]
    fn angles_inside_respects_offsets() {
        let wrap = CableWrap::new(0.0, 90f64.to_radians(), 0.0, TAU)
            .with_offsets(5f64.to_radians(), 5f64.to_radians(), 0.0, 0.0);
        assert!(!wrap.angles_inside(&pv(2.0)));
        assert!(wrap.angles_inside(&pv(45.0)));
    }
}
