// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Process-wide, read-only-after-init lookup tables (`LookupTables`):
//! `sin`/`cos`/`acos` sampled at 0.001 rad, and a 3-D angular-distance
//! table keyed by `(el, delta_az_deg, delta_el_deg)` in whole degrees.

use crate::constants::{PI, TAU, TRIG_TABLE_STEP_RAD};

/// `sin`/`cos`/`acos` sampled every [`TRIG_TABLE_STEP_RAD`] radians.
///
/// The table is built once per scheduling thread and queried by rounding
/// the argument to the nearest grid point, trading a small amount of
/// accuracy for avoiding repeated transcendental calls in the hot inner
/// loops of subcon construction.
#[derive(Debug, Clone)]
pub struct LookupTable {
    sin: Vec<f64>,
    cos: Vec<f64>,
    // acos domain is [-1, 1]; indexed by a separate, finer grid.
    acos: Vec<f64>,
    step: f64,
}

impl LookupTable {
    /// Build the table. `step` is normally [`TRIG_TABLE_STEP_RAD`]; exposed
    /// for tests that want a coarser, faster-to-build table.
    pub fn new(step: f64) -> Self {
        let n = (TAU / step).ceil() as usize + 1;
        let sin = (0..n).map(|i| (i as f64 * step).sin()).collect();
        let cos = (0..n).map(|i| (i as f64 * step).cos()).collect();

        let acos_n = (2.0 / step).ceil() as usize + 1;
        let acos = (0..acos_n)
            .map(|i| {
                let x = (-1.0 + i as f64 * step).clamp(-1.0, 1.0);
                x.acos()
            })
            .collect();

        Self {
            sin,
            cos,
            acos,
            step,
        }
    }

    fn wrap_index(&self, angle_rad: f64) -> usize {
        let wrapped = angle_rad.rem_euclid(TAU);
        ((wrapped / self.step).round() as usize) % self.sin.len().max(1)
    }

    pub fn sin(&self, angle_rad: f64) -> f64 {
        self.sin[self.wrap_index(angle_rad)]
    }

    pub fn cos(&self, angle_rad: f64) -> f64 {
        self.cos[self.wrap_index(angle_rad)]
    }

    pub fn acos(&self, x: f64) -> f64 {
        let x = x.clamp(-1.0, 1.0);
        let idx = (((x + 1.0) / self.step).round() as usize).min(self.acos.len() - 1);
        self.acos[idx]
    }
}

impl Default for LookupTable {
    fn default() -> Self {
        Self::new(TRIG_TABLE_STEP_RAD)
    }
}

/// Precomputed angular distance between two `(az, el)` pointings, keyed by
/// whole-degree elevation and whole-degree `(delta_az, delta_el)`, returning
/// radians.
#[derive(Debug, Clone)]
pub struct AngularDistanceTable {
    /// `table[el_deg][delta_az_deg][delta_el_deg]`, all offset so index 0 is
    /// the most negative representable value.
    table: Vec<Vec<Vec<f64>>>,
}

const EL_STEPS: usize = 91; // 0..=90 degrees, mirrored for negative el by symmetry
const DELTA_STEPS: usize = 361; // -180..=180 degrees

impl AngularDistanceTable {
    /// Build the table by rigorous haversine evaluation at every grid point.
    pub fn build() -> Self {
        let mut table = vec![vec![vec![0.0f64; DELTA_STEPS]; DELTA_STEPS]; EL_STEPS];
        for (el_idx, row) in table.iter_mut().enumerate() {
            let el1 = (el_idx as f64).to_radians();
            for (daz_idx, col) in row.iter_mut().enumerate() {
                let daz = (daz_idx as i32 - 180) as f64;
                for (del_idx, cell) in col.iter_mut().enumerate() {
                    let del = (del_idx as i32 - 180) as f64;
                    let el2 = el1 + del.to_radians();
                    *cell = haversine_az_el(0.0, el1, daz.to_radians(), el2);
                }
            }
        }
        Self { table }
    }

    /// Look up the angular distance between two `(az, el)` pointings in
    /// radians, quantising to whole-degree `el`, `delta_az`, `delta_el`.
    pub fn lookup(&self, el1_rad: f64, az1_rad: f64, az2_rad: f64, el2_rad: f64) -> f64 {
        let el_deg = el1_rad.to_degrees().round().clamp(0.0, (EL_STEPS - 1) as f64) as usize;
        let mut daz_deg = (az2_rad - az1_rad).to_degrees().round() as i32;
        while daz_deg > 180 {
            daz_deg -= 360;
        }
        while daz_deg < -180 {
            daz_deg += 360;
        }
        let del_deg = (el2_rad - el1_rad)
            .to_degrees()
            .round()
            .clamp(-180.0, 180.0) as i32;

        let daz_idx = (daz_deg + 180).clamp(0, DELTA_STEPS as i32 - 1) as usize;
        let del_idx = (del_deg + 180).clamp(0, DELTA_STEPS as i32 - 1) as usize;
        self.table[el_deg][daz_idx][del_idx]
    }
}

/// Rigorous angular distance between two `(az, el)` points, used only to
/// build [`AngularDistanceTable`] (the inner scheduling loop never calls
/// this directly).
fn haversine_az_el(az1: f64, el1: f64, daz: f64, el2: f64) -> f64 {
    let az2 = az1 + daz;
    let s = el1.sin() * el2.sin() + el1.cos() * el2.cos() * (az2 - az1).cos();
    s.clamp(-1.0, 1.0).acos().min(PI)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn trig_table_matches_std_within_resolution() {
        let t = LookupTable::default();
        for i in 0..1000 {
            let angle = i as f64 * 0.0123;
            assert_abs_diff_eq!(t.sin(angle), angle.sin(), epsilon = 1e-3);
            assert_abs_diff_eq!(t.cos(angle), angle.cos(), epsilon = 1e-3);
        }
    }

    #[test]
    fn angular_distance_zero_for_identical_pointing() {
        let t = AngularDistanceTable::build();
        let d = t.lookup(0.5, 1.0, 1.0, 0.5);
        assert_abs_diff_eq!(d, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn angular_distance_symmetric_to_table_resolution() {
        let t = AngularDistanceTable::build();
        let a = t.lookup(0.4, 0.2, 0.5, 0.6);
        let b = t.lookup(0.6, 0.5, 0.2, 0.4);
        assert_abs_diff_eq!(a, b, epsilon = 1e-2);
    }
}
