// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Equipment / SEFD model.

use std::collections::HashMap;

/// System-equivalent flux density model. Variant `{constant, el-dependent,
/// el-table}`.
#[derive(Clone, Debug)]
pub enum Equipment {
    /// A constant SEFD (Jy) per band.
    Constant { sefd_jy: HashMap<String, f64> },
    /// `SEFD * max(1, c0 + c1 / sin(el)^y)` per band.
    ElDependent {
        sefd_jy: HashMap<String, f64>,
        c0: f64,
        c1: f64,
        y: f64,
    },
    /// Linearly interpolated SEFD on elevation knots, per band.
    ElTable {
        el_rad: Vec<f64>,
        sefd_jy: HashMap<String, Vec<f64>>,
    },
}

impl Equipment {
    /// SEFD in Jansky for `band` at elevation `el_rad`.
    pub fn sefd(&self, band: &str, el_rad: f64) -> Option<f64> {
        match self {
            Equipment::Constant { sefd_jy } => sefd_jy.get(band).copied(),
            Equipment::ElDependent { sefd_jy, c0, c1, y } => {
                let base = *sefd_jy.get(band)?;
                let sin_el = el_rad.sin().max(1e-6);
                let factor = (c0 + c1 / sin_el.powf(*y)).max(1.0);
                Some(base * factor)
            }
            Equipment::ElTable { el_rad: knots, sefd_jy } => {
                let values = sefd_jy.get(band)?;
                Some(interpolate_on_knots(knots, values, el_rad))
            }
        }
    }

    /// Whether this model needs projected-baseline `(u, v)` to evaluate a
    /// source's flux (this is really a property of the flux model, but
    /// equipment and flux models are queried together in observation
    /// sizing, so both expose the same capability flags).
    pub fn needs_uv(&self) -> bool {
        true
    }
}

fn interpolate_on_knots(knots: &[f64], values: &[f64], x: f64) -> f64 {
    if knots.is_empty() {
        return f64::NAN;
    }
    if x <= knots[0] {
        return values[0];
    }
    if x >= *knots.last().unwrap() {
        return *values.last().unwrap();
    }
    for i in 0..knots.len() - 1 {
        if x >= knots[i] && x <= knots[i + 1] {
            let frac = (x - knots[i]) / (knots[i + 1] - knots[i]);
            return values[i] + (values[i + 1] - values[i]) * frac;
        }
    }
    *values.last().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn scenario_4_constant_sefd() {
        let mut sefd = HashMap::new();
        sefd.insert("X".to_string(), 1000.0);
        let equip = Equipment::Constant { sefd_jy: sefd };
        assert_abs_diff_eq!(equip.sefd("X", 0.5).unwrap(), 1000.0);
    }

    #[test]
    fn el_table_interpolates() {
        let mut sefd = HashMap::new();
        sefd.insert("X".to_string(), vec![2000.0, 1000.0]);
        let equip = Equipment::ElTable {
            el_rad: vec![0.0, std::f64::consts::FRAC_PI_2],
            sefd_jy: sefd,
        };
        let mid = equip
            .sefd("X", std::f64::consts::FRAC_PI_4)
            .unwrap();
        assert!(mid > 1000.0 && mid < 2000.0);
    }

    #[test]
    fn el_dependent_increases_at_low_elevation() {
        let mut sefd = HashMap::new();
        sefd.insert("X".to_string(), 1000.0);
        let equip = Equipment::ElDependent {
            sefd_jy: sefd,
            c0: 1.0,
            c1: 0.1,
            y: 1.0,
        };
        let low = equip.sefd("X", 10f64.to_radians()).unwrap();
        let high = equip.sefd("X", 80f64.to_radians()).unwrap();
        assert!(low > high);
    }
}
