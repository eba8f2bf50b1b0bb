// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Source flux models: a tagged enum over knots, Gaussian components,
//! constant, and satellite representations.

use serde::{Deserialize, Serialize};

/// One Gaussian brightness component ("flux, major axis, axial
/// ratio, position angle").
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GaussianComponent {
    pub flux_jy: f64,
    /// Major axis FWHM, milliarcseconds.
    pub major_axis_mas: f64,
    /// Minor/major axis ratio, in `(0, 1]`.
    pub axial_ratio: f64,
    /// Position angle, degrees east of north.
    pub position_angle_deg: f64,
}

impl GaussianComponent {
    /// Visibility amplitude at projected baseline `(u, v)` (wavelengths),
    /// via the standard elliptical-Gaussian taper.
    fn observed(&self, u: f64, v: f64) -> f64 {
        let pa = self.position_angle_deg.to_radians();
        let (sin_pa, cos_pa) = pa.sin_cos();
        // Rotate (u, v) into the ellipse's major/minor frame.
        let u_maj = u * sin_pa + v * cos_pa;
        let u_min = u * cos_pa - v * sin_pa;

        let major_rad = (self.major_axis_mas / 1000.0 / 3600.0).to_radians();
        let minor_rad = major_rad * self.axial_ratio;

        const GAUSSIAN_CONST: f64 = std::f64::consts::PI * std::f64::consts::PI / (4.0 * std::f64::consts::LN_2);
        let exponent = GAUSSIAN_CONST * ((u_maj * major_rad).powi(2) + (u_min * minor_rad).powi(2));
        self.flux_jy * (-exponent).exp()
    }
}

/// Per-source, per-band flux model ("Flux model"). Contract:
/// `observed(u,v)` returns Jansky; `max()` bounds it from above.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum FluxModel {
    /// Piecewise-constant flux vs projected baseline length, in kilo-lambda.
    Knots {
        baseline_klambda: Vec<f64>,
        flux_jy: Vec<f64>,
    },
    /// Sum of Gaussian brightness components.
    Gaussian { components: Vec<GaussianComponent> },
    /// A single scalar, independent of baseline.
    Constant { flux_jy: f64 },
    /// Elevation/distance-driven (spacecraft/satellite sources).
    Satellite {
        flux_at_1000km_jy: f64,
        min_elevation_rad: f64,
    },
}

impl FluxModel {
    /// Whether this model needs projected `(u, v)` to be evaluated. If not,
    /// the flux value is used directly.
    pub fn needs_uv(&self) -> bool {
        matches!(self, FluxModel::Knots { .. } | FluxModel::Gaussian { .. })
    }

    /// Whether this model needs elevation and geodesic station-source
    /// distance passed instead.
    pub fn needs_el_dist(&self) -> bool {
        matches!(self, FluxModel::Satellite { .. })
    }

    /// Flux in Jansky at projected baseline `(u, v)`, wavelengths.
    pub fn observed_uv(&self, u: f64, v: f64) -> f64 {
        match self {
            FluxModel::Knots {
                baseline_klambda,
                flux_jy,
            } => {
                let baseline_klambda_len = (u * u + v * v).sqrt() / 1000.0;
                step_lookup(baseline_klambda, flux_jy, baseline_klambda_len)
            }
            FluxModel::Gaussian { components } => {
                components.iter().map(|c| c.observed(u, v)).sum()
            }
            FluxModel::Constant { flux_jy } => *flux_jy,
            FluxModel::Satellite { .. } => 0.0,
        }
    }

    /// Flux in Jansky given elevation and geodesic station-source distance
    /// (for satellite sources).
    pub fn observed_el_dist(&self, el_rad: f64, distance_km: f64) -> f64 {
        match self {
            FluxModel::Satellite {
                flux_at_1000km_jy,
                min_elevation_rad,
            } => {
                if el_rad < *min_elevation_rad || distance_km <= 0.0 {
                    0.0
                } else {
                    flux_at_1000km_jy * (1000.0 / distance_km).powi(2)
                }
            }
            FluxModel::Constant { flux_jy } => *flux_jy,
            _ => 0.0,
        }
    }

    /// An upper bound on the flux this model can produce, used by
    /// veto/culling logic upstream (not implemented here; the contract is
    /// kept for callers in the catalog layer).
    pub fn max(&self) -> f64 {
        match self {
            FluxModel::Knots { flux_jy, .. } => flux_jy.iter().cloned().fold(0.0, f64::max),
            FluxModel::Gaussian { components } => components.iter().map(|c| c.flux_jy).sum(),
            FluxModel::Constant { flux_jy } => *flux_jy,
            FluxModel::Satellite { flux_at_1000km_jy, .. } => *flux_at_1000km_jy,
        }
    }
}

/// Step-function lookup on baseline-length knots: the flux at the knot with
/// the greatest length `<= x`, or the first knot if `x` precedes all of
/// them (piecewise-constant, ).
fn step_lookup(knots: &[f64], values: &[f64], x: f64) -> f64 {
    if knots.is_empty() {
        return 0.0;
    }
    let mut result = values[0];
    for (k, v) in knots.iter().zip(values.iter()) {
        if *k > x {
            break;
        }
        result = *v;
    }
    result
}
