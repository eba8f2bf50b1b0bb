// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::astro::Mat3;

/// WGS84 semi-major axis, metres.
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// A station's Cartesian ECEF position, with derived geodetic coordinates
/// and the geodetic→local (topocentric ENU) rotation matrix precomputed
/// once at construction (`Position`).
#[derive(Clone, Copy, Debug)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Geodetic latitude, radians.
    pub latitude: f64,
    /// Geodetic longitude, radians.
    pub longitude: f64,
    /// Height above the ellipsoid, metres.
    pub height: f64,
    /// Rows are the local east/north/up unit vectors expressed in ECEF.
    local_rotation: Mat3,
}

impl Position {
    /// Build from ECEF Cartesian coordinates, metres. Geodetic latitude and
    /// height are recovered via Bowring's iterative method.
    pub fn from_ecef(x: f64, y: f64, z: f64) -> Self {
        let (latitude, longitude, height) = ecef_to_geodetic_bowring(x, y, z);
        let local_rotation = geodetic_rotation_matrix(latitude, longitude);
        Self {
            x,
            y,
            z,
            latitude,
            longitude,
            height,
            local_rotation,
        }
    }

    /// Rotate an ECEF-frame direction vector into the station's local
    /// East/North/Up frame.
    pub fn ecef_to_local(&self, ecef_direction: [f64; 3]) -> [f64; 3] {
        self.local_rotation.mul_vec(ecef_direction)
    }

    /// Vector difference to another station's ECEF position (,
    /// baseline-length vectors).
    pub fn vector_to(&self, other: &Position) -> [f64; 3] {
        [other.x - self.x, other.y - self.y, other.z - self.z]
    }

    /// Euclidean distance to another station, metres.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let d = self.vector_to(other);
        (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
    }
}

/// Bowring's iterative ECEF→geodetic conversion (WGS84), converges to
/// machine precision in a handful of iterations for terrestrial heights.
fn ecef_to_geodetic_bowring(x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let p = (x * x + y * y).sqrt();
    let longitude = y.atan2(x);

    let mut lat = z.atan2(p * (1.0 - e2));
    let mut height = 0.0;
    for _ in 0..6 {
        let sin_lat = lat.sin();
        let n = WGS84_A / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        height = p / lat.cos() - n;
        lat = z.atan2(p * (1.0 - e2 * n / (n + height)));
    }

    (lat, longitude, height)
}

/// The rows of the returned matrix are the East, North, and Up unit vectors
/// of the local topocentric frame, expressed in ECEF (:
/// "precomputed geodetic→local rotation (3x3)").
fn geodetic_rotation_matrix(latitude: f64, longitude: f64) -> Mat3 {
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let (sin_lon, cos_lon) = longitude.sin_cos();

    let east = [-sin_lon, cos_lon, 0.0];
    let north = [-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat];
    let up = [cos_lat * cos_lon, cos_lat * sin_lon, sin_lat];

    Mat3([east, north, up])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn equatorial_point_has_zero_latitude() {
        // A point on the equator, at zero height.
        let pos = Position::from_ecef(WGS84_A, 0.0, 0.0);
        assert_abs_diff_eq!(pos.latitude, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(pos.height, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn up_vector_is_roughly_radial_at_equator() {
        let pos = Position::from_ecef(WGS84_A + 100.0, 0.0, 0.0);
        let up = pos.ecef_to_local([1.0, 0.0, 0.0]);
        // The "up" component (index 2 of the local frame) should dominate.
        assert!(up[2] > 0.99);
    }
}
