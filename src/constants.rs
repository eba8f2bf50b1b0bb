// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. The engine should do as many
calculations as possible in double precision before converting to a lower
precision, if it is ever required.
 */

pub use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Radians per degree.
pub const DEG2RAD: f64 = PI / 180.0;

/// Degrees per radian.
pub const RAD2DEG: f64 = 180.0 / PI;

/// Minimum duration of any observation, in whole seconds (Scan invariant).
pub const MIN_OBSERVATION_DURATION_S: u32 = 1;

/// Hard cap on the temporal separation between the two scans of a subnetting
/// pair (scenario 5 in ).
pub const SUBNETTING_MAX_TIME_SEPARATION_S: u32 = 600;

/// A station that has just gone from unavailable to available incurs no
/// slew/field-system cost; bookkeeping resets `firstScan` .
pub const DEFAULT_SYSTEM_DELAY_S: u32 = 0;

/// Resolution (radians) at which the `sin`/`cos`/`acos` lookup tables are
/// sampled : "nearest thousandth of a radian".
pub const TRIG_TABLE_STEP_RAD: f64 = 0.001;

/// Resolution (degrees) of the angular-distance lookup table's az/el grid
/// : whole-degree el, one-degree quantisation in delta-az/delta-el.
pub const ANGULAR_DISTANCE_TABLE_STEP_DEG: i32 = 1;

/// Typical astronomical-parameter interpolation grid step, in seconds
/// ("typical step: minutes").
pub const DEFAULT_ASTRO_GRID_STEP_S: u32 = 60 * 5;

/// Fractional-second remainder above which mount control-loop margin adds an
/// extra second to a computed slew .
pub const SLEW_CEIL_MARGIN_THRESHOLD_S: f64 = 0.85;

/// Penalty factor applied to the score of a source observed within its
/// `minRepeat` window .
pub const RECENTLY_OBSERVED_SCORE_PENALTY: f64 = 0.01;

/// Bounded number of step-level retries before the driver aborts the session
/// (Infeasibility per step).
pub const MAX_STEP_RETRIES: u32 = 25;

/// Small time increment used to nudge the driver forward when a subcon comes
/// back empty and no event is imminent .
pub const DEFAULT_STEP_ADVANCE_S: u32 = 60;
