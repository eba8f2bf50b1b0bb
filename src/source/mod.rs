// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The source model (`Source`).

pub mod flux;
pub mod parameters;

use std::collections::HashMap;

use crate::coord::RADec;
use crate::event::EventList;
use crate::id::SourceId;
use crate::time::SessionSeconds;

pub use flux::FluxModel;
pub use parameters::SourceParameters;

/// A fixed-position extragalactic radio source or a moving target with an
/// ephemeris (`Source`: "variant `{quasar, satellite}`").
#[derive(Clone, Debug)]
pub enum SourceKind {
    /// A quasar at a fixed position on the celestial sphere.
    Quasar { radec: RADec },
    /// A near-Earth object whose apparent position is sampled on a coarse
    /// grid and linearly interpolated (mirrors
    /// [`crate::astro::AstronomicalParameters`]'s sampling strategy, since
    /// both are smooth functions of session time sampled at a fixed step).
    Satellite { ephemeris: Vec<(SessionSeconds, RADec)> },
}

/// A scheduling source (`Source`).
#[derive(Clone, Debug)]
pub struct Source {
    pub id: SourceId,
    pub name: String,
    pub kind: SourceKind,
    /// Per-band flux model.
    pub flux: HashMap<String, FluxModel>,
    pub parameters: SourceParameters,
    pub events: EventList<SourceParameters>,

    /// Session times at which this source was last observed, most recent
    /// last (`minRepeat` bookkeeping).
    last_scan_times: Vec<SessionSeconds>,
    num_scans_scheduled: u32,
}

impl Source {
    pub fn new(
        id: SourceId,
        name: impl Into<String>,
        kind: SourceKind,
        flux: HashMap<String, FluxModel>,
        parameters: SourceParameters,
        events: EventList<SourceParameters>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            flux,
            parameters,
            events,
            last_scan_times: Vec::new(),
            num_scans_scheduled: 0,
        }
    }

    /// `getSourceInCrs`: the apparent celestial position at
    /// `time`, for quasars a constant and for satellites a linear
    /// interpolation between the two bracketing ephemeris samples.
    pub fn position_at(&self, time: SessionSeconds) -> RADec {
        match &self.kind {
            SourceKind::Quasar { radec } => *radec,
            SourceKind::Satellite { ephemeris } => interpolate_ephemeris(ephemeris, time),
        }
    }

    /// Whether the flux model for `band` needs projected `(u, v)` rather
    /// than elevation/distance.
    pub fn needs_uv(&self, band: &str) -> bool {
        self.flux.get(band).map(|f| f.needs_uv()).unwrap_or(false)
    }

    pub fn flux_model(&self, band: &str) -> Option<&FluxModel> {
        self.flux.get(band)
    }

    /// Whether scheduling another scan right now would violate `minRepeat`:
    /// the most recent scan must be at least `min_repeat_s` in the past.
    pub fn satisfies_min_repeat(&self, time: SessionSeconds) -> bool {
        self.seconds_since_last_scan(time)
            .map(|elapsed| elapsed >= self.parameters.min_repeat_s)
            .unwrap_or(true)
    }

    /// Seconds elapsed since the most recent committed scan, or `None` if
    /// this source has never been observed.
    pub fn seconds_since_last_scan(&self, time: SessionSeconds) -> Option<u32> {
        self.last_scan_times.last().map(|&last| time.saturating_sub(last))
    }

    pub fn has_scan_quota_remaining(&self) -> bool {
        self.num_scans_scheduled < self.parameters.max_number_of_scans
    }

    /// Scans scheduled so far, used by the `averageSources` scoring term.
    pub fn num_scans_scheduled(&self) -> u32 {
        self.num_scans_scheduled
    }

    /// Commit a scan of this source ending at `time` (`Update`).
    pub fn commit(&mut self, time: SessionSeconds) {
        self.last_scan_times.push(time);
        self.num_scans_scheduled += 1;
    }
}

/// Linear interpolation between the two ephemeris samples bracketing `time`;
/// clamps to the nearest endpoint outside the sampled range.
fn interpolate_ephemeris(samples: &[(SessionSeconds, RADec)], time: SessionSeconds) -> RADec {
    if samples.is_empty() {
        return RADec::new(0.0, 0.0);
    }
    if time <= samples[0].0 {
        return samples[0].1;
    }
    if time >= samples[samples.len() - 1].0 {
        return samples[samples.len() - 1].1;
    }
    for w in samples.windows(2) {
        let (t0, p0) = w[0];
        let (t1, p1) = w[1];
        if time >= t0 && time <= t1 {
            let frac = (time - t0) as f64 / (t1 - t0) as f64;
            return RADec::new(p0.ra + (p1.ra - p0.ra) * frac, p0.dec + (p1.dec - p0.dec) * frac);
        }
    }
    samples[samples.len() - 1].1
}
