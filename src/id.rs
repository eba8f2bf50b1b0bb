// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Stable, monotonically increasing integer identifiers.

A per-class `static` counter is fine for a single-process, single-run
binary, but makes tests order-dependent and non-reproducible across runs in
the same process. Here every kind of identifier is minted from an explicit
[`IdRegistry`] held by the session, so ids are deterministic for a given
sequence of construction calls regardless of what ran before in the same
process.
*/

use std::fmt;

/// A stable, monotonically assigned integer id within one entity kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id<Kind> {
    value: u32,
    _kind: std::marker::PhantomData<Kind>,
}

impl<Kind> Id<Kind> {
    pub fn value(self) -> u32 {
        self.value
    }
}

impl<Kind> fmt::Display for Id<Kind> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Marker kinds. These are never instantiated; they just tag [`Id`].
pub mod kind {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Station;
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Baseline;
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Source;
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Scan;
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Observation;
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PointingVector;
}

pub type StationId = Id<kind::Station>;
pub type BaselineId = Id<kind::Baseline>;
pub type SourceId = Id<kind::Source>;
pub type ScanId = Id<kind::Scan>;
pub type ObservationId = Id<kind::Observation>;
pub type PointingVectorId = Id<kind::PointingVector>;

/// Per-kind monotonic counters, owned by the session.
#[derive(Debug, Default)]
pub struct IdRegistry {
    station: u32,
    baseline: u32,
    source: u32,
    scan: u32,
    observation: u32,
    pointing_vector: u32,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn next<Kind>(counter: &mut u32) -> Id<Kind> {
        let value = *counter;
        *counter += 1;
        Id {
            value,
            _kind: std::marker::PhantomData,
        }
    }

    pub fn next_station(&mut self) -> StationId {
        Self::next(&mut self.station)
    }

    pub fn next_baseline(&mut self) -> BaselineId {
        Self::next(&mut self.baseline)
    }

    pub fn next_source(&mut self) -> SourceId {
        Self::next(&mut self.source)
    }

    pub fn next_scan(&mut self) -> ScanId {
        Self::next(&mut self.scan)
    }

    pub fn next_observation(&mut self) -> ObservationId {
        Self::next(&mut self.observation)
    }

    pub fn next_pointing_vector(&mut self) -> PointingVectorId {
        Self::next(&mut self.pointing_vector)
    }
}
