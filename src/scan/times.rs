// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Per-station `ScanTimes` segments and alignment.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::id::StationId;
use crate::time::SessionSeconds;

/// The five cumulative timestamps per station (`ScanTimes`):
/// end-of-last-scan, end-of-field-system, end-of-slew, end-of-idle,
/// end-of-preob, end-of-observing.
#[derive(Clone, Copy, Debug, Default)]
pub struct StationSegments {
    pub end_last_scan: SessionSeconds,
    pub end_fs: SessionSeconds,
    pub end_slew: SessionSeconds,
    pub end_idle: SessionSeconds,
    pub end_preob: SessionSeconds,
    pub end_observing: SessionSeconds,
}

impl StationSegments {
    fn new(end_last_scan: SessionSeconds) -> Self {
        Self {
            end_last_scan,
            end_fs: end_last_scan,
            end_slew: end_last_scan,
            end_idle: end_last_scan,
            end_preob: end_last_scan,
            end_observing: end_last_scan,
        }
    }

    /// `end_last_scan <= end_fs <= end_slew <= end_idle <= end_preob <=
    /// end_observing` (invariant).
    pub fn is_monotonic(&self) -> bool {
        self.end_last_scan <= self.end_fs
            && self.end_fs <= self.end_slew
            && self.end_slew <= self.end_idle
            && self.end_idle <= self.end_preob
            && self.end_preob <= self.end_observing
    }
}

/// How per-station observing windows are reconciled into a single scan
/// (`AlignmentAnchor`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AlignmentAnchor {
    /// All stations share a common observing-start time = max over stations
    /// of `end_preob`; idle absorbs the slack between `end_slew` and start.
    Start,
    /// All stations share a common observing-end time = max of `end_obs`;
    /// idle fills before preob.
    End,
    /// Stations may start/end independently.
    Individual,
}

/// Per-station `ScanTimes` for one scan (`ScanTimes`).
#[derive(Clone, Debug)]
pub struct ScanTimes {
    segments: HashMap<StationId, StationSegments>,
    order: Vec<StationId>,
}

impl ScanTimes {
    /// Start a fresh, zeroed timeline for each given station, anchored at
    /// `end_last_scan = 0`. Callers normally set a real `end_last_scan`
    /// via [`Self::set_end_last_scan`] immediately after.
    pub fn new(stations: Vec<StationId>) -> Self {
        let segments = stations.iter().map(|&s| (s, StationSegments::new(0))).collect();
        Self {
            segments,
            order: stations,
        }
    }

    pub fn set_end_last_scan(&mut self, station_id: StationId, t: SessionSeconds) {
        if let Some(seg) = self.segments.get_mut(&station_id) {
            seg.end_last_scan = t;
            seg.end_fs = t;
            seg.end_slew = t;
            seg.end_idle = t;
            seg.end_preob = t;
            seg.end_observing = t;
        }
    }

    pub fn segments(&self, station_id: StationId) -> Option<&StationSegments> {
        self.segments.get(&station_id)
    }

    pub fn stations(&self) -> impl Iterator<Item = StationId> + '_ {
        self.order.iter().copied()
    }

    pub fn drop_station(&mut self, station_id: StationId) {
        self.segments.remove(&station_id);
        self.order.retain(|&s| s != station_id);
    }

    /// Insert a brand-new station into this scan's timeline, anchored at
    /// `end_last_scan` (Tagalong: "their insertion extends the
    /// scan's ScanTimes for that station only").
    pub fn insert_station(&mut self, station_id: StationId, end_last_scan: SessionSeconds) {
        if !self.segments.contains_key(&station_id) {
            self.order.push(station_id);
        }
        self.segments.insert(station_id, StationSegments::new(end_last_scan));
    }

    /// Append `(fs, slew, preob)` to a station's timeline (:
    /// "Adding `(fs, slew, preob)` to index i sets `end_fs=last+fs`,
    /// `end_slew=end_fs+slew`, `end_idle=end_slew`,
    /// `end_preob=end_idle+preob`, `end_obs=end_preob`"). Observing
    /// duration is set later via [`Self::set_observing_duration`].
    pub fn add_segment(&mut self, station_id: StationId, fs_s: u32, slew_s: u32, preob_s: u32) {
        if let Some(seg) = self.segments.get_mut(&station_id) {
            seg.end_fs = seg.end_last_scan + fs_s;
            seg.end_slew = seg.end_fs + slew_s;
            seg.end_idle = seg.end_slew;
            seg.end_preob = seg.end_idle + preob_s;
            seg.end_observing = seg.end_preob;
        }
    }

    pub fn set_observing_duration(&mut self, station_id: StationId, duration_s: u32) {
        if let Some(seg) = self.segments.get_mut(&station_id) {
            seg.end_observing = seg.end_preob + duration_s;
        }
    }

    /// `setPreobTime`: shrink `end_idle`/`end_preob` to fit a new
    /// preob length, taking the slack out of idle first. Returns `false`
    /// if the available idle is insufficient, i.e. the new preob would have
    /// to reach back before `end_slew`.
    pub fn set_preob_time(&mut self, station_id: StationId, preob_s: u32) -> bool {
        let Some(seg) = self.segments.get_mut(&station_id) else {
            return false;
        };
        let new_preob_end = seg.end_idle + preob_s;
        if seg.end_idle < seg.end_slew {
            return false;
        }
        seg.end_preob = new_preob_end;
        if seg.end_observing < seg.end_preob {
            seg.end_observing = seg.end_preob;
        }
        true
    }

    /// Apply an [`AlignmentAnchor`] across every station in this scan,
    /// given each station's *desired* (unaligned) observing duration.
    pub fn align(&mut self, anchor: AlignmentAnchor, desired_duration_s: &HashMap<StationId, u32>) {
        match anchor {
            AlignmentAnchor::Start => {
                let common_start = self
                    .order
                    .iter()
                    .filter_map(|s| self.segments.get(s).map(|seg| seg.end_preob))
                    .max()
                    .unwrap_or(0);
                for &station in &self.order {
                    if let Some(seg) = self.segments.get_mut(&station) {
                        seg.end_idle += common_start.saturating_sub(seg.end_preob);
                        seg.end_preob = common_start;
                        let dur = desired_duration_s.get(&station).copied().unwrap_or(0);
                        seg.end_observing = common_start + dur;
                    }
                }
            }
            AlignmentAnchor::End => {
                let common_end = self
                    .order
                    .iter()
                    .filter_map(|s| {
                        let seg = self.segments.get(s)?;
                        let dur = desired_duration_s.get(s).copied().unwrap_or(0);
                        Some(seg.end_preob + dur)
                    })
                    .max()
                    .unwrap_or(0);
                for &station in &self.order {
                    let Some(dur) = desired_duration_s.get(&station).copied() else {
                        continue;
                    };
                    if let Some(seg) = self.segments.get_mut(&station) {
                        let start = common_end.saturating_sub(dur);
                        seg.end_idle += start.saturating_sub(seg.end_preob);
                        seg.end_preob = start;
                        seg.end_observing = common_end;
                    }
                }
            }
            AlignmentAnchor::Individual => {
                let common_slew = self
                    .order
                    .iter()
                    .filter_map(|s| self.segments.get(s).map(|seg| seg.end_slew))
                    .max()
                    .unwrap_or(0);
                for &station in &self.order {
                    let Some(dur) = desired_duration_s.get(&station).copied() else {
                        continue;
                    };
                    if let Some(seg) = self.segments.get_mut(&station) {
                        let start = common_slew.max(seg.end_preob);
                        seg.end_idle += start.saturating_sub(seg.end_preob);
                        seg.end_preob = start;
                        seg.end_observing = start + dur;
                    }
                }
            }
        }
    }

    /// `updateAfterFillin`: a later fillin scan finished
    /// earlier than the slack this scan had reserved, so its stations' idle
    /// window shrinks to start right after the fillin scan ends.
    pub fn update_after_fillin(&mut self, station_id: StationId, fillin_end_s: SessionSeconds) {
        if let Some(seg) = self.segments.get_mut(&station_id) {
            if fillin_end_s > seg.end_slew && fillin_end_s < seg.end_preob {
                seg.end_idle = fillin_end_s;
            }
        }
    }

    /// True iff every station's segment chain is monotonic.
    pub fn all_monotonic(&self) -> bool {
        self.segments.values().all(|s| s.is_monotonic())
    }

    pub fn stations_set(&self) -> HashSet<StationId> {
        self.order.iter().copied().collect()
    }
}
