// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A placeholder for a station's post-hoc observing log. Only the shape of
//! a parsed log is recorded here, so a future log parser has somewhere to
//! put its output and the scheduler's committed scans have something to be
//! diffed against; no parser is implemented.

use crate::id::StationId;
use crate::time::SessionSeconds;

/// One source-acquisition record as it would appear in a station's
/// observing log.
#[derive(Clone, Debug)]
pub struct StationLogEntry {
    pub source_name: String,
    pub start: SessionSeconds,
    pub end: SessionSeconds,
}

/// A single station's parsed observing log.
#[derive(Clone, Debug)]
pub struct StationLog {
    pub station_id: StationId,
    pub entries: Vec<StationLogEntry>,
}
