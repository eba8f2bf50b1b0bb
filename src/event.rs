// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The event-driven parameter timeline (`Event`).

use crate::time::SessionSeconds;

/// `(time, smoothTransition, newParameters)` attached to a station, source,
/// or baseline (`Event`).
#[derive(Clone, Debug)]
pub struct Event<T> {
    pub time: SessionSeconds,
    pub smooth_transition: bool,
    pub new_parameters: T,
}

/// A sorted, per-entity event vector with a monotonically-advancing cursor.
/// Modelled here as direct ownership of the `Vec` for simplicity, since
/// nothing else needs to observe it.
#[derive(Clone, Debug, Default)]
pub struct EventList<T> {
    events: Vec<Event<T>>,
    cursor: usize,
}

impl<T: Clone> EventList<T> {
    /// `events` must already be sorted by time (invariant).
    pub fn new(events: Vec<Event<T>>) -> Self {
        debug_assert!(events.windows(2).all(|w| w[0].time <= w[1].time));
        Self { events, cursor: 0 }
    }

    /// `checkForNewEvent`: advance the cursor while
    /// `event.time <= time`, OR-ing `hard_break` with each event's
    /// `!smooth_transition`. Returns the last applied parameters, if any
    /// fired.
    pub fn check_for_new_event(&mut self, time: SessionSeconds, hard_break: &mut bool) -> Option<T> {
        let mut latest = None;
        while self.cursor < self.events.len() && self.events[self.cursor].time <= time {
            let ev = &self.events[self.cursor];
            *hard_break |= !ev.smooth_transition;
            latest = Some(ev.new_parameters.clone());
            self.cursor += 1;
        }
        latest
    }

    /// The time of the next pending event, if any remain.
    pub fn next_event_time(&self) -> Option<SessionSeconds> {
        self.events.get(self.cursor).map(|e| e.time)
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.events.len()
    }
}
