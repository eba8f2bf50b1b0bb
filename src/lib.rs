// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A greedy, subnetting-capable scheduling engine for VLBI observing
//! sessions: given a network of stations, a source catalog, and a
//! scoring configuration, produces a strictly time-ordered sequence of
//! scans for one session.

pub mod astro;
pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod event;
pub mod id;
pub mod logging;
pub mod network;
pub mod observation;
pub mod scan;
pub mod scheduler;
pub mod source;
pub mod station;
pub mod subcon;
pub mod time;

pub use config::Config;
pub use error::SchedulerError;
pub use id::IdRegistry;
pub use network::Network;
pub use scan::Scan;
pub use scheduler::Scheduler;
pub use source::Source;
pub use time::TimeSystem;
