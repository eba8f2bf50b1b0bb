// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all scheduler-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use crate::{config::ConfigError, scheduler::SchedulerLoopError, subcon::SubconError};

/// The *only* publicly visible error from this crate.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// An error encountered while validating or deserialising the session
    /// configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An error encountered while the driver is stepping through the
    /// session; not recoverable locally or per-step.
    #[error("scheduler driver error: {0}")]
    Driver(#[from] SchedulerLoopError),

    /// An error surfaced from subcon construction that escaped local
    /// per-candidate recovery.
    #[error("subcon error: {0}")]
    Subcon(#[from] SubconError),

    /// A generic error that can't be clarified further, e.g. IO.
    #[error("{0}")]
    Generic(String),
}

impl From<std::io::Error> for SchedulerError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
