// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Argument definitions for the `schedule` binary (the CLI is an
//! external collaborator; this is deliberately thin — it loads a `Config`
//! and reports what the engine would do with it, not a catalog ingestor).

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, ConfigError};

/// Run a VLBI scheduling session from a configuration file.
///
/// Catalog ingestion (stations, sources, equipment, horizon masks) and
/// `.vex`/`.skd` output writing are external collaborators and are
/// not implemented by this binary; it exists to load and validate a
/// `Config` and hand it to the scheduler constructor.
#[derive(Parser, Debug)]
#[clap(name = "schedule", author, about, version)]
pub struct ScheduleArgs {
    /// Path to the session configuration file (YAML or TOML, detected by
    /// extension).
    #[clap(short, long, parse(from_os_str))]
    pub config: PathBuf,

    /// The verbosity of the program. The default is to print high-level
    /// information.
    #[clap(short, long, parse(from_occurrences))]
    pub verbosity: u8,
}

impl ScheduleArgs {
    /// Read and validate the config file named on the command line.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(&self.config).map_err(|source| ConfigError::Io {
            file: self.config.display().to_string(),
            source,
        })?;

        match self.config.extension().and_then(|e| e.to_str()) {
            Some("toml") => Config::from_toml_str(&contents),
            _ => Config::from_yaml_str(&contents),
        }
    }
}
