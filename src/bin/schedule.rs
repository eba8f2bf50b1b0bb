// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Thin entry point: load a [`vlbi_sched::Config`], validate it, and report
//! it's ready for a scheduler run. Catalog ingestion (stations, sources,
//! equipment, horizon masks) and `.vex`/`.skd` writing are out of scope
//! and are left to an external collaborator that would construct
//! the `Network`/`SourceList`/`TimeSystem` this binary's `Config` is meant
//! to accompany.

use clap::Parser;
use log::info;

use vlbi_sched::cli::ScheduleArgs;

fn main() {
    let args = ScheduleArgs::parse();

    if let Err(e) = vlbi_sched::logging::setup_logging(args.verbosity) {
        eprintln!("failed to initialise logging: {e}");
        std::process::exit(1);
    }

    match args.load_config() {
        Ok(config) => {
            info!("loaded session configuration from {}", args.config.display());
            info!("alignment anchor: {:?}", config.alignment_anchor);
            info!("max scans: {}", config.max_number_of_scans);
            info!(
                "config validated; station/source catalogs are ingested by an external collaborator \
                 and are not read by this binary"
            );
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
