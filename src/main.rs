// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::Path;

use salesreport::models::Section;
use salesreport::storage::keys;
use salesreport::store::RecordStore;
use salesreport::{cli, commands, config, logging, utils};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let cfg = config::load_app_configuration(matches.get_one::<String>("config").map(Path::new))?;
    logging::init(&cfg.log_level);

    let year = match matches.get_one::<String>("year") {
        Some(y) => utils::parse_budget_year(y)?,
        None => utils::budget_year_of(chrono::Local::now().date_naive()),
    };
    let persistence = cfg.open_persistence()?;
    let mut store = RecordStore::open(persistence, year);

    match matches.subcommand() {
        Some(("init", _)) => {
            for key in [keys::PEOPLE, keys::SERVICES, keys::GOALS] {
                store.persistence().seed_if_missing(key)?;
            }
            println!(
                "Data directory ready at {} (budget year {})",
                store.persistence().storage().location().display(),
                store.year()
            );
        }
        Some(("avs", sub)) => commands::avs::handle(&mut store, sub)?,
        Some(("insurance", sub)) => {
            commands::counts::handle(&mut store, Section::InsuranceAgreements, sub)?
        }
        Some(("tv", sub)) => commands::counts::handle(&mut store, Section::PrecalibratedTvs, sub)?,
        Some(("repair", sub)) => commands::counts::handle(&mut store, Section::RepairTickets, sub)?,
        Some(("qi", sub)) => commands::quality::handle(&mut store, sub)?,
        Some(("people", sub)) => commands::people::handle(&mut store, sub)?,
        Some(("services", sub)) => commands::services::handle(&mut store, sub)?,
        Some(("goals", sub)) => commands::goals::handle(&mut store, sub)?,
        Some(("year", sub)) => commands::years::handle(&mut store, sub)?,
        Some(("report", sub)) => commands::reports::handle(&store, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&store, sub)?,
        Some(("data", sub)) => commands::data::handle(&mut store, sub)?,
        Some(("settings", sub)) => commands::settings::handle(&mut store, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&store, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
