// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Local;
use std::path::PathBuf;

use paycycle::models::TransactionKind;
use paycycle::{cli, commands, db, utils};

fn main() -> Result<()> {
    utils::init_tracing();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let path = match matches.get_one::<String>("db") {
        Some(p) => PathBuf::from(p),
        None => db::db_path()?,
    };
    let mut store = db::open_store(&path);
    let store = store.as_mut();
    let today = match matches.get_one::<String>("today") {
        Some(s) => utils::parse_date(s)?,
        None => Local::now().date_naive(),
    };
    tracing::debug!(store = %path.display(), %today, "starting");

    if !matches!(
        matches.subcommand_name(),
        None | Some("init" | "rollover" | "catch-up")
    ) {
        if let Some(notice) = commands::startup_notice(store, today) {
            eprintln!("{}", notice);
        }
    }

    match matches.subcommand() {
        Some(("init", sub)) => commands::init::handle(store, today, sub)?,
        Some(("expense", sub)) => {
            commands::transactions::add(store, today, TransactionKind::Expense, sub)?;
        }
        Some(("income", sub)) => {
            commands::transactions::add(store, today, TransactionKind::Income, sub)?;
        }
        Some(("tx", sub)) => commands::transactions::handle(store, sub)?,
        Some(("status", sub)) => commands::reports::status(store, today, sub)?,
        Some(("breakdown", sub)) => commands::reports::breakdown(store, sub)?,
        Some(("history", sub)) => commands::reports::history(store, sub)?,
        Some(("rollover", _)) => {
            commands::cycles::rollover_once(store, today)?;
        }
        Some(("catch-up", _)) => {
            commands::cycles::catch_up(store, today)?;
        }
        Some(("export", sub)) => commands::exporter::handle(store, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(store)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
