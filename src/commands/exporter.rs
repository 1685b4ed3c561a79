// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::load_required;
use crate::db::StateStore;
use anyhow::{Result, bail};
use serde_json::json;

pub fn handle(store: &dyn StateStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(store, sub),
        _ => Ok(()),
    }
}

fn export_transactions(store: &dyn StateStore, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let state = load_required(store)?;
    let mut rows = Vec::new();
    for cycle in state.cycles() {
        for t in cycle.transactions() {
            rows.push((
                cycle.start_date().to_string(),
                cycle.end_date().to_string(),
                t.date.to_string(),
                t.kind.as_str(),
                t.signed_amount().to_string(),
                t.category.clone(),
                t.description.clone(),
            ));
        }
    }

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "cycle_start",
                "cycle_end",
                "date",
                "kind",
                "amount",
                "category",
                "description",
            ])?;
            for (cs, ce, d, k, amt, cat, desc) in rows {
                wtr.write_record([
                    cs,
                    ce,
                    d,
                    k.to_string(),
                    amt,
                    cat.unwrap_or_default(),
                    desc.unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<_> = rows
                .into_iter()
                .map(|(cs, ce, d, k, amt, cat, desc)| {
                    json!({
                        "cycle_start": cs, "cycle_end": ce, "date": d, "kind": k,
                        "amount": amt, "category": cat, "description": desc
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    println!("Exported transactions to {}", out);
    Ok(())
}
