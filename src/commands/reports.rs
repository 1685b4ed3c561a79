// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::load_required;
use crate::db::StateStore;
use crate::forecast::{category_breakdown, compute_forecast};
use crate::report::{
    breakdown_table, category_shares, history_rows, history_table, summary_table,
    transactions_table,
};
use crate::utils::maybe_print_json;
use anyhow::Result;
use chrono::NaiveDate;

pub fn status(store: &dyn StateStore, today: NaiveDate, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let state = load_required(store)?;
    let forecast = compute_forecast(&state.current, today)?;
    if !maybe_print_json(json_flag, jsonl_flag, &forecast)? {
        println!("{}", summary_table(&forecast));
        if !state.current.transactions().is_empty() {
            println!("{}", transactions_table(state.current.transactions()));
        }
    }
    Ok(())
}

pub fn breakdown(store: &dyn StateStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let state = load_required(store)?;
    let shares = category_shares(&category_breakdown(&state.current)?)?;
    if !maybe_print_json(json_flag, jsonl_flag, &shares)? {
        if shares.is_empty() {
            println!("No expenses recorded in this cycle yet.");
        } else {
            println!("{}", breakdown_table(&shares));
        }
    }
    Ok(())
}

pub fn history(store: &dyn StateStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let state = load_required(store)?;
    let rows = history_rows(&state.history)?;
    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        if rows.is_empty() {
            println!("No closed cycles yet.");
        } else {
            println!("{}", history_table(&rows));
        }
    }
    Ok(())
}
