// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::load_required;
use crate::cycle::assign_transaction;
use crate::db::StateStore;
use crate::error::CycleError;
use crate::models::{Transaction, TransactionKind};
use crate::report::transactions_table;
use crate::utils::{fmt_money, maybe_print_json, parse_amount, parse_date};
use anyhow::{Result, bail};
use chrono::NaiveDate;

/// Handles `tx <sub>`.
pub fn handle(store: &dyn StateStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(store, sub)?,
        _ => {}
    }
    Ok(())
}

/// Handles `expense` and `income`.
pub fn add(
    store: &mut dyn StateStore,
    today: NaiveDate,
    kind: TransactionKind,
    sub: &clap::ArgMatches,
) -> Result<Transaction> {
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => today,
    };
    let category = sub
        .get_one::<String>("category")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let description = sub
        .get_one::<String>("desc")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let mut tx = match (kind, category) {
        (TransactionKind::Expense, Some(cat)) => Transaction::expense(date, amount, cat),
        (TransactionKind::Expense, None) => bail!("A category is required for expenses"),
        (TransactionKind::Income, Some(cat)) => Transaction::income(date, amount).with_category(cat),
        (TransactionKind::Income, None) => Transaction::income(date, amount),
    };
    if let Some(d) = description {
        tx = tx.with_description(d);
    }

    let mut state = load_required(store)?;
    let updated = match assign_transaction(tx.clone(), &state.current) {
        Ok(c) => c,
        Err(e) => {
            if let CycleError::OutOfCycle { date, end, .. } = &e {
                if date > end {
                    eprintln!(
                        "hint: the current cycle ended on {}; run `paycycle rollover` first",
                        end
                    );
                }
            }
            return Err(e.into());
        }
    };
    state.current = updated;
    store.save_state(&state)?;
    println!(
        "Recorded {} of {} on {}{}",
        kind,
        fmt_money(&tx.amount),
        tx.date,
        tx.category
            .as_deref()
            .map(|c| format!(" ({})", c))
            .unwrap_or_default()
    );
    Ok(tx)
}

/// Transactions of the current cycle in insertion order.
pub fn query_rows(store: &dyn StateStore) -> Result<Vec<Transaction>> {
    let state = load_required(store)?;
    Ok(state.current.transactions().to_vec())
}

fn list(store: &dyn StateStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let state = load_required(store)?;
    let data = state.current.transactions();
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!(
            "Cycle {} to {}",
            state.current.start_date(),
            state.current.end_date()
        );
        println!("{}", transactions_table(data));
    }
    Ok(())
}
