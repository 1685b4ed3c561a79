// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::load_required;
use crate::cycle::{roll_forward, rollover};
use crate::db::StateStore;
use crate::error::CycleError;
use crate::models::Cycle;
use crate::report::{history_rows, history_table};
use crate::utils::fmt_money;
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn closing_message(closed: &Cycle, closing: Decimal) -> String {
    let saved = closing
        .checked_sub(closed.opening_balance())
        .unwrap_or(Decimal::ZERO);
    let mut msg = format!(
        "Closed cycle {} to {} with balance {}",
        closed.start_date(),
        closed.end_date(),
        fmt_money(&closing)
    );
    if saved > Decimal::ZERO {
        msg.push_str(&format!(" (saved {} this cycle)", fmt_money(&saved)));
    }
    msg
}

/// Closes exactly one cycle. Returns `false` when the cycle has not ended yet,
/// which is reported but not treated as a failure.
pub fn rollover_once(store: &mut dyn StateStore, today: NaiveDate) -> Result<bool> {
    let mut state = load_required(store)?;
    let step = match rollover(&state.current, today) {
        Ok(step) => step,
        Err(e @ CycleError::PrematureRollover { .. }) => {
            println!("Nothing to roll over: {}", e);
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };
    println!("{}", closing_message(&step.closed, step.closing_balance()));
    state.history.push(step.closed);
    state.current = step.next;
    store.save_state(&state)?;
    println!(
        "Next cycle: {} to {}, opening balance {}",
        state.current.start_date(),
        state.current.end_date(),
        fmt_money(&state.current.opening_balance())
    );
    if today > state.current.end_date() {
        println!("This cycle has ended too; run `paycycle rollover` again or `paycycle catch-up`.");
    }
    Ok(true)
}

/// Rolls over every ended cycle in sequence. Returns how many were closed.
pub fn catch_up(store: &mut dyn StateStore, today: NaiveDate) -> Result<usize> {
    let mut state = load_required(store)?;
    let forward = roll_forward(&state.current, today)?;
    if forward.closed.is_empty() {
        println!(
            "Current cycle {} to {} is still running.",
            state.current.start_date(),
            state.current.end_date()
        );
        return Ok(0);
    }
    let closed = forward.closed.len();
    println!("{}", history_table(&history_rows(&forward.closed)?));
    state.history.extend(forward.closed);
    state.current = forward.current;
    store.save_state(&state)?;
    println!(
        "Closed {} cycle(s). Current cycle: {} to {}, opening balance {}",
        closed,
        state.current.start_date(),
        state.current.end_date(),
        fmt_money(&state.current.opening_balance())
    );
    Ok(closed)
}
