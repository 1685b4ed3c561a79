// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cycle::start_cycle;
use crate::db::StateStore;
use crate::error::StoreError;
use crate::models::{CyclePolicy, State};
use crate::utils::{fmt_money, parse_balance, parse_date};
use anyhow::{Result, bail};
use chrono::NaiveDate;

pub fn handle(store: &mut dyn StateStore, today: NaiveDate, sub: &clap::ArgMatches) -> Result<()> {
    let balance = parse_balance(sub.get_one::<String>("balance").unwrap())?;
    let start = match sub.get_one::<String>("start") {
        Some(s) => parse_date(s)?,
        None => today,
    };
    let policy = if let Some(day) = sub.get_one::<u32>("anchor-day") {
        CyclePolicy::Monthly { anchor_day: *day }
    } else if let Some(days) = sub.get_one::<u32>("every") {
        CyclePolicy::Every {
            days: *days,
            anchor: start,
        }
    } else {
        bail!("Either --anchor-day or --every is required");
    };

    let cycle = start_cycle(policy, balance, start)?;
    match store.initialize(&State::new(cycle.clone())) {
        Ok(()) => {}
        Err(StoreError::AlreadyInitialized) => bail!(
            "A pay cycle is already set up in {}; use `paycycle rollover` to move to the next one",
            store.location().display()
        ),
        Err(e) => return Err(e.into()),
    }
    println!(
        "New cycle started: {} to {} with opening balance {}",
        cycle.start_date(),
        cycle.end_date(),
        fmt_money(&cycle.opening_balance())
    );
    Ok(())
}
