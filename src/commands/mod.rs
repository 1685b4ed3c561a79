// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cycles;
pub mod doctor;
pub mod exporter;
pub mod init;
pub mod reports;
pub mod transactions;

use anyhow::{Result, anyhow};

use crate::db::StateStore;
use crate::models::State;

/// Loads the stored state, treating an empty store as "run init first".
pub fn load_required(store: &dyn StateStore) -> Result<State> {
    store.load_state()?.ok_or_else(|| {
        anyhow!(
            "No pay cycle set up in {}; run `paycycle init --balance <AMOUNT> --anchor-day <DAY>` first",
            store.location().display()
        )
    })
}

/// Notice shown before a command runs when the stored cycle has already
/// ended. Load failures are left for the command itself to report.
pub fn startup_notice(store: &dyn StateStore, today: chrono::NaiveDate) -> Option<String> {
    match store.load_state() {
        Ok(Some(state)) => ended_notice(&state, today),
        _ => None,
    }
}

fn ended_notice(state: &State, today: chrono::NaiveDate) -> Option<String> {
    (today > state.current.end_date()).then(|| {
        format!(
            "Your pay cycle ended on {}. Run `paycycle rollover` (or `paycycle catch-up` if several cycles have passed).",
            state.current.end_date()
        )
    })
}
