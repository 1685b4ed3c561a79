// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for cycle bookkeeping and state persistence.

use chrono::NaiveDate;
use thiserror::Error;

/// Precondition failures raised by the cycle manager.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    /// The transaction date falls outside `[start, end]` of the current cycle.
    #[error(
        "transaction date is outside the current pay cycle: {date} is not within {start}..{end}"
    )]
    OutOfCycle {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Rollover was requested on or before the cycle's end date.
    #[error("the current pay cycle runs until {end}; it cannot be rolled over on {today}")]
    PrematureRollover { today: NaiveDate, end: NaiveDate },

    /// Closed cycles are read-only history.
    #[error("the pay cycle {start}..{end} is closed")]
    ClosedCycle { start: NaiveDate, end: NaiveDate },

    #[error("invalid anchor day {0}, expected 1-31")]
    InvalidAnchorDay(u32),

    #[error("invalid cycle length {0}, expected at least one day")]
    InvalidCycleLength(u32),

    #[error("no pay cycle can be computed around {0}: date out of range")]
    DateOutOfRange(NaiveDate),

    /// A running total no longer fits in a decimal.
    #[error("amounts in {0} exceed the supported range")]
    AmountOverflow(String),
}

/// Failures raised by a [`crate::db::StateStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store holds data that cannot be interpreted. Never recovered from
    /// by resetting: the user has to restore a backup or reinitialize.
    #[error(
        "stored state is corrupt: {0}. Restore the data file from a backup or move it aside and run `paycycle init`"
    )]
    Corrupt(String),

    #[error("a pay cycle is already set up in this store")]
    AlreadyInitialized,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt(_))
    }
}
