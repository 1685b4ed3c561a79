// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Burn rate, runway, and spend distribution for a single cycle.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::error::CycleError;
use crate::models::{Cycle, Forecast, Runway};

/// Whole days the balance lasts when `total_expense` is spread over
/// `elapsed_days`. Computed as one division so the floor is not thrown off
/// by a rounded velocity.
fn runway(balance: Decimal, total_expense: Decimal, elapsed_days: i64) -> Runway {
    if total_expense.is_zero() {
        return Runway::Unbounded;
    }
    if balance <= Decimal::ZERO {
        return Runway::Days(0);
    }
    let days = balance
        .checked_mul(Decimal::from(elapsed_days))
        .and_then(|scaled| scaled.checked_div(total_expense))
        .and_then(|d| d.floor().to_i64())
        .unwrap_or(i64::MAX);
    Runway::Days(days)
}

/// Forecast for `cycle` as of `today`.
///
/// `elapsed_days` counts from the cycle start to `today` and is at least 1.
/// `days_remaining` counts the days after `today` up to the end date.
pub fn compute_forecast(cycle: &Cycle, today: NaiveDate) -> Result<Forecast, CycleError> {
    let elapsed_days = (today - cycle.start_date()).num_days().max(1);
    let days_remaining = (cycle.end_date() - today).num_days().max(0);
    let totals = cycle.totals()?;
    let daily_spend_velocity = totals.expense / Decimal::from(elapsed_days);
    let runway = runway(totals.balance, totals.expense, elapsed_days);
    debug!(
        %today,
        elapsed_days,
        balance = %totals.balance,
        velocity = %daily_spend_velocity,
        %runway,
        "computed forecast"
    );
    Ok(Forecast {
        as_of: today,
        start_date: cycle.start_date(),
        end_date: cycle.end_date(),
        elapsed_days,
        days_remaining,
        opening_balance: cycle.opening_balance(),
        total_income: totals.income,
        total_expense: totals.expense,
        current_balance: totals.balance,
        daily_spend_velocity,
        runway,
    })
}

/// Total expense per category. Income is ignored and categories with no
/// spending in the cycle do not appear.
pub fn category_breakdown(cycle: &Cycle) -> Result<BTreeMap<String, Decimal>, CycleError> {
    let mut out: BTreeMap<String, Decimal> = BTreeMap::new();
    for t in cycle.transactions().iter().filter(|t| t.is_expense()) {
        let spent = out
            .entry(t.category_label().to_string())
            .or_insert(Decimal::ZERO);
        *spent = spent.checked_add(t.amount).ok_or_else(|| {
            CycleError::AmountOverflow(format!("category '{}'", t.category_label()))
        })?;
    }
    Ok(out)
}
