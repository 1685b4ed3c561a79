// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cycle boundaries, transaction attribution, and rollover.
//!
//! Everything here is a pure function of the state handed in. Callers get a
//! new [`Cycle`] back and decide whether to persist it.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::CycleError;
use crate::models::{Cycle, CyclePolicy, State, Transaction};

fn last_day_of_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
    }
}

/// The cycle boundary contributed by a month, counted as `year * 12 + month0`.
///
/// That is the anchor day itself, or the 1st of the following month when the
/// month is too short to have it.
fn month_boundary(anchor_day: u32, month_index: i32) -> Option<NaiveDate> {
    let year = month_index.div_euclid(12);
    let month = month_index.rem_euclid(12) as u32 + 1;
    let last = last_day_of_month(year, month);
    if anchor_day <= last {
        NaiveDate::from_ymd_opt(year, month, anchor_day)
    } else {
        NaiveDate::from_ymd_opt(year, month, last)?.succ_opt()
    }
}

/// Start and end (both inclusive) of the monthly cycle containing `reference_date`.
///
/// A cycle starts on `anchor_day` and ends the day before the next month's
/// anchor. In a month shorter than `anchor_day` the cycle ends on that
/// month's last day and the next one starts on the 1st.
pub fn compute_cycle_bounds(
    anchor_day: u32,
    reference_date: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), CycleError> {
    if !(1..=31).contains(&anchor_day) {
        return Err(CycleError::InvalidAnchorDay(anchor_day));
    }
    let out_of_range = || CycleError::DateOutOfRange(reference_date);
    let here = reference_date.year() * 12 + reference_date.month0() as i32;

    // Boundaries grow strictly month over month. The one from two months back
    // is never after the reference date and the one from next month always is.
    let mut start = None;
    let mut next = None;
    for idx in (here - 2)..=(here + 1) {
        let boundary = month_boundary(anchor_day, idx).ok_or_else(out_of_range)?;
        if boundary <= reference_date {
            start = Some(boundary);
        } else if next.is_none() {
            next = Some(boundary);
        }
    }
    let (Some(start), Some(next)) = (start, next) else {
        return Err(out_of_range());
    };
    let end = next.pred_opt().ok_or_else(out_of_range)?;
    debug!(anchor_day, %reference_date, %start, %end, "monthly cycle bounds");
    Ok((start, end))
}

fn fixed_cycle_bounds(
    days: u32,
    anchor: NaiveDate,
    reference_date: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), CycleError> {
    if days == 0 {
        return Err(CycleError::InvalidCycleLength(days));
    }
    let len = i64::from(days);
    let k = (reference_date - anchor).num_days().div_euclid(len);
    let start = anchor
        .checked_add_signed(Duration::days(k * len))
        .ok_or(CycleError::DateOutOfRange(reference_date))?;
    let end = start
        .checked_add_signed(Duration::days(len - 1))
        .ok_or(CycleError::DateOutOfRange(reference_date))?;
    Ok((start, end))
}

impl CyclePolicy {
    pub fn validate(&self) -> Result<(), CycleError> {
        match *self {
            Self::Monthly { anchor_day } if !(1..=31).contains(&anchor_day) => {
                Err(CycleError::InvalidAnchorDay(anchor_day))
            }
            Self::Every { days: 0, .. } => Err(CycleError::InvalidCycleLength(0)),
            _ => Ok(()),
        }
    }

    /// Bounds of the cycle containing `reference_date` under this policy.
    pub fn bounds(&self, reference_date: NaiveDate) -> Result<(NaiveDate, NaiveDate), CycleError> {
        match *self {
            Self::Monthly { anchor_day } => compute_cycle_bounds(anchor_day, reference_date),
            Self::Every { days, anchor } => fixed_cycle_bounds(days, anchor, reference_date),
        }
    }
}

/// First cycle of a fresh store: the one containing `reference_date`.
pub fn start_cycle(
    policy: CyclePolicy,
    opening_balance: Decimal,
    reference_date: NaiveDate,
) -> Result<Cycle, CycleError> {
    policy.validate()?;
    let (start, end) = policy.bounds(reference_date)?;
    info!(%policy, %start, %end, %opening_balance, "starting first pay cycle");
    Ok(Cycle::open(policy, start, end, opening_balance))
}

/// Returns `current` with `transaction` appended.
///
/// Strict: a date outside the cycle is rejected, never re-bucketed, and the
/// input cycle is left untouched. So is a transaction whose amount would
/// push the cycle totals out of the decimal range.
pub fn assign_transaction(transaction: Transaction, current: &Cycle) -> Result<Cycle, CycleError> {
    if current.is_closed() {
        return Err(CycleError::ClosedCycle {
            start: current.start_date(),
            end: current.end_date(),
        });
    }
    if !current.contains(transaction.date) {
        return Err(CycleError::OutOfCycle {
            date: transaction.date,
            start: current.start_date(),
            end: current.end_date(),
        });
    }
    debug!(
        date = %transaction.date,
        kind = %transaction.kind,
        amount = %transaction.amount,
        "assigning transaction"
    );
    let mut next = current.clone();
    next.push(transaction);
    next.totals()?;
    Ok(next)
}

/// Outcome of closing one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rollover {
    pub closed: Cycle,
    pub next: Cycle,
}

impl Rollover {
    pub fn closing_balance(&self) -> Decimal {
        self.next.opening_balance()
    }
}

/// Closes `current` and opens the cycle right after it.
///
/// Allowed only once `today` is past the cycle's end date. The closing
/// balance depends on nothing but the cycle's own contents, so repeated
/// calls on the same cycle agree.
pub fn rollover(current: &Cycle, today: NaiveDate) -> Result<Rollover, CycleError> {
    if today <= current.end_date() {
        return Err(CycleError::PrematureRollover {
            today,
            end: current.end_date(),
        });
    }
    let closing = current.balance()?;
    let mut closed = current.clone();
    closed.close(closing);

    let next_start = current
        .end_date()
        .succ_opt()
        .ok_or(CycleError::DateOutOfRange(current.end_date()))?;
    let (_, next_end) = current.policy().bounds(next_start)?;
    let next = Cycle::open(current.policy(), next_start, next_end, closing);
    info!(
        closed_start = %closed.start_date(),
        closed_end = %closed.end_date(),
        %closing,
        next_start = %next_start,
        next_end = %next_end,
        "rolled over pay cycle"
    );
    Ok(Rollover { closed, next })
}

/// Result of rolling forward across every cycle that ended before today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollForward {
    /// Each intermediate cycle in order, all closed.
    pub closed: Vec<Cycle>,
    pub current: Cycle,
}

/// Applies [`rollover`] one cycle at a time until `today` falls inside the
/// current cycle. Skipped cycles are closed with no transactions, each
/// carrying its balance into the next.
pub fn roll_forward(current: &Cycle, today: NaiveDate) -> Result<RollForward, CycleError> {
    let mut closed = Vec::new();
    let mut cur = current.clone();
    while today > cur.end_date() {
        let step = rollover(&cur, today)?;
        closed.push(step.closed);
        cur = step.next;
    }
    Ok(RollForward {
        closed,
        current: cur,
    })
}

/// A broken invariant found in a stored [`State`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub code: &'static str,
    pub detail: String,
}

impl Issue {
    fn new(code: &'static str, detail: String) -> Self {
        Self { code, detail }
    }
}

fn check_cycle(cycle: &Cycle, issues: &mut Vec<Issue>) {
    let span = format!("{}..{}", cycle.start_date(), cycle.end_date());
    match cycle.policy().bounds(cycle.start_date()) {
        Ok(bounds) if bounds == (cycle.start_date(), cycle.end_date()) => {}
        Ok((s, e)) => issues.push(Issue::new(
            "bounds_mismatch",
            format!("{} does not match policy {} ({}..{})", span, cycle.policy(), s, e),
        )),
        Err(e) => issues.push(Issue::new("invalid_policy", format!("{}: {}", span, e))),
    }
    for t in cycle.transactions() {
        if !cycle.contains(t.date) {
            issues.push(Issue::new(
                "tx_outside_cycle",
                format!("{} {} {} in {}", t.date, t.kind, t.amount, span),
            ));
        }
        if t.amount.is_sign_negative() {
            issues.push(Issue::new(
                "negative_amount",
                format!("{} {} {} in {}", t.date, t.kind, t.amount, span),
            ));
        }
    }
    match (cycle.closing_balance(), cycle.balance()) {
        (_, Err(e)) => issues.push(Issue::new("amount_overflow", e.to_string())),
        (Some(closing), Ok(expected)) if closing != expected => issues.push(Issue::new(
            "closing_mismatch",
            format!("{} closed at {} but its transactions give {}", span, closing, expected),
        )),
        _ => {}
    }
}

/// Verifies the invariants that tie cycles together: one open cycle at the
/// end, contiguous non-overlapping bounds, every transaction inside its
/// cycle, and each closing balance carried into the next opening balance.
pub fn check_state(state: &State) -> Vec<Issue> {
    let mut issues = Vec::new();
    if state.current.is_closed() {
        issues.push(Issue::new(
            "current_closed",
            format!(
                "current cycle {}..{} is marked closed",
                state.current.start_date(),
                state.current.end_date()
            ),
        ));
    }
    for c in &state.history {
        if !c.is_closed() {
            issues.push(Issue::new(
                "history_open",
                format!("{}..{} is in history but still open", c.start_date(), c.end_date()),
            ));
        }
    }
    for c in state.cycles() {
        check_cycle(c, &mut issues);
    }
    let cycles: Vec<&Cycle> = state.cycles().collect();
    for pair in cycles.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if prev.end_date().succ_opt() != Some(next.start_date()) {
            issues.push(Issue::new(
                "gap_or_overlap",
                format!(
                    "{}..{} is followed by {}..{}",
                    prev.start_date(),
                    prev.end_date(),
                    next.start_date(),
                    next.end_date()
                ),
            ));
        }
        if let Some(closing) = prev.closing_balance() {
            if closing != next.opening_balance() {
                issues.push(Issue::new(
                    "carryover_mismatch",
                    format!(
                        "{} closed at {} but {} opened at {}",
                        prev.end_date(),
                        closing,
                        next.start_date(),
                        next.opening_balance()
                    ),
                ));
            }
        }
    }
    issues
}
