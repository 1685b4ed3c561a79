// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::CycleError;

/// Label used for expenses that carry no category.
pub const UNCATEGORIZED: &str = "(uncategorized)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(ParseError(format!("unknown transaction kind '{}'", other))),
        }
    }
}

/// A single income or expense entry. `amount` is always the magnitude; the
/// direction comes from `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Transaction {
    pub fn expense(date: NaiveDate, amount: Decimal, category: impl Into<String>) -> Self {
        Self {
            date,
            kind: TransactionKind::Expense,
            amount: amount.abs(),
            category: Some(category.into()),
            description: None,
        }
    }

    pub fn income(date: NaiveDate, amount: Decimal) -> Self {
        Self {
            date,
            kind: TransactionKind::Income,
            amount: amount.abs(),
            category: None,
            description: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Positive for income, negative for expenses.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ParseError(pub String);

/// How cycle boundaries are laid out on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CyclePolicy {
    /// One cycle per month, starting on `anchor_day` (1-31).
    Monthly { anchor_day: u32 },
    /// Fixed-length cycles of `days` days, one of which starts on `anchor`.
    Every { days: u32, anchor: NaiveDate },
}

impl fmt::Display for CyclePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly { anchor_day } => write!(f, "monthly:{}", anchor_day),
            Self::Every { days, anchor } => write!(f, "every:{}:{}", days, anchor),
        }
    }
}

impl FromStr for CyclePolicy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseError(format!("invalid cycle policy '{}'", s));
        let mut parts = s.split(':');
        let policy = match (parts.next(), parts.next(), parts.next()) {
            (Some("monthly"), Some(day), None) => {
                let anchor_day: u32 = day.parse().map_err(|_| bad())?;
                if !(1..=31).contains(&anchor_day) {
                    return Err(bad());
                }
                Self::Monthly { anchor_day }
            }
            (Some("every"), Some(days), Some(anchor)) => {
                let days: u32 = days.parse().map_err(|_| bad())?;
                if days == 0 {
                    return Err(bad());
                }
                let anchor = NaiveDate::parse_from_str(anchor, "%Y-%m-%d").map_err(|_| bad())?;
                Self::Every { days, anchor }
            }
            _ => return Err(bad()),
        };
        if parts.next().is_some() {
            return Err(bad());
        }
        Ok(policy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleStatus {
    Open,
    Closed,
}

impl CycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// One pay period and the transactions recorded in it.
///
/// A cycle is open until [`crate::cycle::rollover`] closes it; the closing
/// balance is fixed at that point and the cycle is never mutated again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    policy: CyclePolicy,
    start_date: NaiveDate,
    end_date: NaiveDate,
    opening_balance: Decimal,
    #[serde(default)]
    closing_balance: Option<Decimal>,
    #[serde(default)]
    transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleTotals {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

impl Cycle {
    pub(crate) fn open(
        policy: CyclePolicy,
        start_date: NaiveDate,
        end_date: NaiveDate,
        opening_balance: Decimal,
    ) -> Self {
        Self {
            policy,
            start_date,
            end_date,
            opening_balance,
            closing_balance: None,
            transactions: Vec::new(),
        }
    }

    /// Rebuilds a cycle exactly as a store recorded it.
    pub(crate) fn from_parts(
        policy: CyclePolicy,
        start_date: NaiveDate,
        end_date: NaiveDate,
        opening_balance: Decimal,
        closing_balance: Option<Decimal>,
        transactions: Vec<Transaction>,
    ) -> Self {
        Self {
            policy,
            start_date,
            end_date,
            opening_balance,
            closing_balance,
            transactions,
        }
    }

    pub(crate) fn push(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    pub(crate) fn close(&mut self, closing_balance: Decimal) {
        self.closing_balance = Some(closing_balance);
    }

    pub fn policy(&self) -> CyclePolicy {
        self.policy
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn opening_balance(&self) -> Decimal {
        self.opening_balance
    }

    pub fn closing_balance(&self) -> Option<Decimal> {
        self.closing_balance
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn status(&self) -> CycleStatus {
        if self.closing_balance.is_some() {
            CycleStatus::Closed
        } else {
            CycleStatus::Open
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status() == CycleStatus::Closed
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Number of calendar days in the cycle, both ends included.
    pub fn length_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Opening balance plus every transaction recorded so far.
    pub fn balance(&self) -> Result<Decimal, CycleError> {
        self.totals().map(|t| t.balance)
    }

    /// Income and expense sums with the resulting balance. Fails instead of
    /// panicking when a sum leaves the decimal range.
    pub fn totals(&self) -> Result<CycleTotals, CycleError> {
        let overflow = || {
            CycleError::AmountOverflow(format!(
                "the pay cycle {}..{}",
                self.start_date, self.end_date
            ))
        };
        let mut income = Decimal::ZERO;
        let mut expense = Decimal::ZERO;
        for t in &self.transactions {
            match t.kind {
                TransactionKind::Income => {
                    income = income.checked_add(t.amount).ok_or_else(overflow)?
                }
                TransactionKind::Expense => {
                    expense = expense.checked_add(t.amount).ok_or_else(overflow)?
                }
            }
        }
        let balance = self
            .opening_balance
            .checked_add(income)
            .and_then(|b| b.checked_sub(expense))
            .ok_or_else(overflow)?;
        Ok(CycleTotals {
            income,
            expense,
            balance,
        })
    }
}

/// Everything a store persists: the open cycle plus closed history, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub current: Cycle,
    #[serde(default)]
    pub history: Vec<Cycle>,
}

impl State {
    pub fn new(current: Cycle) -> Self {
        Self {
            current,
            history: Vec::new(),
        }
    }

    /// History followed by the current cycle, in calendar order.
    pub fn cycles(&self) -> impl Iterator<Item = &Cycle> {
        self.history.iter().chain(std::iter::once(&self.current))
    }
}

/// Projected days of solvency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Runway {
    /// Whole days left at the current spend velocity (floored, never negative).
    Days(i64),
    /// Nothing has been spent yet, so there is no burn rate to project from.
    Unbounded,
}

impl Runway {
    pub fn days(&self) -> Option<i64> {
        match self {
            Self::Days(d) => Some(*d),
            Self::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl fmt::Display for Runway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days(1) => f.write_str("1 day"),
            Self::Days(d) => write!(f, "{} days", d),
            Self::Unbounded => f.write_str("unbounded (no spending yet)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Forecast {
    pub as_of: NaiveDate,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub elapsed_days: i64,
    pub days_remaining: i64,
    pub opening_balance: Decimal,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub current_balance: Decimal,
    pub daily_spend_velocity: Decimal,
    pub runway: Runway,
}
