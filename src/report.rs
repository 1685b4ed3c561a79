// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Text rendering for forecasts, transactions, and the spend distribution.
//! Takes computed figures only; nothing here does arithmetic on balances.

use std::collections::BTreeMap;

use comfy_table::Table;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::error::CycleError;
use crate::models::{Cycle, Forecast, Transaction};
use crate::utils::{fmt_money, pretty_table};

const BAR_WIDTH: usize = 30;

pub fn summary_table(f: &Forecast) -> Table {
    let rows = vec![
        vec!["Cycle".into(), format!("{} to {}", f.start_date, f.end_date)],
        vec!["As of".into(), f.as_of.to_string()],
        vec!["Days elapsed".into(), f.elapsed_days.to_string()],
        vec!["Days remaining".into(), f.days_remaining.to_string()],
        vec!["Opening balance".into(), fmt_money(&f.opening_balance)],
        vec!["Income".into(), fmt_money(&f.total_income)],
        vec!["Expenses".into(), fmt_money(&f.total_expense)],
        vec!["Balance left".into(), fmt_money(&f.current_balance)],
        vec!["Daily spend".into(), fmt_money(&f.daily_spend_velocity)],
        vec!["Runway".into(), f.runway.to_string()],
    ];
    pretty_table(&["Metric", "Value"], rows)
}

pub fn transactions_table(txs: &[Transaction]) -> Table {
    let rows = txs
        .iter()
        .map(|t| {
            vec![
                t.date.to_string(),
                t.kind.to_string(),
                fmt_money(&t.signed_amount()),
                t.category.clone().unwrap_or_default(),
                t.description.clone().unwrap_or_default(),
            ]
        })
        .collect();
    pretty_table(&["Date", "Kind", "Amount", "Category", "Description"], rows)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub spent: Decimal,
    /// Percent of total spending, one decimal place.
    pub share: Decimal,
}

/// Largest spend first; ties keep alphabetical order.
pub fn category_shares(
    breakdown: &BTreeMap<String, Decimal>,
) -> Result<Vec<CategoryShare>, CycleError> {
    let overflow = || CycleError::AmountOverflow("the category breakdown".to_string());
    let total = breakdown
        .values()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .ok_or_else(overflow)?;
    let mut out = Vec::with_capacity(breakdown.len());
    for (category, spent) in breakdown {
        let share = if total.is_zero() {
            Decimal::ZERO
        } else {
            spent
                .checked_div(total)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .ok_or_else(overflow)?
                .round_dp(1)
        };
        out.push(CategoryShare {
            category: category.clone(),
            spent: *spent,
            share,
        });
    }
    out.sort_by(|a, b| b.spent.cmp(&a.spent));
    Ok(out)
}

fn bar(spent: Decimal, max: Decimal) -> String {
    if max.is_zero() {
        return String::new();
    }
    let cells = spent
        .checked_div(max)
        .and_then(|ratio| ratio.checked_mul(Decimal::from(BAR_WIDTH)))
        .and_then(|d| d.round().to_usize())
        .unwrap_or(0)
        .min(BAR_WIDTH);
    "█".repeat(cells)
}

pub fn breakdown_table(shares: &[CategoryShare]) -> Table {
    let max = shares
        .iter()
        .map(|s| s.spent)
        .max()
        .unwrap_or(Decimal::ZERO);
    let rows = shares
        .iter()
        .map(|s| {
            vec![
                s.category.clone(),
                fmt_money(&s.spent),
                format!("{:.1}%", s.share),
                bar(s.spent, max),
            ]
        })
        .collect();
    pretty_table(&["Category", "Spent", "Share", ""], rows)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    pub start_date: String,
    pub end_date: String,
    pub opening_balance: Decimal,
    pub income: Decimal,
    pub expense: Decimal,
    pub closing_balance: Option<Decimal>,
    pub transactions: usize,
}

pub fn history_rows(cycles: &[Cycle]) -> Result<Vec<HistoryRow>, CycleError> {
    cycles
        .iter()
        .map(|c| {
            let totals = c.totals()?;
            Ok(HistoryRow {
                start_date: c.start_date().to_string(),
                end_date: c.end_date().to_string(),
                opening_balance: c.opening_balance(),
                income: totals.income,
                expense: totals.expense,
                closing_balance: c.closing_balance(),
                transactions: c.transactions().len(),
            })
        })
        .collect()
}

pub fn history_table(rows: &[HistoryRow]) -> Table {
    let data = rows
        .iter()
        .map(|r| {
            vec![
                format!("{} to {}", r.start_date, r.end_date),
                fmt_money(&r.opening_balance),
                fmt_money(&r.income),
                fmt_money(&r.expense),
                r.closing_balance
                    .map(|d| fmt_money(&d))
                    .unwrap_or_else(|| "(open)".to_string()),
                r.transactions.to_string(),
            ]
        })
        .collect();
    pretty_table(
        &["Cycle", "Opening", "Income", "Expenses", "Closing", "Txns"],
        data,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_sort_by_spend_and_sum_to_hundred() {
        let mut b = BTreeMap::new();
        b.insert("food".to_string(), Decimal::from(200));
        b.insert("transport".to_string(), Decimal::from(100));
        let shares = category_shares(&b).unwrap();
        assert_eq!(shares[0].category, "food");
        assert_eq!(shares[0].share, Decimal::new(667, 1));
        assert_eq!(shares[1].share, Decimal::new(333, 1));
    }

    #[test]
    fn shares_of_huge_spending_error_out() {
        let mut b = BTreeMap::new();
        b.insert("a".to_string(), Decimal::MAX);
        b.insert("b".to_string(), Decimal::MAX);
        assert!(matches!(category_shares(&b), Err(CycleError::AmountOverflow(_))));

        let mut one = BTreeMap::new();
        one.insert("rent".to_string(), Decimal::MAX);
        let shares = category_shares(&one).unwrap();
        assert_eq!(shares[0].share, Decimal::ONE_HUNDRED);
        assert_eq!(bar(Decimal::MAX, Decimal::MAX).chars().count(), BAR_WIDTH);
    }

    #[test]
    fn bar_scales_to_the_largest_category() {
        assert_eq!(bar(Decimal::from(10), Decimal::from(10)).chars().count(), BAR_WIDTH);
        assert_eq!(bar(Decimal::from(5), Decimal::from(10)).chars().count(), BAR_WIDTH / 2);
        assert_eq!(bar(Decimal::ZERO, Decimal::ZERO), "");
    }
}
