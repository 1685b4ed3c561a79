// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use paycycle::cycle::{assign_transaction, check_state, start_cycle};
use paycycle::error::CycleError;
use paycycle::forecast::{category_breakdown, compute_forecast};
use paycycle::models::{Cycle, CyclePolicy, Runway, State, Transaction};
use paycycle::report::category_shares;
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn cycle_with(opening: &str, txs: Vec<Transaction>) -> Cycle {
    let mut c = start_cycle(
        CyclePolicy::Monthly { anchor_day: 15 },
        dec(opening),
        d("2024-01-15"),
    )
    .unwrap();
    for t in txs {
        c = assign_transaction(t, &c).unwrap();
    }
    c
}

#[test]
fn burn_rate_and_runway_mid_cycle() {
    let c = cycle_with(
        "1000",
        vec![
            Transaction::expense(d("2024-01-20"), dec("200"), "food"),
            Transaction::expense(d("2024-01-25"), dec("100"), "transport"),
        ],
    );
    let f = compute_forecast(&c, d("2024-01-30")).unwrap();
    assert_eq!(f.start_date, d("2024-01-15"));
    assert_eq!(f.end_date, d("2024-02-14"));
    assert_eq!(f.elapsed_days, 15);
    assert_eq!(f.current_balance, dec("700"));
    assert_eq!(f.daily_spend_velocity, dec("20.0"));
    assert_eq!(f.runway, Runway::Days(35));
    assert_eq!(f.total_expense, dec("300"));
    assert_eq!(f.total_income, Decimal::ZERO);
    assert_eq!(f.days_remaining, 15);
}

#[test]
fn no_expenses_means_unbounded_runway() {
    let c = cycle_with(
        "500",
        vec![Transaction::income(d("2024-01-16"), dec("250"))],
    );
    let f = compute_forecast(&c, d("2024-01-20")).unwrap();
    assert!(f.daily_spend_velocity.is_zero());
    assert_eq!(f.runway, Runway::Unbounded);
    assert_eq!(f.runway.days(), None);
    assert_eq!(f.current_balance, dec("750"));

    let json = serde_json::to_value(&f).unwrap();
    assert_eq!(json["runway"], serde_json::json!("unbounded"));
}

#[test]
fn elapsed_days_is_at_least_one() {
    let c = cycle_with(
        "100",
        vec![Transaction::expense(d("2024-01-15"), dec("10"), "food")],
    );
    let f = compute_forecast(&c, d("2024-01-15")).unwrap();
    assert_eq!(f.elapsed_days, 1);
    assert_eq!(f.daily_spend_velocity, dec("10"));
    assert_eq!(f.runway, Runway::Days(9));
}

#[test]
fn runway_is_floored_to_whole_days() {
    // 90 left, 10 over 3 days: 27 days exactly; 95 left: 28.5 -> 28
    let c = cycle_with(
        "100",
        vec![Transaction::expense(d("2024-01-16"), dec("10"), "food")],
    );
    assert_eq!(compute_forecast(&c, d("2024-01-18")).unwrap().runway, Runway::Days(27));

    let c = cycle_with(
        "105",
        vec![Transaction::expense(d("2024-01-16"), dec("10"), "food")],
    );
    assert_eq!(compute_forecast(&c, d("2024-01-18")).unwrap().runway, Runway::Days(28));
}

#[test]
fn overdrawn_cycle_reports_zero_runway() {
    let c = cycle_with(
        "50",
        vec![Transaction::expense(d("2024-01-16"), dec("80"), "rent")],
    );
    let f = compute_forecast(&c, d("2024-01-20")).unwrap();
    assert_eq!(f.current_balance, dec("-30"));
    assert_eq!(f.runway, Runway::Days(0));
}

#[test]
fn many_small_amounts_do_not_drift() {
    let txs = (0..1000)
        .map(|_| Transaction::expense(d("2024-01-20"), dec("0.10"), "coffee"))
        .collect();
    let c = cycle_with("100.00", txs);
    let f = compute_forecast(&c, d("2024-01-25")).unwrap();
    assert_eq!(f.total_expense, dec("100.00"));
    assert!(f.current_balance.is_zero());
    assert_eq!(f.runway, Runway::Days(0));
    assert_eq!(category_breakdown(&c).unwrap()["coffee"], dec("100.00"));
}

#[test]
fn breakdown_sums_expenses_per_category_only() {
    let c = cycle_with(
        "1000",
        vec![
            Transaction::expense(d("2024-01-20"), dec("200"), "food"),
            Transaction::expense(d("2024-01-21"), dec("50.25"), "food"),
            Transaction::expense(d("2024-01-25"), dec("100"), "transport"),
            Transaction::income(d("2024-01-26"), dec("75")).with_category("refund"),
        ],
    );
    let b = category_breakdown(&c).unwrap();
    assert_eq!(b.len(), 2);
    assert_eq!(b["food"], dec("250.25"));
    assert_eq!(b["transport"], dec("100"));
    assert!(!b.contains_key("refund"));
}

#[test]
fn breakdown_of_empty_cycle_is_empty() {
    let c = cycle_with("1000", vec![]);
    assert!(category_breakdown(&c).unwrap().is_empty());
}

#[test]
fn forecast_serializes_finite_runway_as_days() {
    let c = cycle_with(
        "1000",
        vec![Transaction::expense(d("2024-01-20"), dec("300"), "food")],
    );
    let f = compute_forecast(&c, d("2024-01-30")).unwrap();
    let json = serde_json::to_value(&f).unwrap();
    assert_eq!(json["runway"], serde_json::json!({ "days": 35 }));
    assert_eq!(json["current_balance"], serde_json::json!("700"));
}

fn oversized_cycle() -> Cycle {
    let huge = "50000000000000000000000000000";
    serde_json::from_value(serde_json::json!({
        "policy": { "type": "monthly", "anchor_day": 15 },
        "start_date": "2024-01-15",
        "end_date": "2024-02-14",
        "opening_balance": "1000",
        "transactions": [
            { "date": "2024-01-20", "kind": "expense", "amount": huge, "category": "food" },
            { "date": "2024-01-21", "kind": "expense", "amount": huge, "category": "food" }
        ]
    }))
    .unwrap()
}

#[test]
fn expense_that_would_overflow_totals_is_rejected() {
    let c = cycle_with(
        "1000",
        vec![Transaction::expense(d("2024-01-20"), dec("50000000000000000000000000000"), "food")],
    );
    let before = c.clone();
    let err = assign_transaction(
        Transaction::expense(d("2024-01-21"), dec("50000000000000000000000000000"), "food"),
        &c,
    )
    .unwrap_err();
    assert!(matches!(err, CycleError::AmountOverflow(_)));
    assert_eq!(c, before);
}

#[test]
fn overflowing_sums_are_errors_not_panics() {
    let c = oversized_cycle();
    assert!(matches!(
        compute_forecast(&c, d("2024-01-30")),
        Err(CycleError::AmountOverflow(_))
    ));
    assert!(matches!(c.totals(), Err(CycleError::AmountOverflow(_))));
    assert!(matches!(category_breakdown(&c), Err(CycleError::AmountOverflow(_))));

    let codes: Vec<_> = check_state(&State::new(c))
        .into_iter()
        .map(|i| i.code)
        .collect();
    assert_eq!(codes, vec!["amount_overflow"]);
}

#[test]
fn breakdown_shares_of_large_spending_do_not_overflow() {
    let c = cycle_with(
        "1000",
        vec![
            Transaction::expense(d("2024-01-20"), dec("1000000000000000000000000000"), "rent"),
            Transaction::expense(d("2024-01-21"), dec("10"), "food"),
        ],
    );
    let shares = category_shares(&category_breakdown(&c).unwrap()).unwrap();
    assert_eq!(shares[0].category, "rent");
    assert_eq!(shares[0].share, dec("100.0"));
    assert_eq!(shares[1].share, Decimal::ZERO);
}
