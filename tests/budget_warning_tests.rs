// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use receiptlens::budget::{
    BudgetContext, BudgetMap, CategoryStatus, LoadedBudgets, MultiScopeBudget, SchemaVersion,
    WarningScope, budget_status, evaluate,
};
use receiptlens::category::ExpenseCategory;
use receiptlens::models::{ExpenseRecord, Portfolio};
use rust_decimal::Decimal;

fn page(id: &str, name: &str, secs: i64) -> Portfolio {
    Portfolio {
        id: id.into(),
        name: name.into(),
        user_id: "u1".into(),
        created_at: Utc.timestamp_opt(secs, 0).unwrap(),
        is_default: false,
    }
}

fn spend(category: ExpenseCategory, amount: Decimal, page: Option<&str>) -> ExpenseRecord {
    ExpenseRecord {
        id: format!("e-{}", amount),
        vendor_name: "Shop".into(),
        date: "2025-03-01".into(),
        amount,
        currency: "USD".into(),
        category,
        portfolio_id: page.map(str::to_string),
        ..ExpenseRecord::default()
    }
}

fn loaded(portfolios: BTreeMap<String, BudgetMap>, legacy: Option<BudgetMap>) -> LoadedBudgets {
    LoadedBudgets {
        config: MultiScopeBudget::with_portfolios(portfolios),
        legacy_global: legacy,
        source: SchemaVersion::V5,
    }
}

fn map(entries: &[(ExpenseCategory, Decimal)]) -> BudgetMap {
    entries.iter().copied().collect()
}

#[test]
fn legacy_global_covers_unassigned_spend_on_default_page() {
    let pages = vec![page("p1", "General", 10)];
    let budgets = loaded(
        BTreeMap::new(),
        Some(map(&[(ExpenseCategory::FoodDining, Decimal::from(40))])),
    );
    let ctx = BudgetContext::new(&budgets, &pages);
    let expenses = vec![spend(ExpenseCategory::FoodDining, Decimal::from(50), None)];

    assert_eq!(
        ctx.resolve_limit("p1", ExpenseCategory::FoodDining),
        Decimal::from(40)
    );
    let w = evaluate(
        &ctx,
        ExpenseCategory::FoodDining,
        Decimal::from(5),
        "p1",
        &expenses,
    )
    .expect("over the legacy limit");
    assert_eq!(w.limit, Decimal::from(40));
    assert_eq!(w.current_total, Decimal::from(50));
    assert_eq!(w.projected_total(), Decimal::from(55));
    assert_eq!(w.currency, "USD");
    assert_eq!(w.scope, WarningScope::DefaultPage("General".into()));
    assert!(w.to_string().contains("General"));
}

#[test]
fn legacy_global_never_applies_to_other_pages() {
    let pages = vec![page("p1", "General", 10), page("p2", "Trip", 20)];
    let budgets = loaded(
        BTreeMap::new(),
        Some(map(&[(ExpenseCategory::Hotel, Decimal::from(100))])),
    );
    let ctx = BudgetContext::new(&budgets, &pages);

    assert_eq!(ctx.resolve_limit("p2", ExpenseCategory::Hotel), Decimal::ZERO);
    let expenses = vec![spend(ExpenseCategory::Hotel, Decimal::from(500), Some("p2"))];
    assert!(evaluate(&ctx, ExpenseCategory::Hotel, Decimal::from(1), "p2", &expenses).is_none());
}

#[test]
fn own_limit_wins_and_missing_category_means_no_limit() {
    let pages = vec![page("p1", "General", 10), page("p2", "Trip", 20)];
    let mut per_page = BTreeMap::new();
    per_page.insert(
        "p1".to_string(),
        map(&[(ExpenseCategory::Parking, Decimal::from(20))]),
    );
    let budgets = loaded(
        per_page,
        Some(map(&[
            (ExpenseCategory::Parking, Decimal::from(99)),
            (ExpenseCategory::Toll, Decimal::from(8)),
        ])),
    );
    let ctx = BudgetContext::new(&budgets, &pages);

    assert_eq!(ctx.resolve_limit("p1", ExpenseCategory::Parking), Decimal::from(20));
    // own map lacks Toll, so the default page still falls back to legacy
    assert_eq!(ctx.resolve_limit("p1", ExpenseCategory::Toll), Decimal::from(8));
    assert_eq!(ctx.resolve_limit("p1", ExpenseCategory::Dental), Decimal::ZERO);
    assert_eq!(ctx.resolve_limit("missing", ExpenseCategory::Parking), Decimal::ZERO);
}

#[test]
fn warning_fires_only_strictly_over_the_limit() {
    let pages = vec![page("p1", "General", 10), page("p2", "Trip", 20)];
    let mut per_page = BTreeMap::new();
    per_page.insert(
        "p2".to_string(),
        map(&[(ExpenseCategory::Transport, Decimal::from(100))]),
    );
    let budgets = loaded(per_page, None);
    let ctx = BudgetContext::new(&budgets, &pages);
    let expenses = vec![
        spend(ExpenseCategory::Transport, Decimal::from(60), Some("p2")),
        spend(ExpenseCategory::Transport, Decimal::from(30), Some("p2")),
        // other pages and categories do not count
        spend(ExpenseCategory::Transport, Decimal::from(500), Some("p1")),
        spend(ExpenseCategory::Flight, Decimal::from(500), Some("p2")),
        spend(ExpenseCategory::Transport, Decimal::from(500), None),
    ];

    assert!(
        evaluate(
            &ctx,
            ExpenseCategory::Transport,
            Decimal::from(10),
            "p2",
            &expenses
        )
        .is_none()
    );
    let w = evaluate(
        &ctx,
        ExpenseCategory::Transport,
        Decimal::new(1001, 2),
        "p2",
        &expenses,
    )
    .expect("10.01 tips it over");
    assert_eq!(w.current_total, Decimal::from(90));
    assert_eq!(w.scope, WarningScope::ThisPage);
    assert_eq!(w.scope.label(), "this page");
}

#[test]
fn explicit_default_flag_moves_the_legacy_scope() {
    let mut pages = vec![page("p1", "General", 10), page("p2", "Home", 20)];
    pages[1].is_default = true;
    let budgets = loaded(
        BTreeMap::new(),
        Some(map(&[(ExpenseCategory::Utility, Decimal::from(50))])),
    );
    let ctx = BudgetContext::new(&budgets, &pages);

    assert_eq!(ctx.resolve_limit("p1", ExpenseCategory::Utility), Decimal::ZERO);
    assert_eq!(ctx.resolve_limit("p2", ExpenseCategory::Utility), Decimal::from(50));
    let expenses = vec![spend(ExpenseCategory::Utility, Decimal::from(45), None)];
    let w = evaluate(&ctx, ExpenseCategory::Utility, Decimal::from(6), "p2", &expenses).unwrap();
    assert_eq!(w.scope.label(), "Home");
}

#[test]
fn status_lists_only_categories_with_spend_or_limit() {
    let pages = vec![page("p1", "General", 10)];
    let mut per_page = BTreeMap::new();
    per_page.insert(
        "p1".to_string(),
        map(&[
            (ExpenseCategory::FoodDining, Decimal::from(100)),
            (ExpenseCategory::Hotel, Decimal::from(200)),
        ]),
    );
    let budgets = loaded(per_page, None);
    let ctx = BudgetContext::new(&budgets, &pages);
    let expenses = vec![
        spend(ExpenseCategory::FoodDining, Decimal::from(120), Some("p1")),
        spend(ExpenseCategory::Parking, Decimal::from(4), None),
    ];

    let lines = budget_status(&ctx, "p1", &expenses);
    let cats: Vec<_> = lines.iter().map(|s| s.category).collect();
    assert_eq!(
        cats,
        vec![
            ExpenseCategory::FoodDining,
            ExpenseCategory::Parking,
            ExpenseCategory::Hotel
        ]
    );
    assert!(lines[0].over_budget);
    assert_eq!(lines[0].percent_used(), Some(Decimal::from(120)));
    assert!(!lines[1].over_budget);
    assert_eq!(lines[1].percent_used(), None);
    assert_eq!(lines[2].spent, Decimal::ZERO);
}

#[test]
fn huge_amounts_warn_without_overflowing() {
    let pages = vec![page("p1", "General", 10)];
    let mut per_page = BTreeMap::new();
    per_page.insert(
        "p1".to_string(),
        map(&[(ExpenseCategory::Parking, Decimal::from(10))]),
    );
    let budgets = loaded(per_page, None);
    let ctx = BudgetContext::new(&budgets, &pages);
    let expenses = vec![
        spend(ExpenseCategory::Parking, Decimal::MAX, Some("p1")),
        spend(ExpenseCategory::Parking, Decimal::MAX, None),
    ];

    let w = evaluate(&ctx, ExpenseCategory::Parking, Decimal::MAX, "p1", &expenses)
        .expect("far over the limit");
    assert_eq!(w.current_total, Decimal::MAX);
    assert_eq!(w.projected_total(), Decimal::MAX);

    let lines = budget_status(&ctx, "p1", &expenses);
    assert!(lines[0].over_budget);
    assert_eq!(lines[0].percent_used(), None);
}

#[test]
fn percent_used_is_none_when_ratio_does_not_fit() {
    let status = CategoryStatus {
        category: ExpenseCategory::Hotel,
        spent: Decimal::from_i128_with_scale(10_i128.pow(27), 0),
        limit: Decimal::new(1, 2),
        over_budget: true,
    };
    assert_eq!(status.percent_used(), None);
}
