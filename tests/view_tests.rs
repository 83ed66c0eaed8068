// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{TimeZone, Utc};
use receiptlens::category::ExpenseCategory;
use receiptlens::models::{ExpenseRecord, Portfolio};
use receiptlens::view::{CategoryFilter, SortField, SortOrder, ViewCriteria, filter_and_sort};
use rust_decimal::Decimal;

fn page(id: &str, secs: i64) -> Portfolio {
    Portfolio {
        id: id.into(),
        name: id.to_uppercase(),
        user_id: "u1".into(),
        created_at: Utc.timestamp_opt(secs, 0).unwrap(),
        is_default: false,
    }
}

fn rec(id: &str, vendor: &str, amount: i64, page: Option<&str>) -> ExpenseRecord {
    ExpenseRecord {
        id: id.into(),
        vendor_name: vendor.into(),
        date: "2025-04-01".into(),
        amount: Decimal::from(amount),
        category: ExpenseCategory::Others,
        portfolio_id: page.map(str::to_string),
        ..ExpenseRecord::default()
    }
}

fn ids(v: &[&ExpenseRecord]) -> Vec<String> {
    v.iter().map(|e| e.id.clone()).collect()
}

#[test]
fn unloaded_pages_fail_open() {
    let expenses = vec![
        rec("a", "Alpha", 1, Some("p1")),
        rec("b", "Beta", 2, Some("p2")),
        rec("c", "Gamma", 3, None),
    ];
    let criteria = ViewCriteria {
        active_portfolio: Some("p9".into()),
        sort_order: SortOrder::Asc,
        sort_field: SortField::Amount,
        ..ViewCriteria::default()
    };
    assert_eq!(ids(&filter_and_sort(&expenses, &[], &criteria)), ["a", "b", "c"]);
}

#[test]
fn unassigned_records_show_only_on_default_page() {
    let pages = vec![page("p1", 10), page("p2", 20)];
    let expenses = vec![
        rec("a", "Alpha", 1, Some("p1")),
        rec("b", "Beta", 2, Some("p2")),
        rec("c", "Gamma", 3, None),
    ];
    let mut criteria = ViewCriteria {
        active_portfolio: Some("p1".into()),
        sort_order: SortOrder::Asc,
        sort_field: SortField::Amount,
        ..ViewCriteria::default()
    };
    assert_eq!(ids(&filter_and_sort(&expenses, &pages, &criteria)), ["a", "c"]);

    criteria.active_portfolio = Some("p2".into());
    assert_eq!(ids(&filter_and_sort(&expenses, &pages, &criteria)), ["b"]);

    criteria.active_portfolio = None;
    assert_eq!(filter_and_sort(&expenses, &pages, &criteria).len(), 3);
}

#[test]
fn search_matches_vendor_or_summary_case_insensitively() {
    let mut with_note = rec("b", "Shell", 2, None);
    with_note.summary = Some("Fuel for the TRIP".into());
    let mut food = rec("c", "Trip Diner", 3, None);
    food.category = ExpenseCategory::FoodDining;
    let expenses = vec![rec("a", "Kopi", 1, None), with_note, food];

    let mut criteria = ViewCriteria {
        search: "  trip ".into(),
        sort_order: SortOrder::Asc,
        sort_field: SortField::Amount,
        ..ViewCriteria::default()
    };
    assert_eq!(ids(&filter_and_sort(&expenses, &[], &criteria)), ["b", "c"]);

    criteria.category = CategoryFilter::Only(ExpenseCategory::FoodDining);
    assert_eq!(ids(&filter_and_sort(&expenses, &[], &criteria)), ["c"]);
}

#[test]
fn sort_is_stable_in_both_directions() {
    let expenses = vec![
        rec("a", "bravo", 5, None),
        rec("b", "Alpha", 5, None),
        rec("c", "alpha", 9, None),
        rec("d", "Charlie", 1, None),
    ];
    let mut criteria = ViewCriteria {
        sort_field: SortField::Amount,
        sort_order: SortOrder::Desc,
        ..ViewCriteria::default()
    };
    assert_eq!(
        ids(&filter_and_sort(&expenses, &[], &criteria)),
        ["c", "a", "b", "d"]
    );

    criteria.sort_order = SortOrder::Asc;
    assert_eq!(
        ids(&filter_and_sort(&expenses, &[], &criteria)),
        ["d", "a", "b", "c"]
    );

    criteria.sort_field = SortField::VendorName;
    assert_eq!(
        ids(&filter_and_sort(&expenses, &[], &criteria)),
        ["b", "c", "a", "d"]
    );
}
