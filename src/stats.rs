// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Stateless reductions over expense lists for reporting.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::category::ExpenseCategory;
use crate::models::ExpenseRecord;
use crate::utils::month_key;

/// Saturates at `Decimal::MAX` instead of overflowing.
pub fn total_amount(expenses: &[ExpenseRecord]) -> Decimal {
    saturating_sum(expenses.iter().map(|e| e.amount))
}

pub(crate) fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |acc, a| acc.saturating_add(a))
}

pub fn by_category(expenses: &[ExpenseRecord]) -> BTreeMap<ExpenseCategory, Decimal> {
    sum_by(expenses, |e| e.category)
}

pub fn by_vendor(expenses: &[ExpenseRecord]) -> BTreeMap<String, Decimal> {
    sum_by(expenses, |e| e.vendor_name.clone())
}

pub fn by_month(expenses: &[ExpenseRecord]) -> BTreeMap<String, Decimal> {
    sum_by(expenses, |e| month_key(&e.date))
}

fn sum_by<K: Ord>(
    expenses: &[ExpenseRecord],
    key: impl Fn(&ExpenseRecord) -> K,
) -> BTreeMap<K, Decimal> {
    let mut out = BTreeMap::new();
    for e in expenses {
        let slot = out.entry(key(e)).or_insert(Decimal::ZERO);
        *slot = slot.saturating_add(e.amount);
    }
    out
}

/// Sorts a grouped total descending by value; ties keep key order.
pub fn ranked<K: Clone>(totals: &BTreeMap<K, Decimal>) -> Vec<(K, Decimal)> {
    let mut items: Vec<(K, Decimal)> = totals.iter().map(|(k, v)| (k.clone(), *v)).collect();
    items.sort_by(|a, b| b.1.cmp(&a.1));
    items
}

pub fn top_vendors(expenses: &[ExpenseRecord], n: usize) -> Vec<(String, Decimal)> {
    let mut items = ranked(&by_vendor(expenses));
    items.truncate(n);
    items
}

/// Monthly totals ascending by month key.
pub fn monthly_trend(expenses: &[ExpenseRecord]) -> Vec<(String, Decimal)> {
    by_month(expenses).into_iter().collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
    pub category_breakdown: Vec<(ExpenseCategory, Decimal)>,
    pub peak_month: Option<(String, Decimal)>,
}

impl Stats {
    pub fn top_category(&self) -> Option<&(ExpenseCategory, Decimal)> {
        self.category_breakdown.first()
    }
}

pub fn aggregate(expenses: &[ExpenseRecord]) -> Stats {
    let total = total_amount(expenses);
    let count = expenses.len();
    let average = total
        .checked_div(Decimal::from(count))
        .unwrap_or(Decimal::ZERO);
    let peak_month = monthly_trend(expenses)
        .into_iter()
        .fold(None, |best: Option<(String, Decimal)>, cur| match best {
            Some(b) if b.1 >= cur.1 => Some(b),
            _ => Some(cur),
        });
    Stats {
        total,
        count,
        average,
        category_breakdown: ranked(&by_category(expenses)),
        peak_month,
    }
}
