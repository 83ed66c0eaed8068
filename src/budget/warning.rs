// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use super::resolve::BudgetContext;
use crate::category::ExpenseCategory;
use crate::models::ExpenseRecord;
use crate::stats::saturating_sum;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum WarningScope {
    ThisPage,
    DefaultPage(String),
}

impl WarningScope {
    pub fn label(&self) -> &str {
        match self {
            WarningScope::ThisPage => "this page",
            WarningScope::DefaultPage(name) => name,
        }
    }
}

/// Advisory signal that adding an expense pushes a category over its limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetWarning {
    pub category: ExpenseCategory,
    pub limit: Decimal,
    pub currency: String,
    pub current_total: Decimal,
    pub amount_added: Decimal,
    pub scope: WarningScope,
}

impl BudgetWarning {
    pub fn projected_total(&self) -> Decimal {
        self.current_total.saturating_add(self.amount_added)
    }
}

impl fmt::Display for BudgetWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Budget alert: spending on {} for {} reaches {} {:.2}, over the {} {:.2} limit",
            self.category,
            self.scope.label(),
            self.currency,
            self.projected_total(),
            self.currency,
            self.limit
        )
    }
}

/// Sum of existing spend in `category` that counts against `portfolio_id`.
pub fn category_total(
    ctx: &BudgetContext<'_>,
    category: ExpenseCategory,
    portfolio_id: &str,
    expenses: &[ExpenseRecord],
) -> Decimal {
    let default_id = ctx.default_portfolio_id();
    let amounts = expenses
        .iter()
        .filter(|e| e.category == category && e.belongs_to(portfolio_id, default_id))
        .map(|e| e.amount);
    saturating_sum(amounts)
}

/// Decides whether recording `amount` in `category` on the active page exceeds
/// the resolved limit. Never blocks anything; `None` simply means no warning.
pub fn evaluate(
    ctx: &BudgetContext<'_>,
    category: ExpenseCategory,
    amount: Decimal,
    active_portfolio_id: &str,
    expenses: &[ExpenseRecord],
) -> Option<BudgetWarning> {
    let limit = ctx.resolve_limit(active_portfolio_id, category);
    if limit <= Decimal::ZERO {
        return None;
    }
    let current_total = category_total(ctx, category, active_portfolio_id, expenses);
    if current_total.saturating_add(amount) <= limit {
        return None;
    }
    let scope = match ctx.default_portfolio {
        Some(p) if p.id == active_portfolio_id => WarningScope::DefaultPage(p.name.clone()),
        _ => WarningScope::ThisPage,
    };
    Some(BudgetWarning {
        category,
        limit,
        currency: ctx.currency().to_string(),
        current_total,
        amount_added: amount,
        scope,
    })
}
