// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;

use super::resolve::BudgetContext;
use super::warning::category_total;
use crate::category::ExpenseCategory;
use crate::models::ExpenseRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStatus {
    pub category: ExpenseCategory,
    pub spent: Decimal,
    pub limit: Decimal,
    pub over_budget: bool,
}

impl CategoryStatus {
    /// Share of the limit used, in percent; `None` without a limit or when the
    /// ratio does not fit a `Decimal`.
    pub fn percent_used(&self) -> Option<Decimal> {
        self.spent
            .checked_div(self.limit)?
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|p| p.round_dp(0))
    }
}

/// Budget vs actual for one page, in category order. Categories with neither
/// spend nor a limit are left out.
pub fn budget_status(
    ctx: &BudgetContext<'_>,
    portfolio_id: &str,
    expenses: &[ExpenseRecord],
) -> Vec<CategoryStatus> {
    ExpenseCategory::ALL
        .into_iter()
        .map(|category| {
            let spent = category_total(ctx, category, portfolio_id, expenses);
            let limit = ctx.resolve_limit(portfolio_id, category);
            CategoryStatus {
                category,
                spent,
                limit,
                over_budget: limit > Decimal::ZERO && spent > limit,
            }
        })
        .filter(|s| !s.spent.is_zero() || !s.limit.is_zero())
        .collect()
}
