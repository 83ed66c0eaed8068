// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;

use super::map::{BudgetMap, MultiScopeBudget};
use super::store::LoadedBudgets;
use crate::category::ExpenseCategory;
use crate::models::{Portfolio, default_portfolio};

/// Everything the resolver and the warning evaluator read, passed explicitly.
#[derive(Debug, Clone, Copy)]
pub struct BudgetContext<'a> {
    pub budgets: &'a MultiScopeBudget,
    pub legacy_global: Option<&'a BudgetMap>,
    pub default_portfolio: Option<&'a Portfolio>,
}

impl<'a> BudgetContext<'a> {
    pub fn new(loaded: &'a LoadedBudgets, portfolios: &'a [Portfolio]) -> Self {
        Self {
            budgets: &loaded.config,
            legacy_global: loaded.legacy_global.as_ref(),
            default_portfolio: default_portfolio(portfolios),
        }
    }

    pub fn default_portfolio_id(&self) -> Option<&'a str> {
        self.default_portfolio.map(|p| p.id.as_str())
    }

    pub fn is_default(&self, portfolio_id: &str) -> bool {
        self.default_portfolio_id() == Some(portfolio_id)
    }

    pub fn currency(&self) -> &'a str {
        &self.budgets.default_currency
    }

    /// Effective limit for `category` on `portfolio_id`; zero means no limit.
    ///
    /// The page's own map wins. The legacy global map is consulted only for
    /// the default page, and there is no other fallback.
    pub fn resolve_limit(&self, portfolio_id: &str, category: ExpenseCategory) -> Decimal {
        let own = self
            .budgets
            .portfolio(portfolio_id)
            .map(|m| m.limit(category))
            .unwrap_or(Decimal::ZERO);
        if own > Decimal::ZERO {
            return own;
        }
        if self.is_default(portfolio_id) {
            if let Some(legacy) = self.legacy_global {
                let l = legacy.limit(category);
                if l > Decimal::ZERO {
                    return l;
                }
            }
        }
        Decimal::ZERO
    }

    /// All non-zero limits in effect for a page.
    pub fn effective_map(&self, portfolio_id: &str) -> BudgetMap {
        ExpenseCategory::ALL
            .into_iter()
            .map(|c| (c, self.resolve_limit(portfolio_id, c)))
            .collect()
    }
}
