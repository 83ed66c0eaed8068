// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::category::ExpenseCategory;
use crate::utils::lenient_decimal;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Per-category limits for one scope. Absent and zero both mean "no limit".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetMap(BTreeMap<ExpenseCategory, Decimal>);

impl BudgetMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(&self, category: ExpenseCategory) -> Decimal {
        self.0.get(&category).copied().unwrap_or(Decimal::ZERO)
    }

    /// Sets a limit; zero or negative clears it.
    pub fn set(&mut self, category: ExpenseCategory, limit: Decimal) {
        if limit > Decimal::ZERO {
            self.0.insert(category, limit);
        } else {
            self.0.remove(&category);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExpenseCategory, Decimal)> + '_ {
        self.0.iter().map(|(c, d)| (*c, *d))
    }
}

impl FromIterator<(ExpenseCategory, Decimal)> for BudgetMap {
    fn from_iter<I: IntoIterator<Item = (ExpenseCategory, Decimal)>>(iter: I) -> Self {
        let mut m = BudgetMap::new();
        for (c, d) in iter {
            m.set(c, d);
        }
        m
    }
}

impl Serialize for BudgetMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (c, d) in &self.0 {
            map.serialize_entry(c.label(), &d.to_string())?;
        }
        map.end()
    }
}

// Entries are read leniently: unknown labels and unusable limits are dropped
// rather than failing the whole payload.
impl<'de> Deserialize<'de> for BudgetMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
        Ok(raw
            .unwrap_or_default()
            .iter()
            .filter_map(|(label, v)| {
                ExpenseCategory::from_label(label).map(|c| (c, lenient_decimal(v)))
            })
            .collect())
    }
}

/// Current (v5) budget configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiScopeBudget {
    #[serde(default)]
    pub portfolios: BTreeMap<String, BudgetMap>,
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for MultiScopeBudget {
    fn default() -> Self {
        Self {
            portfolios: BTreeMap::new(),
            default_currency: default_currency(),
        }
    }
}

impl MultiScopeBudget {
    pub fn with_portfolios(portfolios: BTreeMap<String, BudgetMap>) -> Self {
        Self {
            portfolios,
            ..Self::default()
        }
    }

    pub fn portfolio(&self, portfolio_id: &str) -> Option<&BudgetMap> {
        self.portfolios.get(portfolio_id)
    }

    /// Clearing a limit on a page without a map leaves the config untouched.
    pub fn set_limit(&mut self, portfolio_id: &str, category: ExpenseCategory, limit: Decimal) {
        if limit <= Decimal::ZERO {
            if let Some(map) = self.portfolios.get_mut(portfolio_id) {
                map.set(category, limit);
            }
            return;
        }
        self.portfolios
            .entry(portfolio_id.to_string())
            .or_default()
            .set(category, limit);
    }

    pub fn remove_portfolio(&mut self, portfolio_id: &str) -> Option<BudgetMap> {
        self.portfolios.remove(portfolio_id)
    }

    /// Blank currencies from older writers fall back to the default.
    pub(crate) fn normalized(mut self) -> Self {
        let ccy = self.default_currency.trim().to_uppercase();
        self.default_currency = if ccy.is_empty() {
            default_currency()
        } else {
            ccy
        };
        self
    }
}
