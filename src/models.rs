// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::category::ExpenseCategory;
use crate::utils::deserialize_lenient_amount;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpenseRecord {
    pub id: String,
    pub vendor_name: String,
    pub date: String, // YYYY-MM-DD, or the raw text when it could not be normalized
    #[serde(deserialize_with = "deserialize_lenient_amount")]
    pub amount: Decimal,
    pub currency: String,
    pub category: ExpenseCategory,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub portfolio_id: Option<String>,
    pub receipt_id: Option<String>,
    pub file_name: Option<String>,
}

impl ExpenseRecord {
    /// Whether this record counts toward `portfolio_id`. Unassigned records
    /// belong to the default page.
    pub fn belongs_to(&self, portfolio_id: &str, default_portfolio_id: Option<&str>) -> bool {
        match self.portfolio_id.as_deref() {
            Some(p) => p == portfolio_id,
            None => default_portfolio_id == Some(portfolio_id),
        }
    }
}

/// A named page that expenses and budgets attach to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_default: bool,
}

/// The page that owns unassigned expenses and the legacy budget fallback:
/// the one flagged default, else the earliest created (list order breaks ties).
pub fn default_portfolio(portfolios: &[Portfolio]) -> Option<&Portfolio> {
    portfolios.iter().find(|p| p.is_default).or_else(|| {
        portfolios
            .iter()
            .enumerate()
            .min_by_key(|(ix, p)| (p.created_at, *ix))
            .map(|(_, p)| p)
    })
}

/// Finds a page by id, then by case-insensitive name.
pub fn find_portfolio<'a>(portfolios: &'a [Portfolio], key: &str) -> Option<&'a Portfolio> {
    let key = key.trim();
    portfolios
        .iter()
        .find(|p| p.id == key)
        .or_else(|| portfolios.iter().find(|p| p.name.eq_ignore_ascii_case(key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn page(id: &str, secs: i64, is_default: bool) -> Portfolio {
        Portfolio {
            id: id.into(),
            name: id.to_uppercase(),
            user_id: "u1".into(),
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
            is_default,
        }
    }

    #[test]
    fn default_prefers_flag_then_creation_order() {
        let pages = vec![page("b", 20, false), page("a", 10, false)];
        assert_eq!(default_portfolio(&pages).unwrap().id, "a");

        let flagged = vec![page("b", 20, true), page("a", 10, false)];
        assert_eq!(default_portfolio(&flagged).unwrap().id, "b");

        let tied = vec![page("x", 5, false), page("y", 5, false)];
        assert_eq!(default_portfolio(&tied).unwrap().id, "x");

        assert!(default_portfolio(&[]).is_none());
    }

    #[test]
    fn unassigned_records_belong_to_default_page() {
        let rec = ExpenseRecord::default();
        assert!(rec.belongs_to("p1", Some("p1")));
        assert!(!rec.belongs_to("p2", Some("p1")));
        assert!(!rec.belongs_to("p1", None));
    }

    #[test]
    fn record_deserializes_leniently() {
        let rec: ExpenseRecord = serde_json::from_str(
            r#"{"id":"e1","vendorName":"Kopi","amount":"oops","category":"Teleport"}"#,
        )
        .unwrap();
        assert_eq!(rec.amount, Decimal::ZERO);
        assert_eq!(rec.category, ExpenseCategory::Others);
        assert!(rec.portfolio_id.is_none());
    }
}
