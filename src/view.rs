// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Filter and sort pipeline behind the expense list.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::category::ExpenseCategory;
use crate::error::Error;
use crate::models::{ExpenseRecord, Portfolio, default_portfolio};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(ExpenseCategory),
}

impl FromStr for CategoryFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Date,
    Amount,
    VendorName,
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(SortField::Date),
            "amount" => Ok(SortField::Amount),
            "vendor" | "vendorname" | "vendor_name" => Ok(SortField::VendorName),
            other => Err(Error::InvalidSortField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default)]
pub struct ViewCriteria {
    pub search: String,
    pub category: CategoryFilter,
    pub active_portfolio: Option<String>,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

/// How page membership is decided for one run of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortfolioScope<'a> {
    /// Pages have not loaded yet; page matching is skipped so startup never
    /// shows an empty list.
    NotLoaded,
    /// No active page chosen.
    Any,
    Active {
        id: &'a str,
        includes_unassigned: bool,
    },
}

impl<'a> PortfolioScope<'a> {
    pub fn new(portfolios: &'a [Portfolio], active: Option<&'a str>) -> Self {
        if portfolios.is_empty() {
            return PortfolioScope::NotLoaded;
        }
        match active {
            None => PortfolioScope::Any,
            Some(id) => PortfolioScope::Active {
                id,
                includes_unassigned: default_portfolio(portfolios).is_some_and(|p| p.id == id),
            },
        }
    }

    pub fn admits(&self, e: &ExpenseRecord) -> bool {
        match self {
            PortfolioScope::NotLoaded | PortfolioScope::Any => true,
            PortfolioScope::Active {
                id,
                includes_unassigned,
            } => match e.portfolio_id.as_deref() {
                Some(p) => p == *id,
                None => *includes_unassigned,
            },
        }
    }
}

fn matches_search(e: &ExpenseRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    e.vendor_name.to_lowercase().contains(needle)
        || e
            .summary
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(needle))
}

fn compare(a: &ExpenseRecord, b: &ExpenseRecord, field: SortField) -> Ordering {
    match field {
        SortField::Date => a.date.to_lowercase().cmp(&b.date.to_lowercase()),
        SortField::Amount => a.amount.cmp(&b.amount),
        SortField::VendorName => a
            .vendor_name
            .to_lowercase()
            .cmp(&b.vendor_name.to_lowercase()),
    }
}

pub fn filter_and_sort<'a>(
    expenses: &'a [ExpenseRecord],
    portfolios: &[Portfolio],
    criteria: &ViewCriteria,
) -> Vec<&'a ExpenseRecord> {
    let needle = criteria.search.trim().to_lowercase();
    let scope = PortfolioScope::new(portfolios, criteria.active_portfolio.as_deref());
    let mut out: Vec<&ExpenseRecord> = expenses
        .iter()
        .filter(|e| matches_search(e, &needle))
        .filter(|e| match criteria.category {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => e.category == c,
        })
        .filter(|e| scope.admits(e))
        .collect();
    // stable: equal keys keep insertion order in both directions
    match criteria.sort_order {
        SortOrder::Asc => out.sort_by(|a, b| compare(a, b, criteria.sort_field)),
        SortOrder::Desc => out.sort_by(|a, b| compare(b, a, criteria.sort_field)),
    }
    out
}
