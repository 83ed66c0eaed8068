// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use crate::budget::{self, BudgetContext, LoadedBudgets};
use crate::ledger;
use crate::models::{ExpenseRecord, Portfolio, default_portfolio, find_portfolio};

/// In-memory state for one run: pages, expenses and the migrated budgets.
#[derive(Debug, Clone)]
pub struct Session {
    pub portfolios: Vec<Portfolio>,
    pub expenses: Vec<ExpenseRecord>,
    pub budgets: LoadedBudgets,
}

impl Session {
    /// Loads everything, making sure a default page exists and folding any
    /// legacy global budget into it the first time one is found.
    pub fn open(conn: &Connection) -> Result<Self> {
        let portfolios = ledger::ensure_default_portfolio(conn)?;
        let expenses = ledger::list_expenses(conn)?;
        let mut budgets = budget::load(conn);
        if budgets.fill_unassigned(portfolios.iter().map(|p| p.id.as_str())) {
            budget::save(conn, &budgets.config)?;
            info!("applied v3 global budget profile to unassigned pages");
        }
        if let Some(def) = default_portfolio(&portfolios) {
            if budgets.backfill_legacy(&def.id) {
                budget::save(conn, &budgets.config)?;
                info!(
                    "moved legacy budget ({}) into page '{}'",
                    budgets.source, def.name
                );
            }
        }
        Ok(Self {
            portfolios,
            expenses,
            budgets,
        })
    }

    pub fn context(&self) -> BudgetContext<'_> {
        BudgetContext::new(&self.budgets, &self.portfolios)
    }

    pub fn default_portfolio(&self) -> Option<&Portfolio> {
        default_portfolio(&self.portfolios)
    }

    /// Resolves an optional page argument (id or name) to a page id, falling
    /// back to the default page.
    pub fn page_id(&self, key: Option<&str>) -> Result<String> {
        match key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(k) => find_portfolio(&self.portfolios, k)
                .map(|p| p.id.clone())
                .ok_or_else(|| crate::Error::PortfolioNotFound(k.to_string()).into()),
            None => self
                .default_portfolio()
                .map(|p| p.id.clone())
                .ok_or_else(|| crate::Error::PortfolioNotFound("(default)".into()).into()),
        }
    }

    pub fn page_name(&self, id: &str) -> String {
        self.portfolios
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    /// Expenses counted toward a page, unassigned ones included for the
    /// default page.
    pub fn page_expenses(&self, page_id: &str) -> Vec<ExpenseRecord> {
        let default_id = self.default_portfolio().map(|p| p.id.as_str());
        self.expenses
            .iter()
            .filter(|e| e.belongs_to(page_id, default_id))
            .cloned()
            .collect()
    }

    pub fn save_budgets(&self, conn: &Connection) -> Result<()> {
        budget::save(conn, &self.budgets.config)
    }
}
