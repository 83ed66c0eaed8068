// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot delete '{0}': it is the only page left")]
    LastPortfolio(String),
    #[error("Page '{0}' not found")]
    PortfolioNotFound(String),
    #[error("Expense '{0}' not found")]
    ExpenseNotFound(String),
    #[error("Unknown category '{0}'")]
    UnknownCategory(String),
    #[error("Amount must not be negative, got {0}")]
    NegativeAmount(String),
    #[error("Invalid sort field '{0}', expected date|amount|vendor")]
    InvalidSortField(String),
    #[error("Unknown plan '{0}'")]
    UnknownPlan(String),
    #[error("Receipt upload not allowed: {0}")]
    UploadDenied(String),
}
