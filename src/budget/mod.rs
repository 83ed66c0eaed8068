// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod map;
mod resolve;
mod status;
pub mod store;
mod warning;

pub use map::{BudgetMap, DEFAULT_CURRENCY, MultiScopeBudget};
pub use resolve::BudgetContext;
pub use status::{CategoryStatus, budget_status};
pub use store::{LoadedBudgets, MemoryPreferences, PreferenceStore, SchemaVersion, load, save};
pub use warning::{BudgetWarning, WarningScope, category_total, evaluate};
