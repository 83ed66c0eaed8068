// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Versioned persistence of the budget configuration.
//!
//! Reads always produce the current shape. The newest key present wins; older
//! payloads are reshaped in memory and never rewritten. A payload that does not
//! parse is treated as if its key were absent.

use anyhow::Result;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

use super::map::{BudgetMap, MultiScopeBudget};

pub const KEY_V5: &str = "budgets_v5";
pub const KEY_V4: &str = "budgets_v4";
pub const KEY_V3: &str = "budgets_v3";
pub const KEY_V1: &str = "budgets_v1";

const GLOBAL_PROFILE: &str = "global";

/// Key/value home of user preferences such as the budget payloads.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process preference store, handy for sessions that do not persist.
#[derive(Debug, Default)]
pub struct MemoryPreferences(RefCell<BTreeMap<String, String>>);

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(entries: impl IntoIterator<Item = (&'static str, String)>) -> Self {
        let prefs = Self::new();
        prefs
            .0
            .borrow_mut()
            .extend(entries.into_iter().map(|(k, v)| (k.to_string(), v)));
        prefs
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.0.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.0.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    V1,
    V3,
    V4,
    V5,
    /// Nothing usable was stored.
    Empty,
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchemaVersion::V1 => "v1",
            SchemaVersion::V3 => "v3",
            SchemaVersion::V4 => "v4",
            SchemaVersion::V5 => "v5",
            SchemaVersion::Empty => "empty",
        };
        f.write_str(s)
    }
}

/// Result of a load: the current-shape config plus the transient legacy global
/// map, kept apart so it can never be written back with the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedBudgets {
    pub config: MultiScopeBudget,
    pub legacy_global: Option<BudgetMap>,
    pub source: SchemaVersion,
}

impl LoadedBudgets {
    pub fn is_migrated(&self) -> bool {
        !matches!(self.source, SchemaVersion::V5 | SchemaVersion::Empty)
    }

    /// Copies the legacy global map into the default page when that page has no
    /// map yet. Returns true when the config changed and should be saved.
    pub fn backfill_legacy(&mut self, default_portfolio_id: &str) -> bool {
        let Some(legacy) = self.legacy_global.as_ref() else {
            return false;
        };
        if legacy.is_empty() || self.config.portfolios.contains_key(default_portfolio_id) {
            return false;
        }
        debug!(
            portfolio = default_portfolio_id,
            "backfilling legacy global budget into default page"
        );
        self.config
            .portfolios
            .insert(default_portfolio_id.to_string(), legacy.clone());
        self.legacy_global = None;
        true
    }

    /// v3 gave every page without an assignment the `"global"` profile. Copies
    /// that profile into each listed page that still has no map. Returns true
    /// when the config changed and should be saved.
    pub fn fill_unassigned<'a>(
        &mut self,
        portfolio_ids: impl IntoIterator<Item = &'a str>,
    ) -> bool {
        if self.source != SchemaVersion::V3 {
            return false;
        }
        let Some(global) = self.legacy_global.as_ref() else {
            return false;
        };
        let mut changed = false;
        for id in portfolio_ids {
            if !self.config.portfolios.contains_key(id) {
                debug!(portfolio = id, "unassigned page inherits v3 global profile");
                self.config.portfolios.insert(id.to_string(), global.clone());
                changed = true;
            }
        }
        changed
    }
}

struct Migrated {
    config: MultiScopeBudget,
    legacy_global: Option<BudgetMap>,
}

type MigrateFn = fn(&str) -> Option<Migrated>;

/// Newest first.
const CHAIN: &[(SchemaVersion, &str, MigrateFn)] = &[
    (SchemaVersion::V5, KEY_V5, from_v5),
    (SchemaVersion::V4, KEY_V4, from_v4),
    (SchemaVersion::V3, KEY_V3, from_v3),
    (SchemaVersion::V1, KEY_V1, from_v1),
];

pub fn load(store: &impl PreferenceStore) -> LoadedBudgets {
    for (version, key, migrate) in CHAIN {
        let raw = match store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(e) => {
                warn!(key = *key, error = %e, "could not read budget payload, skipping");
                continue;
            }
        };
        match migrate(&raw) {
            Some(m) => {
                if *version != SchemaVersion::V5 {
                    debug!(from = %version, "migrated budget payload to v5");
                }
                return LoadedBudgets {
                    config: m.config.normalized(),
                    legacy_global: m.legacy_global.filter(|g| !g.is_empty()),
                    source: *version,
                };
            }
            None => warn!(key = *key, "malformed budget payload, falling through"),
        }
    }
    LoadedBudgets {
        config: MultiScopeBudget::default(),
        legacy_global: None,
        source: SchemaVersion::Empty,
    }
}

/// Writes the current shape under the current key only.
pub fn save(store: &impl PreferenceStore, config: &MultiScopeBudget) -> Result<()> {
    let payload = serde_json::to_string(config)?;
    store.set(KEY_V5, &payload)
}

fn from_v5(raw: &str) -> Option<Migrated> {
    let config: MultiScopeBudget = serde_json::from_str(raw).ok()?;
    Some(Migrated {
        config,
        legacy_global: None,
    })
}

#[derive(Deserialize)]
struct V4 {
    #[serde(default)]
    portfolios: BTreeMap<String, BudgetMap>,
    #[serde(default)]
    global: BudgetMap,
}

fn from_v4(raw: &str) -> Option<Migrated> {
    let v4: V4 = serde_json::from_str(raw).ok()?;
    Some(Migrated {
        config: MultiScopeBudget::with_portfolios(v4.portfolios),
        legacy_global: Some(v4.global),
    })
}

#[derive(Deserialize)]
struct V3Profile {
    id: String,
    #[serde(default, alias = "limits")]
    budgets: BudgetMap,
}

#[derive(Deserialize)]
struct V3 {
    #[serde(default)]
    profiles: Vec<V3Profile>,
    #[serde(default)]
    assignments: BTreeMap<String, String>,
}

fn from_v3(raw: &str) -> Option<Migrated> {
    let v3: V3 = serde_json::from_str(raw).ok()?;
    let profiles: BTreeMap<&str, &BudgetMap> = v3
        .profiles
        .iter()
        .map(|p| (p.id.as_str(), &p.budgets))
        .collect();
    let global = profiles.get(GLOBAL_PROFILE).copied();

    let portfolios = v3
        .assignments
        .iter()
        .filter_map(|(portfolio_id, profile_id)| {
            profiles
                .get(profile_id.as_str())
                .copied()
                .or(global)
                .map(|m| (portfolio_id.clone(), m.clone()))
        })
        .collect();

    Some(Migrated {
        config: MultiScopeBudget::with_portfolios(portfolios),
        legacy_global: global.cloned(),
    })
}

fn from_v1(raw: &str) -> Option<Migrated> {
    let flat: BudgetMap = serde_json::from_str(raw).ok()?;
    Some(Migrated {
        config: MultiScopeBudget::default(),
        legacy_global: Some(flat),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::ExpenseCategory;
    use rust_decimal::Decimal;

    #[test]
    fn empty_store_loads_default() {
        let loaded = load(&MemoryPreferences::new());
        assert_eq!(loaded.source, SchemaVersion::Empty);
        assert!(loaded.config.portfolios.is_empty());
        assert_eq!(loaded.config.default_currency, "USD");
        assert!(loaded.legacy_global.is_none());
    }

    #[test]
    fn v3_assignment_to_missing_profile_uses_global() {
        let raw = r#"{
            "profiles": [
                {"id": "global", "name": "Default", "budgets": {"Parking": 30}},
                {"id": "trip", "name": "Trip", "budgets": {"Hotel": 500}}
            ],
            "assignments": {"p1": "trip", "p2": "gone"}
        }"#;
        let prefs = MemoryPreferences::with([(KEY_V3, raw.to_string())]);
        let loaded = load(&prefs);
        assert_eq!(loaded.source, SchemaVersion::V3);
        let p1 = loaded.config.portfolio("p1").unwrap();
        assert_eq!(p1.limit(ExpenseCategory::Hotel), Decimal::from(500));
        let p2 = loaded.config.portfolio("p2").unwrap();
        assert_eq!(p2.limit(ExpenseCategory::Parking), Decimal::from(30));
        assert_eq!(
            loaded
                .legacy_global
                .unwrap()
                .limit(ExpenseCategory::Parking),
            Decimal::from(30)
        );
    }

    #[test]
    fn v3_without_global_drops_dangling_assignment() {
        let raw = r#"{"profiles": [], "assignments": {"p1": "missing"}}"#;
        let prefs = MemoryPreferences::with([(KEY_V3, raw.to_string())]);
        let loaded = load(&prefs);
        assert!(loaded.config.portfolios.is_empty());
        assert!(loaded.legacy_global.is_none());
    }

    #[test]
    fn v3_global_fills_only_pages_without_a_map() {
        let raw = r#"{
            "profiles": [
                {"id": "global", "budgets": {"Parking": 30}},
                {"id": "trip", "budgets": {"Hotel": 500}}
            ],
            "assignments": {"p1": "trip"}
        }"#;
        let mut loaded = load(&MemoryPreferences::with([(KEY_V3, raw.to_string())]));
        assert!(loaded.fill_unassigned(["p1", "p2"]));
        let p1 = loaded.config.portfolio("p1").unwrap();
        assert_eq!(p1.limit(ExpenseCategory::Parking), Decimal::ZERO);
        let p2 = loaded.config.portfolio("p2").unwrap();
        assert_eq!(p2.limit(ExpenseCategory::Parking), Decimal::from(30));
        assert!(!loaded.fill_unassigned(["p1", "p2"]));
    }

    #[test]
    fn fill_unassigned_ignores_newer_schemas() {
        let prefs = MemoryPreferences::with([(
            KEY_V4,
            r#"{"portfolios": {}, "global": {"Toll": 9}}"#.to_string(),
        )]);
        let mut loaded = load(&prefs);
        assert!(!loaded.fill_unassigned(["p1", "p2"]));
        assert!(loaded.config.portfolios.is_empty());
    }

    #[test]
    fn backfill_only_when_default_page_has_no_map() {
        let prefs = MemoryPreferences::with([(
            KEY_V4,
            r#"{"portfolios": {"p1": {"Toll": 5}}, "global": {"Toll": 9}}"#.to_string(),
        )]);
        let mut loaded = load(&prefs);
        assert!(!loaded.backfill_legacy("p1"));
        assert!(loaded.legacy_global.is_some());
        assert!(loaded.backfill_legacy("p2"));
        assert!(loaded.legacy_global.is_none());
        assert_eq!(
            loaded.config.portfolio("p2").unwrap().limit(ExpenseCategory::Toll),
            Decimal::from(9)
        );
    }
}
