// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Fixed set of expense categories. The label is the persisted form and the
/// key used by budget maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ExpenseCategory {
    FoodDining,
    Parking,
    Toll,
    Optical,
    Dental,
    Clinic,
    Mileage,
    Airport,
    Transport,
    Utility,
    Repair,
    HouseTax,
    Flight,
    Hotel,
    #[default]
    Others,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 15] = [
        ExpenseCategory::FoodDining,
        ExpenseCategory::Parking,
        ExpenseCategory::Toll,
        ExpenseCategory::Optical,
        ExpenseCategory::Dental,
        ExpenseCategory::Clinic,
        ExpenseCategory::Mileage,
        ExpenseCategory::Airport,
        ExpenseCategory::Transport,
        ExpenseCategory::Utility,
        ExpenseCategory::Repair,
        ExpenseCategory::HouseTax,
        ExpenseCategory::Flight,
        ExpenseCategory::Hotel,
        ExpenseCategory::Others,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ExpenseCategory::FoodDining => "Food & Dining",
            ExpenseCategory::Parking => "Parking",
            ExpenseCategory::Toll => "Toll",
            ExpenseCategory::Optical => "Optical",
            ExpenseCategory::Dental => "Dental",
            ExpenseCategory::Clinic => "Clinic & Medical",
            ExpenseCategory::Mileage => "Mileage",
            ExpenseCategory::Airport => "Airport Transfer",
            ExpenseCategory::Transport => "Transport",
            ExpenseCategory::Utility => "Utility Bills",
            ExpenseCategory::Repair => "Repair & Maintenance",
            ExpenseCategory::HouseTax => "House Tax",
            ExpenseCategory::Flight => "Flight",
            ExpenseCategory::Hotel => "Hotel",
            ExpenseCategory::Others => "Others",
        }
    }

    /// Case-insensitive label lookup; surrounding whitespace is ignored.
    pub fn from_label(s: &str) -> Option<Self> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(needle))
    }

    /// Like [`from_label`](Self::from_label) but anything unknown lands in `Others`,
    /// which is how extracted receipts with a made-up category are kept.
    pub fn from_label_lossy(s: &str) -> Self {
        Self::from_label(s).unwrap_or(ExpenseCategory::Others)
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExpenseCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| Error::UnknownCategory(s.trim().to_string()))
    }
}

impl Serialize for ExpenseCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ExpenseCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .map(ExpenseCategory::from_label_lossy)
            .unwrap_or_default())
    }
}
