// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Subscription plans and receipt-scan metering.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub const TRIAL_DAYS: i64 = 7;
pub const TRIAL_DOCS_LIMIT: u32 = 10;
pub const EXPIRY_GRACE_HOURS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Basic,
    Pro,
    Business,
}

impl Plan {
    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Basic => "basic",
            Plan::Pro => "pro",
            Plan::Business => "business",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "basic" => Ok(Plan::Basic),
            "pro" => Ok(Plan::Pro),
            "business" => Ok(Plan::Business),
            other => Err(Error::UnknownPlan(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PricingTier {
    pub plan: Plan,
    pub name: &'static str,
    pub limit: u32,
    pub price: Decimal,
    pub description: &'static str,
}

pub fn pricing_tiers() -> Vec<PricingTier> {
    vec![
        PricingTier {
            plan: Plan::Basic,
            name: "Personal (Basic)",
            limit: 30,
            price: Decimal::new(1590, 2),
            description: "For individuals managing monthly bills.",
        },
        PricingTier {
            plan: Plan::Pro,
            name: "Freelancer (Pro)",
            limit: 100,
            price: Decimal::new(3990, 2),
            description: "For agents, freelancers & power users.",
        },
        PricingTier {
            plan: Plan::Business,
            name: "SME (Business)",
            limit: 500,
            price: Decimal::new(8990, 2),
            description: "For small businesses and teams.",
        },
    ]
}

pub fn tier_for(plan: Plan) -> Option<PricingTier> {
    pricing_tiers().into_iter().find(|t| t.plan == plan)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub plan: Plan,
    pub subscription_expiry: Option<DateTime<Utc>>,
    pub monthly_docs_limit: u32,
    pub docs_used_this_month: u32,
    pub trial_start: DateTime<Utc>,
    pub is_trial_active: bool,
    pub is_admin: bool,
    pub last_billed_usage: u32,
    pub custom_usage_limit: Option<u32>,
}

impl UserProfile {
    /// A fresh profile on the free trial.
    pub fn new_trial(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            plan: Plan::Free,
            subscription_expiry: None,
            monthly_docs_limit: TRIAL_DOCS_LIMIT,
            docs_used_this_month: 0,
            trial_start: now,
            is_trial_active: true,
            is_admin: false,
            last_billed_usage: 0,
            custom_usage_limit: None,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.monthly_docs_limit
            .saturating_sub(self.docs_used_this_month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    TrialLimit,
    PlanLimit,
    Expired,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DenyReason::TrialLimit => "free trial limit reached",
            DenyReason::PlanLimit => "monthly plan limit reached",
            DenyReason::Expired => "subscription or trial expired",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UploadDecision {
    Allowed,
    Denied(DenyReason),
}

impl UploadDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, UploadDecision::Allowed)
    }
}

/// Re-derives trial and expiry state as of `now`.
pub fn refresh_status(profile: &UserProfile, now: DateTime<Utc>) -> UserProfile {
    let mut p = profile.clone();
    if p.plan == Plan::Free {
        p.is_trial_active = now - p.trial_start <= Duration::days(TRIAL_DAYS);
        if p.is_trial_active && p.monthly_docs_limit == 0 {
            p.monthly_docs_limit = TRIAL_DOCS_LIMIT;
        }
    } else {
        p.is_trial_active = false;
        if let Some(expiry) = p.subscription_expiry {
            if now > expiry {
                p.plan = Plan::Free;
                p.monthly_docs_limit = 0;
                p.subscription_expiry = None;
            }
        }
    }
    p
}

pub fn can_upload(profile: &UserProfile, count: u32, now: DateTime<Utc>) -> UploadDecision {
    if profile.is_admin {
        return UploadDecision::Allowed;
    }
    let over = profile.docs_used_this_month.saturating_add(count) > profile.monthly_docs_limit;
    match profile.plan {
        Plan::Free if profile.is_trial_active => {
            if over {
                UploadDecision::Denied(DenyReason::TrialLimit)
            } else {
                UploadDecision::Allowed
            }
        }
        Plan::Free => UploadDecision::Denied(DenyReason::Expired),
        _ => {
            let lapsed = profile
                .subscription_expiry
                .is_some_and(|e| now > e + Duration::hours(EXPIRY_GRACE_HOURS));
            if lapsed {
                UploadDecision::Denied(DenyReason::Expired)
            } else if over {
                UploadDecision::Denied(DenyReason::PlanLimit)
            } else {
                UploadDecision::Allowed
            }
        }
    }
}

pub fn record_usage(profile: &UserProfile, count: u32) -> UserProfile {
    let mut p = profile.clone();
    p.docs_used_this_month = p.docs_used_this_month.saturating_add(count);
    p
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum MeterOutcome {
    Report { delta: u32 },
    NothingNew,
    OverCustomLimit { limit: u32 },
}

/// Billable usage since the last report. The caller marks `usage` as billed
/// once the report went out.
pub fn meter_delta(profile: &UserProfile, usage: u32) -> MeterOutcome {
    if let Some(limit) = profile.custom_usage_limit {
        if limit > 0 && usage > limit {
            return MeterOutcome::OverCustomLimit { limit };
        }
    }
    match usage.checked_sub(profile.last_billed_usage) {
        Some(delta) if delta > 0 => MeterOutcome::Report { delta },
        _ => MeterOutcome::NothingNew,
    }
}
