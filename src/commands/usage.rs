// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{NaiveTime, Utc};
use rusqlite::Connection;
use tracing::info;

use super::{json_flags, required};
use crate::error::Error;
use crate::ledger;
use crate::plan::{self, MeterOutcome, Plan, UploadDecision, UserProfile};
use crate::utils::{maybe_print_json, parse_date, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("status", sub)) => status(conn, sub)?,
        Some(("record", sub)) => {
            let count = sub.get_one::<u32>("count").copied().unwrap_or(1);
            let p = record(conn, count)?;
            println!(
                "Recorded {} scan(s); {} of {} used this month",
                count, p.docs_used_this_month, p.monthly_docs_limit
            );
        }
        Some(("plan", sub)) => set_plan(conn, sub)?,
        Some(("meter", _)) => meter(conn)?,
        _ => {}
    }
    Ok(())
}

/// The stored profile with trial and expiry state brought up to date.
pub fn current_profile(conn: &Connection) -> Result<UserProfile> {
    let stored = ledger::load_profile(conn)?;
    let fresh = plan::refresh_status(&stored, Utc::now());
    if fresh != stored {
        ledger::save_profile(conn, &fresh)?;
        info!(plan = %fresh.plan, trial = fresh.is_trial_active, "profile status changed");
    }
    Ok(fresh)
}

fn status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let p = current_profile(conn)?;
    if maybe_print_json(json_flag, jsonl_flag, &p)? {
        return Ok(());
    }
    let plan_name = plan::tier_for(p.plan)
        .map(|t| t.name.to_string())
        .unwrap_or_else(|| {
            if p.is_trial_active {
                "Free trial".into()
            } else {
                "Free".into()
            }
        });
    let rows = vec![
        vec!["Plan".into(), plan_name],
        vec![
            "Used this month".into(),
            format!("{} / {}", p.docs_used_this_month, p.monthly_docs_limit),
        ],
        vec!["Remaining".into(), p.remaining().to_string()],
        vec![
            "Expires".into(),
            p.subscription_expiry
                .map(|e| e.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|| "-".into()),
        ],
    ];
    println!("{}", pretty_table(&["", ""], rows));
    println!();
    let tiers = plan::pricing_tiers()
        .into_iter()
        .map(|t| {
            vec![
                t.name.to_string(),
                t.limit.to_string(),
                format!("{:.2}", t.price),
                t.description.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Tier", "Docs / month", "Price", "For"], tiers)
    );
    Ok(())
}

/// Counts `count` receipt scans against the monthly allowance, refusing when
/// the plan does not allow them.
pub fn record(conn: &Connection, count: u32) -> Result<UserProfile> {
    let p = current_profile(conn)?;
    if let UploadDecision::Denied(reason) = plan::can_upload(&p, count, Utc::now()) {
        return Err(Error::UploadDenied(reason.to_string()).into());
    }
    let updated = plan::record_usage(&p, count);
    ledger::save_profile(conn, &updated)?;
    Ok(updated)
}

fn set_plan(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let new_plan: Plan = required(sub, "plan")?.parse()?;
    let mut p = ledger::load_profile(conn)?;
    p.plan = new_plan;
    match plan::tier_for(new_plan) {
        Some(tier) => {
            p.monthly_docs_limit = tier.limit;
            p.is_trial_active = false;
            p.subscription_expiry = match sub.get_one::<String>("expiry") {
                Some(d) => Some(parse_date(d)?.and_time(NaiveTime::MIN).and_utc()),
                None => None,
            };
        }
        None => {
            p.subscription_expiry = None;
        }
    }
    let p = plan::refresh_status(&p, Utc::now());
    ledger::save_profile(conn, &p)?;
    println!(
        "Plan set to {} ({} docs / month)",
        p.plan, p.monthly_docs_limit
    );
    Ok(())
}

fn meter(conn: &Connection) -> Result<()> {
    let mut p = current_profile(conn)?;
    let usage = p.docs_used_this_month;
    match plan::meter_delta(&p, usage) {
        MeterOutcome::Report { delta } => {
            p.last_billed_usage = usage;
            ledger::save_profile(conn, &p)?;
            info!(delta, usage, "usage metered");
            println!("Billable usage since last report: {}", delta);
        }
        MeterOutcome::NothingNew => println!("No new usage to report"),
        MeterOutcome::OverCustomLimit { limit } => {
            println!("Usage {} exceeds the custom limit of {}; not reported", usage, limit)
        }
    }
    Ok(())
}
