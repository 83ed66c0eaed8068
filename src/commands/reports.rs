// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

use super::json_flags;
use crate::session::Session;
use crate::stats::{aggregate, monthly_trend, top_vendors};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("vendors", sub)) => vendors(conn, sub)?,
        Some(("monthly", sub)) => monthly(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let session = Session::open(conn)?;
    let page_id = session.page_id(sub.get_one::<String>("page").map(String::as_str))?;
    let stats = aggregate(&session.page_expenses(&page_id));
    if maybe_print_json(json_flag, jsonl_flag, &stats)? {
        return Ok(());
    }
    let ccy = session.context().currency();
    println!("Page: {}", session.page_name(&page_id));
    println!("Expenses: {}", stats.count);
    println!("Total: {}", fmt_money(&stats.total, ccy));
    println!("Average: {}", fmt_money(&stats.average, ccy));
    if let Some((month, value)) = &stats.peak_month {
        println!("Peak month: {} ({})", month, fmt_money(value, ccy));
    }
    let rows = stats
        .category_breakdown
        .iter()
        .map(|(c, v)| vec![c.to_string(), fmt_money(v, ccy)])
        .collect();
    println!("{}", pretty_table(&["Category", "Spent"], rows));
    Ok(())
}

fn vendors(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let session = Session::open(conn)?;
    let page_id = session.page_id(sub.get_one::<String>("page").map(String::as_str))?;
    let n = sub.get_one::<usize>("top").copied().unwrap_or(5);
    let top = top_vendors(&session.page_expenses(&page_id), n);
    let items: Vec<_> = top
        .iter()
        .map(|(vendor, total)| json!({ "vendor": vendor, "total": total }))
        .collect();
    if maybe_print_json(json_flag, jsonl_flag, &items)? {
        return Ok(());
    }
    let ccy = session.context().currency();
    let rows = top
        .iter()
        .map(|(vendor, total)| vec![vendor.clone(), fmt_money(total, ccy)])
        .collect();
    println!("{}", pretty_table(&["Vendor", "Spent"], rows));
    Ok(())
}

fn monthly(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let session = Session::open(conn)?;
    let page_id = session.page_id(sub.get_one::<String>("page").map(String::as_str))?;
    let trend = monthly_trend(&session.page_expenses(&page_id));
    let items: Vec<_> = trend
        .iter()
        .map(|(month, total)| json!({ "month": month, "total": total }))
        .collect();
    if maybe_print_json(json_flag, jsonl_flag, &items)? {
        return Ok(());
    }
    let ccy = session.context().currency();
    let rows = trend
        .iter()
        .map(|(month, total)| vec![month.clone(), fmt_money(total, ccy)])
        .collect();
    println!("{}", pretty_table(&["Month", "Spent"], rows));
    Ok(())
}
