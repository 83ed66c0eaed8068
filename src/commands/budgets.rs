// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

use super::{json_flags, required};
use crate::budget::budget_status;
use crate::category::ExpenseCategory;
use crate::session::Session;
use crate::utils::{fmt_money, maybe_print_json, parse_amount, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("status", sub)) => status(conn, sub)?,
        Some(("currency", sub)) => currency(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Sets one category limit on a page; zero clears it.
fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut session = Session::open(conn)?;
    let page_id = session.page_id(sub.get_one::<String>("page").map(String::as_str))?;
    let category: ExpenseCategory = required(sub, "category")?.parse()?;
    let amount = parse_amount(required(sub, "amount")?)?;
    session.budgets.config.set_limit(&page_id, category, amount);
    session.save_budgets(conn)?;
    if amount.is_zero() {
        println!("Cleared {} limit on '{}'", category, session.page_name(&page_id));
    } else {
        println!(
            "Budget set for {} on '{}' = {}",
            category,
            session.page_name(&page_id),
            fmt_money(&amount, &session.budgets.config.default_currency)
        );
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let session = Session::open(conn)?;
    let page_id = session.page_id(sub.get_one::<String>("page").map(String::as_str))?;
    let ctx = session.context();
    let map = ctx.effective_map(&page_id);
    if json_flag || jsonl_flag {
        let payload = json!({
            "page": session.page_name(&page_id),
            "currency": ctx.currency(),
            "limits": map,
        });
        maybe_print_json(json_flag, jsonl_flag, &payload)?;
        return Ok(());
    }
    let rows = map
        .iter()
        .map(|(c, limit)| vec![c.to_string(), fmt_money(&limit, ctx.currency())])
        .collect();
    println!("Page: {}", session.page_name(&page_id));
    println!("{}", pretty_table(&["Category", "Limit"], rows));
    Ok(())
}

fn status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let session = Session::open(conn)?;
    let page_id = session.page_id(sub.get_one::<String>("page").map(String::as_str))?;
    let ctx = session.context();
    let lines = budget_status(&ctx, &page_id, &session.expenses);
    if maybe_print_json(json_flag, jsonl_flag, &lines)? {
        return Ok(());
    }
    let ccy = ctx.currency();
    let rows = lines
        .iter()
        .map(|s| {
            vec![
                s.category.to_string(),
                fmt_money(&s.spent, ccy),
                if s.limit.is_zero() {
                    "-".into()
                } else {
                    fmt_money(&s.limit, ccy)
                },
                s.percent_used()
                    .map(|p| format!("{}%", p))
                    .unwrap_or_else(|| "-".into()),
                if s.over_budget { "OVER" } else { "" }.to_string(),
            ]
        })
        .collect();
    println!("Page: {}", session.page_name(&page_id));
    println!(
        "{}",
        pretty_table(&["Category", "Spent", "Limit", "Used", ""], rows)
    );
    Ok(())
}

fn currency(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut session = Session::open(conn)?;
    let code = required(sub, "code")?.trim().to_uppercase();
    anyhow::ensure!(
        code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()),
        "Currency must be a 3-letter code, got '{}'",
        code
    );
    session.budgets.config.default_currency = code.clone();
    session.save_budgets(conn)?;
    println!("Default currency set to {}", code);
    Ok(())
}
