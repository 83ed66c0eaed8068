// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use super::{json_flags, required};
use crate::ledger;
use crate::models::default_portfolio;
use crate::session::Session;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rename", sub)) => rename(conn, sub)?,
        Some(("default", sub)) => make_default(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    ledger::ensure_default_portfolio(conn)?;
    let p = ledger::add_portfolio(conn, required(sub, "name")?)?;
    println!("Page added: {} ({})", p.name, p.id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let pages = ledger::ensure_default_portfolio(conn)?;
    let def = default_portfolio(&pages).map(|p| p.id.clone());
    if maybe_print_json(json_flag, jsonl_flag, &pages)? {
        return Ok(());
    }
    let rows = pages
        .iter()
        .map(|p| {
            let mark = if def.as_deref() == Some(p.id.as_str()) {
                "*"
            } else {
                ""
            };
            vec![
                mark.to_string(),
                p.name.clone(),
                p.id.clone(),
                p.created_at.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Default", "Name", "ID", "Created"], rows)
    );
    Ok(())
}

fn rename(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let page = ledger::portfolio_by_key(conn, required(sub, "page")?)?;
    let name = required(sub, "name")?;
    ledger::rename_portfolio(conn, &page.id, name)?;
    println!("Renamed '{}' to '{}'", page.name, name.trim());
    Ok(())
}

fn make_default(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let page = ledger::portfolio_by_key(conn, required(sub, "page")?)?;
    ledger::set_default_portfolio(conn, &page.id)?;
    println!("Default page is now '{}'", page.name);
    Ok(())
}

/// Removes a page, its expenses and images, and its budget map.
fn remove(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    // opening the session first settles any legacy budget on the old default
    let mut session = Session::open(conn)?;
    let page = ledger::portfolio_by_key(conn, required(sub, "page")?)?;
    let removed = ledger::delete_portfolio(conn, &page.id)?;

    if session.budgets.config.remove_portfolio(&page.id).is_some() {
        session.save_budgets(conn)?;
        info!(page = %page.id, "dropped budget map of deleted page");
    }
    println!(
        "Deleted page '{}' and {} expense(s)",
        page.name,
        removed.len()
    );
    Ok(())
}
