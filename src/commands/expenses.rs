// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{json_flags, required};
use crate::budget::{self, BudgetWarning};
use crate::category::ExpenseCategory;
use crate::error::Error;
use crate::ledger;
use crate::models::ExpenseRecord;
use crate::plan::{self, UploadDecision};
use crate::session::Session;
use crate::utils::{fmt_money, maybe_print_json, normalize_date, parse_amount, pretty_table};
use crate::view::{SortOrder, ViewCriteria, filter_and_sort};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let (rec, warning) = add(conn, sub)?;
            println!(
                "Added {} {} at {} ({})",
                rec.category,
                fmt_money(&rec.amount, &rec.currency),
                rec.vendor_name,
                rec.id
            );
            if let Some(w) = warning {
                println!("{}", w);
            }
        }
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            ledger::delete_expense(conn, id)?;
            println!("Deleted expense {}", id);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("image", sub)) => image(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn category_arg(sub: &clap::ArgMatches) -> Result<Option<ExpenseCategory>> {
    match sub.get_one::<String>("category") {
        Some(s) => Ok(Some(s.parse::<ExpenseCategory>()?)),
        None => Ok(None),
    }
}

/// Records a new expense on the chosen page (default page when omitted).
///
/// The budget check looks at the page's spend before this record and never
/// blocks the write; the returned warning is purely advisory.
pub fn add(
    conn: &Connection,
    sub: &clap::ArgMatches,
) -> Result<(ExpenseRecord, Option<BudgetWarning>)> {
    let session = Session::open(conn)?;
    let page_id = session.page_id(sub.get_one::<String>("page").map(String::as_str))?;
    let amount = parse_amount(required(sub, "amount")?)?;
    let category = category_arg(sub)?.unwrap_or_default();
    let ctx = session.context();

    let attachment = match sub.get_one::<PathBuf>("file") {
        Some(path) => {
            let profile = plan::refresh_status(&ledger::load_profile(conn)?, Utc::now());
            if let UploadDecision::Denied(reason) = plan::can_upload(&profile, 1, Utc::now()) {
                return Err(Error::UploadDenied(reason.to_string()).into());
            }
            let data = fs::read(path)
                .with_context(|| format!("Read receipt file {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            Some((profile, name, data))
        }
        None => None,
    };

    let rec = ExpenseRecord {
        id: ledger::new_id(),
        vendor_name: required(sub, "vendor")?.trim().to_string(),
        date: normalize_date(sub.get_one::<String>("date").map_or("", String::as_str)),
        amount,
        currency: sub
            .get_one::<String>("currency")
            .map(|c| c.trim().to_uppercase())
            .unwrap_or_else(|| ctx.currency().to_string()),
        category,
        summary: sub.get_one::<String>("summary").cloned(),
        created_at: Utc::now(),
        portfolio_id: Some(page_id.clone()),
        receipt_id: sub.get_one::<String>("receipt_id").cloned(),
        file_name: attachment.as_ref().and_then(|(_, name, _)| name.clone()),
    };
    let warning = budget::evaluate(&ctx, category, amount, &page_id, &session.expenses);

    ledger::insert_expense(conn, &rec)?;
    if let Some((profile, name, data)) = attachment {
        ledger::save_image(conn, &rec.id, name.as_deref(), &data)?;
        ledger::save_profile(conn, &plan::record_usage(&profile, 1))?;
        debug!(expense = %rec.id, bytes = data.len(), "stored receipt image");
    }
    info!(expense = %rec.id, page = %page_id, "expense recorded");
    if let Some(w) = &warning {
        warn!(category = %w.category, limit = %w.limit, "budget exceeded");
    }
    Ok((rec, warning))
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let session = Session::open(conn)?;
    let mut rec = ledger::get_expense(conn, required(sub, "id")?)?;
    if let Some(v) = sub.get_one::<String>("vendor") {
        rec.vendor_name = v.trim().to_string();
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        rec.amount = parse_amount(a)?;
    }
    if let Some(d) = sub.get_one::<String>("date") {
        rec.date = normalize_date(d);
    }
    if let Some(c) = sub.get_one::<String>("currency") {
        rec.currency = c.trim().to_uppercase();
    }
    if let Some(c) = category_arg(sub)? {
        rec.category = c;
    }
    if let Some(s) = sub.get_one::<String>("summary") {
        rec.summary = Some(s.clone()).filter(|s| !s.trim().is_empty());
    }
    if let Some(r) = sub.get_one::<String>("receipt_id") {
        rec.receipt_id = Some(r.clone());
    }
    if let Some(p) = sub.get_one::<String>("page") {
        rec.portfolio_id = Some(session.page_id(Some(p))?);
    }
    ledger::update_expense(conn, &rec)?;
    println!("Updated expense {}", rec.id);
    Ok(())
}

#[derive(Serialize)]
struct Row<'a> {
    #[serde(flatten)]
    expense: &'a ExpenseRecord,
    page: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let session = Session::open(conn)?;
    let active_portfolio = if sub.get_flag("all_pages") {
        None
    } else {
        Some(session.page_id(sub.get_one::<String>("page").map(String::as_str))?)
    };
    let criteria = ViewCriteria {
        search: sub.get_one::<String>("search").cloned().unwrap_or_default(),
        category: required(sub, "category")?.parse()?,
        active_portfolio,
        sort_field: required(sub, "sort")?.parse()?,
        sort_order: match required(sub, "order")? {
            "asc" => SortOrder::Asc,
            _ => SortOrder::Desc,
        },
    };
    let mut shown = filter_and_sort(&session.expenses, &session.portfolios, &criteria);
    if let Some(n) = sub.get_one::<usize>("limit") {
        shown.truncate(*n);
    }

    let default_name = session
        .default_portfolio()
        .map(|p| p.name.clone())
        .unwrap_or_default();
    let rows: Vec<Row> = shown
        .iter()
        .map(|e| Row {
            expense: e,
            page: match e.portfolio_id.as_deref() {
                Some(id) => session.page_name(id),
                None => default_name.clone(),
            },
        })
        .collect();
    if maybe_print_json(json_flag, jsonl_flag, &rows)? {
        return Ok(());
    }
    let data = rows
        .iter()
        .map(|r| {
            vec![
                r.expense.date.clone(),
                r.expense.vendor_name.clone(),
                r.expense.category.to_string(),
                fmt_money(&r.expense.amount, &r.expense.currency),
                r.page.clone(),
                r.expense.id.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Vendor", "Category", "Amount", "Page", "ID"], data)
    );
    Ok(())
}

fn image(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let out = required(sub, "out")?;
    let rec = ledger::get_expense(conn, id)?;
    let data = ledger::load_image(conn, &rec.id)?
        .with_context(|| format!("Expense {} has no stored receipt image", rec.id))?;
    fs::write(out, &data).with_context(|| format!("Write {}", out))?;
    println!("Wrote {} byte(s) to {}", data.len(), out);
    Ok(())
}
