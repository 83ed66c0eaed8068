// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde::Serialize;

use super::required;
use crate::session::Session;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("expenses", sub)) => export_expenses(conn, sub),
        _ => Ok(()),
    }
}

/// One exported line. Internal ids, image data and the raw creation
/// timestamp stay out.
#[derive(Debug, Serialize)]
pub struct ExportRow {
    pub date: String,
    pub vendor: String,
    pub amount: String,
    pub currency: String,
    pub category: String,
    pub summary: String,
    pub page: String,
    pub receipt_id: String,
    pub file_name: String,
    pub date_created: String,
}

pub fn export_rows(session: &Session) -> Vec<ExportRow> {
    let default_name = session
        .default_portfolio()
        .map(|p| p.name.clone())
        .unwrap_or_default();
    session
        .expenses
        .iter()
        .map(|e| ExportRow {
            date: e.date.clone(),
            vendor: e.vendor_name.clone(),
            amount: e.amount.to_string(),
            currency: e.currency.clone(),
            category: e.category.to_string(),
            summary: e.summary.clone().unwrap_or_default(),
            page: match e.portfolio_id.as_deref() {
                Some(id) => session.page_name(id),
                None => default_name.clone(),
            },
            receipt_id: e.receipt_id.clone().unwrap_or_default(),
            file_name: e.file_name.clone().unwrap_or_default(),
            date_created: e.created_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect()
}

fn export_expenses(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.to_lowercase();
    let out = required(sub, "out")?;
    let session = Session::open(conn)?;
    let rows = export_rows(&session);

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out))?;
            for row in &rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)
                .with_context(|| format!("Write {}", out))?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    println!("Exported {} expense(s) to {}", rows.len(), out);
    Ok(())
}
