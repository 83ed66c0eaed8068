// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use rusqlite::Connection;

use crate::{db, session::Session};

pub mod budgets;
pub mod categories;
pub mod expenses;
pub mod exporter;
pub mod portfolios;
pub mod reports;
pub mod usage;

fn required<'a>(m: &'a ArgMatches, id: &str) -> Result<&'a str> {
    m.get_one::<String>(id)
        .map(String::as_str)
        .with_context(|| format!("Missing --{}", id.replace('_', "-")))
}

fn json_flags(m: &ArgMatches) -> (bool, bool) {
    (m.get_flag("json"), m.get_flag("jsonl"))
}

/// Creates the default page and folds any legacy budget into it.
pub fn init(conn: &Connection, path: Option<&Path>) -> Result<()> {
    let session = Session::open(conn)?;
    let shown = match path {
        Some(p) => p.to_path_buf(),
        None => db::db_path()?,
    };
    println!("Database initialized at {}", shown.display());
    if let Some(p) = session.default_portfolio() {
        println!("Default page: {} ({})", p.name, p.id);
    }
    Ok(())
}
