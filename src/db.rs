// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::budget::PreferenceStore;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Receiptlens", "receiptlens"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("receiptlens.sqlite"))
}

/// Opens the database at `path`, or the platform default when `None`.
pub fn open_or_init(path: Option<&Path>) -> Result<Connection> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => db_path()?,
    };
    debug!("opening database at {}", path.display());
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS portfolios(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        user_id TEXT NOT NULL,
        is_default INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );

    -- portfolio_id is NULL for records that predate pages; no FK so deletes
    -- can purge images in the same pass
    CREATE TABLE IF NOT EXISTS expenses(
        id TEXT PRIMARY KEY,
        vendor_name TEXT NOT NULL,
        date TEXT NOT NULL,
        amount TEXT NOT NULL,
        currency TEXT NOT NULL,
        category TEXT NOT NULL,
        summary TEXT,
        file_name TEXT,
        receipt_id TEXT,
        portfolio_id TEXT,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_expenses_portfolio ON expenses(portfolio_id);
    CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);

    CREATE TABLE IF NOT EXISTS receipt_images(
        expense_id TEXT PRIMARY KEY,
        file_name TEXT,
        data BLOB NOT NULL
    );

    CREATE TABLE IF NOT EXISTS profile(
        user_id TEXT PRIMARY KEY,
        plan TEXT NOT NULL DEFAULT 'free',
        subscription_expiry TEXT,
        monthly_docs_limit INTEGER NOT NULL DEFAULT 10,
        docs_used_this_month INTEGER NOT NULL DEFAULT 0,
        trial_start TEXT NOT NULL,
        is_trial_active INTEGER NOT NULL DEFAULT 1,
        is_admin INTEGER NOT NULL DEFAULT 0,
        last_billed_usage INTEGER NOT NULL DEFAULT 0,
        custom_usage_limit INTEGER
    );
    "#,
    )?;
    Ok(())
}

impl PreferenceStore for Connection {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let v = self
            .query_row(
                "SELECT value FROM settings WHERE key=?1",
                params![key],
                |r| r.get(0),
            )
            .optional()
            .with_context(|| format!("Read setting '{}'", key))?;
        Ok(v)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.execute(
            "INSERT INTO settings(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![key, value],
        )
        .with_context(|| format!("Write setting '{}'", key))?;
        Ok(())
    }
}
