// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! SQLite-backed pages, expenses, receipt images and the usage profile.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::budget::PreferenceStore;
use crate::category::ExpenseCategory;
use crate::error::Error;
use crate::models::{ExpenseRecord, Portfolio, default_portfolio, find_portfolio};
use crate::plan::UserProfile;

pub const DEFAULT_PORTFOLIO_NAME: &str = "General";
const USER_ID_KEY: &str = "user_id";

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            warn!("unreadable timestamp '{}', using epoch", s);
            DateTime::<Utc>::default()
        })
}

/// The local user's id, created on first use.
pub fn user_id(conn: &Connection) -> Result<String> {
    if let Some(id) = conn.get(USER_ID_KEY)? {
        return Ok(id);
    }
    let id = new_id();
    conn.set(USER_ID_KEY, &id)?;
    info!("created local user {}", id);
    Ok(id)
}

// --- pages -------------------------------------------------------------

fn row_to_portfolio(r: &Row<'_>) -> rusqlite::Result<Portfolio> {
    let created: String = r.get(3)?;
    Ok(Portfolio {
        id: r.get(0)?,
        name: r.get(1)?,
        user_id: r.get(2)?,
        created_at: parse_ts(&created),
        is_default: r.get::<_, i64>(4)? != 0,
    })
}

pub fn list_portfolios(conn: &Connection) -> Result<Vec<Portfolio>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, user_id, created_at, is_default FROM portfolios ORDER BY created_at, rowid",
    )?;
    let rows = stmt.query_map([], row_to_portfolio)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn add_portfolio(conn: &Connection, name: &str) -> Result<Portfolio> {
    let first = list_portfolios(conn)?.is_empty();
    let p = Portfolio {
        id: new_id(),
        name: name.trim().to_string(),
        user_id: user_id(conn)?,
        created_at: Utc::now(),
        is_default: first,
    };
    conn.execute(
        "INSERT INTO portfolios(id, name, user_id, is_default, created_at) VALUES (?1,?2,?3,?4,?5)",
        params![p.id, p.name, p.user_id, p.is_default as i64, ts(&p.created_at)],
    )?;
    Ok(p)
}

/// Returns the user's pages, creating the default "General" page when there
/// are none.
pub fn ensure_default_portfolio(conn: &Connection) -> Result<Vec<Portfolio>> {
    let pages = list_portfolios(conn)?;
    if !pages.is_empty() {
        return Ok(pages);
    }
    let p = add_portfolio(conn, DEFAULT_PORTFOLIO_NAME)?;
    info!("created default page '{}' ({})", p.name, p.id);
    Ok(vec![p])
}

/// Looks a page up by id, then by case-insensitive name.
pub fn portfolio_by_key(conn: &Connection, key: &str) -> Result<Portfolio> {
    let pages = list_portfolios(conn)?;
    find_portfolio(&pages, key)
        .cloned()
        .ok_or_else(|| Error::PortfolioNotFound(key.trim().to_string()).into())
}

pub fn rename_portfolio(conn: &Connection, id: &str, name: &str) -> Result<()> {
    let n = conn.execute(
        "UPDATE portfolios SET name=?1 WHERE id=?2",
        params![name.trim(), id],
    )?;
    if n == 0 {
        return Err(Error::PortfolioNotFound(id.to_string()).into());
    }
    Ok(())
}

pub fn set_default_portfolio(conn: &mut Connection, id: &str) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("UPDATE portfolios SET is_default=0", [])?;
    let n = tx.execute("UPDATE portfolios SET is_default=1 WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(Error::PortfolioNotFound(id.to_string()).into());
    }
    tx.commit()?;
    Ok(())
}

/// Deletes a page together with its expenses and their stored images.
/// Refuses to delete the last page. Returns the ids of the removed expenses.
pub fn delete_portfolio(conn: &mut Connection, id: &str) -> Result<Vec<String>> {
    let pages = list_portfolios(conn)?;
    let Some(target) = pages.iter().find(|p| p.id == id) else {
        return Err(Error::PortfolioNotFound(id.to_string()).into());
    };
    if pages.len() <= 1 {
        return Err(Error::LastPortfolio(target.name.clone()).into());
    }
    let was_default = default_portfolio(&pages).is_some_and(|p| p.id == id);

    let tx = conn.transaction()?;
    let removed = {
        let mut stmt = tx.prepare("SELECT id FROM expenses WHERE portfolio_id=?1")?;
        let rows = stmt.query_map(params![id], |r| r.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        ids
    };
    for eid in &removed {
        tx.execute("DELETE FROM receipt_images WHERE expense_id=?1", params![eid])?;
    }
    tx.execute("DELETE FROM expenses WHERE portfolio_id=?1", params![id])?;
    tx.execute("DELETE FROM portfolios WHERE id=?1", params![id])?;
    if was_default {
        // promote the earliest remaining page
        tx.execute(
            "UPDATE portfolios SET is_default=1 WHERE id=(SELECT id FROM portfolios ORDER BY created_at, rowid LIMIT 1)",
            [],
        )?;
    }
    tx.commit()?;
    info!(
        "deleted page {} with {} expense(s)",
        id,
        removed.len()
    );
    Ok(removed)
}

// --- expenses ----------------------------------------------------------

fn row_to_expense(r: &Row<'_>) -> rusqlite::Result<ExpenseRecord> {
    let id: String = r.get(0)?;
    let amount_s: String = r.get(3)?;
    let amount = match amount_s.trim().parse::<Decimal>() {
        Ok(d) if !d.is_sign_negative() => d,
        _ => {
            warn!("expense {} has unusable amount '{}', counting as 0", id, amount_s);
            Decimal::ZERO
        }
    };
    let category: String = r.get(5)?;
    let created: String = r.get(10)?;
    Ok(ExpenseRecord {
        id,
        vendor_name: r.get(1)?,
        date: r.get(2)?,
        amount,
        currency: r.get(4)?,
        category: ExpenseCategory::from_label_lossy(&category),
        summary: r.get(6)?,
        file_name: r.get(7)?,
        receipt_id: r.get(8)?,
        portfolio_id: r.get(9)?,
        created_at: parse_ts(&created),
    })
}

const EXPENSE_COLUMNS: &str = "id, vendor_name, date, amount, currency, category, summary, file_name, receipt_id, portfolio_id, created_at";

/// All expenses, newest date first.
pub fn list_expenses(conn: &Connection) -> Result<Vec<ExpenseRecord>> {
    let sql = format!(
        "SELECT {} FROM expenses ORDER BY date DESC, created_at DESC",
        EXPENSE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_expense)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn get_expense(conn: &Connection, id: &str) -> Result<ExpenseRecord> {
    let sql = format!("SELECT {} FROM expenses WHERE id=?1", EXPENSE_COLUMNS);
    conn.query_row(&sql, params![id.trim()], row_to_expense)
        .optional()?
        .ok_or_else(|| Error::ExpenseNotFound(id.trim().to_string()).into())
}

pub fn insert_expense(conn: &Connection, e: &ExpenseRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO expenses(id, vendor_name, date, amount, currency, category, summary, file_name, receipt_id, portfolio_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            e.id,
            e.vendor_name,
            e.date,
            e.amount.to_string(),
            e.currency,
            e.category.label(),
            e.summary,
            e.file_name,
            e.receipt_id,
            e.portfolio_id,
            ts(&e.created_at)
        ],
    )
    .with_context(|| format!("Insert expense {}", e.id))?;
    Ok(())
}

/// Updates the editable fields; id and creation time stay as they are.
pub fn update_expense(conn: &Connection, e: &ExpenseRecord) -> Result<()> {
    let n = conn.execute(
        "UPDATE expenses SET vendor_name=?1, date=?2, amount=?3, currency=?4, category=?5,
             summary=?6, file_name=?7, receipt_id=?8, portfolio_id=?9
         WHERE id=?10",
        params![
            e.vendor_name,
            e.date,
            e.amount.to_string(),
            e.currency,
            e.category.label(),
            e.summary,
            e.file_name,
            e.receipt_id,
            e.portfolio_id,
            e.id
        ],
    )?;
    if n == 0 {
        return Err(Error::ExpenseNotFound(e.id.clone()).into());
    }
    Ok(())
}

pub fn delete_expense(conn: &mut Connection, id: &str) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM receipt_images WHERE expense_id=?1", params![id])?;
    let n = tx.execute("DELETE FROM expenses WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(Error::ExpenseNotFound(id.to_string()).into());
    }
    tx.commit()?;
    Ok(())
}

// --- receipt images ----------------------------------------------------

pub fn save_image(
    conn: &Connection,
    expense_id: &str,
    file_name: Option<&str>,
    data: &[u8],
) -> Result<()> {
    conn.execute(
        "INSERT INTO receipt_images(expense_id, file_name, data) VALUES (?1, ?2, ?3)
         ON CONFLICT(expense_id) DO UPDATE SET file_name=excluded.file_name, data=excluded.data",
        params![expense_id, file_name, data],
    )?;
    Ok(())
}

pub fn load_image(conn: &Connection, expense_id: &str) -> Result<Option<Vec<u8>>> {
    let v = conn
        .query_row(
            "SELECT data FROM receipt_images WHERE expense_id=?1",
            params![expense_id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

// --- usage profile -----------------------------------------------------

pub fn load_profile(conn: &Connection) -> Result<UserProfile> {
    let uid = user_id(conn)?;
    let existing = conn
        .query_row(
            "SELECT plan, subscription_expiry, monthly_docs_limit, docs_used_this_month, trial_start,
                    is_trial_active, is_admin, last_billed_usage, custom_usage_limit
             FROM profile WHERE user_id=?1",
            params![uid],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, Option<String>>(1)?,
                    r.get::<_, u32>(2)?,
                    r.get::<_, u32>(3)?,
                    r.get::<_, String>(4)?,
                    r.get::<_, i64>(5)? != 0,
                    r.get::<_, i64>(6)? != 0,
                    r.get::<_, u32>(7)?,
                    r.get::<_, Option<u32>>(8)?,
                ))
            },
        )
        .optional()?;
    let Some((plan, expiry, limit, used, trial, trial_active, admin, billed, custom)) = existing
    else {
        let p = UserProfile::new_trial(&uid, Utc::now());
        save_profile(conn, &p)?;
        return Ok(p);
    };
    Ok(UserProfile {
        user_id: uid,
        plan: plan.parse()?,
        subscription_expiry: expiry.as_deref().map(parse_ts),
        monthly_docs_limit: limit,
        docs_used_this_month: used,
        trial_start: parse_ts(&trial),
        is_trial_active: trial_active,
        is_admin: admin,
        last_billed_usage: billed,
        custom_usage_limit: custom,
    })
}

pub fn save_profile(conn: &Connection, p: &UserProfile) -> Result<()> {
    conn.execute(
        "INSERT INTO profile(user_id, plan, subscription_expiry, monthly_docs_limit, docs_used_this_month,
                             trial_start, is_trial_active, is_admin, last_billed_usage, custom_usage_limit)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(user_id) DO UPDATE SET
            plan=excluded.plan,
            subscription_expiry=excluded.subscription_expiry,
            monthly_docs_limit=excluded.monthly_docs_limit,
            docs_used_this_month=excluded.docs_used_this_month,
            trial_start=excluded.trial_start,
            is_trial_active=excluded.is_trial_active,
            is_admin=excluded.is_admin,
            last_billed_usage=excluded.last_billed_usage,
            custom_usage_limit=excluded.custom_usage_limit",
        params![
            p.user_id,
            p.plan.as_str(),
            p.subscription_expiry.as_ref().map(ts),
            p.monthly_docs_limit,
            p.docs_used_this_month,
            ts(&p.trial_start),
            p.is_trial_active as i64,
            p.is_admin as i64,
            p.last_billed_usage,
            p.custom_usage_limit
        ],
    )?;
    Ok(())
}
