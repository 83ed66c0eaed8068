// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::Error;

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Formats tried, in order, when a receipt date is not already ISO.
const DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Parses a user-entered amount; expenses never carry negative values.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s.trim())?;
    if d.is_sign_negative() && !d.is_zero() {
        return Err(Error::NegativeAmount(d.to_string()).into());
    }
    Ok(d)
}

/// Best-effort date cleanup: blank means today, ISO passes through, a handful of
/// common receipt formats are rewritten to ISO, and anything else is kept verbatim.
pub fn normalize_date(raw: &str) -> String {
    normalize_date_at(raw, Utc::now().date_naive())
}

pub fn normalize_date_at(raw: &str, today: NaiveDate) -> String {
    let s = raw.trim();
    if s.is_empty() {
        return today.to_string();
    }
    if ISO_DATE.is_match(s) {
        return s.to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc).date_naive().to_string();
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.to_string();
        }
    }
    raw.to_string()
}

/// Coerces a loosely typed JSON value into a non-negative amount. Numbers and
/// numeric strings are accepted; everything else, including negatives, is zero.
pub fn lenient_decimal(v: &Value) -> Decimal {
    let parsed = match v {
        Value::Number(n) => {
            let s = n.to_string();
            s.parse::<Decimal>()
                .ok()
                .or_else(|| Decimal::from_scientific(&s).ok())
                .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok()))
        }
        Value::String(s) => {
            let t = s.trim();
            t.parse::<Decimal>()
                .ok()
                .or_else(|| Decimal::from_scientific(t).ok())
        }
        _ => None,
    };
    match parsed {
        Some(d) if d.is_sign_positive() => d,
        _ => Decimal::ZERO,
    }
}

pub fn deserialize_lenient_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().map(lenient_decimal).unwrap_or(Decimal::ZERO))
}

/// Month bucket for a stored date: `YYYY-MM` for ISO-looking dates, the raw
/// string otherwise.
pub fn month_key(date: &str) -> String {
    match date.get(..7) {
        Some(prefix) if NaiveDate::parse_from_str(&format!("{}-01", prefix), "%Y-%m-%d").is_ok() => {
            prefix.to_string()
        }
        _ => date.to_string(),
    }
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
