// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use receiptlens::{cli, commands, db};

fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    let level = matches
        .get_one::<String>("log_level")
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::WARN);
    init_logger(level);

    let db_path = matches.get_one::<PathBuf>("db").cloned();
    let mut conn = db::open_or_init(db_path.as_deref())?;

    match matches.subcommand() {
        Some(("init", _)) => commands::init(&conn, db_path.as_deref())?,
        Some(("page", sub)) => commands::portfolios::handle(&mut conn, sub)?,
        Some(("expense", sub)) => commands::expenses::handle(&mut conn, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&conn, sub)?,
        Some(("category", sub)) => commands::categories::handle(sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, sub)?,
        Some(("usage", sub)) => commands::usage::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!(
            "{}={},{}={}",
            env!("CARGO_CRATE_NAME"),
            level,
            env!("CARGO_BIN_NAME"),
            level
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
