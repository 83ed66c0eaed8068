// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn page_arg() -> Arg {
    Arg::new("page")
        .long("page")
        .help("Page id or name (defaults to the default page)")
}

fn expense_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(Arg::new("vendor").long("vendor").required(required))
        .arg(Arg::new("amount").long("amount").required(required))
        .arg(Arg::new("date").long("date").help("Receipt date; normalized to YYYY-MM-DD when possible"))
        .arg(Arg::new("currency").long("currency"))
        .arg(Arg::new("category").long("category"))
        .arg(Arg::new("summary").long("summary"))
        .arg(Arg::new("receipt_id").long("receipt-id"))
        .arg(page_arg())
}

pub fn build_cli() -> Command {
    Command::new("receiptlens")
        .version(clap::crate_version!())
        .about("Receipt-driven expense tracking with per-page budgets")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("RECEIPTLENS_DB")
                .value_parser(value_parser!(std::path::PathBuf))
                .help("Database file (defaults to the platform data dir)"),
        )
        .arg(
            Arg::new("log_level")
                .long("log-level")
                .global(true)
                .default_value("warn")
                .value_parser(["off", "error", "warn", "info", "debug", "trace"]),
        )
        .subcommand(Command::new("init").about("Create the database and default page"))
        .subcommand(
            Command::new("page")
                .about("Manage pages")
                .subcommand(
                    Command::new("add").arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("rename")
                        .arg(Arg::new("page").long("page").required(true))
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(
                    Command::new("default").arg(Arg::new("page").long("page").required(true)),
                )
                .subcommand(Command::new("rm").arg(Arg::new("page").long("page").required(true))),
        )
        .subcommand(
            Command::new("expense")
                .about("Record and browse expenses")
                .subcommand(expense_fields(Command::new("add"), true).arg(
                    Arg::new("file")
                        .long("file")
                        .value_parser(value_parser!(std::path::PathBuf))
                        .help("Receipt image or PDF to keep alongside the record"),
                ))
                .subcommand(expense_fields(
                    Command::new("edit").arg(Arg::new("id").long("id").required(true)),
                    false,
                ))
                .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true)))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("search").long("search"))
                        .arg(Arg::new("category").long("category").default_value("All"))
                        .arg(page_arg())
                        .arg(
                            Arg::new("all_pages")
                                .long("all-pages")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("page"),
                        )
                        .arg(Arg::new("sort").long("sort").default_value("date"))
                        .arg(
                            Arg::new("order")
                                .long("order")
                                .default_value("desc")
                                .value_parser(["asc", "desc"]),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("image")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Per-page monthly limits")
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(page_arg()),
                )
                .subcommand(json_flags(Command::new("show").arg(page_arg())))
                .subcommand(json_flags(Command::new("status").arg(page_arg())))
                .subcommand(
                    Command::new("currency").arg(Arg::new("code").long("code").required(true)),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Expense categories")
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("report")
                .about("Totals and breakdowns")
                .subcommand(json_flags(Command::new("summary").arg(page_arg())))
                .subcommand(json_flags(
                    Command::new("vendors").arg(page_arg()).arg(
                        Arg::new("top")
                            .long("top")
                            .default_value("5")
                            .value_parser(value_parser!(usize)),
                    ),
                ))
                .subcommand(json_flags(Command::new("monthly").arg(page_arg()))),
        )
        .subcommand(
            Command::new("usage")
                .about("Plan and receipt-scan metering")
                .subcommand(json_flags(Command::new("status")))
                .subcommand(
                    Command::new("record").arg(
                        Arg::new("count")
                            .long("count")
                            .default_value("1")
                            .value_parser(value_parser!(u32)),
                    ),
                )
                .subcommand(
                    Command::new("plan")
                        .arg(Arg::new("plan").long("plan").required(true))
                        .arg(Arg::new("expiry").long("expiry").help("YYYY-MM-DD")),
                )
                .subcommand(Command::new("meter")),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("expenses")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .value_parser(["csv", "json"]),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
}
