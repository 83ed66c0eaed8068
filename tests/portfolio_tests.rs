// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use receiptlens::category::ExpenseCategory;
use receiptlens::commands::portfolios;
use receiptlens::session::Session;
use receiptlens::{Error, budget, cli, db, ledger};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn run(conn: &mut Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["receiptlens", "page"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let (_, sub) = matches.subcommand().unwrap();
    portfolios::handle(conn, sub)
}

fn expense_count(conn: &Connection, page_id: &str) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM expenses WHERE portfolio_id=?1",
        [page_id],
        |r| r.get(0),
    )
    .unwrap()
}

fn add_expense(conn: &Connection, page_id: &str, amount: i64) -> String {
    let rec = receiptlens::models::ExpenseRecord {
        id: ledger::new_id(),
        vendor_name: "Vendor".into(),
        date: "2025-05-05".into(),
        amount: Decimal::from(amount),
        currency: "USD".into(),
        portfolio_id: Some(page_id.to_string()),
        ..Default::default()
    };
    ledger::insert_expense(conn, &rec).unwrap();
    rec.id
}

#[test]
fn first_page_is_general_and_default() {
    let conn = setup();
    let pages = ledger::ensure_default_portfolio(&conn).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].name, "General");
    assert!(pages[0].is_default);

    // idempotent
    let again = ledger::ensure_default_portfolio(&conn).unwrap();
    assert_eq!(again, pages);
}

#[test]
fn deleting_a_page_cascades_to_its_expenses_images_and_budget() {
    let mut conn = setup();
    run(&mut conn, &["add", "--name", "Trip"]).unwrap();
    let general = ledger::portfolio_by_key(&conn, "general").unwrap();
    let trip = ledger::portfolio_by_key(&conn, "Trip").unwrap();
    assert!(!trip.is_default);

    let kept = add_expense(&conn, &general.id, 10);
    let gone = add_expense(&conn, &trip.id, 20);
    add_expense(&conn, &trip.id, 30);
    ledger::save_image(&conn, &gone, Some("r.jpg"), b"jpeg").unwrap();

    let mut session = Session::open(&conn).unwrap();
    session
        .budgets
        .config
        .set_limit(&trip.id, ExpenseCategory::Hotel, Decimal::from(300));
    session.save_budgets(&conn).unwrap();

    run(&mut conn, &["rm", "--page", "Trip"]).unwrap();

    assert_eq!(expense_count(&conn, &trip.id), 0);
    assert_eq!(expense_count(&conn, &general.id), 1);
    assert!(ledger::get_expense(&conn, &kept).is_ok());
    assert!(ledger::load_image(&conn, &gone).unwrap().is_none());
    assert!(budget::load(&conn).config.portfolio(&trip.id).is_none());
    assert_eq!(ledger::list_portfolios(&conn).unwrap().len(), 1);
}

#[test]
fn last_page_cannot_be_deleted() {
    let mut conn = setup();
    let pages = ledger::ensure_default_portfolio(&conn).unwrap();
    add_expense(&conn, &pages[0].id, 5);

    let err = run(&mut conn, &["rm", "--page", "General"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::LastPortfolio(name)) if name == "General"
    ));
    assert_eq!(ledger::list_portfolios(&conn).unwrap().len(), 1);
    assert_eq!(expense_count(&conn, &pages[0].id), 1);
}

#[test]
fn deleting_the_default_promotes_the_next_oldest() {
    let mut conn = setup();
    ledger::ensure_default_portfolio(&conn).unwrap();
    run(&mut conn, &["add", "--name", "Home"]).unwrap();
    run(&mut conn, &["add", "--name", "Work"]).unwrap();

    run(&mut conn, &["rm", "--page", "General"]).unwrap();
    let pages = ledger::list_portfolios(&conn).unwrap();
    let defaults: Vec<_> = pages.iter().filter(|p| p.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].name, "Home");
}

#[test]
fn rename_and_make_default() {
    let mut conn = setup();
    ledger::ensure_default_portfolio(&conn).unwrap();
    run(&mut conn, &["add", "--name", "Side gig"]).unwrap();
    run(&mut conn, &["rename", "--page", "side gig", "--name", "Freelance"]).unwrap();
    run(&mut conn, &["default", "--page", "Freelance"]).unwrap();

    let session = Session::open(&conn).unwrap();
    assert_eq!(session.default_portfolio().unwrap().name, "Freelance");
    assert_eq!(session.portfolios.iter().filter(|p| p.is_default).count(), 1);

    let err = run(&mut conn, &["rename", "--page", "nope", "--name", "x"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::PortfolioNotFound(_))
    ));
}
