// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use stockclip::commands::{purchases, sales, stock};
use stockclip::{cli, db, engine};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute("INSERT INTO warehouses(id, name) VALUES (1, 'Main')", [])
        .unwrap();
    conn.execute("INSERT INTO warehouses(id, name) VALUES (2, 'Branch')", [])
        .unwrap();
    conn.execute(
        "INSERT INTO items(id, name, unit, cost, barcode) VALUES (1, 'Cola', 'pc', '0', '690001')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO items(id, name, unit) VALUES (2, 'Chips', 'pc')",
        [],
    )
    .unwrap();
    conn
}

fn dispatch(conn: &mut Connection, argv: &[&str]) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from(argv.iter().copied());
    match matches.subcommand() {
        Some(("purchase", sub)) => purchases::handle(conn, sub),
        Some(("sale", sub)) => sales::handle(conn, sub),
        Some(("stock", sub)) => stock::handle(conn, sub),
        other => panic!("unexpected subcommand {:?}", other.map(|(n, _)| n)),
    }
}

fn balance(conn: &Connection, item: i64, wh: i64, as_of: &str) -> Decimal {
    let movements = db::load_movements(conn).unwrap();
    let snap = db::latest_closing(conn, wh, d(as_of)).unwrap();
    engine::compute_balance(item, wh, d(as_of), &movements, snap.as_ref())
}

#[test]
fn purchase_add_cascades_item_cost() {
    let mut conn = setup();
    dispatch(
        &mut conn,
        &[
            "stockclip", "purchase", "add", "--date", "2025-01-02", "--warehouse", "Main",
            "--line", "Cola:10:2.50", "--line", "Chips:5",
        ],
    )
    .unwrap();

    let cost: String = conn
        .query_row("SELECT cost FROM items WHERE id=1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(cost, "2.50");
    // no cost on the Chips line, so its stored cost is untouched
    let cost2: String = conn
        .query_row("SELECT cost FROM items WHERE id=2", [], |r| r.get(0))
        .unwrap();
    assert_eq!(cost2, "0");
    assert_eq!(balance(&conn, 1, 1, "2025-01-31"), Decimal::from(10));
}

#[test]
fn purchase_edit_replaces_lines_and_recosts() {
    let mut conn = setup();
    dispatch(
        &mut conn,
        &[
            "stockclip", "purchase", "add", "--date", "2025-01-02", "--warehouse", "Main",
            "--line", "Cola:10:2.50",
        ],
    )
    .unwrap();
    dispatch(
        &mut conn,
        &[
            "stockclip", "purchase", "edit", "--id", "1", "--line", "Cola:8:2.75",
        ],
    )
    .unwrap();

    let cost: String = conn
        .query_row("SELECT cost FROM items WHERE id=1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(cost, "2.75");
    assert_eq!(balance(&conn, 1, 1, "2025-01-31"), Decimal::from(8));
    let lines: i64 = conn
        .query_row("SELECT COUNT(*) FROM movement_lines", [], |r| r.get(0))
        .unwrap();
    assert_eq!(lines, 1);
}

#[test]
fn pending_sale_moves_stock_only_after_approval() {
    let mut conn = setup();
    dispatch(
        &mut conn,
        &[
            "stockclip", "stock", "in", "--date", "2025-01-01", "--warehouse", "Main",
            "--line", "Cola:100",
        ],
    )
    .unwrap();
    dispatch(
        &mut conn,
        &[
            "stockclip", "sale", "add", "--date", "2025-01-05", "--warehouse", "Main",
            "--line", "Cola:30", "--pending",
        ],
    )
    .unwrap();
    assert_eq!(balance(&conn, 1, 1, "2025-01-31"), Decimal::from(100));

    dispatch(&mut conn, &["stockclip", "sale", "approve", "--id", "2"]).unwrap();
    assert_eq!(balance(&conn, 1, 1, "2025-01-31"), Decimal::from(70));
}

#[test]
fn transfer_shifts_stock_between_warehouses() {
    let mut conn = setup();
    dispatch(
        &mut conn,
        &[
            "stockclip", "stock", "in", "--date", "2025-02-01", "--warehouse", "Main",
            "--line", "Cola:20",
        ],
    )
    .unwrap();
    dispatch(
        &mut conn,
        &[
            "stockclip", "stock", "transfer", "--date", "2025-02-03", "--from", "Main",
            "--to", "Branch", "--line", "Cola:6",
        ],
    )
    .unwrap();
    assert_eq!(balance(&conn, 1, 1, "2025-02-28"), Decimal::from(14));
    assert_eq!(balance(&conn, 1, 2, "2025-02-28"), Decimal::from(6));
}

#[test]
fn adjustment_accepts_signed_differences() {
    let mut conn = setup();
    dispatch(
        &mut conn,
        &[
            "stockclip", "stock", "in", "--date", "2025-03-01", "--warehouse", "Main",
            "--line", "Cola:10",
        ],
    )
    .unwrap();
    dispatch(
        &mut conn,
        &[
            "stockclip", "stock", "adjust", "--date", "2025-03-02", "--warehouse", "Main",
            "--line", "Cola:-3",
        ],
    )
    .unwrap();
    assert_eq!(balance(&conn, 1, 1, "2025-03-31"), Decimal::from(7));
}

#[test]
fn barcode_resolves_an_item_line() {
    let mut conn = setup();
    dispatch(
        &mut conn,
        &[
            "stockclip", "stock", "in", "--date", "2025-04-01", "--warehouse", "Main",
            "--line", "690001:9",
        ],
    )
    .unwrap();
    assert_eq!(balance(&conn, 1, 1, "2025-04-30"), Decimal::from(9));
}

#[test]
fn unknown_item_is_a_validation_error() {
    let mut conn = setup();
    let err = dispatch(
        &mut conn,
        &[
            "stockclip", "stock", "in", "--date", "2025-04-01", "--warehouse", "Main",
            "--line", "Nope:9",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("not found"));
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM movements", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn list_limit_respected() {
    let mut conn = setup();
    for day in ["2025-05-01", "2025-05-02", "2025-05-03"] {
        dispatch(
            &mut conn,
            &[
                "stockclip", "stock", "in", "--date", day, "--warehouse", "Main",
                "--line", "Cola:1",
            ],
        )
        .unwrap();
    }
    let matches =
        cli::build_cli().get_matches_from(["stockclip", "stock", "list", "--limit", "2"]);
    if let Some(("stock", stock_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = stock_m.subcommand() {
            let rows = stock::query_movement_rows(&conn, list_m, None).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].date, "2025-05-03");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no stock subcommand");
    }
}
