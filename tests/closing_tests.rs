// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use stockclip::commands::closing::{perform_closing, review_closing, ClosingError};
use stockclip::models::{DocumentStatus, MovementKind};
use stockclip::utils::{record_movement, MovementDraft};
use stockclip::{db, engine};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute("INSERT INTO warehouses(id, name) VALUES (1, 'Main')", [])
        .unwrap();
    conn.execute(
        "INSERT INTO items(id, name, unit) VALUES (1, 'Cola', 'pc')",
        [],
    )
    .unwrap();
    conn
}

fn draft(kind: MovementKind, date: &str, qty: i64) -> MovementDraft<'static> {
    MovementDraft {
        kind,
        date: d(date),
        warehouse_id: Some(1),
        dest_warehouse_id: None,
        status: None,
        rep: None,
        reference: None,
        note: None,
        lines: vec![(1, dec(qty), None)],
    }
}

fn seed_example(conn: &Connection) {
    // 100 in, 30 approved out, 20 pending out
    record_movement(conn, &draft(MovementKind::StockIn, "2024-01-01", 100)).unwrap();
    record_movement(
        conn,
        &MovementDraft {
            status: Some(DocumentStatus::Approved),
            ..draft(MovementKind::Sale, "2024-01-05", 30)
        },
    )
    .unwrap();
    record_movement(
        conn,
        &MovementDraft {
            status: Some(DocumentStatus::Pending),
            ..draft(MovementKind::Sale, "2024-01-06", 20)
        },
    )
    .unwrap();
}

fn closings_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM closings", [], |r| r.get(0))
        .unwrap()
}

#[test]
fn review_proposes_balances_without_writing() {
    let conn = setup();
    seed_example(&conn);
    let proposed = review_closing(&conn, 1, d("2024-01-10")).unwrap();
    assert_eq!(proposed.len(), 1);
    assert_eq!(proposed[0].item, "Cola");
    assert_eq!(proposed[0].balance, dec(70));
    assert_eq!(closings_count(&conn), 0);
}

#[test]
fn commit_then_seed_from_snapshot() {
    let mut conn = setup();
    seed_example(&conn);
    let closing_id = perform_closing(&mut conn, 1, d("2024-01-10"), "admin").unwrap();
    assert_eq!(closings_count(&conn), 1);
    let stored: String = conn
        .query_row(
            "SELECT balance FROM closing_balances WHERE closing_id=?1 AND item_id=1",
            [closing_id],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(stored.parse::<Decimal>().unwrap(), dec(70));

    record_movement(&conn, &draft(MovementKind::StockIn, "2024-01-15", 10)).unwrap();

    // prove the seed is used: drop pre-closing history outright, the balance
    // must still come out of the snapshot
    conn.execute("DELETE FROM movements WHERE date <= '2024-01-10'", [])
        .unwrap();
    let movements = db::load_movements(&conn).unwrap();
    let snap = db::latest_closing(&conn, 1, d("2024-01-20")).unwrap();
    assert!(snap.is_some());
    let bal = engine::compute_balance(1, 1, d("2024-01-20"), &movements, snap.as_ref());
    assert_eq!(bal, dec(80));
}

#[test]
fn closing_dates_must_strictly_increase() {
    let mut conn = setup();
    seed_example(&conn);
    perform_closing(&mut conn, 1, d("2024-01-10"), "admin").unwrap();

    for raw in ["2024-01-10", "2024-01-05"] {
        let err = perform_closing(&mut conn, 1, d(raw), "admin").unwrap_err();
        let closing_err = err.downcast_ref::<ClosingError>().unwrap();
        match closing_err {
            ClosingError::NotAfterLatest { attempted, latest } => {
                assert_eq!(*attempted, d(raw));
                assert_eq!(*latest, d("2024-01-10"));
            }
        }
    }
    // rejections wrote nothing
    assert_eq!(closings_count(&conn), 1);
}

#[test]
fn review_rejects_stale_dates_too() {
    let mut conn = setup();
    seed_example(&conn);
    perform_closing(&mut conn, 1, d("2024-01-10"), "admin").unwrap();
    assert!(review_closing(&conn, 1, d("2024-01-10")).is_err());
}

#[test]
fn second_closing_seeds_from_the_first() {
    let mut conn = setup();
    seed_example(&conn);
    perform_closing(&mut conn, 1, d("2024-01-10"), "admin").unwrap();
    record_movement(&conn, &draft(MovementKind::StockIn, "2024-01-15", 10)).unwrap();
    let proposed = review_closing(&conn, 1, d("2024-01-31")).unwrap();
    assert_eq!(proposed[0].balance, dec(80));
    perform_closing(&mut conn, 1, d("2024-01-31"), "admin").unwrap();
    assert_eq!(closings_count(&conn), 2);
}

#[test]
fn closed_periods_lock_new_movements() {
    let mut conn = setup();
    seed_example(&conn);
    perform_closing(&mut conn, 1, d("2024-01-10"), "admin").unwrap();

    let err = record_movement(&conn, &draft(MovementKind::StockIn, "2024-01-10", 5)).unwrap_err();
    assert!(err.to_string().contains("locked"));
    let err = record_movement(&conn, &draft(MovementKind::StockOut, "2024-01-02", 5)).unwrap_err();
    assert!(err.to_string().contains("locked"));
    // the day after the closing is open
    record_movement(&conn, &draft(MovementKind::StockIn, "2024-01-11", 5)).unwrap();
}

#[test]
fn snapshot_balance_wins_over_backdated_edits() {
    let mut conn = setup();
    seed_example(&conn);
    perform_closing(&mut conn, 1, d("2024-01-10"), "admin").unwrap();

    // slip a back-dated movement in behind the lock (raw SQL on purpose)
    conn.execute(
        "INSERT INTO movements(kind, date, warehouse_id) VALUES ('stock-in','2024-01-03',1)",
        [],
    )
    .unwrap();
    let movement_id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO movement_lines(movement_id, item_id, qty) VALUES (?1, 1, '50')",
        [movement_id],
    )
    .unwrap();

    let movements = db::load_movements(&conn).unwrap();
    let snap = db::latest_closing(&conn, 1, d("2024-01-10")).unwrap();
    let bal = engine::compute_balance(1, 1, d("2024-01-10"), &movements, snap.as_ref());
    assert_eq!(bal, dec(70));
}
