// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use stockclip::commands::exporter;
use stockclip::{cli, db};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute(
        "INSERT INTO warehouses(id, name) VALUES (1, 'Main')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO items(id, name, unit, price, cost, reorder_point, barcode)
         VALUES (1, 'Cola', 'pc', '3.50', '2.10', '12', '690001')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO movements(id, kind, date, warehouse_id, reference)
         VALUES (1, 'purchase', '2025-01-02', 1, 'INV-7')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO movement_lines(movement_id, item_id, qty, unit_cost)
         VALUES (1, 1, '10', '2.10')",
        [],
    )
    .unwrap();
    conn
}

fn run_export(conn: &Connection, argv: &[&str]) {
    let matches = cli::build_cli().get_matches_from(argv.iter().copied());
    if let Some(("export", sub)) = matches.subcommand() {
        exporter::handle(conn, sub).unwrap();
    } else {
        panic!("export command not parsed");
    }
}

#[test]
fn export_items_csv() {
    let conn = setup();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("items.csv");
    run_export(
        &conn,
        &[
            "stockclip",
            "export",
            "items",
            "--format",
            "csv",
            "--out",
            out.to_str().unwrap(),
        ],
    );
    let body = std::fs::read_to_string(&out).unwrap();
    let mut lines = body.lines();
    assert_eq!(
        lines.next().unwrap(),
        "name,unit,price,cost,reorder_point,barcode"
    );
    assert_eq!(lines.next().unwrap(), "Cola,pc,3.50,2.10,12,690001");
}

#[test]
fn export_movements_json() {
    let conn = setup();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("movements.json");
    run_export(
        &conn,
        &[
            "stockclip",
            "export",
            "movements",
            "--format",
            "json",
            "--out",
            out.to_str().unwrap(),
        ],
    );
    let body = std::fs::read_to_string(&out).unwrap();
    let docs: serde_json::Value = serde_json::from_str(&body).unwrap();
    let rows = docs.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["kind"], "purchase");
    assert_eq!(rows[0]["item"], "Cola");
    assert_eq!(rows[0]["qty"], "10");
    assert_eq!(rows[0]["reference"], "INV-7");
}

#[test]
fn export_movements_csv_tolerates_dangling_item() {
    let conn = setup();
    conn.execute("DELETE FROM items", []).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("movements.csv");
    run_export(
        &conn,
        &[
            "stockclip",
            "export",
            "movements",
            "--format",
            "csv",
            "--out",
            out.to_str().unwrap(),
        ],
    );
    let body = std::fs::read_to_string(&out).unwrap();
    assert!(body.contains("(unknown)"));
}
