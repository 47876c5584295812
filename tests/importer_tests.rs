// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::io::Write;

use rusqlite::Connection;
use stockclip::commands::importer;
use stockclip::{cli, db};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn write_csv(dir: &tempfile::TempDir, body: &str) -> String {
    let path = dir.path().join("items.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(body.as_bytes()).unwrap();
    path.to_str().unwrap().to_string()
}

fn run_import(conn: &mut Connection, path: &str) -> anyhow::Result<()> {
    let matches =
        cli::build_cli().get_matches_from(["stockclip", "import", "items", "--path", path]);
    if let Some(("import", sub)) = matches.subcommand() {
        importer::handle(conn, sub)
    } else {
        panic!("import command not parsed");
    }
}

#[test]
fn import_creates_items() {
    let mut conn = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        &dir,
        "name,unit,price,cost,reorder_point,barcode\n\
         Cola,pc,3.50,2.10,12,690001\n\
         Chips,pc,1.25,0.80,24,\n",
    );
    run_import(&mut conn, &path).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM items", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 2);
    let (price, barcode): (String, Option<String>) = conn
        .query_row(
            "SELECT price, barcode FROM items WHERE name='Cola'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(price, "3.50");
    assert_eq!(barcode.as_deref(), Some("690001"));
}

#[test]
fn import_upserts_existing_names() {
    let mut conn = setup();
    conn.execute(
        "INSERT INTO items(name, unit, price) VALUES ('Cola', 'pc', '1.00')",
        [],
    )
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        &dir,
        "name,unit,price,cost,reorder_point,barcode\nCola,box,4.00,3.00,6,690002\n",
    );
    run_import(&mut conn, &path).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM items", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);
    let (unit, price): (String, String) = conn
        .query_row("SELECT unit, price FROM items WHERE name='Cola'", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .unwrap();
    assert_eq!(unit, "box");
    assert_eq!(price, "4.00");
}

#[test]
fn bad_row_rolls_back_the_whole_file() {
    let mut conn = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        &dir,
        "name,unit,price,cost,reorder_point,barcode\n\
         Cola,pc,3.50,2.10,12,\n\
         Chips,pc,not-a-price,0.80,24,\n",
    );
    let err = run_import(&mut conn, &path).unwrap_err();
    assert!(err.to_string().contains("Chips"));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM items", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}
