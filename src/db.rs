// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::models::{DocumentStatus, Movement, MovementKind, MovementLine, Snapshot};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Stockclip", "stockclip"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("stockclip.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS items(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        unit TEXT NOT NULL DEFAULT 'pc',
        price TEXT NOT NULL DEFAULT '0',
        cost TEXT NOT NULL DEFAULT '0',
        reorder_point TEXT NOT NULL DEFAULT '0',
        barcode TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS warehouses(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        kind TEXT NOT NULL DEFAULT 'store' CHECK(kind IN ('store','rep')),
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    -- Item and warehouse references on documents are soft: removing an item
    -- or warehouse leaves its history behind, reports tolerate the gap and
    -- `doctor` surfaces it.
    CREATE TABLE IF NOT EXISTS movements(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL CHECK(kind IN (
            'purchase','purchase-return','sale','sale-return','pos-sale',
            'stock-in','stock-out','transfer','adjustment',
            'rep-issue','rep-return')),
        date TEXT NOT NULL,
        warehouse_id INTEGER,
        dest_warehouse_id INTEGER,
        status TEXT,
        rep TEXT,
        reference TEXT,
        note TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_movements_date ON movements(date);

    CREATE TABLE IF NOT EXISTS movement_lines(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        movement_id INTEGER NOT NULL,
        item_id INTEGER NOT NULL,
        qty TEXT NOT NULL,
        unit_cost TEXT,
        FOREIGN KEY(movement_id) REFERENCES movements(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_movement_lines_movement ON movement_lines(movement_id);
    CREATE INDEX IF NOT EXISTS idx_movement_lines_item ON movement_lines(item_id);

    CREATE TABLE IF NOT EXISTS closings(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        warehouse_id INTEGER NOT NULL,
        closing_date TEXT NOT NULL,
        closed_by TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(warehouse_id, closing_date)
    );

    CREATE TABLE IF NOT EXISTS closing_balances(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        closing_id INTEGER NOT NULL,
        item_id INTEGER NOT NULL,
        balance TEXT NOT NULL,
        UNIQUE(closing_id, item_id),
        FOREIGN KEY(closing_id) REFERENCES closings(id) ON DELETE CASCADE
    );
    "#,
    )?;
    Ok(())
}

fn parse_stored_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid stored date '{}'", s))
}

fn parse_stored_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid stored decimal '{}'", s))
}

/// Materialize every movement document, lines attached, ordered by id. The
/// engine's ledger tie-break relies on this ordering.
pub fn load_movements(conn: &Connection) -> Result<Vec<Movement>> {
    let mut stmt = conn.prepare(
        "SELECT id, kind, date, warehouse_id, dest_warehouse_id, status, rep, reference
         FROM movements ORDER BY id",
    )?;
    let mut rows = stmt.query([])?;
    let mut movements: Vec<Movement> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let kind_s: String = r.get(1)?;
        let date_s: String = r.get(2)?;
        let status_s: Option<String> = r.get(5)?;
        let kind = MovementKind::parse(&kind_s)
            .with_context(|| format!("Unknown movement kind '{}' (id {})", kind_s, id))?;
        // unrecognized status strings load as absent (doctor flags them);
        // the engine treats an absent sale status as approved
        let status = status_s.as_deref().and_then(DocumentStatus::parse);
        index.insert(id, movements.len());
        movements.push(Movement {
            id,
            kind,
            date: parse_stored_date(&date_s)?,
            warehouse_id: r.get(3)?,
            dest_warehouse_id: r.get(4)?,
            status,
            rep: r.get(6)?,
            reference: r.get(7)?,
            lines: Vec::new(),
        });
    }

    let mut stmt = conn.prepare(
        "SELECT movement_id, item_id, qty, unit_cost FROM movement_lines ORDER BY movement_id, id",
    )?;
    let mut rows = stmt.query([])?;
    while let Some(r) = rows.next()? {
        let movement_id: i64 = r.get(0)?;
        let qty_s: String = r.get(2)?;
        let cost_s: Option<String> = r.get(3)?;
        let Some(&at) = index.get(&movement_id) else {
            continue;
        };
        movements[at].lines.push(MovementLine {
            item_id: r.get(1)?,
            qty: parse_stored_decimal(&qty_s)?,
            unit_cost: cost_s.as_deref().map(parse_stored_decimal).transpose()?,
        });
    }
    Ok(movements)
}

fn load_snapshot(conn: &Connection, closing_id: i64) -> Result<Snapshot> {
    let (warehouse_id, date_s, closed_by): (i64, String, String) = conn.query_row(
        "SELECT warehouse_id, closing_date, closed_by FROM closings WHERE id=?1",
        params![closing_id],
        |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
    )?;
    let mut balances = HashMap::new();
    let mut stmt =
        conn.prepare("SELECT item_id, balance FROM closing_balances WHERE closing_id=?1")?;
    let mut rows = stmt.query(params![closing_id])?;
    while let Some(r) = rows.next()? {
        let item_id: i64 = r.get(0)?;
        let bal_s: String = r.get(1)?;
        balances.insert(item_id, parse_stored_decimal(&bal_s)?);
    }
    Ok(Snapshot {
        id: closing_id,
        warehouse_id,
        closing_date: parse_stored_date(&date_s)?,
        closed_by,
        balances,
    })
}

fn latest_closing_where(
    conn: &Connection,
    warehouse_id: i64,
    date_cmp: &str,
    date: NaiveDate,
) -> Result<Option<Snapshot>> {
    let sql = format!(
        "SELECT id FROM closings WHERE warehouse_id=?1 AND closing_date {} ?2
         ORDER BY closing_date DESC LIMIT 1",
        date_cmp
    );
    let id: Option<i64> = conn
        .query_row(&sql, params![warehouse_id, date.to_string()], |r| r.get(0))
        .optional()?;
    id.map(|id| load_snapshot(conn, id)).transpose()
}

/// Latest closing dated on or before `as_of`: the seed for balance
/// computation as of that date.
pub fn latest_closing(
    conn: &Connection,
    warehouse_id: i64,
    as_of: NaiveDate,
) -> Result<Option<Snapshot>> {
    latest_closing_where(conn, warehouse_id, "<=", as_of)
}

/// Latest closing dated strictly before `date`: the seed for a ledger
/// opening balance, which excludes `date` itself.
pub fn latest_closing_before(
    conn: &Connection,
    warehouse_id: i64,
    date: NaiveDate,
) -> Result<Option<Snapshot>> {
    latest_closing_where(conn, warehouse_id, "<", date)
}

/// Date of the warehouse's most recent closing, if any. Movements dated on
/// or before it are locked for edits.
pub fn latest_closing_date(conn: &Connection, warehouse_id: i64) -> Result<Option<NaiveDate>> {
    let d: Option<String> = conn
        .query_row(
            "SELECT closing_date FROM closings WHERE warehouse_id=?1
             ORDER BY closing_date DESC LIMIT 1",
            params![warehouse_id],
            |r| r.get(0),
        )
        .optional()?;
    d.as_deref().map(parse_stored_date).transpose()
}

pub fn warehouse_ids(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT id FROM warehouses ORDER BY name")?;
    let rows = stmt.query_map([], |r| r.get::<_, i64>(0))?;
    let mut ids = Vec::new();
    for row in rows {
        ids.push(row?);
    }
    Ok(ids)
}
