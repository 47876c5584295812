// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::db;
use crate::models::{DocumentStatus, MovementKind};

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
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

pub fn id_for_item(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM items WHERE name=?1 OR barcode=?1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Item '{}' not found", name))?;
    Ok(id)
}

pub fn id_for_warehouse(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM warehouses WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Warehouse '{}' not found", name))?;
    Ok(id)
}

pub fn warehouse_names(conn: &Connection) -> Result<HashMap<i64, String>> {
    let mut stmt = conn.prepare("SELECT id, name FROM warehouses")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?;
    let mut map = HashMap::new();
    for row in rows {
        let (id, name) = row?;
        map.insert(id, name);
    }
    Ok(map)
}

// Operator name stamped onto closings
pub fn get_operator(conn: &Connection) -> Result<String> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key='operator'", [], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v.unwrap_or_else(|| "admin".to_string()))
}

pub fn set_operator(conn: &Connection, name: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('operator', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![name],
    )?;
    Ok(())
}

/// Parse a repeatable `--line NAME:QTY[:UNIT_COST]` argument. Item names may
/// not contain ':'; barcodes are accepted in place of names.
pub fn parse_line_spec(conn: &Connection, spec: &str) -> Result<(i64, Decimal, Option<Decimal>)> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(anyhow!(
            "Invalid line '{}', expected ITEM:QTY or ITEM:QTY:UNIT_COST",
            spec
        ));
    }
    let item_id = id_for_item(conn, parts[0].trim())?;
    let qty = parse_decimal(parts[1].trim())
        .with_context(|| format!("Invalid quantity in line '{}'", spec))?;
    let unit_cost = match parts.get(2) {
        Some(s) => Some(
            parse_decimal(s.trim()).with_context(|| format!("Invalid cost in line '{}'", spec))?,
        ),
        None => None,
    };
    Ok((item_id, qty, unit_cost))
}

/// Reject writes dated inside a closed period. Movements on or before the
/// warehouse's latest closing date are locked.
pub fn ensure_unlocked(conn: &Connection, warehouse_id: i64, date: NaiveDate) -> Result<()> {
    if let Some(closed) = db::latest_closing_date(conn, warehouse_id)? {
        if date <= closed {
            let name = warehouse_names(conn)?
                .get(&warehouse_id)
                .cloned()
                .unwrap_or_else(|| warehouse_id.to_string());
            return Err(anyhow!(
                "Warehouse '{}' is closed through {}; movements dated {} or earlier are locked",
                name,
                closed,
                closed
            ));
        }
    }
    Ok(())
}

pub struct MovementDraft<'a> {
    pub kind: MovementKind,
    pub date: NaiveDate,
    pub warehouse_id: Option<i64>,
    pub dest_warehouse_id: Option<i64>,
    pub status: Option<DocumentStatus>,
    pub rep: Option<&'a str>,
    pub reference: Option<&'a str>,
    pub note: Option<&'a str>,
    pub lines: Vec<(i64, Decimal, Option<Decimal>)>,
}

/// Insert a movement document (header + lines). Callers wanting atomicity
/// with related writes pass a `rusqlite::Transaction`'s connection. Both
/// endpoints of a transfer are lock-checked. Adjustment quantities are
/// signed differences and must be non-zero; every other kind requires
/// positive quantities.
pub fn record_movement(conn: &Connection, draft: &MovementDraft) -> Result<i64> {
    if draft.lines.is_empty() {
        return Err(anyhow!("A movement needs at least one --line"));
    }
    for (_, qty, _) in &draft.lines {
        match draft.kind {
            MovementKind::Adjustment => {
                if qty.is_zero() {
                    return Err(anyhow!("Adjustment difference must be non-zero"));
                }
            }
            _ => {
                if *qty <= Decimal::ZERO {
                    return Err(anyhow!("Quantity '{}' must be positive", qty));
                }
            }
        }
    }
    for wh in [draft.warehouse_id, draft.dest_warehouse_id].into_iter().flatten() {
        ensure_unlocked(conn, wh, draft.date)?;
    }
    conn.execute(
        "INSERT INTO movements(kind, date, warehouse_id, dest_warehouse_id, status, rep, reference, note)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
        params![
            draft.kind.as_str(),
            draft.date.to_string(),
            draft.warehouse_id,
            draft.dest_warehouse_id,
            draft.status.map(|s| s.as_str()),
            draft.rep,
            draft.reference,
            draft.note
        ],
    )?;
    let movement_id = conn.last_insert_rowid();
    for (item_id, qty, unit_cost) in &draft.lines {
        conn.execute(
            "INSERT INTO movement_lines(movement_id, item_id, qty, unit_cost) VALUES (?1,?2,?3,?4)",
            params![
                movement_id,
                item_id,
                qty.to_string(),
                unit_cost.map(|c| c.to_string())
            ],
        )?;
    }
    Ok(movement_id)
}
