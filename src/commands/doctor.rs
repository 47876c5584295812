// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{pretty_table, today};
use crate::{db, engine};
use anyhow::Result;
use rusqlite::Connection;

/// Surface what the reports tolerate silently: dangling references, odd
/// statuses, future dates, and snapshots that no longer match recomputation.
pub fn handle(conn: &Connection) -> Result<()> {
    let mut rows = Vec::new();

    // 1) Lines referencing items that no longer exist
    let mut stmt = conn.prepare(
        "SELECT DISTINCT l.item_id FROM movement_lines l
         WHERE l.item_id NOT IN (SELECT id FROM items)",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        rows.push(vec!["line_item_missing".into(), format!("item_id {}", id)]);
    }

    // 2) Movements referencing warehouses that no longer exist
    let mut stmt = conn.prepare(
        "SELECT m.id, m.warehouse_id, m.dest_warehouse_id FROM movements m
         WHERE (m.warehouse_id IS NOT NULL
                AND m.warehouse_id NOT IN (SELECT id FROM warehouses))
            OR (m.dest_warehouse_id IS NOT NULL
                AND m.dest_warehouse_id NOT IN (SELECT id FROM warehouses))",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        rows.push(vec![
            "movement_warehouse_missing".into(),
            format!("movement #{}", id),
        ]);
    }

    // 3) Sales carrying a status the engine does not recognize (treated as
    //    approved when loading)
    let mut stmt = conn.prepare(
        "SELECT id, status FROM movements
         WHERE kind='sale' AND status IS NOT NULL
           AND status NOT IN ('pending','approved')",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let status: String = r.get(1)?;
        rows.push(vec![
            "unknown_sale_status".into(),
            format!("sale #{} status '{}'", id, status),
        ]);
    }

    // 4) Future-dated movements
    let mut stmt = conn.prepare("SELECT id, date FROM movements WHERE date > ?1")?;
    let mut cur = stmt.query([today().to_string()])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let date: String = r.get(1)?;
        rows.push(vec![
            "future_dated_movement".into(),
            format!("movement #{} dated {}", id, date),
        ]);
    }

    // 5) Snapshot drift: stored closing balances vs recomputation at the
    //    closing date (seeded from the previous snapshot)
    let movements = db::load_movements(conn)?;
    let mut stmt =
        conn.prepare("SELECT id, warehouse_id, closing_date FROM closings ORDER BY closing_date")?;
    let mut cur = stmt.query([])?;
    let mut closings = Vec::new();
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let warehouse_id: i64 = r.get(1)?;
        let date_s: String = r.get(2)?;
        closings.push((id, warehouse_id, date_s));
    }
    for (closing_id, warehouse_id, date_s) in closings {
        let date = chrono::NaiveDate::parse_from_str(&date_s, "%Y-%m-%d")?;
        let Some(prev) = date.pred_opt() else { continue };
        let seed = db::latest_closing(conn, warehouse_id, prev)?;
        let mut stmt = conn.prepare(
            "SELECT item_id, balance FROM closing_balances WHERE closing_id=?1",
        )?;
        let mut bal = stmt.query([closing_id])?;
        while let Some(r) = bal.next()? {
            let item_id: i64 = r.get(0)?;
            let stored_s: String = r.get(1)?;
            let stored = stored_s.parse::<rust_decimal::Decimal>()?;
            let computed =
                engine::compute_balance(item_id, warehouse_id, date, &movements, seed.as_ref());
            if computed != stored {
                rows.push(vec![
                    "closing_drift".into(),
                    format!(
                        "closing #{} item {} stored {} computed {}",
                        closing_id, item_id, stored, computed
                    ),
                ]);
            }
        }
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
