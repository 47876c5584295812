// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("items", sub)) => export_items(conn, sub),
        Some(("movements", sub)) => export_movements(conn, sub),
        _ => Ok(()),
    }
}

fn export_items(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut stmt = conn.prepare(
        "SELECT name, unit, price, cost, reorder_point, barcode FROM items ORDER BY name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, Option<String>>(5)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["name", "unit", "price", "cost", "reorder_point", "barcode"])?;
            for row in rows {
                let (n, u, p, c, rp, b) = row?;
                wtr.write_record([n, u, p, c, rp, b.unwrap_or_default()])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let (n, u, p, c, rp, b) = row?;
                items.push(json!({
                    "name": n, "unit": u, "price": p, "cost": c, "reorder_point": rp, "barcode": b
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
        }
    }
    println!("Exported items to {}", out);
    Ok(())
}

fn export_movements(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    // one row per document line
    let mut stmt = conn.prepare(
        "SELECT m.id, m.date, m.kind, COALESCE(w1.name,''), COALESCE(w2.name,''),
                COALESCE(m.status,''), COALESCE(m.rep,''), COALESCE(m.reference,''),
                COALESCE(i.name,'(unknown)'), l.qty, COALESCE(l.unit_cost,'')
         FROM movement_lines l
         JOIN movements m ON l.movement_id=m.id
         LEFT JOIN warehouses w1 ON m.warehouse_id=w1.id
         LEFT JOIN warehouses w2 ON m.dest_warehouse_id=w2.id
         LEFT JOIN items i ON l.item_id=i.id
         ORDER BY m.date, m.id, l.id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
            r.get::<_, String>(6)?,
            r.get::<_, String>(7)?,
            r.get::<_, String>(8)?,
            r.get::<_, String>(9)?,
            r.get::<_, String>(10)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id", "date", "kind", "warehouse", "destination", "status", "rep", "reference",
                "item", "qty", "unit_cost",
            ])?;
            for row in rows {
                let (id, d, k, w1, w2, st, rep, rf, item, qty, cost) = row?;
                wtr.write_record([id.to_string(), d, k, w1, w2, st, rep, rf, item, qty, cost])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut docs = Vec::new();
            for row in rows {
                let (id, d, k, w1, w2, st, rep, rf, item, qty, cost) = row?;
                docs.push(json!({
                    "id": id, "date": d, "kind": k, "warehouse": w1, "destination": w2,
                    "status": st, "rep": rep, "reference": rf,
                    "item": item, "qty": qty, "unit_cost": cost
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&docs)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
        }
    }
    println!("Exported movements to {}", out);
    Ok(())
}
