// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::stock::{print_movement_rows, query_movement_rows};
use crate::models::MovementKind;
use crate::utils::{
    ensure_unlocked, id_for_warehouse, parse_date, parse_line_spec, record_movement, MovementDraft,
};
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("list", sub)) => {
            let data = query_movement_rows(conn, sub, Some(MovementKind::Purchase))?;
            print_movement_rows(sub, data)?;
        }
        _ => {}
    }
    Ok(())
}

/// Item cost follows the invoice: each line's unit cost becomes the item's
/// current cost, inside the same transaction as the document write.
fn cascade_costs(conn: &Connection, lines: &[(i64, Decimal, Option<Decimal>)]) -> Result<()> {
    for (item_id, _, unit_cost) in lines {
        if let Some(cost) = unit_cost {
            conn.execute(
                "UPDATE items SET cost=?1 WHERE id=?2",
                params![cost.to_string(), item_id],
            )?;
        }
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let warehouse = sub.get_one::<String>("warehouse").unwrap();
    let warehouse_id = id_for_warehouse(conn, warehouse)?;
    let mut lines = Vec::new();
    for spec in sub.get_many::<String>("line").into_iter().flatten() {
        lines.push(parse_line_spec(conn, spec)?);
    }

    let tx = conn.transaction()?;
    let id = record_movement(
        &tx,
        &MovementDraft {
            kind: MovementKind::Purchase,
            date,
            warehouse_id: Some(warehouse_id),
            dest_warehouse_id: None,
            status: None,
            rep: None,
            reference: sub.get_one::<String>("reference").map(|s| s.as_str()),
            note: sub.get_one::<String>("note").map(|s| s.as_str()),
            lines: lines.clone(),
        },
    )?;
    cascade_costs(&tx, &lines)?;
    tx.commit()?;
    println!("Recorded purchase #{} at '{}' on {}", id, warehouse, date);
    Ok(())
}

fn edit(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let (kind, old_date_s, warehouse_id): (String, String, Option<i64>) = conn
        .query_row(
            "SELECT kind, date, warehouse_id FROM movements WHERE id=?1",
            params![id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?
        .with_context(|| format!("Purchase #{} not found", id))?;
    if kind != MovementKind::Purchase.as_str() {
        return Err(anyhow!("Movement #{} is a {}, not a purchase", id, kind));
    }
    let old_date = parse_date(&old_date_s)?;
    let new_date = match sub.get_one::<String>("date") {
        Some(raw) => parse_date(raw)?,
        None => old_date,
    };
    // both the old and the new document dates must be outside closed periods
    if let Some(wh) = warehouse_id {
        ensure_unlocked(conn, wh, old_date)?;
        ensure_unlocked(conn, wh, new_date)?;
    }

    let mut lines = Vec::new();
    for spec in sub.get_many::<String>("line").into_iter().flatten() {
        lines.push(parse_line_spec(conn, spec)?);
    }
    for (_, qty, _) in &lines {
        if *qty <= Decimal::ZERO {
            return Err(anyhow!("Quantity '{}' must be positive", qty));
        }
    }

    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE movements SET date=?1, reference=COALESCE(?2, reference) WHERE id=?3",
        params![
            new_date.to_string(),
            sub.get_one::<String>("reference").map(|s| s.as_str()),
            id
        ],
    )?;
    tx.execute("DELETE FROM movement_lines WHERE movement_id=?1", params![id])?;
    for (item_id, qty, unit_cost) in &lines {
        tx.execute(
            "INSERT INTO movement_lines(movement_id, item_id, qty, unit_cost) VALUES (?1,?2,?3,?4)",
            params![
                id,
                item_id,
                qty.to_string(),
                unit_cost.map(|c| c.to_string())
            ],
        )?;
    }
    cascade_costs(&tx, &lines)?;
    tx.commit()?;
    println!("Updated purchase #{} ({} lines)", id, lines.len());
    Ok(())
}
