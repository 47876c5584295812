// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::stock::{print_movement_rows, query_movement_rows};
use crate::models::{DocumentStatus, MovementKind};
use crate::utils::{
    ensure_unlocked, id_for_warehouse, parse_date, parse_line_spec, record_movement, MovementDraft,
};
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("approve", sub)) => approve(conn, sub)?,
        Some(("list", sub)) => {
            let data = query_movement_rows(conn, sub, Some(MovementKind::Sale))?;
            print_movement_rows(sub, data)?;
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let warehouse = sub.get_one::<String>("warehouse").unwrap();
    let warehouse_id = id_for_warehouse(conn, warehouse)?;
    let status = if sub.get_flag("pending") {
        DocumentStatus::Pending
    } else {
        DocumentStatus::Approved
    };
    let mut lines = Vec::new();
    for spec in sub.get_many::<String>("line").into_iter().flatten() {
        lines.push(parse_line_spec(conn, spec)?);
    }
    let id = record_movement(
        conn,
        &MovementDraft {
            kind: MovementKind::Sale,
            date,
            warehouse_id: Some(warehouse_id),
            dest_warehouse_id: None,
            status: Some(status),
            rep: sub.get_one::<String>("rep").map(|s| s.as_str()),
            reference: sub.get_one::<String>("reference").map(|s| s.as_str()),
            note: sub.get_one::<String>("note").map(|s| s.as_str()),
            lines,
        },
    )?;
    println!(
        "Recorded sale #{} at '{}' on {} ({})",
        id,
        warehouse,
        date,
        status.as_str()
    );
    Ok(())
}

fn approve(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let (kind, date_s, status, warehouse_id): (String, String, Option<String>, Option<i64>) = conn
        .query_row(
            "SELECT kind, date, status, warehouse_id FROM movements WHERE id=?1",
            params![id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .optional()?
        .with_context(|| format!("Sale #{} not found", id))?;
    if kind != MovementKind::Sale.as_str() {
        return Err(anyhow!("Movement #{} is a {}, not a sale", id, kind));
    }
    if status.as_deref() != Some("pending") {
        println!("Sale #{} is already approved", id);
        return Ok(());
    }
    // approving moves stock at the document date, so the date must be open
    let date = parse_date(&date_s)?;
    if let Some(wh) = warehouse_id {
        ensure_unlocked(conn, wh, date)?;
    }
    conn.execute(
        "UPDATE movements SET status='approved' WHERE id=?1",
        params![id],
    )?;
    println!("Approved sale #{}", id);
    Ok(())
}
