// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::MovementKind;
use crate::utils::{id_for_warehouse, parse_date, parse_line_spec, record_movement, MovementDraft};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        // customer goods coming back in
        Some(("sale", sub)) => record_return(conn, sub, MovementKind::SaleReturn)?,
        // goods going back to the supplier
        Some(("purchase", sub)) => record_return(conn, sub, MovementKind::PurchaseReturn)?,
        _ => {}
    }
    Ok(())
}

fn record_return(conn: &mut Connection, sub: &clap::ArgMatches, kind: MovementKind) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let warehouse = sub.get_one::<String>("warehouse").unwrap();
    let warehouse_id = id_for_warehouse(conn, warehouse)?;
    let mut lines = Vec::new();
    for spec in sub.get_many::<String>("line").into_iter().flatten() {
        lines.push(parse_line_spec(conn, spec)?);
    }
    let id = record_movement(
        conn,
        &MovementDraft {
            kind,
            date,
            warehouse_id: Some(warehouse_id),
            dest_warehouse_id: None,
            status: None,
            rep: None,
            reference: sub.get_one::<String>("reference").map(|s| s.as_str()),
            note: None,
            lines,
        },
    )?;
    println!("Recorded {} #{} at '{}' on {}", kind.as_str(), id, warehouse, date);
    Ok(())
}
