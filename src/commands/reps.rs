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
        Some(("issue", sub)) => record_custody(conn, sub, MovementKind::RepIssue)?,
        Some(("return", sub)) => record_custody(conn, sub, MovementKind::RepReturn)?,
        _ => {}
    }
    Ok(())
}

fn record_custody(conn: &mut Connection, sub: &clap::ArgMatches, kind: MovementKind) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let warehouse = sub.get_one::<String>("warehouse").unwrap();
    let rep = sub.get_one::<String>("rep").unwrap();
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
            rep: Some(rep.as_str()),
            reference: None,
            note: None,
            lines,
        },
    )?;
    println!(
        "Recorded {} #{} for rep '{}' at '{}' on {}",
        kind.as_str(),
        id,
        rep,
        warehouse,
        date
    );
    Ok(())
}
