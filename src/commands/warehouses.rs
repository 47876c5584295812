// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim().to_string();
            let kind = if sub.get_flag("rep") { "rep" } else { "store" };
            conn.execute(
                "INSERT INTO warehouses(name, kind) VALUES (?1, ?2)",
                params![name, kind],
            )?;
            println!("Added warehouse '{}' ({})", name, kind);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            conn.execute("DELETE FROM warehouses WHERE name=?1", params![name])?;
            println!("Removed warehouse '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct WarehouseRow {
    name: String,
    kind: String,
    created: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let mut stmt =
        conn.prepare("SELECT name, kind, created_at FROM warehouses ORDER BY name")?;
    let rows = stmt.query_map([], |r| {
        Ok(WarehouseRow {
            name: r.get(0)?,
            kind: r.get(1)?,
            created: r.get(2)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .into_iter()
            .map(|r| vec![r.name, r.kind, r.created])
            .collect();
        println!("{}", pretty_table(&["Name", "Kind", "Created"], rows));
    }
    Ok(())
}
