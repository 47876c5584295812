// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            conn.execute("DELETE FROM items WHERE name=?1", params![name])?;
            println!("Removed item '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let unit = sub.get_one::<String>("unit").unwrap().trim().to_string();
    let price = parse_decimal(sub.get_one::<String>("price").unwrap().trim())?;
    let cost = parse_decimal(sub.get_one::<String>("cost").unwrap().trim())?;
    let reorder = parse_decimal(sub.get_one::<String>("reorder").unwrap().trim())?;
    let barcode = sub
        .get_one::<String>("barcode")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());
    conn.execute(
        "INSERT INTO items(name, unit, price, cost, reorder_point, barcode)
         VALUES (?1,?2,?3,?4,?5,?6)",
        params![
            name,
            unit,
            price.to_string(),
            cost.to_string(),
            reorder.to_string(),
            barcode
        ],
    )?;
    println!("Added item '{}' ({}, price {})", name, unit, price);
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let mut sets: Vec<String> = Vec::new();
    let mut vals: Vec<String> = Vec::new();
    if let Some(unit) = sub.get_one::<String>("unit") {
        sets.push("unit=?".into());
        vals.push(unit.trim().to_string());
    }
    for (arg, col) in [
        ("price", "price"),
        ("cost", "cost"),
        ("reorder", "reorder_point"),
    ] {
        if let Some(raw) = sub.get_one::<String>(arg) {
            sets.push(format!("{}=?", col));
            vals.push(parse_decimal(raw.trim())?.to_string());
        }
    }
    if let Some(barcode) = sub.get_one::<String>("barcode") {
        sets.push("barcode=?".into());
        vals.push(barcode.trim().to_string());
    }
    if sets.is_empty() {
        println!("Nothing to update for '{}'", name);
        return Ok(());
    }
    vals.push(name.clone());
    let sql = format!("UPDATE items SET {} WHERE name=?", sets.join(", "));
    let params: Vec<&dyn rusqlite::ToSql> =
        vals.iter().map(|v| v as &dyn rusqlite::ToSql).collect();
    let changed = conn.execute(&sql, rusqlite::params_from_iter(params))?;
    if changed == 0 {
        println!("Item '{}' not found", name);
    } else {
        println!("Updated item '{}'", name);
    }
    Ok(())
}

#[derive(Serialize)]
struct ItemRow {
    name: String,
    unit: String,
    price: String,
    cost: String,
    reorder_point: String,
    barcode: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let mut stmt = conn.prepare(
        "SELECT name, unit, price, cost, reorder_point, COALESCE(barcode,'')
         FROM items ORDER BY name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(ItemRow {
            name: r.get(0)?,
            unit: r.get(1)?,
            price: r.get(2)?,
            cost: r.get(3)?,
            reorder_point: r.get(4)?,
            barcode: r.get(5)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .into_iter()
            .map(|r| vec![r.name, r.unit, r.price, r.cost, r.reorder_point, r.barcode])
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Name", "Unit", "Price", "Cost", "Reorder", "Barcode"],
                rows
            )
        );
    }
    Ok(())
}
