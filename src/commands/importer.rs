// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::parse_decimal;
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::{params, Connection};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("items", sub)) => import_items(conn, sub),
        _ => Ok(()),
    }
}

/// Catalog import. Columns: name, unit, price, cost, reorder_point, barcode.
/// All-or-nothing: any bad row rolls the whole file back.
fn import_items(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut imported = 0usize;
    for result in rdr.records() {
        let rec = result?;
        let name = rec.get(0).context("name missing")?.trim().to_string();
        let unit = rec.get(1).unwrap_or("pc").trim().to_string();
        let price = parse_decimal(rec.get(2).unwrap_or("0").trim())
            .with_context(|| format!("Invalid price for '{}'", name))?;
        let cost = parse_decimal(rec.get(3).unwrap_or("0").trim())
            .with_context(|| format!("Invalid cost for '{}'", name))?;
        let reorder = parse_decimal(rec.get(4).unwrap_or("0").trim())
            .with_context(|| format!("Invalid reorder point for '{}'", name))?;
        let barcode = rec
            .get(5)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        tx.execute(
            "INSERT INTO items(name, unit, price, cost, reorder_point, barcode)
             VALUES (?1,?2,?3,?4,?5,?6)
             ON CONFLICT(name) DO UPDATE SET
               unit=excluded.unit, price=excluded.price, cost=excluded.cost,
               reorder_point=excluded.reorder_point, barcode=excluded.barcode",
            params![
                name,
                unit,
                price.to_string(),
                cost.to_string(),
                reorder.to_string(),
                barcode
            ],
        )?;
        imported += 1;
    }
    tx.commit()?;
    println!("Imported {} items from {}", imported, path);
    Ok(())
}
