// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::{db, engine, utils};
use crate::models::Snapshot;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("stock-status", sub)) => stock_status(conn, sub)?,
        Some(("ledger", sub)) => ledger(conn, sub)?,
        Some(("low-stock", sub)) => low_stock(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn as_of_date(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    match sub.get_one::<String>("as-of") {
        Some(raw) => utils::parse_date(raw),
        None => Ok(utils::today()),
    }
}

struct ItemRef {
    id: i64,
    name: String,
    unit: String,
    reorder_point: Decimal,
}

fn all_items(conn: &Connection) -> Result<Vec<ItemRef>> {
    let mut stmt =
        conn.prepare("SELECT id, name, unit, reorder_point FROM items ORDER BY name")?;
    let mut rows = stmt.query([])?;
    let mut items = Vec::new();
    while let Some(r) = rows.next()? {
        let name: String = r.get(1)?;
        let reorder_s: String = r.get(3)?;
        let reorder_point = reorder_s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid reorder point '{}' for '{}'", reorder_s, name))?;
        items.push(ItemRef {
            id: r.get(0)?,
            name,
            unit: r.get(2)?,
            reorder_point,
        });
    }
    Ok(items)
}

/// Per-warehouse seeds for an all-warehouse report: each warehouse pairs
/// with its own latest snapshot on or before `as_of`.
fn warehouse_seeds(conn: &Connection, as_of: NaiveDate) -> Result<Vec<(i64, Option<Snapshot>)>> {
    let mut seeds = Vec::new();
    for wh in db::warehouse_ids(conn)? {
        seeds.push((wh, db::latest_closing(conn, wh, as_of)?));
    }
    Ok(seeds)
}

#[derive(Serialize)]
struct StatusRow {
    item: String,
    unit: String,
    balance: String,
    reorder_point: String,
    low: bool,
}

fn stock_status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let nonzero = sub.get_flag("nonzero");
    let all = sub.get_flag("all");
    let as_of = as_of_date(sub)?;
    if !all && sub.get_one::<String>("warehouse").is_none() {
        return Err(anyhow!("Choose a warehouse with --warehouse, or pass --all"));
    }

    let movements = db::load_movements(conn)?;
    let items = all_items(conn)?;

    let mut data = Vec::new();
    if all {
        let seeds = warehouse_seeds(conn, as_of)?;
        let pairs: Vec<(i64, Option<&Snapshot>)> =
            seeds.iter().map(|(wh, s)| (*wh, s.as_ref())).collect();
        for item in &items {
            let balance = engine::compute_balance_all(item.id, &pairs, as_of, &movements);
            // zero filtering happens after the per-warehouse split, never before
            if nonzero && balance.is_zero() {
                continue;
            }
            data.push(status_row(item, balance));
        }
    } else {
        let warehouse = sub.get_one::<String>("warehouse").unwrap();
        let warehouse_id = utils::id_for_warehouse(conn, warehouse)?;
        let snapshot = db::latest_closing(conn, warehouse_id, as_of)?;
        for item in &items {
            let balance =
                engine::compute_balance(item.id, warehouse_id, as_of, &movements, snapshot.as_ref());
            if nonzero && balance.is_zero() {
                continue;
            }
            data.push(status_row(item, balance));
        }
    }

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .into_iter()
            .map(|r| {
                vec![
                    r.item,
                    r.unit,
                    r.balance,
                    r.reorder_point,
                    if r.low { "LOW".into() } else { String::new() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Item", "Unit", "Balance", "Reorder", ""], rows)
        );
    }
    Ok(())
}

fn status_row(item: &ItemRef, balance: Decimal) -> StatusRow {
    StatusRow {
        item: item.name.clone(),
        unit: item.unit.clone(),
        balance: balance.normalize().to_string(),
        reorder_point: item.reorder_point.normalize().to_string(),
        low: item.reorder_point > Decimal::ZERO && balance <= item.reorder_point,
    }
}

fn ledger(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let item = sub.get_one::<String>("item").unwrap();
    let warehouse = sub.get_one::<String>("warehouse").unwrap();
    let from = utils::parse_date(sub.get_one::<String>("from").unwrap())?;
    let to = utils::parse_date(sub.get_one::<String>("to").unwrap())?;
    if from > to {
        return Err(anyhow!("--from {} is after --to {}", from, to));
    }
    let item_id = utils::id_for_item(conn, item)?;
    let warehouse_id = utils::id_for_warehouse(conn, warehouse)?;

    let movements = db::load_movements(conn)?;
    let snapshot = db::latest_closing_before(conn, warehouse_id, from)?;
    let ledger = engine::compute_ledger(item_id, warehouse_id, from, to, &movements, snapshot.as_ref());

    if !maybe_print_json(json_flag, jsonl_flag, &ledger)? {
        let mut rows = vec![vec![
            from.to_string(),
            "Opening balance".to_string(),
            String::new(),
            String::new(),
            String::new(),
            ledger.opening.normalize().to_string(),
        ]];
        for e in &ledger.entries {
            rows.push(vec![
                e.date.to_string(),
                e.description.clone(),
                e.reference.clone(),
                e.incoming.normalize().to_string(),
                e.outgoing.normalize().to_string(),
                e.balance.normalize().to_string(),
            ]);
        }
        println!(
            "{}",
            pretty_table(&["Date", "Document", "Ref", "In", "Out", "Balance"], rows)
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct LowStockRow {
    item: String,
    unit: String,
    balance: String,
    reorder_point: String,
}

fn low_stock(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let as_of = utils::today();
    let movements = db::load_movements(conn)?;
    let items = all_items(conn)?;

    let balances: Vec<(usize, Decimal)> = match sub.get_one::<String>("warehouse") {
        Some(warehouse) => {
            let warehouse_id = utils::id_for_warehouse(conn, warehouse)?;
            let snapshot = db::latest_closing(conn, warehouse_id, as_of)?;
            items
                .iter()
                .enumerate()
                .map(|(at, item)| {
                    (
                        at,
                        engine::compute_balance(
                            item.id,
                            warehouse_id,
                            as_of,
                            &movements,
                            snapshot.as_ref(),
                        ),
                    )
                })
                .collect()
        }
        None => {
            let seeds = warehouse_seeds(conn, as_of)?;
            let pairs: Vec<(i64, Option<&Snapshot>)> =
                seeds.iter().map(|(wh, s)| (*wh, s.as_ref())).collect();
            items
                .iter()
                .enumerate()
                .map(|(at, item)| {
                    (
                        at,
                        engine::compute_balance_all(item.id, &pairs, as_of, &movements),
                    )
                })
                .collect()
        }
    };

    let mut data = Vec::new();
    for (at, balance) in balances {
        let item = &items[at];
        if item.reorder_point > Decimal::ZERO && balance <= item.reorder_point {
            data.push(LowStockRow {
                item: item.name.clone(),
                unit: item.unit.clone(),
                balance: balance.normalize().to_string(),
                reorder_point: item.reorder_point.normalize().to_string(),
            });
        }
    }

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .into_iter()
            .map(|r| vec![r.item, r.unit, r.balance, r.reorder_point])
            .collect();
        println!(
            "{}",
            pretty_table(&["Item", "Unit", "Balance", "Reorder"], rows)
        );
    }
    Ok(())
}
