// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Period closing: freeze per-item balances for one warehouse at a date.
//! `review` previews the snapshot, `commit` persists it. A snapshot becomes
//! the seed for later balance computation and locks earlier dates for edits.

use crate::utils::{
    get_operator, id_for_warehouse, maybe_print_json, parse_date, pretty_table,
};
use crate::{db, engine};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection, TransactionBehavior};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClosingError {
    #[error("closing date {attempted} is not after the latest closing {latest}")]
    NotAfterLatest {
        attempted: NaiveDate,
        latest: NaiveDate,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ProposedBalance {
    pub item_id: i64,
    pub item: String,
    pub balance: Decimal,
}

fn check_after_latest(conn: &Connection, warehouse_id: i64, date: NaiveDate) -> Result<()> {
    if let Some(latest) = db::latest_closing_date(conn, warehouse_id)? {
        if date <= latest {
            return Err(ClosingError::NotAfterLatest {
                attempted: date,
                latest,
            }
            .into());
        }
    }
    Ok(())
}

/// Non-committing preview: every item's balance as of `date`, seeded from
/// the warehouse's latest prior snapshot.
pub fn review_closing(
    conn: &Connection,
    warehouse_id: i64,
    date: NaiveDate,
) -> Result<Vec<ProposedBalance>> {
    check_after_latest(conn, warehouse_id, date)?;
    let movements = db::load_movements(conn)?;
    let snapshot = db::latest_closing(conn, warehouse_id, date)?;

    let mut stmt = conn.prepare("SELECT id, name FROM items ORDER BY name")?;
    let mut rows = stmt.query([])?;
    let mut proposed = Vec::new();
    while let Some(r) = rows.next()? {
        let item_id: i64 = r.get(0)?;
        let item: String = r.get(1)?;
        let balance =
            engine::compute_balance(item_id, warehouse_id, date, &movements, snapshot.as_ref());
        proposed.push(ProposedBalance {
            item_id,
            item,
            balance,
        });
    }
    Ok(proposed)
}

/// Persist a snapshot for `warehouse_id` at `date`. The whole write (header
/// plus every balance row) is one immediate transaction; the
/// strictly-increasing-date precondition is re-checked under its write lock,
/// so of two racing commits the second gets `NotAfterLatest`.
pub fn perform_closing(
    conn: &mut Connection,
    warehouse_id: i64,
    date: NaiveDate,
    closed_by: &str,
) -> Result<i64> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let proposed = review_closing(&tx, warehouse_id, date)?;
    tx.execute(
        "INSERT INTO closings(warehouse_id, closing_date, closed_by) VALUES (?1,?2,?3)",
        params![warehouse_id, date.to_string(), closed_by],
    )?;
    let closing_id = tx.last_insert_rowid();
    for p in &proposed {
        tx.execute(
            "INSERT INTO closing_balances(closing_id, item_id, balance) VALUES (?1,?2,?3)",
            params![closing_id, p.item_id, p.balance.to_string()],
        )?;
    }
    tx.commit()?;
    Ok(closing_id)
}

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("review", sub)) => review(conn, sub)?,
        Some(("commit", sub)) => commit(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn proposed_table(proposed: &[ProposedBalance]) -> comfy_table::Table {
    let rows = proposed
        .iter()
        .map(|p| vec![p.item.clone(), p.balance.normalize().to_string()])
        .collect();
    pretty_table(&["Item", "Balance"], rows)
}

fn review(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let warehouse = sub.get_one::<String>("warehouse").unwrap();
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let warehouse_id = id_for_warehouse(conn, warehouse)?;
    let proposed = review_closing(conn, warehouse_id, date)?;
    println!("{}", proposed_table(&proposed));
    println!(
        "Review only; run `stockclip closing commit --warehouse {} --date {}` to persist.",
        warehouse, date
    );
    Ok(())
}

fn commit(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let warehouse = sub.get_one::<String>("warehouse").unwrap();
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let warehouse_id = id_for_warehouse(conn, warehouse)?;
    let closed_by = get_operator(conn)?;
    let closing_id = perform_closing(conn, warehouse_id, date, &closed_by)?;
    println!(
        "Closed '{}' at {} by {} (snapshot #{}). Movements dated {} or earlier are now locked.",
        warehouse, date, closed_by, closing_id, date
    );
    Ok(())
}

#[derive(Serialize)]
struct ClosingRow {
    warehouse: String,
    closing_date: String,
    items: i64,
    closed_by: String,
    created: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let mut sql = String::from(
        "SELECT COALESCE(w.name,'(unknown)'), c.closing_date,
                (SELECT COUNT(*) FROM closing_balances b WHERE b.closing_id=c.id),
                c.closed_by, c.created_at
         FROM closings c LEFT JOIN warehouses w ON c.warehouse_id=w.id",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(wh) = sub.get_one::<String>("warehouse") {
        sql.push_str(" WHERE w.name=?");
        params_vec.push(wh.clone());
    }
    sql.push_str(" ORDER BY c.closing_date DESC, c.id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let mut rows = stmt.query(rusqlite::params_from_iter(params))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(ClosingRow {
            warehouse: r.get(0)?,
            closing_date: r.get(1)?,
            items: r.get(2)?,
            closed_by: r.get(3)?,
            created: r.get(4)?,
        });
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .into_iter()
            .map(|r| {
                vec![
                    r.warehouse,
                    r.closing_date,
                    r.items.to_string(),
                    r.closed_by,
                    r.created,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Warehouse", "Date", "Items", "Closed by", "Created"], rows)
        );
    }
    Ok(())
}
