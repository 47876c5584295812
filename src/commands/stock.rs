// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::MovementKind;
use crate::utils::{
    maybe_print_json, parse_date, parse_line_spec, pretty_table, record_movement, MovementDraft,
};
use anyhow::{anyhow, Result};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("in", sub)) => simple_movement(conn, sub, MovementKind::StockIn)?,
        Some(("out", sub)) => simple_movement(conn, sub, MovementKind::StockOut)?,
        Some(("transfer", sub)) => transfer(conn, sub)?,
        Some(("adjust", sub)) => adjust(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn parse_lines(
    conn: &Connection,
    sub: &clap::ArgMatches,
) -> Result<Vec<(i64, rust_decimal::Decimal, Option<rust_decimal::Decimal>)>> {
    let mut lines = Vec::new();
    for spec in sub.get_many::<String>("line").into_iter().flatten() {
        lines.push(parse_line_spec(conn, spec)?);
    }
    Ok(lines)
}

fn simple_movement(conn: &mut Connection, sub: &clap::ArgMatches, kind: MovementKind) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let warehouse = sub.get_one::<String>("warehouse").unwrap();
    let warehouse_id = crate::utils::id_for_warehouse(conn, warehouse)?;
    let lines = parse_lines(conn, sub)?;
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
            note: sub.get_one::<String>("note").map(|s| s.as_str()),
            lines,
        },
    )?;
    println!("Recorded {} #{} at '{}' on {}", kind.as_str(), id, warehouse, date);
    Ok(())
}

fn transfer(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let from = sub.get_one::<String>("from").unwrap();
    let to = sub.get_one::<String>("to").unwrap();
    if from == to {
        return Err(anyhow!("Transfer source and destination must differ"));
    }
    let from_id = crate::utils::id_for_warehouse(conn, from)?;
    let to_id = crate::utils::id_for_warehouse(conn, to)?;
    let lines = parse_lines(conn, sub)?;
    let id = record_movement(
        conn,
        &MovementDraft {
            kind: MovementKind::Transfer,
            date,
            warehouse_id: Some(from_id),
            dest_warehouse_id: Some(to_id),
            status: None,
            rep: None,
            reference: sub.get_one::<String>("reference").map(|s| s.as_str()),
            note: None,
            lines,
        },
    )?;
    println!("Recorded transfer #{} {} -> {} on {}", id, from, to, date);
    Ok(())
}

fn adjust(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let warehouse = sub.get_one::<String>("warehouse").unwrap();
    let warehouse_id = crate::utils::id_for_warehouse(conn, warehouse)?;
    let lines = parse_lines(conn, sub)?;
    let id = record_movement(
        conn,
        &MovementDraft {
            kind: MovementKind::Adjustment,
            date,
            warehouse_id: Some(warehouse_id),
            dest_warehouse_id: None,
            status: None,
            rep: None,
            reference: None,
            note: sub.get_one::<String>("note").map(|s| s.as_str()),
            lines,
        },
    )?;
    println!("Recorded adjustment #{} at '{}' on {}", id, warehouse, date);
    Ok(())
}

#[derive(Serialize)]
pub struct MovementRow {
    pub id: i64,
    pub date: String,
    pub kind: String,
    pub warehouse: String,
    pub destination: String,
    pub status: String,
    pub rep: String,
    pub reference: String,
    pub lines: String,
}

/// Shared list query; `kind` pre-filters for the per-document list commands.
pub fn query_movement_rows(
    conn: &Connection,
    sub: &clap::ArgMatches,
    kind: Option<MovementKind>,
) -> Result<Vec<MovementRow>> {
    let mut sql = String::from(
        "SELECT m.id, m.date, m.kind, COALESCE(w1.name,''), COALESCE(w2.name,''),
                COALESCE(m.status,''), COALESCE(m.rep,''), COALESCE(m.reference,''),
                COALESCE((SELECT GROUP_CONCAT(COALESCE(i.name,'(unknown)') || ' x' || l.qty, ', ')
                 FROM movement_lines l LEFT JOIN items i ON i.id=l.item_id
                 WHERE l.movement_id=m.id), '')
         FROM movements m
         LEFT JOIN warehouses w1 ON m.warehouse_id=w1.id
         LEFT JOIN warehouses w2 ON m.dest_warehouse_id=w2.id
         WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(k) = kind {
        sql.push_str(" AND m.kind=?");
        params_vec.push(k.as_str().to_string());
    } else if let Some(k) = sub.get_one::<String>("kind") {
        let k = MovementKind::parse(k.trim())
            .ok_or_else(|| anyhow!("Unknown movement kind '{}'", k))?;
        sql.push_str(" AND m.kind=?");
        params_vec.push(k.as_str().to_string());
    }
    if let Some(wh) = sub.get_one::<String>("warehouse") {
        sql.push_str(" AND (w1.name=? OR w2.name=?)");
        params_vec.push(wh.clone());
        params_vec.push(wh.clone());
    }
    if let Some(month) = sub.get_one::<String>("month") {
        sql.push_str(" AND substr(m.date,1,7)=?");
        params_vec.push(month.clone());
    }
    sql.push_str(" ORDER BY m.date DESC, m.id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let mut rows = stmt.query(rusqlite::params_from_iter(params))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(MovementRow {
            id: r.get(0)?,
            date: r.get(1)?,
            kind: r.get(2)?,
            warehouse: r.get(3)?,
            destination: r.get(4)?,
            status: r.get(5)?,
            rep: r.get(6)?,
            reference: r.get(7)?,
            lines: r.get(8)?,
        });
    }
    Ok(data)
}

pub fn print_movement_rows(sub: &clap::ArgMatches, data: Vec<MovementRow>) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .into_iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date,
                    r.kind,
                    r.warehouse,
                    r.destination,
                    r.status,
                    r.rep,
                    r.reference,
                    r.lines,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Kind", "Warehouse", "Dest", "Status", "Rep", "Ref", "Lines"],
                rows,
            )
        );
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_movement_rows(conn, sub, None)?;
    print_movement_rows(sub, data)
}
