// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Stock balance and item-ledger computation.
//!
//! Pure functions over already-loaded movement documents plus an optional
//! prior closing snapshot. No I/O, no hidden state: the same inputs always
//! produce the same balance. Dangling item or warehouse references
//! contribute zero rather than erroring; callers render missing names as
//! "(unknown)".

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{DocumentStatus, Movement, MovementKind, Snapshot};

/// Whether a document affects stock at all. Sales invoices count only once
/// approved; a missing status means approved. Every other kind always counts.
pub fn moves_stock(m: &Movement) -> bool {
    match m.kind {
        MovementKind::Sale => m.status.is_none_or(|s| s == DocumentStatus::Approved),
        _ => true,
    }
}

/// Signed quantity one line contributes to `warehouse_id`. Transfers are
/// outbound at the source and inbound at the destination; adjustment lines
/// already carry a signed difference.
fn line_delta(m: &Movement, qty: Decimal, warehouse_id: i64) -> Decimal {
    match m.kind {
        MovementKind::Purchase
        | MovementKind::StockIn
        | MovementKind::SaleReturn
        | MovementKind::RepReturn => {
            if m.warehouse_id == Some(warehouse_id) {
                qty
            } else {
                Decimal::ZERO
            }
        }
        MovementKind::Sale
        | MovementKind::PosSale
        | MovementKind::StockOut
        | MovementKind::PurchaseReturn
        | MovementKind::RepIssue => {
            if m.warehouse_id == Some(warehouse_id) {
                -qty
            } else {
                Decimal::ZERO
            }
        }
        MovementKind::Adjustment => {
            if m.warehouse_id == Some(warehouse_id) {
                qty
            } else {
                Decimal::ZERO
            }
        }
        MovementKind::Transfer => {
            let mut d = Decimal::ZERO;
            if m.warehouse_id == Some(warehouse_id) {
                d -= qty;
            }
            if m.dest_warehouse_id == Some(warehouse_id) {
                d += qty;
            }
            d
        }
    }
}

/// Net signed quantity a document contributes for `item_id` at
/// `warehouse_id`. Zero for pending sales and for documents that do not
/// touch the item or the warehouse.
pub fn movement_delta(m: &Movement, item_id: i64, warehouse_id: i64) -> Decimal {
    if !moves_stock(m) {
        return Decimal::ZERO;
    }
    let mut total = Decimal::ZERO;
    for line in &m.lines {
        if line.item_id == item_id {
            total += line_delta(m, line.qty, warehouse_id);
        }
    }
    total
}

/// Baseline-plus-window reduction shared by balance and ledger computation.
/// The window starts strictly after the snapshot date (movements on or
/// before it are already inside the snapshot balance) and the upper bound is
/// supplied by the caller.
fn fold_balance(
    item_id: i64,
    warehouse_id: i64,
    movements: &[Movement],
    snapshot: Option<&Snapshot>,
    in_window: impl Fn(NaiveDate) -> bool,
) -> Decimal {
    let mut total = snapshot.map_or(Decimal::ZERO, |s| s.balance_for(item_id));
    let floor = snapshot.map(|s| s.closing_date);
    for m in movements {
        if floor.is_some_and(|f| m.date <= f) {
            continue;
        }
        if !in_window(m.date) {
            continue;
        }
        total += movement_delta(m, item_id, warehouse_id);
    }
    total
}

/// Quantity on hand for one item at one warehouse as of `as_of` (inclusive).
///
/// `snapshot` must be the warehouse's latest closing dated on or before
/// `as_of`, or None; the snapshot balance is authoritative at its own date
/// and only movements dated strictly after it are scanned.
pub fn compute_balance(
    item_id: i64,
    warehouse_id: i64,
    as_of: NaiveDate,
    movements: &[Movement],
    snapshot: Option<&Snapshot>,
) -> Decimal {
    fold_balance(item_id, warehouse_id, movements, snapshot, |d| d <= as_of)
}

/// All-warehouse total: one engine run per warehouse (each seeded from its
/// own snapshot), then summed. Zero-balance filtering in listings must
/// happen after this per-warehouse split, never before.
pub fn compute_balance_all(
    item_id: i64,
    warehouses: &[(i64, Option<&Snapshot>)],
    as_of: NaiveDate,
    movements: &[Movement],
) -> Decimal {
    warehouses
        .iter()
        .map(|(wh, snap)| compute_balance(item_id, *wh, as_of, movements, *snap))
        .sum()
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub description: String,
    pub reference: String,
    pub incoming: Decimal,
    pub outgoing: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ledger {
    pub opening: Decimal,
    pub entries: Vec<LedgerEntry>,
}

/// Item card: opening balance (movements strictly before `from`, seeded from
/// `snapshot`, which must be dated before `from`) plus one entry per
/// stock-moving document in `from..=to`, sorted ascending by date with ties
/// kept in input order, each carrying the running balance after it.
pub fn compute_ledger(
    item_id: i64,
    warehouse_id: i64,
    from: NaiveDate,
    to: NaiveDate,
    movements: &[Movement],
    snapshot: Option<&Snapshot>,
) -> Ledger {
    let opening = fold_balance(item_id, warehouse_id, movements, snapshot, |d| d < from);

    let mut picked: Vec<(&Movement, Decimal)> = movements
        .iter()
        .filter(|m| m.date >= from && m.date <= to)
        .map(|m| (m, movement_delta(m, item_id, warehouse_id)))
        .filter(|(_, delta)| !delta.is_zero())
        .collect();
    picked.sort_by_key(|(m, _)| m.date);

    let mut balance = opening;
    let entries = picked
        .into_iter()
        .map(|(m, delta)| {
            balance += delta;
            LedgerEntry {
                date: m.date,
                description: m.kind.label().to_string(),
                reference: m.reference.clone().unwrap_or_default(),
                incoming: delta.max(Decimal::ZERO),
                outgoing: (-delta).max(Decimal::ZERO),
                balance,
            }
        })
        .collect();

    Ledger { opening, entries }
}
