// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub price: Decimal,
    pub cost: Decimal,
    pub reorder_point: Decimal,
    pub barcode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: i64,
    pub name: String,
    pub kind: String, // 'store' or 'rep'
}

/// Every document kind that can move stock. One shared sign table; every
/// report and the closing protocol go through the same signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovementKind {
    Purchase,
    PurchaseReturn,
    Sale,
    SaleReturn,
    PosSale,
    StockIn,
    StockOut,
    Transfer,
    Adjustment,
    RepIssue,
    RepReturn,
}

impl MovementKind {
    pub const ALL: [MovementKind; 11] = [
        MovementKind::Purchase,
        MovementKind::PurchaseReturn,
        MovementKind::Sale,
        MovementKind::SaleReturn,
        MovementKind::PosSale,
        MovementKind::StockIn,
        MovementKind::StockOut,
        MovementKind::Transfer,
        MovementKind::Adjustment,
        MovementKind::RepIssue,
        MovementKind::RepReturn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Purchase => "purchase",
            MovementKind::PurchaseReturn => "purchase-return",
            MovementKind::Sale => "sale",
            MovementKind::SaleReturn => "sale-return",
            MovementKind::PosSale => "pos-sale",
            MovementKind::StockIn => "stock-in",
            MovementKind::StockOut => "stock-out",
            MovementKind::Transfer => "transfer",
            MovementKind::Adjustment => "adjustment",
            MovementKind::RepIssue => "rep-issue",
            MovementKind::RepReturn => "rep-return",
        }
    }

    pub fn parse(s: &str) -> Option<MovementKind> {
        MovementKind::ALL.iter().copied().find(|k| k.as_str() == s)
    }

    /// Human-readable document name used in ledger output.
    pub fn label(&self) -> &'static str {
        match self {
            MovementKind::Purchase => "Purchase invoice",
            MovementKind::PurchaseReturn => "Purchase return",
            MovementKind::Sale => "Sales invoice",
            MovementKind::SaleReturn => "Sales return",
            MovementKind::PosSale => "POS sale",
            MovementKind::StockIn => "Stock in",
            MovementKind::StockOut => "Stock out",
            MovementKind::Transfer => "Stock transfer",
            MovementKind::Adjustment => "Stock adjustment",
            MovementKind::RepIssue => "Issue to rep",
            MovementKind::RepReturn => "Return from rep",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Approved,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Approved => "approved",
        }
    }

    pub fn parse(s: &str) -> Option<DocumentStatus> {
        match s {
            "pending" => Some(DocumentStatus::Pending),
            "approved" => Some(DocumentStatus::Approved),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementLine {
    pub item_id: i64,
    /// Signed for adjustments (the counted difference); positive elsewhere.
    pub qty: Decimal,
    pub unit_cost: Option<Decimal>,
}

/// A stock movement document: one header plus item lines. Transfers carry
/// both endpoints in a single document; `status` is only meaningful for
/// sales invoices (absent means approved).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    pub id: i64,
    pub kind: MovementKind,
    pub date: NaiveDate,
    pub warehouse_id: Option<i64>,
    pub dest_warehouse_id: Option<i64>,
    pub status: Option<DocumentStatus>,
    pub rep: Option<String>,
    pub reference: Option<String>,
    pub lines: Vec<MovementLine>,
}

/// An immutable period-closing snapshot: per-item balances for one warehouse
/// at its closing date. Serves as the computation baseline and the edit-lock
/// boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: i64,
    pub warehouse_id: i64,
    pub closing_date: NaiveDate,
    pub closed_by: String,
    pub balances: HashMap<i64, Decimal>,
}

impl Snapshot {
    /// Items absent from the snapshot closed at balance zero.
    pub fn balance_for(&self, item_id: i64) -> Decimal {
        self.balances.get(&item_id).copied().unwrap_or(Decimal::ZERO)
    }
}
