// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{get_operator, pretty_table, set_operator};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-operator", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim().to_string();
            set_operator(conn, &name)?;
            println!("Operator set to '{}'", name);
        }
        Some(("show", _)) => {
            let rows = vec![vec!["operator".to_string(), get_operator(conn)?]];
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        _ => {}
    }
    Ok(())
}
