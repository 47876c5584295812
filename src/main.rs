// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use stockclip::{cli, commands, db};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("config", sub)) => commands::config::handle(&conn, sub)?,
        Some(("item", sub)) => commands::items::handle(&conn, sub)?,
        Some(("warehouse", sub)) => commands::warehouses::handle(&conn, sub)?,
        Some(("purchase", sub)) => commands::purchases::handle(&mut conn, sub)?,
        Some(("sale", sub)) => commands::sales::handle(&mut conn, sub)?,
        Some(("pos", sub)) => commands::pos::handle(&mut conn, sub)?,
        Some(("stock", sub)) => commands::stock::handle(&mut conn, sub)?,
        Some(("return", sub)) => commands::returns::handle(&mut conn, sub)?,
        Some(("rep", sub)) => commands::reps::handle(&mut conn, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, sub)?,
        Some(("closing", sub)) => commands::closing::handle(&mut conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
