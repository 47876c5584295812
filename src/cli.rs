// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn date_arg() -> Arg {
    Arg::new("date")
        .long("date")
        .required(true)
        .help("Document date, YYYY-MM-DD")
}

fn line_arg() -> Arg {
    Arg::new("line")
        .long("line")
        .action(ArgAction::Append)
        .required(true)
        .help("Item line ITEM:QTY[:UNIT_COST]; repeatable")
}

fn warehouse_arg() -> Arg {
    Arg::new("warehouse").long("warehouse").required(true)
}

fn ref_arg() -> Arg {
    Arg::new("reference")
        .long("ref")
        .help("External document number")
}

fn note_arg() -> Arg {
    Arg::new("note").long("note")
}

fn with_json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

fn list_filters(cmd: Command) -> Command {
    with_json_flags(
        cmd.arg(Arg::new("warehouse").long("warehouse"))
            .arg(Arg::new("month").long("month").help("Filter by YYYY-MM"))
            .arg(
                Arg::new("limit")
                    .long("limit")
                    .value_parser(value_parser!(usize)),
            ),
    )
}

pub fn build_cli() -> Command {
    Command::new("stockclip")
        .about("Small-business inventory, stock ledger, and period-closing CLI")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand(
                    Command::new("set-operator")
                        .about("Name stamped onto closings")
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(Command::new("show").about("Show current settings")),
        )
        .subcommand(
            Command::new("item")
                .about("Manage items")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("unit").long("unit").default_value("pc"))
                        .arg(Arg::new("price").long("price").default_value("0"))
                        .arg(Arg::new("cost").long("cost").default_value("0"))
                        .arg(Arg::new("reorder").long("reorder").default_value("0"))
                        .arg(Arg::new("barcode").long("barcode")),
                )
                .subcommand(
                    Command::new("update")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("unit").long("unit"))
                        .arg(Arg::new("price").long("price"))
                        .arg(Arg::new("cost").long("cost"))
                        .arg(Arg::new("reorder").long("reorder"))
                        .arg(Arg::new("barcode").long("barcode")),
                )
                .subcommand(with_json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true))),
        )
        .subcommand(
            Command::new("warehouse")
                .about("Manage warehouses and rep custody locations")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("rep")
                                .long("rep")
                                .action(ArgAction::SetTrue)
                                .help("Rep custody location rather than a store"),
                        ),
                )
                .subcommand(with_json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true))),
        )
        .subcommand(
            Command::new("purchase")
                .about("Purchase invoices")
                .subcommand(
                    Command::new("add")
                        .arg(date_arg())
                        .arg(warehouse_arg())
                        .arg(line_arg())
                        .arg(ref_arg())
                        .arg(note_arg()),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Replace an invoice's lines; item costs follow")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("date").long("date").help("New document date"))
                        .arg(line_arg())
                        .arg(ref_arg()),
                )
                .subcommand(list_filters(Command::new("list"))),
        )
        .subcommand(
            Command::new("sale")
                .about("Sales invoices")
                .subcommand(
                    Command::new("add")
                        .arg(date_arg())
                        .arg(warehouse_arg())
                        .arg(line_arg())
                        .arg(Arg::new("rep").long("rep").help("Sales rep on the invoice"))
                        .arg(
                            Arg::new("pending")
                                .long("pending")
                                .action(ArgAction::SetTrue)
                                .help("Record as pending; pending invoices do not move stock"),
                        )
                        .arg(ref_arg())
                        .arg(note_arg()),
                )
                .subcommand(
                    Command::new("approve").arg(
                        Arg::new("id")
                            .long("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                )
                .subcommand(list_filters(Command::new("list"))),
        )
        .subcommand(
            Command::new("pos")
                .about("Point-of-sale tickets")
                .subcommand(
                    Command::new("add")
                        .arg(date_arg())
                        .arg(warehouse_arg())
                        .arg(line_arg())
                        .arg(ref_arg()),
                )
                .subcommand(list_filters(Command::new("list"))),
        )
        .subcommand(
            Command::new("stock")
                .about("Direct stock movements")
                .subcommand(
                    Command::new("in")
                        .arg(date_arg())
                        .arg(warehouse_arg())
                        .arg(line_arg())
                        .arg(ref_arg())
                        .arg(note_arg()),
                )
                .subcommand(
                    Command::new("out")
                        .arg(date_arg())
                        .arg(warehouse_arg())
                        .arg(line_arg())
                        .arg(ref_arg())
                        .arg(note_arg()),
                )
                .subcommand(
                    Command::new("transfer")
                        .arg(date_arg())
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true))
                        .arg(line_arg())
                        .arg(ref_arg()),
                )
                .subcommand(
                    Command::new("adjust")
                        .about("Count adjustment; line quantities are signed differences")
                        .arg(date_arg())
                        .arg(warehouse_arg())
                        .arg(line_arg())
                        .arg(note_arg()),
                )
                .subcommand(list_filters(
                    Command::new("list").arg(Arg::new("kind").long("kind")),
                )),
        )
        .subcommand(
            Command::new("return")
                .about("Sales and purchase returns")
                .subcommand(
                    Command::new("sale")
                        .arg(date_arg())
                        .arg(warehouse_arg())
                        .arg(line_arg())
                        .arg(ref_arg()),
                )
                .subcommand(
                    Command::new("purchase")
                        .arg(date_arg())
                        .arg(warehouse_arg())
                        .arg(line_arg())
                        .arg(ref_arg()),
                ),
        )
        .subcommand(
            Command::new("rep")
                .about("Sales-rep stock custody")
                .subcommand(
                    Command::new("issue")
                        .arg(date_arg())
                        .arg(warehouse_arg())
                        .arg(Arg::new("rep").long("rep").required(true))
                        .arg(line_arg()),
                )
                .subcommand(
                    Command::new("return")
                        .arg(date_arg())
                        .arg(warehouse_arg())
                        .arg(Arg::new("rep").long("rep").required(true))
                        .arg(line_arg()),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Stock reports")
                .subcommand(with_json_flags(
                    Command::new("stock-status")
                        .arg(Arg::new("warehouse").long("warehouse"))
                        .arg(
                            Arg::new("all")
                                .long("all")
                                .action(ArgAction::SetTrue)
                                .help("Sum per-warehouse balances across all warehouses"),
                        )
                        .arg(Arg::new("as-of").long("as-of").help("Defaults to today"))
                        .arg(
                            Arg::new("nonzero")
                                .long("nonzero")
                                .action(ArgAction::SetTrue)
                                .help("Hide zero balances"),
                        ),
                ))
                .subcommand(with_json_flags(
                    Command::new("ledger")
                        .about("Item card: chronological movements with running balance")
                        .arg(Arg::new("item").long("item").required(true))
                        .arg(warehouse_arg())
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true)),
                ))
                .subcommand(with_json_flags(
                    Command::new("low-stock").arg(Arg::new("warehouse").long("warehouse")),
                )),
        )
        .subcommand(
            Command::new("closing")
                .about("Period closing")
                .subcommand(
                    Command::new("review")
                        .about("Preview per-item balances; commits nothing")
                        .arg(warehouse_arg())
                        .arg(date_arg()),
                )
                .subcommand(
                    Command::new("commit")
                        .about("Persist the reviewed snapshot")
                        .arg(warehouse_arg())
                        .arg(date_arg()),
                )
                .subcommand(with_json_flags(
                    Command::new("list").arg(Arg::new("warehouse").long("warehouse")),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("items")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv|json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(
                    Command::new("movements")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv|json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("import").about("Import data").subcommand(
                Command::new("items")
                    .about("CSV columns: name,unit,price,cost,reorder_point,barcode")
                    .arg(Arg::new("path").long("path").required(true)),
            ),
        )
        .subcommand(Command::new("doctor").about("Data integrity checks"))
}
