// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn date_arg() -> Arg {
    Arg::new("date")
        .long("date")
        .help("YYYY-MM-DD (defaults to today)")
}

fn amount_arg() -> Arg {
    Arg::new("amount").long("amount").required(true)
}

fn note_arg() -> Arg {
    Arg::new("note").long("note").default_value("")
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn entry_type_arg() -> Arg {
    Arg::new("type")
        .long("type")
        .required(true)
        .help("income|expense")
}

fn list_cmd() -> Command {
    Command::new("list")
        .arg(Arg::new("month").long("month").help("YYYY-MM"))
        .arg(
            Arg::new("limit")
                .long("limit")
                .value_parser(value_parser!(usize)),
        )
        .arg(json_flag())
}

fn no_auto_flag() -> Arg {
    Arg::new("no_auto")
        .long("no-auto")
        .action(ArgAction::SetTrue)
        .help("Do not record the implied income/expense")
}

pub fn build_cli() -> Command {
    Command::new("famledger")
        .version(crate_version!())
        .about("Household ledger: income, expenses, debts and fixed budgets with shared sync")
        .subcommand(Command::new("init").about("Create the local database"))
        .subcommand(
            Command::new("income")
                .about("Record and list income")
                .subcommand(
                    Command::new("add")
                        .arg(date_arg())
                        .arg(Arg::new("source").long("source").required(true))
                        .arg(amount_arg())
                        .arg(note_arg()),
                )
                .subcommand(list_cmd()),
        )
        .subcommand(
            Command::new("expense")
                .about("Record and list expenses")
                .subcommand(
                    Command::new("add")
                        .arg(date_arg())
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(amount_arg())
                        .arg(note_arg())
                        .arg(Arg::new("who").long("who").help("Family member, for personal spending"))
                        .arg(
                            Arg::new("debtor")
                                .long("debtor")
                                .value_parser(value_parser!(i64))
                                .help("Debt id settled by this expense"),
                        ),
                )
                .subcommand(list_cmd().arg(Arg::new("category").long("category"))),
        )
        .subcommand(
            Command::new("savings").about("Put money aside").subcommand(
                Command::new("add")
                    .arg(date_arg())
                    .arg(amount_arg())
                    .arg(Arg::new("category").long("category"))
                    .arg(note_arg()),
            ),
        )
        .subcommand(
            Command::new("debt")
                .about("Track money owed")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .help("payable|receivable"),
                        )
                        .arg(Arg::new("total").long("total").required(true))
                        .arg(Arg::new("paid").long("paid").default_value("0"))
                        .arg(note_arg())
                        .arg(no_auto_flag()),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("total").long("total"))
                        .arg(Arg::new("paid").long("paid"))
                        .arg(Arg::new("note").long("note"))
                        .arg(no_auto_flag()),
                )
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(Command::new("list").arg(json_flag())),
        )
        .subcommand(
            Command::new("entry")
                .about("Edit recorded income/expense entries")
                .subcommand(Command::new("rm").arg(entry_type_arg()).arg(id_arg()))
                .subcommand(
                    Command::new("note")
                        .arg(entry_type_arg())
                        .arg(id_arg())
                        .arg(Arg::new("note").long("note").required(true)),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage the ordered category list")
                .subcommand(Command::new("list").arg(json_flag()))
                .subcommand(
                    Command::new("set").arg(
                        Arg::new("names")
                            .required(true)
                            .num_args(1..)
                            .help("Full category list, in display order"),
                    ),
                )
                .subcommand(Command::new("add").arg(Arg::new("name").long("name").required(true)))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true))),
        )
        .subcommand(
            Command::new("fixed")
                .about("Monthly fixed budget")
                .subcommand(Command::new("list").arg(date_arg()).arg(json_flag()))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(amount_arg().help("0 removes the item")),
                )
                .subcommand(
                    Command::new("confirm")
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("amount").long("amount").help("Defaults to the budgeted amount"))
                        .arg(date_arg()),
                ),
        )
        .subcommand(
            Command::new("remote")
                .about("Shared family ledger connection")
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("config").long("config").required(true).help("Connection JSON"))
                        .arg(Arg::new("family").long("family").required(true)),
                )
                .subcommand(Command::new("clear"))
                .subcommand(Command::new("status")),
        )
        .subcommand(Command::new("sync").about("Connect, reconcile and report").arg(json_flag()))
        .subcommand(
            Command::new("summary")
                .about("Month totals")
                .arg(Arg::new("month").long("month").required(true).help("YYYY-MM"))
                .arg(json_flag()),
        )
}
