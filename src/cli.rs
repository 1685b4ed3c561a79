// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, ArgGroup, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
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
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn tx_args(cmd: Command, category_required: bool) -> Command {
    cmd.arg(
        Arg::new("amount")
            .long("amount")
            .short('a')
            .required(true)
            .allow_hyphen_values(true)
            .help("Amount, e.g. 12.50"),
    )
    .arg(
        Arg::new("category")
            .long("category")
            .short('c')
            .required(category_required)
            .help("Category label, e.g. food"),
    )
    .arg(
        Arg::new("date")
            .long("date")
            .short('d')
            .help("Transaction date YYYY-MM-DD (defaults to today)"),
    )
    .arg(
        Arg::new("desc")
            .long("desc")
            .help("Short description"),
    )
}

pub fn build_cli() -> Command {
    Command::new("paycycle")
        .version(clap::crate_version!())
        .about("Track spending per pay cycle and forecast how long your money lasts")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("PAYCYCLE_DB")
                .help("Data file; *.json uses a flat JSON file, anything else SQLite"),
        )
        .arg(
            Arg::new("today")
                .long("today")
                .global(true)
                .env("PAYCYCLE_TODAY")
                .help("Override today's date (YYYY-MM-DD)"),
        )
        .subcommand(
            Command::new("init")
                .about("Set up the first pay cycle")
                .arg(
                    Arg::new("balance")
                        .long("balance")
                        .short('b')
                        .required(true)
                        .allow_hyphen_values(true)
                        .help("Opening balance of the first cycle"),
                )
                .arg(
                    Arg::new("anchor-day")
                        .long("anchor-day")
                        .value_parser(value_parser!(u32).range(1..=31))
                        .help("Payday as a day of the month (1-31)"),
                )
                .arg(
                    Arg::new("every")
                        .long("every")
                        .value_parser(value_parser!(u32).range(1..))
                        .help("Fixed cycle length in days"),
                )
                .arg(
                    Arg::new("start")
                        .long("start")
                        .help("A date inside the first cycle; for --every, the first payday"),
                )
                .group(
                    ArgGroup::new("policy")
                        .args(["anchor-day", "every"])
                        .required(true),
                ),
        )
        .subcommand(tx_args(
            Command::new("expense").about("Record an expense in the current cycle"),
            true,
        ))
        .subcommand(tx_args(
            Command::new("income").about("Record extra income in the current cycle"),
            false,
        ))
        .subcommand(
            Command::new("tx")
                .about("Transactions")
                .subcommand(json_flags(
                    Command::new("list").about("List transactions of the current cycle"),
                )),
        )
        .subcommand(json_flags(
            Command::new("status").about("Balance, burn rate, and runway for the current cycle"),
        ))
        .subcommand(json_flags(
            Command::new("breakdown").about("Spending by category in the current cycle"),
        ))
        .subcommand(Command::new("rollover").about("Close the current cycle and open the next"))
        .subcommand(
            Command::new("catch-up")
                .about("Roll over every cycle that has ended, one at a time"),
        )
        .subcommand(json_flags(
            Command::new("history").about("Closed cycles with opening and closing balances"),
        ))
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("transactions")
                        .about("Export transactions of every cycle")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .short('f')
                                .required(true)
                                .help("csv or json"),
                        )
                        .arg(
                            Arg::new("out")
                                .long("out")
                                .short('o')
                                .required(true)
                                .help("Output file"),
                        ),
                ),
        )
        .subcommand(Command::new("doctor").about("Check stored cycles for inconsistencies"))
}
