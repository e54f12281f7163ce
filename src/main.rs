// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use famledger::commands::remote::{self, RemoteSettings};
use famledger::{LedgerEngine, cli, commands, db, logging};

fn main() -> Result<()> {
    logging::init();
    let matches = cli::build_cli().get_matches();

    let path = db::db_path()?;
    let store = db::SqliteStore::open(&path)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", path.display());
            return Ok(());
        }
        Some(("remote", sub)) => return remote::handle(&store, sub),
        None => {
            cli::build_cli().print_help()?;
            println!();
            return Ok(());
        }
        _ => {}
    }

    let settings = remote::configured(&store)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(LedgerEngine::new(store), settings, &matches))
}

async fn run(
    engine: LedgerEngine,
    settings: Option<RemoteSettings>,
    matches: &clap::ArgMatches,
) -> Result<()> {
    let online = match &settings {
        Some(remote) => commands::sync::attach(&engine, remote).await,
        None => false,
    };

    let result = match matches.subcommand() {
        Some(("income", sub)) => commands::transactions::handle_income(&engine, sub),
        Some(("expense", sub)) => commands::transactions::handle_expense(&engine, sub),
        Some(("savings", sub)) => commands::transactions::handle_savings(&engine, sub),
        Some(("debt", sub)) => commands::debts::handle(&engine, sub),
        Some(("entry", sub)) => commands::entries::handle(&engine, sub),
        Some(("category", sub)) => commands::categories::handle(&engine, sub),
        Some(("fixed", sub)) => commands::fixed::handle(&engine, sub),
        Some(("summary", sub)) => commands::reports::summary(&engine, sub),
        Some(("sync", sub)) => {
            if online {
                commands::sync::settle(&engine).await;
            } else if settings.is_none() {
                println!("No remote ledger configured; use `famledger remote set`");
            }
            commands::sync::report(&engine, sub)
        }
        _ => Ok(()),
    };

    if online {
        commands::sync::settle(&engine).await;
    }
    engine.disconnect();
    result
}
