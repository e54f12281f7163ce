// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::LedgerEngine;
use crate::utils::{maybe_print_json, pretty_table, required_str};
use anyhow::Result;

pub fn handle(engine: &LedgerEngine, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let cats = engine.categories();
            if !maybe_print_json(sub.get_flag("json"), &cats)? {
                let data = cats.into_iter().map(|c| vec![c]).collect();
                println!("{}", pretty_table(&["Category"], data));
            }
        }
        Some(("set", sub)) => {
            let names: Vec<String> = sub
                .get_many::<String>("names")
                .map(|v| v.cloned().collect())
                .unwrap_or_default();
            engine.update_categories(names)?;
            println!("Category list now has {} entries", engine.categories().len());
        }
        Some(("add", sub)) => {
            let name = required_str(sub, "name")?.trim().to_string();
            let mut cats = engine.categories();
            cats.push(name.clone());
            engine.update_categories(cats)?;
            println!("Added category '{}'", name);
        }
        Some(("rm", sub)) => {
            let name = required_str(sub, "name")?.trim();
            let cats: Vec<String> = engine
                .categories()
                .into_iter()
                .filter(|c| c != name)
                .collect();
            engine.update_categories(cats)?;
            println!("Removed category '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
