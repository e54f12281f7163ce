// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::LedgerEngine;
use crate::models::FixedTemplateItem;
use crate::utils::{
    date_or_today, fmt_amount, maybe_print_json, parse_decimal, pretty_table, required_str,
};
use anyhow::{Context, Result};

pub fn handle(engine: &LedgerEngine, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(engine, sub)?,
        Some(("list", sub)) => list(engine, sub)?,
        Some(("confirm", sub)) => confirm(engine, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(engine: &LedgerEngine, sub: &clap::ArgMatches) -> Result<()> {
    let cat = required_str(sub, "category")?.trim().to_string();
    let amount = parse_decimal(required_str(sub, "amount")?)?;
    let mut template = engine.fixed_config();
    match template.iter_mut().find(|t| t.category == cat) {
        Some(existing) => existing.amount = amount,
        None => template.push(FixedTemplateItem {
            category: cat.clone(),
            amount,
        }),
    }
    // non-positive amounts are dropped by the engine
    engine.save_fixed_config(template)?;
    println!("Fixed budget for '{}' = {}", cat, amount);
    Ok(())
}

fn list(engine: &LedgerEngine, sub: &clap::ArgMatches) -> Result<()> {
    let date = date_or_today(sub)?;
    let status = engine.fixed_status(date);
    if !maybe_print_json(sub.get_flag("json"), &status)? {
        let rows = status
            .iter()
            .map(|s| {
                vec![
                    s.category.clone(),
                    fmt_amount(&s.amount),
                    if s.confirmed { "paid" } else { "" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Budget", date.format("%m/%Y").to_string().as_str()], rows)
        );
    }
    Ok(())
}

fn confirm(engine: &LedgerEngine, sub: &clap::ArgMatches) -> Result<()> {
    let cat = required_str(sub, "category")?.trim();
    let date = date_or_today(sub)?;
    let item = engine
        .fixed_config()
        .into_iter()
        .find(|t| t.category == cat)
        .with_context(|| format!("No fixed budget for category '{}'", cat))?;
    let amount = match sub.get_one::<String>("amount") {
        Some(a) => parse_decimal(a)?,
        None => item.amount,
    };
    let id = engine.confirm_fixed_item(&item, amount, date)?;
    println!("Confirmed '{}' for {} with {} (expense {})", cat, date.format("%m/%Y"), amount, id);
    Ok(())
}
