// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{DebtUpdate, LedgerEngine};
use crate::models::{DebtDraft, DebtKind};
use crate::utils::{fmt_amount, maybe_print_json, parse_decimal, pretty_table, required_str};
use anyhow::{Context, Result, anyhow};

pub fn handle(engine: &LedgerEngine, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(engine, sub)?,
        Some(("edit", sub)) => edit(engine, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").context("Missing --id")?;
            let debts = engine.debts();
            let remaining: Vec<_> = debts.iter().filter(|d| d.id != id).cloned().collect();
            if remaining.len() == debts.len() {
                return Err(anyhow!("Debt {} not found", id));
            }
            engine.update_debts(DebtUpdate::Replace(remaining))?;
            println!("Removed debt {}", id);
        }
        Some(("list", sub)) => list(engine, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(engine: &LedgerEngine, sub: &clap::ArgMatches) -> Result<()> {
    let draft = DebtDraft {
        name: required_str(sub, "name")?.trim().to_string(),
        kind: required_str(sub, "type")?.parse::<DebtKind>()?,
        total: parse_decimal(required_str(sub, "total")?)?,
        paid: parse_decimal(required_str(sub, "paid")?)?,
        note: required_str(sub, "note")?.to_string(),
    };
    if draft.name.is_empty() {
        return Err(anyhow!("Debt name must not be empty"));
    }
    let id = engine.update_debts(DebtUpdate::Upsert {
        draft,
        edit_id: None,
        auto_transaction: !sub.get_flag("no_auto"),
    })?;
    if let Some(id) = id {
        println!("Added debt {}", id);
    }
    Ok(())
}

fn edit(engine: &LedgerEngine, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("Missing --id")?;
    let current = engine
        .debts()
        .into_iter()
        .find(|d| d.id == id)
        .with_context(|| format!("Debt {} not found", id))?;

    let mut draft = DebtDraft {
        name: current.name,
        total: current.total,
        paid: current.paid,
        note: current.note,
        kind: current.kind,
    };
    if let Some(name) = sub.get_one::<String>("name") {
        draft.name = name.trim().to_string();
    }
    if let Some(kind) = sub.get_one::<String>("type") {
        draft.kind = kind.parse()?;
    }
    if let Some(total) = sub.get_one::<String>("total") {
        draft.total = parse_decimal(total)?;
    }
    if let Some(paid) = sub.get_one::<String>("paid") {
        draft.paid = parse_decimal(paid)?;
    }
    if let Some(note) = sub.get_one::<String>("note") {
        draft.note = note.clone();
    }
    engine.update_debts(DebtUpdate::Upsert {
        draft,
        edit_id: Some(id),
        auto_transaction: !sub.get_flag("no_auto"),
    })?;
    println!("Updated debt {}", id);
    Ok(())
}

fn list(engine: &LedgerEngine, sub: &clap::ArgMatches) -> Result<()> {
    let debts = engine.debts();
    if !maybe_print_json(sub.get_flag("json"), &debts)? {
        let rows = debts
            .iter()
            .map(|d| {
                vec![
                    d.id.to_string(),
                    d.name.clone(),
                    d.kind.to_string(),
                    fmt_amount(&d.total),
                    fmt_amount(&d.paid),
                    fmt_amount(&d.outstanding()),
                    d.note.clone(),
                    d.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Name", "Type", "Total", "Paid", "Outstanding", "Note", "Updated"],
                rows
            )
        );
    }
    Ok(())
}
