// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{ExpenseOutcome, LedgerEngine, NewExpense};
use crate::models::{EntryKind, SAVINGS_CATEGORY};
use crate::utils::{
    date_or_today, fmt_amount, maybe_print_json, parse_decimal, parse_month, pretty_table,
    required_str,
};
use anyhow::Result;
use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;

pub fn handle_income(engine: &LedgerEngine, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let date = date_or_today(sub)?;
            let source = required_str(sub, "source")?;
            let amount = parse_decimal(required_str(sub, "amount")?)?;
            let note = required_str(sub, "note")?;
            let id = engine.add_income(source, amount, date, note)?;
            println!("Recorded income {} from '{}' on {} (id {})", amount, source.trim(), date, id);
        }
        Some(("list", sub)) => list(engine, sub, EntryKind::Income)?,
        _ => {}
    }
    Ok(())
}

pub fn handle_expense(engine: &LedgerEngine, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let date = date_or_today(sub)?;
            let category = required_str(sub, "category")?;
            let amount = parse_decimal(required_str(sub, "amount")?)?;
            let mut input = NewExpense::new(category, amount, date).note(required_str(sub, "note")?);
            if let Some(who) = sub.get_one::<String>("who") {
                input = input.who(who.as_str());
            }
            if let Some(debtor) = sub.get_one::<i64>("debtor") {
                input = input.debtor(*debtor);
            }
            match engine.add_expense(input)? {
                ExpenseOutcome::Recorded(id) => {
                    println!("Recorded expense {} in '{}' on {} (id {})", amount, category.trim(), date, id)
                }
                ExpenseOutcome::RecordedAsIncome(id) => {
                    println!("Debt collection of {} recorded as income (id {})", amount, id)
                }
            }
        }
        Some(("list", sub)) => list(engine, sub, EntryKind::Expense)?,
        _ => {}
    }
    Ok(())
}

pub fn handle_savings(engine: &LedgerEngine, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("add", sub)) = m.subcommand() {
        let date = date_or_today(sub)?;
        let amount = parse_decimal(required_str(sub, "amount")?)?;
        let category = sub
            .get_one::<String>("category")
            .map(|s| s.as_str())
            .unwrap_or(SAVINGS_CATEGORY);
        let id = engine.add_savings(category, amount, date, required_str(sub, "note")?)?;
        println!("Saved {} into '{}' (id {})", amount, category, id);
    }
    Ok(())
}

#[derive(Serialize)]
pub struct EntryRow {
    pub id: i64,
    pub date: NaiveDateTime,
    pub label: String,
    pub amount: String,
    pub note: String,
    pub debt: String,
}

/// Entries of one kind, newest first, filtered by `--month`/`--category`
/// and capped by `--limit`.
pub fn query_rows(
    engine: &LedgerEngine,
    sub: &clap::ArgMatches,
    kind: EntryKind,
) -> Result<Vec<EntryRow>> {
    let month = sub
        .get_one::<String>("month")
        .map(|m| parse_month(m))
        .transpose()?;

    let rows: Vec<EntryRow> = match kind {
        EntryKind::Income => engine
            .incomes()
            .into_iter()
            .map(|i| EntryRow {
                id: i.id,
                date: i.date,
                label: i.source,
                amount: fmt_amount(&i.amount),
                note: i.note,
                debt: i.related_debt_id.map(|d| d.to_string()).unwrap_or_default(),
            })
            .collect(),
        EntryKind::Expense => {
            let category = sub.get_one::<String>("category").map(|c| c.trim().to_string());
            engine
                .expenses()
                .into_iter()
                .filter(|e| category.as_ref().is_none_or(|c| &e.category == c))
                .map(|e| EntryRow {
                    id: e.id,
                    date: e.date,
                    label: e.category,
                    amount: fmt_amount(&e.amount),
                    note: e.note,
                    debt: e.related_debt_id.map(|d| d.to_string()).unwrap_or_default(),
                })
                .collect()
        }
    };
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);
    Ok(rows
        .into_iter()
        .filter(|r| month.is_none_or(|(y, m)| r.date.year() == y && r.date.month() == m))
        .take(limit)
        .collect())
}

fn list(engine: &LedgerEngine, sub: &clap::ArgMatches, kind: EntryKind) -> Result<()> {
    let data = query_rows(engine, sub, kind)?;

    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let label = match kind {
            EntryKind::Income => "Source",
            EntryKind::Expense => "Category",
        };
        let table_rows = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.format("%Y-%m-%d %H:%M").to_string(),
                    r.label.clone(),
                    r.amount.clone(),
                    r.note.clone(),
                    r.debt.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", label, "Amount", "Note", "Debt"], table_rows)
        );
    }
    Ok(())
}
