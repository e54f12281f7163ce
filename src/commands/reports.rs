// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::LedgerEngine;
use crate::models::DebtKind;
use crate::utils::{fmt_amount, maybe_print_json, parse_month, pretty_table, required_str};
use anyhow::Result;
use rust_decimal::Decimal;

pub fn summary(engine: &LedgerEngine, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(required_str(sub, "month")?)?;
    let summary = engine.month_summary(year, month);
    if !maybe_print_json(sub.get_flag("json"), &summary)? {
        let debts = engine.debts();
        let open = |kind: DebtKind| -> Decimal {
            debts.iter().filter(|d| d.kind == kind).map(|d| d.outstanding()).sum()
        };
        println!(
            "{}",
            pretty_table(
                &["Month", "Income", "Expense", "Balance", "I owe", "Owed to me"],
                vec![vec![
                    summary.month.clone(),
                    fmt_amount(&summary.income),
                    fmt_amount(&summary.expense),
                    fmt_amount(&summary.balance),
                    fmt_amount(&open(DebtKind::Payable)),
                    fmt_amount(&open(DebtKind::Receivable)),
                ]],
            )
        );
    }
    Ok(())
}
