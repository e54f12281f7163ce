// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::LedgerEngine;
use crate::error::LedgerError;
use crate::models::{
    DEBT_CATEGORY, DEBT_COLLECTION_SOURCE, Debt, DebtAction, DebtDraft, DebtKind, EntryKind,
    Expense, FixedTemplateItem, Income, PERSONAL_CATEGORY, tracking_key,
};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::info;

/// Input for [`LedgerEngine::add_expense`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub category: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub note: String,
    /// Family member tagged on personal-category expenses.
    pub who: Option<String>,
    /// Debt settled by a debt-category expense.
    pub debtor_id: Option<i64>,
}

impl NewExpense {
    pub fn new(category: impl Into<String>, amount: Decimal, date: NaiveDate) -> Self {
        NewExpense {
            category: category.into(),
            amount,
            date,
            note: String::new(),
            who: None,
            debtor_id: None,
        }
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn who(mut self, who: impl Into<String>) -> Self {
        self.who = Some(who.into());
        self
    }

    pub fn debtor(mut self, debt_id: i64) -> Self {
        self.debtor_id = Some(debt_id);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseOutcome {
    /// An expense with this id was recorded.
    Recorded(i64),
    /// A receivable debt was collected; an income with this id was recorded instead.
    RecordedAsIncome(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DebtUpdate {
    /// Replace the whole debt list (deletes, reordering). No side effects.
    Replace(Vec<Debt>),
    /// Create a debt, or edit the one with `edit_id`.
    Upsert {
        draft: DebtDraft,
        edit_id: Option<i64>,
        /// Record the money movement implied by the change as transactions.
        auto_transaction: bool,
    },
}

fn require_positive(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount(amount));
    }
    Ok(())
}

fn require_label(label: &str, err: LedgerError) -> Result<String, LedgerError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(err);
    }
    Ok(label.to_string())
}

fn with_detail(summary: String, note: &str) -> String {
    if note.is_empty() {
        summary
    } else {
        format!("{} - {}", summary, note)
    }
}

fn expense(
    id: i64,
    category: &str,
    amount: Decimal,
    date: NaiveDateTime,
    note: String,
    link: Option<(i64, DebtAction)>,
) -> Expense {
    Expense {
        id,
        category: category.to_string(),
        amount,
        date,
        note,
        related_debt_id: link.map(|(id, _)| id),
        debt_action: link.map(|(_, action)| action),
    }
}

fn collection(id: i64, amount: Decimal, date: NaiveDateTime, debt_id: i64, note: String) -> Income {
    Income {
        id,
        source: DEBT_COLLECTION_SOURCE.to_string(),
        amount,
        date,
        note,
        related_debt_id: Some(debt_id),
        debt_action: Some(DebtAction::Collect),
    }
}

impl LedgerEngine {
    /// Records an income dated `date` at the current time of day, newest first.
    pub fn add_income(
        &self,
        source: &str,
        amount: Decimal,
        date: NaiveDate,
        note: &str,
    ) -> Result<i64, LedgerError> {
        let source = require_label(source, LedgerError::EmptySource)?;
        require_positive(amount)?;
        let id = self.mutate("add_income", |next| {
            let now = self.now();
            let id = self.next_id(now)?;
            next.incomes.insert(
                0,
                Income {
                    id,
                    source,
                    amount,
                    date: date.and_time(now.time()),
                    note: note.trim().to_string(),
                    related_debt_id: None,
                    debt_action: None,
                },
            );
            Ok(id)
        })?;
        info!(id, %amount, "income recorded");
        Ok(id)
    }

    /// Records an expense, applying personal tagging and debt linkage.
    ///
    /// In the debt category a debtor is mandatory. Settling a receivable
    /// records an income tagged `collect` instead of an expense; settling a
    /// payable records an expense tagged `repay`. Either way the debt's
    /// `paid` grows by `amount` in the same commit.
    pub fn add_expense(&self, input: NewExpense) -> Result<ExpenseOutcome, LedgerError> {
        let category = require_label(&input.category, LedgerError::EmptyCategory)?;
        require_positive(input.amount)?;
        let debt_id = if category == DEBT_CATEGORY {
            Some(
                input
                    .debtor_id
                    .ok_or_else(|| LedgerError::DebtorRequired(category.clone()))?,
            )
        } else {
            None
        };
        let amount = input.amount;

        let outcome = self.mutate("add_expense", |next| {
            let now = self.now();
            let when = input.date.and_time(now.time());
            let mut note = input.note.trim().to_string();
            if category == PERSONAL_CATEGORY {
                if let Some(who) = input.who.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
                    note = format!("[{}] {}", who, note).trim_end().to_string();
                }
            }

            let mut link = None;
            if let Some(debt_id) = debt_id {
                let debt = next
                    .debts
                    .iter_mut()
                    .find(|d| d.id == debt_id)
                    .ok_or(LedgerError::DebtNotFound(debt_id))?;
                debt.paid += amount;
                debt.updated_at = now;
                let name = debt.name.clone();
                match debt.kind {
                    DebtKind::Receivable => {
                        let id = self.next_id(now)?;
                        let note = with_detail(format!("Thu nợ từ {}", name), &note);
                        next.incomes
                            .insert(0, collection(id, amount, when, debt_id, note));
                        return Ok(ExpenseOutcome::RecordedAsIncome(id));
                    }
                    DebtKind::Payable => {
                        note = with_detail(format!("Trả nợ: {}", name), &note);
                        link = Some((debt_id, DebtAction::Repay));
                    }
                }
            }

            let id = self.next_id(now)?;
            next.expenses
                .insert(0, expense(id, &category, amount, when, note, link));
            Ok(ExpenseOutcome::Recorded(id))
        })?;
        info!(?outcome, %amount, category = %category, "expense recorded");
        Ok(outcome)
    }

    /// Records money put aside as a plain expense in `category`.
    pub fn add_savings(
        &self,
        category: &str,
        amount: Decimal,
        date: NaiveDate,
        note: &str,
    ) -> Result<i64, LedgerError> {
        let category = require_label(category, LedgerError::EmptyCategory)?;
        require_positive(amount)?;
        self.mutate("add_savings", |next| {
            let now = self.now();
            let id = self.next_id(now)?;
            let note = note.trim().to_string();
            next.expenses.insert(
                0,
                expense(id, &category, amount, date.and_time(now.time()), note, None),
            );
            Ok(id)
        })
    }

    /// Replaces the debt list, or creates/edits one debt.
    ///
    /// With `auto_transaction`, the difference against the previous version
    /// (zero for a new debt) becomes transactions dated now: lending more on
    /// a receivable is a `lend` expense, collecting on it is a `collect`
    /// income, and paying a payable down is a `repay` expense.
    ///
    /// Returns the id of the upserted debt.
    pub fn update_debts(&self, update: DebtUpdate) -> Result<Option<i64>, LedgerError> {
        match update {
            DebtUpdate::Replace(debts) => self.mutate("replace_debts", |next| {
                next.debts = debts;
                Ok(None)
            }),
            DebtUpdate::Upsert {
                draft,
                edit_id,
                auto_transaction,
            } => self.mutate("upsert_debt", |next| {
                let now = self.now();
                let previous = match edit_id {
                    Some(id) => Some(next.debt(id).cloned().ok_or(LedgerError::DebtNotFound(id))?),
                    None => None,
                };
                let id = match edit_id {
                    Some(id) => id,
                    None => self.next_id(now)?,
                };
                let debt = Debt {
                    id,
                    name: draft.name.trim().to_string(),
                    total: draft.total,
                    paid: draft.paid,
                    note: draft.note.trim().to_string(),
                    kind: draft.kind,
                    updated_at: now,
                };

                if auto_transaction {
                    let (prev_total, prev_paid) = previous
                        .as_ref()
                        .map(|p| (p.total, p.paid))
                        .unwrap_or((Decimal::ZERO, Decimal::ZERO));
                    let lent = debt.total - prev_total;
                    let settled = debt.paid - prev_paid;
                    match debt.kind {
                        DebtKind::Receivable => {
                            if lent > Decimal::ZERO {
                                let note = format!("Cho vay: {}", debt.name);
                                let link = Some((id, DebtAction::Lend));
                                let eid = self.next_id(now)?;
                                next.expenses
                                    .insert(0, expense(eid, DEBT_CATEGORY, lent, now, note, link));
                            }
                            if settled > Decimal::ZERO {
                                let note = format!("Thu nợ: {}", debt.name);
                                let iid = self.next_id(now)?;
                                next.incomes
                                    .insert(0, collection(iid, settled, now, id, note));
                            }
                        }
                        DebtKind::Payable => {
                            if settled > Decimal::ZERO {
                                let note = format!("Trả nợ: {}", debt.name);
                                let link = Some((id, DebtAction::Repay));
                                let eid = self.next_id(now)?;
                                next.expenses
                                    .insert(0, expense(eid, DEBT_CATEGORY, settled, now, note, link));
                            }
                        }
                    }
                }

                match edit_id {
                    Some(edit_id) => {
                        if let Some(slot) = next.debts.iter_mut().find(|d| d.id == edit_id) {
                            *slot = debt;
                        }
                    }
                    None => next.debts.insert(0, debt),
                }
                Ok(Some(id))
            }),
        }
    }

    /// Removes an income or expense by id. Returns whether anything matched.
    pub fn delete_item(&self, id: i64, kind: EntryKind) -> Result<bool, LedgerError> {
        self.mutate("delete_item", |next| {
            let before;
            let after;
            match kind {
                EntryKind::Income => {
                    before = next.incomes.len();
                    next.incomes.retain(|i| i.id != id);
                    after = next.incomes.len();
                }
                EntryKind::Expense => {
                    before = next.expenses.len();
                    next.expenses.retain(|e| e.id != id);
                    after = next.expenses.len();
                }
            }
            Ok(after < before)
        })
    }

    /// Replaces the note of an income or expense. Returns whether anything matched.
    pub fn update_note(&self, id: i64, kind: EntryKind, note: &str) -> Result<bool, LedgerError> {
        self.mutate("update_note", |next| {
            let slot = match kind {
                EntryKind::Income => next.incomes.iter_mut().find(|i| i.id == id).map(|i| &mut i.note),
                EntryKind::Expense => next.expenses.iter_mut().find(|e| e.id == id).map(|e| &mut e.note),
            };
            Ok(match slot {
                Some(slot) => {
                    *slot = note.to_string();
                    true
                }
                None => false,
            })
        })
    }

    /// Replaces the category list. Existing entries keep their labels even
    /// when those labels disappear from the list.
    pub fn update_categories(&self, categories: Vec<String>) -> Result<(), LedgerError> {
        let mut cleaned: Vec<String> = Vec::with_capacity(categories.len());
        for c in categories {
            let c = c.trim();
            if !c.is_empty() && !cleaned.iter().any(|x| x == c) {
                cleaned.push(c.to_string());
            }
        }
        self.mutate("update_categories", |next| {
            next.categories = cleaned;
            Ok(())
        })
    }

    /// Pays a fixed-budget item: records an expense dated now and marks the
    /// category confirmed for `view_date`'s month. Confirming twice records
    /// two expenses.
    pub fn confirm_fixed_item(
        &self,
        item: &FixedTemplateItem,
        confirmed_amount: Decimal,
        view_date: NaiveDate,
    ) -> Result<i64, LedgerError> {
        require_positive(confirmed_amount)?;
        let key = tracking_key(view_date);
        self.mutate("confirm_fixed_item", |next| {
            let now = self.now();
            let id = self.next_id(now)?;
            let note = format!("Chi cố định {}/{}", view_date.month(), view_date.year());
            next.expenses.insert(
                0,
                expense(id, &item.category, confirmed_amount, now, note, None),
            );
            next.fixed_tracking
                .entry(key)
                .or_default()
                .insert(item.category.clone());
            Ok(id)
        })
    }

    /// Replaces the fixed-budget template. Items without a category or with
    /// a non-positive amount are dropped; a repeated category keeps the last
    /// amount at its first position.
    pub fn save_fixed_config(&self, items: Vec<FixedTemplateItem>) -> Result<(), LedgerError> {
        let mut template: Vec<FixedTemplateItem> = Vec::with_capacity(items.len());
        for item in items {
            let category = item.category.trim();
            if category.is_empty() || item.amount <= Decimal::ZERO {
                continue;
            }
            match template.iter_mut().find(|t| t.category == category) {
                Some(existing) => existing.amount = item.amount,
                None => template.push(FixedTemplateItem {
                    category: category.to_string(),
                    amount: item.amount,
                }),
            }
        }
        self.mutate("save_fixed_config", |next| {
            next.fixed_config = template;
            Ok(())
        })
    }
}
