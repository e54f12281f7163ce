// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use famledger::models::{
    DEBT_CATEGORY, DEBT_COLLECTION_SOURCE, Debt, DebtAction, DebtDraft, DebtKind, Snapshot,
};
use famledger::store::{LocalStore, MemoryStore};
use famledger::sync::MemoryReplica;
use famledger::utils::FixedClock;
use famledger::{DebtUpdate, ExpenseOutcome, LedgerEngine, LedgerError, NewExpense};
use rust_decimal::Decimal;
use std::sync::Arc;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(20, 15, 0)
        .unwrap()
}

fn debt(id: i64, kind: DebtKind, total: i64) -> Debt {
    Debt {
        id,
        name: format!("Debt {}", id),
        total: Decimal::from(total),
        paid: Decimal::ZERO,
        note: String::new(),
        kind,
        updated_at: NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    }
}

fn setup(debts: Vec<Debt>) -> (LedgerEngine, MemoryStore) {
    let store = MemoryStore::seeded(&Snapshot {
        debts,
        ..Default::default()
    })
    .unwrap();
    let engine = LedgerEngine::with_parts(
        store.clone(),
        Arc::new(MemoryReplica::new()),
        Arc::new(FixedClock(now())),
    );
    (engine, store)
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
}

#[test]
fn payable_repayment_records_expense_and_raises_paid() {
    let (engine, store) = setup(vec![debt(1, DebtKind::Payable, 1_000_000)]);
    let outcome = engine
        .add_expense(
            NewExpense::new(DEBT_CATEGORY, Decimal::from(200_000), date())
                .who("Ba")
                .debtor(1),
        )
        .unwrap();
    assert!(matches!(outcome, ExpenseOutcome::Recorded(_)));

    let d = &engine.debts()[0];
    assert_eq!(d.paid, Decimal::from(200_000));
    assert_eq!(d.updated_at, now());

    let expenses = engine.expenses();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, Decimal::from(200_000));
    assert!(expenses[0].note.contains("Trả nợ"));
    assert_eq!(expenses[0].related_debt_id, Some(1));
    assert_eq!(expenses[0].debt_action, Some(DebtAction::Repay));
    assert!(engine.incomes().is_empty());
    assert_eq!(store.load(), engine.snapshot());
}

#[test]
fn receivable_collection_becomes_income() {
    let (engine, _) = setup(vec![debt(2, DebtKind::Receivable, 500_000)]);
    let outcome = engine
        .add_expense(
            NewExpense::new(DEBT_CATEGORY, Decimal::from(100_000), date())
                .note("tiền mặt")
                .who("Ba")
                .debtor(2),
        )
        .unwrap();
    let ExpenseOutcome::RecordedAsIncome(id) = outcome else {
        panic!("expected the collection to be recorded as income");
    };

    assert_eq!(engine.debts()[0].paid, Decimal::from(100_000));
    assert!(engine.expenses().is_empty());
    let incomes = engine.incomes();
    assert_eq!(incomes.len(), 1);
    assert_eq!(incomes[0].id, id);
    assert_eq!(incomes[0].amount, Decimal::from(100_000));
    assert_eq!(incomes[0].source, DEBT_COLLECTION_SOURCE);
    assert_eq!(incomes[0].debt_action, Some(DebtAction::Collect));
    assert_eq!(incomes[0].related_debt_id, Some(2));
    assert!(incomes[0].note.contains("tiền mặt"));
}

#[test]
fn debt_category_requires_a_debtor() {
    let (engine, store) = setup(vec![debt(1, DebtKind::Payable, 1_000)]);
    let before = store.raw("expenses");
    let err = engine
        .add_expense(NewExpense::new(DEBT_CATEGORY, Decimal::from(10), date()))
        .unwrap_err();
    assert!(matches!(err, LedgerError::DebtorRequired(_)));
    assert!(err.to_string().contains("select a debtor"));
    assert_eq!(store.raw("expenses"), before);
    assert_eq!(engine.debts()[0].paid, Decimal::ZERO);
}

#[test]
fn unknown_debtor_is_rejected_without_side_effects() {
    let (engine, _) = setup(vec![debt(1, DebtKind::Payable, 1_000)]);
    let err = engine
        .add_expense(NewExpense::new(DEBT_CATEGORY, Decimal::from(10), date()).debtor(99))
        .unwrap_err();
    assert!(matches!(err, LedgerError::DebtNotFound(99)));
    assert!(engine.expenses().is_empty());
    assert_eq!(engine.debts()[0].paid, Decimal::ZERO);
}

#[test]
fn paid_tracks_every_routed_amount() {
    let (engine, _) = setup(vec![debt(1, DebtKind::Payable, 1_000)]);
    for amount in [100, 250, 50] {
        engine
            .add_expense(NewExpense::new(DEBT_CATEGORY, Decimal::from(amount), date()).debtor(1))
            .unwrap();
    }
    let draft = DebtDraft {
        name: "Debt 1".into(),
        total: Decimal::from(1_000),
        paid: Decimal::from(600),
        note: String::new(),
        kind: DebtKind::Payable,
    };
    engine
        .update_debts(DebtUpdate::Upsert {
            draft,
            edit_id: Some(1),
            auto_transaction: true,
        })
        .unwrap();

    assert_eq!(engine.debts()[0].paid, Decimal::from(600));
    let repaid: Decimal = engine
        .expenses()
        .iter()
        .filter(|e| e.related_debt_id == Some(1))
        .map(|e| e.amount)
        .sum();
    assert_eq!(repaid, Decimal::from(600));
}

#[test]
fn new_receivable_creates_lend_and_collect_entries() {
    let (engine, _) = setup(vec![]);
    let id = engine
        .update_debts(DebtUpdate::Upsert {
            draft: DebtDraft {
                name: "Chú Tư".into(),
                total: Decimal::from(2_000_000),
                paid: Decimal::from(500_000),
                note: String::new(),
                kind: DebtKind::Receivable,
            },
            edit_id: None,
            auto_transaction: true,
        })
        .unwrap()
        .unwrap();

    let debts = engine.debts();
    assert_eq!(debts.len(), 1);
    assert_eq!(debts[0].id, id);
    assert_eq!(debts[0].updated_at, now());

    let expenses = engine.expenses();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].debt_action, Some(DebtAction::Lend));
    assert_eq!(expenses[0].amount, Decimal::from(2_000_000));
    assert_eq!(expenses[0].category, DEBT_CATEGORY);
    // synthetic entries are dated now, not by a picked date
    assert_eq!(expenses[0].date, now());

    let incomes = engine.incomes();
    assert_eq!(incomes.len(), 1);
    assert_eq!(incomes[0].debt_action, Some(DebtAction::Collect));
    assert_eq!(incomes[0].amount, Decimal::from(500_000));
    assert_ne!(incomes[0].id, expenses[0].id);
}

#[test]
fn editing_records_only_increases() {
    let mut existing = debt(3, DebtKind::Receivable, 1_000);
    existing.paid = Decimal::from(400);
    let (engine, _) = setup(vec![existing]);

    engine
        .update_debts(DebtUpdate::Upsert {
            draft: DebtDraft {
                name: "Debt 3".into(),
                total: Decimal::from(800),
                paid: Decimal::from(700),
                note: "renegotiated".into(),
                kind: DebtKind::Receivable,
            },
            edit_id: Some(3),
            auto_transaction: true,
        })
        .unwrap();

    // total went down: no lend entry; paid went up by 300: one collect entry
    assert!(engine.expenses().is_empty());
    let incomes = engine.incomes();
    assert_eq!(incomes.len(), 1);
    assert_eq!(incomes[0].amount, Decimal::from(300));
    let d = &engine.debts()[0];
    assert_eq!(d.id, 3);
    assert_eq!(d.total, Decimal::from(800));
    assert_eq!(d.note, "renegotiated");
}

#[test]
fn payable_borrowing_more_records_nothing() {
    let (engine, _) = setup(vec![debt(4, DebtKind::Payable, 1_000)]);
    engine
        .update_debts(DebtUpdate::Upsert {
            draft: DebtDraft {
                name: "Debt 4".into(),
                total: Decimal::from(5_000),
                paid: Decimal::ZERO,
                note: String::new(),
                kind: DebtKind::Payable,
            },
            edit_id: Some(4),
            auto_transaction: true,
        })
        .unwrap();
    assert!(engine.expenses().is_empty());
    assert!(engine.incomes().is_empty());
}

#[test]
fn auto_transaction_off_only_updates_debt() {
    let (engine, _) = setup(vec![]);
    engine
        .update_debts(DebtUpdate::Upsert {
            draft: DebtDraft {
                name: "Ngân hàng".into(),
                total: Decimal::from(10_000),
                paid: Decimal::from(1_000),
                note: String::new(),
                kind: DebtKind::Payable,
            },
            edit_id: None,
            auto_transaction: false,
        })
        .unwrap();
    assert_eq!(engine.debts().len(), 1);
    assert!(engine.expenses().is_empty());
    assert!(engine.incomes().is_empty());
}

#[test]
fn editing_missing_debt_fails() {
    let (engine, _) = setup(vec![]);
    let err = engine
        .update_debts(DebtUpdate::Upsert {
            draft: DebtDraft {
                name: "x".into(),
                total: Decimal::ONE,
                paid: Decimal::ZERO,
                note: String::new(),
                kind: DebtKind::Payable,
            },
            edit_id: Some(42),
            auto_transaction: true,
        })
        .unwrap_err();
    assert!(matches!(err, LedgerError::DebtNotFound(42)));
}

#[test]
fn replace_mode_has_no_side_effects() {
    let (engine, store) = setup(vec![
        debt(1, DebtKind::Payable, 100),
        debt(2, DebtKind::Receivable, 200),
    ]);
    let mut reordered = engine.debts();
    reordered.reverse();
    reordered.retain(|d| d.id != 1);
    assert_eq!(engine.update_debts(DebtUpdate::Replace(reordered)).unwrap(), None);

    let debts = engine.debts();
    assert_eq!(debts.len(), 1);
    assert_eq!(debts[0].id, 2);
    assert!(engine.expenses().is_empty());
    assert!(engine.incomes().is_empty());
    assert_eq!(store.load(), engine.snapshot());
}

#[test]
fn outstanding_is_floored() {
    let mut d = debt(5, DebtKind::Payable, 100);
    d.paid = Decimal::from(150);
    assert_eq!(d.outstanding(), Decimal::ZERO);
    d.paid = Decimal::from(40);
    assert_eq!(d.outstanding(), Decimal::from(60));
}
