// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::anyhow;
use chrono::{NaiveDate, NaiveDateTime};
use famledger::models::{
    Debt, DebtKind, EntryKind, PERSONAL_CATEGORY, SAVINGS_CATEGORY, Snapshot,
};
use famledger::store::{LocalStore, MemoryStore};
use famledger::sync::MemoryReplica;
use famledger::utils::{FixedClock, IdGenerator};
use famledger::{ExpenseOutcome, LedgerEngine, LedgerError, NewExpense};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 10)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn setup() -> (LedgerEngine, MemoryStore) {
    let store = MemoryStore::new();
    let engine = LedgerEngine::with_parts(
        store.clone(),
        Arc::new(MemoryReplica::new()),
        Arc::new(FixedClock(now())),
    );
    (engine, store)
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn add_income_prepends_with_time_of_day() {
    let (engine, store) = setup();
    let first = engine
        .add_income("Lương", Decimal::from(5_000_000), d(2024, 5, 1), "")
        .unwrap();
    let second = engine
        .add_income("Thưởng", Decimal::from(1_000_000), d(2024, 4, 1), "Q1")
        .unwrap();

    let incomes = engine.incomes();
    assert_eq!(incomes.len(), 2);
    // newest insertion first, regardless of date
    assert_eq!(incomes[0].id, second);
    assert_eq!(incomes[1].id, first);
    assert_eq!(incomes[1].source, "Lương");
    assert_eq!(incomes[1].amount, Decimal::from(5_000_000));
    assert_eq!(incomes[1].date, d(2024, 5, 1).and_hms_opt(9, 30, 0).unwrap());
    assert!(incomes[1].debt_action.is_none());
    assert_eq!(store.load(), engine.snapshot());
}

#[test]
fn back_to_back_ids_are_unique() {
    let (engine, _) = setup();
    let a = engine
        .add_income("A", Decimal::ONE, d(2024, 5, 1), "")
        .unwrap();
    let b = engine
        .add_income("B", Decimal::ONE, d(2024, 5, 1), "")
        .unwrap();
    assert!(b > a);
}

#[test]
fn validation_rejects_before_commit() {
    let (engine, store) = setup();
    let err = engine
        .add_income("  ", Decimal::from(10), d(2024, 5, 1), "")
        .unwrap_err();
    assert!(matches!(err, LedgerError::EmptySource));
    let err = engine
        .add_income("Lương", Decimal::ZERO, d(2024, 5, 1), "")
        .unwrap_err();
    assert!(matches!(err, LedgerError::NonPositiveAmount(_)));
    let err = engine
        .add_expense(NewExpense::new("", Decimal::from(10), d(2024, 5, 1)))
        .unwrap_err();
    assert!(matches!(err, LedgerError::EmptyCategory));
    let err = engine
        .add_savings(SAVINGS_CATEGORY, Decimal::from(-5), d(2024, 5, 1), "")
        .unwrap_err();
    assert!(err.is_validation());

    assert!(engine.incomes().is_empty());
    assert!(engine.expenses().is_empty());
    assert!(store.raw("incomes").is_none());
}

#[test]
fn personal_expense_is_tagged_with_who() {
    let (engine, _) = setup();
    let outcome = engine
        .add_expense(
            NewExpense::new(PERSONAL_CATEGORY, Decimal::from(50_000), d(2024, 5, 2))
                .note("cà phê")
                .who("Mẹ"),
        )
        .unwrap();
    assert!(matches!(outcome, ExpenseOutcome::Recorded(_)));
    let expenses = engine.expenses();
    assert_eq!(expenses[0].note, "[Mẹ] cà phê");
    assert!(expenses[0].related_debt_id.is_none());

    engine
        .add_expense(NewExpense::new("Ăn uống", Decimal::from(20_000), d(2024, 5, 2)).who("Mẹ"))
        .unwrap();
    assert_eq!(engine.expenses()[0].note, "");
}

#[test]
fn savings_are_plain_expenses() {
    let (engine, _) = setup();
    let id = engine
        .add_savings(SAVINGS_CATEGORY, Decimal::from(300_000), d(2024, 5, 3), "quỹ")
        .unwrap();
    let e = &engine.expenses()[0];
    assert_eq!(e.id, id);
    assert_eq!(e.category, SAVINGS_CATEGORY);
    assert_eq!(e.note, "quỹ");
    assert!(e.debt_action.is_none());
}

#[test]
fn delete_and_update_note_target_the_right_list() {
    let (engine, store) = setup();
    let income = engine
        .add_income("Lương", Decimal::from(100), d(2024, 5, 1), "")
        .unwrap();
    let ExpenseOutcome::Recorded(expense) = engine
        .add_expense(NewExpense::new("Ăn uống", Decimal::from(40), d(2024, 5, 1)))
        .unwrap()
    else {
        panic!("expected a plain expense");
    };

    assert!(engine.update_note(income, EntryKind::Income, "tháng 5").unwrap());
    assert!(!engine.update_note(income, EntryKind::Expense, "x").unwrap());
    assert_eq!(engine.incomes()[0].note, "tháng 5");

    assert!(!engine.delete_item(expense, EntryKind::Income).unwrap());
    assert!(engine.delete_item(expense, EntryKind::Expense).unwrap());
    assert!(engine.expenses().is_empty());
    assert_eq!(engine.incomes().len(), 1);
    assert_eq!(store.load(), engine.snapshot());
}

#[test]
fn month_summary_totals_by_calendar_month() {
    let (engine, _) = setup();
    engine
        .add_income("Lương", Decimal::from(1000), d(2024, 5, 1), "")
        .unwrap();
    engine
        .add_income("Lương", Decimal::from(999), d(2024, 4, 30), "")
        .unwrap();
    engine
        .add_expense(NewExpense::new("Ăn uống", Decimal::from(250), d(2024, 5, 20)))
        .unwrap();

    let s = engine.month_summary(2024, 5);
    assert_eq!(s.month, "2024-05");
    assert_eq!(s.income, Decimal::from(1000));
    assert_eq!(s.expense, Decimal::from(250));
    assert_eq!(s.balance, Decimal::from(750));
}

#[test]
fn engine_reloads_persisted_state() {
    let (engine, store) = setup();
    engine
        .add_income("Lương", Decimal::from(1000), d(2024, 5, 1), "")
        .unwrap();
    drop(engine);

    let reopened = LedgerEngine::with_parts(
        store.clone(),
        Arc::new(MemoryReplica::new()),
        Arc::new(FixedClock(now())),
    );
    assert_eq!(reopened.incomes().len(), 1);
    let next = reopened
        .add_income("Lương", Decimal::from(1), d(2024, 5, 1), "")
        .unwrap();
    assert!(next > reopened.incomes()[1].id);
}

struct BrokenStore {
    saves: Arc<Mutex<usize>>,
}

impl LocalStore for BrokenStore {
    fn load(&self) -> Snapshot {
        Snapshot::default()
    }

    fn save(&self, _snapshot: &Snapshot) -> anyhow::Result<()> {
        *self.saves.lock() += 1;
        Err(anyhow!("disk full"))
    }
}

#[test]
fn failed_local_save_leaves_state_unchanged() {
    let saves = Arc::new(Mutex::new(0));
    let engine = LedgerEngine::with_parts(
        BrokenStore {
            saves: Arc::clone(&saves),
        },
        Arc::new(MemoryReplica::new()),
        Arc::new(FixedClock(now())),
    );
    let err = engine
        .add_income("Lương", Decimal::from(10), d(2024, 5, 1), "")
        .unwrap_err();
    assert!(matches!(err, LedgerError::Storage(_)));
    assert!(err.to_string().contains("disk full"));
    assert_eq!(*saves.lock(), 1);
    assert!(engine.incomes().is_empty());
}

#[test]
fn offline_engine_never_reports_syncing() {
    let (engine, _) = setup();
    engine
        .add_income("Lương", Decimal::from(10), d(2024, 5, 1), "")
        .unwrap();
    let status = engine.status();
    assert!(!status.is_connected);
    assert!(!status.is_syncing);
    assert!(status.sync_error.is_none());
}

#[test]
fn id_generator_stops_at_the_end_of_the_id_space() {
    let ids = IdGenerator::new();
    ids.observe(i64::MAX - 1);
    assert_eq!(ids.next(now()), Some(i64::MAX));
    assert_eq!(ids.next(now()), None);
}

#[test]
fn exhausted_ids_reject_the_mutation() {
    let store = MemoryStore::seeded(&Snapshot {
        debts: vec![Debt {
            id: i64::MAX,
            name: "x".into(),
            total: Decimal::ONE,
            paid: Decimal::ZERO,
            note: String::new(),
            kind: DebtKind::Payable,
            updated_at: now(),
        }],
        ..Default::default()
    })
    .unwrap();
    let engine = LedgerEngine::with_parts(
        store.clone(),
        Arc::new(MemoryReplica::new()),
        Arc::new(FixedClock(now())),
    );
    let err = engine
        .add_income("Lương", Decimal::from(10), d(2024, 5, 1), "")
        .unwrap_err();
    assert!(matches!(err, LedgerError::IdsExhausted));
    assert!(engine.incomes().is_empty());
    assert_eq!(store.load(), engine.snapshot());
}
