// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Category whose expenses settle or collect a tracked debt.
pub const DEBT_CATEGORY: &str = "Nợ (Vay - Trả Góp)";
/// Category whose expense notes are tagged with the family member who spent.
pub const PERSONAL_CATEGORY: &str = "Cá nhân";
pub const SAVINGS_CATEGORY: &str = "Tiết kiệm";
/// Income source used for money coming back from a receivable debt.
pub const DEBT_COLLECTION_SOURCE: &str = "Thu nợ";

pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Ăn uống",
    "Đi chợ",
    "Điện nước",
    "Nhà cửa",
    "Đi lại",
    "Con cái",
    "Y tế",
    "Mua sắm",
    "Hiếu hỉ",
    PERSONAL_CATEGORY,
    DEBT_CATEGORY,
    SAVINGS_CATEGORY,
    "Khác",
];

pub fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

/// Parses a stored timestamp. Naive ISO forms are taken as local wall-clock
/// time; RFC 3339 forms with an offset (`...Z`, `+07:00`) are converted to it.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let raw = raw.trim();
    match DateTime::parse_from_rfc3339(raw) {
        Ok(at) => Ok(at.with_timezone(&Local).naive_local()),
        Err(_) => raw.parse::<NaiveDateTime>(),
    }
}

fn de_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(d)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn de_opt_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
    Option::<String>::deserialize(d)?
        .map(|raw| parse_timestamp(&raw).map_err(serde::de::Error::custom))
        .transpose()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtKind {
    /// I owe this money.
    Payable,
    /// This money is owed to me.
    Receivable,
}

impl FromStr for DebtKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "payable" => Ok(DebtKind::Payable),
            "receivable" => Ok(DebtKind::Receivable),
            other => Err(anyhow::anyhow!(
                "Unknown debt type '{}' (use payable|receivable)",
                other
            )),
        }
    }
}

impl fmt::Display for DebtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebtKind::Payable => f.write_str("payable"),
            DebtKind::Receivable => f.write_str("receivable"),
        }
    }
}

/// Tag recording why a transaction touched a debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtAction {
    Collect,
    Repay,
    Lend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub id: i64,
    pub source: String,
    pub amount: Decimal,
    #[serde(deserialize_with = "de_timestamp")]
    pub date: NaiveDateTime,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_debt_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_action: Option<DebtAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub category: String,
    pub amount: Decimal,
    #[serde(deserialize_with = "de_timestamp")]
    pub date: NaiveDateTime,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_debt_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_action: Option<DebtAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: i64,
    pub name: String,
    pub total: Decimal,
    pub paid: Decimal,
    #[serde(default)]
    pub note: String,
    #[serde(rename = "type")]
    pub kind: DebtKind,
    #[serde(deserialize_with = "de_timestamp")]
    pub updated_at: NaiveDateTime,
}

impl Debt {
    /// Amount still open, floored at zero when `paid` overshoots `total`.
    pub fn outstanding(&self) -> Decimal {
        (self.total - self.paid).max(Decimal::ZERO)
    }
}

/// Caller-supplied fields for creating or editing a debt.
#[derive(Debug, Clone, PartialEq)]
pub struct DebtDraft {
    pub name: String,
    pub total: Decimal,
    pub paid: Decimal,
    pub note: String,
    pub kind: DebtKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedTemplateItem {
    pub category: String,
    pub amount: Decimal,
}

/// Year-month key -> categories already confirmed paid in that period.
pub type FixedTracking = BTreeMap<String, BTreeSet<String>>;

/// Builds the `<year>-<zero-based month>` key used by [`FixedTracking`].
pub fn tracking_key(date: NaiveDate) -> String {
    format!("{}-{}", date.year(), date.month0())
}

/// The six persisted slots of a household ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub incomes: Vec<Income>,
    pub expenses: Vec<Expense>,
    pub debts: Vec<Debt>,
    pub fixed_config: Vec<FixedTemplateItem>,
    pub categories: Vec<String>,
    pub fixed_tracking: FixedTracking,
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot {
            incomes: Vec::new(),
            expenses: Vec::new(),
            debts: Vec::new(),
            fixed_config: Vec::new(),
            categories: default_categories(),
            fixed_tracking: FixedTracking::new(),
        }
    }
}

impl Snapshot {
    /// True when no income, expense or debt has been recorded.
    pub fn has_no_records(&self) -> bool {
        self.incomes.is_empty() && self.expenses.is_empty() && self.debts.is_empty()
    }

    pub fn max_id(&self) -> i64 {
        let incomes = self.incomes.iter().map(|i| i.id);
        let expenses = self.expenses.iter().map(|e| e.id);
        let debts = self.debts.iter().map(|d| d.id);
        incomes.chain(expenses).chain(debts).max().unwrap_or(0)
    }

    pub fn debt(&self, id: i64) -> Option<&Debt> {
        self.debts.iter().find(|d| d.id == id)
    }
}

/// Shared copy of a ledger as stored on the remote replica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    #[serde(flatten)]
    pub snapshot: Snapshot,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_opt_timestamp"
    )]
    pub last_update: Option<NaiveDateTime>,
}

impl RemoteDocument {
    pub fn stamped(snapshot: Snapshot, at: NaiveDateTime) -> Self {
        RemoteDocument {
            snapshot,
            last_update: Some(at),
        }
    }
}

/// Which transaction list an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl FromStr for EntryKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(EntryKind::Income),
            "expense" => Ok(EntryKind::Expense),
            other => Err(anyhow::anyhow!(
                "Unknown entry type '{}' (use income|expense)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixedStatus {
    pub category: String,
    pub amount: Decimal,
    pub confirmed: bool,
}
