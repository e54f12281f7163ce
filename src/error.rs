// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::sync::SyncError;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("income source must not be empty")]
    EmptySource,
    #[error("category must not be empty")]
    EmptyCategory,
    #[error("amount must be greater than zero (got {0})")]
    NonPositiveAmount(Decimal),
    #[error("select a debtor for category '{0}'")]
    DebtorRequired(String),
    #[error("debt {0} not found")]
    DebtNotFound(i64),
    #[error("no ids left to assign")]
    IdsExhausted,
    #[error("a tokio runtime is required to connect to a remote replica")]
    NoRuntime,
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("failed to persist ledger: {0:#}")]
    Storage(anyhow::Error),
}

impl LedgerError {
    /// Rejected input, as opposed to an infrastructure failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LedgerError::EmptySource
                | LedgerError::EmptyCategory
                | LedgerError::NonPositiveAmount(_)
                | LedgerError::DebtorRequired(_)
                | LedgerError::DebtNotFound(_)
        )
    }
}
