// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::RemoteDocument;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("family code must not be empty")]
    EmptyFamilyCode,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed remote document: {0}")]
    Decode(String),
}

/// Normalized (trimmed, uppercased) identifier of a shared ledger document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FamilyCode(String);

impl FamilyCode {
    pub fn parse(raw: &str) -> Result<Self, SyncError> {
        let code = raw.trim().to_uppercase();
        if code.is_empty() {
            return Err(SyncError::EmptyFamilyCode);
        }
        Ok(FamilyCode(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FamilyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplicaEvent {
    /// Current remote document; `None` when it does not exist yet.
    Snapshot(Option<RemoteDocument>),
    Error(String),
}

/// A live listener on one remote document.
///
/// Dropping the subscription (or calling [`Subscription::unsubscribe`]) runs
/// the replica's teardown.
pub struct Subscription {
    events: mpsc::UnboundedReceiver<ReplicaEvent>,
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(events: mpsc::UnboundedReceiver<ReplicaEvent>) -> Self {
        Subscription {
            events,
            teardown: None,
        }
    }

    pub fn with_teardown(mut self, teardown: impl FnOnce() + Send + 'static) -> Self {
        self.teardown = Some(Box::new(teardown));
        self
    }

    pub async fn next(&mut self) -> Option<ReplicaEvent> {
        self.events.recv().await
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.events.close();
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

/// A remote replica holding one whole-document copy per family code.
pub trait SyncChannel: Send + Sync {
    /// Starts listening; must be called from within a tokio runtime.
    fn subscribe(&self, family: &FamilyCode) -> Subscription;

    /// Overwrites the whole document. No concurrency token: last writer wins.
    fn replace(
        &self,
        family: &FamilyCode,
        document: RemoteDocument,
    ) -> BoxFuture<'static, Result<(), SyncError>>;
}

/// Builds a [`SyncChannel`] from opaque connection parameters.
pub trait Connector: Send + Sync {
    fn connect(&self, config: &serde_json::Value) -> Result<Arc<dyn SyncChannel>, SyncError>;
}
