// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::channel::{
    Connector, FamilyCode, ReplicaEvent, Subscription, SyncChannel, SyncError,
};
use crate::models::RemoteDocument;
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// In-process replica. Clones share documents, so two engines built on clones
/// of one `MemoryReplica` behave like two devices on the same family code.
#[derive(Clone, Default)]
pub struct MemoryReplica {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    documents: HashMap<String, RemoteDocument>,
    watchers: Vec<(String, mpsc::UnboundedSender<ReplicaEvent>)>,
    write_failure: Option<String>,
    writes: usize,
}

impl MemoryInner {
    fn notify(&mut self, family: &str, event: ReplicaEvent) {
        self.watchers.retain(|(_, tx)| !tx.is_closed());
        for (code, tx) in &self.watchers {
            if code == family {
                let _ = tx.send(event.clone());
            }
        }
    }
}

impl MemoryReplica {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self, family: &str) -> Option<RemoteDocument> {
        let code = FamilyCode::parse(family).ok()?;
        self.inner.lock().documents.get(code.as_str()).cloned()
    }

    /// Stores a document as if another device wrote it, notifying listeners.
    pub fn put_document(&self, family: &str, document: RemoteDocument) -> Result<(), SyncError> {
        let code = FamilyCode::parse(family)?;
        let mut inner = self.inner.lock();
        inner
            .documents
            .insert(code.as_str().to_string(), document.clone());
        inner.notify(code.as_str(), ReplicaEvent::Snapshot(Some(document)));
        Ok(())
    }

    /// Makes every subsequent `replace` fail with `message` until cleared.
    pub fn fail_writes(&self, message: Option<&str>) {
        self.inner.lock().write_failure = message.map(str::to_string);
    }

    /// Delivers a transport error to every listener of `family`.
    pub fn emit_error(&self, family: &str, message: &str) -> Result<(), SyncError> {
        let code = FamilyCode::parse(family)?;
        self.inner
            .lock()
            .notify(code.as_str(), ReplicaEvent::Error(message.to_string()));
        Ok(())
    }

    pub fn write_count(&self) -> usize {
        self.inner.lock().writes
    }

    pub fn listener_count(&self, family: &str) -> usize {
        let Ok(code) = FamilyCode::parse(family) else {
            return 0;
        };
        self.inner
            .lock()
            .watchers
            .iter()
            .filter(|(c, tx)| c == code.as_str() && !tx.is_closed())
            .count()
    }
}

impl SyncChannel for MemoryReplica {
    fn subscribe(&self, family: &FamilyCode) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        let current = inner.documents.get(family.as_str()).cloned();
        let _ = tx.send(ReplicaEvent::Snapshot(current));
        inner.watchers.push((family.as_str().to_string(), tx));
        Subscription::new(rx)
    }

    fn replace(
        &self,
        family: &FamilyCode,
        document: RemoteDocument,
    ) -> BoxFuture<'static, Result<(), SyncError>> {
        let inner = Arc::clone(&self.inner);
        let code = family.as_str().to_string();
        async move {
            let mut inner = inner.lock();
            if let Some(message) = inner.write_failure.clone() {
                return Err(SyncError::Transport(message));
            }
            inner.writes += 1;
            inner.documents.insert(code.clone(), document.clone());
            inner.notify(&code, ReplicaEvent::Snapshot(Some(document)));
            Ok(())
        }
        .boxed()
    }
}

impl Connector for MemoryReplica {
    fn connect(&self, _config: &serde_json::Value) -> Result<Arc<dyn SyncChannel>, SyncError> {
        Ok(Arc::new(self.clone()))
    }
}
