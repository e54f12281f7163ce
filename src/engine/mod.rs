// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The ledger engine: in-memory state, write-through persistence and the
//! link to an optional remote replica.
//!
//! Every mutation clones the current [`Snapshot`], edits the clone, saves it
//! to the [`LocalStore`] and only then swaps it in. When a replica is
//! connected the new snapshot is also pushed as a whole document on the
//! runtime captured by [`LedgerEngine::connect`]. Remote snapshot events are
//! applied by a single listener task under the same lock as mutations.

mod mutations;

pub use mutations::{DebtUpdate, ExpenseOutcome, NewExpense};

use crate::error::LedgerError;
use crate::models::{
    Debt, Expense, FixedStatus, FixedTemplateItem, FixedTracking, Income, MonthSummary,
    RemoteDocument, Snapshot, tracking_key,
};
use crate::store::LocalStore;
use crate::sync::{
    Bootstrap, Connector, FamilyCode, HttpConnector, ReplicaEvent, Subscription, SyncChannel,
    SyncError, reconcile,
};
use crate::utils::{Clock, IdGenerator, SystemClock};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const SUBSCRIPTION_FALLBACK_ERROR: &str = "remote subscription failed";
/// Pushed snapshots remembered for echo suppression.
const ECHO_WINDOW: usize = 32;

/// Connection bookkeeping visible to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub is_connected: bool,
    /// A push or the initial pull is in flight.
    pub is_syncing: bool,
    pub sync_error: Option<String>,
}

pub struct LedgerEngine {
    shared: Arc<Shared>,
    connector: Arc<dyn Connector>,
}

struct Shared {
    inner: Mutex<Inner>,
    status: watch::Sender<SyncStatus>,
    clock: Arc<dyn Clock>,
    ids: IdGenerator,
}

struct Inner {
    snapshot: Snapshot,
    store: Box<dyn LocalStore>,
    link: Option<Link>,
    in_flight: usize,
    awaiting_snapshot: bool,
    /// Snapshots this engine pushed, oldest first. The replica notifies us of
    /// our own writes; adopting an older one would roll back newer local edits.
    echoes: VecDeque<Snapshot>,
}

struct Link {
    channel: Arc<dyn SyncChannel>,
    family: FamilyCode,
    runtime: Handle,
    listener: JoinHandle<()>,
}

impl LedgerEngine {
    /// Loads state from `store`; remote sync goes over HTTP once connected.
    pub fn new(store: impl LocalStore + 'static) -> Self {
        Self::with_parts(store, Arc::new(HttpConnector), Arc::new(SystemClock))
    }

    pub fn with_parts(
        store: impl LocalStore + 'static,
        connector: Arc<dyn Connector>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let snapshot = store.load();
        let ids = IdGenerator::new();
        ids.observe(snapshot.max_id());
        let (status, _) = watch::channel(SyncStatus::default());
        LedgerEngine {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    snapshot,
                    store: Box::new(store),
                    link: None,
                    in_flight: 0,
                    awaiting_snapshot: false,
                    echoes: VecDeque::new(),
                }),
                status,
                clock,
                ids,
            }),
            connector,
        }
    }

    // ---- read views ----

    pub fn snapshot(&self) -> Snapshot {
        self.shared.inner.lock().snapshot.clone()
    }

    pub fn incomes(&self) -> Vec<Income> {
        self.shared.inner.lock().snapshot.incomes.clone()
    }

    pub fn expenses(&self) -> Vec<Expense> {
        self.shared.inner.lock().snapshot.expenses.clone()
    }

    pub fn debts(&self) -> Vec<Debt> {
        self.shared.inner.lock().snapshot.debts.clone()
    }

    pub fn categories(&self) -> Vec<String> {
        self.shared.inner.lock().snapshot.categories.clone()
    }

    pub fn fixed_config(&self) -> Vec<FixedTemplateItem> {
        self.shared.inner.lock().snapshot.fixed_config.clone()
    }

    pub fn fixed_tracking(&self) -> FixedTracking {
        self.shared.inner.lock().snapshot.fixed_tracking.clone()
    }

    pub fn status(&self) -> SyncStatus {
        self.shared.status.borrow().clone()
    }

    pub fn watch_status(&self) -> watch::Receiver<SyncStatus> {
        self.shared.status.subscribe()
    }

    pub fn family_code(&self) -> Option<String> {
        let inner = self.shared.inner.lock();
        inner.link.as_ref().map(|l| l.family.to_string())
    }

    /// Waits until no push or initial pull is in flight.
    pub async fn settled(&self) -> SyncStatus {
        let mut rx = self.shared.status.subscribe();
        match rx.wait_for(|s| !s.is_syncing).await {
            Ok(status) => status.clone(),
            Err(_) => self.status(),
        }
    }

    /// Income and expense totals for one calendar month (`month` is 1-12).
    pub fn month_summary(&self, year: i32, month: u32) -> MonthSummary {
        let inner = self.shared.inner.lock();
        let in_month = |d: &NaiveDateTime| d.year() == year && d.month() == month;
        let income: Decimal = inner
            .snapshot
            .incomes
            .iter()
            .filter(|i| in_month(&i.date))
            .map(|i| i.amount)
            .sum();
        let expense: Decimal = inner
            .snapshot
            .expenses
            .iter()
            .filter(|e| in_month(&e.date))
            .map(|e| e.amount)
            .sum();
        MonthSummary {
            month: format!("{:04}-{:02}", year, month),
            income,
            expense,
            balance: income - expense,
        }
    }

    /// Template items paired with whether they were confirmed for `view_date`'s month.
    pub fn fixed_status(&self, view_date: NaiveDate) -> Vec<FixedStatus> {
        let inner = self.shared.inner.lock();
        let confirmed = inner.snapshot.fixed_tracking.get(&tracking_key(view_date));
        inner
            .snapshot
            .fixed_config
            .iter()
            .map(|item| FixedStatus {
                category: item.category.clone(),
                amount: item.amount,
                confirmed: confirmed.is_some_and(|set| set.contains(&item.category)),
            })
            .collect()
    }

    // ---- connection ----

    /// Subscribes to the family document described by `config_json`.
    ///
    /// Any previous subscription is torn down first. Must be called from
    /// within a tokio runtime; pushes are spawned on that runtime.
    pub fn connect(&self, config_json: &str, family_code: &str) -> Result<(), LedgerError> {
        self.disconnect();

        let family = FamilyCode::parse(family_code).map_err(|e| self.connection_failed(e))?;
        let config: serde_json::Value = serde_json::from_str(config_json)
            .map_err(|e| self.connection_failed(SyncError::InvalidConfig(e.to_string())))?;
        let channel = self
            .connector
            .connect(&config)
            .map_err(|e| self.connection_failed(e))?;
        let runtime = Handle::try_current().map_err(|_| LedgerError::NoRuntime)?;

        let mut inner = self.shared.inner.lock();
        let subscription = {
            let _guard = runtime.enter();
            channel.subscribe(&family)
        };
        inner.awaiting_snapshot = true;
        inner.echoes.clear();
        self.shared.status.send_modify(|s| {
            s.is_connected = true;
            s.sync_error = None;
        });
        self.shared.refresh_syncing(&inner);
        let listener = runtime.spawn(listen(Arc::clone(&self.shared), subscription));
        info!(family = %family, "subscribed to remote ledger");
        inner.link = Some(Link {
            channel,
            family,
            runtime,
            listener,
        });
        Ok(())
    }

    /// Tears down the active subscription, if any. Pushes already in flight
    /// still run to completion.
    pub fn disconnect(&self) {
        let mut inner = self.shared.inner.lock();
        if let Some(link) = inner.link.take() {
            link.listener.abort();
            info!(family = %link.family, "unsubscribed from remote ledger");
        }
        inner.awaiting_snapshot = false;
        self.shared.status.send_modify(|s| s.is_connected = false);
        self.shared.refresh_syncing(&inner);
    }

    fn connection_failed(&self, err: SyncError) -> LedgerError {
        warn!(error = %err, "remote connection rejected");
        self.shared.status.send_modify(|s| {
            s.is_connected = false;
            s.sync_error = Some(err.to_string());
        });
        LedgerError::Sync(err)
    }

    // ---- commit plumbing ----

    fn now(&self) -> NaiveDateTime {
        self.shared.clock.now()
    }

    fn next_id(&self, at: NaiveDateTime) -> Result<i64, LedgerError> {
        self.shared.ids.next(at).ok_or(LedgerError::IdsExhausted)
    }

    /// Applies `edit` to a copy of the current snapshot and commits it.
    /// An error from `edit` leaves state and storage untouched.
    fn mutate<T>(
        &self,
        op: &'static str,
        edit: impl FnOnce(&mut Snapshot) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let mut inner = self.shared.inner.lock();
        let mut next = inner.snapshot.clone();
        let out = edit(&mut next)?;
        self.shared.commit(&mut inner, next)?;
        debug!(op, "ledger committed");
        Ok(out)
    }
}

impl Drop for LedgerEngine {
    fn drop(&mut self) {
        if let Some(link) = self.shared.inner.lock().link.take() {
            link.listener.abort();
        }
    }
}

impl Shared {
    fn refresh_syncing(&self, inner: &Inner) {
        let syncing = inner.in_flight > 0 || inner.awaiting_snapshot;
        self.status.send_if_modified(|s| {
            let changed = s.is_syncing != syncing;
            s.is_syncing = syncing;
            changed
        });
    }

    fn commit(self: &Arc<Self>, inner: &mut Inner, next: Snapshot) -> Result<(), LedgerError> {
        inner.store.save(&next).map_err(LedgerError::Storage)?;
        inner.snapshot = next;
        self.push(inner);
        Ok(())
    }

    /// Sends the current snapshot to the replica when connected.
    fn push(self: &Arc<Self>, inner: &mut Inner) {
        let connected = self.status.borrow().is_connected;
        let Some(link) = inner.link.as_ref().filter(|_| connected) else {
            return;
        };
        let document = RemoteDocument::stamped(inner.snapshot.clone(), self.clock.now());
        let pending = link.channel.replace(&link.family, document);
        let family = link.family.clone();
        let runtime = link.runtime.clone();
        if inner.echoes.len() == ECHO_WINDOW {
            inner.echoes.pop_front();
        }
        let pushed = inner.snapshot.clone();
        inner.echoes.push_back(pushed);
        inner.in_flight += 1;
        self.refresh_syncing(inner);

        let shared = Arc::clone(self);
        runtime.spawn(async move {
            let result = pending.await;
            shared.finish_push(&family, result);
        });
    }

    fn finish_push(&self, family: &FamilyCode, result: Result<(), SyncError>) {
        let mut inner = self.inner.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);
        match result {
            Ok(()) => {
                debug!(family = %family, "pushed ledger snapshot");
                // an offline engine keeps the error that took it offline
                self.status.send_if_modified(|s| {
                    let clear = s.is_connected && s.sync_error.is_some();
                    if clear {
                        s.sync_error = None;
                    }
                    clear
                });
            }
            Err(err) => {
                warn!(family = %family, error = %err, "push failed; local state kept");
                self.status.send_if_modified(|s| {
                    if s.is_connected {
                        s.sync_error = Some(err.to_string());
                    }
                    s.is_connected
                });
            }
        }
        self.refresh_syncing(&inner);
    }

    /// Returns false once the subscription is dead.
    fn apply_event(self: &Arc<Self>, event: ReplicaEvent) -> bool {
        let mut inner = self.inner.lock();
        inner.awaiting_snapshot = false;
        let alive = match event {
            ReplicaEvent::Snapshot(Some(doc)) if inner.echoes.contains(&doc.snapshot) => {
                if let Some(pos) = inner.echoes.iter().position(|s| *s == doc.snapshot) {
                    inner.echoes.drain(..=pos);
                }
                debug!("ignoring echo of own push");
                true
            }
            ReplicaEvent::Snapshot(remote) => {
                match reconcile(remote, &inner.snapshot) {
                    Bootstrap::AdoptRemote(snapshot) => {
                        if let Err(err) = inner.store.save(&snapshot) {
                            warn!(error = %err, "could not persist remote snapshot");
                            self.status.send_modify(|s| {
                                s.sync_error = Some(format!("failed to persist ledger: {:#}", err))
                            });
                        } else {
                            debug!("adopted remote snapshot");
                            self.ids.observe(snapshot.max_id());
                            inner.snapshot = snapshot;
                            self.status.send_modify(|s| s.sync_error = None);
                        }
                    }
                    Bootstrap::SeedRemote => {
                        info!("remote ledger missing; seeding from local");
                        self.push(&mut inner);
                    }
                    Bootstrap::Idle => debug!("remote ledger missing; nothing to seed"),
                }
                true
            }
            ReplicaEvent::Error(message) => {
                let message = if message.trim().is_empty() {
                    SUBSCRIPTION_FALLBACK_ERROR.to_string()
                } else {
                    message
                };
                warn!(error = %message, "remote subscription failed; continuing offline");
                inner.in_flight = 0;
                self.status.send_modify(|s| {
                    s.is_connected = false;
                    s.sync_error = Some(message);
                });
                false
            }
        };
        self.refresh_syncing(&inner);
        alive
    }
}

async fn listen(shared: Arc<Shared>, mut subscription: Subscription) {
    while let Some(event) = subscription.next().await {
        if !shared.apply_event(event) {
            break;
        }
    }
}
