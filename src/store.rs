// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Local persistence of the six ledger slots.

use crate::models::{Snapshot, default_categories};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const SLOT_INCOMES: &str = "incomes";
pub const SLOT_EXPENSES: &str = "expenses";
pub const SLOT_DEBTS: &str = "debts";
pub const SLOT_FIXED_CONFIG: &str = "fixedConfig";
pub const SLOT_CATEGORIES: &str = "categories";
pub const SLOT_FIXED_TRACKING: &str = "fixedTracking";

pub const SLOTS: [&str; 6] = [
    SLOT_INCOMES,
    SLOT_EXPENSES,
    SLOT_DEBTS,
    SLOT_FIXED_CONFIG,
    SLOT_CATEGORIES,
    SLOT_FIXED_TRACKING,
];

/// Synchronous key-value persistence for a [`Snapshot`].
///
/// `load` never fails: a missing or malformed slot falls back to its default.
/// `save` replaces all six slots at once.
pub trait LocalStore: Send {
    fn load(&self) -> Snapshot;
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

pub fn encode_slots(snapshot: &Snapshot) -> Result<Vec<(&'static str, String)>> {
    Ok(vec![
        (SLOT_INCOMES, serde_json::to_string(&snapshot.incomes)?),
        (SLOT_EXPENSES, serde_json::to_string(&snapshot.expenses)?),
        (SLOT_DEBTS, serde_json::to_string(&snapshot.debts)?),
        (SLOT_FIXED_CONFIG, serde_json::to_string(&snapshot.fixed_config)?),
        (SLOT_CATEGORIES, serde_json::to_string(&snapshot.categories)?),
        (
            SLOT_FIXED_TRACKING,
            serde_json::to_string(&snapshot.fixed_tracking)?,
        ),
    ])
}

/// Rebuilds a snapshot from raw slot values, defaulting each slot independently.
pub fn decode_slots(mut raw: impl FnMut(&str) -> Option<String>) -> Snapshot {
    Snapshot {
        incomes: decode_slot(SLOT_INCOMES, raw(SLOT_INCOMES)).unwrap_or_default(),
        expenses: decode_slot(SLOT_EXPENSES, raw(SLOT_EXPENSES)).unwrap_or_default(),
        debts: decode_slot(SLOT_DEBTS, raw(SLOT_DEBTS)).unwrap_or_default(),
        fixed_config: decode_slot(SLOT_FIXED_CONFIG, raw(SLOT_FIXED_CONFIG)).unwrap_or_default(),
        categories: decode_slot(SLOT_CATEGORIES, raw(SLOT_CATEGORIES))
            .unwrap_or_else(default_categories),
        fixed_tracking: decode_slot(SLOT_FIXED_TRACKING, raw(SLOT_FIXED_TRACKING))
            .unwrap_or_default(),
    }
}

fn decode_slot<T: DeserializeOwned>(slot: &str, value: Option<String>) -> Option<T> {
    let value = value?;
    match serde_json::from_str(&value) {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::warn!(slot, error = %err, "discarding malformed slot");
            None
        }
    }
}

/// In-process store. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(snapshot: &Snapshot) -> Result<Self> {
        let store = Self::new();
        store.save(snapshot)?;
        Ok(store)
    }

    /// Writes a slot verbatim, bypassing encoding.
    pub fn insert_raw(&self, slot: &str, value: &str) {
        self.slots.lock().insert(slot.to_string(), value.to_string());
    }

    pub fn raw(&self, slot: &str) -> Option<String> {
        self.slots.lock().get(slot).cloned()
    }
}

impl LocalStore for MemoryStore {
    fn load(&self) -> Snapshot {
        let slots = self.slots.lock();
        decode_slots(|slot| slots.get(slot).cloned())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let encoded = encode_slots(snapshot).context("Encode ledger slots")?;
        let mut slots = self.slots.lock();
        for (slot, value) in encoded {
            slots.insert(slot.to_string(), value);
        }
        Ok(())
    }
}
