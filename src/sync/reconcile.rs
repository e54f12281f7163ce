// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{RemoteDocument, Snapshot};

/// What to do with a snapshot event from the replica.
#[derive(Debug, Clone, PartialEq)]
pub enum Bootstrap {
    /// Remote copy exists and replaces local state wholesale.
    AdoptRemote(Snapshot),
    /// Remote copy is missing and local has records worth sharing.
    SeedRemote,
    /// Remote copy is missing and local is empty.
    Idle,
}

/// Remote always wins when present, even over unsynced local records.
pub fn reconcile(remote: Option<RemoteDocument>, local: &Snapshot) -> Bootstrap {
    match remote {
        Some(doc) => Bootstrap::AdoptRemote(doc.snapshot),
        None if local.has_no_records() => Bootstrap::Idle,
        None => Bootstrap::SeedRemote,
    }
}
