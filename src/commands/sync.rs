// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::remote::RemoteSettings;
use crate::engine::{LedgerEngine, SyncStatus};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use std::time::Duration;
use tokio::time::timeout;

const BOOTSTRAP_WAIT: Duration = Duration::from_secs(10);
const PUSH_WAIT: Duration = Duration::from_secs(15);

/// Connects and waits (bounded) for the first remote snapshot.
/// Failures leave the engine usable offline.
pub async fn attach(engine: &LedgerEngine, remote: &RemoteSettings) -> bool {
    if let Err(err) = engine.connect(&remote.config, &remote.family) {
        eprintln!("Working offline: {}", err);
        return false;
    }
    match timeout(BOOTSTRAP_WAIT, engine.settled()).await {
        Ok(status) => {
            if let Some(err) = status.sync_error {
                eprintln!("Sync problem: {}", err);
            }
        }
        Err(_) => tracing::warn!(family = %remote.family, "no remote snapshot yet; continuing"),
    }
    true
}

/// Waits (bounded) for pushes to finish before the process exits.
pub async fn settle(engine: &LedgerEngine) -> SyncStatus {
    match timeout(PUSH_WAIT, engine.settled()).await {
        Ok(status) => {
            if let Some(err) = &status.sync_error {
                eprintln!("Saved locally; remote push failed: {}", err);
            }
            status
        }
        Err(_) => {
            eprintln!("Saved locally; remote push still pending");
            engine.status()
        }
    }
}

pub fn report(engine: &LedgerEngine, sub: &clap::ArgMatches) -> Result<()> {
    let status = engine.status();
    if !maybe_print_json(sub.get_flag("json"), &status)? {
        let rows = vec![vec![
            engine.family_code().unwrap_or_else(|| "-".into()),
            status.is_connected.to_string(),
            status.is_syncing.to_string(),
            status.sync_error.unwrap_or_default(),
        ]];
        println!(
            "{}",
            pretty_table(&["Family", "Connected", "Syncing", "Error"], rows)
        );
    }
    Ok(())
}
