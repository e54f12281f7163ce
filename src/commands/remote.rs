// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::SqliteStore;
use crate::sync::{FamilyCode, RemoteConfig};
use crate::utils::{pretty_table, required_str};
use anyhow::{Context, Result};

pub const REMOTE_CONFIG_KEY: &str = "remote_config";
pub const FAMILY_CODE_KEY: &str = "family_code";

/// Connection parameters saved with `remote set`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub config: String,
    pub family: String,
}

pub fn configured(store: &SqliteStore) -> Result<Option<RemoteSettings>> {
    let config = store.setting(REMOTE_CONFIG_KEY)?;
    let family = store.setting(FAMILY_CODE_KEY)?;
    Ok(match (config, family) {
        (Some(config), Some(family)) => Some(RemoteSettings { config, family }),
        _ => None,
    })
}

pub fn handle(store: &SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let raw = required_str(sub, "config")?;
            let value: serde_json::Value =
                serde_json::from_str(raw).context("Connection config is not valid JSON")?;
            RemoteConfig::from_value(&value)?;
            let family = FamilyCode::parse(required_str(sub, "family")?)?;
            store.set_setting(REMOTE_CONFIG_KEY, raw)?;
            store.set_setting(FAMILY_CODE_KEY, family.as_str())?;
            println!("Remote ledger set to family '{}'", family);
        }
        Some(("clear", _)) => {
            store.remove_setting(REMOTE_CONFIG_KEY)?;
            store.remove_setting(FAMILY_CODE_KEY)?;
            println!("Remote ledger cleared; working local-only");
        }
        Some(("status", _)) => match configured(store)? {
            Some(remote) => {
                let endpoint = serde_json::from_str::<serde_json::Value>(&remote.config)
                    .ok()
                    .and_then(|v| RemoteConfig::from_value(&v).ok())
                    .map(|c| c.database_url)
                    .unwrap_or_else(|| "(invalid configuration)".to_string());
                println!(
                    "{}",
                    pretty_table(&["Family", "Endpoint"], vec![vec![remote.family, endpoint]])
                );
            }
            None => println!("No remote ledger configured"),
        },
        _ => {}
    }
    Ok(())
}
