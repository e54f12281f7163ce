// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::LedgerEngine;
use crate::models::EntryKind;
use crate::utils::required_str;
use anyhow::{Context, Result};

pub fn handle(engine: &LedgerEngine, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("rm", sub)) => {
            let kind = required_str(sub, "type")?.parse::<EntryKind>()?;
            let id = *sub.get_one::<i64>("id").context("Missing --id")?;
            if engine.delete_item(id, kind)? {
                println!("Removed {:?} {}", kind, id);
            } else {
                println!("No {:?} with id {}", kind, id);
            }
        }
        Some(("note", sub)) => {
            let kind = required_str(sub, "type")?.parse::<EntryKind>()?;
            let id = *sub.get_one::<i64>("id").context("Missing --id")?;
            let note = required_str(sub, "note")?;
            if engine.update_note(id, kind, note)? {
                println!("Updated note on {:?} {}", kind, id);
            } else {
                println!("No {:?} with id {}", kind, id);
            }
        }
        _ => {}
    }
    Ok(())
}
