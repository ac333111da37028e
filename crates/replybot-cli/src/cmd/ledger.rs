use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use replybot_core::ledger::ReplyLedger;
use replybot_core::paths;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum LedgerSubcommand {
    /// List authors replied to within the retention window
    Show,

    /// Drop entries older than the retention window
    Prune,

    /// Make one author eligible for a reply again
    Forget {
        /// Author handle (case-insensitive)
        handle: String,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: LedgerSubcommand, json: bool) -> anyhow::Result<()> {
    let path = paths::ledger_path(root);
    let mut ledger = ReplyLedger::load(&path)
        .with_context(|| format!("failed to load ledger {}", path.display()))?;

    match subcmd {
        LedgerSubcommand::Show => show(&ledger, json),
        LedgerSubcommand::Prune => prune(&mut ledger, json),
        LedgerSubcommand::Forget { handle } => forget(&mut ledger, &handle, json),
    }
}

fn show(ledger: &ReplyLedger, json: bool) -> anyhow::Result<()> {
    if json {
        #[derive(serde::Serialize)]
        struct Entry<'a> {
            handle: &'a str,
            last_reply: chrono::NaiveDate,
        }
        let entries: Vec<Entry> = ledger
            .entries()
            .map(|(handle, last_reply)| Entry { handle, last_reply })
            .collect();
        return print_json(&entries);
    }

    if ledger.is_empty() {
        println!("Ledger is empty.");
        return Ok(());
    }
    let rows = ledger
        .entries()
        .map(|(handle, date)| vec![handle.to_string(), date.to_string()])
        .collect();
    print_table(&["HANDLE", "LAST REPLY"], rows);
    Ok(())
}

fn prune(ledger: &mut ReplyLedger, json: bool) -> anyhow::Result<()> {
    let today = chrono::Local::now().date_naive();
    let removed = ledger.prune(today);
    if removed > 0 {
        ledger.persist().context("failed to save ledger")?;
    }
    if json {
        return print_json(&serde_json::json!({ "removed": removed, "remaining": ledger.len() }));
    }
    println!(
        "Pruned {removed} entr{}; {} remaining.",
        if removed == 1 { "y" } else { "ies" },
        ledger.len()
    );
    Ok(())
}

fn forget(ledger: &mut ReplyLedger, handle: &str, json: bool) -> anyhow::Result<()> {
    let removed = ledger.forget(handle);
    if removed {
        ledger.persist().context("failed to save ledger")?;
    }
    if json {
        return print_json(&serde_json::json!({ "handle": handle, "removed": removed }));
    }
    if removed {
        println!("Forgot {handle}.");
    } else {
        println!("{handle} is not in the ledger.");
    }
    Ok(())
}
