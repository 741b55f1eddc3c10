use cadence_core::{Database, JournalEntry};
use clap::Subcommand;

use crate::common::{print_json, CliResult};

#[derive(Subcommand)]
pub enum JournalAction {
    /// Write a journal entry
    Add { body: String },
    /// List journal entries
    List {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: JournalAction) -> CliResult {
    let db = Database::open()?;

    match action {
        JournalAction::Add { body } => {
            let entry = JournalEntry::new(body);
            db.upsert_journal_entry(&entry)?;
            print_json(&entry)?;
        }
        JournalAction::List { json } => {
            let entries = db.load_journal_entries()?;
            if json {
                print_json(&entries)?;
            } else {
                for entry in &entries {
                    println!("{} {} {}", entry.id, entry.logged_at, entry.body);
                }
            }
        }
    }

    Ok(())
}
