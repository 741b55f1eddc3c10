use cadence_core::{Database, EngineError, Note};
use chrono::Utc;
use clap::Subcommand;

use crate::common::{print_json, CliResult};

#[derive(Subcommand)]
pub enum NoteAction {
    /// Create a note
    Add {
        title: String,
        #[arg(long, default_value = "")]
        body: String,
    },
    /// Replace a note's body (bumps its last-modified day)
    Edit { id: String, body: String },
    /// List notes
    List {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: NoteAction) -> CliResult {
    let db = Database::open()?;

    match action {
        NoteAction::Add { title, body } => {
            let note = Note::new(title, body);
            db.upsert_note(&note)?;
            print_json(&note)?;
        }
        NoteAction::Edit { id, body } => {
            let mut notes = db.load_notes()?;
            let Some(note) = notes.iter_mut().find(|n| n.id == id) else {
                return Err(EngineError::UnknownItem { id }.into());
            };
            note.edit(body, Utc::now());
            db.upsert_note(note)?;
            print_json(note)?;
        }
        NoteAction::List { json } => {
            let notes = db.load_notes()?;
            if json {
                print_json(&notes)?;
            } else {
                for note in &notes {
                    println!("{} {} (modified {})", note.id, note.title, note.modified_at);
                }
            }
        }
    }

    Ok(())
}
