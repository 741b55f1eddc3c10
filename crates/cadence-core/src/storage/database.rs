//! SQLite persistence for the caller-owned collections.
//!
//! The engine never performs I/O itself: the CLI loads collections here,
//! hands them to the engine, and writes back what changed. Tasks, habits,
//! journal entries and notes are stored as one JSON document per row;
//! timer sessions get typed columns so they can be queried by item and
//! date.

use chrono::{DateTime, Utc};
use indoc::indoc;
use rusqlite::{params, Connection};

use crate::error::StorageError;
use crate::habit::Habit;
use crate::journal::{JournalEntry, Note};
use crate::task::Task;
use crate::timer::TimerSession;

use super::data_dir;

/// SQLite database for all persisted collections.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/cadence.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("cadence.db");
        let conn = Connection::open(&path)
            .map_err(|source| StorageError::OpenFailed { path, source })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(indoc! {"
                CREATE TABLE IF NOT EXISTS tasks (
                    id   TEXT PRIMARY KEY,
                    data TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS habits (
                    id   TEXT PRIMARY KEY,
                    data TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS journal_entries (
                    id   TEXT PRIMARY KEY,
                    data TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS notes (
                    id   TEXT PRIMARY KEY,
                    data TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS sessions (
                    id               TEXT PRIMARY KEY,
                    item_id          TEXT NOT NULL,
                    started_at       TEXT NOT NULL,
                    ended_at         TEXT,
                    duration_seconds INTEGER
                );

                CREATE INDEX IF NOT EXISTS idx_sessions_item_id ON sessions(item_id);
                CREATE INDEX IF NOT EXISTS idx_sessions_ended_at ON sessions(ended_at);
            "})
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))
    }

    // ── JSON-document collections ────────────────────────────────────

    pub fn load_tasks(&self) -> Result<Vec<Task>, StorageError> {
        self.load_documents("tasks")
    }

    pub fn upsert_task(&self, task: &Task) -> Result<(), StorageError> {
        self.upsert_document("tasks", &task.id, task)
    }

    pub fn delete_task(&self, id: &str) -> Result<bool, StorageError> {
        self.delete_document("tasks", id)
    }

    pub fn load_habits(&self) -> Result<Vec<Habit>, StorageError> {
        self.load_documents("habits")
    }

    pub fn upsert_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        self.upsert_document("habits", &habit.id, habit)
    }

    pub fn delete_habit(&self, id: &str) -> Result<bool, StorageError> {
        self.delete_document("habits", id)
    }

    pub fn load_journal_entries(&self) -> Result<Vec<JournalEntry>, StorageError> {
        self.load_documents("journal_entries")
    }

    pub fn upsert_journal_entry(&self, entry: &JournalEntry) -> Result<(), StorageError> {
        self.upsert_document("journal_entries", &entry.id, entry)
    }

    pub fn load_notes(&self) -> Result<Vec<Note>, StorageError> {
        self.load_documents("notes")
    }

    pub fn upsert_note(&self, note: &Note) -> Result<(), StorageError> {
        self.upsert_document("notes", &note.id, note)
    }

    fn load_documents<T: serde::de::DeserializeOwned>(
        &self,
        table: &'static str,
    ) -> Result<Vec<T>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT id, data FROM {table} ORDER BY rowid"))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, data) = row?;
            let value = serde_json::from_str(&data)
                .map_err(|source| StorageError::CorruptRecord { table, id, source })?;
            out.push(value);
        }
        Ok(out)
    }

    fn upsert_document<T: serde::Serialize>(
        &self,
        table: &'static str,
        id: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let data = serde_json::to_string(value)
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        self.conn.execute(
            &format!("INSERT OR REPLACE INTO {table} (id, data) VALUES (?1, ?2)"),
            params![id, data],
        )?;
        Ok(())
    }

    fn delete_document(&self, table: &'static str, id: &str) -> Result<bool, StorageError> {
        let affected = self
            .conn
            .execute(&format!("DELETE FROM {table} WHERE id = ?1"), params![id])?;
        Ok(affected > 0)
    }

    // ── Timer sessions ───────────────────────────────────────────────

    pub fn load_sessions(&self) -> Result<Vec<TimerSession>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, item_id, started_at, ended_at, duration_seconds
             FROM sessions ORDER BY started_at",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<u64>>(4)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, item_id, started_at, ended_at, duration_seconds) = row?;
            let started_at = parse_timestamp(&id, &started_at)?;
            let ended_at = match ended_at {
                Some(raw) => Some(parse_timestamp(&id, &raw)?),
                None => None,
            };
            out.push(TimerSession {
                id,
                item_id,
                started_at,
                ended_at,
                duration_seconds,
            });
        }
        Ok(out)
    }

    pub fn upsert_session(&self, session: &TimerSession) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sessions
                 (id, item_id, started_at, ended_at, duration_seconds)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session.id,
                session.item_id,
                session.started_at.to_rfc3339(),
                session.ended_at.map(|t| t.to_rfc3339()),
                session.duration_seconds,
            ],
        )?;
        Ok(())
    }

    pub fn delete_session(&self, id: &str) -> Result<bool, StorageError> {
        let affected = self
            .conn
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

fn parse_timestamp(id: &str, value: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| StorageError::InvalidTimestamp {
            id: id.to_string(),
            value: value.to_string(),
        })
}
