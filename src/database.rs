//! SQLite persistence for pending reminders.
//!
//! One file-backed connection shared by the whole process. Reads happen on
//! the caller's task; every mutation arrives here as a [`WriteOperation`]
//! executed by the single write worker (see [`crate::write_queue`]).

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Context as _, Result};
use log::debug;
use sqlite::{Connection, State};

use crate::write_queue::WriteOperation;

/// One pending reminder row.
///
/// `id` is supplied by the caller (the originating message id) and uniquely
/// identifies at most one live reminder. `due_at` is an absolute epoch-second
/// instant, never a duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub id: String,
    pub author_id: String,
    pub channel_id: String,
    pub due_at: i64,
    pub message: String,
}

/// Shared handle to the embedded database.
///
/// Cloning is cheap; all clones share one connection behind a mutex. Callers
/// never mutate through this handle directly — that is the write worker's job.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file and make sure the schema exists.
    ///
    /// Failure here is fatal for the process: nothing can serve commands
    /// without a working store.
    pub fn open(path: &str) -> Result<Self> {
        let conn = sqlite::open(path).with_context(|| format!("failed to open database at {path}"))?;
        let database = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        database.ensure_schema()?;
        Ok(database)
    }

    /// Create the reminders table when absent.
    ///
    /// Probes `sqlite_master` first so the create statement only runs against
    /// a fresh database; safe to call on every startup.
    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        let mut probe = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'reminders'",
        )?;
        if matches!(probe.next()?, State::Row) {
            return Ok(());
        }
        drop(probe);

        conn.execute(
            "CREATE TABLE reminders (id TEXT PRIMARY KEY, author_id TEXT, channel_id TEXT, due_at INTEGER, message TEXT)",
        )?;
        debug!("created reminders table");
        Ok(())
    }

    /// All reminders due at or before `now`, in no particular order.
    pub fn query_due(&self, now: i64) -> Result<Vec<Reminder>> {
        let conn = self.conn()?;
        let mut statement = conn.prepare(
            "SELECT id, author_id, channel_id, due_at, message FROM reminders WHERE due_at <= ?",
        )?;
        statement.bind((1, now))?;

        let mut due = Vec::new();
        while matches!(statement.next()?, State::Row) {
            due.push(Reminder {
                id: statement.read::<String, _>("id")?,
                author_id: statement.read::<String, _>("author_id")?,
                channel_id: statement.read::<String, _>("channel_id")?,
                due_at: statement.read::<i64, _>("due_at")?,
                message: statement.read::<String, _>("message")?,
            });
        }
        Ok(due)
    }

    /// Execute one queued mutation. Called from the write worker only.
    pub(crate) fn execute(&self, operation: &WriteOperation) -> Result<()> {
        let conn = self.conn()?;
        let mut statement = conn.prepare(operation.statement())?;
        statement.bind_iter(
            operation
                .args()
                .iter()
                .cloned()
                .enumerate()
                .map(|(index, value)| (index + 1, value)),
        )?;
        while !matches!(statement.next()?, State::Done) {}
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database mutex poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_schema_is_idempotent() {
        let database = Database::open(":memory:").expect("in-memory database");
        // open() already ran it once; running again must not error.
        database.ensure_schema().expect("second ensure_schema");
        database.ensure_schema().expect("third ensure_schema");
    }

    #[test]
    fn query_due_on_empty_table_is_empty() {
        let database = Database::open(":memory:").expect("in-memory database");
        assert!(database.query_due(i64::MAX).expect("query").is_empty());
    }
}
