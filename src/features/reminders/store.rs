//! Durable reminder table access.
//!
//! Reads go straight to the database; every mutation is built here as a
//! [`WriteOperation`] and handed to the write queue, so `insert` and `delete`
//! return before the row is actually on disk (eventual durability).

use anyhow::Result;
use log::debug;
use sqlite::Value;

use crate::database::{Database, Reminder};
use crate::write_queue::{WriteOperation, WriteQueue};

/// Read/write access to pending reminders.
#[derive(Clone)]
pub struct ReminderStore {
    database: Database,
    writes: WriteQueue,
}

impl ReminderStore {
    pub fn new(database: Database, writes: WriteQueue) -> Self {
        ReminderStore { database, writes }
    }

    /// Queue insertion of `reminder`.
    ///
    /// An existing row with the same id is silently overwritten, so
    /// resubmitting a message replaces its pending reminder.
    pub async fn insert(&self, reminder: &Reminder) {
        self.writes
            .submit(WriteOperation::new(
                "INSERT OR REPLACE INTO reminders (id, author_id, channel_id, due_at, message) \
                 VALUES (?, ?, ?, ?, ?)",
                vec![
                    Value::String(reminder.id.clone()),
                    Value::String(reminder.author_id.clone()),
                    Value::String(reminder.channel_id.clone()),
                    Value::Integer(reminder.due_at),
                    Value::String(reminder.message.clone()),
                ],
            ))
            .await;
    }

    /// Queue deletion of the reminder with the given id.
    pub async fn delete(&self, id: &str) {
        self.writes
            .submit(WriteOperation::new(
                "DELETE FROM reminders WHERE id = ?",
                vec![Value::String(id.to_string())],
            ))
            .await;
    }

    /// Queue deletion of every reminder already overdue at `now`.
    ///
    /// Run at startup: reminders that came due while the process was down are
    /// dropped without notification instead of all firing at once.
    pub async fn purge_stale(&self, now: i64) {
        debug!("queued purge of reminders due before {now}");
        self.writes
            .submit(WriteOperation::new(
                "DELETE FROM reminders WHERE due_at < ?",
                vec![Value::Integer(now)],
            ))
            .await;
    }

    /// All reminders due at or before `now`. Reads bypass the write queue.
    pub fn query_due(&self, now: i64) -> Result<Vec<Reminder>> {
        self.database.query_due(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reminder(id: &str, due_at: i64) -> Reminder {
        Reminder {
            id: id.to_string(),
            author_id: "author-1".to_string(),
            channel_id: "channel-1".to_string(),
            due_at,
            message: "water the plants".to_string(),
        }
    }

    fn store() -> (ReminderStore, WriteQueue) {
        let database = Database::open(":memory:").expect("in-memory database");
        let (queue, worker) = WriteQueue::new(database.clone(), 16);
        tokio::spawn(worker.run());
        (ReminderStore::new(database, queue.clone()), queue)
    }

    #[tokio::test]
    async fn insert_makes_the_reminder_due_at_its_instant() {
        let (store, queue) = store();
        store.insert(&reminder("m1", 100)).await;
        queue.flush().await;

        assert_eq!(store.query_due(100).unwrap(), vec![reminder("m1", 100)]);
        assert!(store.query_due(99).unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_after_insert_removes_the_row_for_good() {
        let (store, queue) = store();
        store.insert(&reminder("m1", 100)).await;
        store.delete("m1").await;
        queue.flush().await;

        assert!(store.query_due(i64::MAX).unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_insert_overwrites_the_existing_row() {
        let (store, queue) = store();
        store.insert(&reminder("m1", 100)).await;
        let mut replacement = reminder("m1", 200);
        replacement.message = "walk the dog".to_string();
        store.insert(&replacement).await;
        queue.flush().await;

        let due = store.query_due(i64::MAX).unwrap();
        assert_eq!(due, vec![replacement]);
    }

    #[tokio::test]
    async fn purge_stale_drops_only_overdue_rows() {
        let (store, queue) = store();
        store.insert(&reminder("old", 50)).await;
        store.insert(&reminder("upcoming", 500)).await;
        store.purge_stale(100).await;
        queue.flush().await;

        let remaining = store.query_due(i64::MAX).unwrap();
        assert_eq!(remaining, vec![reminder("upcoming", 500)]);
    }
}
