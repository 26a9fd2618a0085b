//! Timer-driven reminder delivery.
//!
//! A single polling loop owns dispatch for the process lifetime: each tick it
//! reads everything due, hands each reminder to the [`Notifier`], and queues
//! its deletion. Delivery and deletion are not transactional — a crash
//! between the two redelivers on the next start, which keeps the protocol
//! at-least-once without needing a durable "notified" marker.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::{error, info};

use crate::database::Reminder;
use crate::features::reminders::store::ReminderStore;

/// Delivers a formatted message to a destination channel.
///
/// Best-effort: the scheduler never observes delivery failures.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, channel_id: &str, text: &str);
}

/// Polls the store and delivers due reminders.
pub struct ReminderScheduler {
    store: ReminderStore,
    poll_interval: Duration,
}

impl ReminderScheduler {
    pub fn new(store: ReminderStore, poll_interval: Duration) -> Self {
        ReminderScheduler {
            store,
            poll_interval,
        }
    }

    /// Run until the process exits. There is no shutdown drain: deletions
    /// still queued when the process dies are lost.
    pub async fn run(self, notifier: Arc<dyn Notifier>) {
        let mut interval = tokio::time::interval(self.poll_interval);
        info!(
            "reminder scheduler started (poll interval: {:?})",
            self.poll_interval
        );
        loop {
            interval.tick().await;
            self.tick(notifier.as_ref()).await;
        }
    }

    /// One polling pass.
    async fn tick(&self, notifier: &dyn Notifier) {
        let now = Utc::now().timestamp();
        let due = match self.store.query_due(now) {
            Ok(due) => due,
            Err(e) => {
                // Skip the whole tick; the next one issues a fresh query.
                error!("error querying db: {e}");
                return;
            }
        };

        for reminder in due {
            notifier
                .send(&reminder.channel_id, &format_notification(&reminder))
                .await;
            self.store.delete(&reminder.id).await;
        }
    }
}

/// Mentions the author and renders the due time as a relative timestamp.
pub fn format_notification(reminder: &Reminder) -> String {
    format!(
        "<@{}>, <t:{}:R>: {}",
        reminder.author_id, reminder.due_at, reminder.message
    )
}

#[cfg(test)]
mod tests {
    use tokio::sync::Mutex;

    use crate::database::Database;
    use crate::write_queue::{WriteOperation, WriteQueue};

    use super::*;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, channel_id: &str, text: &str) {
            self.sent
                .lock()
                .await
                .push((channel_id.to_string(), text.to_string()));
        }
    }

    fn fixture() -> (Database, ReminderStore, WriteQueue, ReminderScheduler) {
        let database = Database::open(":memory:").expect("in-memory database");
        let (queue, worker) = WriteQueue::new(database.clone(), 16);
        tokio::spawn(worker.run());
        let store = ReminderStore::new(database.clone(), queue.clone());
        let scheduler = ReminderScheduler::new(store.clone(), Duration::from_secs(1));
        (database, store, queue, scheduler)
    }

    #[tokio::test]
    async fn due_reminder_is_delivered_exactly_once_and_deleted() {
        let (_database, store, queue, scheduler) = fixture();
        let due_at = Utc::now().timestamp() - 1;
        store
            .insert(&Reminder {
                id: "m1".to_string(),
                author_id: "42".to_string(),
                channel_id: "77".to_string(),
                due_at,
                message: "stretch your legs".to_string(),
            })
            .await;
        queue.flush().await;

        let notifier = RecordingNotifier::default();
        scheduler.tick(&notifier).await;
        queue.flush().await;
        // A second tick must find nothing: the deletion has executed.
        scheduler.tick(&notifier).await;
        queue.flush().await;

        let sent = notifier.sent.lock().await;
        assert_eq!(sent.len(), 1);
        let (channel, text) = &sent[0];
        assert_eq!(channel, "77");
        assert!(text.contains("<@42>"));
        assert!(text.contains(&format!("<t:{due_at}:R>")));
        assert!(text.contains("stretch your legs"));
        drop(sent);

        assert!(store.query_due(i64::MAX).unwrap().is_empty());
    }

    #[tokio::test]
    async fn future_reminder_is_left_alone() {
        let (_database, store, queue, scheduler) = fixture();
        store
            .insert(&Reminder {
                id: "m2".to_string(),
                author_id: "42".to_string(),
                channel_id: "77".to_string(),
                due_at: Utc::now().timestamp() + 3600,
                message: "not yet".to_string(),
            })
            .await;
        queue.flush().await;

        let notifier = RecordingNotifier::default();
        scheduler.tick(&notifier).await;

        assert!(notifier.sent.lock().await.is_empty());
        assert_eq!(store.query_due(i64::MAX).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn query_error_skips_the_tick() {
        let (database, _store, _queue, scheduler) = fixture();
        database
            .execute(&WriteOperation::new("DROP TABLE reminders", vec![]))
            .expect("drop table");

        // The loop must survive a read error and simply deliver nothing.
        let notifier = RecordingNotifier::default();
        scheduler.tick(&notifier).await;

        assert!(notifier.sent.lock().await.is_empty());
    }

    #[test]
    fn notification_mentions_author_and_embeds_due_time() {
        let text = format_notification(&Reminder {
            id: "m1".to_string(),
            author_id: "9".to_string(),
            channel_id: "7".to_string(),
            due_at: 1234,
            message: "check the oven".to_string(),
        });
        assert_eq!(text, "<@9>, <t:1234:R>: check the oven");
    }
}
