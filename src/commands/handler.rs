//! Prefix command routing and the `remind` command.
//!
//! The platform glue hands this layer plain strings and gets reply text
//! back; nothing here knows about the chat client.

use std::sync::Arc;

use log::info;

use crate::database::Reminder;
use crate::features::reminders::{ReminderStore, TimeParser};

/// A prefixed command recognized in an inbound message.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Ping,
    Info,
    Remind { raw_args: &'a str },
    Unknown(&'a str),
}

/// Routes prefixed text commands and executes the reminder command.
pub struct CommandHandler {
    prefix: String,
    store: ReminderStore,
    parser: Arc<dyn TimeParser>,
}

impl CommandHandler {
    pub fn new(prefix: impl Into<String>, store: ReminderStore, parser: Arc<dyn TimeParser>) -> Self {
        CommandHandler {
            prefix: prefix.into(),
            store,
            parser,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Match `content` against the command prefix.
    ///
    /// Returns `None` for ordinary chatter: no prefix, or nothing after it.
    pub fn route<'a>(&self, content: &'a str) -> Option<Command<'a>> {
        let body = content.trim().strip_prefix(self.prefix.as_str())?;
        if body.is_empty() {
            return None;
        }

        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim_start()),
            None => (body, ""),
        };

        Some(match name {
            "ping" => Command::Ping,
            "info" => Command::Info,
            "remind" => Command::Remind { raw_args: rest },
            _ => Command::Unknown(body),
        })
    }

    /// Create a reminder from `raw_args` (`<time> <message>`), keyed by the
    /// originating message id. Returns the reply text for the channel.
    pub async fn remind(
        &self,
        author_id: &str,
        channel_id: &str,
        message_id: &str,
        raw_args: &str,
    ) -> String {
        // First whitespace run splits the time expression from the message.
        let (time_str, message) = match raw_args.trim().split_once(char::is_whitespace) {
            Some((time_str, rest)) if !rest.trim().is_empty() => (time_str, rest.trim_start()),
            _ => return format!("Usage: `{}remind <time> <message>`", self.prefix),
        };

        let due_at = match self.parser.parse(time_str) {
            Ok(due_at) => due_at,
            Err(e) => return format!("Could not parse that time ({e}). Please use a valid time format."),
        };

        let reminder = Reminder {
            id: message_id.to_string(),
            author_id: author_id.to_string(),
            channel_id: channel_id.to_string(),
            due_at,
            message: message.to_string(),
        };
        self.store.insert(&reminder).await;
        info!("queued reminder {message_id} for {author_id} (due at {due_at})");

        format!("Reminding you about: {message} in {time_str}")
    }
}
