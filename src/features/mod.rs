//! Feature modules.

pub mod analytics;
pub mod reminders;

pub use analytics::MemoryStats;
pub use reminders::{
    HeuristicTimeParser, Notifier, ReminderScheduler, ReminderStore, TimeParseError, TimeParser,
};
