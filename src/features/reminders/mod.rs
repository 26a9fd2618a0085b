//! # Reminders Feature
//!
//! Scheduled reminder system: free-text time parsing, durable storage, and
//! timer-driven delivery.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true

pub mod parser;
pub mod scheduler;
pub mod store;

pub use parser::{HeuristicTimeParser, TimeParseError, TimeParser};
pub use scheduler::{format_notification, Notifier, ReminderScheduler};
pub use store::ReminderStore;
