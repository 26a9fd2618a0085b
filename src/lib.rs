// Core layer - shared configuration
pub mod core;

// Features layer - all feature modules
pub mod features;

// Infrastructure
pub mod database;
pub mod write_queue;

// Application layer
pub mod commands;

// Re-export core config for convenience
pub use crate::core::Config;

// Re-export feature items
pub use commands::{Command, CommandHandler};
pub use database::{Database, Reminder};
pub use features::{
    // Analytics
    MemoryStats,
    // Reminders
    HeuristicTimeParser, Notifier, ReminderScheduler, ReminderStore, TimeParseError, TimeParser,
};
pub use write_queue::{WriteOperation, WriteQueue, WriteWorker};
