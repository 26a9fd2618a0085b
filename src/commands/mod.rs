//! Application layer - prefix command routing.

pub mod handler;

pub use handler::{Command, CommandHandler};
