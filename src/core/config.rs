//! Environment-driven configuration.

use std::env;

use anyhow::{Context as _, Result};

/// Runtime configuration, loaded once at startup.
///
/// Everything except the Discord token has a default, so a bare
/// `DISCORD_TOKEN=... bot` is a working invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub command_prefix: String,
    pub database_path: String,
    pub log_level: String,
    /// Seconds between dispatch polls of the reminder table.
    pub poll_interval_secs: u64,
    /// Bound on the database write queue; submitters wait when it is full.
    pub write_queue_capacity: usize,
}

impl Config {
    /// Read configuration from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN").context("DISCORD_TOKEN must be set")?,
            command_prefix: env::var("COMMAND_PREFIX").unwrap_or_else(|_| "n/".to_string()),
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./nudge.db".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            poll_interval_secs: parse_env("REMINDER_POLL_INTERVAL_SECS", 1)?,
            write_queue_capacity: parse_env("WRITE_QUEUE_CAPACITY", 100)?,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .ok()
            .with_context(|| format!("{name} must be a positive integer")),
        Err(_) => Ok(default),
    }
}
