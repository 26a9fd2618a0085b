//! # Analytics Feature
//!
//! System diagnostics backing the `info` command.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false

pub mod system_info;

pub use system_info::{format_bytes, MemoryStats};
