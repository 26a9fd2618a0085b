//! # Feature: System Information
//!
//! Process and host memory statistics for the `info` command.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false

use sysinfo::{get_current_pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Snapshot of process and system memory usage.
pub struct MemoryStats {
    pub process_memory: u64,
    pub system_used: u64,
    pub system_total: u64,
}

impl MemoryStats {
    /// Gather a fresh snapshot.
    pub fn gather() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();

        let process_memory = match get_current_pid() {
            Ok(pid) => {
                sys.refresh_processes_specifics(
                    ProcessesToUpdate::Some(&[pid]),
                    true,
                    ProcessRefreshKind::new().with_memory(),
                );
                sys.process(pid).map(|p| p.memory()).unwrap_or(0)
            }
            Err(_) => 0,
        };

        MemoryStats {
            process_memory,
            system_used: sys.used_memory(),
            system_total: sys.total_memory(),
        }
    }

    /// Format as a Discord-ready code block.
    pub fn format(&self) -> String {
        format!(
            "```\nProcess Memory: {}\nSystem Memory:  {} / {}\nRust:           {}\n```",
            format_bytes(self.process_memory),
            format_bytes(self.system_used),
            format_bytes(self.system_total),
            rustc_version_runtime::version(),
        )
    }
}

/// Render a byte count with a binary-unit suffix.
pub fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    const GIB: u64 = 1024 * MIB;

    if bytes >= GIB {
        format!("{:.1} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_picks_sensible_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MiB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.0 GiB");
    }

    #[test]
    fn report_is_a_code_block_with_all_fields() {
        let report = MemoryStats {
            process_memory: 10 * 1024 * 1024,
            system_used: 1024 * 1024 * 1024,
            system_total: 2 * 1024 * 1024 * 1024,
        }
        .format();

        assert!(report.starts_with("```\n"));
        assert!(report.ends_with("```"));
        assert!(report.contains("Process Memory: 10.0 MiB"));
        assert!(report.contains("System Memory:  1.0 GiB / 2.0 GiB"));
    }
}
