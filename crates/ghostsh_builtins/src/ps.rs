//! `ps` builtin - process table

use crate::builtin::{Builtin, CommandOutput};
use crate::state::ShellState;
use ghostsh_core::{ShellResult, Table};

/// Column order is mirrored by the completion grammar; keep both in sync.
pub const PS_HEADERS: [&str; 4] = ["PID", "Name", "Memory", "Threads"];

/// Snapshot of running processes, sorted by PID. Rows owned by the
/// current user are highlighted.
#[cfg(feature = "system-info")]
pub fn process_table() -> ShellResult<Table> {
    use ghostsh_core::{format_size, DataValue};
    use sysinfo::{PidExt, ProcessExt, System, SystemExt};

    let mut sys = System::new();
    sys.refresh_processes();

    let me = sysinfo::get_current_pid()
        .ok()
        .and_then(|pid| sys.process(pid))
        .and_then(|p| p.user_id().cloned());

    let mut procs: Vec<_> = sys.processes().iter().collect();
    procs.sort_by_key(|(pid, _)| pid.as_u32());

    let mut table = Table::new(&PS_HEADERS)?;
    for (pid, proc_) in procs {
        let owned = me.is_some() && proc_.user_id() == me.as_ref();
        let pid = pid.as_u32();
        table.add_row(vec![
            DataValue::int(i64::from(pid)).highlight(owned),
            DataValue::string(proc_.name()).highlight(owned),
            DataValue::size(format_size(proc_.memory())).highlight(owned),
            DataValue::int(thread_count(pid)).highlight(owned),
        ])?;
    }
    ghostsh_core::gsh_log_debug!(rows = table.row_count(), "process snapshot");
    Ok(table)
}

#[cfg(not(feature = "system-info"))]
pub fn process_table() -> ShellResult<Table> {
    Err(ghostsh_core::ShellError::new(
        ghostsh_core::ErrorKind::CommandNotFound,
        "ps: built without the system-info feature",
    ))
}

/// Threads per process; 1 where the platform does not expose it.
#[cfg(all(target_os = "linux", feature = "system-info"))]
fn thread_count(pid: u32) -> i64 {
    std::fs::read_to_string(format!("/proc/{pid}/status"))
        .ok()
        .and_then(|status| parse_threads_line(&status))
        .unwrap_or(1)
}

#[cfg(all(not(target_os = "linux"), feature = "system-info"))]
fn thread_count(_pid: u32) -> i64 {
    1
}

#[cfg_attr(not(all(target_os = "linux", feature = "system-info")), allow(dead_code))]
fn parse_threads_line(status: &str) -> Option<i64> {
    status
        .lines()
        .find_map(|l| l.strip_prefix("Threads:"))
        .and_then(|v| v.trim().parse().ok())
}

/// The `ps` builtin command implementation
pub struct PsCommand;

impl Builtin for PsCommand {
    fn name(&self) -> &'static str {
        "ps"
    }

    fn synopsis(&self) -> &'static str {
        "List processes as a table (PID, Name, Memory, Threads)"
    }

    fn usage(&self) -> &'static str {
        "ps"
    }

    fn execute(&self, _state: &mut ShellState, _args: &[String]) -> ShellResult<CommandOutput> {
        process_table().map(CommandOutput::Table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threads_line_parsing() {
        assert_eq!(parse_threads_line("Name:\tbash\nThreads:\t7\n"), Some(7));
        assert_eq!(parse_threads_line("Name:\tbash\n"), None);
    }

    #[cfg(feature = "system-info")]
    #[test]
    fn snapshot_contains_this_process() {
        let table = process_table().unwrap();
        assert_eq!(table.headers(), PS_HEADERS);
        let me = i64::from(std::process::id());
        let row = table
            .rows()
            .iter()
            .find(|r| r[0].value == ghostsh_core::Value::Int(me))
            .expect("current process listed");
        assert!(row[3].is_numeric());
    }
}
