//! `history` builtin - show recorded commands

use crate::builtin::{Builtin, CommandOutput};
use crate::state::ShellState;
use chrono::{Local, TimeZone};
use ghostsh_core::{ShellError, ShellResult};

/// The `history` builtin command implementation
pub struct HistoryCommand;

impl Builtin for HistoryCommand {
    fn name(&self) -> &'static str {
        "history"
    }

    fn synopsis(&self) -> &'static str {
        "Show command history"
    }

    fn usage(&self) -> &'static str {
        "history [N]"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> ShellResult<CommandOutput> {
        let total = state.history.history_count();
        let shown = match args.first() {
            Some(n) => n
                .parse::<usize>()
                .map_err(|_| ShellError::usage(self.name(), format!("'{n}' is not a count"), self.usage()))?,
            None => total,
        };

        let start = total.saturating_sub(shown);
        let width = total.to_string().len();
        let lines = state.history.entries()[start..]
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let when = match Local.timestamp_opt(entry.timestamp, 0).single() {
                    Some(t) if entry.timestamp > 0 => t.format("%Y-%m-%d %H:%M").to_string(),
                    _ => "-".repeat(16),
                };
                format!("{:>width$}  {when}  {}", start + i + 1, entry.command)
            })
            .collect();
        Ok(CommandOutput::Text(lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shows_last_n_with_absolute_numbers() {
        let mut state = ShellState::ephemeral();
        for cmd in ["ls", "ps", "pwd"] {
            state.history.record(cmd);
        }
        let out = HistoryCommand.execute(&mut state, &["2".into()]).unwrap();
        let CommandOutput::Text(lines) = out else {
            panic!("expected text");
        };
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("2  "));
        assert!(lines[1].ends_with("  pwd"));
    }

    #[test]
    fn rejects_non_numeric_count() {
        let mut state = ShellState::ephemeral();
        assert!(HistoryCommand.execute(&mut state, &["lots".into()]).is_err());
    }
}
