//! Small shell-level builtins: echo, clear, exit, help

use crate::builtin::{Builtin, CommandOutput};
use crate::state::ShellState;
use ghostsh_core::{FilterRegistry, ShellResult};

pub struct EchoCommand;

impl Builtin for EchoCommand {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn synopsis(&self) -> &'static str {
        "Print arguments"
    }

    fn usage(&self) -> &'static str {
        "echo [text]..."
    }

    fn execute(&self, _state: &mut ShellState, args: &[String]) -> ShellResult<CommandOutput> {
        Ok(CommandOutput::line(args.join(" ")))
    }
}

pub struct ClearCommand;

impl Builtin for ClearCommand {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn synopsis(&self) -> &'static str {
        "Clear the screen"
    }

    fn usage(&self) -> &'static str {
        "clear"
    }

    fn execute(&self, _state: &mut ShellState, _args: &[String]) -> ShellResult<CommandOutput> {
        Ok(CommandOutput::ClearScreen)
    }
}

pub struct ExitCommand;

impl Builtin for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn synopsis(&self) -> &'static str {
        "Leave the shell"
    }

    fn usage(&self) -> &'static str {
        "exit"
    }

    fn execute(&self, state: &mut ShellState, _args: &[String]) -> ShellResult<CommandOutput> {
        state.exit_requested = true;
        Ok(CommandOutput::None)
    }
}

/// `help`: builtins with their synopsis, then the filter usage lines
pub struct HelpCommand {
    topics: Vec<(&'static str, &'static str)>,
}

impl HelpCommand {
    pub const SYNOPSIS: &'static str = "Show this help";

    pub fn new(topics: Vec<(&'static str, &'static str)>) -> Self {
        Self { topics }
    }
}

impl Builtin for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn synopsis(&self) -> &'static str {
        Self::SYNOPSIS
    }

    fn usage(&self) -> &'static str {
        "help"
    }

    fn execute(&self, _state: &mut ShellState, _args: &[String]) -> ShellResult<CommandOutput> {
        let width = self.topics.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
        let mut lines = vec!["Commands:".to_string()];
        lines.extend(
            self.topics
                .iter()
                .map(|(name, synopsis)| format!("  {name:<width$}  {synopsis}")),
        );

        let filters = FilterRegistry::standard();
        lines.push(String::new());
        lines.push("Filters (after `ls`, `dir` or `ps`, separated by |):".to_string());
        lines.extend(
            filters
                .names()
                .into_iter()
                .filter_map(|n| filters.find(n))
                .map(|f| format!("  {}", f.usage())),
        );
        Ok(CommandOutput::Text(lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_commands_and_filters() {
        let help = HelpCommand::new(vec![("ls", "List"), ("help", HelpCommand::SYNOPSIS)]);
        let CommandOutput::Text(lines) = help.execute(&mut ShellState::ephemeral(), &[]).unwrap() else {
            panic!("expected text");
        };
        assert!(lines.iter().any(|l| l.trim_start().starts_with("ls    List")));
        assert!(lines.iter().any(|l| l.contains("sort-by <field> [asc|desc]")));
    }

    #[test]
    fn exit_sets_flag() {
        let mut state = ShellState::ephemeral();
        ExitCommand.execute(&mut state, &[]).unwrap();
        assert!(state.exit_requested);
    }
}
