//! Pipeline driver
//!
//! Turns a submitted line into `command [| filter ...]`, runs the command,
//! threads its table through the filter chain and writes the result. A
//! failing stage prints one diagnostic and nothing else; no partial table is
//! ever shown.

use crate::builtin::{BuiltinRegistry, CommandOutput};
use crate::state::ShellState;
use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::{cursor, terminal, QueueableCommand};
use ghostsh_core::{FilterRegistry, FilterStage, ShellError, ShellResult};
use std::io::{self, Write};

const HIGHLIGHT: Color = Color::Yellow;

/// Split on `|` outside double quotes. Empty stages are kept so the driver
/// can reject `ls ||`.
pub fn split_pipeline(line: &str) -> Vec<String> {
    let mut stages = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                current.push(c);
            }
            '|' if !quoted => stages.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    stages.push(current);
    stages.into_iter().map(|s| s.trim().to_string()).collect()
}

/// Whitespace split honouring double quotes; the quotes themselves are dropped.
pub fn split_args(stage: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut started = false;
    for c in stage.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                started = true;
            }
            c if c.is_whitespace() && !quoted => {
                if started {
                    words.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            _ => {
                current.push(c);
                started = true;
            }
        }
    }
    if started {
        words.push(current);
    }
    words
}

/// Builtins plus filters, wired together
#[derive(Default)]
pub struct Pipeline {
    builtins: BuiltinRegistry,
    filters: FilterRegistry,
}

impl Pipeline {
    pub fn new(builtins: BuiltinRegistry, filters: FilterRegistry) -> Self {
        Self { builtins, filters }
    }

    pub fn builtins(&self) -> &BuiltinRegistry {
        &self.builtins
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// Run one line and return what it produced. Errors carry either a
    /// `filter` or a `command` context entry naming the failing stage.
    pub fn run(&self, state: &mut ShellState, line: &str) -> ShellResult<CommandOutput> {
        let expanded = state.aliases.expand(line);
        let stages = split_pipeline(&expanded);
        let Some((head, rest)) = stages.split_first() else {
            return Ok(CommandOutput::None);
        };

        let words = split_args(head);
        let Some((name, args)) = words.split_first() else {
            if rest.is_empty() {
                return Ok(CommandOutput::None);
            }
            return Err(ShellError::invalid_argument("missing command before '|'"));
        };
        let builtin = self
            .builtins
            .find(name)
            .ok_or_else(|| ShellError::command_not_found(name).with_context("command", name.as_str()))?;
        let output = builtin
            .execute(state, args)
            .map_err(|e| e.with_context("command", builtin.name()))?;

        if rest.is_empty() {
            return Ok(output);
        }
        let CommandOutput::Table(table) = output else {
            return Err(ShellError::invalid_argument(format!(
                "'{}' does not produce a table; filters need ls, dir or ps",
                builtin.name()
            ))
            .with_context("command", builtin.name()));
        };

        let filter_stages = rest
            .iter()
            .map(|s| {
                let mut words = split_args(s);
                if words.is_empty() {
                    return Err(ShellError::invalid_argument("empty filter stage").with_context("filter", "|"));
                }
                let name = words.remove(0);
                Ok(FilterStage::new(name, words))
            })
            .collect::<ShellResult<Vec<_>>>()?;

        self.filters.run_chain(table, &filter_stages).map(CommandOutput::Table)
    }

    /// Run a line and write its output or diagnostic. Returns the error kind
    /// on failure so callers can pick an exit status.
    pub fn execute_line<W: Write, E: Write>(
        &self,
        state: &mut ShellState,
        line: &str,
        out: &mut W,
        err: &mut E,
    ) -> io::Result<Option<ghostsh_core::ErrorKind>> {
        match self.run(state, line) {
            Ok(output) => {
                write_output(&output, out)?;
                Ok(None)
            }
            Err(e) => {
                ghostsh_core::gsh_log_debug!(kind = ?e.kind, error = %e, "command failed");
                write_error(&e, err)?;
                Ok(Some(e.kind))
            }
        }
    }
}

/// Print command output. Tables get aligned columns, highlighted rows and a
/// row count.
pub fn write_output<W: Write>(output: &CommandOutput, out: &mut W) -> io::Result<()> {
    match output {
        CommandOutput::None => {}
        CommandOutput::Text(lines) => {
            for line in lines {
                writeln!(out, "{line}")?;
            }
        }
        CommandOutput::Table(table) => {
            for (line, highlighted) in table.render_lines() {
                if highlighted {
                    out.queue(SetForegroundColor(HIGHLIGHT))?;
                    write!(out, "{line}")?;
                    out.queue(ResetColor)?;
                    writeln!(out)?;
                } else {
                    writeln!(out, "{line}")?;
                }
            }
            let n = table.row_count();
            writeln!(out, "({n} row{})", if n == 1 { "" } else { "s" })?;
        }
        CommandOutput::ClearScreen => {
            out.queue(terminal::Clear(terminal::ClearType::All))?
                .queue(cursor::MoveTo(0, 0))?;
        }
    }
    out.flush()
}

/// `<stage>: <message>`, naming the filter or command that failed
pub fn write_error<E: Write>(error: &ShellError, err: &mut E) -> io::Result<()> {
    let stage = error
        .context
        .get("filter")
        .or_else(|| error.context.get("command"));
    match stage {
        Some(stage) => writeln!(err, "{stage}: {error}")?,
        None => writeln!(err, "ghostsh: {error}")?,
    }
    err.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghostsh_core::ErrorKind;

    #[test]
    fn pipes_inside_quotes_do_not_split() {
        assert_eq!(split_pipeline("ls | contains Name \"a|b\""), vec!["ls", "contains Name \"a|b\""]);
        assert_eq!(split_pipeline("ls||limit 1"), vec!["ls", "", "limit 1"]);
    }

    #[test]
    fn args_honour_quotes() {
        assert_eq!(split_args("contains Name \"my file\""), vec!["contains", "Name", "my file"]);
        assert_eq!(split_args("echo \"\""), vec!["echo", ""]);
        assert!(split_args("   ").is_empty());
    }

    #[test]
    fn filters_after_text_command_are_rejected() {
        let pipeline = Pipeline::default();
        let mut state = ShellState::ephemeral();
        let err = pipeline.run(&mut state, "echo hi | limit 1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert_eq!(err.context.get("command").map(String::as_str), Some("echo"));
    }

    #[test]
    fn unknown_command_is_reported_by_name() {
        let pipeline = Pipeline::default();
        let mut state = ShellState::ephemeral();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let kind = pipeline.execute_line(&mut state, "frobnicate", &mut out, &mut err).unwrap();
        assert_eq!(kind, Some(ErrorKind::CommandNotFound));
        assert!(out.is_empty());
        assert_eq!(String::from_utf8(err).unwrap(), "frobnicate: command not found: frobnicate\n");
    }

    #[test]
    fn aliases_expand_before_running() {
        let pipeline = Pipeline::default();
        let mut state = ShellState::ephemeral();
        state.aliases.set("say", "echo hello").unwrap();
        let out = pipeline.run(&mut state, "say world").unwrap();
        assert_eq!(out, CommandOutput::line("hello world"));
    }

    #[test]
    fn blank_line_does_nothing() {
        let pipeline = Pipeline::default();
        let mut state = ShellState::ephemeral();
        assert_eq!(pipeline.run(&mut state, "   ").unwrap(), CommandOutput::None);
        assert!(pipeline.run(&mut state, " | limit 1").is_err());
    }
}
