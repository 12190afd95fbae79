//! Completion sources backed by the live shell state

use crate::editor::HistorySource;
use crate::suggest::CompletionSources;
use ghostsh_builtins::{BuiltinRegistry, ShellState};

/// Read-only view of the shell used while a line is being edited
pub struct ShellSources<'a> {
    state: &'a ShellState,
    builtins: &'a BuiltinRegistry,
}

impl<'a> ShellSources<'a> {
    pub fn new(state: &'a ShellState, builtins: &'a BuiltinRegistry) -> Self {
        Self { state, builtins }
    }
}

impl CompletionSources for ShellSources<'_> {
    fn builtin_names(&self) -> Vec<String> {
        self.builtins.names().into_iter().map(str::to_string).collect()
    }

    fn alias_names(&self) -> Vec<String> {
        self.state.aliases.names()
    }

    fn bookmark_names(&self) -> Vec<String> {
        self.state.bookmarks.names()
    }

    fn frequency_suggestions(&self, prefix: &str, min_substring: usize) -> Vec<String> {
        self.state.history.frequency_suggestions(prefix, min_substring)
    }
}

impl HistorySource for ShellSources<'_> {
    fn history_count(&self) -> usize {
        self.state.history.history_count()
    }

    fn history_entry(&self, index: usize) -> Option<String> {
        self.state.history.history_entry(index).map(|e| e.command.clone())
    }
}
