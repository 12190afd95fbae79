//! `alias` / `unalias` builtins and the alias store

use crate::builtin::{Builtin, CommandOutput};
use crate::kv_file::KvStore;
use crate::state::ShellState;
use ghostsh_core::{ShellError, ShellResult};
use std::path::Path;

/// Command aliases, persisted as `name=command` lines
#[derive(Debug, Clone, Default)]
pub struct AliasStore {
    store: KvStore,
}

impl AliasStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn load_or_default(path: Option<&Path>) -> Self {
        let store = match path {
            Some(p) => KvStore::load(p).unwrap_or_else(|e| {
                ghostsh_core::gsh_log_warn!(error = %e, "failed to load aliases");
                KvStore::in_memory()
            }),
            None => KvStore::in_memory(),
        };
        Self { store }
    }

    pub fn names(&self) -> Vec<String> {
        self.store.names()
    }

    pub fn find_alias(&self, name: &str) -> Option<&str> {
        self.store.get(name)
    }

    pub fn set(&mut self, name: &str, command: &str) -> ShellResult<()> {
        self.store.set(name, command);
        self.store.save()
    }

    pub fn remove(&mut self, name: &str) -> ShellResult<()> {
        self.store
            .remove(name)
            .ok_or_else(|| ShellError::not_found(format!("no such alias: {name}")))?;
        self.store.save()
    }

    pub fn entries(&self) -> &[(String, String)] {
        self.store.entries()
    }

    /// Replace the first word of `line` with its alias, one level deep.
    pub fn expand(&self, line: &str) -> String {
        let trimmed = line.trim_start();
        let end = trimmed
            .find(|c: char| c.is_whitespace() || c == '|')
            .unwrap_or(trimmed.len());
        let (word, rest) = trimmed.split_at(end);
        match self.find_alias(word) {
            Some(replacement) if !word.is_empty() => format!("{replacement}{rest}"),
            _ => line.to_string(),
        }
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// The `alias` builtin command implementation
pub struct AliasCommand;

impl Builtin for AliasCommand {
    fn name(&self) -> &'static str {
        "alias"
    }

    fn synopsis(&self) -> &'static str {
        "Define or list command aliases"
    }

    fn usage(&self) -> &'static str {
        "alias [name=command]"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> ShellResult<CommandOutput> {
        if args.is_empty() {
            let lines = state
                .aliases
                .entries()
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            return Ok(CommandOutput::Text(lines));
        }

        // `alias ll=ls | sort-by Name` arrives split on whitespace
        let joined = args.join(" ");
        match joined.split_once('=') {
            Some((name, command)) => {
                let name = name.trim();
                if !valid_name(name) {
                    return Err(ShellError::usage(self.name(), format!("invalid alias name '{name}'"), self.usage()));
                }
                state.aliases.set(name, command.trim())?;
                Ok(CommandOutput::None)
            }
            None => match state.aliases.find_alias(&joined) {
                Some(command) => Ok(CommandOutput::line(format!("{joined}={command}"))),
                None => Err(ShellError::not_found(format!("no such alias: {joined}"))),
            },
        }
    }
}

/// The `unalias` builtin command implementation
pub struct UnaliasCommand;

impl Builtin for UnaliasCommand {
    fn name(&self) -> &'static str {
        "unalias"
    }

    fn synopsis(&self) -> &'static str {
        "Remove command aliases"
    }

    fn usage(&self) -> &'static str {
        "unalias name..."
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> ShellResult<CommandOutput> {
        if args.is_empty() {
            return Err(ShellError::usage(self.name(), "missing alias name", self.usage()));
        }
        for name in args {
            state.aliases.remove(name)?;
        }
        Ok(CommandOutput::None)
    }
}
