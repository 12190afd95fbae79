//! Directory bookmarks: `bookmark` and `jump`

use crate::builtin::{Builtin, CommandOutput};
use crate::fs_ops::change_dir;
use crate::kv_file::KvStore;
use crate::state::ShellState;
use ghostsh_core::{ShellError, ShellResult};
use std::path::{Path, PathBuf};

/// Named directories, persisted as `name=path` lines
#[derive(Debug, Clone, Default)]
pub struct BookmarkStore {
    store: KvStore,
}

impl BookmarkStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn load_or_default(path: Option<&Path>) -> Self {
        let store = match path {
            Some(p) => KvStore::load(p).unwrap_or_else(|e| {
                ghostsh_core::gsh_log_warn!(error = %e, "failed to load bookmarks");
                KvStore::in_memory()
            }),
            None => KvStore::in_memory(),
        };
        Self { store }
    }

    pub fn names(&self) -> Vec<String> {
        self.store.names()
    }

    pub fn path(&self, name: &str) -> Option<PathBuf> {
        self.store.get(name).map(PathBuf::from)
    }

    pub fn entries(&self) -> &[(String, String)] {
        self.store.entries()
    }

    pub fn add(&mut self, name: &str, path: &Path) -> ShellResult<()> {
        self.store.set(name, &path.display().to_string());
        self.store.save()
    }

    pub fn remove(&mut self, name: &str) -> ShellResult<()> {
        self.store
            .remove(name)
            .ok_or_else(|| ShellError::not_found(format!("no such bookmark: {name}")))?;
        self.store.save()
    }
}

/// The `bookmark` builtin command implementation
pub struct BookmarkCommand;

impl Builtin for BookmarkCommand {
    fn name(&self) -> &'static str {
        "bookmark"
    }

    fn synopsis(&self) -> &'static str {
        "List, add or remove directory bookmarks"
    }

    fn usage(&self) -> &'static str {
        "bookmark [list | add <name> [path] | rm <name>]"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> ShellResult<CommandOutput> {
        match args.first().map(String::as_str) {
            None | Some("list") => {
                let width = state.bookmarks.entries().iter().map(|(k, _)| k.len()).max().unwrap_or(0);
                let lines = state
                    .bookmarks
                    .entries()
                    .iter()
                    .map(|(k, v)| format!("{k:<width$}  {v}"))
                    .collect();
                Ok(CommandOutput::Text(lines))
            }
            Some("add") => {
                let name = args
                    .get(1)
                    .ok_or_else(|| ShellError::usage(self.name(), "missing bookmark name", self.usage()))?;
                let path = match args.get(2) {
                    Some(p) => std::fs::canonicalize(p)?,
                    None => std::env::current_dir()?,
                };
                if !path.is_dir() {
                    return Err(ShellError::invalid_argument(format!("not a directory: {}", path.display())));
                }
                state.bookmarks.add(name, &path)?;
                Ok(CommandOutput::None)
            }
            Some("rm") | Some("remove") => {
                let name = args
                    .get(1)
                    .ok_or_else(|| ShellError::usage(self.name(), "missing bookmark name", self.usage()))?;
                state.bookmarks.remove(name)?;
                Ok(CommandOutput::None)
            }
            Some(other) => Err(ShellError::usage(
                self.name(),
                format!("unknown subcommand '{other}'"),
                self.usage(),
            )),
        }
    }
}

/// The `jump` builtin command implementation
pub struct JumpCommand;

impl Builtin for JumpCommand {
    fn name(&self) -> &'static str {
        "jump"
    }

    fn synopsis(&self) -> &'static str {
        "Change to a bookmarked directory"
    }

    fn usage(&self) -> &'static str {
        "jump <bookmark>"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> ShellResult<CommandOutput> {
        let name = args
            .first()
            .ok_or_else(|| ShellError::usage(self.name(), "missing bookmark name", self.usage()))?;
        let target = state
            .bookmarks
            .path(name)
            .ok_or_else(|| ShellError::not_found(format!("no such bookmark: {name}")))?;
        change_dir(state, &target)?;
        Ok(CommandOutput::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn add_list_remove() {
        let dir = TempDir::new().unwrap();
        let mut state = ShellState::ephemeral();
        let target = dir.path().display().to_string();
        BookmarkCommand
            .execute(&mut state, &["add".into(), "proj".into(), target])
            .unwrap();
        assert_eq!(state.bookmarks.names(), vec!["proj"]);

        let listed = BookmarkCommand.execute(&mut state, &[]).unwrap();
        match listed {
            CommandOutput::Text(lines) => assert!(lines[0].starts_with("proj  ")),
            other => panic!("unexpected output {other:?}"),
        }

        BookmarkCommand.execute(&mut state, &["rm".into(), "proj".into()]).unwrap();
        assert!(state.bookmarks.names().is_empty());
    }

    #[test]
    fn jump_to_unknown_bookmark_is_not_found() {
        let mut state = ShellState::ephemeral();
        let err = JumpCommand.execute(&mut state, &["nowhere".into()]).unwrap_err();
        assert_eq!(err.kind, ghostsh_core::ErrorKind::NotFound);
    }

    #[test]
    fn adding_a_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, "x").unwrap();
        let mut state = ShellState::ephemeral();
        let err = BookmarkCommand
            .execute(&mut state, &["add".into(), "f".into(), file.display().to_string()])
            .unwrap_err();
        assert_eq!(err.kind, ghostsh_core::ErrorKind::InvalidArgument);
    }
}
