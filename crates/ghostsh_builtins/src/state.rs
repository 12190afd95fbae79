//! Mutable shell state shared by builtins

use crate::alias::AliasStore;
use crate::bookmark::BookmarkStore;
use ghostsh_core::{HistoryPaths, HistoryStore};
use std::path::PathBuf;

/// Locations of every persisted store
#[derive(Debug, Clone, Default)]
pub struct StorePaths {
    pub history: HistoryPaths,
    pub alias_file: Option<PathBuf>,
    pub bookmark_file: Option<PathBuf>,
    pub max_history: Option<usize>,
}

impl StorePaths {
    /// `<data_dir>/ghostsh/*`
    pub fn default_location() -> Self {
        let base = dirs::data_dir().map(|d| d.join("ghostsh"));
        Self {
            history: HistoryPaths::default_location(),
            alias_file: base.as_ref().map(|b| b.join("aliases")),
            bookmark_file: base.map(|b| b.join("bookmarks")),
            max_history: None,
        }
    }
}

/// Everything a builtin may read or change between prompts
#[derive(Debug, Default)]
pub struct ShellState {
    pub aliases: AliasStore,
    pub bookmarks: BookmarkStore,
    pub history: HistoryStore,
    /// Directory before the last successful `cd`, for `cd -`
    pub previous_dir: Option<PathBuf>,
    pub exit_requested: bool,
}

impl ShellState {
    /// Purely in-memory state, for tests and `--no-history`
    pub fn ephemeral() -> Self {
        Self::default()
    }

    /// Load every store; unreadable alias/bookmark files start empty.
    pub fn load(paths: &StorePaths) -> Self {
        let mut history = HistoryStore::load(paths.history.clone());
        if let Some(max) = paths.max_history {
            history = history.with_max_entries(max);
        }
        Self {
            aliases: AliasStore::load_or_default(paths.alias_file.as_deref()),
            bookmarks: BookmarkStore::load_or_default(paths.bookmark_file.as_deref()),
            history,
            previous_dir: None,
            exit_requested: false,
        }
    }
}
