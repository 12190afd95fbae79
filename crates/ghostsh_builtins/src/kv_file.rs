//! `name=value` line files backing aliases and bookmarks

use ghostsh_core::{ShellError, ShellResult};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Ordered key/value pairs with optional file persistence
#[derive(Debug, Clone, Default)]
pub struct KvStore {
    entries: Vec<(String, String)>,
    path: Option<PathBuf>,
}

impl KvStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from `path`. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> ShellResult<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => parse_pairs(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(ShellError::from(e).with_context("path", path.display().to_string()));
            }
        };
        Ok(Self { entries, path: Some(path) })
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or replace, keeping the original position of an existing key
    pub fn set(&mut self, name: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(idx).1)
    }

    /// Rewrite the backing file; in-memory stores succeed trivially.
    pub fn save(&self) -> ShellResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        write_pairs(path, &self.entries)
            .map_err(|e| ShellError::from(e).with_context("path", path.display().to_string()))
    }
}

/// Split each non-blank line on its first `=`; lines without one are skipped.
fn parse_pairs(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| {
            let (k, v) = line.split_once('=')?;
            let k = k.trim();
            if k.is_empty() {
                return None;
            }
            Some((k.to_string(), v.trim().to_string()))
        })
        .collect()
}

fn write_pairs(path: &Path, entries: &[(String, String)]) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut file = fs::File::create(path)?;
    for (k, v) in entries {
        writeln!(file, "{k}={v}")?;
    }
    file.flush()
}
