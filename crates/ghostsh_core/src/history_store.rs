//! Persistent command history and usage frequency
//!
//! Two line-oriented files back the store:
//! - history: `command|unix_timestamp`, append-only
//! - frequency: `command|count`, rewritten on every record
//!
//! Both split on the last `|` since commands themselves contain pipes.
//! The line editor only queries this store; the shell records into it after
//! a line is submitted.

use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// A single history entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub command: String,
    pub timestamp: i64,
}

/// Where the store persists; `None` keeps that half in memory only.
#[derive(Debug, Clone, Default)]
pub struct HistoryPaths {
    pub history_file: Option<PathBuf>,
    pub frequency_file: Option<PathBuf>,
}

impl HistoryPaths {
    /// `<data_dir>/ghostsh/{history,frequency}`
    pub fn default_location() -> Self {
        let base = dirs::data_dir().map(|d| d.join("ghostsh"));
        Self {
            history_file: base.as_ref().map(|b| b.join("history")),
            frequency_file: base.map(|b| b.join("frequency")),
        }
    }
}

#[derive(Debug, Clone)]
struct FrequencyEntry {
    command: String,
    count: u64,
}

/// History log plus per-command usage counts
#[derive(Debug)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    // First-seen order; ranking ties fall back to this order
    frequency: Vec<FrequencyEntry>,
    paths: HistoryPaths,
    max_entries: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl HistoryStore {
    /// Empty store that never touches the disk
    pub fn in_memory() -> Self {
        Self {
            entries: Vec::new(),
            frequency: Vec::new(),
            paths: HistoryPaths::default(),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Load both files. Missing files are an empty store, unreadable ones
    /// are logged and skipped.
    pub fn load(paths: HistoryPaths) -> Self {
        let mut store = Self {
            paths,
            ..Self::in_memory()
        };

        if let Some(path) = store.paths.history_file.clone() {
            match read_lines(&path) {
                Ok(lines) => store.entries = lines.iter().filter_map(|l| parse_history_line(l)).collect(),
                Err(e) => {
                    crate::gsh_log_warn!(path = %path.display(), error = %e, "failed to load history");
                }
            }
        }
        if let Some(path) = store.paths.frequency_file.clone() {
            match read_lines(&path) {
                Ok(lines) => {
                    for (command, count) in lines.iter().filter_map(|l| parse_frequency_line(l)) {
                        store.bump(command, count);
                    }
                }
                Err(e) => {
                    crate::gsh_log_warn!(path = %path.display(), error = %e, "failed to load frequency table");
                }
            }
        }

        store.trim();
        crate::gsh_log_debug!(
            entries = store.entries.len(),
            commands = store.frequency.len(),
            "history store loaded"
        );
        store
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self.trim();
        self
    }

    /// Record a submitted command. Blank and space-prefixed lines are skipped.
    pub fn record(&mut self, command: &str) {
        if command.trim().is_empty() || command.starts_with(' ') {
            return;
        }
        let command = command.trim_end();
        let entry = HistoryEntry {
            command: command.to_string(),
            timestamp: Utc::now().timestamp(),
        };

        if let Some(path) = &self.paths.history_file {
            if let Err(e) = append_history(path, &entry) {
                crate::gsh_log_warn!(path = %path.display(), error = %e, "failed to append history");
            }
        }
        self.entries.push(entry);
        self.trim();

        self.bump(command.to_string(), 1);
        self.trim_frequency(Some(command));
        if let Some(path) = &self.paths.frequency_file {
            if let Err(e) = write_frequency(path, &self.frequency) {
                crate::gsh_log_warn!(path = %path.display(), error = %e, "failed to save frequency table");
            }
        }
    }

    /// Entry by position, oldest first
    pub fn history_entry(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn history_count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Usage count of one exact command
    pub fn frequency_of(&self, command: &str) -> u64 {
        self.frequency
            .iter()
            .find(|f| f.command == command)
            .map_or(0, |f| f.count)
    }

    /// Commands ranked for `prefix`: prefix matches first, then (when the
    /// prefix is at least `min_substring` long) substring matches. Each tier
    /// is ordered by descending count, ties in first-seen order. The prefix
    /// itself is never returned.
    pub fn frequency_suggestions(&self, prefix: &str, min_substring: usize) -> Vec<String> {
        if prefix.is_empty() {
            return Vec::new();
        }
        let allow_substring = prefix.chars().count() >= min_substring;

        let mut prefixed: Vec<&FrequencyEntry> = Vec::new();
        let mut containing: Vec<&FrequencyEntry> = Vec::new();
        for f in &self.frequency {
            if f.command == prefix {
                continue;
            }
            if f.command.starts_with(prefix) {
                prefixed.push(f);
            } else if allow_substring && f.command.contains(prefix) {
                containing.push(f);
            }
        }
        prefixed.sort_by(|a, b| b.count.cmp(&a.count));
        containing.sort_by(|a, b| b.count.cmp(&a.count));

        prefixed
            .into_iter()
            .chain(containing)
            .map(|f| f.command.clone())
            .collect()
    }

    fn bump(&mut self, command: String, by: u64) {
        match self.frequency.iter_mut().find(|f| f.command == command) {
            Some(f) => f.count = f.count.saturating_add(by),
            None => self.frequency.push(FrequencyEntry { command, count: by }),
        }
    }

    fn trim(&mut self) {
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }
        self.trim_frequency(None);
    }

    /// Cap the frequency table at `max_entries` commands by evicting the
    /// least used, oldest first among equals. `keep` is never evicted.
    fn trim_frequency(&mut self, keep: Option<&str>) {
        let len = self.frequency.len();
        if len <= self.max_entries {
            return;
        }
        let mut order: Vec<usize> = (0..len)
            .filter(|&i| Some(self.frequency[i].command.as_str()) != keep)
            .collect();
        order.sort_by_key(|&i| self.frequency[i].count);

        let mut evict = vec![false; len];
        for &i in order.iter().take(len - self.max_entries) {
            evict[i] = true;
        }
        let mut flags = evict.into_iter();
        self.frequency.retain(|_| !flags.next().unwrap_or(false));
        crate::gsh_log_debug!(evicted = len - self.frequency.len(), "frequency table trimmed");
    }
}

fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    BufReader::new(file).lines().collect()
}

fn parse_history_line(line: &str) -> Option<HistoryEntry> {
    if line.trim().is_empty() {
        return None;
    }
    // Lines written by older versions carry no timestamp
    let (command, timestamp) = match line.rsplit_once('|') {
        Some((cmd, ts)) => match ts.trim().parse::<i64>() {
            Ok(ts) => (cmd, ts),
            Err(_) => (line, 0),
        },
        None => (line, 0),
    };
    Some(HistoryEntry {
        command: command.to_string(),
        timestamp,
    })
}

fn parse_frequency_line(line: &str) -> Option<(String, u64)> {
    let (command, count) = line.rsplit_once('|')?;
    let count = count.trim().parse::<u64>().ok()?;
    if command.trim().is_empty() {
        return None;
    }
    Some((command.to_string(), count))
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

fn append_history(path: &Path, entry: &HistoryEntry) -> io::Result<()> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}|{}", entry.command, entry.timestamp)
}

fn write_frequency(path: &Path, frequency: &[FrequencyEntry]) -> io::Result<()> {
    ensure_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    for f in frequency {
        writeln!(writer, "{}|{}", f.command, f.count)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn paths(dir: &TempDir) -> HistoryPaths {
        HistoryPaths {
            history_file: Some(dir.path().join("history")),
            frequency_file: Some(dir.path().join("frequency")),
        }
    }

    #[test]
    fn record_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let mut store = HistoryStore::load(paths(&dir));
        store.record("ls | where Size > 1kb");
        store.record("ps");
        store.record("ps");

        let reloaded = HistoryStore::load(paths(&dir));
        assert_eq!(reloaded.history_count(), 3);
        assert_eq!(reloaded.history_entry(0).unwrap().command, "ls | where Size > 1kb");
        assert_eq!(reloaded.frequency_of("ps"), 2);
        assert_eq!(reloaded.frequency_of("ls | where Size > 1kb"), 1);
    }

    #[test]
    fn blank_and_space_prefixed_lines_are_not_recorded() {
        let mut store = HistoryStore::in_memory();
        store.record("   ");
        store.record(" secret");
        assert_eq!(store.history_count(), 0);
    }

    #[test]
    fn prefix_tier_outranks_substring_tier() {
        let mut store = HistoryStore::in_memory();
        for _ in 0..5 {
            store.record("git status");
        }
        store.record("status report");
        store.record("stat");
        store.record("status");
        store.record("status");

        let ranked = store.frequency_suggestions("stat", 3);
        assert_eq!(ranked, vec!["status", "status report", "git status"]);
    }

    #[test]
    fn short_prefixes_skip_substring_matches() {
        let mut store = HistoryStore::in_memory();
        store.record("cat notes");
        store.record("cd src");
        assert_eq!(store.frequency_suggestions("cd", 3), vec!["cd src"]);
        assert!(store.frequency_suggestions("no", 3).is_empty());
        assert_eq!(store.frequency_suggestions("note", 3), vec!["cat notes"]);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let mut store = HistoryStore::in_memory();
        store.record("echo b");
        store.record("echo a");
        assert_eq!(store.frequency_suggestions("echo", 3), vec!["echo b", "echo a"]);
    }

    #[test]
    fn malformed_lines_are_tolerated() {
        let dir = TempDir::new().unwrap();
        let p = paths(&dir);
        fs::write(p.history_file.as_ref().unwrap(), "ls\nps|17\n\nls | sort-by Name|99\n").unwrap();
        fs::write(p.frequency_file.as_ref().unwrap(), "garbage\nls|x\nps|4\n").unwrap();

        let store = HistoryStore::load(p);
        assert_eq!(store.history_count(), 3);
        assert_eq!(store.history_entry(0).unwrap().timestamp, 0);
        assert_eq!(store.history_entry(2).unwrap().command, "ls | sort-by Name");
        assert_eq!(store.frequency_of("ps"), 4);
        assert_eq!(store.frequency_of("ls"), 0);
    }

    #[test]
    fn max_entries_drops_oldest() {
        let mut store = HistoryStore::in_memory().with_max_entries(2);
        store.record("one");
        store.record("two");
        store.record("three");
        assert_eq!(store.history_count(), 2);
        assert_eq!(store.history_entry(0).unwrap().command, "two");
    }

    #[test]
    fn frequency_table_evicts_least_used() {
        let mut store = HistoryStore::in_memory().with_max_entries(2);
        store.record("ls");
        store.record("ls");
        store.record("ps");
        store.record("pwd");
        // `ps` is the least used; the newest command always survives
        assert_eq!(store.frequency_of("ls"), 2);
        assert_eq!(store.frequency_of("ps"), 0);
        assert_eq!(store.frequency_of("pwd"), 1);
        assert_eq!(store.frequency_suggestions("p", 3), vec!["pwd"]);
    }

    #[test]
    fn oversized_frequency_file_is_trimmed_on_load() {
        let dir = TempDir::new().unwrap();
        let p = paths(&dir);
        fs::write(p.frequency_file.as_ref().unwrap(), "a|1\nb|5\nc|1\nd|3\n").unwrap();

        let store = HistoryStore::load(p).with_max_entries(2);
        assert_eq!(store.frequency_of("b"), 5);
        assert_eq!(store.frequency_of("d"), 3);
        assert_eq!(store.frequency_of("a") + store.frequency_of("c"), 0);
    }
}
