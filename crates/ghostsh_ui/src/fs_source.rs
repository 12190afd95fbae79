//! Filesystem enumeration for path completion

use std::fs;
use std::path::{Path, PathBuf};

/// One directory entry offered as a completion candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCandidate {
    pub name: String,
    pub is_dir: bool,
}

/// Lists directory entries whose names start with a prefix
pub trait FileSystem {
    /// Entries of `dir` matching `prefix` case-insensitively, sorted by name.
    /// Unreadable or missing directories yield nothing.
    fn entries(&self, dir: &Path, prefix: &str) -> Vec<PathCandidate>;
}

/// The real filesystem. Relative directories resolve against `base`, or the
/// process working directory when `base` is `None`.
#[derive(Debug, Clone, Default)]
pub struct LocalFs {
    base: Option<PathBuf>,
}

impl LocalFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rooted_at(base: impl Into<PathBuf>) -> Self {
        Self { base: Some(base.into()) }
    }

    fn resolve(&self, dir: &Path) -> PathBuf {
        match &self.base {
            Some(base) if dir.is_relative() => base.join(dir),
            _ => dir.to_path_buf(),
        }
    }
}

impl FileSystem for LocalFs {
    fn entries(&self, dir: &Path, prefix: &str) -> Vec<PathCandidate> {
        let dir = if dir.as_os_str().is_empty() {
            self.resolve(Path::new("."))
        } else {
            self.resolve(dir)
        };
        let Ok(read) = fs::read_dir(&dir) else {
            return Vec::new();
        };

        let prefix = prefix.to_lowercase();
        let mut out: Vec<PathCandidate> = read
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                if !name.to_lowercase().starts_with(&prefix) {
                    return None;
                }
                let is_dir = e.path().is_dir();
                Some(PathCandidate { name, is_dir })
            })
            .collect();
        out.sort_by_key(|c| c.name.to_lowercase());
        out
    }
}

/// Split a typed argument into the directory to list and the name prefix.
/// Both `\` and `/` separate components.
pub fn split_dir_prefix(arg: &str) -> (&str, &str) {
    match arg.rfind(|c: char| c == '\\' || c == '/') {
        Some(i) => (&arg[..=i], &arg[i + 1..]),
        None => ("", arg),
    }
}
