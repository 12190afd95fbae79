//! `ls` / `dir` with structured table output

use crate::builtin::{Builtin, CommandOutput};
use crate::state::ShellState;
use chrono::{DateTime, Local};
use ghostsh_core::{format_size, DataValue, ShellError, ShellResult, Table};
use std::fs;
use std::path::{Path, PathBuf};

/// Column order is mirrored by the completion grammar; keep both in sync.
pub const LS_HEADERS: [&str; 4] = ["Name", "Size", "Type", "Date"];

/// List a directory as `[Name, Size, Type, Date]`, sorted by name.
pub fn list_directory(target: &Path) -> ShellResult<Table> {
    let mut table = Table::new(&LS_HEADERS)?;

    if !target.is_dir() {
        if target.exists() {
            table.add_row(entry_row(target)?)?;
            return Ok(table);
        }
        return Err(ShellError::not_found(format!("no such file or directory: {}", target.display())));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(target)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    paths.sort_by_key(|p| display_name(p).to_lowercase());

    for path in paths {
        match entry_row(&path) {
            Ok(row) => table.add_row(row)?,
            // Entries can vanish or be unreadable between listing and stat
            Err(e) => {
                ghostsh_core::gsh_log_debug!(path = %path.display(), error = %e, "skipping entry");
            }
        }
    }
    Ok(table)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn entry_row(path: &Path) -> ShellResult<Vec<DataValue>> {
    let meta = fs::metadata(path)?;
    let (size, kind) = if meta.is_dir() {
        (0, "Directory")
    } else {
        (meta.len(), "File")
    };
    let date = meta
        .modified()
        .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    Ok(vec![
        DataValue::string(display_name(path)),
        DataValue::size(format_size(size)),
        DataValue::string(kind),
        DataValue::string(date),
    ])
}

/// The `ls` builtin command implementation, also registered as `dir`
pub struct LsCommand {
    name: &'static str,
}

impl LsCommand {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Builtin for LsCommand {
    fn name(&self) -> &'static str {
        self.name
    }

    fn synopsis(&self) -> &'static str {
        "List a directory as a table (Name, Size, Type, Date)"
    }

    fn usage(&self) -> &'static str {
        "ls [path]"
    }

    fn execute(&self, _state: &mut ShellState, args: &[String]) -> ShellResult<CommandOutput> {
        let target = match args.first() {
            Some(p) => PathBuf::from(p),
            None => std::env::current_dir()?,
        };
        list_directory(&target).map(CommandOutput::Table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lists_files_and_directories_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), vec![0u8; 2048]).unwrap();
        fs::write(dir.path().join("A.log"), "hi").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let table = list_directory(dir.path()).unwrap();
        assert_eq!(table.headers(), LS_HEADERS);
        let rows: Vec<Vec<String>> = table
            .rows()
            .iter()
            .map(|r| r[..3].iter().map(|v| v.to_string()).collect())
            .collect();
        assert_eq!(
            rows,
            vec![
                vec!["A.log", "2 B", "File"],
                vec!["b.txt", "2.0 KB", "File"],
                vec!["sub", "0 B", "Directory"],
            ]
        );
        assert_eq!(table.rows()[0][3].to_string().len(), "2024-01-01 00:00".len());
    }

    #[test]
    fn single_file_target_yields_one_row() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("only.txt");
        fs::write(&file, "x").unwrap();
        assert_eq!(list_directory(&file).unwrap().row_count(), 1);
    }

    #[test]
    fn missing_target_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = list_directory(&dir.path().join("nope")).unwrap_err();
        assert_eq!(err.kind, ghostsh_core::ErrorKind::NotFound);
    }

    #[test]
    fn table_is_filterable_by_size() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("small"), "x").unwrap();
        fs::write(dir.path().join("large"), vec![0u8; 4096]).unwrap();
        let table = list_directory(dir.path()).unwrap();
        let big = table.filter_table("Size", ">", "1kb").unwrap();
        assert_eq!(big.row_count(), 1);
        assert_eq!(big.rows()[0][0].to_string(), "large");
    }
}
