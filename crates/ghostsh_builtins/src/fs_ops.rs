//! Filesystem builtins: cd, pwd, cat, mkdir, rm, touch

use crate::builtin::{Builtin, CommandOutput};
use crate::state::ShellState;
use ghostsh_core::{ShellError, ShellResult};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Change the process working directory, remembering the old one for `cd -`.
pub fn change_dir(state: &mut ShellState, target: &Path) -> ShellResult<()> {
    if !target.is_dir() {
        return Err(ShellError::not_found(format!("no such directory: {}", target.display())));
    }
    let previous = std::env::current_dir().ok();
    std::env::set_current_dir(target)?;
    state.previous_dir = previous;
    ghostsh_core::gsh_log_debug!(dir = %target.display(), "changed directory");
    Ok(())
}

/// The `cd` builtin command implementation
pub struct CdCommand;

impl Builtin for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn synopsis(&self) -> &'static str {
        "Change the current directory"
    }

    fn usage(&self) -> &'static str {
        "cd [dir | -]"
    }

    fn execute(&self, state: &mut ShellState, args: &[String]) -> ShellResult<CommandOutput> {
        if args.len() > 1 {
            return Err(ShellError::usage(self.name(), "too many arguments", self.usage()));
        }
        let target: PathBuf = match args.first().map(String::as_str) {
            None | Some("~") => dirs::home_dir()
                .ok_or_else(|| ShellError::not_found("home directory is unknown"))?,
            Some("-") => state
                .previous_dir
                .clone()
                .ok_or_else(|| ShellError::not_found("no previous directory"))?,
            Some(dir) => PathBuf::from(dir),
        };
        change_dir(state, &target)?;
        Ok(CommandOutput::None)
    }
}

/// The `pwd` builtin command implementation
pub struct PwdCommand;

impl Builtin for PwdCommand {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn synopsis(&self) -> &'static str {
        "Print the current directory"
    }

    fn usage(&self) -> &'static str {
        "pwd"
    }

    fn execute(&self, _state: &mut ShellState, _args: &[String]) -> ShellResult<CommandOutput> {
        let cwd = std::env::current_dir()?;
        Ok(CommandOutput::line(cwd.display().to_string()))
    }
}

/// The `cat` builtin command implementation
pub struct CatCommand;

impl Builtin for CatCommand {
    fn name(&self) -> &'static str {
        "cat"
    }

    fn synopsis(&self) -> &'static str {
        "Print file contents"
    }

    fn usage(&self) -> &'static str {
        "cat <file>..."
    }

    fn execute(&self, _state: &mut ShellState, args: &[String]) -> ShellResult<CommandOutput> {
        if args.is_empty() {
            return Err(ShellError::usage(self.name(), "missing file operand", self.usage()));
        }
        let mut lines = Vec::new();
        for file in args {
            let text = fs::read_to_string(file)
                .map_err(|e| ShellError::from(e).with_context("path", file.as_str()))?;
            lines.extend(text.lines().map(str::to_string));
        }
        Ok(CommandOutput::Text(lines))
    }
}

/// The `mkdir` builtin command implementation
pub struct MkdirCommand;

impl Builtin for MkdirCommand {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    fn synopsis(&self) -> &'static str {
        "Create directories"
    }

    fn usage(&self) -> &'static str {
        "mkdir [-p] <dir>..."
    }

    fn execute(&self, _state: &mut ShellState, args: &[String]) -> ShellResult<CommandOutput> {
        let parents = args.iter().any(|a| a == "-p");
        let dirs: Vec<&String> = args.iter().filter(|a| *a != "-p").collect();
        if dirs.is_empty() {
            return Err(ShellError::usage(self.name(), "missing directory operand", self.usage()));
        }
        for dir in dirs {
            if parents {
                fs::create_dir_all(dir)?;
            } else {
                fs::create_dir(dir)?;
            }
        }
        Ok(CommandOutput::None)
    }
}

/// The `rm` builtin command implementation
pub struct RmCommand;

impl Builtin for RmCommand {
    fn name(&self) -> &'static str {
        "rm"
    }

    fn synopsis(&self) -> &'static str {
        "Remove files, or directories with -r"
    }

    fn usage(&self) -> &'static str {
        "rm [-r] <path>..."
    }

    fn execute(&self, _state: &mut ShellState, args: &[String]) -> ShellResult<CommandOutput> {
        let recursive = args.iter().any(|a| a == "-r" || a == "-rf");
        let targets: Vec<&String> = args.iter().filter(|a| !a.starts_with('-')).collect();
        if targets.is_empty() {
            return Err(ShellError::usage(self.name(), "missing operand", self.usage()));
        }
        for target in targets {
            let path = Path::new(target);
            if path.is_dir() {
                if !recursive {
                    return Err(ShellError::invalid_argument(format!("{target} is a directory (use -r)")));
                }
                fs::remove_dir_all(path)?;
            } else {
                fs::remove_file(path)?;
            }
        }
        Ok(CommandOutput::None)
    }
}

/// The `touch` builtin command implementation
pub struct TouchCommand;

impl Builtin for TouchCommand {
    fn name(&self) -> &'static str {
        "touch"
    }

    fn synopsis(&self) -> &'static str {
        "Create empty files"
    }

    fn usage(&self) -> &'static str {
        "touch <file>..."
    }

    fn execute(&self, _state: &mut ShellState, args: &[String]) -> ShellResult<CommandOutput> {
        if args.is_empty() {
            return Err(ShellError::usage(self.name(), "missing file operand", self.usage()));
        }
        for file in args {
            OpenOptions::new().create(true).append(true).open(file)?;
        }
        Ok(CommandOutput::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn arg(p: &Path) -> String {
        p.display().to_string()
    }

    #[test]
    fn touch_cat_rm_roundtrip() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("notes.txt");
        let mut state = ShellState::ephemeral();

        TouchCommand.execute(&mut state, &[arg(&file)]).unwrap();
        assert!(file.exists());
        fs::write(&file, "one\ntwo\n").unwrap();
        let out = CatCommand.execute(&mut state, &[arg(&file)]).unwrap();
        assert_eq!(out, CommandOutput::Text(vec!["one".into(), "two".into()]));

        RmCommand.execute(&mut state, &[arg(&file)]).unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn rm_needs_recursive_flag_for_directories() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("a").join("b");
        let mut state = ShellState::ephemeral();
        MkdirCommand.execute(&mut state, &["-p".into(), arg(&sub)]).unwrap();
        assert!(sub.is_dir());

        let top = dir.path().join("a");
        assert!(RmCommand.execute(&mut state, &[arg(&top)]).is_err());
        RmCommand.execute(&mut state, &["-r".into(), arg(&top)]).unwrap();
        assert!(!top.exists());
    }

    #[test]
    fn cd_to_missing_directory_keeps_state() {
        let dir = TempDir::new().unwrap();
        let mut state = ShellState::ephemeral();
        let missing = dir.path().join("missing");
        let err = CdCommand.execute(&mut state, &[arg(&missing)]).unwrap_err();
        assert_eq!(err.kind, ghostsh_core::ErrorKind::NotFound);
        assert!(state.previous_dir.is_none());
    }

    #[test]
    fn cat_missing_file_is_not_found() {
        let mut state = ShellState::ephemeral();
        let err = CatCommand.execute(&mut state, &["/definitely/not/here".into()]).unwrap_err();
        assert_eq!(err.kind, ghostsh_core::ErrorKind::NotFound);
    }
}
