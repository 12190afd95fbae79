//! Builtin trait and the fixed command table

use crate::state::ShellState;
use ghostsh_core::{ShellResult, Table};

/// What a builtin hands back to the pipeline driver
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    None,
    Text(Vec<String>),
    Table(Table),
    ClearScreen,
}

impl CommandOutput {
    pub fn line(text: impl Into<String>) -> Self {
        Self::Text(vec![text.into()])
    }
}

/// A command the shell runs in-process
pub trait Builtin: Send + Sync {
    fn name(&self) -> &'static str;

    /// One-line description for `help`
    fn synopsis(&self) -> &'static str;

    fn usage(&self) -> &'static str;

    /// Run with the words after the command name.
    fn execute(&self, state: &mut ShellState, args: &[String]) -> ShellResult<CommandOutput>;
}

/// Name-ordered table of builtins
pub struct BuiltinRegistry {
    builtins: Vec<Box<dyn Builtin>>,
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl BuiltinRegistry {
    pub fn standard() -> Self {
        let mut builtins: Vec<Box<dyn Builtin>> = vec![
            Box::new(crate::ls::LsCommand::new("ls")),
            Box::new(crate::ls::LsCommand::new("dir")),
            Box::new(crate::ps::PsCommand),
            Box::new(crate::fs_ops::CdCommand),
            Box::new(crate::fs_ops::PwdCommand),
            Box::new(crate::fs_ops::CatCommand),
            Box::new(crate::fs_ops::MkdirCommand),
            Box::new(crate::fs_ops::RmCommand),
            Box::new(crate::fs_ops::TouchCommand),
            Box::new(crate::history::HistoryCommand),
            Box::new(crate::alias::AliasCommand),
            Box::new(crate::alias::UnaliasCommand),
            Box::new(crate::bookmark::BookmarkCommand),
            Box::new(crate::bookmark::JumpCommand),
            Box::new(crate::shell::EchoCommand),
            Box::new(crate::shell::ClearCommand),
            Box::new(crate::shell::ExitCommand),
        ];
        let topics = builtins
            .iter()
            .map(|b| (b.name(), b.synopsis()))
            .chain([("help", crate::shell::HelpCommand::SYNOPSIS)])
            .collect();
        builtins.push(Box::new(crate::shell::HelpCommand::new(topics)));
        Self { builtins }
    }

    pub fn find(&self, name: &str) -> Option<&dyn Builtin> {
        self.builtins
            .iter()
            .find(|b| b.name().eq_ignore_ascii_case(name))
            .map(|b| b.as_ref())
    }

    /// Names for completion, in table order
    pub fn names(&self) -> Vec<&'static str> {
        self.builtins.iter().map(|b| b.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.builtins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builtins.is_empty()
    }
}
