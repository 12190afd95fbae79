//! Built-in commands for ghostsh.
//!
//! Every command implements [`Builtin`] and returns a [`CommandOutput`]
//! instead of printing; the [`pipeline`] driver decides how output reaches
//! the terminal and threads table output through filter stages.

pub mod alias;
pub mod bookmark;
pub mod builtin;
pub mod fs_ops;
pub mod history;
pub mod kv_file;
pub mod ls;
pub mod pipeline;
pub mod ps;
pub mod shell;
pub mod state;

pub use alias::AliasStore;
pub use bookmark::BookmarkStore;
pub use builtin::{Builtin, BuiltinRegistry, CommandOutput};
pub use pipeline::{split_args, split_pipeline, Pipeline};
pub use state::{ShellState, StorePaths};
