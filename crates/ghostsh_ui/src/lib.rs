//! ghostsh UI Library
//!
//! The interactive front end: cursor-context parsing, the frequency and
//! context suggestion engines, the `EditorSession` state machine, frame
//! rendering and the crossterm read loop.

pub mod config;
pub mod context;
pub mod editor;
pub mod fs_source;
pub mod input;
pub mod readline;
pub mod render;
pub mod sources;
pub mod suggest;

pub use config::{EditorConfig, ShellConfig};
pub use context::{parse_context, parse_tokens, CommandContext};
pub use editor::{EditOutcome, EditorSession, HistorySource};
pub use fs_source::{FileSystem, LocalFs, PathCandidate};
pub use input::{from_key_event, InputEvent};
pub use readline::{LineReader, ReadOutcome};
pub use render::{compose, Frame, TerminalRenderer};
pub use sources::ShellSources;
pub use suggest::{Completion, CompletionSources, SuggestOptions, Suggester, Suggestion, SuggestionSource};
