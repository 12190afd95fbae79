//! ghostsh Core Library
//!
//! Typed table model, the structured filter pipeline (`where`, `sort-by`,
//! `select`, `contains`, `limit`), the static command/argument grammar that
//! drives context-aware completion, and the persistent history/frequency
//! store queried by the suggestion engines.

// Re-export commonly used types and functions
pub use error::{ErrorKind, ShellError, ShellResult};
pub use grammar::{ArgKind, ArgSpec, ArgumentType, CommandDefinition, CommandFields, FieldDef, FieldType, GrammarRegistry, Subcommand};
pub use history_store::{HistoryEntry, HistoryPaths, HistoryStore};
pub use structured_commands::{FilterRegistry, FilterStage, StructuredCommand};
pub use structured_data::{extract_size_bytes, format_size, parse_size, CompareOp, DataValue, Row, Table, Value};

pub mod error;
pub mod grammar;
pub mod history_store;
pub mod structured_commands;
pub mod structured_data;

// Lightweight logging facade macros; call sites stay in place while minimal builds strip them
#[cfg(feature = "minimal-logging")]
#[macro_export]
macro_rules! gsh_log_debug { ($($tt:tt)*) => { /* stripped in minimal build */ }; }
#[cfg(not(feature = "minimal-logging"))]
#[macro_export]
macro_rules! gsh_log_debug { ($($tt:tt)*) => { tracing::debug!($($tt)*); }; }

#[cfg(feature = "minimal-logging")]
#[macro_export]
macro_rules! gsh_log_info { ($($tt:tt)*) => { /* stripped */ }; }
#[cfg(not(feature = "minimal-logging"))]
#[macro_export]
macro_rules! gsh_log_info { ($($tt:tt)*) => { tracing::info!($($tt)*); }; }

#[cfg(feature = "minimal-logging")]
#[macro_export]
macro_rules! gsh_log_warn { ($($tt:tt)*) => { /* stripped */ }; }
#[cfg(not(feature = "minimal-logging"))]
#[macro_export]
macro_rules! gsh_log_warn { ($($tt:tt)*) => { tracing::warn!($($tt)*); }; }

#[cfg(feature = "minimal-logging")]
#[macro_export]
macro_rules! gsh_log_error { ($($tt:tt)*) => { /* stripped */ }; }
#[cfg(not(feature = "minimal-logging"))]
#[macro_export]
macro_rules! gsh_log_error { ($($tt:tt)*) => { tracing::error!($($tt)*); }; }
