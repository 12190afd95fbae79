//! Error handling for ghostsh
//!
//! Structured error kinds shared by the table model, the filter pipeline and
//! the builtin commands. Interactive edges (terminal, config) wrap these in
//! `anyhow` with context; everything below them returns `ShellResult`.

use std::collections::HashMap;

/// Buffer name that marks an allocation failure as fatal
const LINE_BUFFER: &str = "line buffer";

/// Result type for all ghostsh core operations
pub type ShellResult<T> = Result<T, ShellError>;

/// Main error type for ghostsh operations
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ShellError {
    pub kind: ErrorKind,
    pub message: String,
    // Boxed to keep ShellError small on the happy path
    pub context: Box<HashMap<String, String>>,
}

/// Categories of errors that can occur in ghostsh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A buffer, match list or row store could not grow.
    AllocationFailure,
    /// A filter referenced a column absent from the table headers.
    UnknownField,
    /// Bad operator, non-numeric `limit`, malformed filter syntax.
    InvalidArgument,
    /// A bookmark, alias or path does not exist.
    NotFound,
    /// The first word of a pipeline names no builtin.
    CommandNotFound,
    /// Filesystem or terminal I/O failed.
    Io,
    /// A configuration file could not be parsed.
    Config,
}

impl ShellError {
    /// Create a new shell error
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Box::default(),
        }
    }

    /// Unknown column; the message lists every header that does exist.
    pub fn unknown_field(field: &str, available: &[String]) -> Self {
        Self::new(
            ErrorKind::UnknownField,
            format!("unknown field '{field}'. Available fields: {}", available.join(", ")),
        )
        .with_context("field", field)
    }

    /// Invalid argument with a usage line appended
    pub fn usage(command: &str, problem: impl Into<String>, usage: &str) -> Self {
        Self::new(
            ErrorKind::InvalidArgument,
            format!("{}\nUsage: {usage}", problem.into()),
        )
        .with_context("command", command)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// `what` names the buffer that failed to grow and is kept as the
    /// `buffer` context entry.
    pub fn allocation(what: &str) -> Self {
        Self::new(ErrorKind::AllocationFailure, format!("out of memory while growing {what}"))
            .with_context("buffer", what)
    }

    /// The editor's input line could not grow
    pub fn line_buffer_allocation() -> Self {
        Self::allocation(LINE_BUFFER)
    }

    /// Create a command not found error
    pub fn command_not_found(command: &str) -> Self {
        Self::new(ErrorKind::CommandNotFound, format!("command not found: {command}"))
    }

    /// Create an I/O error
    pub fn io(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, format!("I/O error: {err}"))
    }

    /// Add context information to the error
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Only a failed top-level line buffer is fatal; every other failure
    /// aborts the current operation and leaves prior state in place.
    pub fn is_recoverable(&self) -> bool {
        !(self.kind == ErrorKind::AllocationFailure
            && self.context.get("buffer").map(String::as_str) == Some(LINE_BUFFER))
    }
}

impl From<std::io::Error> for ShellError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::new(ErrorKind::NotFound, err.to_string())
        } else {
            Self::io(err)
        }
    }
}

impl From<std::collections::TryReserveError> for ShellError {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::allocation("collection")
    }
}
