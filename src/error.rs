//! Error types for shell-result.

use std::str::Utf8Error;

use thiserror::Error;

use crate::result::Stream;

/// Main error type for shell-result operations.
#[derive(Error, Debug)]
pub enum ShellResultError {
    /// A line of output was not valid UTF-8.
    #[error("failed to decode {stream} line: {source}")]
    Decoding {
        stream: Stream,
        #[source]
        source: Utf8Error,
    },

    /// The event source disconnected before the command finished.
    #[error("event source closed before `{command}` finished")]
    SourceClosed { command: String },

    /// Command exited with a non-zero code and the policy rejects it.
    #[error("`{command}` exited with code {code}")]
    NonZeroExit { command: String, code: i32 },

    /// Command wrote to stderr and the policy rejects it.
    #[error("`{command}` wrote {} line(s) to stderr", .lines.len())]
    UnexpectedStderr { command: String, lines: Vec<String> },

    /// The shell process could not be spawned.
    #[error("failed to spawn shell: {0}")]
    Spawn(#[source] std::io::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience Result type for shell-result operations.
pub type Result<T> = std::result::Result<T, ShellResultError>;
