//! # shell-result
//!
//! Replayable, multi-view results for shell commands.
//!
//! A running command produces an ordered stream of [`Event`]s: stdout and
//! stderr lines, one end marker per stream, and an exit code. A
//! [`StreamingResult`] drains that stream exactly once and lets callers
//! consume it in whichever way suits them:
//!
//! - collected up front (the default), like a plain [`StaticResult`]
//! - line by line while the command is still running
//! - as stdout only, stderr only, or both interleaved in arrival order
//!
//! Every view reads from the same ordered log, so they always agree, and
//! after the command finishes they are pure replays.
//!
//! ## Quick Start
//!
//! ```no_run
//! use shell_result::LocalShell;
//!
//! fn main() -> shell_result::Result<()> {
//!     // Initialize logging
//!     shell_result::logging::try_init().ok();
//!
//!     let shell = LocalShell::new();
//!
//!     // Collected result
//!     let mut result = shell.run("echo Foo")?;
//!     assert_eq!(result.stdout()?, vec!["Foo"]);
//!     assert!(result.success()?);
//!
//!     // Live result
//!     let mut live = shell.spawn("ping -c 3 localhost")?;
//!     for line in live.iter_combined() {
//!         let line = line?;
//!         println!("[{}] {}", line.stream, line.text);
//!     }
//!     println!("exit code: {}", live.exit_code()?);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod shell;

// Re-export commonly used types
pub use error::{Result, ShellResultError};
pub use result::{
    CommandOutput, Event, EventSource, LineData, LogSink, OutputLine, StaticResult, Stream,
    StreamingResult, TracingSink,
};
pub use shell::{CheckPolicy, LocalShell};
