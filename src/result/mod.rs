//! Command results.
//!
//! This module provides two representations of a command's outcome:
//! - [`StaticResult`]: an immutable snapshot of fully collected output
//! - [`StreamingResult`]: a replayable, multi-view result over a live
//!   stream of [`Event`]s
//!
//! # Example
//!
//! ```
//! use shell_result::result::{Event, Stream, StreamingResult};
//!
//! let events = vec![
//!     Event::stdout("Foo"),
//!     Event::End(Stream::Stdout),
//!     Event::End(Stream::Stderr),
//!     Event::Exit(0),
//! ];
//!
//! let mut result = StreamingResult::new("echo Foo", events.into_iter()).unwrap();
//! assert_eq!(result.stdout().unwrap(), vec!["Foo"]);
//! assert!(result.eq_text("Foo").unwrap());
//! assert!(result.success().unwrap());
//! ```

mod event;
mod sink;
mod static_result;
mod streaming;

pub use event::{Event, EventSource, LineData, Stream};
pub use sink::{LogSink, TracingSink};
pub use static_result::{CommandOutput, StaticResult};
pub use streaming::{Combined, OutputLine, StreamLines, StreamingResult, StreamingResultBuilder};
