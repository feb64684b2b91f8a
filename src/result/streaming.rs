//! Streaming command results.
//!
//! A [`StreamingResult`] owns the event source of one running command and
//! drains it at most once. Every drained line is appended to an ordered log,
//! and all views (combined, stdout-only, stderr-only, materialized) read
//! from that log first and only pull from the source when they run past its
//! end. Once the command has finished the source is dropped and every view
//! is a pure replay.

use std::fmt;
use std::iter::FusedIterator;
use std::str::Utf8Error;
use std::sync::Arc;

use tracing::{debug, trace};

use super::event::{Event, EventSource, Stream};
use super::sink::{LogSink, TracingSink};
use super::static_result::{outputs_equal, stdout_matches_text, CommandOutput, StaticResult};
use crate::error::ShellResultError;
use crate::Result;

/// One drained line together with the stream it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    /// Stream the line was written to.
    pub stream: Stream,
    /// Decoded line text, without the trailing newline.
    pub text: String,
}

impl OutputLine {
    /// Create a new output line.
    pub fn new(stream: Stream, text: impl Into<String>) -> Self {
        Self {
            stream,
            text: text.into(),
        }
    }
}

/// Reason a drain stopped before the command finished.
#[derive(Debug, Clone, Copy)]
enum Failure {
    Decoding(Stream, Utf8Error),
    SourceClosed,
}

impl Failure {
    fn to_error(self, command: &str) -> ShellResultError {
        match self {
            Failure::Decoding(stream, source) => ShellResultError::Decoding { stream, source },
            Failure::SourceClosed => ShellResultError::SourceClosed {
                command: command.to_owned(),
            },
        }
    }
}

/// Result of a command whose output is still arriving, or has arrived.
///
/// Created around an [`EventSource`]. By default construction drains the
/// source completely, so the result behaves like a [`StaticResult`]. Use
/// [`StreamingResult::lazy`] to consume output as it is produced.
///
/// Accessors take `&mut self` because any of them may pull from the source.
/// The result is single-consumer: share it across threads only behind a lock.
pub struct StreamingResult {
    command: String,
    /// `None` once finished; the source is never read again after that.
    source: Option<Box<dyn EventSource>>,
    sink: Arc<dyn LogSink>,
    log: Vec<OutputLine>,
    exit_code: Option<i32>,
    stdout_open: bool,
    stderr_open: bool,
    failure: Option<Failure>,
}

impl StreamingResult {
    /// Create a result and drain `source` to completion before returning.
    pub fn new(command: impl Into<String>, source: impl EventSource + 'static) -> Result<Self> {
        Self::builder(command).build(source)
    }

    /// Create a result without draining; output is pulled by the accessors.
    pub fn lazy(command: impl Into<String>, source: impl EventSource + 'static) -> Self {
        Self::builder(command).into_lazy(Box::new(source))
    }

    /// Start building a result with a custom sink or collection mode.
    pub fn builder(command: impl Into<String>) -> StreamingResultBuilder {
        StreamingResultBuilder::new(command)
    }

    /// The command text.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Whether the command has finished and the source has been released.
    pub fn is_finished(&self) -> bool {
        self.source.is_none()
    }

    /// Number of lines drained so far.
    pub fn drained_lines(&self) -> usize {
        self.log.len()
    }

    /// Iterate over every line in arrival order.
    ///
    /// Lines already drained are replayed first; after that the iterator
    /// blocks on the source and yields lines as they arrive.
    pub fn iter_combined(&mut self) -> Combined<'_> {
        Combined {
            result: self,
            cursor: 0,
            done: false,
        }
    }

    /// Iterate over stdout lines only.
    pub fn iter_stdout(&mut self) -> StreamLines<'_> {
        StreamLines {
            inner: self.iter_combined(),
            stream: Stream::Stdout,
        }
    }

    /// Iterate over stderr lines only.
    pub fn iter_stderr(&mut self) -> StreamLines<'_> {
        StreamLines {
            inner: self.iter_combined(),
            stream: Stream::Stderr,
        }
    }

    /// All stdout lines. Drains the source if needed.
    pub fn stdout(&mut self) -> Result<Vec<String>> {
        self.iter_stdout().collect()
    }

    /// All stderr lines. Drains the source if needed.
    pub fn stderr(&mut self) -> Result<Vec<String>> {
        self.iter_stderr().collect()
    }

    /// The exit code. Blocks until the command has finished.
    pub fn exit_code(&mut self) -> Result<i32> {
        self.wait()?;
        self.exit_code.ok_or_else(|| ShellResultError::SourceClosed {
            command: self.command.clone(),
        })
    }

    /// Block until the command has finished, draining any remaining output.
    pub fn wait(&mut self) -> Result<()> {
        while self.advance()? {}
        Ok(())
    }

    /// Check if the command succeeded (exit code 0).
    pub fn success(&mut self) -> Result<bool> {
        Ok(self.exit_code()? == 0)
    }

    /// Stdout lines joined with newlines.
    pub fn text(&mut self) -> Result<String> {
        Ok(self.stdout()?.join("\n"))
    }

    /// Compare field by field against another result.
    ///
    /// To compare a [`StaticResult`] against a streaming one, pass the
    /// latter's [`snapshot`](Self::snapshot) to [`StaticResult::eq_result`].
    pub fn eq_result(&mut self, other: &impl CommandOutput) -> Result<bool> {
        Ok(outputs_equal(&self.snapshot()?, other))
    }

    /// Compare field by field against another streaming result, draining both.
    pub fn eq_streaming(&mut self, other: &mut StreamingResult) -> Result<bool> {
        let other = other.snapshot()?;
        self.eq_result(&other)
    }

    /// Compare stdout against an expected multi-line blob.
    ///
    /// An empty blob matches a single blank stdout line.
    pub fn eq_text(&mut self, expected: &str) -> Result<bool> {
        Ok(stdout_matches_text(&self.stdout()?, expected))
    }

    /// Drain and copy the outcome into a [`StaticResult`].
    pub fn snapshot(&mut self) -> Result<StaticResult> {
        let exit_code = self.exit_code()?;
        let (stdout, stderr) = self.split_log();
        Ok(StaticResult::from_parts(
            self.command.clone(),
            stdout,
            stderr,
            exit_code,
        ))
    }

    /// Drain and convert into a [`StaticResult`].
    pub fn into_static(mut self) -> Result<StaticResult> {
        let exit_code = self.exit_code()?;
        let (stdout, stderr) = self.split_log();
        Ok(StaticResult::from_parts(
            self.command,
            stdout,
            stderr,
            exit_code,
        ))
    }

    fn split_log(&self) -> (Vec<String>, Vec<String>) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        for line in &self.log {
            match line.stream {
                Stream::Stdout => stdout.push(line.text.clone()),
                Stream::Stderr => stderr.push(line.text.clone()),
            }
        }
        (stdout, stderr)
    }

    /// Pull events until one line has been appended to the log.
    ///
    /// Returns `Ok(false)` once the command has finished. The terminator may
    /// arrive before the end-of-stream markers, so draining continues until
    /// both streams are closed and the exit code is known.
    fn advance(&mut self) -> Result<bool> {
        if let Some(failure) = self.failure {
            return Err(failure.to_error(&self.command));
        }

        loop {
            if !self.stdout_open && !self.stderr_open && self.exit_code.is_some() {
                if self.source.take().is_some() {
                    debug!(
                        command = %self.command,
                        lines = self.log.len(),
                        exit_code = ?self.exit_code,
                        "command finished"
                    );
                }
                return Ok(false);
            }

            let event = match self.source.as_mut() {
                Some(source) => source.next_event(),
                None => return Ok(false),
            };

            match event {
                Some(Event::Exit(code)) => {
                    trace!(command = %self.command, code, "exit code received");
                    self.exit_code = Some(code);
                }
                Some(Event::End(Stream::Stdout)) => self.stdout_open = false,
                Some(Event::End(Stream::Stderr)) => self.stderr_open = false,
                Some(Event::Line { stream, data }) => {
                    let text = match data.decode(stream) {
                        Ok(text) => text,
                        Err(e) => {
                            if let ShellResultError::Decoding { stream, source } = &e {
                                self.failure = Some(Failure::Decoding(*stream, *source));
                            }
                            return Err(e);
                        }
                    };
                    match stream {
                        Stream::Stdout => self.sink.stdout(&text),
                        Stream::Stderr => self.sink.stderr(&text),
                    }
                    self.log.push(OutputLine { stream, text });
                    return Ok(true);
                }
                None => {
                    debug!(command = %self.command, "event source closed early");
                    self.failure = Some(Failure::SourceClosed);
                    return Err(Failure::SourceClosed.to_error(&self.command));
                }
            }
        }
    }
}

impl fmt::Debug for StreamingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingResult")
            .field("command", &self.command)
            .field("lines", &self.log.len())
            .field("exit_code", &self.exit_code)
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Iterates stdout lines, like [`StreamingResult::iter_stdout`].
impl<'a> IntoIterator for &'a mut StreamingResult {
    type Item = Result<String>;
    type IntoIter = StreamLines<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_stdout()
    }
}

/// Builder for [`StreamingResult`].
pub struct StreamingResultBuilder {
    command: String,
    sink: Arc<dyn LogSink>,
    collect: bool,
}

impl StreamingResultBuilder {
    /// Create a builder with the tracing sink and eager collection.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            sink: Arc::new(TracingSink),
            collect: true,
        }
    }

    /// Set the sink receiving drained lines.
    pub fn sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Set an already shared sink.
    pub fn shared_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Set whether to drain the source during `build`.
    pub fn collect(mut self, collect: bool) -> Self {
        self.collect = collect;
        self
    }

    /// Build the result, draining the source if collection is enabled.
    pub fn build(self, source: impl EventSource + 'static) -> Result<StreamingResult> {
        let collect = self.collect;
        let mut result = self.into_lazy(Box::new(source));
        if collect {
            result.wait()?;
        }
        Ok(result)
    }

    fn into_lazy(self, source: Box<dyn EventSource>) -> StreamingResult {
        self.sink.command(&self.command);
        StreamingResult {
            command: self.command,
            source: Some(source),
            sink: self.sink,
            log: Vec::new(),
            exit_code: None,
            stdout_open: true,
            stderr_open: true,
            failure: None,
        }
    }
}

/// Iterator over every drained line, see [`StreamingResult::iter_combined`].
pub struct Combined<'a> {
    result: &'a mut StreamingResult,
    cursor: usize,
    done: bool,
}

impl Iterator for Combined<'_> {
    type Item = Result<OutputLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.cursor == self.result.log.len() {
            match self.result.advance() {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        let line = self.result.log[self.cursor].clone();
        self.cursor += 1;
        Some(Ok(line))
    }
}

impl FusedIterator for Combined<'_> {}

/// Iterator over the lines of one stream, see [`StreamingResult::iter_stdout`].
pub struct StreamLines<'a> {
    inner: Combined<'a>,
    stream: Stream,
}

impl Iterator for StreamLines<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        for item in self.inner.by_ref() {
            match item {
                Ok(line) if line.stream == self.stream => return Some(Ok(line.text)),
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

impl FusedIterator for StreamLines<'_> {}
