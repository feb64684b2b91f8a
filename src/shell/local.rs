//! Local shell feeding streaming results.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc;
use tracing::{debug, error, trace};

use super::policy::CheckPolicy;
use crate::error::ShellResultError;
use crate::result::{Event, LineData, LogSink, Stream, StreamingResult, TracingSink};
use crate::Result;

/// Default shell program.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Exit code reported when the real one cannot be determined.
const UNKNOWN_EXIT_CODE: i32 = -1;

/// Runs commands through a local shell (`<program> -c <command>`).
///
/// Each command gets its own process. One thread per output stream turns
/// lines into [`Event`]s and a third thread sends the exit code once both
/// streams are exhausted.
#[derive(Clone)]
pub struct LocalShell {
    program: String,
    env: HashMap<String, String>,
    policy: CheckPolicy,
    sink: Arc<dyn LogSink>,
}

impl LocalShell {
    /// Create a shell using [`DEFAULT_SHELL`] and the tracing sink.
    pub fn new() -> Self {
        Self {
            program: DEFAULT_SHELL.to_string(),
            env: HashMap::new(),
            policy: CheckPolicy::default(),
            sink: Arc::new(TracingSink),
        }
    }

    /// Set the shell program.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the error policy applied by [`run`](Self::run).
    pub fn policy(mut self, policy: CheckPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the sink receiving commands and output lines.
    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Export multiple environment variables.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in vars {
            self.env.insert(k.into(), v.into());
        }
        self
    }

    /// Export an environment variable to every following command.
    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env.insert(key.into(), value.into());
    }

    /// Get an exported environment variable.
    pub fn var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// The shell program.
    pub fn get_program(&self) -> &str {
        &self.program
    }

    /// The configured error policy.
    pub fn get_policy(&self) -> CheckPolicy {
        self.policy
    }

    /// Run a command, wait for it and apply the shell's policy.
    pub fn run(&self, command: &str) -> Result<StreamingResult> {
        self.run_with(command, None, None)
    }

    /// Run a command with per-call policy overrides.
    ///
    /// `None` falls back to the shell-wide setting.
    pub fn run_with(
        &self,
        command: &str,
        check_xc: Option<bool>,
        check_err: Option<bool>,
    ) -> Result<StreamingResult> {
        let source = self.start(command)?;
        let mut result = StreamingResult::builder(command)
            .shared_sink(self.sink.clone())
            .build(source)?;
        self.policy.merge(check_xc, check_err).check(&mut result)?;
        Ok(result)
    }

    /// Start a command and return immediately with a lazy result.
    ///
    /// No policy is applied; iterate the result to follow output live.
    pub fn spawn(&self, command: &str) -> Result<StreamingResult> {
        let source = self.start(command)?;
        StreamingResult::builder(command)
            .shared_sink(self.sink.clone())
            .collect(false)
            .build(source)
    }

    fn start(&self, command: &str) -> Result<mpsc::UnboundedReceiver<Event>> {
        let mut child = Command::new(&self.program)
            .arg("-c")
            .arg(command)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(ShellResultError::Spawn)?;

        let stdout = child.stdout.take().ok_or_else(|| missing_pipe(Stream::Stdout))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe(Stream::Stderr))?;
        debug!(pid = child.id(), command, "spawned shell");

        let (tx, rx) = mpsc::unbounded_channel();
        let stdout_reader = spawn_reader(stdout, Stream::Stdout, tx.clone());
        let stderr_reader = spawn_reader(stderr, Stream::Stderr, tx.clone());

        thread::spawn(move || {
            for reader in [stdout_reader, stderr_reader] {
                if reader.join().is_err() {
                    error!("output reader thread panicked");
                }
            }
            let code = match child.wait() {
                Ok(status) => exit_code(status),
                Err(e) => {
                    error!("failed to wait for shell: {}", e);
                    UNKNOWN_EXIT_CODE
                }
            };
            trace!(code, "shell exited");
            let _ = tx.send(Event::Exit(code));
        });

        Ok(rx)
    }
}

impl Default for LocalShell {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LocalShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalShell")
            .field("program", &self.program)
            .field("env", &self.env)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn missing_pipe(stream: Stream) -> ShellResultError {
    ShellResultError::Io(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        format!("{} pipe not captured", stream),
    ))
}

/// Read `reader` line by line, sending raw lines and a final end marker.
fn spawn_reader<R: Read + Send + 'static>(
    reader: R,
    stream: Stream,
    tx: mpsc::UnboundedSender<Event>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        loop {
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => {
                    debug!("{} reader: EOF", stream);
                    break;
                }
                Ok(_) => {
                    let mut line = std::mem::take(&mut buf);
                    strip_newline(&mut line);
                    let event = Event::Line {
                        stream,
                        data: LineData::Bytes(line),
                    };
                    if tx.send(event).is_err() {
                        debug!("{} reader: result dropped", stream);
                        break;
                    }
                }
                Err(e) => {
                    error!("{} reader error: {}", stream, e);
                    break;
                }
            }
        }

        let _ = tx.send(Event::End(stream));
    })
}

fn strip_newline(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(UNKNOWN_EXIT_CODE)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(UNKNOWN_EXIT_CODE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_shell_defaults() {
        let shell = LocalShell::new();
        assert_eq!(shell.get_program(), DEFAULT_SHELL);
        assert_eq!(shell.get_policy(), CheckPolicy::default());
        assert!(shell.var("HOME_NOT_EXPORTED").is_none());
    }

    #[test]
    fn test_set_var() {
        let mut shell = LocalShell::new();
        shell.set_var("SOME_VARIABLE", "value");
        assert_eq!(shell.var("SOME_VARIABLE"), Some("value"));

        let shell = shell.envs([("A", "1"), ("B", "2")]);
        assert_eq!(shell.var("A"), Some("1"));
        assert_eq!(shell.var("SOME_VARIABLE"), Some("value"));
    }

    #[test]
    fn test_strip_newline() {
        let mut line = b"hello\r\n".to_vec();
        strip_newline(&mut line);
        assert_eq!(line, b"hello");

        let mut line = b"no newline".to_vec();
        strip_newline(&mut line);
        assert_eq!(line, b"no newline");

        let mut line = b"\n".to_vec();
        strip_newline(&mut line);
        assert!(line.is_empty());
    }

    #[test]
    fn test_reader_sends_lines_then_end() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_reader(
            std::io::Cursor::new(b"one\ntwo\nthree".to_vec()),
            Stream::Stdout,
            tx,
        );
        handle.join().unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                Event::stdout(b"one".to_vec()),
                Event::stdout(b"two".to_vec()),
                Event::stdout(b"three".to_vec()),
                Event::End(Stream::Stdout),
            ]
        );
    }

    #[test]
    fn test_spawn_missing_program() {
        let shell = LocalShell::new().program("/definitely/not/a/shell");
        let err = shell.run("true").unwrap_err();
        assert!(matches!(err, ShellResultError::Spawn(_)));
    }
}
