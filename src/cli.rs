//! Command-line interface for shell-result.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Command to run.
    pub command: Option<String>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Shell program (overrides config file).
    pub shell: Option<String>,
    /// Environment variables exported to the command.
    pub env: Vec<(String, String)>,
    /// Fail on a non-zero exit code.
    pub check_xc: bool,
    /// Fail when the command writes to stderr.
    pub check_err: bool,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('s') | Long("shell") => {
                result.shell = Some(parser.value()?.parse()?);
            }
            Short('e') | Long("env") => {
                let value: String = parser.value()?.parse()?;
                let (key, val) = value
                    .split_once('=')
                    .filter(|(key, _)| !key.is_empty())
                    .ok_or_else(|| ArgsError::InvalidValue("env", value.clone()))?;
                result.env.push((key.to_string(), val.to_string()));
            }
            Long("check-xc") => {
                result.check_xc = true;
            }
            Long("check-err") => {
                result.check_err = true;
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                if result.command.is_some() {
                    return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
                }
                result.command = Some(val.string()?);
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"shell-result {version}
Run a shell command, streaming its stdout and stderr as they arrive

USAGE:
    shell-result [OPTIONS] <COMMAND>

OPTIONS:
    -c, --config <FILE>     Path to configuration file (JSON)
    -s, --shell <PROGRAM>   Shell program [default: /bin/sh]
    -e, --env <KEY=VALUE>   Export a variable to the command (repeatable)
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
        --check-xc          Fail on a non-zero exit code
        --check-err         Fail when the command writes to stderr
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    SHELL_RESULT_SHELL      Shell program (overrides config)
    SHELL_RESULT_CHECK_XC   Fail on non-zero exit code (true/false)
    SHELL_RESULT_CHECK_ERR  Fail on stderr output (true/false)
    SHELL_RESULT_LOG_LEVEL  Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXAMPLES:
    # Stream a command's output
    shell-result 'ls -la /tmp'

    # Treat a failing command as an error
    shell-result --check-xc 'make test'

    # Use another shell with an exported variable
    shell-result -s /bin/bash -e NAME=world 'echo "hello $NAME"'
"#
    );
}

/// Print version information.
pub fn print_version() {
    println!("shell-result {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => write!(f, "invalid value for {}: {}", name, value),
            Self::UnexpectedArgument(arg) => write!(f, "unexpected argument: {}", arg),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
