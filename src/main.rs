//! shell-result binary entry point.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use shell_result::cli::{self, Args};
use shell_result::config::Config;
use shell_result::{logging, LogSink, ShellResultError};
use tracing::{debug, error};

/// Echoes drained lines to the terminal as they arrive.
struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn stdout(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }

    fn stderr(&self, line: &str) {
        let _ = writeln!(std::io::stderr().lock(), "{}", line);
    }
}

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Try 'shell-result --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }

    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(code) => ExitCode::from(clamp_exit_code(code)),
        Err(ShellResultError::NonZeroExit { command, code }) => {
            error!("`{}` exited with code {}", command, code);
            ExitCode::from(clamp_exit_code(code))
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> shell_result::Result<i32> {
    let command = args
        .command
        .as_deref()
        .ok_or_else(|| ShellResultError::Config("no command given".to_string()))?;

    let config = Config::load(args)?;
    let _ = logging::try_init_with_filter(config.log_filter());
    debug!(?config, "configuration loaded");

    let shell = config.to_local_shell()?.sink(Arc::new(ConsoleSink));
    let mut result = shell.spawn(command)?;
    result.wait()?;
    shell.get_policy().check(&mut result)?;

    result.exit_code()
}

fn clamp_exit_code(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
