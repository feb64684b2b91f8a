//! Configuration management for shell-result.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::error::ShellResultError;
use crate::shell::{CheckPolicy, LocalShell, DEFAULT_SHELL};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shell configuration.
    pub shell: ShellSection,
    /// Error policy applied to finished commands.
    pub policy: CheckPolicy,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Shell configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSection {
    /// Shell program, invoked as `<program> -c <command>`.
    pub program: String,
    /// Environment variables exported to every command.
    pub env: HashMap<String, String>,
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            program: DEFAULT_SHELL.to_string(),
            env: HashMap::new(),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(program) = std::env::var("SHELL_RESULT_SHELL") {
            if !program.is_empty() {
                self.shell.program = program;
            }
        }

        if let Some(check) = env_flag("SHELL_RESULT_CHECK_XC") {
            self.policy.check_xc = check;
        }

        if let Some(check) = env_flag("SHELL_RESULT_CHECK_ERR") {
            self.policy.check_err = check;
        }

        if let Ok(level) = std::env::var("SHELL_RESULT_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref program) = args.shell {
            self.shell.program = program.clone();
        }

        for (key, value) in &args.env {
            self.shell.env.insert(key.clone(), value.clone());
        }

        if args.check_xc {
            self.policy.check_xc = true;
        }

        if args.check_err {
            self.policy.check_err = true;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Build the local shell described by this configuration.
    pub fn to_local_shell(&self) -> Result<LocalShell, ConfigError> {
        if self.shell.program.trim().is_empty() {
            return Err(ConfigError::InvalidShell(self.shell.program.clone()));
        }

        Ok(LocalShell::new()
            .program(self.shell.program.clone())
            .envs(self.shell.env.clone())
            .policy(self.policy))
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Empty or unusable shell program.
    InvalidShell(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidShell(program) => write!(f, "invalid shell program: '{}'", program),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for ShellResultError {
    fn from(e: ConfigError) -> Self {
        ShellResultError::Config(e.to_string())
    }
}
