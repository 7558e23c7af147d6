//! Command implementations for the cqlf CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod completions;
pub mod config;
pub mod constraints;
pub mod filter;
pub mod parse;

use cql_filter::{ErrorKind, FilterError};

use crate::cli::Cli;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Query parsing, resolution or conversion error.
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    /// Input records do not have the expected shape.
    #[error("invalid input: {0}")]
    Input(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CommandError {
    /// Returns the error code string for JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::Filter(e) => e.code(),
            CommandError::Input(_) => "INPUT_ERROR",
            CommandError::Config(_) => "CONFIG_ERROR",
            CommandError::Io(_) => "IO_ERROR",
            CommandError::Json(_) => "JSON_ERROR",
        }
    }

    /// Returns the process exit code.
    pub fn exit_code(&self) -> u8 {
        match self {
            CommandError::Filter(e) => match e.kind() {
                ErrorKind::Grammar => 1,
                ErrorKind::Resolution => 2,
                ErrorKind::Evaluation => 3,
            },
            CommandError::Input(_) | CommandError::Io(_) | CommandError::Json(_) => 4,
            CommandError::Config(_) => 5,
        }
    }
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color,
            quiet: cli.quiet,
        }
    }

    /// Applies the `color` preference from the config file.
    ///
    /// `--no-color` always wins.
    pub fn with_color_preference(mut self, color: Option<bool>) -> Self {
        if let Some(color) = color {
            self.use_colors &= color;
        }
        self
    }
}
