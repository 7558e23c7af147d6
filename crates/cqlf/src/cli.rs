//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the cqlf CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// cqlf - Parse CQL filter queries and apply them to JSON records
#[derive(Parser, Debug)]
#[command(name = "cqlf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Config file holding the record schema (default: from env/XDG config)
    #[arg(long, global = true, value_name = "PATH")]
    pub schema: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a query and print its filters
    #[command(alias = "p")]
    Parse {
        /// Filter query (e.g., "name LIKE 'a%' AND size>3")
        query: String,
    },

    /// Filter JSON records with a query
    #[command(alias = "f")]
    Filter {
        /// Filter query
        query: String,

        /// JSON file to read (default: stdin)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Input is an object of key -> array of records; keep whole keys
        #[arg(short, long)]
        grouped: bool,

        /// Fields to output, comma separated; prefix with '-' to drop a field
        #[arg(long, value_name = "FIELDS", allow_hyphen_values = true)]
        fields: Option<String>,
    },

    /// Group a query's values by operator, converted to the schema's types
    #[command(alias = "c")]
    Constraints {
        /// Filter query
        query: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Shells supported by the completions command
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Show config file path
    Path,

    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
