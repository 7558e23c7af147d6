//! Command dispatch module for routing CLI commands to their handlers.
//!
//! Commands split by whether they need the record schema from the config
//! file.

use std::path::{Path, PathBuf};

use crate::cli::{Cli, Commands, ConfigCommands, Shell};
use crate::commands::{self, CommandContext, CommandError, Result};

/// Trait for dispatched commands.
pub trait DispatchCommand {
    /// Execute the command with the resolved config file path.
    fn execute(&self, ctx: &CommandContext, config_path: &Path) -> Result<()>;
}

/// Commands that don't read the schema.
pub enum StandaloneDispatch<'a> {
    Parse { query: &'a str },
    Config(&'a Option<ConfigCommands>),
    Completions(&'a Shell),
    Help,
}

impl<'a> StandaloneDispatch<'a> {
    /// Returns None if the command needs the schema.
    pub fn try_from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Parse { query }) => Some(Self::Parse { query }),
            Some(Commands::Config { command }) => Some(Self::Config(command)),
            Some(Commands::Completions { shell }) => Some(Self::Completions(shell)),
            None => Some(Self::Help),
            _ => None,
        }
    }
}

impl DispatchCommand for StandaloneDispatch<'_> {
    fn execute(&self, ctx: &CommandContext, config_path: &Path) -> Result<()> {
        match self {
            Self::Parse { query } => commands::parse::execute(ctx, query),
            Self::Config(command) => dispatch_config(ctx, config_path, command),
            Self::Completions(shell) => {
                commands::completions::execute(shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("cqlf - CQL filter CLI");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

fn dispatch_config(
    ctx: &CommandContext,
    config_path: &Path,
    command: &Option<ConfigCommands>,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx, config_path),
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx, config_path),
        Some(ConfigCommands::Init { force }) => {
            commands::config::execute_init(ctx, config_path, *force)
        }
    }
}

/// Commands that need the record schema.
pub enum SchemaDispatch<'a> {
    Filter {
        query: &'a str,
        input: &'a Option<PathBuf>,
        grouped: bool,
        fields: &'a Option<String>,
    },
    Constraints {
        query: &'a str,
    },
}

impl<'a> SchemaDispatch<'a> {
    pub fn from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Filter {
                query,
                input,
                grouped,
                fields,
            }) => Some(Self::Filter {
                query,
                input,
                grouped: *grouped,
                fields,
            }),
            Some(Commands::Constraints { query }) => Some(Self::Constraints { query }),
            _ => None,
        }
    }
}

impl DispatchCommand for SchemaDispatch<'_> {
    fn execute(&self, ctx: &CommandContext, config_path: &Path) -> Result<()> {
        match self {
            Self::Filter {
                query,
                input,
                grouped,
                fields,
            } => {
                let opts = commands::filter::FilterOptions {
                    query: query.to_string(),
                    input: (*input).clone(),
                    grouped: *grouped,
                    fields: (*fields).clone(),
                };
                commands::filter::execute(ctx, config_path, &opts)
            }
            Self::Constraints { query } => commands::constraints::execute(ctx, config_path, query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_standalone_dispatch_parse() {
        let cli = Cli::parse_from(["cqlf", "parse", "a=1"]);
        let dispatch = StandaloneDispatch::try_from_cli(&cli);
        assert!(matches!(dispatch, Some(StandaloneDispatch::Parse { query: "a=1" })));
    }

    #[test]
    fn test_standalone_dispatch_config_show() {
        let cli = Cli::parse_from(["cqlf", "config", "show"]);
        let dispatch = StandaloneDispatch::try_from_cli(&cli);
        assert!(matches!(dispatch, Some(StandaloneDispatch::Config(_))));
    }

    #[test]
    fn test_standalone_dispatch_completions() {
        let cli = Cli::parse_from(["cqlf", "completions", "zsh"]);
        let dispatch = StandaloneDispatch::try_from_cli(&cli);
        assert!(matches!(dispatch, Some(StandaloneDispatch::Completions(_))));
    }

    #[test]
    fn test_standalone_dispatch_help() {
        let cli = Cli::parse_from(["cqlf"]);
        let dispatch = StandaloneDispatch::try_from_cli(&cli);
        assert!(matches!(dispatch, Some(StandaloneDispatch::Help)));
    }

    #[test]
    fn test_standalone_dispatch_returns_none_for_filter() {
        let cli = Cli::parse_from(["cqlf", "filter", "a=1"]);
        assert!(StandaloneDispatch::try_from_cli(&cli).is_none());
    }

    #[test]
    fn test_schema_dispatch_filter() {
        let cli = Cli::parse_from(["cqlf", "filter", "a=1", "-g", "--fields", "-b"]);
        let dispatch = SchemaDispatch::from_cli(&cli);
        assert!(matches!(
            dispatch,
            Some(SchemaDispatch::Filter { grouped: true, .. })
        ));
    }

    #[test]
    fn test_schema_dispatch_constraints() {
        let cli = Cli::parse_from(["cqlf", "constraints", "a=1"]);
        let dispatch = SchemaDispatch::from_cli(&cli);
        assert!(matches!(
            dispatch,
            Some(SchemaDispatch::Constraints { query: "a=1" })
        ));
    }

    #[test]
    fn test_schema_dispatch_returns_none_for_parse() {
        let cli = Cli::parse_from(["cqlf", "parse", "a=1"]);
        assert!(SchemaDispatch::from_cli(&cli).is_none());
    }
}
