use clap::Parser;
use std::process::ExitCode;
use tracing::Level;

mod cli;
mod commands;
mod dispatch;
mod output;
mod projection;
mod record;

use cli::Cli;
use commands::config::{get_config_path, load_config};
use commands::CommandContext;
use dispatch::{DispatchCommand, SchemaDispatch, StandaloneDispatch};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": e.code(),
                        "message": e.to_string(),
                    }
                });
                match serde_json::to_string_pretty(&error_json) {
                    Ok(text) => eprintln!("{text}"),
                    Err(_) => eprintln!("Error: {e}"),
                }
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(e.exit_code())
        }
    }
}

/// Sends diagnostics to stderr so stdout stays parseable.
fn init_tracing(cli: &Cli) {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .init();
}

fn run(cli: &Cli) -> commands::Result<()> {
    let config_path = get_config_path(cli.schema.as_deref())?;
    let ctx = CommandContext::from_cli(cli).with_color_preference(color_preference(&config_path));

    if let Some(dispatch) = StandaloneDispatch::try_from_cli(cli) {
        return dispatch.execute(&ctx, &config_path);
    }

    if let Some(dispatch) = SchemaDispatch::from_cli(cli) {
        return dispatch.execute(&ctx, &config_path);
    }

    Ok(())
}

/// Reads `output.color` from the config. A broken file is ignored here and
/// reported by the commands that need it.
fn color_preference(path: &std::path::Path) -> Option<bool> {
    load_config(path).ok().and_then(|config| config.output.color)
}
