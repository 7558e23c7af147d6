//! Constraints command implementation.
//!
//! Converts a query against the configured schema and prints the values
//! grouped by operator, the form a data source would push down.

use std::path::Path;

use cql_filter::{Constraints, FilterParser, LiteralResolver};
use tracing::debug;

use super::config::load_schema;
use super::{CommandContext, Result};
use crate::output::{format_constraints_json, format_constraints_table};

/// Executes the constraints command.
///
/// # Errors
///
/// Returns an error if the config has no schema, the query does not parse,
/// or a filter does not fit the schema.
pub fn execute(ctx: &CommandContext, config_path: &Path, query: &str) -> Result<()> {
    let schema = load_schema(config_path)?;
    let filters = FilterParser::parse(query)?;
    let constraints = Constraints::group(&filters, &schema, &LiteralResolver::default())?;
    debug!(
        operators = constraints.filter_types().count(),
        "grouped constraints"
    );

    if ctx.json_output {
        let output = format_constraints_json(&constraints)?;
        println!("{output}");
    } else if !ctx.quiet {
        let output = format_constraints_table(&constraints, ctx.use_colors);
        print!("{output}");
    }

    Ok(())
}
