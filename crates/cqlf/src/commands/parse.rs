//! Parse command implementation.
//!
//! Shows how a query splits into filters, without any schema.

use cql_filter::FilterParser;

use super::{CommandContext, Result};
use crate::output::{format_filters_json, format_filters_table};

/// Executes the parse command.
///
/// # Errors
///
/// Returns an error if the query is not a valid filter expression.
pub fn execute(ctx: &CommandContext, query: &str) -> Result<()> {
    let filters = FilterParser::parse(query)?;

    if ctx.json_output {
        let output = format_filters_json(query, &filters)?;
        println!("{output}");
    } else if !ctx.quiet {
        let output = format_filters_table(&filters, ctx.use_colors);
        print!("{output}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandError;

    fn context() -> CommandContext {
        CommandContext {
            json_output: false,
            use_colors: false,
            quiet: true,
        }
    }

    #[test]
    fn test_execute_valid_query() {
        assert!(execute(&context(), "a=1 AND b IS NULL").is_ok());
    }

    #[test]
    fn test_execute_reports_residue() {
        let err = execute(&context(), "a=1 OR b=2").unwrap_err();
        assert!(matches!(err, CommandError::Filter(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
