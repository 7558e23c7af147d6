//! Filter command implementation.
//!
//! Reads JSON records, keeps the ones every filter accepts, and prints them.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use cql_filter::{FilterEvaluator, FilterParser, LiteralResolver, Schema};
use indexmap::IndexMap;
use serde_json::Value as Json;
use tracing::debug;

use super::config::load_schema;
use super::{CommandContext, CommandError, Result};
use crate::output::{
    format_groups_json, format_groups_table, format_records_json, format_records_table,
};
use crate::projection::Projection;
use crate::record::Record;

/// Options for the filter command.
#[derive(Debug, Default)]
pub struct FilterOptions {
    /// The filter query.
    pub query: String,
    /// Input file; stdin when absent or `-`.
    pub input: Option<PathBuf>,
    /// Input is an object of key to record array.
    pub grouped: bool,
    /// Output projection.
    pub fields: Option<String>,
}

/// Records read from the input.
#[derive(Debug, PartialEq)]
pub enum Input {
    Records(Vec<Record>),
    Groups(IndexMap<String, Vec<Record>>),
}

/// Executes the filter command.
///
/// # Errors
///
/// Returns an error if the config has no schema, the input cannot be read or
/// has the wrong shape, or the query does not fit the schema.
pub fn execute(ctx: &CommandContext, config_path: &Path, opts: &FilterOptions) -> Result<()> {
    let schema = load_schema(config_path)?;
    let text = read_input(opts.input.as_deref())?;
    let input = parse_input(&text, opts.grouped)?;
    let projection = opts
        .fields
        .as_deref()
        .map(Projection::parse)
        .unwrap_or_default();

    match input {
        Input::Records(records) => {
            let kept = filter_records(&schema, &opts.query, &records)?;
            let kept: Vec<Json> = kept.into_iter().map(|r| projection.apply(r)).collect();

            if ctx.json_output {
                println!("{}", format_records_json(&kept)?);
            } else if !ctx.quiet {
                print!("{}", format_records_table(&kept, ctx.use_colors));
            }
        }
        Input::Groups(groups) => {
            let kept = filter_groups(&schema, &opts.query, &groups)?;
            let kept: IndexMap<&str, Vec<Json>> = kept
                .into_iter()
                .map(|(key, records)| {
                    let records: Vec<Json> = records.iter().map(|r| projection.apply(r)).collect();
                    (key.as_str(), records)
                })
                .collect();

            if ctx.json_output {
                println!("{}", format_groups_json(&kept)?);
            } else if !ctx.quiet {
                print!("{}", format_groups_table(&kept, ctx.use_colors));
            }
        }
    }

    Ok(())
}

/// Applies the query to a list of records.
pub fn filter_records<'a>(
    schema: &Schema<Record>,
    query: &str,
    records: &'a [Record],
) -> Result<Vec<&'a Record>> {
    let filters = FilterParser::parse(query)?;
    let resolver = LiteralResolver::default();
    let evaluator = FilterEvaluator::new(&filters, schema, &resolver)?;

    let kept = evaluator.apply(records);
    debug!(total = records.len(), kept = kept.len(), "filtered records");
    Ok(kept)
}

/// Applies the query to grouped records, keeping groups with any match.
pub fn filter_groups<'a>(
    schema: &Schema<Record>,
    query: &str,
    groups: &'a IndexMap<String, Vec<Record>>,
) -> Result<IndexMap<&'a String, &'a [Record]>> {
    let filters = FilterParser::parse(query)?;
    let resolver = LiteralResolver::default();
    let evaluator = FilterEvaluator::new(&filters, schema, &resolver)?;

    let kept = evaluator.apply_grouped(groups);
    debug!(total = groups.len(), kept = kept.len(), "filtered groups");
    Ok(kept)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            debug!(path = %path.display(), "reading records");
            Ok(fs::read_to_string(path)?)
        }
        _ => {
            debug!("reading records from stdin");
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Parses the input text into records of the expected shape.
pub fn parse_input(text: &str, grouped: bool) -> Result<Input> {
    let json: Json = serde_json::from_str(text)?;

    if grouped {
        let Json::Object(map) = json else {
            return Err(CommandError::Input(
                "expected an object of arrays with --grouped".to_string(),
            ));
        };
        let mut groups = IndexMap::with_capacity(map.len());
        for (key, value) in map {
            match value {
                Json::Array(records) => {
                    groups.insert(key, records);
                }
                _ => {
                    return Err(CommandError::Input(format!(
                        "group '{key}' is not an array"
                    )))
                }
            }
        }
        Ok(Input::Groups(groups))
    } else {
        match json {
            Json::Array(records) => Ok(Input::Records(records)),
            _ => Err(CommandError::Input(
                "expected an array of records (use --grouped for an object)".to_string(),
            )),
        }
    }
}
