//! Parsed filter output formatting.

use cql_filter::{Filter, FilterSet, FilterType};
use owo_colors::OwoColorize;
use serde::Serialize;

use super::helpers::{header, truncate_str};

/// JSON output structure for the parse command.
#[derive(Serialize)]
pub struct ParseOutput<'a> {
    pub query: &'a str,
    pub normalized: String,
    pub filters: Vec<FilterOutput<'a>>,
}

/// JSON output structure for a single filter.
#[derive(Serialize)]
pub struct FilterOutput<'a> {
    pub pattern: FilterType,
    pub property: &'a str,
    pub values: Vec<String>,
    pub clause: String,
}

impl<'a> From<&'a Filter> for FilterOutput<'a> {
    fn from(filter: &'a Filter) -> Self {
        Self {
            pattern: filter.pattern(),
            property: filter.property().as_str(),
            values: filter.values().iter().map(ToString::to_string).collect(),
            clause: filter.to_string(),
        }
    }
}

/// Formats parsed filters as JSON.
pub fn format_filters_json(query: &str, filters: &FilterSet) -> Result<String, serde_json::Error> {
    let output = ParseOutput {
        query,
        normalized: filters.to_string(),
        filters: filters.iter().map(FilterOutput::from).collect(),
    };

    serde_json::to_string_pretty(&output)
}

/// Formats parsed filters as a table.
pub fn format_filters_table(filters: &FilterSet, use_colors: bool) -> String {
    if filters.is_empty() {
        return "No filters.\n".to_string();
    }

    let mut output = header(
        &format!("{:<12} {:<20} {}", "Operator", "Property", "Values"),
        use_colors,
    );

    for filter in filters {
        let pattern = format!("{:<12}", filter.pattern().name());
        let pattern = if use_colors {
            pattern.cyan().to_string()
        } else {
            pattern
        };
        let property = truncate_str(filter.property().as_str(), 20);
        let values: Vec<String> = filter.values().iter().map(ToString::to_string).collect();

        output.push_str(&format!("{} {:<20} {}\n", pattern, property, values.join(", ")));
    }

    output
}
