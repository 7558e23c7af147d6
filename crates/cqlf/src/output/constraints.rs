//! Grouped constraint output formatting.

use cql_filter::Constraints;
use owo_colors::OwoColorize;

use super::helpers::{format_values, header, truncate_str};

/// Formats constraints as JSON, keyed by operator.
pub fn format_constraints_json(constraints: &Constraints) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(constraints)
}

/// Formats constraints as a table, one row per filter.
pub fn format_constraints_table(constraints: &Constraints, use_colors: bool) -> String {
    if constraints.is_empty() {
        return "No constraints.\n".to_string();
    }

    let mut output = header(
        &format!("{:<12} {:<20} {}", "Operator", "Property", "Values"),
        use_colors,
    );

    for pattern in constraints.filter_types() {
        for constraint in constraints.get(pattern) {
            let name = format!("{:<12}", pattern.name());
            let name = if use_colors {
                name.cyan().to_string()
            } else {
                name
            };
            let property = truncate_str(constraint.property.as_str(), 20);
            output.push_str(&format!(
                "{} {:<20} {}\n",
                name,
                property,
                format_values(&constraint.values)
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use cql_filter::{FilterParser, LiteralResolver, Schema, Value, ValueType};

    struct Item;

    fn group(query: &str) -> Constraints {
        let schema = Schema::<Item>::new()
            .property("size", ValueType::Integer, |_| Value::Integer(0))
            .property("name", ValueType::Text, |_| Value::from(""));
        let filters = FilterParser::parse(query).unwrap();
        Constraints::group(&filters, &schema, &LiteralResolver::default()).unwrap()
    }

    #[test]
    fn test_format_constraints_json() {
        let constraints = group("size BETWEEN 1 AND 3 AND name='x'");
        let json = format_constraints_json(&constraints).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "EQUAL": [{"property": "name", "values": ["x"]}],
                "BETWEEN": [{"property": "size", "values": [1, 3]}],
            })
        );
    }

    #[test]
    fn test_format_constraints_table() {
        let constraints = group("size IN (1,2) AND name IS NULL");
        let table = format_constraints_table(&constraints, false);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("IN"));
        assert!(lines[1].ends_with("1, 2"));
        assert!(lines[2].starts_with("NULL"));
        assert!(lines[2].contains("name"));
    }

    #[test]
    fn test_format_empty_constraints() {
        assert_eq!(
            format_constraints_table(&Constraints::empty(), false),
            "No constraints.\n"
        );
    }
}
