//! Matching record output formatting.

use indexmap::IndexMap;
use owo_colors::OwoColorize;
use serde_json::Value as Json;

/// Formats matching records as a JSON array.
pub fn format_records_json(records: &[Json]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// Formats grouped matching records as a JSON object of arrays.
pub fn format_groups_json(groups: &IndexMap<&str, Vec<Json>>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(groups)
}

/// Formats matching records one per line, followed by a count.
pub fn format_records_table(records: &[Json], use_colors: bool) -> String {
    let mut output = String::new();
    for record in records {
        output.push_str(&record.to_string());
        output.push('\n');
    }
    output.push_str(&count_line(records.len(), use_colors));
    output
}

/// Formats grouped matching records with a heading per group.
pub fn format_groups_table(groups: &IndexMap<&str, Vec<Json>>, use_colors: bool) -> String {
    let mut output = String::new();
    for (key, records) in groups {
        if use_colors {
            output.push_str(&format!("{}\n", key.bold()));
        } else {
            output.push_str(&format!("{key}\n"));
        }
        for record in records {
            output.push_str(&format!("  {record}\n"));
        }
    }

    let total: usize = groups.values().map(Vec::len).sum();
    output.push_str(&count_line(total, use_colors));
    output
}

fn count_line(count: usize, use_colors: bool) -> String {
    let noun = if count == 1 { "record" } else { "records" };
    let line = format!("{count} matching {noun}");
    if use_colors {
        format!("{}\n", line.dimmed())
    } else {
        format!("{line}\n")
    }
}
