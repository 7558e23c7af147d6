//! Common helper functions for output formatting.

use cql_filter::Value;
use owo_colors::OwoColorize;

/// Truncates a string to a maximum number of characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Formats a table header line, dimmed when colors are on.
pub fn header(text: &str, use_colors: bool) -> String {
    if use_colors {
        format!("{}\n", text.dimmed())
    } else {
        format!("{text}\n")
    }
}

/// Formats converted values as a comma separated list.
pub fn format_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> String {
    values
        .into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
