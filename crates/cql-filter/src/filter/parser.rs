//! Clause-pattern parser for filter queries.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use super::ast::{Filter, FilterSet, FilterType};
use super::wkt;
use crate::error::{FilterError, FilterResult};
use crate::grammar;
use crate::literal::{strip_quotes, Literal};

/// Separator between clauses, also appended to the query as a sentinel.
const AND: &str = " AND ";

/// Every operator, in the order the parser scans for them.
///
/// Comparisons come first, then ranges, patterns, lists, null checks and
/// finally the spatial operator. Filters of one operator keep their textual
/// order, but the output is grouped by this order, not by position in the
/// query.
pub const SUPPORTED_OPERATIONS: [FilterType; 17] = [
    FilterType::Equal,
    FilterType::NotEqual,
    FilterType::Lt,
    FilterType::Gt,
    FilterType::Lte,
    FilterType::Gte,
    FilterType::Between,
    FilterType::NotBetween,
    FilterType::Like,
    FilterType::NotLike,
    FilterType::ILike,
    FilterType::NotILike,
    FilterType::In,
    FilterType::NotIn,
    FilterType::Null,
    FilterType::NotNull,
    FilterType::Intersects,
];

static CLAUSES: LazyLock<Vec<(FilterType, Regex)>> = LazyLock::new(|| {
    SUPPORTED_OPERATIONS
        .iter()
        .map(|&pattern| {
            let regex = Regex::new(&clause_pattern(pattern)).expect("clause pattern is valid");
            (pattern, regex)
        })
        .collect()
});

static LIST_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("(?P<element>{}),", grammar::literal()))
        .expect("list element pattern is valid")
});

fn clause_pattern(pattern: FilterType) -> String {
    let property = format!("(?P<property>{})", grammar::attribute());
    let literal = grammar::literal();
    let like = format!("(?P<pattern>{})", grammar::STRING);
    match pattern {
        FilterType::Equal
        | FilterType::NotEqual
        | FilterType::Lt
        | FilterType::Gt
        | FilterType::Lte
        | FilterType::Gte => {
            format!("{property}{}(?P<value>{literal}){AND}", pattern.keyword())
        }
        FilterType::Between | FilterType::NotBetween => format!(
            "{property} {} (?P<lower>{literal}){AND}(?P<upper>{literal}){AND}",
            pattern.keyword()
        ),
        FilterType::Like | FilterType::NotLike | FilterType::ILike | FilterType::NotILike => {
            format!("{property} {} {like}{AND}", pattern.keyword())
        }
        FilterType::In | FilterType::NotIn => format!(
            r"{property} {} \((?P<values>{literal}(?:,{literal})*)\){AND}",
            pattern.keyword()
        ),
        FilterType::Null | FilterType::NotNull => {
            format!("{property} {}{AND}", pattern.keyword())
        }
        FilterType::Intersects => format!(
            r"INTERSECTS\({property},(?P<polygon>{})\){AND}",
            grammar::POLYGON
        ),
    }
}

/// Parser for filter queries.
///
/// A query is a conjunction of clauses joined by ` AND `:
///
/// ```text
/// query   ::= clause (" AND " clause)*
/// clause  ::= attr ("=" | "<>" | "<" | ">" | "<=" | ">=") literal
///           | attr " " ["NOT "] "BETWEEN " literal " AND " literal
///           | attr " " ["NOT "] ("LIKE" | "ILIKE") " " string
///           | attr " " ["NOT "] "IN (" literal ("," literal)* ")"
///           | attr " IS " ["NOT "] "NULL"
///           | "INTERSECTS(" attr "," polygon ")"
/// attr    ::= [a-z][a-zA-Z0-9_.]* | name "(" [a-z][a-zA-Z0-9_.]* ")"
/// ```
///
/// Each operator is recognised by its own pattern. The parser runs the
/// patterns in [`SUPPORTED_OPERATIONS`] order, removing what each one matched
/// before running the next. Text left over at the end is an error.
///
/// # Example
///
/// ```
/// use cql_filter::{FilterParser, FilterType};
///
/// let filters = FilterParser::parse("name LIKE '%station%' AND capacity>=10").unwrap();
/// assert_eq!(filters.len(), 2);
/// // Comparisons are scanned before patterns.
/// assert_eq!(filters.filters()[0].pattern(), FilterType::Gte);
/// assert_eq!(filters.filters()[1].pattern(), FilterType::Like);
/// ```
pub struct FilterParser;

impl FilterParser {
    /// Parses a query into its filters.
    ///
    /// A blank query has no filters.
    ///
    /// # Errors
    ///
    /// - [`FilterError::IllegalFilter`] if part of the query is not a clause,
    /// - [`FilterError::InvalidLiteral`] for a malformed literal,
    /// - the polygon errors of [`wkt::check_polygon`] for `INTERSECTS`.
    pub fn parse(query: &str) -> FilterResult<FilterSet> {
        if query.trim().is_empty() {
            return Ok(FilterSet::new());
        }

        let mut remaining = format!("{query}{AND}");
        let mut filters = Vec::new();

        for (pattern, regex) in CLAUSES.iter() {
            for caps in regex.captures_iter(&remaining) {
                let filter = Self::build(*pattern, &caps)?;
                debug!(%filter, "parsed clause");
                filters.push(filter);
            }
            remaining = regex.replace_all(&remaining, "").into_owned();
        }

        // Every clause consumes its own ` AND `, the appended one included, so
        // a well-formed query leaves nothing behind.
        if !remaining.trim().is_empty() {
            let residue = match remaining.strip_suffix(AND).map(str::trim) {
                Some(stripped) if !stripped.is_empty() => stripped,
                _ => remaining.trim(),
            };
            return Err(FilterError::IllegalFilter {
                residue: residue.to_string(),
            });
        }

        Ok(FilterSet::from(filters))
    }

    fn build(pattern: FilterType, caps: &Captures<'_>) -> FilterResult<Filter> {
        let property = &caps["property"];
        let values = match pattern {
            FilterType::Equal
            | FilterType::NotEqual
            | FilterType::Lt
            | FilterType::Gt
            | FilterType::Lte
            | FilterType::Gte => vec![Literal::classify(&caps["value"])?],
            FilterType::Between | FilterType::NotBetween => vec![
                Literal::classify(&caps["lower"])?,
                Literal::classify(&caps["upper"])?,
            ],
            FilterType::Like | FilterType::NotLike | FilterType::ILike | FilterType::NotILike => {
                vec![Literal::plain(strip_quotes(&caps["pattern"]))]
            }
            FilterType::In | FilterType::NotIn => Self::list(&caps["values"])?,
            FilterType::Null | FilterType::NotNull => Vec::new(),
            FilterType::Intersects => {
                let polygon = &caps["polygon"];
                wkt::check_polygon(polygon)?;
                vec![Literal::plain(polygon)]
            }
        };
        Filter::new(pattern, property, values)
    }

    fn list(values: &str) -> FilterResult<Vec<Literal>> {
        let terminated = format!("{values},");
        LIST_ELEMENT
            .captures_iter(&terminated)
            .map(|caps| Literal::classify(&caps["element"]))
            .collect()
    }
}
