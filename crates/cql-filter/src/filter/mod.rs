//! Filter query parser, constraint grouping and in-memory evaluation.
//!
//! A query is a conjunction of clauses. Each clause names a property and
//! compares it against one or more literals.
//!
//! # Supported Syntax
//!
//! ## Comparisons
//! - `p=v`, `p<>v`, `p<v`, `p>v`, `p<=v`, `p>=v`
//!
//! ## Ranges
//! - `p BETWEEN a AND b` - Inclusive on both ends
//! - `p NOT BETWEEN a AND b`
//!
//! ## Patterns
//! - `p LIKE 'x%'` - `%` matches any run of characters
//! - `p NOT LIKE 'x%'`
//! - `p ILIKE 'x%'`, `p NOT ILIKE 'x%'` - Case-insensitive
//!
//! ## Lists
//! - `p IN (a,b,c)`, `p NOT IN (a,b,c)`
//!
//! ## Null checks
//! - `p IS NULL`, `p IS NOT NULL`
//!
//! ## Spatial
//! - `INTERSECTS(p,POLYGON((x y,x y,...,x y)))`
//!
//! ## Literals
//! - `'text'` with `''` for a quote, numbers, `true`/`false`
//! - ISO-8601 instants (`2020-01-01T00:00:00Z`), durations (`P1DT2H`) and
//!   intervals (`2020-01-01T00:00:00Z/P1D`)
//! - function calls (`end(2020-01-01T00:00:00Z/P1D)`)
//! - a single `+ - * /` between two of the above
//!
//! A property may be wrapped in a function: `round(price)=3`.
//!
//! # Example
//!
//! ```
//! use cql_filter::filter::{FilterParser, FilterType};
//!
//! let filters = FilterParser::parse("name IS NOT NULL AND price BETWEEN 1 AND 5").unwrap();
//! let types: Vec<FilterType> = filters.iter().map(|f| f.pattern()).collect();
//! assert_eq!(types, vec![FilterType::Between, FilterType::NotNull]);
//! ```

mod ast;
mod constraints;
mod evaluator;
mod parser;
pub mod wkt;

pub use ast::{Arity, Filter, FilterSet, FilterType};
pub use constraints::{Constraint, Constraints};
pub use evaluator::{FilterEvaluator, MatchAction};
pub use parser::{FilterParser, SUPPORTED_OPERATIONS};
