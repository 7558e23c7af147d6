//! Parser and in-memory evaluator for a subset of CQL/ECQL filter queries.
//!
//! Queries such as
//!
//! ```text
//! name ILIKE 'pasila%' AND capacity>=10 AND INTERSECTS(geom,POLYGON((0 0, 1 1, 1 0, 0 0)))
//! ```
//!
//! are parsed into a [`FilterSet`] by [`FilterParser`]. A filter set can then be
//!
//! - grouped by operator into [`Constraints`] for a data source that applies
//!   filters itself, or
//! - compiled into a [`FilterEvaluator`] that tests objects in memory.
//!
//! Both need a [`PropertyAccessor`] to map property paths to types and
//! getters, and a [`LiteralResolver`] to turn literals into typed [`Value`]s.
//!
//! # Example
//!
//! ```
//! use cql_filter::{
//!     Constraints, FilterEvaluator, FilterParser, LiteralResolver, Schema, Value, ValueType,
//! };
//!
//! struct Train { number: i64, operator: &'static str }
//!
//! let schema = Schema::<Train>::new()
//!     .property("number", ValueType::Integer, |t| Value::Integer(t.number))
//!     .property("operator", ValueType::Text, |t| Value::from(t.operator));
//! let resolver = LiteralResolver::default();
//!
//! let filters = FilterParser::parse("number BETWEEN 1 AND 100 AND operator='VR'").unwrap();
//!
//! let constraints = Constraints::group(&filters, &schema, &resolver).unwrap();
//! assert_eq!(constraints.equal("operator"), vec![&Value::from("VR")]);
//!
//! let trains = vec![
//!     Train { number: 42, operator: "VR" },
//!     Train { number: 420, operator: "VR" },
//! ];
//! let evaluator = FilterEvaluator::new(&filters, &schema, &resolver).unwrap();
//! assert_eq!(evaluator.apply(&trains).len(), 1);
//! ```

pub mod accessor;
pub mod convert;
pub mod error;
pub mod filter;
pub mod function;
mod grammar;
pub mod literal;
pub mod property;
pub mod value;

pub use accessor::{Property, PropertyAccessor, PropertyKind, Schema};
pub use convert::{Arithmetic, Converter, LiteralResolver, StandardArithmetic, TextConverter};
pub use error::{ErrorKind, FilterError, FilterResult};
pub use filter::{
    Constraint, Constraints, Filter, FilterEvaluator, FilterParser, FilterSet, FilterType,
    MatchAction, SUPPORTED_OPERATIONS,
};
pub use function::Function;
pub use literal::{Literal, Operator};
pub use property::PropertyName;
pub use value::{Interval, IsoDuration, Value, ValueType};
