//! Parsed filter clauses.

use std::fmt;

use serde::Serialize;

use crate::error::{FilterError, FilterResult};
use crate::literal::Literal;
use crate::property::PropertyName;

/// How many literals an operator takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// `IS NULL`, `IS NOT NULL`.
    None,
    /// Comparisons, the LIKE family and `INTERSECTS`.
    Single,
    /// The BETWEEN family.
    Pair,
    /// The IN family, at least one value.
    Many,
}

impl Arity {
    /// Returns true if `count` literals are acceptable.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::None => count == 0,
            Arity::Single => count == 1,
            Arity::Pair => count == 2,
            Arity::Many => count >= 1,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Arity::None => "0",
            Arity::Single => "1",
            Arity::Pair => "2",
            Arity::Many => "1 or more",
        })
    }
}

/// Filter operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterType {
    Equal,
    NotEqual,
    Lt,
    Gt,
    Lte,
    Gte,
    Between,
    NotBetween,
    Like,
    NotLike,
    #[serde(rename = "ILIKE")]
    ILike,
    #[serde(rename = "NOT_ILIKE")]
    NotILike,
    In,
    NotIn,
    Null,
    NotNull,
    Intersects,
}

impl FilterType {
    /// Upper-case identifier, e.g. `NOT_BETWEEN`.
    pub fn name(self) -> &'static str {
        match self {
            FilterType::Equal => "EQUAL",
            FilterType::NotEqual => "NOT_EQUAL",
            FilterType::Lt => "LT",
            FilterType::Gt => "GT",
            FilterType::Lte => "LTE",
            FilterType::Gte => "GTE",
            FilterType::Between => "BETWEEN",
            FilterType::NotBetween => "NOT_BETWEEN",
            FilterType::Like => "LIKE",
            FilterType::NotLike => "NOT_LIKE",
            FilterType::ILike => "ILIKE",
            FilterType::NotILike => "NOT_ILIKE",
            FilterType::In => "IN",
            FilterType::NotIn => "NOT_IN",
            FilterType::Null => "NULL",
            FilterType::NotNull => "NOT_NULL",
            FilterType::Intersects => "INTERSECTS",
        }
    }

    /// The operator as written in a query.
    pub fn keyword(self) -> &'static str {
        match self {
            FilterType::Equal => "=",
            FilterType::NotEqual => "<>",
            FilterType::Lt => "<",
            FilterType::Gt => ">",
            FilterType::Lte => "<=",
            FilterType::Gte => ">=",
            FilterType::Between => "BETWEEN",
            FilterType::NotBetween => "NOT BETWEEN",
            FilterType::Like => "LIKE",
            FilterType::NotLike => "NOT LIKE",
            FilterType::ILike => "ILIKE",
            FilterType::NotILike => "NOT ILIKE",
            FilterType::In => "IN",
            FilterType::NotIn => "NOT IN",
            FilterType::Null => "IS NULL",
            FilterType::NotNull => "IS NOT NULL",
            FilterType::Intersects => "INTERSECTS",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            FilterType::Null | FilterType::NotNull => Arity::None,
            FilterType::Between | FilterType::NotBetween => Arity::Pair,
            FilterType::In | FilterType::NotIn => Arity::Many,
            _ => Arity::Single,
        }
    }

    pub fn is_spatial(self) -> bool {
        self == FilterType::Intersects
    }

    /// The LIKE family, whose value is a pattern string.
    pub fn is_pattern(self) -> bool {
        matches!(
            self,
            FilterType::Like | FilterType::NotLike | FilterType::ILike | FilterType::NotILike
        )
    }

    /// Single-operand comparisons written without spaces (`=`, `<>`, ...).
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            FilterType::Equal
                | FilterType::NotEqual
                | FilterType::Lt
                | FilterType::Gt
                | FilterType::Lte
                | FilterType::Gte
        )
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One `<property> <operator> <literals>` clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Filter {
    pattern: FilterType,
    property: PropertyName,
    values: Vec<Literal>,
}

impl Filter {
    /// Creates a filter.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidArity`] if the number of literals does
    /// not fit the operator.
    pub fn new(
        pattern: FilterType,
        property: impl Into<PropertyName>,
        values: Vec<Literal>,
    ) -> FilterResult<Self> {
        let arity = pattern.arity();
        if !arity.accepts(values.len()) {
            return Err(FilterError::InvalidArity {
                filter_type: pattern.name().to_string(),
                expected: arity.to_string(),
                actual: values.len(),
            });
        }
        Ok(Self {
            pattern,
            property: property.into(),
            values,
        })
    }

    pub fn pattern(&self) -> FilterType {
        self.pattern
    }

    pub fn property(&self) -> &PropertyName {
        &self.property
    }

    pub fn values(&self) -> &[Literal] {
        &self.values
    }
}

/// Renders the clause in query syntax.
impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let property = &self.property;
        let keyword = self.pattern.keyword();
        match self.pattern.arity() {
            Arity::None => write!(f, "{property} {keyword}"),
            Arity::Pair => write!(
                f,
                "{property} {keyword} {} AND {}",
                self.values[0], self.values[1]
            ),
            Arity::Many => {
                let values: Vec<String> = self.values.iter().map(ToString::to_string).collect();
                write!(f, "{property} {keyword} ({})", values.join(","))
            }
            Arity::Single if self.pattern.is_spatial() => {
                write!(f, "{keyword}({property},{})", self.values[0])
            }
            Arity::Single if self.pattern.is_pattern() => {
                let pattern = self.values[0].as_plain().unwrap_or_default();
                write!(f, "{property} {keyword} '{}'", pattern.replace('\'', "''"))
            }
            Arity::Single => write!(f, "{property}{keyword}{}", self.values[0]),
        }
    }
}

/// The ordered result of parsing one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// The `INTERSECTS` filters, in order.
    pub fn spatial_filters(&self) -> Vec<&Filter> {
        self.filters
            .iter()
            .filter(|f| f.pattern.is_spatial())
            .collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Filter> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn into_inner(self) -> Vec<Filter> {
        self.filters
    }
}

impl From<Vec<Filter>> for FilterSet {
    fn from(filters: Vec<Filter>) -> Self {
        Self { filters }
    }
}

impl<'a> IntoIterator for &'a FilterSet {
    type Item = &'a Filter;
    type IntoIter = std::slice::Iter<'a, Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.iter()
    }
}

/// Joins the clauses with ` AND `.
impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{filter}")?;
        }
        Ok(())
    }
}
