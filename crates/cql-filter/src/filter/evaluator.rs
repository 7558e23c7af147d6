//! In-memory filter evaluation.
//!
//! [`FilterEvaluator`] resolves every filter against a [`PropertyAccessor`]
//! once, converting its literals to the property's type, and then tests
//! objects against the compiled predicates.
//!
//! Value semantics:
//!
//! - optional values are unwrapped, and an undefined value fails every
//!   operator except `IS NULL`,
//! - a list value passes if any element passes ([`MatchAction::Any`]),
//! - `IS NULL` also holds for an empty list, nested lists counting as one,
//! - `INTERSECTS` is assumed to be applied by the data source and only its
//!   target property is checked.
//!
//! # Example
//!
//! ```
//! use cql_filter::{FilterEvaluator, FilterParser, LiteralResolver, Schema, Value, ValueType};
//!
//! struct Station { name: &'static str, platforms: Vec<i64> }
//!
//! let schema = Schema::<Station>::new()
//!     .property("name", ValueType::Text, |s| Value::from(s.name))
//!     .property("platforms", ValueType::Integer, |s| Value::from(s.platforms.clone()));
//!
//! let stations = vec![
//!     Station { name: "Pasila", platforms: vec![1, 2, 3] },
//!     Station { name: "Tikkurila", platforms: vec![1, 2] },
//! ];
//!
//! let filters = FilterParser::parse("platforms=3 AND name ILIKE 'p%'").unwrap();
//! let evaluator = FilterEvaluator::new(&filters, &schema, &LiteralResolver::default()).unwrap();
//! let matched = evaluator.apply(&stations);
//! assert_eq!(matched.len(), 1);
//! assert_eq!(matched[0].name, "Pasila");
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::Hash;

use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, trace};

use super::ast::{Filter, FilterSet, FilterType};
use crate::accessor::{self, Property, PropertyAccessor};
use crate::convert::LiteralResolver;
use crate::error::{FilterError, FilterResult};
use crate::function::Function;
use crate::literal::Literal;
use crate::value::{Value, ValueType};

/// How a predicate is reduced over the elements of a list value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchAction {
    /// At least one element passes.
    #[default]
    Any,
    /// Every element passes.
    All,
    /// Exactly one element passes.
    One,
}

impl MatchAction {
    /// Reduces `predicate` over `items`.
    pub fn test<I, F>(self, items: I, mut predicate: F) -> bool
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> bool,
    {
        let mut items = items.into_iter();
        match self {
            MatchAction::Any => items.any(predicate),
            MatchAction::All => items.all(predicate),
            MatchAction::One => {
                let mut passed = 0;
                for item in items {
                    if predicate(item) {
                        passed += 1;
                        if passed > 1 {
                            return false;
                        }
                    }
                }
                passed == 1
            }
        }
    }
}

/// A compiled operator with its converted operands.
#[derive(Debug)]
enum Predicate {
    Equal(Value),
    NotEqual(Value),
    Ordered(FilterType, Value),
    Between { lower: Value, upper: Value, negated: bool },
    Like { regex: Regex, negated: bool },
    In { values: Vec<Value>, negated: bool },
    Null,
    NotNull,
}

impl Predicate {
    fn test(&self, value: &Value) -> bool {
        match self {
            Predicate::Equal(expected) => same(value, expected),
            Predicate::NotEqual(expected) => !same(value, expected),
            Predicate::Ordered(pattern, bound) => {
                let Some(ordering) = value.compare(bound) else {
                    return false;
                };
                match pattern {
                    FilterType::Lt => ordering == Ordering::Less,
                    FilterType::Gt => ordering == Ordering::Greater,
                    FilterType::Lte => ordering != Ordering::Greater,
                    FilterType::Gte => ordering != Ordering::Less,
                    _ => false,
                }
            }
            Predicate::Between {
                lower,
                upper,
                negated,
            } => {
                let inside = matches!(
                    value.compare(lower),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(
                    value.compare(upper),
                    Some(Ordering::Less | Ordering::Equal)
                );
                inside != *negated
            }
            Predicate::Like { regex, negated } => {
                let matched = match value {
                    Value::Text(text) => regex.is_match(text),
                    other => regex.is_match(&other.to_string()),
                };
                matched != *negated
            }
            Predicate::In { values, negated } => {
                values.iter().any(|candidate| same(value, candidate)) != *negated
            }
            Predicate::Null | Predicate::NotNull => false,
        }
    }
}

fn same(a: &Value, b: &Value) -> bool {
    a.compare(b) == Some(Ordering::Equal)
}

/// Translates a `%` pattern into an anchored regex.
fn like_regex(pattern: &str, case_insensitive: bool) -> FilterResult<Regex> {
    let body = pattern
        .split('%')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    let flags = if case_insensitive { "(?i)" } else { "" };
    Regex::new(&format!("{flags}^{body}$")).map_err(|_| FilterError::invalid_literal(pattern))
}

struct CompiledFilter<'a, T> {
    clause: String,
    property: &'a Property<T>,
    function: Option<Function>,
    predicate: Predicate,
    action: MatchAction,
}

impl<T> CompiledFilter<'_, T> {
    fn test(&self, item: &T) -> bool {
        let Some(value) = self.property.get(item) else {
            return false;
        };
        match self.predicate {
            Predicate::Null => value.is_null_or_empty(),
            Predicate::NotNull => !value.is_null_or_empty(),
            _ => self.test_value(&value),
        }
    }

    fn test_value(&self, value: &Value) -> bool {
        match value.unwrap_optional() {
            None => false,
            Some(Value::List(items)) => self.action.test(items, |item| self.test_value(item)),
            Some(scalar) => match self.function {
                Some(function) => match function.apply(scalar.clone(), self.property.name()) {
                    Ok(applied) => self.predicate.test(&applied),
                    Err(err) => {
                        trace!(clause = %self.clause, error = %err, "function not applicable");
                        false
                    }
                },
                None => self.predicate.test(scalar),
            },
        }
    }
}

/// Applies a parsed [`FilterSet`] to objects of type `T`.
///
/// All filters must pass for an object to be kept. Output keeps input order.
pub struct FilterEvaluator<'a, T> {
    filters: Vec<CompiledFilter<'a, T>>,
}

impl<'a, T> FilterEvaluator<'a, T> {
    /// Compiles the filters against `accessor`.
    ///
    /// # Errors
    ///
    /// - [`FilterError::FilterPropertyNotFound`] for an unknown property,
    /// - [`FilterError::CannotFilterByResolvable`] for a resolvable property,
    /// - [`FilterError::SpatialFilteringRequiresGeometryProperty`] if an
    ///   `INTERSECTS` target is not a geometry,
    /// - function and conversion errors from the literals.
    pub fn new<A>(
        filters: &FilterSet,
        accessor: &'a A,
        resolver: &LiteralResolver,
    ) -> FilterResult<Self>
    where
        A: PropertyAccessor<T> + ?Sized,
    {
        let mut compiled = Vec::with_capacity(filters.len());

        for filter in filters {
            if filter.pattern().is_spatial() {
                accessor::require_geometry(accessor, filter.property())?;
                debug!(%filter, "spatial filter left to the data source");
                continue;
            }

            let resolved = accessor::resolve_property(accessor, filter.property())?;
            if resolved.property.is_resolvable() {
                return Err(FilterError::cannot_filter_by_resolvable(
                    resolved.property.name(),
                ));
            }

            let predicate = Self::compile(filter, resolved.target, resolver)?;
            debug!(%filter, target = %resolved.target, "compiled filter");
            compiled.push(CompiledFilter {
                clause: filter.to_string(),
                property: resolved.property,
                function: resolved.function,
                predicate,
                action: MatchAction::Any,
            });
        }

        Ok(Self { filters: compiled })
    }

    fn compile(
        filter: &Filter,
        target: ValueType,
        resolver: &LiteralResolver,
    ) -> FilterResult<Predicate> {
        let resolve = |literal: &Literal| resolver.resolve(literal, target);
        let predicate = match (filter.pattern(), filter.values()) {
            (FilterType::Equal, [value]) => Predicate::Equal(resolve(value)?),
            (FilterType::NotEqual, [value]) => Predicate::NotEqual(resolve(value)?),
            (
                pattern @ (FilterType::Lt | FilterType::Gt | FilterType::Lte | FilterType::Gte),
                [value],
            ) => Predicate::Ordered(pattern, resolve(value)?),
            (pattern @ (FilterType::Between | FilterType::NotBetween), [lower, upper]) => {
                Predicate::Between {
                    lower: resolve(lower)?,
                    upper: resolve(upper)?,
                    negated: pattern == FilterType::NotBetween,
                }
            }
            (pattern, [value]) if pattern.is_pattern() => {
                let text = value.as_plain().unwrap_or_default();
                let case_insensitive =
                    matches!(pattern, FilterType::ILike | FilterType::NotILike);
                Predicate::Like {
                    regex: like_regex(text, case_insensitive)?,
                    negated: matches!(pattern, FilterType::NotLike | FilterType::NotILike),
                }
            }
            (pattern @ (FilterType::In | FilterType::NotIn), values) if !values.is_empty() => {
                Predicate::In {
                    values: resolver.resolve_all(values, target)?,
                    negated: pattern == FilterType::NotIn,
                }
            }
            (FilterType::Null, []) => Predicate::Null,
            (FilterType::NotNull, []) => Predicate::NotNull,
            (pattern, values) => {
                return Err(FilterError::InvalidArity {
                    filter_type: pattern.name().to_string(),
                    expected: pattern.arity().to_string(),
                    actual: values.len(),
                })
            }
        };
        Ok(predicate)
    }

    /// Returns the number of filters evaluated in memory.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns true if every object passes.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns true if the object passes every filter.
    pub fn matches(&self, item: &T) -> bool {
        self.filters.iter().all(|filter| {
            let passed = filter.test(item);
            if !passed {
                trace!(clause = %filter.clause, "candidate rejected");
            }
            passed
        })
    }

    /// Returns the objects that pass, in input order.
    pub fn apply<'b>(&self, items: &'b [T]) -> Vec<&'b T> {
        items.iter().filter(|item| self.matches(item)).collect()
    }

    /// Returns the object if it passes.
    pub fn apply_one<'b>(&self, item: &'b T) -> Option<&'b T> {
        self.matches(item).then_some(item)
    }

    /// Keeps every key whose values include at least one passing object.
    ///
    /// Kept keys retain all of their values, in the input key order.
    pub fn apply_grouped<'b, K>(&self, groups: &'b IndexMap<K, Vec<T>>) -> IndexMap<&'b K, &'b [T]>
    where
        K: Hash + Eq,
    {
        groups
            .iter()
            .filter(|(_, items)| items.iter().any(|item| self.matches(item)))
            .map(|(key, items)| (key, items.as_slice()))
            .collect()
    }

    /// Same as [`apply_grouped`](Self::apply_grouped) for sorted maps.
    pub fn apply_sorted<'b, K>(&self, groups: &'b BTreeMap<K, Vec<T>>) -> BTreeMap<&'b K, &'b [T]>
    where
        K: Ord,
    {
        groups
            .iter()
            .filter(|(_, items)| items.iter().any(|item| self.matches(item)))
            .map(|(key, items)| (key, items.as_slice()))
            .collect()
    }
}

impl<T> std::fmt::Debug for FilterEvaluator<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.filters.iter().map(|filter| &filter.clause))
            .finish()
    }
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
