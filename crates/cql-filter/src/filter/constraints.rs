//! Filters grouped by operator and property, for pushing down to a store.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use super::ast::{FilterSet, FilterType};
use crate::accessor::{self, PropertyAccessor};
use crate::convert::LiteralResolver;
use crate::error::FilterResult;
use crate::property::PropertyName;
use crate::value::Value;

/// One filter's converted values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constraint {
    pub property: PropertyName,
    pub values: Vec<Value>,
}

/// Converted filters grouped by operator, in parse order.
///
/// Spatial filters are checked but not recorded: the data source is expected
/// to apply them itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Constraints {
    buckets: IndexMap<FilterType, Vec<Constraint>>,
}

impl Constraints {
    /// Constraints with no filters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolves and converts every filter in the set.
    ///
    /// Each value is converted to the declared type of its property, or to
    /// the result type of the function wrapped around it. LIKE patterns stay
    /// text.
    ///
    /// # Errors
    ///
    /// Fails on the first filter whose property is unknown, whose function
    /// does not apply, whose spatial target is not a geometry, or whose
    /// literal cannot be converted.
    pub fn group<T, A>(
        filters: &FilterSet,
        accessor: &A,
        resolver: &LiteralResolver,
    ) -> FilterResult<Self>
    where
        A: PropertyAccessor<T> + ?Sized,
    {
        let mut buckets: IndexMap<FilterType, Vec<Constraint>> = IndexMap::new();

        for filter in filters {
            if filter.pattern().is_spatial() {
                accessor::require_geometry(accessor, filter.property())?;
                continue;
            }

            let resolved = accessor::resolve_property(accessor, filter.property())?;
            let values = if filter.pattern().is_pattern() {
                filter
                    .values()
                    .iter()
                    .filter_map(|literal| literal.as_plain())
                    .map(Value::from)
                    .collect()
            } else {
                resolver.resolve_all(filter.values(), resolved.target)?
            };

            debug!(
                pattern = %filter.pattern(),
                property = %filter.property(),
                target = %resolved.target,
                "grouped constraint"
            );
            buckets.entry(filter.pattern()).or_default().push(Constraint {
                property: filter.property().clone(),
                values,
            });
        }

        Ok(Self { buckets })
    }

    /// Returns true if no filters were recorded.
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    /// Operators that have at least one constraint, in first-seen order.
    pub fn filter_types(&self) -> impl Iterator<Item = FilterType> + '_ {
        self.buckets.keys().copied()
    }

    /// All constraints recorded for an operator.
    pub fn get(&self, pattern: FilterType) -> &[Constraint] {
        self.buckets.get(&pattern).map(Vec::as_slice).unwrap_or_default()
    }

    fn values_for(&self, pattern: FilterType, property: &str) -> Vec<&[Value]> {
        self.get(pattern)
            .iter()
            .filter(|c| c.property.as_str() == property)
            .map(|c| c.values.as_slice())
            .collect()
    }

    fn single(&self, pattern: FilterType, property: &str) -> Vec<&Value> {
        self.values_for(pattern, property)
            .into_iter()
            .filter_map(<[Value]>::first)
            .collect()
    }

    fn pair(&self, pattern: FilterType, property: &str) -> Vec<(&Value, &Value)> {
        self.values_for(pattern, property)
            .into_iter()
            .filter_map(|values| match values {
                [lower, upper] => Some((lower, upper)),
                _ => None,
            })
            .collect()
    }

    fn text(&self, pattern: FilterType, property: &str) -> Vec<&str> {
        self.single(pattern, property)
            .into_iter()
            .filter_map(Value::as_text)
            .collect()
    }

    pub fn equal(&self, property: &str) -> Vec<&Value> {
        self.single(FilterType::Equal, property)
    }

    pub fn not_equal(&self, property: &str) -> Vec<&Value> {
        self.single(FilterType::NotEqual, property)
    }

    pub fn lt(&self, property: &str) -> Vec<&Value> {
        self.single(FilterType::Lt, property)
    }

    pub fn gt(&self, property: &str) -> Vec<&Value> {
        self.single(FilterType::Gt, property)
    }

    pub fn lte(&self, property: &str) -> Vec<&Value> {
        self.single(FilterType::Lte, property)
    }

    pub fn gte(&self, property: &str) -> Vec<&Value> {
        self.single(FilterType::Gte, property)
    }

    /// Inclusive `(lower, upper)` bounds.
    pub fn between(&self, property: &str) -> Vec<(&Value, &Value)> {
        self.pair(FilterType::Between, property)
    }

    pub fn not_between(&self, property: &str) -> Vec<(&Value, &Value)> {
        self.pair(FilterType::NotBetween, property)
    }

    /// Raw `%` patterns.
    pub fn like(&self, property: &str) -> Vec<&str> {
        self.text(FilterType::Like, property)
    }

    pub fn not_like(&self, property: &str) -> Vec<&str> {
        self.text(FilterType::NotLike, property)
    }

    pub fn ilike(&self, property: &str) -> Vec<&str> {
        self.text(FilterType::ILike, property)
    }

    pub fn not_ilike(&self, property: &str) -> Vec<&str> {
        self.text(FilterType::NotILike, property)
    }

    /// One value set per `IN` filter.
    pub fn in_(&self, property: &str) -> Vec<&[Value]> {
        self.values_for(FilterType::In, property)
    }

    pub fn not_in(&self, property: &str) -> Vec<&[Value]> {
        self.values_for(FilterType::NotIn, property)
    }

    pub fn is_null(&self, property: &str) -> bool {
        !self.values_for(FilterType::Null, property).is_empty()
    }

    pub fn is_not_null(&self, property: &str) -> bool {
        !self.values_for(FilterType::NotNull, property).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Schema;
    use crate::error::FilterError;
    use crate::filter::FilterParser;
    use crate::value::ValueType;

    struct Row;

    fn schema() -> Schema<Row> {
        Schema::new()
            .property("name", ValueType::Text, |_| Value::from("x"))
            .property("count", ValueType::Integer, |_| Value::Integer(0))
            .property("price", ValueType::Decimal, |_| Value::Decimal(0.0))
            .geometry("geom", |_| Value::Geometry(String::new()))
    }

    fn group(query: &str) -> FilterResult<Constraints> {
        let filters = FilterParser::parse(query)?;
        Constraints::group(&filters, &schema(), &LiteralResolver::default())
    }

    #[test]
    fn test_empty() {
        assert!(Constraints::empty().is_empty());
        assert!(group("").unwrap().is_empty());
    }

    #[test]
    fn test_values_are_converted_to_property_type() {
        let constraints = group("count=1 AND count=2 AND price>1").unwrap();
        assert_eq!(
            constraints.equal("count"),
            vec![&Value::Integer(1), &Value::Integer(2)]
        );
        assert_eq!(constraints.gt("price"), vec![&Value::Decimal(1.0)]);
        assert!(constraints.lt("price").is_empty());
    }

    #[test]
    fn test_between_in_and_null() {
        let constraints =
            group("count BETWEEN 1 AND 5 AND count IN (1,2,3) AND name IS NULL").unwrap();
        assert_eq!(
            constraints.between("count"),
            vec![(&Value::Integer(1), &Value::Integer(5))]
        );
        assert_eq!(constraints.in_("count")[0].len(), 3);
        assert!(constraints.is_null("name"));
        assert!(!constraints.is_not_null("name"));
    }

    #[test]
    fn test_like_stays_text() {
        let constraints = group("count LIKE '1%'").unwrap();
        assert_eq!(constraints.like("count"), vec!["1%"]);
    }

    #[test]
    fn test_spatial_filters_are_not_grouped() {
        let constraints = group("INTERSECTS(geom,POLYGON((0 0,1 1,0 0)))").unwrap();
        assert!(constraints.is_empty());

        assert!(matches!(
            group("INTERSECTS(name,POLYGON((0 0,1 1,0 0)))"),
            Err(FilterError::SpatialFilteringRequiresGeometryProperty { .. })
        ));
    }

    #[test]
    fn test_function_wrapped_property_is_its_own_key() {
        let constraints = group("round(price)=2").unwrap();
        assert_eq!(constraints.equal("round(price)"), vec![&Value::Decimal(2.0)]);
        assert!(constraints.equal("price").is_empty());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            group("nmae='x'"),
            Err(FilterError::FilterPropertyNotFound { .. })
        ));
        assert!(matches!(
            group("count='x'"),
            Err(FilterError::Conversion { .. })
        ));
        assert!(matches!(
            group("count=f()"),
            Err(FilterError::UnknownFunction { .. })
        ));
    }
}
