//! Property access on domain objects.
//!
//! Filters name properties by path; a [`PropertyAccessor`] maps those paths to
//! a declared [`ValueType`] and a getter. [`Schema`] is the in-memory
//! implementation, built from closures.

use std::fmt;

use indexmap::IndexMap;
use strsim::levenshtein;

use crate::error::{FilterError, FilterResult};
use crate::function::Function;
use crate::property::PropertyName;
use crate::value::{Value, ValueType};

/// Maximum Levenshtein distance to consider a name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Reads a property value from an object.
pub type Getter<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;

/// Where a property's value comes from.
pub enum PropertyKind<T> {
    /// Read directly from the object.
    Concrete(Getter<T>),
    /// Fetched from an external source; not available in memory.
    Resolvable,
}

/// A resolved property handle.
pub struct Property<T> {
    name: String,
    value_type: ValueType,
    kind: PropertyKind<T>,
}

impl<T> Property<T> {
    /// Creates a property read by `getter`.
    pub fn concrete(
        name: impl Into<String>,
        value_type: ValueType,
        getter: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            value_type,
            kind: PropertyKind::Concrete(Box::new(getter)),
        }
    }

    /// Creates a property whose value lives outside the object.
    pub fn resolvable(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            kind: PropertyKind::Resolvable,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type, with optional and collection wrappers removed.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn kind(&self) -> &PropertyKind<T> {
        &self.kind
    }

    pub fn is_resolvable(&self) -> bool {
        matches!(self.kind, PropertyKind::Resolvable)
    }

    pub fn is_geometry(&self) -> bool {
        self.value_type == ValueType::Geometry
    }

    /// Reads the value, or `None` for a resolvable property.
    pub fn get(&self, instance: &T) -> Option<Value> {
        match &self.kind {
            PropertyKind::Concrete(getter) => Some(getter(instance)),
            PropertyKind::Resolvable => None,
        }
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("resolvable", &self.is_resolvable())
            .finish()
    }
}

/// Resolves property paths for objects of type `T`.
pub trait PropertyAccessor<T> {
    /// Looks up a property by its path.
    fn resolve(&self, path: &str) -> Option<&Property<T>>;

    /// All known property paths.
    fn property_names(&self) -> Vec<&str>;

    /// Paths of properties declared as geometries.
    fn geometry_properties(&self) -> Vec<&str> {
        self.property_names()
            .into_iter()
            .filter(|name| self.resolve(name).is_some_and(Property::is_geometry))
            .collect()
    }

    /// Looks up a property, failing with a suggestion if it is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::FilterPropertyNotFound`] if no property has the path.
    fn require(&self, name: &PropertyName) -> FilterResult<&Property<T>> {
        self.resolve(name.as_str())
            .ok_or_else(|| FilterError::FilterPropertyNotFound {
                property: name.to_string(),
                suggestion: find_similar_name(name.as_str(), self.property_names().into_iter()),
            })
    }
}

/// A filter's property after resolution: the handle, the function wrapped
/// around it, and the type literals convert to.
pub(crate) struct ResolvedProperty<'a, T> {
    pub property: &'a Property<T>,
    pub function: Option<Function>,
    pub target: ValueType,
}

/// Resolves a possibly function-wrapped property name.
pub(crate) fn resolve_property<'a, T, A>(
    accessor: &'a A,
    name: &PropertyName,
) -> FilterResult<ResolvedProperty<'a, T>>
where
    A: PropertyAccessor<T> + ?Sized,
{
    let function = name
        .function_call()
        .map(|(function, _)| Function::from_name(function))
        .transpose()?;
    let inner = name.to_property();
    let property = accessor.require(&inner)?;

    let target = match function {
        Some(function) if !function.accepts(property.value_type()) => {
            return Err(FilterError::UnsupportedFunctionForProperty {
                function: function.name().to_string(),
                property: inner.to_string(),
            });
        }
        Some(function) => function
            .result_type()
            .unwrap_or_else(|| property.value_type()),
        None => property.value_type(),
    };

    Ok(ResolvedProperty {
        property,
        function,
        target,
    })
}

/// Checks that a spatial filter targets a geometry property.
pub(crate) fn require_geometry<T, A>(accessor: &A, name: &PropertyName) -> FilterResult<()>
where
    A: PropertyAccessor<T> + ?Sized,
{
    let geometry = accessor.geometry_properties();
    if geometry.contains(&name.as_str()) {
        Ok(())
    } else {
        Err(FilterError::SpatialFilteringRequiresGeometryProperty {
            property: name.to_string(),
            geometry_properties: geometry.into_iter().map(str::to_string).collect(),
        })
    }
}

/// Finds the closest candidate within the suggestion distance.
pub(crate) fn find_similar_name<'a>(
    query: &str,
    candidates: impl Iterator<Item = &'a str>,
) -> Option<String> {
    let query_lower = query.to_lowercase();
    let (best_match, best_distance) = candidates
        .filter(|name| !name.is_empty())
        .map(|name| (name.to_string(), levenshtein(&query_lower, &name.to_lowercase())))
        .min_by_key(|(_, d)| *d)?;

    if best_distance > 0 && best_distance <= MAX_SUGGESTION_DISTANCE {
        Some(best_match)
    } else {
        None
    }
}

/// In-memory property registry, in declaration order.
///
/// ```
/// use cql_filter::{Schema, Value, ValueType};
///
/// struct Station { name: String, capacity: Option<i64> }
///
/// let schema = Schema::<Station>::new()
///     .property("name", ValueType::Text, |s| Value::from(s.name.clone()))
///     .property("capacity", ValueType::Integer, |s| Value::from(s.capacity))
///     .resolvable("operator", ValueType::Text);
///
/// assert_eq!(schema.len(), 3);
/// ```
pub struct Schema<T> {
    properties: IndexMap<String, Property<T>>,
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self {
            properties: IndexMap::new(),
        }
    }
}

impl<T> Schema<T> {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a concrete property.
    pub fn property(
        self,
        name: impl Into<String>,
        value_type: ValueType,
        getter: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.with(Property::concrete(name, value_type, getter))
    }

    /// Adds a geometry property.
    pub fn geometry(
        self,
        name: impl Into<String>,
        getter: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.with(Property::concrete(name, ValueType::Geometry, getter))
    }

    /// Adds a resolvable property.
    pub fn resolvable(self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.with(Property::resolvable(name, value_type))
    }

    /// Adds a prebuilt property, replacing any with the same name.
    pub fn with(mut self, property: Property<T>) -> Self {
        self.properties.insert(property.name.clone(), property);
        self
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property<T>> {
        self.properties.values()
    }
}

impl<T> PropertyAccessor<T> for Schema<T> {
    fn resolve(&self, path: &str) -> Option<&Property<T>> {
        self.properties.get(path)
    }

    fn property_names(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.properties.values()).finish()
    }
}
