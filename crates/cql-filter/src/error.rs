//! Error types for filter parsing, grouping and evaluation.

use thiserror::Error;

use crate::value::ValueType;

/// A specialized Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Broad classification of a [`FilterError`].
///
/// Every variant is a client-input error; the kind tells a host API which part
/// of the request was at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The query text itself is malformed.
    Grammar,
    /// The query names a property that cannot be used for filtering.
    Resolution,
    /// A literal could not be turned into a value of the property's type.
    Evaluation,
}

/// Errors that can occur while parsing or applying a filter expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// A literal token matches none of the literal grammars.
    #[error("invalid literal: {literal}")]
    InvalidLiteral {
        /// The offending token.
        literal: String,
    },

    /// A function call names a function outside the catalog.
    #[error("unknown function: {name}")]
    UnknownFunction {
        /// The unrecognized function name.
        name: String,
    },

    /// A known function was applied to a value it does not support.
    #[error("function {function} cannot be used with property {property}")]
    UnsupportedFunctionForProperty {
        /// The function name.
        function: String,
        /// The property (or literal) the function was applied to.
        property: String,
    },

    /// Text was left over after every recognized clause was removed.
    #[error("illegal filter: {residue}")]
    IllegalFilter {
        /// The unconsumed part of the query.
        residue: String,
    },

    /// The spatial argument is not a `POLYGON((...))`.
    #[error("illegal polygon: {polygon}")]
    IllegalPolygon {
        /// The offending WKT text.
        polygon: String,
    },

    /// A polygon point is not a pair of numbers.
    #[error("illegal point: {point}")]
    IllegalPoint {
        /// The offending point text.
        point: String,
    },

    /// The polygon ring is not closed.
    #[error("first coordinate ({first}) must equal last coordinate ({last})")]
    FirstCoordinateMustEqualLastCoordinate {
        /// The first point of the ring.
        first: String,
        /// The last point of the ring.
        last: String,
    },

    /// The filter names a property the accessor does not know.
    #[error("filter property not found: {property}{}", suggestion.as_ref().map(|s| format!(" (did you mean '{s}'?)")).unwrap_or_default())]
    FilterPropertyNotFound {
        /// The property name used in the filter.
        property: String,
        /// A similarly named known property, if any.
        suggestion: Option<String>,
    },

    /// The property is fetched from an external source and has no in-memory value.
    #[error("cannot filter by resolvable property: {property}")]
    CannotFilterByResolvable {
        /// The property name.
        property: String,
    },

    /// A spatial filter targets a property that is not a geometry.
    #[error("spatial filtering requires a geometry property, got {property} (geometry properties: {})", geometry_properties.join(", "))]
    SpatialFilteringRequiresGeometryProperty {
        /// The property used in the spatial filter.
        property: String,
        /// The geometry properties that are available.
        geometry_properties: Vec<String>,
    },

    /// A literal could not be converted to the target type.
    #[error("cannot convert '{value}' to {target}")]
    Conversion {
        /// The literal text.
        value: String,
        /// The type conversion was attempted to.
        target: ValueType,
    },

    /// Two literal operands cannot be combined with the operator.
    #[error("unsupported arithmetic: {left} {op} {right}")]
    UnsupportedArithmetic {
        /// Left operand, rendered.
        left: String,
        /// Operator character.
        op: char,
        /// Right operand, rendered.
        right: String,
    },

    /// A filter was built with the wrong number of literals for its operator.
    #[error("{filter_type} expects {expected} value(s), got {actual}")]
    InvalidArity {
        /// The operator keyword.
        filter_type: String,
        /// Human readable expected arity.
        expected: String,
        /// Number of literals supplied.
        actual: usize,
    },
}

impl FilterError {
    /// Creates an invalid literal error.
    pub fn invalid_literal(literal: impl Into<String>) -> Self {
        FilterError::InvalidLiteral {
            literal: literal.into(),
        }
    }

    /// Creates an unknown function error.
    pub fn unknown_function(name: impl Into<String>) -> Self {
        FilterError::UnknownFunction { name: name.into() }
    }

    /// Creates a conversion error.
    pub fn conversion(value: impl Into<String>, target: ValueType) -> Self {
        FilterError::Conversion {
            value: value.into(),
            target,
        }
    }

    /// Creates a resolvable-property error.
    pub fn cannot_filter_by_resolvable(property: impl Into<String>) -> Self {
        FilterError::CannotFilterByResolvable {
            property: property.into(),
        }
    }

    /// Returns the error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FilterError::InvalidLiteral { .. }
            | FilterError::UnknownFunction { .. }
            | FilterError::IllegalFilter { .. }
            | FilterError::IllegalPolygon { .. }
            | FilterError::IllegalPoint { .. }
            | FilterError::FirstCoordinateMustEqualLastCoordinate { .. }
            | FilterError::InvalidArity { .. } => ErrorKind::Grammar,
            FilterError::FilterPropertyNotFound { .. }
            | FilterError::CannotFilterByResolvable { .. }
            | FilterError::SpatialFilteringRequiresGeometryProperty { .. } => ErrorKind::Resolution,
            FilterError::UnsupportedFunctionForProperty { .. }
            | FilterError::Conversion { .. }
            | FilterError::UnsupportedArithmetic { .. } => ErrorKind::Evaluation,
        }
    }

    /// Returns a stable machine readable code for the error.
    pub fn code(&self) -> &'static str {
        match self {
            FilterError::InvalidLiteral { .. } => "INVALID_LITERAL",
            FilterError::UnknownFunction { .. } => "UNKNOWN_FUNCTION",
            FilterError::UnsupportedFunctionForProperty { .. } => "UNSUPPORTED_FUNCTION_FOR_PROPERTY",
            FilterError::IllegalFilter { .. } => "ILLEGAL_FILTER",
            FilterError::IllegalPolygon { .. } => "ILLEGAL_POLYGON",
            FilterError::IllegalPoint { .. } => "ILLEGAL_POINT",
            FilterError::FirstCoordinateMustEqualLastCoordinate { .. } => "UNCLOSED_POLYGON",
            FilterError::FilterPropertyNotFound { .. } => "FILTER_PROPERTY_NOT_FOUND",
            FilterError::CannotFilterByResolvable { .. } => "CANNOT_FILTER_BY_RESOLVABLE",
            FilterError::SpatialFilteringRequiresGeometryProperty { .. } => {
                "SPATIAL_FILTERING_REQUIRES_GEOMETRY_PROPERTY"
            }
            FilterError::Conversion { .. } => "CONVERSION_ERROR",
            FilterError::UnsupportedArithmetic { .. } => "UNSUPPORTED_ARITHMETIC",
            FilterError::InvalidArity { .. } => "INVALID_ARITY",
        }
    }
}
