//! The closed set of functions usable in filters.
//!
//! A function wraps either a property (`round(price)=3`) or a literal
//! (`valid_from<end(2020-01-01T00:00:00Z/P1D)`).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{FilterError, FilterResult};
use crate::value::{Value, ValueType};

static CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[^(]+)\((?P<argument>[^)]*)\)$").expect("call pattern is valid")
});

/// Splits `name(argument)` without checking the name.
pub(crate) fn split_call(token: &str) -> Option<(&str, &str)> {
    let caps = CALL.captures(token)?;
    Some((caps.name("name")?.as_str(), caps.name("argument")?.as_str()))
}

/// A known filter function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Function {
    /// Truncates decimals toward zero; integers pass through.
    Round,
    /// Start instant of an interval.
    Start,
    /// End instant of an interval.
    End,
}

impl Function {
    pub const ALL: [Function; 3] = [Function::Round, Function::Start, Function::End];

    /// Returns the name used in queries.
    pub fn name(self) -> &'static str {
        match self {
            Function::Round => "round",
            Function::Start => "start",
            Function::End => "end",
        }
    }

    /// Looks up a function by name.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownFunction`] for any other name.
    pub fn from_name(name: &str) -> FilterResult<Function> {
        Function::ALL
            .into_iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| FilterError::unknown_function(name))
    }

    /// Returns true if the token has the shape `name(argument)`.
    pub fn is_call(token: &str) -> bool {
        CALL.is_match(token)
    }

    /// Returns the text between the parentheses of a call to a known function.
    ///
    /// Tokens that are not calls are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownFunction`] if the call names an unknown function.
    pub fn argument(token: &str) -> FilterResult<&str> {
        match split_call(token) {
            Some((name, argument)) => {
                Function::from_name(name)?;
                Ok(argument)
            }
            None => Ok(token),
        }
    }

    /// The type produced by the function, if it differs from its input.
    pub fn result_type(self) -> Option<ValueType> {
        match self {
            Function::Round => None,
            Function::Start | Function::End => Some(ValueType::Instant),
        }
    }

    /// Returns true if the function can be applied to values of `input`.
    pub fn accepts(self, input: ValueType) -> bool {
        match self {
            Function::Round => input.is_numeric(),
            Function::Start | Function::End => input == ValueType::Interval,
        }
    }

    /// The type the argument must have to produce a value of `result`.
    pub fn argument_type(self, result: ValueType) -> ValueType {
        match self {
            Function::Round => result,
            Function::Start | Function::End => ValueType::Interval,
        }
    }

    /// Applies the function to a scalar value.
    ///
    /// `property` names the argument in the error.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnsupportedFunctionForProperty`] when the value
    /// has a type the function does not accept.
    pub fn apply(self, value: Value, property: &str) -> FilterResult<Value> {
        match (self, value) {
            (Function::Round, Value::Integer(i)) => Ok(Value::Integer(i)),
            (Function::Round, Value::Decimal(d)) => Ok(Value::Decimal(d.trunc())),
            (Function::Start, Value::Interval(interval)) => Ok(Value::Instant(interval.start)),
            (Function::End, Value::Interval(interval)) => Ok(Value::Instant(interval.end)),
            _ => Err(FilterError::UnsupportedFunctionForProperty {
                function: self.name().to_string(),
                property: property.to_string(),
            }),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
