//! Property path identifiers.

use std::fmt;

use serde::Serialize;

use crate::function::{self, Function};

/// A property path such as `name`, `address.city`, `-secret` or `round(price)`.
///
/// Exclusion and function wrapping are read from the text on demand; the
/// name itself is just the string, and equality and ordering follow it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PropertyName(String);

impl PropertyName {
    /// Creates a property name.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the path (or the wrapped argument) is empty.
    pub fn is_empty(&self) -> bool {
        self.path().is_empty()
    }

    /// Returns true for a leading `-`, used by projections to drop a field.
    pub fn is_exclusion(&self) -> bool {
        self.0.starts_with('-')
    }

    /// Drops the leading `-`, or returns `None` if this is not an exclusion.
    pub fn omit_exclusion(&self) -> Option<PropertyName> {
        self.0.strip_prefix('-').map(PropertyName::new)
    }

    /// Splits `name(argument)` into its parts.
    pub fn function_call(&self) -> Option<(&str, &str)> {
        function::split_call(&self.0)
    }

    /// Returns true if the name has the syntactic shape of a function call.
    pub fn is_function_call(&self) -> bool {
        Function::is_call(&self.0)
    }

    /// Returns the property a function call is applied to, or `self`.
    pub fn to_property(&self) -> PropertyName {
        PropertyName::new(self.path())
    }

    /// Returns true if `longer` is this path or a path nested below it.
    pub fn is_prefix_of(&self, longer: &str) -> bool {
        format!("{longer}.").starts_with(&format!("{}.", self.path()))
    }

    /// Returns true if this path is `prefix` or nested below it.
    pub fn starts_with(&self, prefix: &str) -> bool {
        format!("{}.", self.path()).starts_with(&format!("{prefix}."))
    }

    /// Removes a leading `prefix.` segment. A function wrapper is preserved.
    pub fn strip_prefix(&self, prefix: &str) -> PropertyName {
        let path = self.path();
        let stripped = if path == prefix {
            ""
        } else {
            path.strip_prefix(&format!("{prefix}."))
                .unwrap_or(path)
        };
        match self.function_call() {
            Some((name, _)) => PropertyName::new(format!("{name}({stripped})")),
            None => PropertyName::new(stripped),
        }
    }

    fn path(&self) -> &str {
        self.function_call()
            .map_or(self.0.as_str(), |(_, argument)| argument)
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PropertyName {
    fn from(value: &str) -> Self {
        PropertyName::new(value)
    }
}

impl From<String> for PropertyName {
    fn from(value: String) -> Self {
        PropertyName(value)
    }
}
