//! Field projection for printed records.
//!
//! `--fields name,address.city,-address.zip` keeps the listed paths (with
//! everything nested below them) and then drops the `-` prefixed ones. With
//! only exclusions, every other field is kept.

use cql_filter::PropertyName;
use serde_json::{Map, Value as Json};

/// Parsed `--fields` list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    includes: Vec<PropertyName>,
    excludes: Vec<PropertyName>,
}

impl Projection {
    /// Parses a comma separated list of paths.
    pub fn parse(fields: &str) -> Self {
        let mut projection = Self::default();
        for field in fields.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            let name = PropertyName::from(field);
            match name.omit_exclusion() {
                Some(excluded) => projection.excludes.push(excluded),
                None => projection.includes.push(name),
            }
        }
        projection
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }

    /// Returns a copy of the record holding only the projected fields.
    pub fn apply(&self, record: &Json) -> Json {
        self.project(record, "")
    }

    fn project(&self, json: &Json, path: &str) -> Json {
        match json {
            Json::Object(map) => Json::Object(
                map.iter()
                    .filter_map(|(key, value)| {
                        let child = if path.is_empty() {
                            key.clone()
                        } else {
                            format!("{path}.{key}")
                        };
                        self.field(&child, value).map(|value| (key.clone(), value))
                    })
                    .collect::<Map<String, Json>>(),
            ),
            Json::Array(items) => {
                Json::Array(items.iter().map(|item| self.project(item, path)).collect())
            }
            other => other.clone(),
        }
    }

    fn field(&self, path: &str, value: &Json) -> Option<Json> {
        if self.excludes.iter().any(|e| e.is_prefix_of(path)) {
            return None;
        }

        if self.includes.is_empty() || self.includes.iter().any(|i| i.is_prefix_of(path)) {
            return Some(self.project(value, path));
        }

        // An include below this path: descend and keep only what it names.
        let nested = self.includes.iter().any(|i| i.starts_with(path));
        if nested && (value.is_object() || value.is_array()) {
            Some(self.project(value, path))
        } else {
            None
        }
    }
}
