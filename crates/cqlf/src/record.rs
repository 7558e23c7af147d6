//! Property access on JSON records.
//!
//! Records are arbitrary JSON objects. The configured schema names the
//! properties filters may use; each becomes a getter that walks the dotted
//! path and converts what it finds to the declared type.

use chrono::DateTime;
use cql_filter::{Converter, Schema, TextConverter, Value, ValueType};
use serde_json::Value as Json;

use crate::commands::config::PropertyConfig;

/// A JSON record.
pub type Record = Json;

/// Builds the property schema for JSON records.
pub fn build_schema(properties: &[PropertyConfig]) -> Schema<Record> {
    properties
        .iter()
        .fold(Schema::new(), |schema, property| {
            let name = property.name.trim().to_string();
            let value_type = property.value_type;
            if property.resolvable {
                schema.resolvable(name, value_type)
            } else {
                let path = name.clone();
                schema.property(name, value_type, move |record: &Record| {
                    lookup(record, &path).map_or_else(Value::none, |json| to_value(json, value_type))
                })
            }
        })
}

/// Follows a dotted path through nested objects.
fn lookup<'a>(record: &'a Json, path: &str) -> Option<&'a Json> {
    path.split('.')
        .try_fold(record, |current, segment| current.get(segment))
}

/// Converts JSON to a value of the declared type.
///
/// `null` becomes an undefined value and arrays become lists. Values that do
/// not fit the type are kept as text so that no comparison matches them.
fn to_value(json: &Json, value_type: ValueType) -> Value {
    match json {
        Json::Null => Value::none(),
        Json::Array(items) => Value::List(items.iter().map(|item| to_value(item, value_type)).collect()),
        Json::Bool(b) if value_type == ValueType::Boolean => Value::Boolean(*b),
        Json::Number(n) => number(n, value_type).unwrap_or_else(|| Value::Text(n.to_string())),
        Json::String(s) => TextConverter
            .convert(s, value_type)
            .unwrap_or_else(|_| Value::Text(s.clone())),
        other => Value::Text(other.to_string()),
    }
}

fn number(n: &serde_json::Number, value_type: ValueType) -> Option<Value> {
    match value_type {
        ValueType::Integer => n.as_i64().map(Value::Integer),
        ValueType::Decimal => n.as_f64().map(Value::Decimal),
        ValueType::Text => Some(Value::Text(n.to_string())),
        // Epoch seconds.
        ValueType::Instant => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(Value::Instant),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use cql_filter::PropertyAccessor;
    use serde_json::json;

    fn property(name: &str, value_type: ValueType) -> PropertyConfig {
        PropertyConfig {
            name: name.to_string(),
            value_type,
            resolvable: false,
        }
    }

    fn get(schema: &Schema<Record>, name: &str, record: &Record) -> Option<Value> {
        schema.resolve(name).and_then(|p| p.get(record))
    }

    #[test]
    fn test_nested_path() {
        let schema = build_schema(&[property("address.city", ValueType::Text)]);
        let record = json!({"address": {"city": "Tampere"}});
        assert_eq!(get(&schema, "address.city", &record), Some(Value::from("Tampere")));
    }

    #[test]
    fn test_missing_and_null_are_undefined() {
        let schema = build_schema(&[property("size", ValueType::Integer)]);
        assert_eq!(get(&schema, "size", &json!({})), Some(Value::none()));
        assert_eq!(get(&schema, "size", &json!({"size": null})), Some(Value::none()));
    }

    #[test]
    fn test_arrays_become_lists() {
        let schema = build_schema(&[property("tags", ValueType::Text)]);
        let record = json!({"tags": ["a", null]});
        assert_eq!(
            get(&schema, "tags", &record),
            Some(Value::List(vec![Value::from("a"), Value::none()]))
        );
    }

    #[test]
    fn test_numbers_follow_declared_type() {
        let schema = build_schema(&[
            property("count", ValueType::Integer),
            property("price", ValueType::Decimal),
            property("code", ValueType::Text),
        ]);
        let record = json!({"count": 3, "price": 3, "code": 42});
        assert_eq!(get(&schema, "count", &record), Some(Value::Integer(3)));
        assert_eq!(get(&schema, "price", &record), Some(Value::Decimal(3.0)));
        assert_eq!(get(&schema, "code", &record), Some(Value::from("42")));
    }

    #[test]
    fn test_strings_are_converted() {
        let schema = build_schema(&[
            property("at", ValueType::Instant),
            property("count", ValueType::Integer),
        ]);
        let record = json!({"at": "2020-01-01T00:00:00Z", "count": "many"});
        assert_eq!(
            get(&schema, "at", &record),
            Some(Value::Instant(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()))
        );
        assert_eq!(get(&schema, "count", &record), Some(Value::from("many")));
    }

    #[test]
    fn test_epoch_seconds_instant() {
        let schema = build_schema(&[property("at", ValueType::Instant)]);
        assert_eq!(
            get(&schema, "at", &json!({"at": 0})),
            Some(Value::Instant(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()))
        );
    }

    #[test]
    fn test_resolvable_has_no_value() {
        let schema = build_schema(&[PropertyConfig {
            name: "owner".to_string(),
            value_type: ValueType::Text,
            resolvable: true,
        }]);
        let owner = schema.resolve("owner").unwrap();
        assert!(owner.is_resolvable());
        assert_eq!(owner.get(&json!({"owner": "x"})), None);
    }

    #[test]
    fn test_geometry_properties() {
        let schema = build_schema(&[
            property("name", ValueType::Text),
            property("location", ValueType::Geometry),
        ]);
        assert_eq!(schema.geometry_properties(), vec!["location"]);
    }
}
