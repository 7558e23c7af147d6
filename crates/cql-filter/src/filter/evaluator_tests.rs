//! Tests for filter evaluation.

use super::*;
use crate::accessor::Schema;
use crate::filter::FilterParser;
use chrono::{DateTime, TimeZone, Utc};

// ==================== Test Helpers ====================

#[derive(Debug, Clone, PartialEq)]
struct Data {
    required: String,
    defined: Option<String>,
    undefined: Option<String>,
    nonemptylist: Vec<String>,
    emptylist: Vec<String>,
    listofnonemptylist: Vec<Vec<String>>,
    listofemptylist: Vec<Vec<String>>,
    sparselist: Vec<Option<String>>,
    count: i64,
    price: f64,
    validity: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

fn data() -> Data {
    Data {
        required: "1".to_string(),
        defined: Some("1".to_string()),
        undefined: None,
        nonemptylist: vec!["1".to_string()],
        emptylist: vec![],
        listofnonemptylist: vec![vec!["1".to_string()]],
        listofemptylist: vec![vec![]],
        sparselist: vec![Some("a".to_string()), None],
        count: 5,
        price: 2.75,
        validity: Some((
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2020, 12, 31, 0, 0, 0).unwrap(),
        )),
    }
}

fn schema() -> Schema<Data> {
    Schema::new()
        .property("required", ValueType::Text, |d: &Data| Value::from(d.required.clone()))
        .property("defined", ValueType::Text, |d: &Data| Value::from(d.defined.clone()))
        .property("undefined", ValueType::Text, |d: &Data| Value::from(d.undefined.clone()))
        .property("nonemptylist", ValueType::Text, |d: &Data| Value::from(d.nonemptylist.clone()))
        .property("emptylist", ValueType::Text, |d: &Data| Value::from(d.emptylist.clone()))
        .property("listofnonemptylist", ValueType::Text, |d: &Data| {
            Value::from(d.listofnonemptylist.clone())
        })
        .property("listofemptylist", ValueType::Text, |d: &Data| {
            Value::from(d.listofemptylist.clone())
        })
        .property("sparselist", ValueType::Text, |d: &Data| Value::from(d.sparselist.clone()))
        .property("count", ValueType::Integer, |d: &Data| Value::Integer(d.count))
        .property("price", ValueType::Decimal, |d: &Data| Value::Decimal(d.price))
        .property("validity", ValueType::Interval, |d: &Data| {
            Value::from(
                d.validity
                    .map(|(start, end)| crate::value::Interval::new(start, end)),
            )
        })
        .geometry("geom", |_| Value::Geometry("POINT(0 0)".to_string()))
        .resolvable("owner", ValueType::Text)
}

/// Runs `query` over a single `Data` and returns whether it was kept.
fn keeps(query: &str) -> bool {
    let filters = FilterParser::parse(query).unwrap();
    let schema = schema();
    let evaluator = FilterEvaluator::new(&filters, &schema, &LiteralResolver::default()).unwrap();
    let items = vec![data()];
    let kept = evaluator.apply(&items);
    kept.len() == 1
}

fn error(query: &str) -> FilterError {
    let filters = FilterParser::parse(query).unwrap();
    let schema = schema();
    FilterEvaluator::new(&filters, &schema, &LiteralResolver::default()).unwrap_err()
}

// ==================== Comparisons ====================

#[test]
fn test_equal() {
    assert!(keeps("required='1'"));
    assert!(!keeps("required='2'"));
    assert!(keeps("defined='1'"));
    assert!(!keeps("defined='2'"));
    assert!(!keeps("undefined='1'"));
}

#[test]
fn test_not_equal() {
    assert!(keeps("required<>'2'"));
    assert!(!keeps("required<>'1'"));
    assert!(keeps("defined<>'2'"));
    assert!(!keeps("defined<>'1'"));
    assert!(!keeps("undefined<>'2'"));
}

#[test]
fn test_ordering() {
    assert!(keeps("required<'2'"));
    assert!(!keeps("required<'1'"));
    assert!(keeps("required<='1'"));
    assert!(!keeps("required<='0'"));
    assert!(keeps("required>'0'"));
    assert!(!keeps("required>'1'"));
    assert!(keeps("required>='1'"));
    assert!(!keeps("required>='2'"));
    assert!(!keeps("undefined<'2'"));
    assert!(!keeps("undefined>='1'"));
}

#[test]
fn test_numeric_comparison() {
    assert!(keeps("count=5"));
    assert!(keeps("count>4 AND count<6"));
    assert!(keeps("price>2.5"));
    assert!(!keeps("price>=3"));
    assert!(keeps("count=2+3"));
}

// ==================== Ranges ====================

#[test]
fn test_between() {
    assert!(keeps("required BETWEEN '1' AND '2'"));
    assert!(!keeps("required BETWEEN '2' AND '3'"));
    assert!(keeps("defined BETWEEN '1' AND '2'"));
    assert!(!keeps("undefined BETWEEN '1' AND '2'"));
}

#[test]
fn test_not_between() {
    assert!(keeps("required NOT BETWEEN '2' AND '3'"));
    assert!(!keeps("required NOT BETWEEN '1' AND '2'"));
    assert!(!keeps("undefined NOT BETWEEN '2' AND '3'"));
}

// ==================== Patterns ====================

#[test]
fn test_like() {
    for pattern in ["1", "%1", "1%", "%1%"] {
        assert!(keeps(&format!("required LIKE '{pattern}'")), "{pattern}");
        assert!(!keeps(&format!("undefined LIKE '{pattern}'")), "{pattern}");
    }
    assert!(!keeps("required LIKE '%2%'"));
}

#[test]
fn test_not_like_is_complement_for_defined_values() {
    for pattern in ["2", "%2", "2%", "%2%"] {
        assert!(keeps(&format!("required NOT LIKE '{pattern}'")), "{pattern}");
        assert!(!keeps(&format!("undefined NOT LIKE '{pattern}'")), "{pattern}");
    }
    assert!(!keeps("required NOT LIKE '%1%'"));
}

#[test]
fn test_like_escapes_regex_characters() {
    let filters = FilterParser::parse("required LIKE 'a.c%'").unwrap();
    let schema = schema();
    let evaluator = FilterEvaluator::new(&filters, &schema, &LiteralResolver::default()).unwrap();
    let mut item = data();
    item.required = "abcd".to_string();
    assert!(!evaluator.matches(&item));
    item.required = "a.cd".to_string();
    assert!(evaluator.matches(&item));
}

#[test]
fn test_ilike_ignores_case() {
    let filters = FilterParser::parse("required ILIKE 'ab%' AND required NOT LIKE 'ab%'").unwrap();
    let schema = schema();
    let evaluator = FilterEvaluator::new(&filters, &schema, &LiteralResolver::default()).unwrap();
    let mut item = data();
    item.required = "ABC".to_string();
    assert!(evaluator.matches(&item));
    assert!(!keeps("required NOT ILIKE '%'"));
}

// ==================== Lists ====================

#[test]
fn test_in() {
    assert!(keeps("required IN ('1','2')"));
    assert!(!keeps("required IN ('2','3')"));
    assert!(keeps("required NOT IN ('2','3')"));
    assert!(!keeps("required NOT IN ('1')"));
    assert!(!keeps("undefined IN ('1')"));
    assert!(!keeps("undefined NOT IN ('1')"));
}

#[test]
fn test_list_values_use_any() {
    assert!(keeps("nonemptylist='1'"));
    assert!(!keeps("nonemptylist='2'"));
    assert!(keeps("listofnonemptylist='1'"));
    assert!(!keeps("emptylist='1'"));
    assert!(!keeps("emptylist<>'1'"));
}

// ==================== Null checks ====================

#[test]
fn test_is_null() {
    assert!(!keeps("defined IS NULL"));
    assert!(!keeps("nonemptylist IS NULL"));
    assert!(!keeps("listofnonemptylist IS NULL"));
    assert!(!keeps("sparselist IS NULL"));

    assert!(keeps("undefined IS NULL"));
    assert!(keeps("emptylist IS NULL"));
    assert!(keeps("listofemptylist IS NULL"));
}

#[test]
fn test_is_not_null_is_complement() {
    for property in [
        "required",
        "defined",
        "undefined",
        "nonemptylist",
        "emptylist",
        "listofnonemptylist",
        "listofemptylist",
        "sparselist",
    ] {
        assert_ne!(
            keeps(&format!("{property} IS NULL")),
            keeps(&format!("{property} IS NOT NULL")),
            "{property}"
        );
    }
}

#[test]
fn test_list_with_undefined_element_is_not_null() {
    assert!(keeps("sparselist IS NOT NULL"));
    assert!(keeps("sparselist='a'"));
    assert!(!keeps("sparselist='b'"));
}

// ==================== Functions ====================

#[test]
fn test_round_wrapped_property() {
    assert!(keeps("round(price)=2"));
    assert!(!keeps("price=2"));
    assert!(keeps("round(count)=5"));
}

#[test]
fn test_interval_functions() {
    assert!(keeps("start(validity)=2020-01-01T00:00:00Z"));
    assert!(keeps("end(validity)>2020-06-01T00:00:00Z"));
    assert!(keeps("start(validity)<2020-01-01T00:00:00Z+P1D"));
    assert!(keeps("end(validity)=end(2020-12-30T00:00:00Z/P1D)"));
}

// ==================== Spatial ====================

#[test]
fn test_intersects_is_left_to_data_source() {
    assert!(keeps("INTERSECTS(geom,POLYGON((0 0,1 1,0 0))) AND required='1'"));
}

#[test]
fn test_intersects_requires_geometry_property() {
    assert_eq!(
        error("INTERSECTS(required,POLYGON((0 0,1 1,0 0)))"),
        FilterError::SpatialFilteringRequiresGeometryProperty {
            property: "required".to_string(),
            geometry_properties: vec!["geom".to_string()],
        }
    );
}

// ==================== Errors ====================

#[test]
fn test_resolvable_property_cannot_be_filtered() {
    assert_eq!(
        error("owner='x'"),
        FilterError::cannot_filter_by_resolvable("owner")
    );
}

#[test]
fn test_unknown_property() {
    assert!(matches!(
        error("requird='1'"),
        FilterError::FilterPropertyNotFound { suggestion: Some(ref s), .. } if s == "required"
    ));
}

#[test]
fn test_conversion_error() {
    assert_eq!(
        error("count='many'"),
        FilterError::conversion("many", ValueType::Integer)
    );
}

#[test]
fn test_unknown_literal_function() {
    assert_eq!(error("required=f()"), FilterError::unknown_function("f"));
}

// ==================== Collections ====================

#[test]
fn test_apply_preserves_order_and_is_idempotent() {
    let filters = FilterParser::parse("count>=2").unwrap();
    let schema = schema();
    let evaluator = FilterEvaluator::new(&filters, &schema, &LiteralResolver::default()).unwrap();

    let items: Vec<Data> = (0..5)
        .map(|i| Data {
            count: i,
            ..data()
        })
        .collect();
    let once: Vec<Data> = evaluator.apply(&items).into_iter().cloned().collect();
    assert_eq!(once.iter().map(|d| d.count).collect::<Vec<_>>(), vec![2, 3, 4]);

    let twice: Vec<Data> = evaluator.apply(&once).into_iter().cloned().collect();
    assert_eq!(once, twice);
}

#[test]
fn test_apply_one() {
    let filters = FilterParser::parse("count=5").unwrap();
    let schema = schema();
    let evaluator = FilterEvaluator::new(&filters, &schema, &LiteralResolver::default()).unwrap();
    let item = data();
    assert!(evaluator.apply_one(&item).is_some());
    let other = Data { count: 1, ..data() };
    assert!(evaluator.apply_one(&other).is_none());
}

#[test]
fn test_apply_grouped_keeps_whole_key() {
    let filters = FilterParser::parse("count=5").unwrap();
    let schema = schema();
    let evaluator = FilterEvaluator::new(&filters, &schema, &LiteralResolver::default()).unwrap();

    let mut groups = IndexMap::new();
    groups.insert("b", vec![Data { count: 1, ..data() }, data()]);
    groups.insert("a", vec![Data { count: 1, ..data() }]);
    groups.insert("c", vec![data()]);

    let kept = evaluator.apply_grouped(&groups);
    assert_eq!(kept.keys().copied().copied().collect::<Vec<_>>(), vec!["b", "c"]);
    assert_eq!(kept[&"b"].len(), 2);
}

#[test]
fn test_apply_sorted() {
    let filters = FilterParser::parse("count=5").unwrap();
    let schema = schema();
    let evaluator = FilterEvaluator::new(&filters, &schema, &LiteralResolver::default()).unwrap();

    let mut groups = BTreeMap::new();
    groups.insert(2, vec![data()]);
    groups.insert(1, vec![Data { count: 0, ..data() }]);
    groups.insert(3, vec![data()]);

    let kept = evaluator.apply_sorted(&groups);
    assert_eq!(kept.keys().copied().copied().collect::<Vec<_>>(), vec![2, 3]);
}

#[test]
fn test_empty_filter_set_keeps_everything() {
    let filters = FilterParser::parse("").unwrap();
    let schema = schema();
    let evaluator = FilterEvaluator::new(&filters, &schema, &LiteralResolver::default()).unwrap();
    assert!(evaluator.is_empty());
    assert!(evaluator.matches(&data()));
}

// ==================== Match actions ====================

#[test]
fn test_match_actions() {
    let values = [1, 2, 3];
    assert!(MatchAction::Any.test(&values, |v| *v == 2));
    assert!(!MatchAction::All.test(&values, |v| *v == 2));
    assert!(MatchAction::All.test(&values, |v| *v > 0));
    assert!(MatchAction::One.test(&values, |v| *v == 2));
    assert!(!MatchAction::One.test(&values, |v| *v > 1));
    assert!(!MatchAction::Any.test(Vec::<i32>::new(), |_| true));
}
