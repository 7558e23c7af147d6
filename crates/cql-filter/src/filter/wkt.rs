//! Syntactic checks for WKT polygons in spatial filters.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{FilterError, FilterResult};

static POLYGON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^POLYGON\s*\(\s*\((?P<ring>.+)\)\s*\)$").expect("polygon pattern is valid")
});

static POINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?[0-9]+(?:\.[0-9]+)?\s+-?[0-9]+(?:\.[0-9]+)?$").expect("point pattern is valid")
});

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*,\s*").expect("separator pattern is valid"));

/// Checks that `wkt` is a single closed ring `POLYGON((x y, ..., x y))`.
///
/// The ring must be closed textually: `30 10` and `30.0 10` are different points.
///
/// # Errors
///
/// - [`FilterError::IllegalPolygon`] if the outer shape is wrong,
/// - [`FilterError::IllegalPoint`] for the first point that is not two numbers,
/// - [`FilterError::FirstCoordinateMustEqualLastCoordinate`] if the ring is open.
pub fn check_polygon(wkt: &str) -> FilterResult<()> {
    let ring = POLYGON
        .captures(wkt)
        .and_then(|caps| caps.name("ring"))
        .ok_or_else(|| FilterError::IllegalPolygon {
            polygon: wkt.to_string(),
        })?
        .as_str();

    let points: Vec<&str> = SEPARATOR.split(ring.trim()).collect();
    if let Some(bad) = points.iter().find(|p| !POINT.is_match(p)) {
        return Err(FilterError::IllegalPoint {
            point: bad.to_string(),
        });
    }

    match (points.first(), points.last()) {
        (Some(first), Some(last)) if first != last => {
            Err(FilterError::FirstCoordinateMustEqualLastCoordinate {
                first: first.to_string(),
                last: last.to_string(),
            })
        }
        _ => Ok(()),
    }
}
