//! Runtime values that filters compare against.
//!
//! Property getters produce [`Value`]s and literals are converted into them.
//! Optional and multi-valued properties are modelled explicitly with
//! [`Value::Optional`] and [`Value::List`] so that the evaluator can apply its
//! null and match-quantifier rules as a plain case split.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Months, SecondsFormat, TimeDelta, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

/// Nominal length of a month when ordering durations.
const SECONDS_PER_MONTH: i64 = 30 * 86_400;

const SECONDS_PER_DAY: i64 = 86_400;

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:([0-9]+)Y)?(?:([0-9]+)M)?(?:([0-9]+)W)?(?:([0-9]+)D)?(?:T(?:([0-9]+)H)?(?:([0-9]+)M)?(?:([0-9]+)S)?)?$")
        .expect("duration pattern is valid")
});

/// The type a property is declared with, after unwrapping optional and
/// collection wrappers. Literals are converted to this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Text,
    Integer,
    Decimal,
    Boolean,
    Instant,
    Duration,
    Interval,
    Geometry,
}

impl ValueType {
    /// All value types, in declaration order.
    pub const ALL: [ValueType; 8] = [
        ValueType::Text,
        ValueType::Integer,
        ValueType::Decimal,
        ValueType::Boolean,
        ValueType::Instant,
        ValueType::Duration,
        ValueType::Interval,
        ValueType::Geometry,
    ];

    /// Lowercase name used in configuration and messages.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Text => "text",
            ValueType::Integer => "integer",
            ValueType::Decimal => "decimal",
            ValueType::Boolean => "boolean",
            ValueType::Instant => "instant",
            ValueType::Duration => "duration",
            ValueType::Interval => "interval",
            ValueType::Geometry => "geometry",
        }
    }

    /// Returns true for integer and decimal types.
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Decimal)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ValueType::ALL
            .into_iter()
            .find(|t| t.name() == lower)
            .ok_or_else(|| format!("unknown value type: {s}"))
    }
}

/// An ISO-8601 duration such as `P1Y2M3DT4H5M6S`.
///
/// Calendar parts are kept apart from clock parts so that adding a duration to
/// an instant respects month lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IsoDuration {
    /// Years and months, as months.
    pub months: i64,
    /// Weeks and days, as days.
    pub days: i64,
    /// Hours, minutes and seconds, as seconds.
    pub seconds: i64,
}

impl IsoDuration {
    /// Creates a duration from its calendar and clock parts.
    pub fn new(months: i64, days: i64, seconds: i64) -> Self {
        Self {
            months,
            days,
            seconds,
        }
    }

    /// Parses ISO-8601 duration syntax (`PnYnMnWnDTnHnMnS`).
    ///
    /// Returns `None` when a part does not fit in an `i64`.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = DURATION.captures(text)?;
        let part = |i: usize| -> Option<i64> {
            caps.get(i)
                .map_or(Some(0), |m| m.as_str().parse::<i64>().ok())
        };
        Some(Self {
            months: part(1)?.checked_mul(12)?.checked_add(part(2)?)?,
            days: part(3)?.checked_mul(7)?.checked_add(part(4)?)?,
            seconds: part(5)?
                .checked_mul(3600)?
                .checked_add(part(6)?.checked_mul(60)?)?
                .checked_add(part(7)?)?,
        })
    }

    /// Length in seconds with months counted as 30 days, saturating at the
    /// `i64` bounds.
    pub fn nominal_seconds(&self) -> i64 {
        self.months
            .saturating_mul(SECONDS_PER_MONTH)
            .saturating_add(self.days.saturating_mul(SECONDS_PER_DAY))
            .saturating_add(self.seconds)
    }

    /// Returns the negated duration.
    pub fn negate(self) -> Self {
        Self::new(
            self.months.saturating_neg(),
            self.days.saturating_neg(),
            self.seconds.saturating_neg(),
        )
    }

    /// Component-wise sum, saturating at the `i64` bounds.
    pub fn plus(self, other: Self) -> Self {
        Self::new(
            self.months.saturating_add(other.months),
            self.days.saturating_add(other.days),
            self.seconds.saturating_add(other.seconds),
        )
    }

    /// Adds the duration to an instant, returning `None` on overflow.
    pub fn add_to(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months = u32::try_from(self.months.unsigned_abs()).ok()?;
        let shifted = if self.months >= 0 {
            instant.checked_add_months(Months::new(months))?
        } else {
            instant.checked_sub_months(Months::new(months))?
        };
        shifted
            .checked_add_signed(TimeDelta::try_days(self.days)?)?
            .checked_add_signed(TimeDelta::try_seconds(self.seconds)?)
    }

    /// Subtracts the duration from an instant, returning `None` on overflow.
    pub fn subtract_from(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.negate().add_to(instant)
    }
}

impl Ord for IsoDuration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.nominal_seconds()
            .cmp(&other.nominal_seconds())
            .then_with(|| {
                (self.months, self.days, self.seconds).cmp(&(
                    other.months,
                    other.days,
                    other.seconds,
                ))
            })
    }
}

impl PartialOrd for IsoDuration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for IsoDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == IsoDuration::default() {
            return f.write_str("PT0S");
        }
        f.write_str("P")?;
        let (years, months) = (self.months / 12, self.months % 12);
        if years != 0 {
            write!(f, "{years}Y")?;
        }
        if months != 0 {
            write!(f, "{months}M")?;
        }
        if self.days != 0 {
            write!(f, "{}D", self.days)?;
        }
        if self.seconds != 0 {
            let (hours, rest) = (self.seconds / 3600, self.seconds % 3600);
            let (minutes, seconds) = (rest / 60, rest % 60);
            f.write_str("T")?;
            if hours != 0 {
                write!(f, "{hours}H")?;
            }
            if minutes != 0 {
                write!(f, "{minutes}M")?;
            }
            if seconds != 0 {
                write!(f, "{seconds}S")?;
            }
        }
        Ok(())
    }
}

impl Serialize for IsoDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A closed time interval between two instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Creates an interval.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Parses `instant/instant`, `instant/duration` or `duration/instant`.
    pub fn parse(text: &str) -> Option<Self> {
        let (left, right) = text.split_once('/')?;
        match (parse_instant(left), parse_instant(right)) {
            (Some(start), Some(end)) => Some(Self::new(start, end)),
            (Some(start), None) => {
                let end = IsoDuration::parse(right)?.add_to(start)?;
                Some(Self::new(start, end))
            }
            (None, Some(end)) => {
                let start = IsoDuration::parse(left)?.subtract_from(end)?;
                Some(Self::new(start, end))
            }
            (None, None) => None,
        }
    }

    /// Returns true if the instant lies within the interval (inclusive).
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant <= self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            format_instant(&self.start),
            format_instant(&self.end)
        )
    }
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parses an RFC 3339 instant and normalizes it to UTC.
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Formats an instant the way the query grammar writes it (`...T..Z`, no millis).
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// A property value or a converted literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Instant(DateTime<Utc>),
    Duration(IsoDuration),
    Interval(Interval),
    /// Well-known text, compared textually.
    Geometry(String),
    /// An optional value; `None` is the undefined case.
    Optional(Option<Box<Value>>),
    /// A multi-valued property.
    List(Vec<Value>),
}

impl Value {
    /// The undefined optional value.
    pub fn none() -> Self {
        Value::Optional(None)
    }

    /// Wraps a value as a defined optional.
    pub fn some(value: impl Into<Value>) -> Self {
        Value::Optional(Some(Box::new(value.into())))
    }

    /// Returns the scalar type of the value, or `None` for wrappers.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Text(_) => Some(ValueType::Text),
            Value::Integer(_) => Some(ValueType::Integer),
            Value::Decimal(_) => Some(ValueType::Decimal),
            Value::Boolean(_) => Some(ValueType::Boolean),
            Value::Instant(_) => Some(ValueType::Instant),
            Value::Duration(_) => Some(ValueType::Duration),
            Value::Interval(_) => Some(ValueType::Interval),
            Value::Geometry(_) => Some(ValueType::Geometry),
            Value::Optional(_) | Value::List(_) => None,
        }
    }

    /// Unwraps nested optionals. Returns `None` if any level is undefined.
    pub fn unwrap_optional(&self) -> Option<&Value> {
        match self {
            Value::Optional(Some(inner)) => inner.unwrap_optional(),
            Value::Optional(None) => None,
            other => Some(other),
        }
    }

    /// Returns true for undefined optionals and empty lists.
    ///
    /// Nested lists count as one flattened list, so `[[]]` is empty. A list
    /// with any scalar element, even an undefined one, is not.
    pub fn is_null_or_empty(&self) -> bool {
        match self.unwrap_optional() {
            None => true,
            Some(Value::List(items)) => items.iter().all(|item| {
                matches!(item.unwrap_optional(), Some(Value::List(_))) && item.is_null_or_empty()
            }),
            Some(_) => false,
        }
    }

    /// Natural ordering between two scalar values.
    ///
    /// Integers and decimals compare numerically with each other; any other
    /// pair of different types, and wrappers, are unordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Decimal(a), Value::Decimal(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Decimal(b)) => (*a as f64).partial_cmp(b),
            (Value::Decimal(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Instant(a), Value::Instant(b)) => Some(a.cmp(b)),
            (Value::Duration(a), Value::Duration(b)) => Some(a.cmp(b)),
            (Value::Interval(a), Value::Interval(b)) => Some(a.cmp(b)),
            (Value::Geometry(a), Value::Geometry(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Returns the text of a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) | Value::Geometry(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Instant(dt) => f.write_str(&format_instant(dt)),
            Value::Duration(d) => write!(f, "{d}"),
            Value::Interval(i) => write!(f, "{i}"),
            Value::Optional(None) => f.write_str("null"),
            Value::Optional(Some(v)) => write!(f, "{v}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Decimal(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::Instant(dt)
    }
}

impl From<IsoDuration> for Value {
    fn from(d: IsoDuration) -> Self {
        Value::Duration(d)
    }
}

impl From<Interval> for Value {
    fn from(i: Interval) -> Self {
        Value::Interval(i)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        Value::Optional(opt.map(|v| Box::new(v.into())))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
