//! Literal-to-value conversion.
//!
//! Hosts can swap the text parser ([`Converter`]) and the operator semantics
//! ([`Arithmetic`]). [`LiteralResolver`] combines both with the function
//! catalog and is the one step both grouping and evaluation go through.

use chrono::TimeDelta;
use tracing::trace;

use crate::error::{FilterError, FilterResult};
use crate::function::Function;
use crate::literal::{Literal, Operator};
use crate::value::{parse_instant, Interval, IsoDuration, Value, ValueType};

/// Parses literal text into a value of a target type.
pub trait Converter: Send + Sync {
    /// Converts `text` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Conversion`] if the text is not a valid `target`.
    fn convert(&self, text: &str, target: ValueType) -> FilterResult<Value>;
}

/// Combines two converted operands of an arithmetic literal.
pub trait Arithmetic: Send + Sync {
    /// Computes `left op right`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnsupportedArithmetic`] for operand types the
    /// operator does not apply to.
    fn combine(&self, left: Value, op: Operator, right: Value) -> FilterResult<Value>;
}

/// Default converter: query syntax for every [`ValueType`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextConverter;

impl Converter for TextConverter {
    fn convert(&self, text: &str, target: ValueType) -> FilterResult<Value> {
        let converted = match target {
            ValueType::Text => Some(Value::Text(text.to_string())),
            ValueType::Integer => text.parse::<i64>().ok().map(Value::Integer),
            ValueType::Decimal => text
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite())
                .map(Value::Decimal),
            ValueType::Boolean => match text {
                "true" => Some(Value::Boolean(true)),
                "false" => Some(Value::Boolean(false)),
                _ => None,
            },
            ValueType::Instant => parse_instant(text).map(Value::Instant),
            ValueType::Duration => IsoDuration::parse(text).map(Value::Duration),
            ValueType::Interval => Interval::parse(text).map(Value::Interval),
            ValueType::Geometry => Some(Value::Geometry(text.to_string())),
        };
        converted.ok_or_else(|| FilterError::conversion(text, target))
    }
}

/// Default arithmetic.
///
/// - integers use checked math, mixed numbers widen to decimals,
/// - durations add to and subtract from instants and each other,
/// - subtracting two instants gives the duration between them.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardArithmetic;

impl StandardArithmetic {
    fn unsupported(left: &Value, op: Operator, right: &Value) -> FilterError {
        FilterError::UnsupportedArithmetic {
            left: left.to_string(),
            op: op.as_char(),
            right: right.to_string(),
        }
    }
}

impl Arithmetic for StandardArithmetic {
    fn combine(&self, left: Value, op: Operator, right: Value) -> FilterResult<Value> {
        let result = match (&left, &right) {
            (Value::Integer(a), Value::Integer(b)) => match op {
                Operator::Add => a.checked_add(*b),
                Operator::Sub => a.checked_sub(*b),
                Operator::Mul => a.checked_mul(*b),
                Operator::Div => a.checked_div(*b),
            }
            .map(Value::Integer),
            (Value::Integer(_) | Value::Decimal(_), Value::Integer(_) | Value::Decimal(_)) => {
                let a = as_f64(&left);
                let b = as_f64(&right);
                let d = match op {
                    Operator::Add => a + b,
                    Operator::Sub => a - b,
                    Operator::Mul => a * b,
                    Operator::Div => a / b,
                };
                d.is_finite().then_some(Value::Decimal(d))
            }
            (Value::Instant(at), Value::Duration(d)) => match op {
                Operator::Add => d.add_to(*at).map(Value::Instant),
                Operator::Sub => d.subtract_from(*at).map(Value::Instant),
                _ => None,
            },
            (Value::Duration(d), Value::Instant(at)) if op == Operator::Add => {
                d.add_to(*at).map(Value::Instant)
            }
            (Value::Duration(a), Value::Duration(b)) => match op {
                Operator::Add => Some(Value::Duration(a.plus(*b))),
                Operator::Sub => Some(Value::Duration(a.plus(b.negate()))),
                _ => None,
            },
            (Value::Instant(a), Value::Instant(b)) if op == Operator::Sub => {
                let delta: TimeDelta = *a - *b;
                Some(Value::Duration(IsoDuration::new(0, 0, delta.num_seconds())))
            }
            _ => None,
        };
        result.ok_or_else(|| Self::unsupported(&left, op, &right))
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Integer(i) => *i as f64,
        Value::Decimal(d) => *d,
        _ => f64::NAN,
    }
}

/// Turns classified literals into values of a target type.
pub struct LiteralResolver {
    converter: Box<dyn Converter>,
    arithmetic: Box<dyn Arithmetic>,
}

impl Default for LiteralResolver {
    fn default() -> Self {
        Self::new(TextConverter, StandardArithmetic)
    }
}

impl std::fmt::Debug for LiteralResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiteralResolver").finish_non_exhaustive()
    }
}

impl LiteralResolver {
    /// Creates a resolver from a converter and an arithmetic implementation.
    pub fn new(converter: impl Converter + 'static, arithmetic: impl Arithmetic + 'static) -> Self {
        Self {
            converter: Box::new(converter),
            arithmetic: Box::new(arithmetic),
        }
    }

    /// Converts raw text with the configured converter.
    pub fn convert(&self, text: &str, target: ValueType) -> FilterResult<Value> {
        self.converter.convert(text, target)
    }

    /// Resolves a literal to a value of `target`.
    ///
    /// Function calls convert their argument to the function's input type and
    /// apply the function. Arithmetic operands are resolved separately; an
    /// operand written as a duration stays a duration when the target is a
    /// point or span in time.
    ///
    /// # Errors
    ///
    /// Returns conversion, function and arithmetic errors from the parts.
    pub fn resolve(&self, literal: &Literal, target: ValueType) -> FilterResult<Value> {
        trace!(%literal, %target, "resolving literal");
        match literal {
            Literal::Plain { value } => self.converter.convert(value, target),
            Literal::FunctionCall { name, argument } => {
                let function = Function::from_name(name)?;
                let argument = argument.as_deref().ok_or_else(|| {
                    FilterError::UnsupportedFunctionForProperty {
                        function: function.name().to_string(),
                        property: literal.to_string(),
                    }
                })?;
                let value = self
                    .converter
                    .convert(argument, function.argument_type(target))?;
                function.apply(value, argument)
            }
            Literal::Arithmetic { left, op, right } => {
                let left = self.resolve(left, operand_type(left, target))?;
                let right = self.resolve(right, operand_type(right, target))?;
                self.arithmetic.combine(left, *op, right)
            }
        }
    }

    /// Resolves every literal against the same target.
    pub fn resolve_all(&self, literals: &[Literal], target: ValueType) -> FilterResult<Vec<Value>> {
        literals
            .iter()
            .map(|literal| self.resolve(literal, target))
            .collect()
    }
}

fn operand_type(operand: &Literal, target: ValueType) -> ValueType {
    let temporal = matches!(target, ValueType::Instant | ValueType::Duration);
    match operand.as_plain() {
        Some(text) if temporal && IsoDuration::parse(text).is_some() => ValueType::Duration,
        Some(text) if target == ValueType::Duration && parse_instant(text).is_some() => {
            ValueType::Instant
        }
        _ => target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn resolve(token: &str, target: ValueType) -> FilterResult<Value> {
        let literal = Literal::classify(token)?;
        LiteralResolver::default().resolve(&literal, target)
    }

    // ==================== Converter ====================

    #[test]
    fn test_convert_scalars() {
        let c = TextConverter;
        assert_eq!(c.convert("42", ValueType::Integer), Ok(Value::Integer(42)));
        assert_eq!(c.convert("42", ValueType::Decimal), Ok(Value::Decimal(42.0)));
        assert_eq!(c.convert("true", ValueType::Boolean), Ok(Value::Boolean(true)));
        assert_eq!(c.convert("42", ValueType::Text), Ok(Value::from("42")));
    }

    #[test]
    fn test_convert_failure_names_target() {
        assert_eq!(
            TextConverter.convert("abc", ValueType::Integer),
            Err(FilterError::conversion("abc", ValueType::Integer))
        );
        assert!(TextConverter.convert("NaN", ValueType::Decimal).is_err());
        assert!(TextConverter.convert("yes", ValueType::Boolean).is_err());
        assert_eq!(
            TextConverter.convert("P999999999999999999Y", ValueType::Duration),
            Err(FilterError::conversion("P999999999999999999Y", ValueType::Duration))
        );
    }

    // ==================== Resolver ====================

    #[test]
    fn test_resolve_arithmetic_numbers() {
        assert_eq!(resolve("1+2", ValueType::Integer), Ok(Value::Integer(3)));
        assert_eq!(resolve("7/2", ValueType::Decimal), Ok(Value::Decimal(3.5)));
        assert!(matches!(
            resolve("1/0", ValueType::Integer),
            Err(FilterError::UnsupportedArithmetic { op: '/', .. })
        ));
    }

    #[test]
    fn test_resolve_instant_plus_duration() {
        let expected = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(
            resolve("2020-01-01T00:00:00Z+P1D", ValueType::Instant),
            Ok(Value::Instant(expected))
        );
        assert_eq!(
            resolve("2020-01-03T00:00:00Z-P1D", ValueType::Instant),
            Ok(Value::Instant(expected))
        );
    }

    #[test]
    fn test_resolve_duration_between_instants() {
        assert_eq!(
            resolve("2020-01-02T00:00:00Z-2020-01-01T00:00:00Z", ValueType::Duration),
            Ok(Value::Duration(IsoDuration::new(0, 0, 86_400)))
        );
    }

    #[test]
    fn test_resolve_function_literal() {
        let end = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(
            resolve("end(2020-01-01T00:00:00Z/P1D)", ValueType::Instant),
            Ok(Value::Instant(end))
        );
        assert_eq!(resolve("round(2.9)", ValueType::Decimal), Ok(Value::Decimal(2.0)));
        assert_eq!(
            resolve("f()", ValueType::Text),
            Err(FilterError::unknown_function("f"))
        );
    }

    #[test]
    fn test_resolve_text_arithmetic_is_unsupported() {
        assert!(matches!(
            resolve("'a'+'b'", ValueType::Text),
            Err(FilterError::UnsupportedArithmetic { .. })
        ));
    }
}
